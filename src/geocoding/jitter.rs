use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::JitterConfig;
use crate::domain::GeoPoint;

/// When two placed points count as the same spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionPolicy {
    /// Bit-for-bit equal coordinates only. Two points a metre apart are never separated.
    ExactMatch,
    /// Within this many degrees (Euclidean, in the lon/lat plane).
    Within(f64),
}

impl CollisionPolicy {
    fn collides(&self, a: &GeoPoint, b: &GeoPoint) -> bool {
        match *self {
            CollisionPolicy::ExactMatch => a == b,
            CollisionPolicy::Within(radius) => {
                (a.longitude - b.longitude).hypot(a.latitude - b.latitude) <= radius
            }
        }
    }
}

/// Spreads markers that land on the same spot. Each new point is compared with
/// every point placed before it; on a collision it is moved by a uniform random
/// offset of up to `max_offset * n` degrees per axis, `n` being the number of
/// points (itself included) sharing the spot.
pub struct CollisionJitter<R = StdRng> {
    placed: Vec<GeoPoint>,
    policy: CollisionPolicy,
    max_offset: f64,
    rng: R,
}

impl CollisionJitter<StdRng> {
    pub fn from_config(config: &JitterConfig) -> Self {
        let policy = match config.collision_radius {
            Some(radius) => CollisionPolicy::Within(radius),
            None => CollisionPolicy::ExactMatch,
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(policy, config.max_offset, rng)
    }
}

impl<R: Rng> CollisionJitter<R> {
    pub fn with_rng(policy: CollisionPolicy, max_offset: f64, rng: R) -> Self {
        Self {
            placed: Vec::new(),
            policy,
            max_offset,
            rng,
        }
    }

    /// Record `point` and return where its marker should go.
    pub fn place(&mut self, point: GeoPoint) -> GeoPoint {
        self.placed.push(point);

        let sharing = self
            .placed
            .iter()
            .filter(|p| self.policy.collides(p, &point))
            .count();
        if sharing <= 1 {
            return point;
        }

        let bound = self.max_offset * sharing as f64;
        let (dx, dy) = loop {
            let dx = self.rng.gen_range(-bound..bound);
            let dy = self.rng.gen_range(-bound..bound);
            if dx != 0.0 || dy != 0.0 {
                break (dx, dy);
            }
        };

        debug!(sharing, dx, dy, "jittered colliding point");
        GeoPoint::new(point.longitude + dx, point.latitude + dy)
    }

    pub fn placed(&self) -> usize {
        self.placed.len()
    }
}
