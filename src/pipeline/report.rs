use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Completed,
    Cancelled,
}

/// What one run did, including everything it skipped along the way.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: Outcome,

    pub pages_requested: u32,
    pub pages_fetched: u32,
    pub failed_pages: Vec<u32>,

    pub raw_listings: usize,
    pub skipped_rows: usize,
    pub dropped_without_access: usize,
    pub duplicates_removed: usize,
    pub rows: usize,

    pub geocoded: usize,
    pub unresolved: usize,
    pub not_attempted: usize,
    pub markers: usize,

    pub outputs: Vec<PathBuf>,
}

impl RunReport {
    pub fn started() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            outcome: Outcome::Completed,
            pages_requested: 0,
            pages_fetched: 0,
            failed_pages: Vec::new(),
            raw_listings: 0,
            skipped_rows: 0,
            dropped_without_access: 0,
            duplicates_removed: 0,
            rows: 0,
            geocoded: 0,
            unresolved: 0,
            not_attempted: 0,
            markers: 0,
            outputs: Vec::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == Outcome::Cancelled
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Outcome::Completed => "completed",
            Outcome::Cancelled => "cancelled",
        };
        let elapsed = self.finished_at - self.started_at;

        writeln!(f, "run {outcome} in {}s", elapsed.num_seconds())?;
        writeln!(
            f,
            "pages:    {}/{} fetched",
            self.pages_fetched, self.pages_requested
        )?;
        if !self.failed_pages.is_empty() {
            let failed: Vec<String> = self.failed_pages.iter().map(u32::to_string).collect();
            writeln!(f, "failed:   pages {}", failed.join(", "))?;
        }
        writeln!(
            f,
            "listings: {} raw, {} skipped rows, {} without access, {} duplicates, {} kept",
            self.raw_listings,
            self.skipped_rows,
            self.dropped_without_access,
            self.duplicates_removed,
            self.rows
        )?;
        writeln!(
            f,
            "geocode:  {} resolved, {} unresolved, {} not attempted",
            self.geocoded, self.unresolved, self.not_attempted
        )?;
        writeln!(f, "markers:  {}", self.markers)?;
        for path in &self.outputs {
            writeln!(f, "wrote:    {}", path.display())?;
        }
        Ok(())
    }
}
