use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::map::MapArtifact;

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";
const CLUSTER_CSS: &str = "https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css";
const CLUSTER_DEFAULT_CSS: &str =
    "https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css";
const CLUSTER_JS: &str = "https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js";

// Marker data is inlined as a JS literal; keep "</script>" inside strings from closing the tag.
fn script_safe_json(markers_json: &str) -> String {
    markers_json.replace("</", "<\\/")
}

fn map_script(map: &MapArtifact, markers_json: &str) -> String {
    let (lat, lon) = map.center();
    format!(
        r#"
const markers = {markers};
const map = L.map('map').setView([{lat}, {lon}], {zoom});
L.tileLayer('https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
const cluster = L.markerClusterGroup();
markers.forEach(function (m) {{
  L.marker([m.lat, m.lon])
    .bindTooltip(m.tooltip)
    .bindPopup(m.popup, {{ maxWidth: 320 }})
    .addTo(cluster);
}});
map.addLayer(cluster);
"#,
        markers = script_safe_json(markers_json),
        zoom = map.zoom(),
    )
}

/// Standalone page: Leaflet map, one cluster group, every marker inside it.
pub fn map_page(map: &MapArtifact, markers_json: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "賃貸物件マップ" }
                link rel="stylesheet" href=(LEAFLET_CSS);
                link rel="stylesheet" href=(CLUSTER_CSS);
                link rel="stylesheet" href=(CLUSTER_DEFAULT_CSS);
                script src=(LEAFLET_JS) {}
                script src=(CLUSTER_JS) {}
                style { "html, body, #map { height: 100%; margin: 0; }" }
            }
            body {
                div id="map" {}
                script { (PreEscaped(map_script(map, markers_json))) }
            }
        }
    }
}
