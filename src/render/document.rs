use crate::domain::model::{GeoPosition, ProjectedMarker, ProjectionOutcome};
use crate::render::icon::{icon_for, Icon, IconStyle};
use crate::render::popup::popup_html;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
    #[serde(default)]
    pub default: bool,
}

/// Initial view, base layers and control placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub layers: Vec<TileLayer>,
    pub fullscreen_position: String,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [58.5, -4.3],
            zoom: 7,
            layers: vec![
                TileLayer {
                    name: "Satellite Imagery".to_string(),
                    url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
                    attribution: "&copy; <a href=\"https://www.esri.com\">Esri</a> &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
                    default: true,
                },
                TileLayer {
                    name: "OpenStreetMap with Labels".to_string(),
                    url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
                    default: false,
                },
            ],
            fullscreen_position: "topright".to_string(),
        }
    }
}

impl MapView {
    /// The layer shown on load: the one flagged `default`, else the first.
    pub fn default_layer(&self) -> Option<&TileLayer> {
        self.layers
            .iter()
            .find(|l| l.default)
            .or_else(|| self.layers.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub property_name: String,
    pub zoom: u8,
    pub initial: bool,
    pub marker: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            property_name: "name".to_string(),
            zoom: 12,
            initial: false,
            marker: false,
        }
    }
}

/// Everything the map needs to place one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub name: String,
    pub position: GeoPosition,
    pub popup_html: String,
    pub icon: Icon,
    pub hover_icon: Icon,
}

impl MarkerPlacement {
    pub fn new(marker: &ProjectedMarker, style: &IconStyle) -> Self {
        Self {
            name: marker.name.clone(),
            position: marker.position,
            popup_html: popup_html(marker),
            icon: icon_for(style, false),
            hover_icon: icon_for(style, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDocument {
    pub generated_at: DateTime<Utc>,
    pub view: MapView,
    pub default_layer: Option<String>,
    pub search: SearchOptions,
    pub markers: Vec<MarkerPlacement>,
    pub rejected: usize,
}

impl MapDocument {
    pub fn build(
        view: &MapView,
        style: &IconStyle,
        search: &SearchOptions,
        outcome: &ProjectionOutcome,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            default_layer: view.default_layer().map(|l| l.name.clone()),
            view: view.clone(),
            search: search.clone(),
            markers: outcome
                .markers
                .iter()
                .map(|m| MarkerPlacement::new(m, style))
                .collect(),
            rejected: outcome.rejections.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ConversionDefect, RecordRejection};

    fn outcome() -> ProjectionOutcome {
        ProjectionOutcome {
            markers: vec![ProjectedMarker {
                name: "Glamis 2".to_string(),
                description: "Cross-slab: Glamis 2".to_string(),
                url: "https://example.com/glamis".to_string(),
                position: GeoPosition::new(56.61, -3.0),
            }],
            rejections: vec![RecordRejection {
                line: 3,
                name: "Unknown".to_string(),
                defect: ConversionDefect::MissingField {
                    column: "SITE NORTHING".to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_document_carries_placements_and_counts() {
        let doc = MapDocument::build(
            &MapView::default(),
            &IconStyle::default(),
            &SearchOptions::default(),
            &outcome(),
            Utc::now(),
        );

        assert_eq!(doc.markers.len(), 1);
        assert_eq!(doc.rejected, 1);
        assert_eq!(doc.default_layer.as_deref(), Some("Satellite Imagery"));
        assert_eq!(doc.markers[0].icon.size, [33, 33]);
        assert_eq!(doc.markers[0].hover_icon.size, [40, 40]);
        assert!(doc.markers[0].popup_html.starts_with("<b>Glamis 2</b>"));
    }

    #[test]
    fn test_first_layer_is_default_when_none_flagged() {
        let mut view = MapView::default();
        for layer in &mut view.layers {
            layer.default = false;
        }
        assert_eq!(
            view.default_layer().map(|l| l.name.as_str()),
            Some("Satellite Imagery")
        );
    }

    #[test]
    fn test_document_serializes_search_options() {
        let doc = MapDocument::build(
            &MapView::default(),
            &IconStyle::default(),
            &SearchOptions::default(),
            &ProjectionOutcome::default(),
            Utc::now(),
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["search"]["property_name"], "name");
        assert_eq!(value["search"]["zoom"], 12);
        assert_eq!(value["view"]["fullscreen_position"], "topright");
    }
}
