use crate::domain::model::ProjectedMarker;
use serde_json::{json, Value};

/// Markers as a GeoJSON FeatureCollection. Point coordinates are `[longitude, latitude]`.
pub fn feature_collection(markers: &[ProjectedMarker]) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.position.longitude, m.position.latitude],
                },
                "properties": {
                    "name": m.name,
                    "description": m.description,
                    "url": m.url,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GeoPosition;

    #[test]
    fn test_coordinates_are_longitude_first() {
        let markers = vec![ProjectedMarker {
            name: "Aberlemno 1".to_string(),
            description: "Cross-slab: Aberlemno 1".to_string(),
            url: "https://example.com/aberlemno".to_string(),
            position: GeoPosition::new(56.69, -2.78),
        }];

        let collection = feature_collection(&markers);
        let feature = &collection["features"][0];

        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(feature["geometry"]["coordinates"][0], -2.78);
        assert_eq!(feature["geometry"]["coordinates"][1], 56.69);
        assert_eq!(feature["properties"]["name"], "Aberlemno 1");
    }

    #[test]
    fn test_empty_collection() {
        let collection = feature_collection(&[]);
        assert_eq!(collection["features"].as_array().map(Vec::len), Some(0));
    }
}
