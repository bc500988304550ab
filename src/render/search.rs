use crate::domain::model::{GeoPosition, ProjectedMarker};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub name: String,
    pub position: GeoPosition,
    /// index into the marker list the entry was built from
    pub marker: usize,
    #[serde(skip)]
    key: String,
}

/// Marker names in input order, for the map's search control.
///
/// `lookup` always matches on the marker name. `property_name` is only passed
/// through so the web map's search control knows which feature property to read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchIndex {
    pub property_name: String,
    pub entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn from_markers(property_name: &str, markers: &[ProjectedMarker]) -> Self {
        let entries = markers
            .iter()
            .enumerate()
            .map(|(marker, m)| SearchEntry {
                name: m.name.clone(),
                position: m.position,
                marker,
                key: m.name.to_lowercase(),
            })
            .collect();

        Self {
            property_name: property_name.to_string(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup: prefix matches first, then other substring matches.
    pub fn lookup(&self, query: &str) -> Vec<&SearchEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let (mut prefix, substring): (Vec<&SearchEntry>, Vec<&SearchEntry>) = self
            .entries
            .iter()
            .filter(|e| e.key.contains(&needle))
            .partition(|e| e.key.starts_with(&needle));

        prefix.extend(substring);
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(names: &[&str]) -> Vec<ProjectedMarker> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ProjectedMarker {
                name: name.to_string(),
                description: format!("Symbol stone: {}", name),
                url: String::new(),
                position: GeoPosition::new(56.0 + i as f64, -3.0),
            })
            .collect()
    }

    #[test]
    fn test_lookup_orders_prefix_matches_first() {
        let index = SearchIndex::from_markers(
            "name",
            &markers(&["Meigle 2", "Aberlemno 1", "Kirriemuir", "Aberlemno 3"]),
        );

        let hits: Vec<&str> = index.lookup("aberlemno").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(hits, vec!["Aberlemno 1", "Aberlemno 3"]);

        let hits: Vec<&str> = index.lookup("EM").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(hits, vec!["Aberlemno 1", "Kirriemuir", "Aberlemno 3"]);
    }

    #[test]
    fn test_lookup_prefix_before_substring() {
        let index = SearchIndex::from_markers("name", &markers(&["Dunnichen", "Dunfallandy"]));
        let hits: Vec<usize> = index.lookup("n").iter().map(|e| e.marker).collect();
        assert_eq!(hits, vec![0, 1]);

        let index = SearchIndex::from_markers("name", &markers(&["Golspie", "Glamis 1"]));
        let hits: Vec<&str> = index.lookup("g").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(hits, vec!["Golspie", "Glamis 1"]);
    }

    #[test]
    fn test_prefix_match_jumps_ahead_of_earlier_substring_match() {
        let index = SearchIndex::from_markers("name", &markers(&["Kirriemuir", "Meigle 2"]));

        let hits: Vec<&str> = index.lookup("m").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(hits, vec!["Meigle 2", "Kirriemuir"]);

        let hits: Vec<usize> = index.lookup("M").iter().map(|e| e.marker).collect();
        assert_eq!(hits, vec![1, 0]);
    }

    #[test]
    fn test_lookup_is_name_only_whatever_the_property_name() {
        let index = SearchIndex::from_markers("title", &markers(&["Rhynie 1"]));

        assert!(index.lookup("symbol").is_empty());
        assert_eq!(index.lookup("rhynie").len(), 1);

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["property_name"], "title");
        assert!(json["entries"][0].get("key").is_none());
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let index = SearchIndex::from_markers("name", &markers(&["Rhynie 1"]));
        assert!(index.lookup("  ").is_empty());
        assert_eq!(index.len(), 1);
    }
}
