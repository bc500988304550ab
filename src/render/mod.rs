// Payloads handed to the web map: marker placements, layer/view settings, search index.

pub mod document;
pub mod geojson;
pub mod icon;
pub mod popup;
pub mod report;
pub mod search;

pub use document::{MapDocument, MapView, MarkerPlacement, SearchOptions, TileLayer};
pub use icon::{icon_for, Icon, IconStyle};
pub use search::SearchIndex;
