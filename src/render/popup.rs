use crate::domain::model::ProjectedMarker;

pub fn popup_html(marker: &ProjectedMarker) -> String {
    format!(
        "<b>{}</b><br>{}<br><a href='{}' target='_blank'>More Info</a>",
        escape_html(&marker.name),
        escape_html(&marker.description),
        escape_html(&marker.url)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
