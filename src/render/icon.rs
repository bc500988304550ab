use serde::{Deserialize, Serialize};

pub const DEFAULT_ICON_URL: &str =
    "https://raw.githubusercontent.com/mommo1/username.github.io/main/pictish_stone_icon.png";

/// Largest hover size the configuration accepts, in pixels.
pub const MAX_ICON_SIZE: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub url: String,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

impl Icon {
    /// Square icon anchored at its bottom centre, popup opening just above it.
    pub fn square(url: &str, size: u32) -> Self {
        // anchors are signed pixel offsets; sizes past i32 saturate
        let side = i32::try_from(size).unwrap_or(i32::MAX);
        Self {
            url: url.to_string(),
            size: [size, size],
            anchor: [side / 2, side],
            popup_anchor: [0, -side],
        }
    }
}

/// Marker icon plus the size it grows to while hovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconStyle {
    pub base: Icon,
    pub hover_size: u32,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            base: Icon {
                url: DEFAULT_ICON_URL.to_string(),
                size: [33, 33],
                anchor: [16, 32],
                popup_anchor: [0, -32],
            },
            hover_size: 40,
        }
    }
}

/// Icon to show for a marker in the given hover state.
pub fn icon_for(style: &IconStyle, hovered: bool) -> Icon {
    if hovered {
        Icon::square(&style.base.url, style.hover_size)
    } else {
        style.base.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhovered_icon_is_base_icon() {
        let style = IconStyle::default();
        assert_eq!(icon_for(&style, false), style.base);
    }

    #[test]
    fn test_hovered_icon_is_enlarged() {
        let style = IconStyle::default();
        let icon = icon_for(&style, true);

        assert_eq!(icon.url, style.base.url);
        assert_eq!(icon.size, [40, 40]);
        assert_eq!(icon.anchor, [20, 40]);
        assert_eq!(icon.popup_anchor, [0, -40]);
    }

    #[test]
    fn test_oversized_icon_does_not_wrap_anchors() {
        let icon = Icon::square(DEFAULT_ICON_URL, u32::MAX);

        assert_eq!(icon.size, [u32::MAX, u32::MAX]);
        assert_eq!(icon.anchor, [i32::MAX / 2, i32::MAX]);
        assert_eq!(icon.popup_anchor, [0, -i32::MAX]);
    }

    #[test]
    fn test_hover_then_exit_restores_original() {
        let style = IconStyle::default();
        let _hovered = icon_for(&style, true);
        assert_eq!(icon_for(&style, false), IconStyle::default().base);
    }
}
