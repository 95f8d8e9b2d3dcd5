//! Engine configuration.

use std::env;

use msplit_core::geometry::Size;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`LayoutConfig::separator_thickness`].
pub const ENV_SEPARATOR_THICKNESS: &str = "MSPLIT_SEPARATOR_THICKNESS";
/// Environment variable selecting lazy separator drags (`1`/`true`/`yes`/`on`).
pub const ENV_LAZY_RESIZE: &str = "MSPLIT_LAZY_RESIZE";

/// How a separator drag is applied to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorMode {
    /// Every move resizes the neighbours.
    #[default]
    Immediate,
    /// Moves only update a preview; the resize happens on release.
    Lazy,
}

/// Layout engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Thickness of every separator along its container's main axis.
    pub separator_thickness: i32,
    /// Drag mode used by sessions created with `SeparatorDrag::for_tree`.
    pub separator_mode: SeparatorMode,
    /// Minimum used by `insert_guest` when a guest reports an empty minimum.
    pub default_min_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            separator_thickness: 5,
            separator_mode: SeparatorMode::Immediate,
            default_min_size: Size::new(40, 40),
        }
    }
}

impl LayoutConfig {
    /// Set the separator thickness. Negative values are treated as zero.
    #[must_use]
    pub fn with_separator_thickness(mut self, thickness: i32) -> Self {
        self.separator_thickness = thickness.max(0);
        self
    }

    /// Set the separator drag mode.
    #[must_use]
    pub fn with_separator_mode(mut self, mode: SeparatorMode) -> Self {
        self.separator_mode = mode;
        self
    }

    /// Set the fallback minimum for guests.
    #[must_use]
    pub fn with_default_min_size(mut self, size: Size) -> Self {
        self.default_min_size = size.expanded_to(Size::ZERO);
        self
    }

    /// Defaults overridden from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Defaults overridden through a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(thickness) = get_env(ENV_SEPARATOR_THICKNESS)
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|thickness| *thickness >= 0)
        {
            config.separator_thickness = thickness;
        }
        if let Some(lazy) = get_env(ENV_LAZY_RESIZE).and_then(|raw| parse_bool(&raw)) {
            config.separator_mode = if lazy {
                SeparatorMode::Lazy
            } else {
                SeparatorMode::Immediate
            };
        }
        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
