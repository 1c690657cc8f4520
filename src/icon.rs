//! Toolbar icon asset selection.

use crate::theme::ThemeDecision;

/// Dark glyph, shown on near-white pages.
pub const DARK_ICON: &str = "icon-dark.png";

/// Light glyph, the default.
pub const LIGHT_ICON: &str = "icon-light.png";

/// Pixel sizes the toolbar asks for.
pub const ICON_SIZES: [u32; 4] = [16, 32, 48, 128];

/// Asset path for every toolbar icon size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    path: &'static str,
}

impl IconSet {
    /// The icon variant contrasting with a page of the given brightness.
    #[must_use]
    pub fn for_decision(decision: ThemeDecision) -> Self {
        let path = match decision {
            ThemeDecision::Light => DARK_ICON,
            ThemeDecision::NotLight => LIGHT_ICON,
        };
        Self { path }
    }

    /// The single asset path used for all sizes.
    #[must_use]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// `(size, path)` pairs, as a toolbar `setIcon` call expects.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &'static str)> + '_ {
        ICON_SIZES.iter().map(|&size| (size, self.path))
    }
}
