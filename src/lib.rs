//! Alternate front-end redirects and brightness-aware toolbar icons.
//!
//! Two independent engines:
//! - [`mod@rewrite`] classifies a page path and maps it onto a configured base URL
//! - [`theme`] decides whether the page background is near-white, from sampled
//!   colors with hint fallbacks
//!
//! Everything else ([`navigate`], [`dispatch`], [`config`]) is plumbing that
//! hosts use to drive the engines.

pub mod color;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod icon;
pub mod logs;
pub mod navigate;
pub mod rewrite;
pub mod route;
pub mod theme;

use log::debug;

pub use error::{Error, Result};
pub use icon::IconSet;
pub use rewrite::{BaseUrl, RewriteStrategy, Rewriter, rewrite};
pub use route::{RouteKind, classify_path};
pub use theme::{LightHints, Signal, ThemeDecision, classify_theme, decisive_signal};

/// Pick the toolbar icon for a page.
///
/// This function orchestrates the entire process:
/// 1. Parse the body background, then the root background
/// 2. Compare the first usable color against the brightness threshold
/// 3. Fall back to the light-theme hints when no color is usable
/// 4. Map the decision to an icon asset
#[must_use]
pub fn select_icon(body_background: &str, root_background: &str, hints: &LightHints) -> IconSet {
    let decision = classify_theme(body_background, root_background, hints);
    debug!("decision={decision}");

    let icon = IconSet::for_decision(decision);
    debug!("icon={}", icon.path());
    icon
}
