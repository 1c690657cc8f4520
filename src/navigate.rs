//! User-initiated redirects.
//!
//! Each entry point carries its own defaults: which rewrite strategy applies,
//! whether the target replaces the current tab, and which base URL to use
//! when none is saved.

use std::fmt;
use std::str::FromStr;

use log::{debug, error, info};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::rewrite::{BaseUrl, RewriteStrategy, rewrite};

/// Keyboard command that redirects the active tab.
pub const REDIRECT_COMMAND: &str = "send-url-to-ha";

/// Fallback base for the keyboard command.
pub const COMMAND_FALLBACK_BASE: &str = "http://redditpx:3000";

/// Fallback base for the popup "go" button.
pub const POPUP_FALLBACK_BASE: &str = "https://redditpx.com";

/// Where the target URL is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
    /// Open the target in a new tab.
    NewTab,
    /// Replace the current tab's page.
    ReplaceCurrent,
}

/// The user action that asked for a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// Toolbar icon clicked while a base URL is saved.
    IconClick,
    /// Keyboard command [`REDIRECT_COMMAND`].
    Command,
    /// "Go" button in the settings popup.
    PopupGo,
}

impl EntryPoint {
    /// Strategy used when settings do not override it.
    #[must_use]
    pub fn default_strategy(self) -> RewriteStrategy {
        match self {
            Self::IconClick | Self::Command => RewriteStrategy::RootToTop,
            Self::PopupGo => RewriteStrategy::Passthrough,
        }
    }

    /// How the target is opened.
    #[must_use]
    pub fn policy(self) -> NavigationPolicy {
        match self {
            Self::IconClick | Self::Command => NavigationPolicy::NewTab,
            Self::PopupGo => NavigationPolicy::ReplaceCurrent,
        }
    }

    /// Base used when none is saved; `None` means a saved base is required.
    #[must_use]
    pub fn fallback_base(self) -> Option<&'static str> {
        match self {
            Self::IconClick => None,
            Self::Command => Some(COMMAND_FALLBACK_BASE),
            Self::PopupGo => Some(POPUP_FALLBACK_BASE),
        }
    }

    /// Map a keyboard command name to its entry point.
    #[must_use]
    pub fn from_command(command: &str) -> Option<Self> {
        (command == REDIRECT_COMMAND).then_some(Self::Command)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IconClick => f.write_str("click"),
            Self::Command => f.write_str("command"),
            Self::PopupGo => f.write_str("popup"),
        }
    }
}

impl FromStr for EntryPoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "click" => Ok(Self::IconClick),
            "command" => Ok(Self::Command),
            "popup" => Ok(Self::PopupGo),
            other => Err(format!("unknown entry point {other:?}, expected click, command or popup")),
        }
    }
}

/// A planned navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// URL to open.
    pub target: String,
    /// How to open it.
    pub policy: NavigationPolicy,
}

/// Tab-navigation collaborator.
pub trait Navigator {
    /// Open `url` in a new tab.
    fn open_new_tab(&mut self, url: &str);
    /// Load `url` in the current tab.
    fn replace_current(&mut self, url: &str);
}

/// Work out where `tab_url` should be redirected from `entry`.
///
/// # Errors
///
/// - [`Error::MissingBaseUrl`] when the entry point needs a saved base and
///   none is configured
/// - [`Error::UnparsableUrl`] when `tab_url` is not absolute
pub fn plan(entry: EntryPoint, tab_url: &str, settings: &Settings) -> Result<Redirect> {
    let base = settings
        .base_url
        .as_deref()
        .or_else(|| entry.fallback_base())
        .map(BaseUrl::new)
        .ok_or(Error::MissingBaseUrl)?;
    let strategy = settings.strategy.unwrap_or_else(|| entry.default_strategy());
    debug!("entry={entry} base={base} strategy={strategy}");

    let target = rewrite(tab_url, &base, strategy)?;
    Ok(Redirect {
        target,
        policy: entry.policy(),
    })
}

/// Plan a redirect and hand it to `navigator`.
///
/// Failures are logged and leave the tab untouched.
///
/// # Returns
///
/// The redirect performed, or `None` when nothing was navigated.
pub fn redirect<N: Navigator>(
    navigator: &mut N,
    entry: EntryPoint,
    tab_url: Option<&str>,
    settings: &Settings,
) -> Option<Redirect> {
    let Some(tab_url) = tab_url else {
        error!("No active tab URL found.");
        return None;
    };

    match plan(entry, tab_url, settings) {
        Ok(redirect) => {
            info!("redirecting to {}", redirect.target);
            match redirect.policy {
                NavigationPolicy::NewTab => navigator.open_new_tab(&redirect.target),
                NavigationPolicy::ReplaceCurrent => navigator.replace_current(&redirect.target),
            }
            Some(redirect)
        }
        Err(e) => {
            error!("Error transforming URL: {e}");
            None
        }
    }
}
