//! Source URL to alternate front-end URL rewriting.
//!
//! Two mutually exclusive policies exist and are never mixed:
//! - [`RewriteStrategy::RootToTop`] sends subreddit homes to their all-time
//!   top listing and unrecognized pages to the multireddit view
//! - [`RewriteStrategy::Passthrough`] keeps path, query and fragment as-is

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::route::{RouteKind, classify_path};

/// Suffix appended to subreddit roots under [`RewriteStrategy::RootToTop`].
const TOP_ALL_TIME: &str = "/top?t=all";

/// Catch-all view for pages outside the recognized prefixes.
const MULTI: &str = "/multi";

/// How a classified source path becomes a target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteStrategy {
    /// Subreddit roots go to `/top?t=all`, unrecognized paths go to `/multi`.
    RootToTop,
    /// Path, query and fragment are copied verbatim for every kind.
    Passthrough,
}

impl RewriteStrategy {
    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RootToTop => "root-to-top",
            Self::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for RewriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewriteStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "root-to-top" | "a" | "A" => Ok(Self::RootToTop),
            "passthrough" | "b" | "B" => Ok(Self::Passthrough),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

/// Root of the alternate front-end.
///
/// Treated as an opaque string; only one trailing slash is ever removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Wrap a configured base URL.
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// The base as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The base with exactly one trailing `/` stripped.
    #[must_use]
    pub fn clean(&self) -> &str {
        self.0.strip_suffix('/').unwrap_or(&self.0)
    }
}

impl From<&str> for BaseUrl {
    fn from(base: &str) -> Self {
        Self::new(base)
    }
}

impl From<String> for BaseUrl {
    fn from(base: String) -> Self {
        Self(base)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A base URL and strategy bundled for repeated rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriter {
    base: BaseUrl,
    strategy: RewriteStrategy,
}

impl Rewriter {
    /// Create a rewriter targeting `base` with the given strategy.
    pub fn new(base: impl Into<BaseUrl>, strategy: RewriteStrategy) -> Self {
        Self {
            base: base.into(),
            strategy,
        }
    }

    /// The configured base.
    #[must_use]
    pub fn base(&self) -> &BaseUrl {
        &self.base
    }

    /// The configured strategy.
    #[must_use]
    pub fn strategy(&self) -> RewriteStrategy {
        self.strategy
    }

    /// Rewrite `source` onto the configured base.
    ///
    /// # Errors
    ///
    /// See [`rewrite`].
    pub fn rewrite(&self, source: &str) -> Result<String> {
        rewrite(source, &self.base, self.strategy)
    }
}

/// Rewrite an absolute source URL onto `base`.
///
/// # Arguments
///
/// * `source` - URL of the page being viewed
/// * `base` - root of the alternate front-end
/// * `strategy` - which rewrite policy applies
///
/// # Returns
///
/// The target URL, always prefixed by [`BaseUrl::clean`].
///
/// # Errors
///
/// Returns [`Error::UnparsableUrl`] when `source` is not an absolute URL.
///
/// # Examples
///
/// ```
/// # use altfront::rewrite::{BaseUrl, RewriteStrategy, rewrite};
/// let base = BaseUrl::new("https://redditpx.com/");
/// assert_eq!(
///     rewrite("https://www.reddit.com/r/funny/", &base, RewriteStrategy::RootToTop).unwrap(),
///     "https://redditpx.com/r/funny/top?t=all"
/// );
/// assert_eq!(
///     rewrite("https://www.reddit.com/about", &base, RewriteStrategy::Passthrough).unwrap(),
///     "https://redditpx.com/about"
/// );
/// ```
pub fn rewrite(source: &str, base: &BaseUrl, strategy: RewriteStrategy) -> Result<String> {
    let url = Url::parse(source).map_err(|e| Error::UnparsableUrl {
        url: source.to_string(),
        reason: e.to_string(),
    })?;

    let path = url.path();
    let kind = classify_path(path);
    debug!("path={path:?} kind={kind} strategy={strategy}");

    let clean = base.clean();
    let target = match (strategy, kind) {
        (RewriteStrategy::RootToTop, RouteKind::SubredditRoot) => {
            let root = path.strip_suffix('/').unwrap_or(path);
            format!("{clean}{root}{TOP_ALL_TIME}")
        }
        (RewriteStrategy::RootToTop, RouteKind::Other) => format!("{clean}{MULTI}"),
        (RewriteStrategy::RootToTop, RouteKind::ContentPage) | (RewriteStrategy::Passthrough, _) => {
            format!("{clean}{path}{}{}", search(&url), hash(&url))
        }
    };
    debug!("target={target:?}");
    Ok(target)
}

/// `?query`, or nothing when the query is absent or empty.
fn search(url: &Url) -> String {
    match url.query() {
        Some(q) if !q.is_empty() => format!("?{q}"),
        _ => String::new(),
    }
}

/// `#fragment`, or nothing when the fragment is absent or empty.
fn hash(url: &Url) -> String {
    match url.fragment() {
        Some(f) if !f.is_empty() => format!("#{f}"),
        _ => String::new(),
    }
}
