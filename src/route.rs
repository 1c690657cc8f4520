//! Path classification for source site pages.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Paths under one of the recognized listing prefixes.
static LISTING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(r|u|user|domain)/").expect("listing prefix pattern is valid"));

/// A subreddit home, with at most one trailing slash.
static SUBREDDIT_ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/r/[^/]+/?$").expect("subreddit root pattern is valid"));

/// What kind of page a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// `/r/<name>` or `/r/<name>/`.
    SubredditRoot,
    /// Anything else under `/r/`, `/u/`, `/user/` or `/domain/`.
    ContentPage,
    /// Paths outside the recognized prefixes.
    Other,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubredditRoot => f.write_str("subreddit-root"),
            Self::ContentPage => f.write_str("content-page"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// Classify a URL path.
///
/// The path is matched as-is: no case folding, no decoding. Never fails; the
/// empty string is [`RouteKind::Other`].
///
/// # Examples
///
/// ```
/// # use altfront::route::{RouteKind, classify_path};
/// assert_eq!(classify_path("/r/funny/"), RouteKind::SubredditRoot);
/// assert_eq!(classify_path("/r/funny/comments/123/title"), RouteKind::ContentPage);
/// assert_eq!(classify_path("/about"), RouteKind::Other);
/// ```
#[must_use]
pub fn classify_path(path: &str) -> RouteKind {
    if !LISTING_PREFIX.is_match(path) {
        RouteKind::Other
    } else if SUBREDDIT_ROOT.is_match(path) {
        RouteKind::SubredditRoot
    } else {
        RouteKind::ContentPage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subreddit_root() {
        assert_eq!(classify_path("/r/funny"), RouteKind::SubredditRoot);
        assert_eq!(classify_path("/r/funny/"), RouteKind::SubredditRoot);
        assert_eq!(classify_path("/r/AskReddit"), RouteKind::SubredditRoot);
    }

    #[test]
    fn test_content_page() {
        assert_eq!(classify_path("/r/funny/comments/123/title"), RouteKind::ContentPage);
        assert_eq!(classify_path("/r/funny//"), RouteKind::ContentPage);
        assert_eq!(classify_path("/r/funny/top/"), RouteKind::ContentPage);
        assert_eq!(classify_path("/u/someone"), RouteKind::ContentPage);
        assert_eq!(classify_path("/user/someone/submitted"), RouteKind::ContentPage);
        assert_eq!(classify_path("/domain/example.com"), RouteKind::ContentPage);
        // prefix matched, no name
        assert_eq!(classify_path("/r/"), RouteKind::ContentPage);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify_path("/about"), RouteKind::Other);
        assert_eq!(classify_path("/"), RouteKind::Other);
        assert_eq!(classify_path(""), RouteKind::Other);
        assert_eq!(classify_path("/r"), RouteKind::Other);
        assert_eq!(classify_path("/rr/funny"), RouteKind::Other);
        // case is not folded
        assert_eq!(classify_path("/R/funny"), RouteKind::Other);
        assert_eq!(classify_path("r/funny"), RouteKind::Other);
    }

    #[test]
    fn test_display() {
        assert_eq!(RouteKind::SubredditRoot.to_string(), "subreddit-root");
        assert_eq!(RouteKind::ContentPage.to_string(), "content-page");
        assert_eq!(RouteKind::Other.to_string(), "other");
    }
}
