//! Page brightness classification.
//!
//! The classifier looks at the body background first, then the root element
//! background, and only falls back to theme hints when neither carries a
//! color.

use std::fmt;

use log::debug;

use crate::color::{RGB, parse_color};
use crate::error::Error;

/// Binary brightness decision for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeDecision {
    /// Near-white background.
    Light,
    /// Anything else, including "unknown".
    NotLight,
}

impl ThemeDecision {
    /// Whether this is [`ThemeDecision::Light`].
    #[must_use]
    pub fn is_light(self) -> bool {
        self == Self::Light
    }
}

impl From<bool> for ThemeDecision {
    fn from(light: bool) -> Self {
        if light { Self::Light } else { Self::NotLight }
    }
}

impl fmt::Display for ThemeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::NotLight => f.write_str("not-light"),
        }
    }
}

/// Explicit light-theme markers read from the page and the OS.
///
/// Any single marker is enough to flip the decision to light; there is no
/// precedence between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightHints {
    /// The root element carries the `light` class.
    pub root_class_light: bool,
    /// The body element carries the `light` class.
    pub body_class_light: bool,
    /// Value of the root element's `data-theme` attribute, if any.
    pub data_theme: Option<String>,
    /// The OS reports `prefers-color-scheme: light`.
    pub prefers_light: bool,
}

impl LightHints {
    /// Whether any hint indicates a light theme.
    #[must_use]
    pub fn indicates_light(&self) -> bool {
        self.root_class_light
            || self.body_class_light
            || self.data_theme.as_deref() == Some("light")
            || self.prefers_light
    }
}

/// The input that settled a [`ThemeDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The body background parsed.
    Primary(RGB),
    /// The body background carried no color, the root background did.
    Secondary(RGB),
    /// Neither background carried a color and a hint says light.
    LightHint,
}

impl Signal {
    /// The decision this signal leads to.
    #[must_use]
    pub fn decision(self) -> ThemeDecision {
        match self {
            Self::Primary(rgb) | Self::Secondary(rgb) => rgb.is_light().into(),
            Self::LightHint => ThemeDecision::Light,
        }
    }
}

/// Find the first signal that decides the page brightness.
///
/// # Arguments
///
/// * `primary` - computed background of the body element
/// * `secondary` - computed background of the root element
/// * `hints` - markers consulted only when neither sample parses
///
/// # Errors
///
/// Returns [`Error::NoSignalAvailable`] when neither sample parses and no hint
/// indicates a light theme.
pub fn decisive_signal(primary: &str, secondary: &str, hints: &LightHints) -> Result<Signal, Error> {
    if let Some(rgb) = parse_color(primary) {
        return Ok(Signal::Primary(rgb));
    }
    if let Some(rgb) = parse_color(secondary) {
        return Ok(Signal::Secondary(rgb));
    }
    if hints.indicates_light() {
        return Ok(Signal::LightHint);
    }
    Err(Error::NoSignalAvailable)
}

/// Classify a page from its two background samples and the fallback hints.
///
/// # Arguments
///
/// * `primary` - computed background of the body element
/// * `secondary` - computed background of the root element
/// * `hints` - markers consulted only when neither sample parses
///
/// # Returns
///
/// [`ThemeDecision::Light`] when the first usable sample is brighter than
/// [`crate::color::LIGHT_THRESHOLD`], or when no sample is usable and a hint
/// says light. Never fails: without any signal the page is
/// [`ThemeDecision::NotLight`].
#[must_use]
pub fn classify_theme(primary: &str, secondary: &str, hints: &LightHints) -> ThemeDecision {
    match decisive_signal(primary, secondary, hints) {
        Ok(signal) => {
            match signal {
                Signal::Primary(rgb) | Signal::Secondary(rgb) => {
                    debug!("{signal:?} brightness={}", rgb.brightness());
                }
                Signal::LightHint => debug!("no usable background color, hints={hints:?}"),
            }
            signal.decision()
        }
        Err(e) => {
            debug!("{e}, hints={hints:?}");
            ThemeDecision::NotLight
        }
    }
}
