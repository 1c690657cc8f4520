//! Reclassification triggers and the toolbar dispatcher.
//!
//! Lifecycle events (startup, tab switch, window focus, ...) and page-side
//! notifications all funnel into one [`Dispatcher`], which samples the active
//! page, runs the classifier and forwards the decision to an [`IconSink`].
//! Page-side observers talk to it through a one-way [`ThemePort`]; the
//! dispatcher hands a port to each newly focused page so those observers get
//! attached. Startup, install and settings changes also refresh the popup
//! state through a [`PopupSink`].

use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, warn};

use crate::config::{PopupMode, SettingsSource};
use crate::icon::IconSet;
use crate::theme::{LightHints, ThemeDecision, classify_theme};

/// URL prefixes of pages that cannot be introspected.
const INTERNAL_PREFIXES: [&str; 3] = ["chrome://", "chrome-extension://", "moz-extension://"];

/// Events that may change what the toolbar should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Browser started.
    Startup,
    /// Extension installed or updated.
    Installed,
    /// The user switched tabs.
    TabActivated,
    /// Window focus moved.
    WindowFocusChanged,
    /// The page's theme classes or the OS color scheme changed.
    ThemeChanged,
    /// Stored settings changed.
    StorageChanged,
}

impl Trigger {
    /// Every trigger source.
    pub const ALL: [Self; 6] = [
        Self::Startup,
        Self::Installed,
        Self::TabActivated,
        Self::WindowFocusChanged,
        Self::ThemeChanged,
        Self::StorageChanged,
    ];

    /// Whether this trigger asks for the icon to be recomputed.
    #[must_use]
    pub fn reclassifies(self) -> bool {
        !matches!(self, Self::StorageChanged)
    }

    /// Whether this trigger asks for the popup state to be re-read.
    #[must_use]
    pub fn refreshes_popup(self) -> bool {
        matches!(self, Self::Startup | Self::Installed | Self::StorageChanged)
    }

    /// Whether the active page may be new and needs theme observers attached.
    #[must_use]
    pub fn attaches_observers(self) -> bool {
        matches!(
            self,
            Self::Startup | Self::Installed | Self::TabActivated | Self::WindowFocusChanged
        )
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Startup => "startup",
            Self::Installed => "installed",
            Self::TabActivated => "tab-activated",
            Self::WindowFocusChanged => "window-focus-changed",
            Self::ThemeChanged => "theme-changed",
            Self::StorageChanged => "storage-changed",
        };
        f.write_str(name)
    }
}

/// The set of trigger sources the dispatcher listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRegistry {
    enabled: HashSet<Trigger>,
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self {
            enabled: Trigger::ALL.into_iter().collect(),
        }
    }
}

impl TriggerRegistry {
    /// A registry with no sources enabled.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            enabled: HashSet::new(),
        }
    }

    /// Enable `trigger`.
    pub fn register(&mut self, trigger: Trigger) -> &mut Self {
        self.enabled.insert(trigger);
        self
    }

    /// Disable `trigger`.
    pub fn unregister(&mut self, trigger: Trigger) -> &mut Self {
        self.enabled.remove(&trigger);
        self
    }

    /// Whether `trigger` is enabled.
    #[must_use]
    pub fn accepts(&self, trigger: Trigger) -> bool {
        self.enabled.contains(&trigger)
    }
}

/// Sending half of the page-to-background channel.
#[derive(Debug, Clone)]
pub struct ThemePort {
    tx: Sender<Trigger>,
}

impl ThemePort {
    /// Notify the background side. Returns `false` once the receiver is gone.
    pub fn notify(&self, trigger: Trigger) -> bool {
        self.tx.send(trigger).is_ok()
    }
}

/// Receiving half of the page-to-background channel.
#[derive(Debug)]
pub struct ThemeReceiver {
    rx: Receiver<Trigger>,
}

/// Create a connected port/receiver pair.
#[must_use]
pub fn channel() -> (ThemePort, ThemeReceiver) {
    let (tx, rx) = mpsc::channel();
    (ThemePort { tx }, ThemeReceiver { rx })
}

/// Snapshot of the active page, as collected by page introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSample {
    /// URL of the active tab.
    pub url: String,
    /// Computed background of the body element.
    pub body_background: String,
    /// Computed background of the root element.
    pub root_background: String,
    /// Fallback light-theme markers.
    pub hints: LightHints,
}

/// Page introspection collaborator.
pub trait PageSampler {
    /// Sample the active page, or `None` if there is no active tab.
    ///
    /// # Errors
    ///
    /// Returns an error when the page could not be introspected.
    fn sample(&mut self) -> anyhow::Result<Option<PageSample>>;

    /// Attach theme observers to the active page.
    ///
    /// The page side should send [`Trigger::ThemeChanged`] on `port` whenever
    /// its theme classes, `data-theme` attribute or the OS color scheme change.
    ///
    /// # Errors
    ///
    /// Returns an error when the observers could not be installed.
    fn observe(&mut self, port: ThemePort) -> anyhow::Result<()>;
}

/// Icon-setting collaborator.
pub trait IconSink {
    /// Show `icon` in the toolbar.
    fn set_icon(&mut self, icon: &IconSet);
}

/// Popup-setting collaborator.
pub trait PopupSink {
    /// Make the toolbar icon open the settings popup or redirect directly.
    fn set_popup(&mut self, mode: PopupMode);
}

/// Whether a page can be introspected at all.
#[must_use]
pub fn is_introspectable(url: &str) -> bool {
    !INTERNAL_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

struct PopupBinding {
    settings: Box<dyn SettingsSource>,
    sink: Box<dyn PopupSink>,
}

/// Routes trigger signals to the classifier and the toolbar collaborators.
pub struct Dispatcher<S, I> {
    registry: TriggerRegistry,
    sampler: S,
    sink: I,
    popup: Option<PopupBinding>,
    port: Option<ThemePort>,
    last: Option<ThemeDecision>,
}

impl<S: PageSampler, I: IconSink> Dispatcher<S, I> {
    /// Create a dispatcher listening to every trigger source.
    pub fn new(sampler: S, sink: I) -> Self {
        Self::with_registry(TriggerRegistry::default(), sampler, sink)
    }

    /// Create a dispatcher listening to the sources in `registry`.
    pub fn with_registry(registry: TriggerRegistry, sampler: S, sink: I) -> Self {
        Self {
            registry,
            sampler,
            sink,
            popup: None,
            port: None,
            last: None,
        }
    }

    /// Refresh the popup state from `settings` on startup, install and
    /// settings changes.
    #[must_use]
    pub fn with_popup(
        mut self,
        settings: impl SettingsSource + 'static,
        sink: impl PopupSink + 'static,
    ) -> Self {
        self.popup = Some(PopupBinding {
            settings: Box::new(settings),
            sink: Box::new(sink),
        });
        self
    }

    /// Hand `port` to every newly focused page so it can report theme changes.
    #[must_use]
    pub fn with_port(mut self, port: ThemePort) -> Self {
        self.port = Some(port);
        self
    }

    /// The icon sink.
    #[must_use]
    pub fn sink(&self) -> &I {
        &self.sink
    }

    /// The page sampler.
    #[must_use]
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Last decision forwarded to the sink.
    #[must_use]
    pub fn last_decision(&self) -> Option<ThemeDecision> {
        self.last
    }

    /// Handle one trigger.
    ///
    /// # Returns
    ///
    /// The decision sent to the icon sink, or `None` if the trigger was
    /// ignored, does not reclassify, the page was skipped, or the icon was
    /// already up to date.
    pub fn handle(&mut self, trigger: Trigger) -> Option<ThemeDecision> {
        if !self.registry.accepts(trigger) {
            debug!("ignoring {trigger}");
            return None;
        }

        if trigger.refreshes_popup() {
            self.refresh_popup(trigger);
        }
        if !trigger.reclassifies() {
            return None;
        }

        let page = match self.sampler.sample() {
            Ok(Some(page)) => page,
            Ok(None) => {
                debug!("{trigger}: no active tab");
                return None;
            }
            Err(e) => {
                warn!("Error updating icon: {e:#}");
                return None;
            }
        };

        if !is_introspectable(&page.url) {
            debug!("{trigger}: skipping internal page {}", page.url);
            return None;
        }

        if trigger.attaches_observers() {
            self.attach_observers(trigger);
        }

        let decision = classify_theme(&page.body_background, &page.root_background, &page.hints);
        debug!("{trigger}: url={} decision={decision}", page.url);
        if self.last == Some(decision) {
            return None;
        }

        self.sink.set_icon(&IconSet::for_decision(decision));
        self.last = Some(decision);
        Some(decision)
    }

    /// Handle every signal currently queued on `receiver`.
    ///
    /// # Returns
    ///
    /// The number of icon updates made.
    pub fn drain(&mut self, receiver: &ThemeReceiver) -> usize {
        receiver
            .rx
            .try_iter()
            .filter_map(|trigger| self.handle(trigger))
            .count()
    }

    fn refresh_popup(&mut self, trigger: Trigger) {
        let Some(popup) = self.popup.as_mut() else {
            debug!("{trigger}: no popup sink");
            return;
        };
        match popup.settings.read() {
            Ok(settings) => {
                let mode = settings.popup_mode();
                debug!("{trigger}: popup={mode:?}");
                popup.sink.set_popup(mode);
            }
            Err(e) => warn!("Error reading settings: {e:#}"),
        }
    }

    fn attach_observers(&mut self, trigger: Trigger) {
        let Some(port) = &self.port else {
            return;
        };
        debug!("{trigger}: attaching theme observers");
        if let Err(e) = self.sampler.observe(port.clone()) {
            warn!("Error setting up theme listener: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use crate::config::Settings;
    use crate::icon::{DARK_ICON, LIGHT_ICON};

    /// Replays queued samples; `None` entries simulate introspection failures.
    #[derive(Default)]
    struct ScriptedSampler {
        pages: VecDeque<Option<PageSample>>,
        ports: Vec<ThemePort>,
    }

    impl ScriptedSampler {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.push_back(Some(PageSample {
                url: url.into(),
                body_background: body.into(),
                ..PageSample::default()
            }));
            self
        }

        fn failure(mut self) -> Self {
            self.pages.push_back(None);
            self
        }
    }

    impl PageSampler for ScriptedSampler {
        fn sample(&mut self) -> anyhow::Result<Option<PageSample>> {
            match self.pages.pop_front() {
                Some(Some(page)) => Ok(Some(page)),
                Some(None) => Err(anyhow!("cannot access contents of the page")),
                None => Ok(None),
            }
        }

        fn observe(&mut self, port: ThemePort) -> anyhow::Result<()> {
            self.ports.push(port);
            Ok(())
        }
    }

    /// Fails the test if the page is ever touched.
    struct UntouchedSampler;

    impl PageSampler for UntouchedSampler {
        fn sample(&mut self) -> anyhow::Result<Option<PageSample>> {
            panic!("page sampled");
        }

        fn observe(&mut self, _port: ThemePort) -> anyhow::Result<()> {
            panic!("observers attached");
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        icons: Vec<&'static str>,
    }

    impl IconSink for RecordingSink {
        fn set_icon(&mut self, icon: &IconSet) {
            self.icons.push(icon.path());
        }
    }

    /// Settings shared with the test so they can change between triggers.
    #[derive(Clone, Default)]
    struct SharedSettings(Rc<RefCell<Settings>>);

    impl SettingsSource for SharedSettings {
        fn read(&mut self) -> anyhow::Result<Settings> {
            Ok(self.0.borrow().clone())
        }
    }

    struct BrokenSettings;

    impl SettingsSource for BrokenSettings {
        fn read(&mut self) -> anyhow::Result<Settings> {
            Err(anyhow!("storage unavailable"))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPopup(Rc<RefCell<Vec<PopupMode>>>);

    impl PopupSink for RecordingPopup {
        fn set_popup(&mut self, mode: PopupMode) {
            self.0.borrow_mut().push(mode);
        }
    }

    #[test]
    fn test_is_introspectable() {
        assert!(is_introspectable("https://www.reddit.com/r/rust"));
        assert!(!is_introspectable("chrome://extensions"));
        assert!(!is_introspectable("chrome-extension://abc/popup.html"));
        assert!(!is_introspectable("moz-extension://abc/popup.html"));
    }

    #[test]
    fn test_dispatch_sets_icon() {
        let sampler = ScriptedSampler::default()
            .page("https://www.reddit.com/", "rgb(255, 255, 255)")
            .page("https://www.reddit.com/", "rgb(26, 26, 27)");
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default());

        assert_eq!(dispatcher.handle(Trigger::Startup), Some(ThemeDecision::Light));
        assert_eq!(dispatcher.handle(Trigger::TabActivated), Some(ThemeDecision::NotLight));
        assert_eq!(dispatcher.sink().icons, vec![DARK_ICON, LIGHT_ICON]);
        assert_eq!(dispatcher.last_decision(), Some(ThemeDecision::NotLight));
    }

    #[test]
    fn test_unchanged_decision_is_not_resent() {
        let sampler = ScriptedSampler::default()
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/r/rust", "rgb(250, 250, 250)");
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default());

        assert_eq!(dispatcher.handle(Trigger::WindowFocusChanged), Some(ThemeDecision::Light));
        assert_eq!(dispatcher.handle(Trigger::ThemeChanged), None);
        assert_eq!(dispatcher.sink().icons, vec![DARK_ICON]);
    }

    #[test]
    fn test_internal_pages_and_failures_are_skipped() {
        let (port, _receiver) = channel();
        let sampler = ScriptedSampler::default()
            .page("chrome://newtab", "#ffffff")
            .failure();
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default()).with_port(port);

        assert_eq!(dispatcher.handle(Trigger::TabActivated), None);
        assert_eq!(dispatcher.handle(Trigger::TabActivated), None);
        // sampler exhausted: no active tab
        assert_eq!(dispatcher.handle(Trigger::TabActivated), None);
        assert!(dispatcher.sink().icons.is_empty());
        assert!(dispatcher.sampler().ports.is_empty());
    }

    #[test]
    fn test_registry_filters_triggers() {
        let mut registry = TriggerRegistry::empty();
        registry.register(Trigger::ThemeChanged).register(Trigger::StorageChanged);
        assert!(registry.accepts(Trigger::ThemeChanged));
        assert!(!registry.accepts(Trigger::Startup));

        let sampler = ScriptedSampler::default().page("https://www.reddit.com/", "#ffffff");
        let mut dispatcher = Dispatcher::with_registry(registry, sampler, RecordingSink::default());

        assert_eq!(dispatcher.handle(Trigger::Startup), None);
        // accepted, but storage changes never reclassify
        assert_eq!(dispatcher.handle(Trigger::StorageChanged), None);
        assert_eq!(dispatcher.handle(Trigger::ThemeChanged), Some(ThemeDecision::Light));
    }

    #[test]
    fn test_unregister() {
        let mut registry = TriggerRegistry::default();
        registry.unregister(Trigger::WindowFocusChanged);
        assert!(!registry.accepts(Trigger::WindowFocusChanged));
        assert!(registry.accepts(Trigger::TabActivated));
    }

    #[test]
    fn test_storage_change_refreshes_popup_without_sampling() {
        let settings = SharedSettings::default();
        let popup = RecordingPopup::default();
        let mut dispatcher = Dispatcher::new(UntouchedSampler, RecordingSink::default())
            .with_popup(settings.clone(), popup.clone());

        assert_eq!(dispatcher.handle(Trigger::StorageChanged), None);
        settings.0.borrow_mut().base_url = Some("https://redditpx.com".into());
        assert_eq!(dispatcher.handle(Trigger::StorageChanged), None);
        settings.0.borrow_mut().base_url = None;
        assert_eq!(dispatcher.handle(Trigger::StorageChanged), None);

        assert_eq!(
            *popup.0.borrow(),
            vec![PopupMode::Settings, PopupMode::Direct, PopupMode::Settings]
        );
        assert!(dispatcher.sink().icons.is_empty());
    }

    #[test]
    fn test_startup_and_install_refresh_popup() {
        let settings = SharedSettings::default();
        settings.0.borrow_mut().base_url = Some("https://redditpx.com".into());
        let popup = RecordingPopup::default();
        let sampler = ScriptedSampler::default()
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff");
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default())
            .with_popup(settings, popup.clone());

        dispatcher.handle(Trigger::Startup);
        dispatcher.handle(Trigger::Installed);
        dispatcher.handle(Trigger::TabActivated);
        dispatcher.handle(Trigger::ThemeChanged);

        assert_eq!(*popup.0.borrow(), vec![PopupMode::Direct, PopupMode::Direct]);
    }

    #[test]
    fn test_unreadable_settings_leave_popup_alone() {
        let popup = RecordingPopup::default();
        let mut dispatcher = Dispatcher::new(UntouchedSampler, RecordingSink::default())
            .with_popup(BrokenSettings, popup.clone());

        assert_eq!(dispatcher.handle(Trigger::StorageChanged), None);
        assert!(popup.0.borrow().is_empty());
    }

    #[test]
    fn test_new_pages_get_observers() {
        let (port, receiver) = channel();
        let sampler = ScriptedSampler::default()
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#000000");
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default()).with_port(port);

        for trigger in [
            Trigger::Startup,
            Trigger::Installed,
            Trigger::TabActivated,
            Trigger::WindowFocusChanged,
        ] {
            dispatcher.handle(trigger);
        }
        assert_eq!(dispatcher.sampler().ports.len(), 4);

        // the page reports a theme change through the port it was given
        assert!(dispatcher.sampler().ports[0].notify(Trigger::ThemeChanged));
        assert_eq!(dispatcher.drain(&receiver), 1);
        assert_eq!(dispatcher.last_decision(), Some(ThemeDecision::NotLight));
        // theme changes come from an already observed page
        assert_eq!(dispatcher.sampler().ports.len(), 4);
    }

    #[test]
    fn test_port_drain() {
        let (port, receiver) = channel();
        let sampler = ScriptedSampler::default()
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#ffffff")
            .page("https://www.reddit.com/", "#000000");
        let mut dispatcher = Dispatcher::new(sampler, RecordingSink::default());

        let page_side = port.clone();
        std::thread::spawn(move || {
            assert!(page_side.notify(Trigger::ThemeChanged));
            assert!(page_side.notify(Trigger::ThemeChanged));
        })
        .join()
        .expect("page-side thread panicked");
        assert!(port.notify(Trigger::ThemeChanged));

        assert_eq!(dispatcher.drain(&receiver), 2);
        assert_eq!(dispatcher.sink().icons, vec![DARK_ICON, LIGHT_ICON]);

        drop(receiver);
        assert!(!port.notify(Trigger::ThemeChanged));
    }

    #[test]
    fn test_trigger_roles() {
        assert_eq!(Trigger::WindowFocusChanged.to_string(), "window-focus-changed");
        assert!(Trigger::ALL.iter().filter(|t| !t.reclassifies()).eq([&Trigger::StorageChanged]));
        // every trigger does something
        assert!(
            Trigger::ALL
                .iter()
                .all(|t| t.reclassifies() || t.refreshes_popup())
        );
        assert!(!Trigger::ThemeChanged.attaches_observers());
        assert!(!Trigger::StorageChanged.attaches_observers());
    }
}
