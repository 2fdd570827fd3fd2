// Keyrec Recording State Machine
// Tracks held keys during a recording session and finalizes shortcuts

use std::fmt;

use crate::action::KeyEvent;
use crate::error::{format_error, ErrorKind, ErrorParams, RecorderError};
use crate::modifier::{classify, KeyClass, ModifierName, ModifierSet};
use crate::policy::{ExclusionPolicy, PolicyOptions};
use crate::shortcut::Shortcut;
use crate::Key;

/// Callback invoked with the finalized shortcut
pub type ChangeCallback = Box<dyn FnMut(&Shortcut)>;

/// Platform capability resolved once at construction.
///
/// On the Mac-class platform the release of the paired OS-level key is not
/// reliably delivered while Meta is held, so releasing Meta finalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        Self::from_mac_flag(cfg!(target_os = "macos"))
    }

    pub fn from_mac_flag(is_mac: bool) -> Self {
        if is_mac {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    pub fn is_mac(self) -> bool {
        self == Platform::Mac
    }
}

/// Recorder lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// Shortcut recording state machine.
///
/// Owns the held-modifier set and the single held trigger key of one
/// recording session. All transitions happen synchronously inside the
/// method that receives the signal.
pub struct ShortcutRecorder {
    policy: ExclusionPolicy,
    platform: Platform,
    on_change: Option<ChangeCallback>,
    state: RecorderState,
    modifiers: ModifierSet,
    trigger: Option<Key>,
    shortcut: Shortcut,
    saved: Shortcut,
    error: RecorderError,
}

impl ShortcutRecorder {
    /// Create an idle recorder with a compiled policy
    pub fn new(policy: ExclusionPolicy, platform: Platform) -> Self {
        Self {
            policy,
            platform,
            on_change: None,
            state: RecorderState::Idle,
            modifiers: ModifierSet::new(),
            trigger: None,
            shortcut: Shortcut::new(),
            saved: Shortcut::new(),
            error: RecorderError::none(),
        }
    }

    /// Compile raw options and create an idle recorder
    pub fn with_options(options: &PolicyOptions, platform: Platform) -> Self {
        Self::new(ExclusionPolicy::compile(options), platform)
    }

    /// Install the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Shortcut) + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Enter Recording with a clean slate
    pub fn start_recording(&mut self) {
        log::debug!("Recording started");
        self.state = RecorderState::Recording;
        self.error = RecorderError::none();
        self.reset_recording();
    }

    /// Force back to Idle, discarding any unfinalized attempt
    pub fn stop_recording(&mut self) {
        if self.state == RecorderState::Recording {
            log::debug!("Recording stopped");
        }
        self.state = RecorderState::Idle;
        self.error = RecorderError::none();
        self.reset_recording();
    }

    /// Clear held keys and the in-progress shortcut, keeping the state
    pub fn reset_recording(&mut self) {
        self.modifiers.clear();
        self.trigger = None;
        self.shortcut = Shortcut::new();
    }

    /// Stop recording, forget the saved shortcut and notify with an empty one
    pub fn clear_last_recording(&mut self) {
        self.stop_recording();
        self.saved = Shortcut::new();
        log::debug!("Saved shortcut cleared");
        self.notify(&Shortcut::new());
    }

    /// Dispatch one key event
    pub fn handle_event(&mut self, event: &KeyEvent) {
        if event.action.is_pressed() {
            self.on_press(&event.key);
        } else {
            self.on_release(&event.key);
        }
    }

    /// Feed a key-down signal
    pub fn on_press(&mut self, key: &Key) {
        if !self.is_recording() {
            return;
        }
        log::trace!("press {}", key);

        if key.is_escape() {
            log::debug!("Escape pressed, cancelling recording");
            self.stop_recording();
            return;
        }

        match classify(key) {
            KeyClass::Modifier(modifier) => self.press_modifier(modifier),
            KeyClass::Trigger(key) => self.press_trigger(key),
        }
        self.refresh_shortcut();
    }

    fn press_modifier(&mut self, modifier: ModifierName) {
        if self.policy.is_mod_excluded(modifier) {
            self.set_error(
                ErrorKind::ModKeyNotAllowed,
                ErrorParams::mod_key(modifier.as_str()),
            );
            return;
        }
        // Auto-repeat of a held modifier
        if self.modifiers.contains(modifier) {
            return;
        }
        if self.modifiers.len() + 1 > self.policy.max_mod_keys() {
            self.set_error(
                ErrorKind::MaxModKeysExceeded,
                ErrorParams::max_mod_keys(self.policy.max_mod_keys()),
            );
            return;
        }
        self.modifiers.insert(modifier);
    }

    fn press_trigger(&mut self, key: Key) {
        if self.policy.is_key_excluded(&key) {
            self.set_error(ErrorKind::KeyNotAllowed, ErrorParams::keycode(key.as_str()));
            return;
        }
        // Last pressed wins
        self.trigger = Some(key);
    }

    /// Feed a key-up signal
    pub fn on_release(&mut self, key: &Key) {
        if !self.is_recording() || key.is_escape() {
            return;
        }
        log::trace!("release {}", key);

        match classify(key) {
            KeyClass::Modifier(modifier) => {
                // Excluded or rejected modifiers never entered the set
                if self.modifiers.contains(modifier) {
                    if self.platform.is_mac()
                        && modifier == ModifierName::Meta
                        && self.trigger.is_some()
                    {
                        log::debug!("Meta released on Mac, finalizing");
                        self.finalize();
                        return;
                    }
                    self.modifiers.remove(modifier);
                    self.refresh_shortcut();
                }
                if self.trigger.is_none() {
                    self.complete_or_reset();
                }
            }
            KeyClass::Trigger(key) => {
                // Only the current trigger, or any key when none is set
                if matches!(&self.trigger, Some(held) if *held != key) {
                    return;
                }
                self.complete_or_reset();
            }
        }
    }

    fn complete_or_reset(&mut self) {
        if self.shortcut.is_empty() {
            self.reset_recording();
        } else {
            self.finalize();
        }
    }

    /// Validate the in-progress shortcut. First violated rule wins.
    pub fn validate(&self) -> Result<Shortcut, RecorderError> {
        let count = self.modifiers.len();
        let min = self.policy.min_mod_keys();
        let max = self.policy.max_mod_keys();

        if count < min {
            return Err(format_error(
                ErrorKind::MinModKeysRequired,
                &ErrorParams::min_mod_keys(min),
            ));
        }
        if count > max {
            return Err(format_error(
                ErrorKind::MaxModKeysExceeded,
                &ErrorParams::max_mod_keys(max),
            ));
        }

        let shortcut = Shortcut::order(self.trigger.as_ref(), &self.modifiers);
        let comparison_key = shortcut.comparison_key();
        if self.policy.is_shortcut_excluded(&comparison_key) {
            return Err(format_error(
                ErrorKind::ShortcutNotAllowed,
                &ErrorParams::shortcut(comparison_key),
            ));
        }
        if let Some(modifier) = self.modifiers.first_shared(self.policy.excluded_mods()) {
            return Err(format_error(
                ErrorKind::ModKeyNotAllowed,
                &ErrorParams::mod_key(modifier.as_str()),
            ));
        }
        if self.trigger.is_none() {
            return Err(format_error(ErrorKind::KeyNotAllowed, &ErrorParams::default()));
        }

        Ok(shortcut)
    }

    fn finalize(&mut self) {
        match self.validate() {
            Ok(shortcut) => {
                log::debug!("Shortcut recorded: {}", shortcut);
                self.saved = shortcut.clone();
                self.stop_recording();
                self.notify(&shortcut);
            }
            Err(error) => {
                log::debug!("Shortcut {} rejected: {}", self.shortcut, error.kind());
                self.reset_recording();
                self.error = error;
            }
        }
    }

    fn notify(&mut self, shortcut: &Shortcut) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(shortcut);
        }
    }

    fn set_error(&mut self, kind: ErrorKind, params: ErrorParams) {
        self.error = format_error(kind, &params);
        log::debug!("{}: {}", kind, self.error.message());
    }

    fn refresh_shortcut(&mut self) {
        self.shortcut = Shortcut::order(self.trigger.as_ref(), &self.modifiers);
    }

    /// In-progress shortcut
    pub fn shortcut(&self) -> &Shortcut {
        &self.shortcut
    }

    /// Last successfully finalized shortcut
    pub fn saved_shortcut(&self) -> &Shortcut {
        &self.saved
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn error(&self) -> &RecorderError {
        &self.error
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Currently held modifiers
    pub fn held_modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    /// Currently held trigger key
    pub fn held_trigger(&self) -> Option<&Key> {
        self.trigger.as_ref()
    }
}

impl Default for ShortcutRecorder {
    fn default() -> Self {
        Self::new(ExclusionPolicy::default(), Platform::current())
    }
}

impl fmt::Debug for ShortcutRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutRecorder")
            .field("state", &self.state)
            .field("platform", &self.platform)
            .field("shortcut", &self.shortcut)
            .field("saved", &self.saved)
            .field("error", &self.error)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
