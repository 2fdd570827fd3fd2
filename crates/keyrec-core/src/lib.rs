// Keyrec Core Library
// Keyboard shortcut recording: classification, policy, and the recorder

pub mod action;
pub mod config;
pub mod error;
pub mod key;
pub mod modifier;
pub mod policy;
pub mod recorder;
pub mod shortcut;
pub mod trace;

pub use action::{Action, KeyEvent};
pub use config::{parse_combo_string, ComboParseError, ConfigError, RecorderConfig};
pub use error::{format_error, ErrorKind, ErrorParams, RecorderError};
pub use key::{ascii_to_key, Key, KeyParseError, ESCAPE};
pub use modifier::{classify, KeyClass, ModifierName, ModifierSet};
pub use policy::{ExclusionPolicy, PolicyOptions};
pub use recorder::{ChangeCallback, Platform, RecorderState, ShortcutRecorder};
pub use shortcut::Shortcut;
pub use trace::{parse_trace, TraceError, TraceStep};
