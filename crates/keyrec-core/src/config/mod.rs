// Keyrec Config API
// Recorder configuration files and combo-string parsing

pub mod combo_parser;
pub mod parser;

pub use combo_parser::{parse_combo_string, ComboParseError};
pub use parser::{ConfigError, RecorderConfig, ShortcutEntry};
