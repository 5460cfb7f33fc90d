//! Error types for vibelang-piano

use thiserror::Error;

/// Result type alias for vibelang-piano operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vibelang-piano
///
/// Everything here is a configuration problem detected while building a
/// piano. Mismatched input events (up without down, down while down) are
/// not errors and never surface as one.
#[derive(Debug, Error)]
pub enum Error {
    /// Note name could not be parsed (e.g. "h4", "c", "c#x")
    #[error("Invalid note name: {0:?}")]
    InvalidNote(String),

    /// Note parsed but lies outside the playable MIDI range
    #[error("Note {name:?} (MIDI {midi}) is outside the supported range C0..=G9")]
    NoteOutOfRange { name: String, midi: i32 },

    /// End note is below the start note
    #[error("Empty note range: {start} > {end}")]
    EmptyRange { start: String, end: String },

    /// The range contains only black keys, so white key width is undefined
    #[error("Note range {start}..={end} contains no natural (white) keys")]
    NoNaturalKeys { start: String, end: String },

    /// Keyboard shortcuts were enabled with an empty key list
    #[error("Keyboard shortcut list is empty")]
    NoShortcutKeys,

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
