//! vibelang-piano - Interactive piano keyboard for VibeLang
//!
//! Lays out the keys of a note range, maps pointer, touch and computer
//! keyboard input to note events, and tracks which keys are held.
//! Features include:
//!
//! - Realistic key geometry (black keys placed per pitch class, not evenly)
//! - Drag across keys to play a glissando
//! - Computer keyboard shortcuts (home row, bottom row, QWERTY row or custom)
//! - A ratatui widget and the `vibe-piano` terminal app
//! - Configurable via TOML file
//!
//! Sound is not part of this crate: note events go to whatever implements
//! [`NoteSink`].
//!
//! # Usage as a Library
//!
//! ```no_run
//! use vibelang_piano::{KeyInput, NoteSink, Piano, PianoConfig};
//!
//! // Create a piano with the default range and home row shortcuts
//! let mut piano = Piano::new(&PianoConfig::default())?;
//!
//! // Or load from config file
//! let config = vibelang_piano::Config::load_or_default();
//! let mut piano = Piano::new(&config.to_piano_config()?)?;
//!
//! // Feed input, forward the resulting events to a sound engine
//! let mut sink = vibelang_piano::LogSink::default();
//! if let Some(event) = piano.key_pressed(KeyInput::new('a')) {
//!     sink.send(&event);
//! }
//! # Ok::<(), vibelang_piano::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod note;
pub mod output;
pub mod piano;
pub mod session;
pub mod shortcuts;
pub mod ui;

// Re-export main types
pub use config::{Config, ShortcutPreset, Theme};
pub use error::{Error, Result};
pub use layout::{KeyGeometry, KeyShape, KeyboardLayout, LayoutConfig, NoteShapeConfig};
pub use note::{parse_note, NoteAttributes, NoteRange, PitchClass};
pub use output::{LogSink, NoteSink};
pub use piano::{KeyInput, KeyLabel, Modifiers, NoteEvent, Piano, PianoConfig, PointerEvent};
pub use session::TerminalSession;
pub use shortcuts::{ShortcutKey, ShortcutMap, BOTTOM_ROW, HOME_ROW, QWERTY_ROW};
pub use ui::{key_at, render_piano_standalone, KeyboardWidget};
