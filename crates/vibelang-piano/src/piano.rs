//! Piano state and input handling
//!
//! [`Piano`] owns everything that changes while the keyboard is on screen:
//! which notes are held, whether the pointer button is down, and which key
//! the pointer is over. Input handlers return the note events they caused;
//! the caller forwards them to a [`NoteSink`](crate::output::NoteSink).
//!
//! Each note is either up or down. A down event for a held note and an up
//! event for a released note are ignored, as is everything while the piano
//! is disabled, so the sink never sees two note-ons or a stray note-off.

use crate::error::Result;
use crate::layout::{KeyGeometry, KeyboardLayout, LayoutConfig};
use crate::note::{self, NoteAttributes, NoteRange, PitchClass};
use crate::shortcuts::{ShortcutKey, ShortcutMap, HOME_ROW};
use std::collections::BTreeSet;

/// A note starting or stopping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    On(NoteAttributes),
    Off(NoteAttributes),
}

impl NoteEvent {
    pub fn attributes(&self) -> &NoteAttributes {
        match self {
            NoteEvent::On(attrs) | NoteEvent::Off(attrs) => attrs,
        }
    }

    pub fn midi_number(&self) -> u8 {
        self.attributes().midi_number
    }

    pub fn is_on(&self) -> bool {
        matches!(self, NoteEvent::On(_))
    }
}

/// Modifier keys held during a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Chords belong to the OS / terminal, never to the piano
    pub fn is_chord(&self) -> bool {
        self.control || self.meta || self.shift
    }
}

/// A computer key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub symbol: char,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(symbol: char) -> Self {
        Self {
            symbol,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Pointer event from a surface that reports coordinates rather than
/// enter/leave, already resolved to the key under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Button pressed
    Down(Option<u8>),
    /// Pointer moved or dragged
    Move(Option<u8>),
    /// Button released
    Up(Option<u8>),
}

/// Data handed to a label renderer for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLabel {
    pub midi_number: u8,
    pub note: String,
    pub basenote: PitchClass,
    pub is_black: bool,
    pub keyboard_shortcut: Option<char>,
}

/// Everything needed to build a [`Piano`]
#[derive(Debug, Clone)]
pub struct PianoConfig {
    /// First note shown, e.g. "c3"
    pub start_note: String,
    /// Last note shown (inclusive)
    pub end_note: String,
    /// Key geometry
    pub layout: LayoutConfig,
    /// Shortcut slots; `None` disables computer keyboard input
    pub keyboard_shortcuts: Option<Vec<ShortcutKey>>,
    /// Ignore all input and hide labels
    pub disabled: bool,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            start_note: "c3".to_string(),
            end_note: "f5".to_string(),
            layout: LayoutConfig::default(),
            keyboard_shortcuts: Some(HOME_ROW.to_vec()),
            disabled: false,
        }
    }
}

/// Pointer tracking shared by all keys of one piano
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Button held anywhere in the window, not just over a key
    pub is_down: bool,
    /// Key currently under the pointer
    pub hovered: Option<u8>,
}

/// An interactive piano keyboard
#[derive(Debug, Clone)]
pub struct Piano {
    layout: KeyboardLayout,
    shortcuts: Option<ShortcutMap>,
    keys_down: BTreeSet<u8>,
    pointer: PointerState,
    disabled: bool,
}

impl Piano {
    /// Build a piano, failing on bad note names, ranges or layout settings
    pub fn new(config: &PianoConfig) -> Result<Self> {
        let range = NoteRange::parse(&config.start_note, &config.end_note)?;
        let layout = KeyboardLayout::new(range, config.layout.clone())?;
        let shortcuts = config
            .keyboard_shortcuts
            .as_deref()
            .map(|keys| ShortcutMap::build(range, keys))
            .transpose()?;

        log::debug!(
            "Piano {}..={} with {} white keys, {} shortcuts",
            config.start_note,
            config.end_note,
            layout.white_key_count(),
            shortcuts.as_ref().map_or(0, |s| s.len())
        );

        Ok(Self {
            layout,
            shortcuts,
            keys_down: BTreeSet::new(),
            pointer: PointerState::default(),
            disabled: config.disabled,
        })
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn range(&self) -> NoteRange {
        self.layout.range()
    }

    /// Shortcut bindings, if keyboard input is enabled
    pub fn shortcuts(&self) -> Option<&ShortcutMap> {
        self.shortcuts.as_ref()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable the piano
    ///
    /// Disabling first releases every held note, so the returned note-offs
    /// are the last events until the piano is enabled again.
    pub fn set_disabled(&mut self, disabled: bool) -> Vec<NoteEvent> {
        let released = if disabled { self.release_all() } else { Vec::new() };
        self.disabled = disabled;
        released
    }

    pub fn is_note_down(&self, midi: u8) -> bool {
        self.keys_down.contains(&midi)
    }

    /// Held notes in ascending order
    pub fn notes_down(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys_down.iter().copied()
    }

    /// Current geometry of a key, pressed height included
    pub fn geometry(&self, midi: u8) -> KeyGeometry {
        self.layout.geometry(midi, self.is_note_down(midi))
    }

    /// Start a note
    pub fn note_down(&mut self, midi: u8) -> Option<NoteEvent> {
        if self.disabled || !self.range().contains(midi) {
            return None;
        }
        if !self.keys_down.insert(midi) {
            log::trace!("Ignoring repeated note down for {}", note::note_name(midi));
            return None;
        }
        let attrs = NoteAttributes::from_midi(midi);
        log::debug!("Note on: {}", attrs.note);
        Some(NoteEvent::On(attrs))
    }

    /// Stop a note
    pub fn note_up(&mut self, midi: u8) -> Option<NoteEvent> {
        if self.disabled || !self.keys_down.remove(&midi) {
            return None;
        }
        let attrs = NoteAttributes::from_midi(midi);
        log::debug!("Note off: {}", attrs.note);
        Some(NoteEvent::Off(attrs))
    }

    /// Stop every held note
    pub fn release_all(&mut self) -> Vec<NoteEvent> {
        let held: Vec<u8> = self.notes_down().collect();
        held.into_iter().filter_map(|midi| self.note_up(midi)).collect()
    }

    /// Pointer button pressed anywhere in the window
    pub fn pointer_pressed(&mut self) {
        self.pointer.is_down = true;
    }

    /// Pointer button released anywhere in the window
    pub fn pointer_released(&mut self) {
        self.pointer.is_down = false;
    }

    /// Pointer button pressed on a key
    pub fn pointer_down_on(&mut self, midi: u8) -> Option<NoteEvent> {
        self.note_down(midi)
    }

    /// Pointer button released on a key
    pub fn pointer_up_on(&mut self, midi: u8) -> Option<NoteEvent> {
        self.note_up(midi)
    }

    /// Pointer entered a key; plays it when dragging across keys
    pub fn pointer_enter(&mut self, midi: u8) -> Option<NoteEvent> {
        self.pointer.hovered = Some(midi);
        if self.pointer.is_down {
            self.note_down(midi)
        } else {
            None
        }
    }

    /// Pointer left a key; releases it when dragging across keys
    pub fn pointer_leave(&mut self, midi: u8) -> Option<NoteEvent> {
        if self.pointer.hovered == Some(midi) {
            self.pointer.hovered = None;
        }
        if self.pointer.is_down {
            self.note_up(midi)
        } else {
            None
        }
    }

    /// Pointer now over `target`; emits the leave/enter transitions
    pub fn pointer_moved(&mut self, target: Option<u8>) -> Vec<NoteEvent> {
        let previous = self.pointer.hovered;
        if previous == target {
            return Vec::new();
        }
        let mut events = Vec::new();
        if let Some(old) = previous {
            events.extend(self.pointer_leave(old));
        }
        if let Some(new) = target {
            events.extend(self.pointer_enter(new));
        }
        events
    }

    /// Feed a coordinate-based pointer event
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<NoteEvent> {
        match event {
            PointerEvent::Down(target) => {
                let mut events = self.pointer_moved(target);
                events.extend(target.and_then(|midi| self.pointer_down_on(midi)));
                self.pointer_pressed();
                events
            }
            PointerEvent::Move(target) => self.pointer_moved(target),
            PointerEvent::Up(target) => {
                let mut events: Vec<NoteEvent> =
                    target.and_then(|midi| self.pointer_up_on(midi)).into_iter().collect();
                self.pointer_released();
                events.extend(self.pointer_moved(target));
                events
            }
        }
    }

    pub fn touch_start(&mut self, midi: u8) -> Option<NoteEvent> {
        self.note_down(midi)
    }

    pub fn touch_end(&mut self, midi: u8) -> Option<NoteEvent> {
        self.note_up(midi)
    }

    pub fn touch_cancel(&mut self, midi: u8) -> Option<NoteEvent> {
        self.note_up(midi)
    }

    /// Note bound to a key event, unless it is a modifier chord
    fn note_for_input(&self, input: KeyInput) -> Option<u8> {
        let shortcuts = self.shortcuts.as_ref()?;
        if input.modifiers.is_chord() {
            log::debug!("Ignoring modified key {:?}", input);
            return None;
        }
        shortcuts.note_for_shortcut(input.symbol)
    }

    /// Computer key pressed
    pub fn key_pressed(&mut self, input: KeyInput) -> Option<NoteEvent> {
        let midi = self.note_for_input(input)?;
        self.note_down(midi)
    }

    /// Computer key released
    pub fn key_released(&mut self, input: KeyInput) -> Option<NoteEvent> {
        let midi = self.note_for_input(input)?;
        self.note_up(midi)
    }

    /// Label data for a key; `None` while disabled
    pub fn key_label(&self, midi: u8) -> Option<KeyLabel> {
        if self.disabled {
            return None;
        }
        let attrs = NoteAttributes::from_midi(midi);
        Some(KeyLabel {
            midi_number: midi,
            note: attrs.note,
            basenote: attrs.basenote,
            is_black: attrs.is_accidental,
            keyboard_shortcut: self.shortcuts.as_ref().and_then(|s| s.shortcut_for_note(midi)),
        })
    }
}
