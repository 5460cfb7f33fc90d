//! Computer keyboard shortcuts for piano keys
//!
//! A shortcut layout is an ordered list of slots, one per white key. Each
//! slot has a `natural` symbol for the white key and a `flat` symbol for
//! the black key just below it, so on the home row preset `s` plays D and
//! `w` (the key above and left of `s`) plays D flat.

use crate::error::{Error, Result};
use crate::note::{self, NoteRange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One shortcut slot: the symbol for a white key and for the black key
/// below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutKey {
    pub natural: char,
    pub flat: char,
}

impl ShortcutKey {
    pub const fn new(natural: char, flat: char) -> Self {
        Self { natural, flat }
    }
}

/// Home row layout
///
/// ```text
///   q w e r t y u i o p [      (flats)
///    a s d f g h j k l ; '     (naturals)
/// ```
pub const HOME_ROW: &[ShortcutKey] = &[
    ShortcutKey::new('a', 'q'),
    ShortcutKey::new('s', 'w'),
    ShortcutKey::new('d', 'e'),
    ShortcutKey::new('f', 'r'),
    ShortcutKey::new('g', 't'),
    ShortcutKey::new('h', 'y'),
    ShortcutKey::new('j', 'u'),
    ShortcutKey::new('k', 'i'),
    ShortcutKey::new('l', 'o'),
    ShortcutKey::new(';', 'p'),
    ShortcutKey::new('\'', '['),
];

/// Bottom row layout, flats on the home row
pub const BOTTOM_ROW: &[ShortcutKey] = &[
    ShortcutKey::new('z', 'a'),
    ShortcutKey::new('x', 's'),
    ShortcutKey::new('c', 'd'),
    ShortcutKey::new('v', 'f'),
    ShortcutKey::new('b', 'g'),
    ShortcutKey::new('n', 'h'),
    ShortcutKey::new('m', 'j'),
    ShortcutKey::new(',', 'k'),
    ShortcutKey::new('.', 'l'),
    ShortcutKey::new('/', ';'),
];

/// QWERTY row layout, flats on the number row
pub const QWERTY_ROW: &[ShortcutKey] = &[
    ShortcutKey::new('q', '1'),
    ShortcutKey::new('w', '2'),
    ShortcutKey::new('e', '3'),
    ShortcutKey::new('r', '4'),
    ShortcutKey::new('t', '5'),
    ShortcutKey::new('y', '6'),
    ShortcutKey::new('u', '7'),
    ShortcutKey::new('i', '8'),
    ShortcutKey::new('o', '9'),
    ShortcutKey::new('p', '0'),
    ShortcutKey::new('[', '-'),
    ShortcutKey::new(']', '='),
];

/// Bidirectional map between shortcut symbols and MIDI numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutMap {
    to_note: HashMap<char, u8>,
    to_key: HashMap<u8, char>,
}

impl ShortcutMap {
    /// Bind shortcut symbols to the notes of a range
    ///
    /// Notes are walked in ascending order. A white key takes the current
    /// slot's `natural` symbol and moves on to the next slot; a black key
    /// takes the current slot's `flat` symbol without moving. Binding stops
    /// once the slots run out; the remaining notes are only playable with
    /// the pointer.
    pub fn build(range: NoteRange, keys: &[ShortcutKey]) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::NoShortcutKeys);
        }

        let mut map = Self::default();
        let mut slot = 0;
        for midi in range.notes() {
            let key = &keys[slot];
            if note::is_accidental(midi) {
                map.bind(key.flat, midi);
            } else {
                map.bind(key.natural, midi);
                slot += 1;
                if slot >= keys.len() {
                    break;
                }
            }
        }
        Ok(map)
    }

    fn bind(&mut self, symbol: char, midi: u8) {
        let symbol = symbol.to_ascii_lowercase();
        // A symbol used twice in a layout keeps only its latest note
        if let Some(old) = self.to_note.insert(symbol, midi) {
            self.to_key.remove(&old);
        }
        self.to_key.insert(midi, symbol);
    }

    /// Note played by a shortcut symbol (case-insensitive)
    pub fn note_for_shortcut(&self, symbol: char) -> Option<u8> {
        self.to_note.get(&symbol.to_ascii_lowercase()).copied()
    }

    /// Symbol bound to a note
    pub fn shortcut_for_note(&self, midi: u8) -> Option<char> {
        self.to_key.get(&midi).copied()
    }

    pub fn len(&self) -> usize {
        self.to_note.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_note.is_empty()
    }

    /// All bindings sorted by note
    pub fn bindings(&self) -> Vec<(u8, char)> {
        let mut bindings: Vec<_> = self.to_key.iter().map(|(&n, &c)| (n, c)).collect();
        bindings.sort_unstable();
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octave_layout() -> Vec<ShortcutKey> {
        HOME_ROW[..8].to_vec()
    }

    #[test]
    fn test_home_row_bindings() {
        let range = NoteRange::parse("c4", "c5").unwrap();
        let map = ShortcutMap::build(range, HOME_ROW).unwrap();
        assert_eq!(map.note_for_shortcut('a'), Some(60)); // C4
        assert_eq!(map.note_for_shortcut('w'), Some(61)); // Db4
        assert_eq!(map.note_for_shortcut('s'), Some(62)); // D4
        assert_eq!(map.note_for_shortcut('e'), Some(63)); // Eb4
        assert_eq!(map.note_for_shortcut('d'), Some(64)); // E4
        assert_eq!(map.note_for_shortcut('f'), Some(65)); // F4
        assert_eq!(map.note_for_shortcut('k'), Some(72)); // C5
        // 'r' would be the flat of F, which does not exist
        assert_eq!(map.note_for_shortcut('r'), None);
        assert_eq!(map.note_for_shortcut('A'), Some(60));
    }

    #[test]
    fn test_exact_fit_binds_every_note() {
        let range = NoteRange::parse("c4", "c5").unwrap();
        let map = ShortcutMap::build(range, &octave_layout()).unwrap();
        assert_eq!(map.len(), 13);
        for midi in range.notes() {
            assert!(map.shortcut_for_note(midi).is_some(), "note {} unbound", midi);
        }

        let wider = NoteRange::parse("c4", "db5").unwrap();
        let map = ShortcutMap::build(wider, &octave_layout()).unwrap();
        assert_eq!(map.len(), 13);
        assert_eq!(map.shortcut_for_note(73), None);
    }

    #[test]
    fn test_range_starting_on_black_key() {
        let range = NoteRange::parse("bb3", "d4").unwrap();
        let map = ShortcutMap::build(range, HOME_ROW).unwrap();
        assert_eq!(map.note_for_shortcut('q'), Some(58)); // Bb3 on slot 0's flat
        assert_eq!(map.note_for_shortcut('a'), Some(59)); // B3
        assert_eq!(map.note_for_shortcut('s'), Some(60)); // C4
        assert_eq!(map.note_for_shortcut('e'), Some(61)); // Db4
        assert_eq!(map.note_for_shortcut('d'), Some(62)); // D4
    }

    #[test]
    fn test_build_is_idempotent() {
        let range = NoteRange::parse("f3", "e5").unwrap();
        let first = ShortcutMap::build(range, QWERTY_ROW).unwrap();
        let second = ShortcutMap::build(range, QWERTY_ROW).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip() {
        let range = NoteRange::parse("a2", "c6").unwrap();
        for layout in [HOME_ROW, BOTTOM_ROW, QWERTY_ROW] {
            let map = ShortcutMap::build(range, layout).unwrap();
            for (midi, symbol) in map.bindings() {
                assert_eq!(map.shortcut_for_note(midi), Some(symbol));
                assert_eq!(map.note_for_shortcut(symbol), Some(midi));
            }
        }
    }

    #[test]
    fn test_empty_layout_rejected() {
        let range = NoteRange::parse("c4", "c5").unwrap();
        assert!(matches!(
            ShortcutMap::build(range, &[]),
            Err(Error::NoShortcutKeys)
        ));
    }
}
