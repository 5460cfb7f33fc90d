//! Note names and MIDI number helpers
//!
//! Notes are identified by MIDI number (C4 = 60). Everything else about a
//! note (pitch class, octave, whether it is a black key) is derived from
//! that number arithmetically.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Lowest note a piano can be built from (C0)
pub const MIN_MIDI_NUMBER: u8 = 12;

/// Highest note a piano can be built from (G9)
pub const MAX_MIDI_NUMBER: u8 = 127;

/// One of the twelve pitch classes, spelled with flats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl PitchClass {
    /// All pitch classes in ascending semitone order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Db,
        PitchClass::D,
        PitchClass::Eb,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Gb,
        PitchClass::G,
        PitchClass::Ab,
        PitchClass::A,
        PitchClass::Bb,
        PitchClass::B,
    ];

    /// Pitch class for a semitone offset from C (wraps every 12)
    pub fn from_semitone(semitone: u8) -> Self {
        Self::ALL[(semitone % 12) as usize]
    }

    /// Semitones above C (C = 0, B = 11)
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Whether this pitch class is played on a black key
    pub fn is_accidental(self) -> bool {
        matches!(
            self,
            PitchClass::Db | PitchClass::Eb | PitchClass::Gb | PitchClass::Ab | PitchClass::Bb
        )
    }

    /// Lowercase name as used in note names ("c", "db", ...)
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "c",
            PitchClass::Db => "db",
            PitchClass::D => "d",
            PitchClass::Eb => "eb",
            PitchClass::E => "e",
            PitchClass::F => "f",
            PitchClass::Gb => "gb",
            PitchClass::G => "g",
            PitchClass::Ab => "ab",
            PitchClass::A => "a",
            PitchClass::Bb => "bb",
            PitchClass::B => "b",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = Error;

    /// Parse "c", "C#", "db", ... Sharps resolve to their flat spelling.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let mut chars = lower.chars();
        let letter = chars.next().ok_or_else(|| Error::InvalidNote(s.to_string()))?;
        let accidental = chars.next();
        if chars.next().is_some() {
            return Err(Error::InvalidNote(s.to_string()));
        }
        pitch_from_parts(letter, accidental).ok_or_else(|| Error::InvalidNote(s.to_string()))
    }
}

/// Semitone for a letter plus optional '#'/'b'. E#, B#, Cb and Fb are not accepted.
fn pitch_from_parts(letter: char, accidental: Option<char>) -> Option<PitchClass> {
    let natural: u8 = match letter {
        'c' => 0,
        'd' => 2,
        'e' => 4,
        'f' => 5,
        'g' => 7,
        'a' => 9,
        'b' => 11,
        _ => return None,
    };
    let semitone = match (letter, accidental) {
        (_, None) => natural,
        ('e' | 'b', Some('#')) | ('c' | 'f', Some('b')) => return None,
        (_, Some('#')) => natural + 1,
        (_, Some('b')) => natural - 1,
        _ => return None,
    };
    Some(PitchClass::from_semitone(semitone))
}

/// Parse a note name such as "c4", "Db3" or "f#5" into a MIDI number
///
/// Fails on anything that is not letter + optional accidental + octave
/// digits, and on notes outside `MIN_MIDI_NUMBER..=MAX_MIDI_NUMBER`.
pub fn parse_note(name: &str) -> Result<u8> {
    let invalid = || Error::InvalidNote(name.to_string());
    let lower = name.trim().to_ascii_lowercase();
    let mut chars = lower.chars().peekable();

    let letter = chars.next().ok_or_else(invalid)?;
    let accidental = match chars.peek() {
        Some(&c @ ('#' | 'b')) => {
            chars.next();
            Some(c)
        }
        _ => None,
    };
    let pitch = pitch_from_parts(letter, accidental).ok_or_else(invalid)?;

    let octave_str: String = chars.collect();
    if octave_str.is_empty() || !octave_str.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let octave: i32 = octave_str.parse().map_err(|_| invalid())?;

    let midi = 12 * (octave + 1) + pitch.semitone() as i32;
    if midi < MIN_MIDI_NUMBER as i32 || midi > MAX_MIDI_NUMBER as i32 {
        return Err(Error::NoteOutOfRange {
            name: name.to_string(),
            midi,
        });
    }
    Ok(midi as u8)
}

/// Pitch class of a MIDI number
pub fn pitch_class(midi: u8) -> PitchClass {
    PitchClass::from_semitone(midi % 12)
}

/// Octave of a MIDI number (MIDI 60 is octave 4)
pub fn octave(midi: u8) -> i8 {
    (midi / 12) as i8 - 1
}

/// Whether a MIDI number is played on a black key
pub fn is_accidental(midi: u8) -> bool {
    pitch_class(midi).is_accidental()
}

/// Canonical lowercase note name ("c4", "db4", ...)
pub fn note_name(midi: u8) -> String {
    format!("{}{}", pitch_class(midi), octave(midi))
}

/// Attributes passed along with every note event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAttributes {
    /// MIDI number
    pub midi_number: u8,
    /// Note name, e.g. "db4"
    pub note: String,
    /// Pitch class without octave
    pub basenote: PitchClass,
    /// Octave number
    pub octave: i8,
    /// Black key
    pub is_accidental: bool,
}

impl NoteAttributes {
    pub fn from_midi(midi: u8) -> Self {
        let basenote = pitch_class(midi);
        Self {
            midi_number: midi,
            note: note_name(midi),
            basenote,
            octave: octave(midi),
            is_accidental: basenote.is_accidental(),
        }
    }
}

/// Inclusive range of notes shown on a piano
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRange {
    start: u8,
    end: u8,
}

impl NoteRange {
    /// Build a range from two MIDI numbers
    pub fn new(start: u8, end: u8) -> Result<Self> {
        for midi in [start, end] {
            if !(MIN_MIDI_NUMBER..=MAX_MIDI_NUMBER).contains(&midi) {
                return Err(Error::NoteOutOfRange {
                    name: note_name(midi),
                    midi: midi as i32,
                });
            }
        }
        if end < start {
            return Err(Error::EmptyRange {
                start: note_name(start),
                end: note_name(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a range from two note names, e.g. `("c4", "c5")`
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_note(start)?, parse_note(end)?)
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn contains(&self, midi: u8) -> bool {
        (self.start..=self.end).contains(&midi)
    }

    /// Notes in ascending order
    pub fn notes(&self) -> RangeInclusive<u8> {
        self.start..=self.end
    }

    /// Number of notes in the range
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Never true; a range always holds at least one note
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of white keys in the range
    pub fn natural_count(&self) -> usize {
        self.notes().filter(|&n| !is_accidental(n)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note("c4").unwrap(), 60);
        assert_eq!(parse_note("C4").unwrap(), 60);
        assert_eq!(parse_note("a4").unwrap(), 69);
        assert_eq!(parse_note("db4").unwrap(), 61);
        assert_eq!(parse_note("c#4").unwrap(), 61);
        assert_eq!(parse_note("bb3").unwrap(), 58);
        assert_eq!(parse_note("b3").unwrap(), 59);
        assert_eq!(parse_note("c0").unwrap(), MIN_MIDI_NUMBER);
        assert_eq!(parse_note("g9").unwrap(), MAX_MIDI_NUMBER);
    }

    #[test]
    fn test_parse_note_rejects_malformed() {
        for bad in ["", "c", "h4", "c#", "cx4", "c4b", "e#4", "cb4", "c-1", "4c"] {
            assert!(
                matches!(parse_note(bad), Err(Error::InvalidNote(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_note_out_of_range() {
        assert!(matches!(
            parse_note("ab9"),
            Err(Error::NoteOutOfRange { midi: 128, .. })
        ));
        assert!(matches!(parse_note("c99"), Err(Error::NoteOutOfRange { .. })));
    }

    #[test]
    fn test_attributes() {
        let attrs = NoteAttributes::from_midi(61);
        assert_eq!(attrs.note, "db4");
        assert_eq!(attrs.basenote, PitchClass::Db);
        assert_eq!(attrs.octave, 4);
        assert!(attrs.is_accidental);

        let attrs = NoteAttributes::from_midi(59);
        assert_eq!(attrs.note, "b3");
        assert_eq!(attrs.octave, 3);
        assert!(!attrs.is_accidental);
    }

    #[test]
    fn test_pitch_class_from_str() {
        assert_eq!("C#".parse::<PitchClass>().unwrap(), PitchClass::Db);
        assert_eq!("bb".parse::<PitchClass>().unwrap(), PitchClass::Bb);
        assert!("fb".parse::<PitchClass>().is_err());
        assert!("cbb".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_range() {
        let range = NoteRange::parse("c4", "c5").unwrap();
        assert_eq!(range.len(), 13);
        assert_eq!(range.natural_count(), 8);
        assert!(range.contains(60) && range.contains(72) && !range.contains(73));

        assert!(matches!(
            NoteRange::parse("c5", "c4"),
            Err(Error::EmptyRange { .. })
        ));
        assert!(matches!(NoteRange::new(0, 60), Err(Error::NoteOutOfRange { .. })));
    }
}
