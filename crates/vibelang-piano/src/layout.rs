//! Key geometry
//!
//! Every key is placed as a fraction of the total keyboard width, so the
//! same layout can be scaled to any surface (terminal cells, pixels, ...).
//!
//! Positions are measured in white-key widths from the start note. Black
//! keys get fractional offsets from their pitch class (see
//! [`NoteShapeConfig`]) so they sit between their neighbouring naturals the
//! way they do on a real instrument, not evenly spaced.

use crate::error::{Error, Result};
use crate::note::{self, NoteRange, PitchClass};
use serde::{Deserialize, Serialize};

/// Width of one octave in white keys
pub const OCTAVE_WIDTH: f32 = 7.0;

/// Default gap between adjacent white keys, as a fraction of a white key
pub const DEFAULT_WHITE_KEY_GUTTER_RATIO: f32 = 0.02;

/// Default white key width / keyboard height ratio
pub const DEFAULT_KEY_WIDTH_TO_HEIGHT_RATIO: f32 = 0.15;

/// Size of one kind of key, relative to a white key's width and the
/// keyboard's height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyShape {
    /// Width as a multiple of the white key width
    pub width_ratio: f32,
    /// Height as a fraction of the keyboard height
    pub height_ratio: f32,
    /// Height while the key is held down
    pub height_down_ratio: f32,
}

impl KeyShape {
    /// Default shape for natural keys
    pub fn white() -> Self {
        Self {
            width_ratio: 1.0,
            height_ratio: 1.0,
            height_down_ratio: 0.98,
        }
    }

    /// Default shape for accidental keys
    pub fn black() -> Self {
        Self {
            width_ratio: 0.66,
            height_ratio: 0.66,
            height_down_ratio: 0.65,
        }
    }

    pub fn height(&self, down: bool) -> f32 {
        if down {
            self.height_down_ratio
        } else {
            self.height_ratio
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let ratios = [self.width_ratio, self.height_ratio, self.height_down_ratio];
        if ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(Error::Config(format!(
                "{} key ratios must be positive, got {:?}",
                name, self
            )));
        }
        Ok(())
    }
}

/// Horizontal offset of each pitch class from C, in white-key widths
///
/// A `[layout.note_shapes]` table must name all twelve pitch classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteShapeConfig {
    pub c: f32,
    pub db: f32,
    pub d: f32,
    pub eb: f32,
    pub e: f32,
    pub f: f32,
    pub gb: f32,
    pub g: f32,
    pub ab: f32,
    pub a: f32,
    pub bb: f32,
    pub b: f32,
}

impl Default for NoteShapeConfig {
    fn default() -> Self {
        Self {
            c: 0.0,
            db: 0.55,
            d: 1.0,
            eb: 1.8,
            e: 2.0,
            f: 3.0,
            gb: 3.5,
            g: 4.0,
            ab: 4.7,
            a: 5.0,
            bb: 5.85,
            b: 6.0,
        }
    }
}

impl NoteShapeConfig {
    /// Offset from C for a pitch class
    pub fn offset_from_c(&self, pitch: PitchClass) -> f32 {
        match pitch {
            PitchClass::C => self.c,
            PitchClass::Db => self.db,
            PitchClass::D => self.d,
            PitchClass::Eb => self.eb,
            PitchClass::E => self.e,
            PitchClass::F => self.f,
            PitchClass::Gb => self.gb,
            PitchClass::G => self.g,
            PitchClass::Ab => self.ab,
            PitchClass::A => self.a,
            PitchClass::Bb => self.bb,
            PitchClass::B => self.b,
        }
    }
}

/// Geometry settings shared by every key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Per pitch class offsets
    pub note_shapes: NoteShapeConfig,
    /// Shape of natural keys
    pub white_key_shape: KeyShape,
    /// Shape of accidental keys
    pub black_key_shape: KeyShape,
    /// Fraction of a white key's slot left empty as a seam
    pub white_key_gutter_ratio: f32,
    /// White key width / keyboard height, used when an explicit width is given
    pub key_width_to_height_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            note_shapes: NoteShapeConfig::default(),
            white_key_shape: KeyShape::white(),
            black_key_shape: KeyShape::black(),
            white_key_gutter_ratio: DEFAULT_WHITE_KEY_GUTTER_RATIO,
            key_width_to_height_ratio: DEFAULT_KEY_WIDTH_TO_HEIGHT_RATIO,
        }
    }
}

impl LayoutConfig {
    /// Reject settings that would produce a broken keyboard
    pub fn validate(&self) -> Result<()> {
        self.white_key_shape.validate("white")?;
        self.black_key_shape.validate("black")?;
        if !(0.0..1.0).contains(&self.white_key_gutter_ratio) {
            return Err(Error::Config(format!(
                "white_key_gutter_ratio must be in [0, 1), got {}",
                self.white_key_gutter_ratio
            )));
        }
        if !self.key_width_to_height_ratio.is_finite() || self.key_width_to_height_ratio <= 0.0 {
            return Err(Error::Config(format!(
                "key_width_to_height_ratio must be positive, got {}",
                self.key_width_to_height_ratio
            )));
        }
        if let Some(pitch) = PitchClass::ALL
            .into_iter()
            .find(|&p| !self.note_shapes.offset_from_c(p).is_finite())
        {
            return Err(Error::Config(format!("note shape offset for {} is not a number", pitch)));
        }
        Ok(())
    }
}

/// Placement of a single key, every field a fraction of the keyboard size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGeometry {
    /// Left edge, fraction of total width
    pub left: f32,
    /// Width, fraction of total width
    pub width: f32,
    /// Height, fraction of total height (keys hang from the top edge)
    pub height: f32,
}

impl KeyGeometry {
    /// Whether a point (fractions of width/height, origin top-left) lies on this key
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.left + self.width && y >= 0.0 && y < self.height
    }
}

/// Layout of every key in a note range
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    range: NoteRange,
    config: LayoutConfig,
    white_key_count: usize,
}

impl KeyboardLayout {
    /// Lay out a range of notes
    ///
    /// Fails if the config is invalid or the range has no white keys (the
    /// white key width would be undefined).
    pub fn new(range: NoteRange, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let white_key_count = range.natural_count();
        if white_key_count == 0 {
            return Err(Error::NoNaturalKeys {
                start: note::note_name(range.start()),
                end: note::note_name(range.end()),
            });
        }
        Ok(Self {
            range,
            config,
            white_key_count,
        })
    }

    pub fn range(&self) -> NoteRange {
        self.range
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Notes in ascending order
    pub fn keys(&self) -> impl Iterator<Item = u8> {
        self.range.notes()
    }

    pub fn white_key_count(&self) -> usize {
        self.white_key_count
    }

    /// Width of a white key's slot, seam included
    pub fn white_key_width_including_gutter(&self) -> f32 {
        1.0 / self.white_key_count as f32
    }

    /// Width of a white key
    pub fn white_key_width(&self) -> f32 {
        self.white_key_width_including_gutter() * (1.0 - self.config.white_key_gutter_ratio)
    }

    /// Shape used for a note
    pub fn shape(&self, midi: u8) -> &KeyShape {
        if note::is_accidental(midi) {
            &self.config.black_key_shape
        } else {
            &self.config.white_key_shape
        }
    }

    /// Distance from the left edge in white-key widths
    pub fn position(&self, midi: u8) -> f32 {
        let shapes = &self.config.note_shapes;
        let start = self.range.start();
        let offset_from_start = shapes.offset_from_c(note::pitch_class(midi))
            - shapes.offset_from_c(note::pitch_class(start));
        let octave_offset = OCTAVE_WIDTH * (note::octave(midi) - note::octave(start)) as f32;
        offset_from_start + octave_offset
    }

    /// Left edge as a fraction of total width
    pub fn left(&self, midi: u8) -> f32 {
        self.position(midi) * self.white_key_width_including_gutter()
    }

    /// Width as a fraction of total width
    pub fn width(&self, midi: u8) -> f32 {
        self.shape(midi).width_ratio * self.white_key_width()
    }

    /// Height as a fraction of total height
    pub fn height(&self, midi: u8, down: bool) -> f32 {
        self.shape(midi).height(down)
    }

    pub fn geometry(&self, midi: u8, down: bool) -> KeyGeometry {
        KeyGeometry {
            left: self.left(midi),
            width: self.width(midi),
            height: self.height(midi, down),
        }
    }

    /// Find the key under a point given as fractions of width/height
    ///
    /// Black keys are drawn over the white ones, so they are tested first.
    /// Points in the seam between two white keys hit nothing.
    pub fn key_at(&self, x: f32, y: f32) -> Option<u8> {
        let hit = |midi: &u8| self.geometry(*midi, false).contains(x, y);
        self.keys()
            .filter(|&n| note::is_accidental(n))
            .find(hit)
            .or_else(|| self.keys().filter(|&n| !note::is_accidental(n)).find(hit))
    }

    /// Keyboard height for an explicit width, in the same unit
    pub fn pixel_height(&self, width: f32) -> f32 {
        width * self.white_key_width() / self.config.key_width_to_height_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn layout(start: &str, end: &str) -> KeyboardLayout {
        KeyboardLayout::new(NoteRange::parse(start, end).unwrap(), LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_one_octave_scenario() {
        let layout = layout("c4", "c5");
        assert_eq!(layout.white_key_count(), 8);
        assert_eq!(layout.keys().filter(|&n| note::is_accidental(n)).count(), 5);
        assert!((layout.white_key_width_including_gutter() - 1.0 / 8.0).abs() < EPSILON);

        assert!(layout.position(60).abs() < EPSILON);
        assert!((layout.position(72) - 7.0).abs() < EPSILON);
        assert!((layout.left(72) - 7.0 / 8.0).abs() < EPSILON);
        assert!((layout.position(61) - 0.55).abs() < EPSILON);
    }

    #[test]
    fn test_white_key_width_leaves_gutter() {
        for (start, end) in [("c4", "c5"), ("a0", "c8"), ("e2", "b2"), ("db3", "g5")] {
            let layout = layout(start, end);
            let n = layout.white_key_count() as f32;
            let expected = (1.0 / n) * (1.0 - DEFAULT_WHITE_KEY_GUTTER_RATIO);
            for midi in layout.keys().filter(|&m| !note::is_accidental(m)) {
                assert!((layout.width(midi) - expected).abs() < EPSILON);
            }
            let total: f32 = layout
                .keys()
                .filter(|&m| !note::is_accidental(m))
                .map(|m| layout.width(m))
                .sum();
            assert!((total - (1.0 - DEFAULT_WHITE_KEY_GUTTER_RATIO)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_black_key_geometry() {
        let layout = layout("c4", "c5");
        let db = layout.geometry(61, false);
        assert!((db.width - 0.66 * layout.white_key_width()).abs() < EPSILON);
        assert!((db.height - 0.66).abs() < EPSILON);
        assert!((layout.height(61, true) - 0.65).abs() < EPSILON);
        assert!((layout.height(60, true) - 0.98).abs() < EPSILON);

        // Black keys sit strictly between neighbouring white key origins
        for midi in layout.keys().filter(|&m| note::is_accidental(m)) {
            let pos = layout.position(midi);
            assert!(pos > layout.position(midi - 1) && pos < layout.position(midi + 1));
        }
    }

    #[test]
    fn test_start_on_accidental() {
        let layout = layout("db4", "e4");
        assert!(layout.position(61).abs() < EPSILON);
        assert!((layout.position(62) - 0.45).abs() < EPSILON);
        assert_eq!(layout.white_key_count(), 2);
    }

    #[test]
    fn test_octave_offset() {
        let layout = layout("a3", "c5");
        // a3 -> c4 is 2 white keys across the octave boundary
        assert!((layout.position(60) - 2.0).abs() < EPSILON);
        assert!((layout.position(72) - 9.0).abs() < EPSILON);
    }

    #[test]
    fn test_no_naturals_rejected() {
        let range = NoteRange::parse("db4", "db4").unwrap();
        assert!(matches!(
            KeyboardLayout::new(range, LayoutConfig::default()),
            Err(Error::NoNaturalKeys { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let range = NoteRange::parse("c4", "c5").unwrap();
        let config = LayoutConfig {
            white_key_gutter_ratio: 1.5,
            ..Default::default()
        };
        assert!(matches!(KeyboardLayout::new(range, config), Err(Error::Config(_))));

        let config = LayoutConfig {
            black_key_shape: KeyShape {
                width_ratio: 0.0,
                ..KeyShape::black()
            },
            ..Default::default()
        };
        assert!(matches!(KeyboardLayout::new(range, config), Err(Error::Config(_))));
    }

    #[test]
    fn test_key_at() {
        let layout = layout("c4", "c5");
        // Over db4, upper part of the keyboard
        assert_eq!(layout.key_at(0.1, 0.1), Some(61));
        // Same column below the black key
        assert_eq!(layout.key_at(0.1, 0.9), Some(60));
        // Seam between c4 and d4
        assert_eq!(layout.key_at(0.123, 0.9), None);
        assert_eq!(layout.key_at(0.99, 0.5), Some(72));
        assert_eq!(layout.key_at(1.5, 0.5), None);
    }

    #[test]
    fn test_pixel_height() {
        let layout = layout("c4", "c5");
        let height = layout.pixel_height(800.0);
        assert!((height - 800.0 * (0.98 / 8.0) / 0.15).abs() < 1e-2);
    }
}
