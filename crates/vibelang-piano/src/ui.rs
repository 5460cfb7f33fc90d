//! TUI rendering for the piano
//!
//! Keys are placed with the fractional geometry from
//! [`KeyboardLayout`](crate::layout::KeyboardLayout), scaled to terminal
//! cells. White keys are drawn first and black keys on top of them, the
//! same order pointer hit testing uses.

use crate::config::Theme;
use crate::note::{self, PitchClass};
use crate::piano::{KeyLabel, Piano};
use ratatui::layout::Position;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Renders the text shown at the bottom of a key
pub type LabelFn<'a> = &'a dyn Fn(&KeyLabel) -> Option<String>;

/// Shortcut symbol if the key has one, otherwise the note name on every C
pub fn default_label(label: &KeyLabel) -> Option<String> {
    match label.keyboard_shortcut {
        Some(c) => Some(c.to_ascii_uppercase().to_string()),
        None if label.basenote == PitchClass::C => Some(label.note.to_uppercase()),
        None => None,
    }
}

/// Keyboard widget for rendering in ratatui
pub struct KeyboardWidget<'a> {
    piano: &'a Piano,
    theme: Theme,
    label: LabelFn<'a>,
}

impl<'a> KeyboardWidget<'a> {
    /// Create a new keyboard widget
    pub fn new(piano: &'a Piano) -> Self {
        Self {
            piano,
            theme: Theme::default(),
            label: &default_label,
        }
    }

    /// Set the theme
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the label renderer
    pub fn render_label(mut self, label: LabelFn<'a>) -> Self {
        self.label = label;
        self
    }
}

impl<'a> Widget for KeyboardWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || (area.width as usize) < self.piano.layout().white_key_count() {
            return;
        }

        let grid = build_key_grid(self.piano, &self.theme, self.label, area.width, area.height);
        let lines: Vec<Line> = grid
            .iter()
            .map(|row| Line::from(build_spans_from_chars(row)))
            .collect();
        Paragraph::new(lines).render(area, buf);
    }
}

/// Scale a fraction of the keyboard to a cell count
fn to_cells(fraction: f32, total: u16) -> u16 {
    (fraction * total as f32).round().clamp(0.0, total as f32) as u16
}

/// Character grid for the keys, one row per terminal line
fn build_key_grid(
    piano: &Piano,
    theme: &Theme,
    label: LabelFn<'_>,
    width: u16,
    height: u16,
) -> Vec<Vec<(char, Style)>> {
    let mut grid = vec![vec![(' ', Style::default()); width as usize]; height as usize];
    let (black, white): (Vec<u8>, Vec<u8>) = piano
        .layout()
        .keys()
        .partition(|&n| note::is_accidental(n));

    for (is_black, keys) in [(false, white), (true, black)] {
        for midi in keys {
            let geometry = piano.geometry(midi);
            let x0 = to_cells(geometry.left, width) as usize;
            let x1 = to_cells(geometry.left + geometry.width, width).max(x0 as u16 + 1) as usize;
            let x1 = x1.min(width as usize);
            let rows = to_cells(geometry.height, height).max(1) as usize;

            let bg = if piano.is_note_down(midi) {
                theme.pressed_key()
            } else if is_black {
                theme.black_key()
            } else {
                theme.white_key()
            };
            let style = Style::default().bg(bg);

            for row in grid.iter_mut().take(rows) {
                for cell in row.iter_mut().take(x1).skip(x0) {
                    *cell = (' ', style);
                }
                // Seam on the right edge of white keys
                if !is_black && x1 - x0 > 1 {
                    row[x1 - 1] = ('▕', style.fg(Color::Black));
                }
            }

            if !theme.show_labels {
                continue;
            }
            let text = piano.key_label(midi).and_then(|l| label(&l));
            if let Some(text) = text {
                let usable = if is_black { x1 - x0 } else { (x1 - x0).saturating_sub(1) };
                let chars: Vec<char> = text.chars().take(usable).collect();
                let start = x0 + (usable - chars.len()) / 2;
                let fg = if is_black { Color::White } else { theme.label() };
                let label_style = style.fg(fg).add_modifier(Modifier::BOLD);
                let row = &mut grid[rows - 1];
                for (i, ch) in chars.into_iter().enumerate() {
                    row[start + i] = (ch, label_style);
                }
            }
        }
    }
    grid
}

/// Key under a terminal cell, if any
///
/// `area` is the rect the [`KeyboardWidget`] was rendered into.
pub fn key_at(piano: &Piano, area: Rect, column: u16, row: u16) -> Option<u8> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    // Sample the centre of the cell
    let x = (column - area.x) as f32 + 0.5;
    let y = (row - area.y) as f32 + 0.5;
    piano.layout().key_at(x / area.width as f32, y / area.height as f32)
}

/// Area the keys occupy inside a standalone frame
///
/// Height follows the layout's key width to height ratio, counting a
/// terminal cell as twice as tall as it is wide.
pub fn keyboard_area(piano: &Piano, area: Rect) -> Rect {
    let margin = 1u16;
    let inner = Rect {
        x: area.x + margin + 1,
        y: area.y + margin + 1,
        width: area.width.saturating_sub((margin + 1) * 2),
        height: area.height.saturating_sub((margin + 1) * 2 + 1),
    };
    let ideal_rows = (piano.layout().pixel_height(inner.width as f32) / 2.0).round() as u16;
    Rect {
        height: ideal_rows.clamp(3, inner.height.max(3)).min(inner.height),
        ..inner
    }
}

/// Render the piano for the standalone application
///
/// Returns the rect the keys were drawn into, for pointer hit testing.
pub fn render_piano_standalone(
    frame: &mut Frame,
    area: Rect,
    piano: &Piano,
    theme: &Theme,
    status: Option<&str>,
) -> Rect {
    let range = piano.range();
    let title = match status {
        Some(status) => format!(
            " Piano [{}-{}] {} ",
            note::note_name(range.start()),
            note::note_name(range.end()),
            status
        ),
        None => format!(
            " Piano [{}-{}] ",
            note::note_name(range.start()),
            note::note_name(range.end())
        ),
    };

    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border()));
    if theme.show_help {
        let help = if piano.is_disabled() {
            " disabled | Esc quit "
        } else if piano.shortcuts().is_some() {
            " click/drag or type to play | Esc quit "
        } else {
            " click/drag to play | Esc quit "
        };
        block = block.title_bottom(help);
    }

    let outer = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    frame.render_widget(block, outer);

    let keys = keyboard_area(piano, area);
    frame.render_widget(KeyboardWidget::new(piano).theme(theme.clone()), keys);

    // Status line: held notes
    let playing = if piano.notes_down().next().is_none() {
        "-".to_string()
    } else {
        piano.notes_down().map(note::note_name).collect::<Vec<_>>().join(" ")
    };
    let status_row = keys.y + keys.height;
    if status_row < outer.y + outer.height.saturating_sub(1) {
        let line = Line::from(vec![
            Span::styled("Playing: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                playing,
                Style::default()
                    .fg(theme.pressed_key())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let status_area = Rect {
            y: status_row,
            height: 1,
            ..keys
        };
        frame.render_widget(Paragraph::new(line), status_area);
    }

    keys
}

/// Convert a character buffer with styles into spans (grouping consecutive chars with same style)
fn build_spans_from_chars(chars: &[(char, Style)]) -> Vec<Span<'static>> {
    if chars.is_empty() {
        return vec![];
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_style = chars[0].1;
    let mut buffer = String::new();

    for (ch, style) in chars {
        if *style == current_style {
            buffer.push(*ch);
        } else {
            if !buffer.is_empty() {
                spans.push(Span::styled(buffer.clone(), current_style));
                buffer.clear();
            }
            buffer.push(*ch);
            current_style = *style;
        }
    }

    if !buffer.is_empty() {
        spans.push(Span::styled(buffer, current_style));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piano::PianoConfig;

    fn piano() -> Piano {
        Piano::new(&PianoConfig {
            start_note: "c4".to_string(),
            end_note: "c5".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.content[buf.index_of(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_build_spans() {
        let chars = vec![
            ('a', Style::default().fg(Color::Red)),
            ('b', Style::default().fg(Color::Red)),
            ('c', Style::default().fg(Color::Blue)),
        ];
        let spans = build_spans_from_chars(&chars);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_widget_draws_keys() {
        let mut piano = piano();
        piano.note_down(60);
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        KeyboardWidget::new(&piano).render(area, &mut buf);

        let theme = Theme::default();
        // c4 is held, d4 is not
        assert_eq!(buf.content[buf.index_of(1, 8)].bg, theme.pressed_key());
        assert_eq!(buf.content[buf.index_of(12, 8)].bg, theme.white_key());
        // db4 covers the top rows between c4 and d4
        assert_eq!(buf.content[buf.index_of(8, 0)].bg, theme.black_key());

        // Shortcut labels on the bottom row
        let bottom = row_text(&buf, 9);
        assert!(bottom.contains('A'), "bottom row: {:?}", bottom);
        assert!(bottom.contains('K'));
    }

    #[test]
    fn test_disabled_hides_labels() {
        let piano = Piano::new(&PianoConfig {
            start_note: "c4".to_string(),
            end_note: "c5".to_string(),
            disabled: true,
            ..Default::default()
        })
        .unwrap();
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        KeyboardWidget::new(&piano).render(area, &mut buf);
        assert!(!row_text(&buf, 9).chars().any(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_custom_label() {
        let piano = piano();
        let label = |l: &KeyLabel| Some(l.note.clone());
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        KeyboardWidget::new(&piano).render_label(&label).render(area, &mut buf);
        assert!(row_text(&buf, 9).contains("c4"));
    }

    #[test]
    fn test_key_at_cells() {
        let piano = piano();
        let area = Rect::new(10, 5, 80, 10);
        assert_eq!(key_at(&piano, area, 10 + 8, 5), Some(61));
        assert_eq!(key_at(&piano, area, 10 + 8, 5 + 9), Some(60));
        assert_eq!(key_at(&piano, area, 10 + 79, 5 + 9), Some(72));
        assert_eq!(key_at(&piano, area, 5, 5), None);
        assert_eq!(key_at(&piano, area, 10 + 8, 20), None);
    }

    #[test]
    fn test_default_label() {
        let piano = Piano::new(&PianoConfig {
            start_note: "c4".to_string(),
            end_note: "c5".to_string(),
            keyboard_shortcuts: None,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(default_label(&piano.key_label(60).unwrap()), Some("C4".to_string()));
        assert_eq!(default_label(&piano.key_label(62).unwrap()), None);
    }
}
