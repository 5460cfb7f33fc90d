//! Note event sinks
//!
//! The piano does not make sound. Whatever does (a synth, a MIDI bridge, a
//! test) implements [`NoteSink`] and receives the events the piano emits.

use crate::note::NoteAttributes;
use crate::piano::NoteEvent;

/// Receiver for note events
pub trait NoteSink {
    /// A note started
    fn note_down(&mut self, attrs: &NoteAttributes);

    /// A note stopped
    fn note_up(&mut self, attrs: &NoteAttributes);

    /// Dispatch a single event
    fn send(&mut self, event: &NoteEvent) {
        match event {
            NoteEvent::On(attrs) => self.note_down(attrs),
            NoteEvent::Off(attrs) => self.note_up(attrs),
        }
    }

    /// Dispatch events in order
    fn send_all<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a NoteEvent>,
        Self: Sized,
    {
        for event in events {
            self.send(event);
        }
    }
}

/// Sink that only logs (useful when no sound engine is attached)
#[derive(Debug, Default)]
pub struct LogSink {
    /// Most recent event, for status displays
    pub last: Option<NoteEvent>,
}

impl NoteSink for LogSink {
    fn note_down(&mut self, attrs: &NoteAttributes) {
        log::info!("Note on: {} (MIDI {})", attrs.note, attrs.midi_number);
        self.last = Some(NoteEvent::On(attrs.clone()));
    }

    fn note_up(&mut self, attrs: &NoteAttributes) {
        log::info!("Note off: {} (MIDI {})", attrs.note, attrs.midi_number);
        self.last = Some(NoteEvent::Off(attrs.clone()));
    }
}

/// Records events, mostly for tests
impl NoteSink for Vec<NoteEvent> {
    fn note_down(&mut self, attrs: &NoteAttributes) {
        self.push(NoteEvent::On(attrs.clone()));
    }

    fn note_up(&mut self, attrs: &NoteAttributes) {
        self.push(NoteEvent::Off(attrs.clone()));
    }
}
