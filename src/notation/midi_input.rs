//! MIDI keyboard input
//!
//! Parses raw live MIDI messages (as delivered by Web MIDI or a native
//! backend) and tracks the note currently held.

use midly::live::LiveEvent;
use midly::MidiMessage;
use serde::{Deserialize, Serialize};

use crate::error::{NotationError, Result};
use crate::notify::{ChangeSource, Sender};

/// A note played on a MIDI device
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputNote {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
}

/// MIDI input sub-component
#[derive(Debug)]
pub struct NotationMidiInput {
    changes: Sender<ChangeSource>,
    current: Option<InputNote>,
}

impl NotationMidiInput {
    pub fn new(changes: Sender<ChangeSource>) -> Self {
        Self {
            changes,
            current: None,
        }
    }

    /// Note currently held down, if any
    pub fn current_note(&self) -> Option<InputNote> {
        self.current
    }

    /// Feed one live MIDI message
    ///
    /// Returns the note that was pressed, if the message was a note-on.
    /// Releasing the held note clears it. Messages other than note on/off
    /// are accepted and ignored.
    pub fn on_midi_bytes(&mut self, bytes: &[u8]) -> Result<Option<InputNote>> {
        let event = LiveEvent::parse(bytes).map_err(|e| NotationError::Midi(e.to_string()))?;

        let LiveEvent::Midi { channel, message } = event else {
            return Ok(None);
        };

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                let note = InputNote {
                    channel: channel.as_int(),
                    pitch: key.as_int(),
                    velocity: vel.as_int(),
                };
                log::debug!("MIDI note on: {:?}", note);
                self.current = Some(note);
                self.changes.send(ChangeSource::MidiNoteChanged);
                Ok(Some(note))
            }
            // Note-on with velocity 0 is a note-off by convention
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                let released = self
                    .current
                    .is_some_and(|n| n.pitch == key.as_int() && n.channel == channel.as_int());
                if released {
                    self.current = None;
                    self.changes.send(ChangeSource::MidiNoteChanged);
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeFanIn;

    #[test]
    fn test_note_on_and_off() {
        let fan_in = ChangeFanIn::new();
        let mut input = NotationMidiInput::new(fan_in.sender());

        // Note on, channel 1, middle C, velocity 100
        let note = input.on_midi_bytes(&[0x90, 60, 100]).unwrap();
        assert_eq!(note, Some(InputNote { channel: 0, pitch: 60, velocity: 100 }));
        assert_eq!(input.current_note(), note);

        // Note off
        assert_eq!(input.on_midi_bytes(&[0x80, 60, 0]).unwrap(), None);
        assert_eq!(input.current_note(), None);
        assert_eq!(fan_in.received(), 2);
    }

    #[test]
    fn test_zero_velocity_note_on_releases() {
        let fan_in = ChangeFanIn::new();
        let mut input = NotationMidiInput::new(fan_in.sender());

        input.on_midi_bytes(&[0x93, 64, 80]).unwrap();
        assert_eq!(input.on_midi_bytes(&[0x93, 64, 0]).unwrap(), None);
        assert_eq!(input.current_note(), None);
    }

    #[test]
    fn test_release_of_other_key_keeps_note() {
        let fan_in = ChangeFanIn::new();
        let mut input = NotationMidiInput::new(fan_in.sender());

        input.on_midi_bytes(&[0x90, 60, 100]).unwrap();
        input.on_midi_bytes(&[0x80, 62, 0]).unwrap();
        assert_eq!(input.current_note().map(|n| n.pitch), Some(60));
        assert_eq!(fan_in.received(), 1);
    }

    #[test]
    fn test_other_messages_are_ignored() {
        let fan_in = ChangeFanIn::new();
        let mut input = NotationMidiInput::new(fan_in.sender());

        // Control change: sustain pedal down
        assert_eq!(input.on_midi_bytes(&[0xB0, 64, 127]).unwrap(), None);
        assert_eq!(fan_in.received(), 0);
    }

    #[test]
    fn test_malformed_bytes_are_an_error() {
        let fan_in = ChangeFanIn::new();
        let mut input = NotationMidiInput::new(fan_in.sender());

        assert!(matches!(input.on_midi_bytes(&[]), Err(NotationError::Midi(_))));
        assert!(matches!(input.on_midi_bytes(&[0x90, 60]), Err(NotationError::Midi(_))));
    }
}
