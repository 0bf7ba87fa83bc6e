//! Playback transport state
//!
//! Tracks what the transport shows (state, position, tempo, loop). Audio and
//! MIDI synthesis are done elsewhere; they observe `state_changed`.

use serde::{Deserialize, Serialize};

use crate::notify::{Channel, ValCh};

pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
const MIN_TEMPO_BPM: f64 = 1.0;
const MAX_TEMPO_BPM: f64 = 999.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Loop range in milliseconds, `start < end`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Playback sub-component
#[derive(Debug)]
pub struct NotationPlayback {
    state: ValCh<PlaybackState>,
    position_ms: u64,
    tempo_bpm: f64,
    loop_range: Option<LoopRange>,
}

impl Default for NotationPlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl NotationPlayback {
    pub fn new() -> Self {
        Self {
            state: ValCh::new(PlaybackState::Stopped),
            position_ms: 0,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            loop_range: None,
        }
    }

    /// Rewind for a newly attached score
    pub fn init(&mut self) {
        self.state.set(PlaybackState::Stopped);
        self.position_ms = 0;
        self.loop_range = None;
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.val()
    }

    pub fn state_changed(&self) -> &Channel<PlaybackState> {
        self.state.ch()
    }

    pub fn play(&mut self) {
        self.state.set(PlaybackState::Playing);
    }

    /// Pausing keeps the position; ignored unless playing
    pub fn pause(&mut self) {
        if self.state() == PlaybackState::Playing {
            self.state.set(PlaybackState::Paused);
        }
    }

    pub fn stop(&mut self) {
        self.state.set(PlaybackState::Stopped);
        self.position_ms = self.loop_range.map_or(0, |l| l.start_ms);
    }

    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    /// Advance the position by `elapsed_ms` while playing, wrapping inside the loop
    pub fn advance(&mut self, elapsed_ms: u64) {
        if self.state() != PlaybackState::Playing {
            return;
        }
        self.position_ms += elapsed_ms;
        if let Some(range) = self.loop_range {
            if self.position_ms >= range.end_ms {
                let len = range.end_ms - range.start_ms;
                self.position_ms = range.start_ms + (self.position_ms - range.start_ms) % len;
            }
        }
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// Clamped to a playable range
    pub fn set_tempo_bpm(&mut self, bpm: f64) {
        self.tempo_bpm = if bpm.is_finite() {
            bpm.clamp(MIN_TEMPO_BPM, MAX_TEMPO_BPM)
        } else {
            DEFAULT_TEMPO_BPM
        };
    }

    /// Empty or inverted ranges clear the loop
    pub fn set_loop(&mut self, start_ms: u64, end_ms: u64) {
        self.loop_range = (start_ms < end_ms).then_some(LoopRange { start_ms, end_ms });
    }

    pub fn loop_range(&self) -> Option<LoopRange> {
        self.loop_range
    }
}
