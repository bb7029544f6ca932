//! Audio capability
//!
//! The simulation names sound cues; playback is someone else's problem.
//! Delivery is best-effort: a sink that cannot play simply drops the cue.

use crate::sim::SoundCue;

/// Anything that can play a named cue
pub trait AudioSink {
    /// Play `cue` at `volume` (0.0 - 1.0)
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// Silent sink, used when no audio backend is available
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue, _volume: f32) {}
}

/// One delivered cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedCue {
    pub cue: SoundCue,
    pub volume: f32,
}

/// Keeps every cue it is asked to play, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingAudio {
    pub played: Vec<PlayedCue>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|played| played.cue == cue).count()
    }

    pub fn cues(&self) -> Vec<SoundCue> {
        self.played.iter().map(|played| played.cue).collect()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::trace!("cue {} at {:.2}", cue.name(), volume);
        self.played.push(PlayedCue { cue, volume });
    }
}

/// Master volume and mute in front of another sink
#[derive(Debug, Clone)]
pub struct Mixer<A> {
    inner: A,
    master_volume: f32,
    muted: bool,
}

impl<A: AudioSink> Mixer<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: AudioSink> AudioSink for Mixer<A> {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        let vol = volume.clamp(0.0, 1.0) * self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.inner.play(cue, vol);
    }
}
