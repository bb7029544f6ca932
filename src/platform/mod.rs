//! Platform abstraction layer
//!
//! Capability boundaries the core talks to without knowing the device:
//! - Input: "is this logical action held?"
//! - Audio: fire-and-forget sound cues

pub mod audio;
pub mod input;

pub use audio::{AudioSink, Mixer, NullAudio, PlayedCue, RecordingAudio};
pub use input::{Action, HeldActions, InputSource};
