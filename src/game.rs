//! Frame driver
//!
//! Owns the simulation plus the host's input and audio capabilities. The host
//! calls [`Game::frame`] once per display refresh and [`Game::render`] after.

use crate::platform::{Action, AudioSink, InputSource, Mixer};
use crate::renderer::{DrawList, Renderer};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, sanitize_dt, tick};
use crate::tuning::Tuning;

/// Game instance holding all state
pub struct Game<I, A> {
    pub state: GameState,
    input: I,
    audio: Mixer<A>,
    /// Timestamp of the previous `frame_at` call, seconds
    last_time: Option<f64>,
    /// Confirm held last frame, for edge detection
    confirm_held: bool,
    frames: u64,
}

impl<I: InputSource, A: AudioSink> Game<I, A> {
    pub fn new(seed: u64, tuning: Tuning, input: I, audio: A) -> Self {
        log::info!("New game (seed {}, preset {})", seed, tuning.preset.as_str());
        Self {
            state: GameState::new(seed, tuning),
            input,
            audio: Mixer::new(audio),
            last_time: None,
            confirm_held: false,
            frames: 0,
        }
    }

    /// Advance by `dt` seconds of wall time since the previous frame
    pub fn frame(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);

        let confirm = self.input.is_held(Action::Confirm);
        let input = TickInput {
            steering: self.input.steering(),
            fire: self.input.is_held(Action::Fire),
            confirm: confirm && !self.confirm_held,
        };
        self.confirm_held = confirm;

        tick(&mut self.state, &input, dt);
        self.frames += 1;
        self.dispatch_events();
    }

    /// Advance to an absolute clock reading in seconds
    ///
    /// The first call only primes the clock and runs a zero-length frame.
    pub fn frame_at(&mut self, time: f64) {
        let dt = match self.last_time {
            Some(last) => (time - last) as f32,
            None => 0.0,
        };
        self.last_time = Some(time);
        self.frame(dt);
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue, cue.base_volume()),
                GameEvent::PhaseChanged { from, to } => {
                    log::debug!("phase {:?} -> {:?}", from, to);
                }
                GameEvent::SectionPassed { section } => {
                    log::debug!("now in section {}", section);
                }
                GameEvent::Effect(kind) => log::trace!("effect {:?}", kind),
            }
        }
    }

    pub fn draw_list(&self) -> DrawList {
        DrawList::build(&self.state)
    }

    pub fn render(&self, renderer: &mut impl Renderer) {
        renderer.draw(&self.draw_list());
    }

    /// Host canvas changed size
    pub fn resize(&mut self, width: f32, height: f32, renderer: Option<&mut dyn Renderer>) {
        self.state.resize(width, height);
        if let Some(renderer) = renderer {
            renderer.resize(width, height);
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn audio(&self) -> &A {
        self.audio.inner()
    }

    /// Master volume and mute
    pub fn mixer_mut(&mut self) -> &mut Mixer<A> {
        &mut self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeldActions, RecordingAudio};
    use crate::renderer::TextRenderer;
    use crate::sim::SoundCue;

    fn game() -> Game<HeldActions, RecordingAudio> {
        Game::new(7, Tuning::default(), HeldActions::new(), RecordingAudio::new())
    }

    #[test]
    fn test_confirm_is_edge_triggered() {
        let mut game = game();
        game.input_mut().press(Action::Confirm);
        game.frame(0.016);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.audio().count(SoundCue::BackgroundLoopStart), 1);

        // holding confirm through game over must not restart
        game.state.set_phase(GamePhase::GameOver);
        game.frame(0.016);
        assert_eq!(game.phase(), GamePhase::GameOver);

        game.input_mut().release(Action::Confirm);
        game.frame(0.016);
        game.input_mut().press(Action::Confirm);
        game.frame(0.016);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.audio().count(SoundCue::BackgroundLoopStart), 2);
        assert_eq!(game.audio().count(SoundCue::GameOver), 1);
    }

    #[test]
    fn test_cues_play_through_mixer() {
        let mut game = game();
        game.mixer_mut().set_master_volume(0.5);
        game.input_mut().press(Action::Confirm);
        game.frame(0.016);

        let played = &game.audio().played;
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].cue, SoundCue::BackgroundLoopStart);
        let expected = SoundCue::BackgroundLoopStart.base_volume() * 0.5;
        assert!((played[0].volume - expected).abs() < 1e-6);

        game.mixer_mut().set_muted(true);
        game.state.set_phase(GamePhase::GameOver);
        game.frame(0.016);
        assert_eq!(game.audio().count(SoundCue::GameOver), 0);
    }

    #[test]
    fn test_first_frame_has_zero_dt() {
        let mut game = game();
        game.input_mut().press(Action::Confirm);
        game.frame(0.0);
        let fuel = game.state.run.fuel;

        game.frame_at(1000.0);
        assert_eq!(game.state.run.fuel, fuel);

        // a long stall is capped
        game.frame_at(1060.0);
        assert!((game.state.run.fuel - (fuel - 1.0)).abs() < 0.001);
        assert_eq!(game.frames(), 3);
    }

    #[test]
    fn test_events_are_drained_each_frame() {
        let mut game = game();
        game.input_mut().press(Action::Confirm);
        game.frame(0.016);
        assert!(game.state.events.is_empty());
    }

    #[test]
    fn test_steering_moves_player() {
        let mut game = game();
        game.input_mut().press(Action::Confirm);
        game.frame(0.016);
        let x = game.state.world.player.pos.x;
        game.input_mut().press(Action::Left);
        game.frame(0.05);
        assert!(game.state.world.player.pos.x < x);
    }

    #[test]
    fn test_resize_moves_channel() {
        let mut game = game();
        let mut renderer = TextRenderer::new(10, 10);
        game.resize(800.0, 600.0, Some(&mut renderer));
        let frame = game.draw_list();
        assert_eq!(frame.channel, (200.0, 600.0));
        assert_eq!(frame.width, 800.0);

        game.render(&mut renderer);
        assert!(!renderer.output().is_empty());
    }
}
