//! River Strike entry point
//!
//! Native builds run a headless autopilot session and print a JSON summary:
//!
//! ```text
//! river-strike [tuning.json] [--seed N] [--seconds S] [--preset easy|normal|hard]
//!              [--frame] [--volume V]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use serde::Serialize;

    use river_strike::platform::{Action, HeldActions, InputSource, RecordingAudio};
    use river_strike::renderer::TextRenderer;
    use river_strike::sim::{GamePhase, GameState, SoundCue};
    use river_strike::{DifficultyPreset, Game, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Steers for bridge gaps, otherwise lines up under the nearest enemy
    #[derive(Debug, Default)]
    pub struct Autopilot {
        held: HeldActions,
    }

    impl Autopilot {
        pub fn plan(&mut self, state: &GameState) {
            self.held.clear();
            if state.phase != GamePhase::Playing {
                self.held.press(Action::Confirm);
                return;
            }

            let player = &state.world.player;
            let center = player.pos.x + player.size.x / 2.0;
            let channel = state.collisions.channel;

            let bridge_gap = state
                .world
                .bridges
                .iter_active()
                .filter(|b| b.pos.y < player.pos.y)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|b| {
                    let (start, end) = b.gap_span();
                    (start + end) / 2.0
                });
            let enemy = state
                .world
                .enemies
                .iter_active()
                .filter(|e| e.pos.y < player.pos.y)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x + e.size.x / 2.0);

            let target = bridge_gap.or(enemy).unwrap_or_else(|| channel.center());
            let target = target.clamp(
                channel.left + player.size.x / 2.0 + 2.0,
                channel.right - player.size.x / 2.0 - 2.0,
            );

            if target < center - 4.0 {
                self.held.press(Action::Left);
            } else if target > center + 4.0 {
                self.held.press(Action::Right);
            }
            self.held.press(Action::Fire);
        }
    }

    impl InputSource for Autopilot {
        fn is_held(&self, action: Action) -> bool {
            self.held.is_held(action)
        }
    }

    fn parse_preset(s: &str) -> Result<DifficultyPreset, String> {
        DifficultyPreset::from_str(s).ok_or_else(|| format!("unknown preset '{}' (easy, normal, hard)", s))
    }

    fn parse_volume(s: &str) -> Result<f32, String> {
        let volume: f32 = s.parse().map_err(|e| format!("{}", e))?;
        if volume > 0.0 && volume <= 1.0 {
            Ok(volume)
        } else {
            Err(format!("volume must be in (0, 1], got {}", volume))
        }
    }

    /// Headless autopilot session
    #[derive(Parser, Debug)]
    #[command(name = "river-strike", version, about = "Run River Strike headless and print a JSON summary")]
    pub struct Cli {
        /// Balance file; fields it leaves out come from the preset
        pub tuning: Option<PathBuf>,

        /// RNG seed for the run
        #[arg(long, default_value_t = 1)]
        pub seed: u64,

        /// Stop after this many seconds of game time
        #[arg(long, default_value_t = 120.0)]
        pub seconds: f32,

        /// Difficulty preset (easy, normal, hard)
        #[arg(long, value_parser = parse_preset)]
        pub preset: Option<DifficultyPreset>,

        /// Print the last frame as text to stderr
        #[arg(long)]
        pub frame: bool,

        /// Master volume in (0.0, 1.0]; the summary counts the cues it hears
        #[arg(long, default_value_t = 0.8, value_parser = parse_volume)]
        pub volume: f32,
    }

    fn load_tuning(cli: &Cli) -> Result<Tuning> {
        let Some(path) = &cli.tuning else {
            return Ok(cli.preset.map(Tuning::from_preset).unwrap_or_default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path.display()))?;
        let tuning = match cli.preset {
            Some(preset) => Tuning::from_json_with_preset(&json, preset),
            None => Tuning::from_json(&json),
        };
        tuning.with_context(|| format!("loading tuning file {}", path.display()))
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        preset: &'static str,
        frames: u64,
        seconds: f32,
        phase: GamePhase,
        score: u64,
        section: u32,
        difficulty: f32,
        lives: u32,
        fuel: f32,
        explosions: usize,
        pickups: usize,
        hits_taken: usize,
    }

    pub fn run(cli: Cli) -> Result<()> {
        let tuning = load_tuning(&cli)?;
        let preset = tuning.preset.as_str();

        let mut game = Game::new(cli.seed, tuning, Autopilot::default(), RecordingAudio::new());
        game.mixer_mut().set_master_volume(cli.volume);
        let max_frames = (cli.seconds / FRAME_DT).ceil() as u64;

        // First frame leaves the menu, then play until the clock or the run ends
        loop {
            let mut pilot = Autopilot::default();
            pilot.plan(&game.state);
            *game.input_mut() = pilot;
            game.frame(FRAME_DT);

            if game.phase() == GamePhase::GameOver || game.frames() >= max_frames {
                break;
            }
        }

        let state = &game.state;
        log::info!(
            "Run finished after {:.1}s: score {}, section {}",
            state.run.elapsed,
            state.run.score,
            state.run.section
        );

        if cli.frame {
            let mut renderer = TextRenderer::new(48, 32);
            game.render(&mut renderer);
            eprintln!("{}", renderer.output());
        }

        let audio = game.audio();
        let summary = Summary {
            seed: cli.seed,
            preset,
            frames: game.frames(),
            seconds: state.run.elapsed,
            phase: state.phase,
            score: state.run.score,
            section: state.run.section,
            difficulty: state.run.difficulty,
            lives: state.run.lives,
            fuel: state.run.fuel,
            explosions: audio.count(SoundCue::Explosion),
            pickups: audio.count(SoundCue::Pickup),
            hits_taken: audio.count(SoundCue::PlayerHit),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use clap::CommandFactory;

        #[test]
        fn test_cli_definition() {
            Cli::command().debug_assert();
        }

        #[test]
        fn test_cli_defaults() {
            let cli = Cli::try_parse_from(["river-strike"]).unwrap();
            assert_eq!(cli.seed, 1);
            assert_eq!(cli.seconds, 120.0);
            assert_eq!(cli.preset, None);
            assert!(cli.tuning.is_none());
            assert!(!cli.frame);
            assert_eq!(cli.volume, 0.8);
        }

        #[test]
        fn test_cli_flags() {
            let cli = Cli::try_parse_from([
                "river-strike", "balance.json", "--seed", "42", "--preset", "HARD", "--frame", "--volume", "0.5",
            ])
            .unwrap();
            assert_eq!(cli.tuning, Some(PathBuf::from("balance.json")));
            assert_eq!(cli.seed, 42);
            assert_eq!(cli.preset, Some(DifficultyPreset::Hard));
            assert!(cli.frame);
            assert_eq!(cli.volume, 0.5);
        }

        #[test]
        fn test_cli_rejects_bad_values() {
            assert!(Cli::try_parse_from(["river-strike", "--preset", "nightmare"]).is_err());
            assert!(Cli::try_parse_from(["river-strike", "--seed", "-3"]).is_err());
            assert!(Cli::try_parse_from(["river-strike", "--seconds"]).is_err());
            assert!(Cli::try_parse_from(["river-strike", "--volume", "0"]).is_err());
            assert!(Cli::try_parse_from(["river-strike", "--volume", "1.5"]).is_err());
        }

        #[test]
        fn test_missing_tuning_file_names_path() {
            let cli = Cli::try_parse_from(["river-strike", "/nonexistent/balance.json"]).unwrap();
            let err = load_tuning(&cli).unwrap_err();
            assert!(err.to_string().contains("/nonexistent/balance.json"));
        }

        #[test]
        fn test_preset_without_file() {
            let cli = Cli::try_parse_from(["river-strike", "--preset", "easy"]).unwrap();
            assert_eq!(load_tuning(&cli).unwrap(), Tuning::from_preset(DifficultyPreset::Easy));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("River Strike (native, headless) starting...");

    let cli = headless::Cli::parse();
    if let Err(e) = headless::run(cli) {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `river_strike::Game` directly; nothing to do here
}
