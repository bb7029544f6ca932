//! Game balance and difficulty presets
//!
//! Loaded from JSON when a frontend ships its own balance file; any field
//! left out falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" | "medium" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Multiplier applied to spawn intervals (bigger = calmer)
    pub fn spawn_interval_scale(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 1.3,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Hard => 0.75,
        }
    }

    /// Fuel burned per second
    pub fn fuel_drain_rate(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 7.0,
            DifficultyPreset::Normal => 10.0,
            DifficultyPreset::Hard => 13.0,
        }
    }
}

/// Tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub preset: DifficultyPreset,

    // === Economy ===
    /// Fuel burned per second while playing
    pub fuel_drain_rate: f32,
    /// Fuel restored by a pickup
    pub fuel_pickup_amount: f32,
    /// Lives at the start of every run
    pub start_lives: u32,

    // === Scrolling ===
    pub start_scroll_speed: f32,
    /// Scroll speed gained per second of play
    pub scroll_ramp: f32,

    // === Player ===
    pub player_speed: f32,
    pub player_fire_rate: f32,

    // === Spawning (seconds, uniform in [min, max]) ===
    pub enemy_spawn_min: f32,
    pub enemy_spawn_max: f32,
    pub fuel_spawn_min: f32,
    pub fuel_spawn_max: f32,
    pub bridge_spawn_min: f32,
    pub bridge_spawn_max: f32,

    // === Sections ===
    /// Difficulty multiplier gained per bridge passed
    pub section_difficulty_step: f32,
    pub section_score_bonus: u64,
    pub section_fuel_bonus: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Normal,

            fuel_drain_rate: 10.0,
            fuel_pickup_amount: 25.0,
            start_lives: START_LIVES,

            start_scroll_speed: START_SCROLL_SPEED,
            scroll_ramp: 0.1,

            player_speed: PLAYER_SPEED,
            player_fire_rate: PLAYER_FIRE_RATE,

            enemy_spawn_min: 1.0,
            enemy_spawn_max: 2.5,
            fuel_spawn_min: 4.0,
            fuel_spawn_max: 8.0,
            bridge_spawn_min: 20.0,
            bridge_spawn_max: 30.0,

            section_difficulty_step: 0.2,
            section_score_bonus: 500,
            section_fuel_bonus: 30.0,
        }
    }
}

impl Tuning {
    /// Create tuning from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a difficulty preset (updates preset-dependent values)
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        let defaults = Self::default();
        let scale = preset.spawn_interval_scale();

        self.preset = preset;
        self.fuel_drain_rate = preset.fuel_drain_rate();
        self.enemy_spawn_min = defaults.enemy_spawn_min * scale;
        self.enemy_spawn_max = defaults.enemy_spawn_max * scale;
    }

    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning ({} preset)", tuning.preset.as_str());
        Ok(tuning)
    }

    /// Parse a balance file on top of a preset
    ///
    /// Fields the file sets win; everything else comes from `preset`.
    pub fn from_json_with_preset(json: &str, preset: DifficultyPreset) -> Result<Self, TuningError> {
        let overrides: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Self::from_preset(preset))?;
        if let serde_json::Value::Object(fields) = &mut merged {
            for (key, value) in overrides {
                if key != "preset" {
                    fields.insert(key, value);
                }
            }
        }

        let tuning: Self = serde_json::from_value(merged)?;
        tuning.validate()?;
        log::info!("Loaded tuning over {} preset", tuning.preset.as_str());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let non_negative = [
            ("fuel_drain_rate", self.fuel_drain_rate),
            ("fuel_pickup_amount", self.fuel_pickup_amount),
            ("scroll_ramp", self.scroll_ramp),
            ("section_difficulty_step", self.section_difficulty_step),
            ("section_fuel_bonus", self.section_fuel_bonus),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        let positive = [
            ("start_scroll_speed", self.start_scroll_speed),
            ("player_speed", self.player_speed),
            ("player_fire_rate", self.player_fire_rate),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::invalid(field, format!("must be > 0, got {value}")));
            }
        }

        let ranges = [
            ("enemy_spawn_min", self.enemy_spawn_min, self.enemy_spawn_max),
            ("fuel_spawn_min", self.fuel_spawn_min, self.fuel_spawn_max),
            ("bridge_spawn_min", self.bridge_spawn_min, self.bridge_spawn_max),
        ];
        for (field, min, max) in ranges {
            if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
                return Err(TuningError::invalid(
                    field,
                    format!("expected 0 < min <= max, got [{min}, {max}]"),
                ));
            }
        }

        if self.start_lives == 0 {
            return Err(TuningError::invalid("start_lives", "must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "fuel_drain_rate": 4.0 }"#).unwrap();
        assert_eq!(tuning.fuel_drain_rate, 4.0);
        assert_eq!(tuning.fuel_pickup_amount, 25.0);
        assert_eq!(tuning.start_lives, START_LIVES);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = Tuning::from_json(r#"{ "fuel_spawn_min": 9.0, "fuel_spawn_max": 2.0 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "fuel_spawn_min",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse tuning"));
    }

    #[test]
    fn test_presets() {
        assert_eq!(DifficultyPreset::from_str("HARD"), Some(DifficultyPreset::Hard));
        assert_eq!(DifficultyPreset::from_str("nightmare"), None);

        let easy = Tuning::from_preset(DifficultyPreset::Easy);
        let hard = Tuning::from_preset(DifficultyPreset::Hard);
        assert!(easy.enemy_spawn_min > hard.enemy_spawn_min);
        assert!(easy.fuel_drain_rate < hard.fuel_drain_rate);
        assert!(hard.validate().is_ok());
    }

    #[test]
    fn test_file_values_survive_preset() {
        let json = r#"{ "preset": "Easy", "fuel_drain_rate": 4.0, "start_lives": 5 }"#;
        let tuning = Tuning::from_json_with_preset(json, DifficultyPreset::Hard).unwrap();
        let hard = Tuning::from_preset(DifficultyPreset::Hard);

        assert_eq!(tuning.preset, DifficultyPreset::Hard);
        assert_eq!(tuning.fuel_drain_rate, 4.0);
        assert_eq!(tuning.start_lives, 5);
        assert_eq!(tuning.enemy_spawn_min, hard.enemy_spawn_min);
        assert_eq!(tuning.enemy_spawn_max, hard.enemy_spawn_max);
    }

    #[test]
    fn test_preset_layering_still_validates() {
        let json = r#"{ "enemy_spawn_min": 9.0 }"#;
        let err = Tuning::from_json_with_preset(json, DifficultyPreset::Hard).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "enemy_spawn_min",
                ..
            }
        ));
        assert!(Tuning::from_json_with_preset("[1, 2]", DifficultyPreset::Easy).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_preset() {
        let hard = Tuning::from_preset(DifficultyPreset::Hard);
        let json = hard.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), hard);
    }
}
