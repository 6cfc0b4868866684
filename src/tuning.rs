//! Data-driven game balance
//!
//! Everything here is authored outside the game and loaded before play
//! begins. Values are read-only at runtime: swapping a preset means building
//! a fresh [`crate::sim::Game`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::sim::PoolKind;

/// Global player and pacing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamePreset {
    /// Lives the player starts with (1..=5)
    pub player_lives: u32,
    pub motion_speed: f32,
    pub rotation_speed: f32,
    /// Shot scatter half-angle in degrees
    pub shoot_scatter: f32,
    /// Seconds between player shots
    pub shoot_delay: f32,
    pub projectile_lifetime: f32,
    pub projectile_speed: f32,
    pub projectile_damage: u32,
    pub time_scale: f32,

    /// Some spawned objects are pushed toward the center. This is the radius
    /// around the center the push targets.
    pub spawned_center_target_offset: f32,
    /// Length of the post-hit blink window
    pub player_reset_time: f32,
    /// Spawn interval restored on every reset
    pub start_spawn_interval: f32,
}

impl Default for GamePreset {
    fn default() -> Self {
        Self {
            player_lives: 3,
            motion_speed: 8.0,
            rotation_speed: 5.0,
            shoot_scatter: 5.0,
            shoot_delay: 0.3,
            projectile_lifetime: 1.0,
            projectile_speed: 20.0,
            projectile_damage: 1,
            time_scale: 1.0,

            spawned_center_target_offset: 5.0,
            player_reset_time: 3.0,
            start_spawn_interval: 3.0,
        }
    }
}

/// One spawnable kind and its lottery weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnItemConfig {
    pub kind: PoolKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Relative weight in [0, 1]
    pub weight: f32,
}

fn default_true() -> bool {
    true
}

/// Spawn cadence and difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerTuning {
    /// Floor the interval never drops below
    pub min_interval: f32,
    /// Interval decrease per ramp step
    pub ramp_delta: f32,
    /// Seconds between ramp steps
    pub ramp_interval: f32,
    /// Offset passed to the border when choosing a spawn point
    pub border_offset: f32,
    pub items: Vec<SpawnItemConfig>,
}

impl Default for SpawnerTuning {
    fn default() -> Self {
        Self {
            min_interval: 0.5,
            ramp_delta: 0.1,
            ramp_interval: 1.0,
            border_offset: -3.0,
            items: vec![
                SpawnItemConfig {
                    kind: PoolKind::Rocks,
                    enabled: true,
                    weight: 0.8,
                },
                SpawnItemConfig {
                    kind: PoolKind::Enemies,
                    enabled: true,
                    weight: 0.3,
                },
                SpawnItemConfig {
                    kind: PoolKind::PowerUps,
                    enabled: true,
                    weight: 0.15,
                },
            ],
        }
    }
}

/// Per-hazard behaviour numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    // ── Rocks ────────────────────────────────────────────────────────────────
    pub rock_score: u64,
    pub rock_border_immunity: f32,
    pub rock_speed: f32,
    pub rock_base_radius: f32,
    /// Pieces at or below this radius vanish instead of appearing
    pub min_rock_size: f32,
    /// Pieces at or above this radius may fracture again
    pub min_rock_can_explode_size: f32,
    pub fracture_pieces: u32,
    pub fracture_spawn_radius: f32,
    pub explosion_power: f32,

    // ── Enemies ──────────────────────────────────────────────────────────────
    pub enemy_score: u64,
    pub enemy_lives: u32,
    pub enemy_border_immunity: f32,
    pub enemy_speed: f32,
    pub enemy_rotation_speed: f32,
    pub enemy_shoot_delay: f32,
    pub enemy_shoot_scatter: f32,

    // ── Power-ups ────────────────────────────────────────────────────────────
    pub power_up_pick_range: f32,
    pub power_up_border_immunity: f32,
    pub power_up_speed: f32,

    // ── Shared ───────────────────────────────────────────────────────────────
    /// Extra distance past the border before border rules kick in
    pub hazard_border_offset: f32,
    /// Seconds an explosion effect stays active
    pub explosion_lifetime: f32,
    /// Damage both sides take when the ship touches a hazard
    pub contact_damage: u32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            rock_score: 10,
            rock_border_immunity: 3.0,
            rock_speed: 8.0,
            rock_base_radius: 3.0,
            min_rock_size: 0.3,
            min_rock_can_explode_size: 1.5,
            fracture_pieces: 3,
            fracture_spawn_radius: 3.0,
            explosion_power: 10.0,

            enemy_score: 25,
            enemy_lives: 1,
            enemy_border_immunity: 3.0,
            enemy_speed: 3.0,
            enemy_rotation_speed: 2.0,
            enemy_shoot_delay: 1.5,
            enemy_shoot_scatter: 10.0,

            power_up_pick_range: 1.0,
            power_up_border_immunity: 3.0,
            power_up_speed: 6.0,

            hazard_border_offset: 3.0,
            explosion_lifetime: 1.0,
            contact_damage: 1,
        }
    }
}

/// A named, timed delta applied to the player's tunables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpEffect {
    pub name: String,
    pub motion_speed_boost: f32,
    pub rotation_speed_boost: f32,
    /// Degrees removed from shot scatter
    pub shoot_accuracy_boost: f32,
    pub projectile_lifetime_boost: f32,
    /// Seconds removed from the shot delay
    pub shoot_frequency_boost: f32,
    /// Subtracted from the global time scale (-0.8..=0.8)
    pub time_scale_boost: f32,
    /// Seconds until the effect is reverted
    pub effect_time: f32,
}

/// Viewport and margin the playfield border derives from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub viewport_half_width: f32,
    pub viewport_half_height: f32,
    /// Border sits this far outside the viewport
    pub margin: f32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            viewport_half_width: 16.0,
            viewport_half_height: 9.0,
            margin: 1.0,
        }
    }
}

/// Pool registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub kind: PoolKind,
    #[serde(default = "default_pool_size")]
    pub initial_size: usize,
}

fn default_pool_size() -> usize {
    10
}

/// Complete configuration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub preset: GamePreset,
    pub spawner: SpawnerTuning,
    pub hazards: HazardTuning,
    pub power_ups: Vec<PowerUpEffect>,
    pub borders: BorderConfig,
    pub pools: Vec<PoolConfig>,
    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            preset: GamePreset::default(),
            spawner: SpawnerTuning::default(),
            hazards: HazardTuning::default(),
            power_ups: default_power_ups(),
            borders: BorderConfig::default(),
            pools: PoolKind::ALL
                .iter()
                .map(|&kind| PoolConfig {
                    kind,
                    initial_size: default_pool_size(),
                })
                .collect(),
            log_level: "info".to_string(),
        }
    }
}

fn default_power_ups() -> Vec<PowerUpEffect> {
    vec![
        PowerUpEffect {
            name: "Speed Boost".to_string(),
            motion_speed_boost: 5.0,
            rotation_speed_boost: 2.0,
            effect_time: 5.0,
            ..Default::default()
        },
        PowerUpEffect {
            name: "Sharpshooter".to_string(),
            shoot_accuracy_boost: 5.0,
            projectile_lifetime_boost: 0.5,
            effect_time: 6.0,
            ..Default::default()
        },
        PowerUpEffect {
            name: "Rapid Fire".to_string(),
            shoot_frequency_boost: 0.15,
            effect_time: 4.0,
            ..Default::default()
        },
        PowerUpEffect {
            name: "Bullet Time".to_string(),
            time_scale_boost: 0.4,
            effect_time: 3.0,
            ..Default::default()
        },
    ]
}

fn check(field: &'static str, value: f64, ok: bool, expected: &'static str) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            expected,
        })
    }
}

impl GameConfig {
    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Check every value against its documented range
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.preset;
        check(
            "preset.player_lives",
            p.player_lives as f64,
            (1..=5).contains(&p.player_lives),
            "1..=5",
        )?;
        check("preset.time_scale", p.time_scale as f64, p.time_scale > 0.0, "> 0")?;
        check("preset.shoot_delay", p.shoot_delay as f64, p.shoot_delay >= 0.0, ">= 0")?;
        check(
            "preset.shoot_scatter",
            p.shoot_scatter as f64,
            (0.0..=crate::consts::MAX_SCATTER).contains(&p.shoot_scatter),
            "0..=360",
        )?;

        let s = &self.spawner;
        check("spawner.min_interval", s.min_interval as f64, s.min_interval > 0.0, "> 0")?;
        check(
            "preset.start_spawn_interval",
            p.start_spawn_interval as f64,
            p.start_spawn_interval >= s.min_interval,
            ">= spawner.min_interval",
        )?;
        check("spawner.ramp_delta", s.ramp_delta as f64, s.ramp_delta >= 0.0, ">= 0")?;
        check("spawner.ramp_interval", s.ramp_interval as f64, s.ramp_interval > 0.0, "> 0")?;
        for item in &s.items {
            check(
                "spawner.items.weight",
                item.weight as f64,
                (0.0..=1.0).contains(&item.weight),
                "0..=1",
            )?;
        }

        let h = &self.hazards;
        check(
            "hazards.fracture_pieces",
            h.fracture_pieces as f64,
            h.fracture_pieces >= 1,
            ">= 1",
        )?;
        check(
            "hazards.min_rock_can_explode_size",
            h.min_rock_can_explode_size as f64,
            h.min_rock_can_explode_size > h.min_rock_size,
            "> hazards.min_rock_size",
        )?;

        for effect in &self.power_ups {
            check(
                "power_ups.time_scale_boost",
                effect.time_scale_boost as f64,
                (-0.8..=0.8).contains(&effect.time_scale_boost),
                "-0.8..=0.8",
            )?;
            check(
                "power_ups.effect_time",
                effect.effect_time as f64,
                effect.effect_time >= 0.0,
                ">= 0",
            )?;
        }

        for kind in PoolKind::ALL {
            if !self.pools.iter().any(|p| p.kind == kind) {
                return Err(ConfigError::MissingPool(kind));
            }
        }

        Ok(())
    }

    /// Log level filter for the binary's logger
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "preset": { "player_lives": 5 } }"#).unwrap();
        assert_eq!(config.preset.player_lives, 5);
        assert_eq!(config.preset.motion_speed, GamePreset::default().motion_speed);
        assert_eq!(config.spawner, SpawnerTuning::default());
    }

    #[test]
    fn test_invalid_lives_rejected() {
        let err = GameConfig::from_json(r#"{ "preset": { "player_lives": 9 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "preset.player_lives",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let json = r#"{ "spawner": { "items": [ { "kind": "Rocks", "weight": 1.5 } ] } }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::InvalidValue { field: "spawner.items.weight", .. })
        ));
    }

    #[test]
    fn test_spawn_item_enabled_defaults_true() {
        let json = r#"{ "spawner": { "items": [ { "kind": "Enemies", "weight": 0.5 } ] } }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert!(config.spawner.items[0].enabled);
    }

    #[test]
    fn test_unregistered_pool_rejected() {
        let json = r#"{ "pools": [ { "kind": "Rocks" } ] }"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::MissingPool(PoolKind::Enemies))
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(GameConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load_or_default("/definitely/not/here.json");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_log_filter() {
        let mut config = GameConfig::default();
        config.log_level = "debug".into();
        assert_eq!(config.log_filter(), log::LevelFilter::Debug);
        config.log_level = "loud".into();
        assert_eq!(config.log_filter(), log::LevelFilter::Info);
    }
}
