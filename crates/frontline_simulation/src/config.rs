//! Tuning file: конфиги всех архетипов + ordnance в одном TOML
//!
//! ```toml
//! [patrol]
//! detection_range = 18.0
//!
//! [gunner]
//! overheat_threshold = 12.0
//!
//! [mortar]
//! firing_radius = 60.0
//!
//! [bullets]
//! damage = 6.0
//! ```
//!
//! Отсутствующие секции/поля берутся из `Default`.

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::ai::{GunnerConfig, MortarConfig, PatrolConfig};
use crate::combat::{BulletConfig, OrdnanceConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningFile {
    pub patrol: PatrolConfig,
    pub gunner: GunnerConfig,
    pub mortar: MortarConfig,
    pub ordnance: OrdnanceConfig,
    pub bullets: BulletConfig,
}

impl TuningFile {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: TuningFile = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let tuning = Self::from_toml_str(&contents)?;
        crate::logger::log_info(&format!("Tuning loaded from {}", path.display()));
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_patrol()?;
        self.validate_gunner()?;
        self.validate_mortar()?;
        self.validate_ordnance()?;
        self.validate_bullets()
    }

    fn validate_patrol(&self) -> Result<(), ConfigError> {
        let patrol = &self.patrol;
        positive("patrol.detection_range", patrol.detection_range)?;
        positive("patrol.attack_range", patrol.attack_range)?;
        positive("patrol.fire_interval", patrol.fire_interval)?;
        positive("patrol.heal_interval", patrol.heal_interval)?;
        positive("patrol.move_speed", patrol.move_speed)?;
        non_negative("patrol.patrol_range", patrol.patrol_range)?;
        non_negative("patrol.reload_time", patrol.reload_time)?;
        non_negative("patrol.grenade_cooldown", patrol.grenade_cooldown)?;
        non_negative("patrol.alert_countdown", patrol.alert_countdown)?;
        non_negative("patrol.recovery_rate", patrol.recovery_rate)?;

        if patrol.attack_range > patrol.detection_range {
            return Err(ConfigError::invalid(
                "patrol.attack_range",
                format!(
                    "attack range {} exceeds detection range {}",
                    patrol.attack_range, patrol.detection_range
                ),
            ));
        }
        if patrol.grenade_force_min > patrol.grenade_force_max {
            return Err(ConfigError::invalid(
                "patrol.grenade_force_min",
                "minimum throw force above maximum",
            ));
        }
        if patrol.max_ammo == 0 {
            return Err(ConfigError::invalid("patrol.max_ammo", "magazine must hold at least one round"));
        }
        Ok(())
    }

    fn validate_gunner(&self) -> Result<(), ConfigError> {
        let gunner = &self.gunner;
        positive("gunner.shoot_range", gunner.shoot_range)?;
        positive("gunner.fire_interval", gunner.fire_interval)?;
        positive("gunner.overheat_threshold", gunner.overheat_threshold)?;
        positive("gunner.cooling_rate", gunner.cooling_rate)?;
        positive("gunner.sweep_arc", gunner.sweep_arc)?;
        non_negative("gunner.heat_per_shot", gunner.heat_per_shot)?;
        non_negative("gunner.reload_time", gunner.reload_time)?;
        non_negative("gunner.suppress_spread", gunner.suppress_spread)?;

        // Range tiers: shoot < suppress < alert
        if !(gunner.shoot_range < gunner.suppress_range && gunner.suppress_range < gunner.alert_range) {
            return Err(ConfigError::invalid(
                "gunner.shoot_range",
                format!(
                    "range tiers must satisfy shoot < suppress < alert, got {} / {} / {}",
                    gunner.shoot_range, gunner.suppress_range, gunner.alert_range
                ),
            ));
        }
        if gunner.magazine_size == 0 {
            return Err(ConfigError::invalid("gunner.magazine_size", "magazine must hold at least one round"));
        }
        Ok(())
    }

    fn validate_mortar(&self) -> Result<(), ConfigError> {
        let mortar = &self.mortar;
        positive("mortar.firing_radius", mortar.firing_radius)?;
        positive("mortar.gravity", mortar.gravity)?;
        non_negative("mortar.loading_duration", mortar.loading_duration)?;
        non_negative("mortar.reload_duration", mortar.reload_duration)?;
        non_negative("mortar.scan_interval", mortar.scan_interval)?;
        non_negative("mortar.base_arc_height", mortar.base_arc_height)?;
        non_negative("mortar.max_arc_height", mortar.max_arc_height)?;

        if mortar.firing_radius > mortar.alert_radius {
            return Err(ConfigError::invalid(
                "mortar.firing_radius",
                format!(
                    "firing radius {} exceeds alert radius {}",
                    mortar.firing_radius, mortar.alert_radius
                ),
            ));
        }
        // Снаряд летит под OrdnanceConfig.gravity - решение должно считаться с той же
        if (mortar.gravity - self.ordnance.gravity).abs() > f32::EPSILON {
            return Err(ConfigError::invalid(
                "mortar.gravity",
                format!(
                    "mortar gravity {} differs from ordnance gravity {}",
                    mortar.gravity, self.ordnance.gravity
                ),
            ));
        }
        Ok(())
    }

    fn validate_ordnance(&self) -> Result<(), ConfigError> {
        let ordnance = &self.ordnance;
        positive("ordnance.gravity", ordnance.gravity)?;
        positive("ordnance.max_flight_time", ordnance.max_flight_time)?;
        non_negative("ordnance.grenade_fuse", ordnance.grenade_fuse)?;
        non_negative("ordnance.grenade_radius", ordnance.grenade_radius)?;
        non_negative("ordnance.shell_radius", ordnance.shell_radius)?;
        Ok(())
    }

    fn validate_bullets(&self) -> Result<(), ConfigError> {
        positive("bullets.range", self.bullets.range)?;
        non_negative("bullets.damage", self.bullets.damage)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {}", value)))
    }
}
