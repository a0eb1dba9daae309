//! Game-wide default stats forming the root layer of every stat table

use super::{ConfigError, ModifierConfig};
use crate::stats::{stat, DurationValue, PercentageValue, Provenance, StatTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Authored default modifiers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseStatsConfig {
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
}

impl BaseStatsConfig {
    /// Build the defaults table; every modifier is tagged with [`Provenance::Defaults`]
    pub fn to_table(&self) -> Result<StatTable, ConfigError> {
        let modifiers = self
            .modifiers
            .iter()
            .map(|m| Ok(m.to_modifier()?.with_provenance(Provenance::Defaults)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(StatTable::new().insert_all(modifiers))
    }
}

/// Load base stats from a TOML file
pub fn load_base_stats(path: &Path) -> Result<StatTable, ConfigError> {
    let config: BaseStatsConfig = super::load_toml(path)?;
    config.to_table()
}

/// Load base stats from a TOML string
pub fn parse_base_stats(content: &str) -> Result<StatTable, ConfigError> {
    let config: BaseStatsConfig = super::parse_toml(content)?;
    config.to_table()
}

/// The bundled base stats
pub fn default_base_stats() -> StatTable {
    parse_or_builtin(include_str!("../../config/base_stats.toml"))
}

fn parse_or_builtin(content: &str) -> StatTable {
    parse_base_stats(content).unwrap_or_else(|err| {
        warn!(error = %err, "bundled base stats are invalid, using built-in defaults");
        builtin_base_stats()
    })
}

/// Minimal defaults used when the bundled file cannot be read
pub fn builtin_base_stats() -> StatTable {
    let modifiers = [
        stat::HEALTH.set(100),
        stat::ACCURACY.set(100),
        stat::CRIT_CHANCE.set(PercentageValue::from_percent(5.0)),
        stat::CRIT_MULTIPLIER.set(PercentageValue::from_percent(200.0)),
        stat::USES_ACCURACY.set_true(),
        stat::CAN_CRIT.set_true(),
        stat::CAN_STUN.set_true(),
        stat::MAXIMUM_DAMAGE_REDUCTION.set(PercentageValue::from_percent(50.0)),
        stat::MAXIMUM_DAMAGE_RESISTANCE.set(PercentageValue::from_percent(50.0)),
        stat::MAXIMUM_STUN_CHANCE.set(PercentageValue::from_percent(30.0)),
        stat::STUN_DURATION_ON_ENEMIES.set(DurationValue::from_millis(500)),
        stat::MELEE_DAMAGE_MULTIPLIER.set(PercentageValue::HUNDRED),
        stat::PROJECTILE_DAMAGE_MULTIPLIER.set(PercentageValue::HUNDRED),
        stat::HITBOX_RADIUS.set(400),
        stat::PROJECTILE_SPEED.set(4000),
        stat::COOLDOWN.set(DurationValue::from_millis(1000)),
        stat::MAX_MELEE_AREA_TARGETS.set(1),
        stat::PROJECTILE_SEQUENCE_COUNT.set(1),
        stat::PROJECTILE_SEQUENCE_DELAY.set(DurationValue::from_millis(200)),
        stat::PROJECTILE_ARC_COUNT.set(1),
        stat::PROJECTILE_ARC_ROTATION_OFFSET.set(250),
        stat::PROJECTILE_ADJACENTS_COUNT.set(1),
        stat::PROJECTILE_ADJACENTS_OFFSET.set(1000),
        stat::PROJECTILE_CHAIN_COUNT.set(2),
        stat::MAX_PROJECTILE_TIMES_CHAINED.set(1),
        stat::KNOCKBACK_DISTANCE_MULTIPLIER.set(PercentageValue::HUNDRED),
        stat::KNOCKBACK_DURATION.set(DurationValue::from_millis(300)),
        stat::SHOCK_DURATION.set(DurationValue::from_millis(2000)),
        stat::SHOCK_ADDED_RECEIVE_CRITS_CHANCE.set(PercentageValue::from_percent(20.0)),
        stat::CURSE_DURATION.set(DurationValue::from_millis(3000)),
        stat::BUFF_DURATION.set(DurationValue::from_millis(5000)),
    ];
    StatTable::new().insert_all(
        modifiers
            .into_iter()
            .map(|m| m.with_provenance(Provenance::Defaults)),
    )
}
