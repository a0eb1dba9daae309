//! Tunable constants used by the default combat formulas

use serde::{Deserialize, Serialize};

/// Tunable combat constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub hit: HitConstants,
    #[serde(default)]
    pub resistance: ResistanceConstants,
}

impl CombatConstants {
    pub const DEFAULT: CombatConstants = CombatConstants {
        hit: HitConstants::DEFAULT,
        resistance: ResistanceConstants::DEFAULT,
    };
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitConstants {
    /// Lowest possible chance to hit
    #[serde(default = "default_min_hit_chance")]
    pub min_chance: f64,
    /// Highest possible chance to hit
    #[serde(default = "default_max_hit_chance")]
    pub max_chance: f64,
    /// Formula: hit = accuracy / (accuracy + (evasion / divisor) ^ exponent)
    #[serde(default = "default_evasion_divisor")]
    pub evasion_divisor: f64,
    #[serde(default = "default_evasion_exponent")]
    pub evasion_exponent: f64,
}

impl HitConstants {
    pub const DEFAULT: HitConstants = HitConstants {
        min_chance: 0.10,
        max_chance: 0.95,
        evasion_divisor: 4.0,
        evasion_exponent: 0.8,
    };
}

impl Default for HitConstants {
    fn default() -> Self {
        HitConstants::DEFAULT
    }
}

fn default_min_hit_chance() -> f64 {
    HitConstants::DEFAULT.min_chance
}
fn default_max_hit_chance() -> f64 {
    HitConstants::DEFAULT.max_chance
}
fn default_evasion_divisor() -> f64 {
    HitConstants::DEFAULT.evasion_divisor
}
fn default_evasion_exponent() -> f64 {
    HitConstants::DEFAULT.evasion_exponent
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistanceConstants {
    /// Formula: mitigated = damage × (1 - resistance / (resistance + factor × damage))
    #[serde(default = "default_damage_factor")]
    pub damage_factor: f64,
}

impl ResistanceConstants {
    pub const DEFAULT: ResistanceConstants = ResistanceConstants { damage_factor: 2.0 };
}

impl Default for ResistanceConstants {
    fn default() -> Self {
        ResistanceConstants::DEFAULT
    }
}

fn default_damage_factor() -> f64 {
    ResistanceConstants::DEFAULT.damage_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = CombatConstants::default();
        assert!((constants.hit.min_chance - 0.10).abs() < f64::EPSILON);
        assert!((constants.hit.max_chance - 0.95).abs() < f64::EPSILON);
        assert!((constants.resistance.damage_factor - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_partial_constants() {
        let toml = r#"
[hit]
max_chance = 0.9
"#;

        let constants: CombatConstants = toml::from_str(toml).unwrap();
        assert!((constants.hit.max_chance - 0.9).abs() < f64::EPSILON);
        assert!((constants.hit.evasion_divisor - 4.0).abs() < f64::EPSILON);
        assert_eq!(constants.resistance, ResistanceConstants::default());
    }
}
