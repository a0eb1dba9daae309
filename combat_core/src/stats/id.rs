//! Stat identifiers and their value kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value kind a stat computes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Int,
    Bool,
    Duration,
    Percentage,
    IntRange,
    /// Damage type -> int
    DamageInts,
    /// Damage type -> int range
    DamageRanges,
    /// School -> int
    SchoolInts,
}

macro_rules! stat_ids {
    ($( $variant:ident = $num:literal : $kind:ident ),+ $(,)?) => {
        /// Stable numeric identifier for a named stat
        ///
        /// Numbers are referenced from authored data and must never be reused.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum StatId {
            $( $variant = $num ),+
        }

        impl StatId {
            /// Every known stat, in id order
            pub fn all() -> &'static [StatId] {
                &[ $( StatId::$variant ),+ ]
            }

            /// The value kind this stat computes to
            pub fn kind(self) -> StatKind {
                match self {
                    $( StatId::$variant => StatKind::$kind ),+
                }
            }

            /// Look up a stat by its stable number
            pub fn from_number(number: u32) -> Option<StatId> {
                match number {
                    $( $num => Some(StatId::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

stat_ids! {
    Health = 1: Int,
    BaseDamage = 2: DamageRanges,
    CreatureSpeed = 3: Int,
    CritChance = 4: Percentage,
    CritMultiplier = 5: Percentage,
    Accuracy = 6: Int,
    Evasion = 7: Int,
    DamageResistance = 8: DamageInts,
    DamageReduction = 9: DamageInts,
    MeleeHealthDrainPercent = 10: Percentage,
    HealthGainOnMeleeHit = 11: Int,
    SkillSpeedMultiplier = 12: Percentage,
    StunDurationOnEnemies = 13: Duration,
    AddedStunChance = 15: Percentage,
    MeleeReflect = 17: Percentage,
    HealthRegenerationPerSecond = 18: Int,
    ManaCost = 19: Int,
    InfluenceCost = 20: SchoolInts,
    ProjectileSpeed = 21: Int,
    HitboxRadius = 22: Int,
    StartingMana = 24: Int,
    Influence = 25: SchoolInts,
    StartingHandSize = 26: Int,
    ManaGain = 27: Int,
    CardDrawInterval = 28: Duration,
    EnemySpawnDelay = 29: Duration,
    InitialEnemySpawnDelay = 30: Duration,
    EnemiesToSpawn = 31: Int,
    IsManaCreature = 32: Bool,
    GainedDamageOnKill = 33: Int,
    MaxMeleeAreaTargets = 34: Int,
    ProjectileDamageMultiplier = 35: Percentage,
    ChainProjectileDamageMultiplier = 36: Percentage,
    SkillCooldownRecovery = 37: Percentage,
    KnockbackDuration = 38: Duration,
    ManaGainInterval = 39: Duration,
    UsesAccuracy = 40: Bool,
    CanCrit = 41: Bool,
    CanStun = 42: Bool,
    IgnoresDamageResistance = 43: Bool,
    IgnoresDamageReduction = 44: Bool,
    MaximumDamageReduction = 45: Percentage,
    MaximumDamageResistance = 46: Percentage,
    MaximumStunChance = 47: Percentage,
    Cooldown = 48: Duration,
    AddedManaGain = 49: Int,
    MeleeDamageMultiplier = 50: Percentage,
    ProjectileSequenceCount = 51: Int,
    ProjectileSequenceDelay = 52: Duration,
    ProjectileArcCount = 53: Int,
    ProjectileArcRotationOffset = 54: Int,
    ProjectileAdjacentsCount = 55: Int,
    ProjectileAdjacentsOffset = 56: Int,
    KnockbackDistanceMultiplier = 57: Percentage,
    ProjectileChainCount = 58: Int,
    MaxProjectileTimesChained = 59: Int,
    Untargeted = 60: Bool,
    SameTargetAddedDamage = 61: DamageRanges,
    CurseDuration = 62: Duration,
    GlobalDamageMultiplier = 63: Percentage,
    ShockChance = 64: Percentage,
    ShockDuration = 65: Duration,
    IsShocked = 66: Bool,
    ReceiveCritsChance = 67: Percentage,
    ShockAddedReceiveCritsChance = 68: Percentage,
    BuffDuration = 69: Duration,
}

impl StatId {
    pub fn number(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_are_stable() {
        assert_eq!(StatId::Health.number(), 1);
        assert_eq!(StatId::BaseDamage.number(), 2);
        assert_eq!(StatId::StunDurationOnEnemies.number(), 13);
        assert_eq!(StatId::AddedStunChance.number(), 15);
        assert_eq!(StatId::BuffDuration.number(), 69);
    }

    #[test]
    fn test_from_number_round_trips_every_id() {
        for id in StatId::all() {
            assert_eq!(StatId::from_number(id.number()), Some(*id));
        }
        assert_eq!(StatId::from_number(14), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(StatId::BaseDamage.kind(), StatKind::DamageRanges);
        assert_eq!(StatId::Influence.kind(), StatKind::SchoolInts);
        assert_eq!(StatId::CanCrit.kind(), StatKind::Bool);
        assert_eq!(StatId::Cooldown.kind(), StatKind::Duration);
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&StatId::MeleeDamageMultiplier).unwrap();
        assert_eq!(json, "\"melee_damage_multiplier\"");
    }
}
