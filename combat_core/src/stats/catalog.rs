//! Typed stat descriptors
//!
//! Each constant pairs a [`StatId`] with the Rust type its value computes to, so
//! reads and modifier construction are checked at compile time:
//!
//! ```
//! use combat_core::stats::{stat, StatTable};
//!
//! let table = StatTable::new().insert(stat::ACCURACY.add(10));
//! assert_eq!(table.get(stat::ACCURACY), 10);
//! ```

use super::compute::{fold_bool, fold_numeric, fold_tagged};
use super::id::StatId;
use super::modifier::{Modifier, ModifierOperation, Operation, TaggedOperation};
use super::value::{DurationValue, IntRangeValue, NumericValue, PercentageValue, TaggedValues};
use crate::types::{DamageType, School};
use std::marker::PhantomData;

/// A stat whose value can be computed from its operations
pub trait Stat: Copy {
    type Value;

    fn id(self) -> StatId;

    /// Fold this stat's operations, given in insertion order
    fn compute<'a>(self, operations: impl Iterator<Item = &'a ModifierOperation>)
        -> Self::Value;
}

/// Numeric value kinds and their [`ModifierOperation`] variant
pub trait NumericKind: NumericValue + 'static {
    fn extract(operation: &ModifierOperation) -> Option<&Operation<Self>>;
    fn wrap(operation: Operation<Self>) -> ModifierOperation;
}

macro_rules! numeric_kind {
    ($ty:ty, $variant:ident) => {
        impl NumericKind for $ty {
            fn extract(operation: &ModifierOperation) -> Option<&Operation<Self>> {
                match operation {
                    ModifierOperation::$variant(op) => Some(op),
                    _ => None,
                }
            }

            fn wrap(operation: Operation<Self>) -> ModifierOperation {
                ModifierOperation::$variant(operation)
            }
        }
    };
}

numeric_kind!(i32, Int);
numeric_kind!(DurationValue, Duration);
numeric_kind!(PercentageValue, Percentage);
numeric_kind!(IntRangeValue, IntRange);

/// Tagged value kinds and their [`ModifierOperation`] variant
pub trait TaggedKind: 'static {
    type Tag: Ord + Copy + 'static;
    type Value: NumericValue + 'static;

    fn extract(operation: &ModifierOperation) -> Option<&TaggedOperation<Self::Tag, Self::Value>>;
    fn wrap(operation: TaggedOperation<Self::Tag, Self::Value>) -> ModifierOperation;
}

macro_rules! tagged_kind {
    ($marker:ident, $tag:ty, $value:ty, $variant:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl TaggedKind for $marker {
            type Tag = $tag;
            type Value = $value;

            fn extract(
                operation: &ModifierOperation,
            ) -> Option<&TaggedOperation<Self::Tag, Self::Value>> {
                match operation {
                    ModifierOperation::$variant(op) => Some(op),
                    _ => None,
                }
            }

            fn wrap(operation: TaggedOperation<Self::Tag, Self::Value>) -> ModifierOperation {
                ModifierOperation::$variant(operation)
            }
        }
    };
}

tagged_kind!(DamageInts, DamageType, i32, DamageInts);
tagged_kind!(DamageRanges, DamageType, IntRangeValue, DamageRanges);
tagged_kind!(SchoolInts, School, i32, SchoolInts);

/// A stat computing to a single numeric value
#[derive(Debug)]
pub struct NumericStat<V> {
    id: StatId,
    _kind: PhantomData<V>,
}

impl<V> Clone for NumericStat<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NumericStat<V> {}

impl<V: NumericKind> NumericStat<V> {
    const fn new(id: StatId) -> Self {
        NumericStat {
            id,
            _kind: PhantomData,
        }
    }

    pub fn add(self, value: V) -> Modifier {
        Modifier::new(self.id, V::wrap(Operation::Add(value)))
    }

    pub fn increase(self, pct: PercentageValue) -> Modifier {
        Modifier::new(self.id, V::wrap(Operation::Increase(pct)))
    }

    pub fn set(self, value: V) -> Modifier {
        Modifier::new(self.id, V::wrap(Operation::Overwrite(value)))
    }
}

impl<V: NumericKind> Stat for NumericStat<V> {
    type Value = V;

    fn id(self) -> StatId {
        self.id
    }

    fn compute<'a>(self, operations: impl Iterator<Item = &'a ModifierOperation>) -> V {
        fold_numeric(operations.filter_map(V::extract))
    }
}

/// A stat computing to a per-tag map
#[derive(Debug)]
pub struct TaggedStat<T> {
    id: StatId,
    _kind: PhantomData<T>,
}

impl<T> Clone for TaggedStat<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TaggedStat<T> {}

impl<T: TaggedKind> TaggedStat<T> {
    const fn new(id: StatId) -> Self {
        TaggedStat {
            id,
            _kind: PhantomData,
        }
    }

    pub fn add(self, values: TaggedValues<T::Tag, T::Value>) -> Modifier {
        Modifier::new(self.id, T::wrap(TaggedOperation::Add(values)))
    }

    pub fn increase(self, values: TaggedValues<T::Tag, PercentageValue>) -> Modifier {
        Modifier::new(self.id, T::wrap(TaggedOperation::Increase(values)))
    }

    pub fn set(self, values: TaggedValues<T::Tag, T::Value>) -> Modifier {
        Modifier::new(self.id, T::wrap(TaggedOperation::Overwrite(values)))
    }
}

impl<T: TaggedKind> Stat for TaggedStat<T> {
    type Value = TaggedValues<T::Tag, T::Value>;

    fn id(self) -> StatId {
        self.id
    }

    fn compute<'a>(self, operations: impl Iterator<Item = &'a ModifierOperation>) -> Self::Value {
        fold_tagged(operations.filter_map(T::extract))
    }
}

/// A boolean stat; the last overwrite wins, defaulting to false
#[derive(Debug, Clone, Copy)]
pub struct BoolStat {
    id: StatId,
}

impl BoolStat {
    const fn new(id: StatId) -> Self {
        BoolStat { id }
    }

    pub fn set(self, value: bool) -> Modifier {
        Modifier::new(self.id, ModifierOperation::Bool(value))
    }

    pub fn set_true(self) -> Modifier {
        self.set(true)
    }

    pub fn set_false(self) -> Modifier {
        self.set(false)
    }
}

impl Stat for BoolStat {
    type Value = bool;

    fn id(self) -> StatId {
        self.id
    }

    fn compute<'a>(self, operations: impl Iterator<Item = &'a ModifierOperation>) -> bool {
        fold_bool(operations.filter_map(|op| match op {
            ModifierOperation::Bool(value) => Some(value),
            _ => None,
        }))
    }
}

pub type IntStat = NumericStat<i32>;
pub type DurationStat = NumericStat<DurationValue>;
pub type PercentageStat = NumericStat<PercentageValue>;
pub type IntRangeStat = NumericStat<IntRangeValue>;
pub type DamageIntsStat = TaggedStat<DamageInts>;
pub type DamageRangesStat = TaggedStat<DamageRanges>;
pub type SchoolIntsStat = TaggedStat<SchoolInts>;

/// Every stat, typed by its value kind
pub mod stat {
    use super::*;

    pub const HEALTH: IntStat = NumericStat::new(StatId::Health);
    pub const BASE_DAMAGE: DamageRangesStat = TaggedStat::new(StatId::BaseDamage);
    pub const CREATURE_SPEED: IntStat = NumericStat::new(StatId::CreatureSpeed);
    pub const CRIT_CHANCE: PercentageStat = NumericStat::new(StatId::CritChance);
    pub const CRIT_MULTIPLIER: PercentageStat = NumericStat::new(StatId::CritMultiplier);
    pub const ACCURACY: IntStat = NumericStat::new(StatId::Accuracy);
    pub const EVASION: IntStat = NumericStat::new(StatId::Evasion);
    pub const DAMAGE_RESISTANCE: DamageIntsStat = TaggedStat::new(StatId::DamageResistance);
    pub const DAMAGE_REDUCTION: DamageIntsStat = TaggedStat::new(StatId::DamageReduction);
    pub const MELEE_HEALTH_DRAIN_PERCENT: PercentageStat =
        NumericStat::new(StatId::MeleeHealthDrainPercent);
    pub const HEALTH_GAIN_ON_MELEE_HIT: IntStat = NumericStat::new(StatId::HealthGainOnMeleeHit);
    pub const SKILL_SPEED_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::SkillSpeedMultiplier);
    pub const STUN_DURATION_ON_ENEMIES: DurationStat =
        NumericStat::new(StatId::StunDurationOnEnemies);
    pub const ADDED_STUN_CHANCE: PercentageStat = NumericStat::new(StatId::AddedStunChance);
    pub const MELEE_REFLECT: PercentageStat = NumericStat::new(StatId::MeleeReflect);
    pub const HEALTH_REGENERATION_PER_SECOND: IntStat =
        NumericStat::new(StatId::HealthRegenerationPerSecond);
    pub const MANA_COST: IntStat = NumericStat::new(StatId::ManaCost);
    pub const INFLUENCE_COST: SchoolIntsStat = TaggedStat::new(StatId::InfluenceCost);
    pub const PROJECTILE_SPEED: IntStat = NumericStat::new(StatId::ProjectileSpeed);
    pub const HITBOX_RADIUS: IntStat = NumericStat::new(StatId::HitboxRadius);
    pub const STARTING_MANA: IntStat = NumericStat::new(StatId::StartingMana);
    pub const INFLUENCE: SchoolIntsStat = TaggedStat::new(StatId::Influence);
    pub const STARTING_HAND_SIZE: IntStat = NumericStat::new(StatId::StartingHandSize);
    pub const MANA_GAIN: IntStat = NumericStat::new(StatId::ManaGain);
    pub const CARD_DRAW_INTERVAL: DurationStat = NumericStat::new(StatId::CardDrawInterval);
    pub const ENEMY_SPAWN_DELAY: DurationStat = NumericStat::new(StatId::EnemySpawnDelay);
    pub const INITIAL_ENEMY_SPAWN_DELAY: DurationStat =
        NumericStat::new(StatId::InitialEnemySpawnDelay);
    pub const ENEMIES_TO_SPAWN: IntStat = NumericStat::new(StatId::EnemiesToSpawn);
    pub const IS_MANA_CREATURE: BoolStat = BoolStat::new(StatId::IsManaCreature);
    pub const GAINED_DAMAGE_ON_KILL: IntStat = NumericStat::new(StatId::GainedDamageOnKill);
    pub const MAX_MELEE_AREA_TARGETS: IntStat = NumericStat::new(StatId::MaxMeleeAreaTargets);
    pub const PROJECTILE_DAMAGE_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::ProjectileDamageMultiplier);
    pub const CHAIN_PROJECTILE_DAMAGE_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::ChainProjectileDamageMultiplier);
    pub const SKILL_COOLDOWN_RECOVERY: PercentageStat =
        NumericStat::new(StatId::SkillCooldownRecovery);
    pub const KNOCKBACK_DURATION: DurationStat = NumericStat::new(StatId::KnockbackDuration);
    pub const MANA_GAIN_INTERVAL: DurationStat = NumericStat::new(StatId::ManaGainInterval);
    pub const USES_ACCURACY: BoolStat = BoolStat::new(StatId::UsesAccuracy);
    pub const CAN_CRIT: BoolStat = BoolStat::new(StatId::CanCrit);
    pub const CAN_STUN: BoolStat = BoolStat::new(StatId::CanStun);
    pub const IGNORES_DAMAGE_RESISTANCE: BoolStat = BoolStat::new(StatId::IgnoresDamageResistance);
    pub const IGNORES_DAMAGE_REDUCTION: BoolStat = BoolStat::new(StatId::IgnoresDamageReduction);
    pub const MAXIMUM_DAMAGE_REDUCTION: PercentageStat =
        NumericStat::new(StatId::MaximumDamageReduction);
    pub const MAXIMUM_DAMAGE_RESISTANCE: PercentageStat =
        NumericStat::new(StatId::MaximumDamageResistance);
    pub const MAXIMUM_STUN_CHANCE: PercentageStat = NumericStat::new(StatId::MaximumStunChance);
    pub const COOLDOWN: DurationStat = NumericStat::new(StatId::Cooldown);
    pub const ADDED_MANA_GAIN: IntStat = NumericStat::new(StatId::AddedManaGain);
    pub const MELEE_DAMAGE_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::MeleeDamageMultiplier);
    pub const PROJECTILE_SEQUENCE_COUNT: IntStat = NumericStat::new(StatId::ProjectileSequenceCount);
    pub const PROJECTILE_SEQUENCE_DELAY: DurationStat =
        NumericStat::new(StatId::ProjectileSequenceDelay);
    pub const PROJECTILE_ARC_COUNT: IntStat = NumericStat::new(StatId::ProjectileArcCount);
    pub const PROJECTILE_ARC_ROTATION_OFFSET: IntStat =
        NumericStat::new(StatId::ProjectileArcRotationOffset);
    pub const PROJECTILE_ADJACENTS_COUNT: IntStat =
        NumericStat::new(StatId::ProjectileAdjacentsCount);
    pub const PROJECTILE_ADJACENTS_OFFSET: IntStat =
        NumericStat::new(StatId::ProjectileAdjacentsOffset);
    pub const KNOCKBACK_DISTANCE_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::KnockbackDistanceMultiplier);
    pub const PROJECTILE_CHAIN_COUNT: IntStat = NumericStat::new(StatId::ProjectileChainCount);
    pub const MAX_PROJECTILE_TIMES_CHAINED: IntStat =
        NumericStat::new(StatId::MaxProjectileTimesChained);
    pub const UNTARGETED: BoolStat = BoolStat::new(StatId::Untargeted);
    pub const SAME_TARGET_ADDED_DAMAGE: DamageRangesStat =
        TaggedStat::new(StatId::SameTargetAddedDamage);
    pub const CURSE_DURATION: DurationStat = NumericStat::new(StatId::CurseDuration);
    pub const GLOBAL_DAMAGE_MULTIPLIER: PercentageStat =
        NumericStat::new(StatId::GlobalDamageMultiplier);
    pub const SHOCK_CHANCE: PercentageStat = NumericStat::new(StatId::ShockChance);
    pub const SHOCK_DURATION: DurationStat = NumericStat::new(StatId::ShockDuration);
    pub const IS_SHOCKED: BoolStat = BoolStat::new(StatId::IsShocked);
    pub const RECEIVE_CRITS_CHANCE: PercentageStat = NumericStat::new(StatId::ReceiveCritsChance);
    pub const SHOCK_ADDED_RECEIVE_CRITS_CHANCE: PercentageStat =
        NumericStat::new(StatId::ShockAddedReceiveCritsChance);
    pub const BUFF_DURATION: DurationStat = NumericStat::new(StatId::BuffDuration);
}
