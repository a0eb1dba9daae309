//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{
    BoardPosition, Collider, DamageType, EntityId, GameTime, PlayerName, School, SkillId,
    SkillType, Vec2,
};

// Stats
pub use crate::stats::{
    stat, DurationValue, IntRangeValue, Lifetime, Modifier, PercentageValue, Provenance, StatId,
    StatTable, TaggedValues,
};

// Creatures
pub use crate::creature::{Creature, CreatureData, SkillData, SkillState, TargetedModifier};

// Delegates and dispatch
pub use crate::delegates::{
    execute_event, resolve, Context, CreatureContext, DamageByType, Delegate, DelegateChain,
    DelegateId, Hook, SkillContext, SkillScope,
};
pub use crate::effect::{DelegateEvent, Effect, EffectError, FireProjectile, Results};

// World
pub use crate::arena::Arena;
pub use crate::world::{
    Clock, EffectExecutor, EntityQuery, RandomSource, ScriptedRandom, SeededRandom, SpatialQuery,
    World, WorldView,
};

// Config
pub use crate::config::{default_base_stats, load_roster, parse_roster, CombatConstants, RosterConfig};
