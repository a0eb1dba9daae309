//! combat_core - Delegate-driven combat rules for creature battles
//!
//! This library provides:
//! - StatTable: Layered, copy-on-write modifier storage with typed stat values
//! - Delegates: Composable creature and skill behaviors dispatched through chains
//! - Effects: Deferred world mutations collected during dispatch and executed after
//! - World capabilities: The queries and executor a game world implements
//! - Arena: An in-memory world for running and testing battles

pub mod arena;
pub mod config;
pub mod creature;
pub mod delegates;
pub mod effect;
pub mod prelude;
pub mod stats;
pub mod types;
pub mod world;

// Re-export core types for convenience
pub use arena::{Arena, LoggedEffect};
pub use config::{default_base_stats, CombatConstants, ConfigError, RosterConfig};
pub use creature::{Creature, CreatureData, SkillData, SkillState, TargetedModifier};
pub use delegates::{
    execute_event, Context, CreatureContext, Delegate, DelegateChain, DelegateId, Hook,
    SkillContext, SkillScope,
};
pub use effect::{DelegateEvent, Effect, EffectError, FireProjectile, Results};
pub use stats::{stat, Lifetime, Modifier, Provenance, StatId, StatTable};
pub use types::{BoardPosition, DamageType, EntityId, GameTime, PlayerName, SkillId, SkillType};
pub use world::{RandomSource, ScriptedRandom, SeededRandom, World, WorldView};
