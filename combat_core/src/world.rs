//! Capabilities the rules engine consumes from the surrounding game world
//!
//! The core never reaches for global state: everything it needs to know about the
//! world arrives through these traits, and everything it wants to change leaves as
//! [`Effect`](crate::effect::Effect) values handed to an [`EffectExecutor`].

use crate::config::CombatConstants;
use crate::creature::Creature;
use crate::effect::{DelegateEvent, Effect, EffectError};
use crate::stats::LifetimeOracle;
use crate::types::{BoardPosition, Collider, EntityId, GameTime, PlayerName, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Entity registry lookups
pub trait EntityQuery {
    /// The creature with this id, alive or dead, if it is still registered
    fn creature(&self, id: EntityId) -> Option<&Creature>;

    /// Whether the creature is registered and alive
    fn is_alive(&self, id: EntityId) -> bool {
        self.creature(id).is_some_and(Creature::is_alive)
    }
}

/// Collision and board queries
pub trait SpatialQuery {
    /// Living creatures on `team` whose hitbox overlaps `collider`, nearest first
    fn overlapping(&self, collider: &Collider, team: PlayerName) -> Vec<EntityId>;

    /// First living creature on `team` along the ray from `origin`
    fn raycast(&self, origin: Vec2, direction: Vec2, team: PlayerName) -> Option<EntityId>;

    /// Every living creature on `team`
    fn creatures_of(&self, team: PlayerName) -> Vec<EntityId>;

    /// Living creatures on `team` placed on cells adjacent to `position`
    fn adjacent_creatures(&self, position: BoardPosition, team: PlayerName) -> Vec<EntityId>;
}

/// Game clock
pub trait Clock {
    fn now(&self) -> GameTime;
}

/// Uniform random draws; implementations must be seedable for deterministic tests
pub trait RandomSource {
    /// A uniform draw in `[0, 1)`
    fn next_unit(&self) -> f64;

    /// True with probability `chance`
    fn roll_chance(&self, chance: f64) -> bool {
        self.next_unit() < chance
    }

    /// Uniform integer in `low..=high`
    fn roll_range(&self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64 + 1) as f64;
        let offset = (self.next_unit() * span).floor() as i64;
        (low as i64 + offset.min(high as i64 - low as i64)) as i32
    }

    /// Uniform index into a collection of `len` items
    fn choose_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.roll_range(0, len as i32 - 1) as usize)
        }
    }
}

/// Read-only view of the world available during dispatch
pub trait WorldView: EntityQuery + SpatialQuery + Clock + RandomSource {
    /// Constants for the default combat formulas
    fn constants(&self) -> &CombatConstants {
        &CombatConstants::DEFAULT
    }
}

/// Interprets effects against the world
pub trait EffectExecutor {
    /// Apply `effect`, returning follow-on events it caused (e.g. a death)
    ///
    /// Returns an error when the effect no longer applies to the current world,
    /// such as a target that has already been removed.
    fn execute(&mut self, effect: &Effect) -> Result<Vec<DelegateEvent>, EffectError>;
}

/// A world the dispatcher can both read and mutate
pub trait World: WorldView + EffectExecutor {}

impl<T: WorldView + EffectExecutor> World for T {}

/// Evaluates modifier lifetimes against a world's clock and registry
pub struct WorldOracle<'a, W: ?Sized>(pub &'a W);

impl<W: EntityQuery + Clock + ?Sized> LifetimeOracle for WorldOracle<'_, W> {
    fn now(&self) -> GameTime {
        self.0.now()
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.0.is_alive(entity)
    }
}

/// ChaCha-backed random source
#[derive(Debug)]
pub struct SeededRandom {
    rng: RefCell<ChaCha8Rng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        self.rng.borrow_mut().gen::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats a fallback value
#[derive(Debug)]
pub struct ScriptedRandom {
    draws: RefCell<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        ScriptedRandom {
            draws: RefCell::new(draws.into_iter().collect()),
            fallback,
        }
    }

    /// Always returns `value`
    pub fn constant(value: f64) -> Self {
        ScriptedRandom::new([], value)
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        self.draws.borrow_mut().pop_front().unwrap_or(self.fallback)
    }
}
