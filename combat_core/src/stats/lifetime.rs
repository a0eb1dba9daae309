//! Modifier lifetimes and the liveness oracle they are checked against

use crate::types::{EntityId, GameTime};
use serde::{Deserialize, Serialize};

/// World state a lifetime is evaluated against
pub trait LifetimeOracle {
    /// Current game time
    fn now(&self) -> GameTime;

    /// Whether `entity` is still present and alive. Unknown ids are not alive.
    fn is_alive(&self, entity: EntityId) -> bool;
}

/// How long a modifier stays in a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// Never expires; stored apart from dynamic modifiers and never re-checked
    #[default]
    Permanent,
    /// Valid while `now < end`
    Timed { end: GameTime },
    /// Valid while the referenced entity is alive
    WhileAlive { entity: EntityId },
}

impl Lifetime {
    /// A timed lifetime lasting `duration_ms` from `now`
    pub fn timed(now: GameTime, duration_ms: i32) -> Lifetime {
        Lifetime::Timed {
            end: now.plus_ms(duration_ms as i64),
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Lifetime::Permanent)
    }

    /// Evaluate this lifetime against the current world state
    pub fn is_valid(&self, oracle: &dyn LifetimeOracle) -> bool {
        match self {
            Lifetime::Permanent => true,
            Lifetime::Timed { end } => oracle.now() < *end,
            Lifetime::WhileAlive { entity } => oracle.is_alive(*entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Snapshot {
        now: GameTime,
        alive: Vec<EntityId>,
    }

    impl LifetimeOracle for Snapshot {
        fn now(&self) -> GameTime {
            self.now
        }

        fn is_alive(&self, entity: EntityId) -> bool {
            self.alive.contains(&entity)
        }
    }

    #[test]
    fn test_timed_boundary() {
        let lifetime = Lifetime::timed(GameTime(1000), 500);
        let before = Snapshot { now: GameTime(1499), alive: vec![] };
        let at = Snapshot { now: GameTime(1500), alive: vec![] };
        assert!(lifetime.is_valid(&before));
        assert!(!lifetime.is_valid(&at));
    }

    #[test]
    fn test_while_alive_unknown_entity_is_dead() {
        let lifetime = Lifetime::WhileAlive { entity: EntityId(7) };
        let alive = Snapshot { now: GameTime::ZERO, alive: vec![EntityId(7)] };
        let gone = Snapshot { now: GameTime::ZERO, alive: vec![] };
        assert!(lifetime.is_valid(&alive));
        assert!(!lifetime.is_valid(&gone));
    }

    #[test]
    fn test_permanent_always_valid() {
        let snapshot = Snapshot { now: GameTime(u64::MAX), alive: vec![] };
        assert!(Lifetime::Permanent.is_valid(&snapshot));
    }
}
