//! Effects - deferred, data-only world mutations collected during dispatch

use crate::creature::{CreatureData, SkillState};
use crate::delegates::SkillScope;
use crate::stats::{DurationValue, Modifier, PercentageValue};
use crate::types::{BoardPosition, EntityId, PlayerName, SkillId, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An effect could not be applied to the current world state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    #[error("creature {0} no longer exists")]
    MissingCreature(EntityId),
    #[error("creature {0} is dead")]
    CreatureDead(EntityId),
    #[error("creature {creature} has no skill {skill:?}")]
    MissingSkill { creature: EntityId, skill: SkillId },
    #[error("projectile from creature {creature} skill {skill:?} cannot move")]
    StalledProjectile { creature: EntityId, skill: SkillId },
}

/// Floating combat text shown for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillEventKind {
    Missed,
    Evade,
    Crit,
    Stun,
}

/// Request to launch a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireProjectile {
    pub fired_by: EntityId,
    pub skill: SkillId,
    /// Index of the delegate that produced this request
    pub delegate_index: usize,
    pub origin: Vec2,
    pub direction: Vec2,
    #[serde(default)]
    pub delay_ms: i32,
    #[serde(default)]
    pub tracking: Option<EntityId>,
    #[serde(default)]
    pub times_chained: u32,
    #[serde(default)]
    pub skip_impacts: Vec<EntityId>,
}

impl FireProjectile {
    pub fn new(
        fired_by: EntityId,
        skill: SkillId,
        delegate_index: usize,
        origin: Vec2,
        direction: Vec2,
    ) -> Self {
        FireProjectile {
            fired_by,
            skill,
            delegate_index,
            origin,
            direction,
            delay_ms: 0,
            tracking: None,
            times_chained: 0,
            skip_impacts: Vec::new(),
        }
    }

    pub fn with_delay(mut self, delay_ms: i32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn tracking(mut self, target: EntityId) -> Self {
        self.tracking = Some(target);
        self
    }

    pub fn chained(mut self, times_chained: u32, skip_impacts: Vec<EntityId>) -> Self {
        self.times_chained = times_chained;
        self.skip_impacts = skip_impacts;
        self
    }
}

/// A lifecycle event dispatched through a delegate chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateEvent {
    Activate {
        creature: EntityId,
    },
    Death {
        creature: EntityId,
    },
    KilledEnemy {
        creature: EntityId,
        enemy: EntityId,
        damage: i32,
    },
    SkillStart(SkillScope),
    SkillUsed(SkillScope),
    SkillImpact(SkillScope),
    ApplyToTarget {
        scope: SkillScope,
        target: EntityId,
    },
    HitTarget {
        scope: SkillScope,
        target: EntityId,
        damage: i32,
    },
    FiredProjectile {
        scope: SkillScope,
        projectile: FireProjectile,
    },
}

impl DelegateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DelegateEvent::Activate { .. } => "on_activate",
            DelegateEvent::Death { .. } => "on_death",
            DelegateEvent::KilledEnemy { .. } => "on_killed_enemy",
            DelegateEvent::SkillStart(_) => "on_skill_start",
            DelegateEvent::SkillUsed(_) => "on_skill_used",
            DelegateEvent::SkillImpact(_) => "on_skill_impact",
            DelegateEvent::ApplyToTarget { .. } => "on_apply_to_target",
            DelegateEvent::HitTarget { .. } => "on_hit_target",
            DelegateEvent::FiredProjectile { .. } => "on_fired_projectile",
        }
    }
}

/// A deferred world mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "data", rename_all = "snake_case")]
pub enum Effect {
    ApplyDamage {
        source: EntityId,
        target: EntityId,
        amount: i32,
    },
    Heal {
        target: EntityId,
        amount: i32,
    },
    Stun {
        target: EntityId,
        duration: DurationValue,
    },
    Knockback {
        source: EntityId,
        target: EntityId,
        distance_multiplier: PercentageValue,
        duration: DurationValue,
    },
    FireProjectile(FireProjectile),
    /// Add a modifier to one creature's stat table
    ApplyModifier {
        target: EntityId,
        modifier: Modifier,
    },
    /// Add a modifier to a player's stat table
    ApplyModifierToOwner {
        owner: PlayerName,
        modifier: Modifier,
    },
    CreateCreature {
        data: CreatureData,
        position: Vec2,
        #[serde(default)]
        board: Option<BoardPosition>,
    },
    RemoveCreature {
        creature: EntityId,
    },
    /// An enemy left the board; counts toward the enemy spawn tally
    EnemyRemoved {
        creature: EntityId,
    },
    MarkSkillUsed {
        creature: EntityId,
        skill: SkillId,
    },
    SetSkillState {
        creature: EntityId,
        skill: SkillId,
        state: SkillState,
    },
    SkillEvent {
        creature: EntityId,
        kind: SkillEventKind,
    },
    DamageText {
        target: EntityId,
        amount: i32,
    },
    /// Dispatch another event once this dispatch's effects have executed
    Event(DelegateEvent),
}

impl Effect {
    /// Whether the world executor needs to see this effect
    pub fn touches_world(&self) -> bool {
        !matches!(self, Effect::Event(_))
    }

    /// The follow-on event this effect raises after execution
    pub fn raised_event(&self) -> Option<DelegateEvent> {
        match self {
            Effect::Event(event) => Some(event.clone()),
            Effect::FireProjectile(projectile) => Some(DelegateEvent::FiredProjectile {
                scope: SkillScope::new(projectile.fired_by, projectile.skill),
                projectile: projectile.clone(),
            }),
            _ => None,
        }
    }
}

/// Append-only buffer of effects produced by one dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    effects: Vec<Effect>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn extend(&mut self, effects: impl IntoIterator<Item = Effect>) {
        self.effects.extend(effects);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn as_slice(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

impl IntoIterator for Results {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec2;

    #[test]
    fn test_fire_projectile_raises_fired_event() {
        let fire = FireProjectile::new(EntityId(1), SkillId(2), 3, Vec2::ZERO, Vec2::new(1.0, 0.0));
        let effect = Effect::FireProjectile(fire.clone());
        match effect.raised_event() {
            Some(DelegateEvent::FiredProjectile { scope, projectile }) => {
                assert_eq!(scope.creature, EntityId(1));
                assert_eq!(projectile, fire);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(effect.touches_world());
    }

    #[test]
    fn test_event_effect_stays_in_core() {
        let effect = Effect::Event(DelegateEvent::Death {
            creature: EntityId(4),
        });
        assert!(!effect.touches_world());
        assert_eq!(effect.raised_event().map(|e| e.name()), Some("on_death"));
        assert_eq!(
            Effect::Heal { target: EntityId(1), amount: 3 }.raised_event(),
            None
        );
    }

    #[test]
    fn test_results_preserve_insertion_order() {
        let mut results = Results::new();
        results.push(Effect::Heal { target: EntityId(1), amount: 1 });
        results.push(Effect::Heal { target: EntityId(2), amount: 2 });
        let targets: Vec<EntityId> = results
            .iter()
            .map(|e| match e {
                Effect::Heal { target, .. } => *target,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(targets, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_effects_serialize_with_tag() {
        let json = serde_json::to_value(Effect::Stun {
            target: EntityId(9),
            duration: DurationValue::from_millis(500),
        })
        .unwrap();
        assert_eq!(json["effect"], "stun");
        assert_eq!(json["data"]["target"], 9);
    }
}
