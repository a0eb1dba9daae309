//! On-hit delegates - damage streaks, knockback, shocks and curses

use super::context::SkillContext;
use super::{DamageByType, Delegate, Hook};
use crate::creature::SkillState;
use crate::effect::{Effect, Results};
use crate::stats::{stat, DurationValue, Lifetime, Modifier, Provenance};
use crate::types::EntityId;

/// The skill's targeted modifiers, each lasting `duration` from now
///
/// Panics when a targeted modifier also grants a delegate; granting delegates to
/// other creatures is not supported.
pub(super) fn timed_targeted_modifiers(c: &SkillContext<'_>, duration: DurationValue) -> Vec<Modifier> {
    let lifetime = Lifetime::timed(c.now(), duration.millis);
    c.skill()
        .targeted_modifiers
        .iter()
        .map(|targeted| {
            if let Some(delegate) = targeted.delegate {
                panic!(
                    "skill {} grants delegate {:?} through a targeted modifier, which is not supported",
                    c.skill().name,
                    delegate
                );
            }
            targeted
                .modifier
                .clone()
                .with_lifetime(lifetime)
                .with_provenance(Provenance::StatusEffect {
                    name: c.skill().name.clone(),
                })
        })
        .collect()
}

/// Adds SameTargetAddedDamage for each consecutive hit on the same creature
#[derive(Debug, Clone, Copy, Default)]
pub struct AddedDamageOnRepeatedHits;

impl Delegate for AddedDamageOnRepeatedHits {
    fn name(&self) -> &'static str {
        "added_damage_on_repeated_hits"
    }

    fn transform_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        let state = c.skill_state();
        if state.last_creature_hit != Some(target) {
            return Hook::Implemented(damage.clone());
        }
        let world = c.world();
        let times_hit = state.times_hit as i32;
        let added = c
            .get(stat::SAME_TARGET_ADDED_DAMAGE)
            .map_values(|_, range| times_hit * world.roll_range(range.low, range.high));
        Hook::Implemented(damage.plus(&added))
    }

    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        let state = c.skill_state();
        let next = if state.last_creature_hit == Some(target) {
            SkillState {
                times_hit: state.times_hit + 1,
                ..state
            }
        } else {
            SkillState {
                last_creature_hit: Some(target),
                times_hit: 1,
            }
        };
        results.push(Effect::SetSkillState {
            creature: c.id(),
            skill: c.skill_id(),
            state: next,
        });
    }
}

/// Melee hits push the target back
#[derive(Debug, Clone, Copy, Default)]
pub struct KnockbackOnHit;

impl Delegate for KnockbackOnHit {
    fn name(&self) -> &'static str {
        "knockback_on_hit"
    }

    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        if !c.skill().is_melee() {
            return;
        }
        results.push(Effect::Knockback {
            source: c.id(),
            target,
            distance_multiplier: c.get(stat::KNOCKBACK_DISTANCE_MULTIPLIER),
            duration: c.get(stat::KNOCKBACK_DURATION),
        });
    }
}

/// Hits may shock the target, making it easier to crit
#[derive(Debug, Clone, Copy, Default)]
pub struct ChanceToShock;

impl Delegate for ChanceToShock {
    fn name(&self) -> &'static str {
        "chance_to_shock"
    }

    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        if !c.world().roll_chance(c.get(stat::SHOCK_CHANCE).as_multiplier()) {
            return;
        }
        let lifetime = Lifetime::timed(c.now(), c.get(stat::SHOCK_DURATION).millis);
        let provenance = Provenance::StatusEffect {
            name: "shocked".to_string(),
        };
        for modifier in [
            stat::IS_SHOCKED.set_true(),
            stat::RECEIVE_CRITS_CHANCE.add(c.get(stat::SHOCK_ADDED_RECEIVE_CRITS_CHANCE)),
        ] {
            results.push(Effect::ApplyModifier {
                target,
                modifier: modifier
                    .with_lifetime(lifetime)
                    .with_provenance(provenance.clone()),
            });
        }
    }
}

/// Curses each hit target with the skill's targeted modifiers for CurseDuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyTargetedAffixesOnHit;

impl Delegate for ApplyTargetedAffixesOnHit {
    fn name(&self) -> &'static str {
        "apply_targeted_affixes_on_hit"
    }

    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        for modifier in timed_targeted_modifiers(c, c.get(stat::CURSE_DURATION)) {
            results.push(Effect::ApplyModifier { target, modifier });
        }
    }
}
