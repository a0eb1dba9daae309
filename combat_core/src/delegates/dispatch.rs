//! Event dispatch and query entry points for the world layer
//!
//! Dispatch runs in two phases. First the event's delegate chain is invoked
//! against a read-only [`WorldView`], collecting effects into [`Results`]. Then
//! every effect is executed in insertion order, and only after all of them have
//! run are the events they raise dispatched, each as a new independent cycle.

use super::context::{Context, CreatureContext, SkillContext, SkillScope};
use super::Delegate;
use crate::effect::{DelegateEvent, Results};
use crate::types::EntityId;
use crate::world::{World, WorldView};
use tracing::{debug, trace};

/// Collect the effects every delegate produces for `event`
///
/// Returns no effects when the event's creature or skill no longer exists.
pub fn collect(world: &dyn WorldView, event: &DelegateEvent) -> Results {
    let mut results = Results::new();
    let found = match event {
        DelegateEvent::Activate { creature } => creature_event(world, *creature, &mut results, |d, c, r| {
            d.on_activate(c, r)
        }),
        DelegateEvent::Death { creature } => creature_event(world, *creature, &mut results, |d, c, r| {
            d.on_death(c, r)
        }),
        DelegateEvent::KilledEnemy {
            creature,
            enemy,
            damage,
        } => creature_event(world, *creature, &mut results, |d, c, r| {
            d.on_killed_enemy(c, *enemy, *damage, r)
        }),
        DelegateEvent::SkillStart(scope) => skill_event(world, scope, &mut results, |d, c, r| {
            d.on_skill_start(c, r)
        }),
        DelegateEvent::SkillUsed(scope) => skill_event(world, scope, &mut results, |d, c, r| {
            d.on_skill_used(c, r)
        }),
        DelegateEvent::SkillImpact(scope) => skill_event(world, scope, &mut results, |d, c, r| {
            d.on_skill_impact(c, r)
        }),
        DelegateEvent::ApplyToTarget { scope, target } => {
            skill_event(world, scope, &mut results, |d, c, r| {
                d.on_apply_to_target(c, *target, r)
            })
        }
        DelegateEvent::HitTarget {
            scope,
            target,
            damage,
        } => skill_event(world, scope, &mut results, |d, c, r| {
            d.on_hit_target(c, *target, *damage, r)
        }),
        DelegateEvent::FiredProjectile { scope, projectile } => {
            skill_event(world, scope, &mut results, |d, c, r| {
                d.on_fired_projectile(c, projectile, r)
            })
        }
    };
    if !found {
        debug!(event = event.name(), "event target no longer exists, skipping dispatch");
    }
    results
}

fn creature_event(
    world: &dyn WorldView,
    creature: EntityId,
    results: &mut Results,
    hook: impl Fn(&dyn Delegate, &CreatureContext<'_>, &mut Results),
) -> bool {
    match CreatureContext::new(world, creature) {
        Some(c) => {
            c.chain().invoke_event(&c, results, hook);
            true
        }
        None => false,
    }
}

fn skill_event(
    world: &dyn WorldView,
    scope: &SkillScope,
    results: &mut Results,
    hook: impl Fn(&dyn Delegate, &SkillContext<'_>, &mut Results),
) -> bool {
    match SkillContext::new(world, scope) {
        Some(c) => {
            c.chain().invoke_event(&c, results, hook);
            true
        }
        None => false,
    }
}

/// Dispatch `event`, execute its effects, then dispatch everything they raise
pub fn execute_event<W: World>(world: &mut W, event: DelegateEvent) {
    dispatch(world, event, 0);
}

fn dispatch<W: World>(world: &mut W, event: DelegateEvent, depth: usize) {
    trace!(event = event.name(), depth, "dispatching");
    let results = {
        let view: &dyn WorldView = &*world;
        collect(view, &event)
    };

    // Phase two: every effect runs before any raised event dispatches
    let mut raised: Vec<DelegateEvent> = Vec::new();
    for effect in results.iter() {
        let mut reported = Vec::new();
        if effect.touches_world() {
            match world.execute(effect) {
                Ok(events) => reported = events,
                Err(err) => {
                    debug!(error = %err, ?effect, "effect no longer applies, skipping");
                    continue;
                }
            }
        }
        raised.extend(effect.raised_event());
        raised.extend(reported);
    }

    for next in raised {
        dispatch(world, next, depth + 1);
    }
}

/// Query entry points answering a single hook for a creature or skill
pub mod resolve {
    use crate::delegates::{Context, CreatureContext, DamageByType, SkillContext, SkillScope};
    use crate::types::{Collider, EntityId, SkillId};
    use crate::world::WorldView;

    /// The skill `creature` wants to use now, if any
    pub fn select_skill(world: &dyn WorldView, creature: EntityId) -> Option<SkillId> {
        let c = CreatureContext::new(world, creature)?;
        c.chain().select_skill(&c)
    }

    pub fn melee_could_hit(world: &dyn WorldView, creature: EntityId) -> bool {
        CreatureContext::new(world, creature).is_some_and(|c| c.chain().melee_could_hit(&c))
    }

    pub fn projectile_could_hit(world: &dyn WorldView, creature: EntityId) -> bool {
        CreatureContext::new(world, creature).is_some_and(|c| c.chain().projectile_could_hit(&c))
    }

    pub fn get_collider(world: &dyn WorldView, scope: &SkillScope) -> Option<Collider> {
        let c = SkillContext::new(world, scope)?;
        Some(c.chain().get_collider(&c))
    }

    pub fn find_targets(world: &dyn WorldView, scope: &SkillScope) -> Vec<EntityId> {
        SkillContext::new(world, scope)
            .map(|c| c.chain().find_targets(&c))
            .unwrap_or_default()
    }

    /// Whether an in-flight projectile should pass through without impacting
    pub fn should_skip_projectile_impact(world: &dyn WorldView, scope: &SkillScope) -> bool {
        SkillContext::new(world, scope).is_some_and(|c| c.chain().should_skip_projectile_impact(&c))
    }

    pub fn roll_for_base_damage(
        world: &dyn WorldView,
        scope: &SkillScope,
        target: EntityId,
    ) -> Option<DamageByType> {
        let c = SkillContext::new(world, scope)?;
        Some(c.chain().roll_for_base_damage(&c, target))
    }

    pub fn transform_damage(
        world: &dyn WorldView,
        scope: &SkillScope,
        target: EntityId,
        damage: DamageByType,
    ) -> Option<DamageByType> {
        let c = SkillContext::new(world, scope)?;
        Some(c.chain().transform_damage(&c, target, damage))
    }

    pub fn compute_final_damage(
        world: &dyn WorldView,
        scope: &SkillScope,
        target: EntityId,
        damage: &DamageByType,
        is_critical_hit: bool,
    ) -> Option<i32> {
        let c = SkillContext::new(world, scope)?;
        Some(c.chain().compute_final_damage(&c, target, damage, is_critical_hit))
    }
}
