//! Default delegate - baseline targeting, hit, damage and skill selection rules

use super::context::{Context, CreatureContext, SkillContext};
use super::{DamageByType, Delegate, Hook};
use crate::config::{HitConstants, ResistanceConstants};
use crate::creature::SkillData;
use crate::effect::{DelegateEvent, Effect, FireProjectile, Results, SkillEventKind};
use crate::stats::{stat, PercentageValue};
use crate::types::{Collider, EntityId, PlayerName, SkillId};

/// Terminal delegate of every chain; implements every query hook
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDelegate;

// ============================================================================
// Formulas
// ============================================================================

/// Chance to hit: `accuracy / (accuracy + (evasion / divisor) ^ exponent)`, clamped
pub fn hit_chance(accuracy: i32, evasion: i32, constants: &HitConstants) -> f64 {
    let accuracy = accuracy.max(0) as f64;
    let evasion_term = (evasion.max(0) as f64 / constants.evasion_divisor)
        .powf(constants.evasion_exponent);
    let denominator = accuracy + evasion_term;
    if denominator <= 0.0 {
        return constants.max_chance;
    }
    (accuracy / denominator).clamp(constants.min_chance, constants.max_chance)
}

/// Flat reduction, never removing more than `maximum` of the damage
pub fn apply_reduction(damage: i32, reduction: i32, maximum: PercentageValue) -> i32 {
    let floor = (damage as f64 * (1.0 - maximum.as_multiplier())).round() as i32;
    floor.max(damage - reduction)
}

/// Resistance with diminishing returns against large hits, capped at `maximum`
///
/// `mitigated = damage × clamp01(1 - r / (r + factor × damage))`
pub fn apply_resistance(
    damage: i32,
    resistance: i32,
    maximum: PercentageValue,
    constants: &ResistanceConstants,
) -> i32 {
    let d = damage as f64;
    let r = resistance as f64;
    let floor = d * (1.0 - maximum.as_multiplier());
    let denominator = r + constants.damage_factor * d;
    let mitigated = if denominator == 0.0 {
        d
    } else {
        (1.0 - r / denominator).clamp(0.0, 1.0) * d
    };
    floor.max(mitigated).round() as i32
}

/// Stun chance from damage dealt relative to the target's health
pub fn stun_chance(added: PercentageValue, damage: i32, target_health: i32, maximum: PercentageValue) -> f64 {
    let from_damage = if target_health > 0 {
        damage as f64 / target_health as f64
    } else {
        0.0
    };
    (added.as_multiplier() + from_damage).clamp(0.0, maximum.as_multiplier().max(0.0))
}

// ============================================================================
// Skill selection
// ============================================================================

fn cooldown_millis(c: &CreatureContext<'_>, skill: &SkillData) -> i32 {
    c.creature()
        .skill_stats(skill.id)
        .map(|table| table.get(stat::COOLDOWN).millis)
        .unwrap_or(0)
}

fn cooldown_available(c: &CreatureContext<'_>, skill: &SkillData) -> bool {
    match c.creature().last_used(skill.id) {
        None => true,
        Some(last) => last.plus_ms(cooldown_millis(c, skill) as i64) <= c.now(),
    }
}

/// The available matching skill with the longest cooldown (first wins ties)
fn select_matching(
    c: &CreatureContext<'_>,
    predicate: impl Fn(&SkillData) -> bool,
) -> Option<SkillId> {
    let mut best: Option<(i32, SkillId)> = None;
    for skill in c.creature().skills() {
        if !predicate(skill) || !cooldown_available(c, skill) {
            continue;
        }
        let cooldown = cooldown_millis(c, skill);
        if best.map_or(true, |(longest, _)| cooldown > longest) {
            best = Some((cooldown, skill.id));
        }
    }
    best.map(|(_, id)| id)
}

// ============================================================================
// Hooks
// ============================================================================

impl Delegate for DefaultDelegate {
    fn name(&self) -> &'static str {
        "default"
    }

    fn on_death(&self, c: &CreatureContext<'_>, results: &mut Results) {
        results.push(Effect::RemoveCreature { creature: c.id() });
        if c.owner() == PlayerName::Enemy {
            results.push(Effect::EnemyRemoved { creature: c.id() });
        }
    }

    fn on_skill_used(&self, c: &SkillContext<'_>, results: &mut Results) {
        results.push(Effect::MarkSkillUsed {
            creature: c.id(),
            skill: c.skill_id(),
        });
        if c.skill().is_projectile() {
            results.push(Effect::FireProjectile(FireProjectile::new(
                c.id(),
                c.skill_id(),
                c.delegate_index(),
                c.creature().position,
                c.owner().forward(),
            )));
        }
    }

    fn on_skill_impact(&self, c: &SkillContext<'_>, results: &mut Results) {
        if c.get(stat::UNTARGETED) {
            return;
        }
        let scope = c.scope();
        for target in c.chain().find_targets(c) {
            results.push(Effect::Event(DelegateEvent::ApplyToTarget {
                scope: scope.clone(),
                target,
            }));
        }
    }

    fn on_apply_to_target(&self, c: &SkillContext<'_>, target: EntityId, results: &mut Results) {
        let chain = c.chain();

        if c.get(stat::USES_ACCURACY) && !chain.roll_for_hit(c, target) {
            results.push(match c.owner() {
                PlayerName::User => Effect::SkillEvent {
                    creature: c.id(),
                    kind: SkillEventKind::Missed,
                },
                PlayerName::Enemy => Effect::SkillEvent {
                    creature: target,
                    kind: SkillEventKind::Evade,
                },
            });
            return;
        }

        let is_critical_hit = c.get(stat::CAN_CRIT) && chain.roll_for_crit(c, target);
        if is_critical_hit {
            results.push(Effect::SkillEvent {
                creature: c.id(),
                kind: SkillEventKind::Crit,
            });
        }

        let damage = chain.roll_for_base_damage(c, target);
        let damage = chain.transform_damage(c, target, damage);
        let total = chain.compute_final_damage(c, target, &damage, is_critical_hit);

        results.push(Effect::Event(DelegateEvent::HitTarget {
            scope: c.scope(),
            target,
            damage: total,
        }));

        if total == 0 {
            return;
        }

        results.push(Effect::ApplyDamage {
            source: c.id(),
            target,
            amount: total,
        });
        results.push(Effect::DamageText {
            target,
            amount: total,
        });

        let drain = chain.compute_health_drain(c, target, total);
        if drain > 0 {
            results.push(Effect::Heal {
                target: c.id(),
                amount: drain,
            });
        }

        if c.get(stat::CAN_STUN) && chain.roll_for_stun(c, target, total) {
            results.push(Effect::Stun {
                target,
                duration: c.get(stat::STUN_DURATION_ON_ENEMIES),
            });
            results.push(Effect::SkillEvent {
                creature: target,
                kind: SkillEventKind::Stun,
            });
        }
    }

    fn select_skill(&self, c: &CreatureContext<'_>) -> Hook<Option<SkillId>> {
        let chain = c.chain();
        if chain.melee_could_hit(c) {
            if let Some(skill) = select_matching(c, SkillData::is_melee) {
                return Hook::Implemented(Some(skill));
            }
        }
        if chain.projectile_could_hit(c) {
            if let Some(skill) = select_matching(c, SkillData::is_projectile) {
                return Hook::Implemented(Some(skill));
            }
        }
        Hook::Implemented(select_matching(c, |s| !s.is_melee() && !s.is_projectile()))
    }

    fn get_collider(&self, c: &SkillContext<'_>) -> Hook<Collider> {
        Hook::Implemented(match c.projectile() {
            Some(projectile) => projectile.collider(),
            None => c.creature().collider(),
        })
    }

    fn find_targets(&self, c: &SkillContext<'_>) -> Hook<Vec<EntityId>> {
        let chain = c.chain();
        let collider = chain.get_collider(c);
        let hits = c.world().overlapping(&collider, c.owner().opponent());
        Hook::Implemented(chain.filter_targets(c, &hits))
    }

    fn filter_targets(&self, c: &SkillContext<'_>, hits: &[EntityId]) -> Hook<Vec<EntityId>> {
        if !c.skill().is_melee() {
            return Hook::Implemented(hits.to_vec());
        }
        let max_targets = c.get(stat::MAX_MELEE_AREA_TARGETS);
        assert!(
            max_targets > 0,
            "MaxMeleeAreaTargets must be positive for melee skill {}, got {}",
            c.skill().name,
            max_targets
        );
        Hook::Implemented(hits.iter().copied().take(max_targets as usize).collect())
    }

    fn roll_for_hit(&self, c: &SkillContext<'_>, target: EntityId) -> Hook<bool> {
        let evasion = c
            .lookup(target)
            .map_or(0, |t| t.stats.get(stat::EVASION));
        let chance = hit_chance(c.get(stat::ACCURACY), evasion, &c.world().constants().hit);
        Hook::Implemented(c.world().roll_chance(chance))
    }

    fn roll_for_crit(&self, c: &SkillContext<'_>, target: EntityId) -> Hook<bool> {
        let receive = c
            .lookup(target)
            .map_or(0.0, |t| t.stats.get(stat::RECEIVE_CRITS_CHANCE).as_multiplier());
        let chance = c.get(stat::CRIT_CHANCE).as_multiplier() + receive;
        Hook::Implemented(c.world().roll_chance(chance))
    }

    fn roll_for_base_damage(&self, c: &SkillContext<'_>, _target: EntityId) -> Hook<DamageByType> {
        let world = c.world();
        Hook::Implemented(
            c.get(stat::BASE_DAMAGE)
                .map_values(|_, range| world.roll_range(range.low, range.high)),
        )
    }

    fn apply_damage_reduction(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        let reduction = c
            .lookup(target)
            .map(|t| t.stats.get(stat::DAMAGE_REDUCTION))
            .unwrap_or_default();
        let maximum = c.get(stat::MAXIMUM_DAMAGE_REDUCTION);
        Hook::Implemented(damage.map_values(|tag, amount| {
            apply_reduction(amount, reduction.get(tag).unwrap_or(0), maximum)
        }))
    }

    fn apply_damage_resistance(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        let resistance = c
            .lookup(target)
            .map(|t| t.stats.get(stat::DAMAGE_RESISTANCE))
            .unwrap_or_default();
        let maximum = c.get(stat::MAXIMUM_DAMAGE_RESISTANCE);
        let constants = &c.world().constants().resistance;
        Hook::Implemented(damage.map_values(|tag, amount| {
            apply_resistance(amount, resistance.get(tag).unwrap_or(0), maximum, constants)
        }))
    }

    fn compute_final_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
        is_critical_hit: bool,
    ) -> Hook<i32> {
        let chain = c.chain();
        let damage = if c.get(stat::IGNORES_DAMAGE_REDUCTION) {
            damage.clone()
        } else {
            chain.apply_damage_reduction(c, target, damage)
        };
        let damage = if c.get(stat::IGNORES_DAMAGE_RESISTANCE) {
            damage
        } else {
            chain.apply_damage_resistance(c, target, &damage)
        };

        let mut total = damage.total();
        if is_critical_hit {
            total = c.get(stat::CRIT_MULTIPLIER).calculate_fraction(total);
        }
        if c.skill().is_melee() {
            total = c.get(stat::MELEE_DAMAGE_MULTIPLIER).calculate_fraction(total);
        }
        if c.skill().is_projectile() {
            total = c.get(stat::PROJECTILE_DAMAGE_MULTIPLIER).calculate_fraction(total);
        }
        Hook::Implemented(total)
    }

    fn compute_health_drain(&self, c: &SkillContext<'_>, _target: EntityId, damage: i32) -> Hook<i32> {
        Hook::Implemented(if c.skill().is_melee() {
            c.get(stat::MELEE_HEALTH_DRAIN_PERCENT).calculate_fraction(damage)
        } else {
            0
        })
    }

    fn roll_for_stun(&self, c: &SkillContext<'_>, target: EntityId, damage: i32) -> Hook<bool> {
        let health = c.lookup(target).map_or(0, |t| t.max_health());
        let chance = stun_chance(
            c.get(stat::ADDED_STUN_CHANCE),
            damage,
            health,
            c.get(stat::MAXIMUM_STUN_CHANCE),
        );
        Hook::Implemented(c.world().roll_chance(chance))
    }

    fn melee_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        let collider = c.creature().collider();
        Hook::Implemented(!c.world().overlapping(&collider, c.owner().opponent()).is_empty())
    }

    fn projectile_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        let creature = c.creature();
        if !creature.skills().iter().any(SkillData::is_projectile) {
            return Hook::Implemented(false);
        }
        let hit = c
            .world()
            .raycast(creature.position, c.owner().forward(), c.owner().opponent());
        Hook::Implemented(hit.is_some())
    }
}
