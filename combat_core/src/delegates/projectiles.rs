//! Projectile delegates - multiplying, spreading and chaining fired projectiles

use super::context::{Context, CreatureContext, SkillContext};
use super::{Delegate, Hook};
use crate::creature::Creature;
use crate::effect::{Effect, FireProjectile, Results};
use crate::stats::{stat, StatTable};
use crate::types::{EntityId, Vec2};

/// Offset stats are authored in thousandths of a board unit
const OFFSET_UNITS: f32 = 1000.0;

/// 1, -1, 2, -2, ... for `count` items
pub fn alternating_offsets(count: usize) -> impl Iterator<Item = i32> {
    (0..count).map(|i| {
        let magnitude = (i / 2 + 1) as i32;
        if i % 2 == 0 {
            magnitude
        } else {
            -magnitude
        }
    })
}

/// Firing angles in degrees for a chain split into `count` projectiles
///
/// An even count skips the 0° direction so no projectile continues straight on.
pub fn chain_angles(count: i32) -> Vec<f32> {
    let add = if count % 2 == 0 { 1.0 } else { 0.0 };
    (0..count)
        .map(|i| 360.0 * (i as f32 + add) / (count as f32 + add))
        .collect()
}

/// Only projectiles fired by delegates later in the chain are multiplied
fn fired_by_later_delegate(c: &SkillContext<'_>, projectile: &FireProjectile) -> bool {
    projectile.delegate_index > c.delegate_index()
}

// ============================================================================
// Multipliers
// ============================================================================

/// Fires ProjectileSequenceCount projectiles one after another
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleProjectiles;

impl Delegate for MultipleProjectiles {
    fn name(&self) -> &'static str {
        "multiple_projectiles"
    }

    fn on_fired_projectile(&self, c: &SkillContext<'_>, projectile: &FireProjectile, results: &mut Results) {
        if !fired_by_later_delegate(c, projectile) {
            return;
        }
        let delay = c.get(stat::PROJECTILE_SEQUENCE_DELAY).millis;
        for i in 1..c.get(stat::PROJECTILE_SEQUENCE_COUNT) {
            results.push(Effect::FireProjectile(
                FireProjectile::new(
                    c.id(),
                    c.skill_id(),
                    c.delegate_index(),
                    c.creature().position,
                    c.owner().forward(),
                )
                .with_delay(i * delay),
            ));
        }
    }
}

/// Shared behavior of delegates firing extra projectiles from offset origins or angles
trait ProjectileOffset {
    /// Projectiles to fire including the original one
    fn count(&self, stats: &StatTable) -> i32;

    fn origin(&self, stats: &StatTable, creature: &Creature, offset: i32) -> Vec2;

    fn direction(&self, stats: &StatTable, creature: &Creature, offset: i32) -> Vec2;

    fn extra_offsets(&self, stats: &StatTable) -> Vec<i32> {
        alternating_offsets((self.count(stats) - 1).max(0) as usize).collect()
    }

    fn could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        let creature = c.creature();
        let stats = &creature.stats;
        let opponent = c.owner().opponent();
        Hook::Implemented(self.extra_offsets(stats).into_iter().any(|offset| {
            c.world()
                .raycast(
                    self.origin(stats, creature, offset),
                    self.direction(stats, creature, offset),
                    opponent,
                )
                .is_some()
        }))
    }

    fn fire_extra(&self, c: &SkillContext<'_>, projectile: &FireProjectile, results: &mut Results) {
        if !fired_by_later_delegate(c, projectile) {
            return;
        }
        let stats = c.stats();
        let creature = c.creature();
        for offset in self.extra_offsets(stats) {
            results.push(Effect::FireProjectile(FireProjectile::new(
                c.id(),
                c.skill_id(),
                c.delegate_index(),
                self.origin(stats, creature, offset),
                self.direction(stats, creature, offset),
            )));
        }
    }
}

/// Fires ProjectileArcCount projectiles fanned out around the forward direction
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileArc;

impl ProjectileOffset for ProjectileArc {
    fn count(&self, stats: &StatTable) -> i32 {
        stats.get(stat::PROJECTILE_ARC_COUNT)
    }

    fn origin(&self, _stats: &StatTable, creature: &Creature, _offset: i32) -> Vec2 {
        creature.position
    }

    fn direction(&self, stats: &StatTable, creature: &Creature, offset: i32) -> Vec2 {
        let spread = stats.get(stat::PROJECTILE_ARC_ROTATION_OFFSET) as f32 / OFFSET_UNITS;
        (creature.owner().forward() + Vec2::new(0.0, offset as f32 * spread)).normalize_or_zero()
    }
}

impl Delegate for ProjectileArc {
    fn name(&self) -> &'static str {
        "projectile_arc"
    }

    fn on_fired_projectile(&self, c: &SkillContext<'_>, projectile: &FireProjectile, results: &mut Results) {
        self.fire_extra(c, projectile, results);
    }

    fn projectile_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        self.could_hit(c)
    }
}

/// Fires ProjectileAdjacentsCount projectiles from neighboring files
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentFileProjectiles;

impl ProjectileOffset for AdjacentFileProjectiles {
    fn count(&self, stats: &StatTable) -> i32 {
        stats.get(stat::PROJECTILE_ADJACENTS_COUNT)
    }

    fn origin(&self, stats: &StatTable, creature: &Creature, offset: i32) -> Vec2 {
        let spacing = stats.get(stat::PROJECTILE_ADJACENTS_OFFSET) as f32 / OFFSET_UNITS;
        creature.position + Vec2::new(0.0, offset as f32 * spacing)
    }

    fn direction(&self, _stats: &StatTable, creature: &Creature, _offset: i32) -> Vec2 {
        creature.owner().forward()
    }
}

impl Delegate for AdjacentFileProjectiles {
    fn name(&self) -> &'static str {
        "adjacent_file_projectiles"
    }

    fn on_fired_projectile(&self, c: &SkillContext<'_>, projectile: &FireProjectile, results: &mut Results) {
        self.fire_extra(c, projectile, results);
    }

    fn projectile_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        self.could_hit(c)
    }
}

// ============================================================================
// Chaining
// ============================================================================

/// A chained projectile skips impact when every creature it overlaps was already hit
fn skip_chained_impact(c: &SkillContext<'_>) -> Hook<bool> {
    match c.projectile() {
        Some(projectile) if projectile.times_chained > 0 => {
            let targets = c.chain().find_targets(c);
            Hook::Implemented(
                targets
                    .iter()
                    .all(|target| projectile.skip_impacts.contains(target)),
            )
        }
        _ => Hook::Implemented(false),
    }
}

fn can_chain_again(c: &SkillContext<'_>) -> bool {
    c.projectile()
        .is_some_and(|p| (p.times_chained as i64) < c.get(stat::MAX_PROJECTILE_TIMES_CHAINED) as i64)
}

/// On hit, splits the projectile into ProjectileChainCount projectiles around a circle
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainingProjectiles;

impl Delegate for ChainingProjectiles {
    fn name(&self) -> &'static str {
        "chaining_projectiles"
    }

    fn should_skip_projectile_impact(&self, c: &SkillContext<'_>) -> Hook<bool> {
        skip_chained_impact(c)
    }

    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        let chain_count = c.get(stat::PROJECTILE_CHAIN_COUNT);
        assert!(
            chain_count > 0,
            "ProjectileChainCount must be positive for skill {}, got {}",
            c.skill().name,
            chain_count
        );
        if !can_chain_again(c) {
            return;
        }
        let Some(projectile) = c.projectile() else {
            return;
        };

        let mut skip_impacts = projectile.skip_impacts.clone();
        skip_impacts.push(target);
        for angle in chain_angles(chain_count) {
            results.push(Effect::FireProjectile(
                FireProjectile::new(
                    c.id(),
                    c.skill_id(),
                    c.delegate_index(),
                    projectile.position,
                    Vec2::from_angle(angle.to_radians()).rotate(projectile.direction),
                )
                .chained(projectile.times_chained + 1, skip_impacts.clone()),
            ));
        }
    }
}

/// On hit, fires one tracking projectile at a random opponent not yet hit
///
/// Opponents are drawn from the projectile's existing skip list, so the creature
/// just hit may be chosen again; its impact is then skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainToRandomTarget;

impl Delegate for ChainToRandomTarget {
    fn name(&self) -> &'static str {
        "chain_to_random_target"
    }

    fn should_skip_projectile_impact(&self, c: &SkillContext<'_>) -> Hook<bool> {
        skip_chained_impact(c)
    }

    /// Candidates are every creature of the opposing player, which on a
    /// two-player board is the full enemy roster.
    fn on_hit_target(&self, c: &SkillContext<'_>, target: EntityId, _damage: i32, results: &mut Results) {
        if !can_chain_again(c) {
            return;
        }
        let Some(projectile) = c.projectile() else {
            return;
        };

        let world = c.world();
        let candidates: Vec<EntityId> = world
            .creatures_of(c.owner().opponent())
            .into_iter()
            .filter(|id| !projectile.skip_impacts.contains(id))
            .collect();
        let Some(index) = world.choose_index(candidates.len()) else {
            return;
        };
        let enemy = candidates[index];
        let direction = world
            .creature(enemy)
            .map(|e| (e.position - projectile.position).normalize_or_zero())
            .unwrap_or(projectile.direction);

        let mut skip_impacts = projectile.skip_impacts.clone();
        skip_impacts.push(target);
        results.push(Effect::FireProjectile(
            FireProjectile::new(
                c.id(),
                c.skill_id(),
                c.delegate_index(),
                projectile.position,
                direction,
            )
            .tracking(enemy)
            .chained(projectile.times_chained + 1, skip_impacts),
        ));
    }
}
