//! Delegates - composable creature and skill behaviors
//!
//! A delegate is a stateless strategy object implementing any subset of the hooks
//! on [`Delegate`]. Every hook has a default body that declines to participate
//! ([`Hook::NotImplemented`] for queries, a no-op for events), so a delegate only
//! writes the hooks it cares about and new hooks never touch existing delegates.
//!
//! Delegates are combined into a [`DelegateChain`], always terminated by the
//! [`DefaultDelegate`] which implements every query hook, and invoked under one of
//! four dispatch disciplines:
//!
//! | Discipline            | Hooks                                                   |
//! |-----------------------|---------------------------------------------------------|
//! | execute event         | `on_*` lifecycle events                                 |
//! | first implemented     | `select_skill`, `find_targets`, damage formulas, rolls  |
//! | any returned true     | `melee_could_hit`, `projectile_could_hit`, skip impact  |
//! | aggregate             | `transform_damage`                                      |

mod allies;
mod chain;
mod context;
mod default;
mod dispatch;
mod on_hit;
mod projectiles;

pub use allies::{
    ApplyToAdjacentAlliesOnUse, InfluenceAdded, ManaGeneration, SummonMinions,
};
pub use chain::DelegateChain;
pub use context::{Context, CreatureContext, SkillContext, SkillScope};
pub use default::DefaultDelegate;
pub use dispatch::{collect, execute_event, resolve};
pub use on_hit::{
    AddedDamageOnRepeatedHits, ApplyTargetedAffixesOnHit, ChanceToShock, KnockbackOnHit,
};
pub use projectiles::{
    AdjacentFileProjectiles, ChainToRandomTarget, ChainingProjectiles, MultipleProjectiles,
    ProjectileArc,
};

use crate::effect::{FireProjectile, Results};
use crate::stats::TaggedValues;
use crate::types::{Collider, DamageType, EntityId, SkillId};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Damage amounts keyed by damage type
pub type DamageByType = TaggedValues<DamageType, i32>;

/// Result of an optional query hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook<T> {
    Implemented(T),
    NotImplemented,
}

impl<T> Hook<T> {
    pub fn is_implemented(&self) -> bool {
        matches!(self, Hook::Implemented(_))
    }

    pub fn implemented(self) -> Option<T> {
        match self {
            Hook::Implemented(value) => Some(value),
            Hook::NotImplemented => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Hook<U> {
        match self {
            Hook::Implemented(value) => Hook::Implemented(f(value)),
            Hook::NotImplemented => Hook::NotImplemented,
        }
    }
}

/// Stable identifiers for built-in delegates, referenced from authored data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateId {
    DefaultCreature = 1,
    DefaultSkill = 2,
    MultipleProjectiles = 3,
    ProjectileArc = 4,
    AdjacentFileProjectiles = 5,
    ChainingProjectiles = 6,
    ManaGeneration = 7,
    InfluenceAdded = 8,
    KnockbackOnHit = 9,
    SummonMinions = 10,
    AddedDamageOnRepeatedHits = 11,
    ApplyTargetedAffixesOnHit = 12,
    ChainToRandomTarget = 13,
    ChanceToShock = 14,
    ApplyToAdjacentAlliesOnUse = 15,
}

impl DelegateId {
    pub fn all() -> &'static [DelegateId] {
        &[
            DelegateId::DefaultCreature,
            DelegateId::DefaultSkill,
            DelegateId::MultipleProjectiles,
            DelegateId::ProjectileArc,
            DelegateId::AdjacentFileProjectiles,
            DelegateId::ChainingProjectiles,
            DelegateId::ManaGeneration,
            DelegateId::InfluenceAdded,
            DelegateId::KnockbackOnHit,
            DelegateId::SummonMinions,
            DelegateId::AddedDamageOnRepeatedHits,
            DelegateId::ApplyTargetedAffixesOnHit,
            DelegateId::ChainToRandomTarget,
            DelegateId::ChanceToShock,
            DelegateId::ApplyToAdjacentAlliesOnUse,
        ]
    }

    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn is_default(self) -> bool {
        matches!(self, DelegateId::DefaultCreature | DelegateId::DefaultSkill)
    }

    /// The shared instance implementing this delegate
    pub fn delegate(self) -> Arc<dyn Delegate> {
        let registry = registry();
        Arc::clone(&registry[self.number() as usize - 1])
    }
}

fn registry() -> &'static [Arc<dyn Delegate>] {
    static REGISTRY: OnceLock<Vec<Arc<dyn Delegate>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let default: Arc<dyn Delegate> = Arc::new(DefaultDelegate);
        vec![
            Arc::clone(&default),
            default,
            Arc::new(MultipleProjectiles),
            Arc::new(ProjectileArc),
            Arc::new(AdjacentFileProjectiles),
            Arc::new(ChainingProjectiles),
            Arc::new(ManaGeneration),
            Arc::new(InfluenceAdded),
            Arc::new(KnockbackOnHit),
            Arc::new(SummonMinions),
            Arc::new(AddedDamageOnRepeatedHits),
            Arc::new(ApplyTargetedAffixesOnHit),
            Arc::new(ChainToRandomTarget),
            Arc::new(ChanceToShock),
            Arc::new(ApplyToAdjacentAlliesOnUse),
        ]
    })
}

/// A composable creature/skill behavior
///
/// Every method is optional. Event hooks append effects to `results`; query hooks
/// return [`Hook::NotImplemented`] unless overridden.
#[allow(unused_variables)]
pub trait Delegate: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    // === Creature events ===

    /// The creature was placed on the board
    fn on_activate(&self, c: &CreatureContext<'_>, results: &mut Results) {}

    /// The creature died
    fn on_death(&self, c: &CreatureContext<'_>, results: &mut Results) {}

    /// The creature dealt the killing blow to `enemy`
    fn on_killed_enemy(
        &self,
        c: &CreatureContext<'_>,
        enemy: EntityId,
        damage: i32,
        results: &mut Results,
    ) {
    }

    // === Skill events ===

    fn on_skill_start(&self, c: &SkillContext<'_>, results: &mut Results) {}

    fn on_skill_used(&self, c: &SkillContext<'_>, results: &mut Results) {}

    /// The skill's melee swing or projectile reached its impact point
    fn on_skill_impact(&self, c: &SkillContext<'_>, results: &mut Results) {}

    /// The skill is being applied to one target found at impact
    fn on_apply_to_target(&self, c: &SkillContext<'_>, target: EntityId, results: &mut Results) {}

    /// The skill hit `target` for `damage` (possibly zero)
    fn on_hit_target(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: i32,
        results: &mut Results,
    ) {
    }

    /// A projectile was fired by this skill
    fn on_fired_projectile(
        &self,
        c: &SkillContext<'_>,
        projectile: &FireProjectile,
        results: &mut Results,
    ) {
    }

    // === First-implemented queries ===

    fn select_skill(&self, c: &CreatureContext<'_>) -> Hook<Option<SkillId>> {
        Hook::NotImplemented
    }

    fn get_collider(&self, c: &SkillContext<'_>) -> Hook<Collider> {
        Hook::NotImplemented
    }

    fn find_targets(&self, c: &SkillContext<'_>) -> Hook<Vec<EntityId>> {
        Hook::NotImplemented
    }

    fn filter_targets(&self, c: &SkillContext<'_>, hits: &[EntityId]) -> Hook<Vec<EntityId>> {
        Hook::NotImplemented
    }

    fn roll_for_hit(&self, c: &SkillContext<'_>, target: EntityId) -> Hook<bool> {
        Hook::NotImplemented
    }

    fn roll_for_crit(&self, c: &SkillContext<'_>, target: EntityId) -> Hook<bool> {
        Hook::NotImplemented
    }

    fn roll_for_base_damage(&self, c: &SkillContext<'_>, target: EntityId) -> Hook<DamageByType> {
        Hook::NotImplemented
    }

    fn apply_damage_reduction(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        Hook::NotImplemented
    }

    fn apply_damage_resistance(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        Hook::NotImplemented
    }

    fn compute_final_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
        is_critical_hit: bool,
    ) -> Hook<i32> {
        Hook::NotImplemented
    }

    fn compute_health_drain(&self, c: &SkillContext<'_>, target: EntityId, damage: i32) -> Hook<i32> {
        Hook::NotImplemented
    }

    fn roll_for_stun(&self, c: &SkillContext<'_>, target: EntityId, damage: i32) -> Hook<bool> {
        Hook::NotImplemented
    }

    // === Any-returned-true queries ===

    fn melee_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        Hook::NotImplemented
    }

    fn projectile_could_hit(&self, c: &CreatureContext<'_>) -> Hook<bool> {
        Hook::NotImplemented
    }

    fn should_skip_projectile_impact(&self, c: &SkillContext<'_>) -> Hook<bool> {
        Hook::NotImplemented
    }

    // === Aggregate ===

    /// Receive the damage accumulated so far and return the transformed damage
    fn transform_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> Hook<DamageByType> {
        Hook::NotImplemented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_id() {
        for id in DelegateId::all() {
            let delegate = id.delegate();
            assert!(!delegate.name().is_empty());
        }
        assert_eq!(DelegateId::DefaultSkill.delegate().name(), "default");
        assert_eq!(
            DelegateId::ChainingProjectiles.delegate().name(),
            "chaining_projectiles"
        );
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(DelegateId::DefaultCreature.number(), 1);
        assert_eq!(DelegateId::ChainingProjectiles.number(), 6);
        assert_eq!(DelegateId::ApplyToAdjacentAlliesOnUse.number(), 15);
        assert!(DelegateId::DefaultSkill.is_default());
    }

    #[test]
    fn test_hook_helpers() {
        assert_eq!(Hook::Implemented(2).map(|x| x * 2).implemented(), Some(4));
        assert!(!Hook::<i32>::NotImplemented.is_implemented());
    }
}
