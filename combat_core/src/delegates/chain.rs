//! DelegateChain - ordered delegates and the four dispatch disciplines

use super::context::{Context, CreatureContext, SkillContext};
use super::default::DefaultDelegate;
use super::{DamageByType, Delegate, DelegateId, Hook};
use crate::creature::{CreatureData, SkillData};
use crate::effect::Results;
use crate::types::{Collider, EntityId, SkillId};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// An ordered, non-empty list of delegates ending with the default delegate
#[derive(Clone)]
pub struct DelegateChain {
    delegates: Arc<[Arc<dyn Delegate>]>,
}

impl fmt::Debug for DelegateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl DelegateChain {
    /// Chain `delegates` in order, terminated by the default delegate
    pub fn new(delegates: impl IntoIterator<Item = Arc<dyn Delegate>>) -> Self {
        let mut all: Vec<Arc<dyn Delegate>> = delegates.into_iter().collect();
        all.push(Arc::new(DefaultDelegate));
        DelegateChain {
            delegates: all.into(),
        }
    }

    /// Chain exactly `delegates`, without appending the default
    ///
    /// Panics when `delegates` is empty.
    pub fn from_parts(delegates: Vec<Arc<dyn Delegate>>) -> Self {
        assert!(
            !delegates.is_empty(),
            "delegate chain must contain at least one delegate"
        );
        DelegateChain {
            delegates: delegates.into(),
        }
    }

    /// Chain built-in delegates by id; authored default ids are folded into the terminal default
    pub fn from_ids(ids: &[DelegateId]) -> Self {
        Self::new(
            ids.iter()
                .filter(|id| !id.is_default())
                .map(|id| id.delegate()),
        )
    }

    /// Chain for creature-level hooks
    pub fn for_creature(creature: &CreatureData) -> Self {
        Self::from_ids(&creature.delegates)
    }

    /// Chain for skill-level hooks: creature delegates, then skill delegates
    pub fn for_skill(creature: &CreatureData, skill: &SkillData) -> Self {
        let ids: Vec<DelegateId> = creature
            .delegates
            .iter()
            .chain(skill.delegates.iter())
            .copied()
            .collect();
        Self::from_ids(&ids)
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.delegates.iter().map(|d| d.name()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &dyn Delegate)> {
        assert!(!self.delegates.is_empty(), "dispatch on an empty delegate chain");
        self.delegates.iter().map(|d| d.as_ref()).enumerate()
    }

    // === Dispatch disciplines ===

    /// Collection phase of ExecuteEvent: run `hook` on every delegate in order
    pub fn invoke_event<C: Context>(
        &self,
        c: &C,
        results: &mut Results,
        hook: impl Fn(&dyn Delegate, &C, &mut Results),
    ) {
        for (index, delegate) in self.iter() {
            trace!(delegate = delegate.name(), index, "invoking event hook");
            hook(delegate, &c.for_delegate(index), results);
        }
    }

    /// GetFirstImplemented: the first delegate implementing `hook` supplies the answer
    ///
    /// Panics if no delegate implements the hook; the default delegate implements
    /// every first-implemented hook, so this indicates a malformed chain.
    pub fn first_implemented<C: Context, T>(
        &self,
        c: &C,
        hook_name: &str,
        hook: impl Fn(&dyn Delegate, &C) -> Hook<T>,
    ) -> T {
        for (index, delegate) in self.iter() {
            if let Hook::Implemented(value) = hook(delegate, &c.for_delegate(index)) {
                trace!(delegate = delegate.name(), index, hook = hook_name, "implemented");
                return value;
            }
        }
        panic!("no delegate in {:?} implemented {}", self, hook_name);
    }

    /// AnyReturnedTrue: true if any implementing delegate returns true
    ///
    /// Stops at the first true answer. Returns false when nothing implements the hook.
    pub fn any_returned_true<C: Context>(
        &self,
        c: &C,
        hook: impl Fn(&dyn Delegate, &C) -> Hook<bool>,
    ) -> bool {
        self.iter()
            .any(|(index, delegate)| hook(delegate, &c.for_delegate(index)) == Hook::Implemented(true))
    }

    /// AggregateDelegates: fold `seed` through every implementing delegate in order
    pub fn aggregate<C: Context, T>(
        &self,
        c: &C,
        seed: T,
        hook: impl Fn(&dyn Delegate, &C, &T) -> Hook<T>,
    ) -> T {
        let mut accumulated = seed;
        for (index, delegate) in self.iter() {
            if let Hook::Implemented(next) = hook(delegate, &c.for_delegate(index), &accumulated) {
                accumulated = next;
            }
        }
        accumulated
    }

    // === Creature queries ===

    pub fn select_skill(&self, c: &CreatureContext<'_>) -> Option<SkillId> {
        self.first_implemented(c, "select_skill", |d, c| d.select_skill(c))
    }

    pub fn melee_could_hit(&self, c: &CreatureContext<'_>) -> bool {
        self.any_returned_true(c, |d, c| d.melee_could_hit(c))
    }

    pub fn projectile_could_hit(&self, c: &CreatureContext<'_>) -> bool {
        self.any_returned_true(c, |d, c| d.projectile_could_hit(c))
    }

    // === Skill queries ===

    pub fn get_collider(&self, c: &SkillContext<'_>) -> Collider {
        self.first_implemented(c, "get_collider", |d, c| d.get_collider(c))
    }

    pub fn find_targets(&self, c: &SkillContext<'_>) -> Vec<EntityId> {
        self.first_implemented(c, "find_targets", |d, c| d.find_targets(c))
    }

    pub fn filter_targets(&self, c: &SkillContext<'_>, hits: &[EntityId]) -> Vec<EntityId> {
        self.first_implemented(c, "filter_targets", |d, c| d.filter_targets(c, hits))
    }

    pub fn roll_for_hit(&self, c: &SkillContext<'_>, target: EntityId) -> bool {
        self.first_implemented(c, "roll_for_hit", |d, c| d.roll_for_hit(c, target))
    }

    pub fn roll_for_crit(&self, c: &SkillContext<'_>, target: EntityId) -> bool {
        self.first_implemented(c, "roll_for_crit", |d, c| d.roll_for_crit(c, target))
    }

    pub fn roll_for_base_damage(&self, c: &SkillContext<'_>, target: EntityId) -> DamageByType {
        self.first_implemented(c, "roll_for_base_damage", |d, c| {
            d.roll_for_base_damage(c, target)
        })
    }

    pub fn transform_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: DamageByType,
    ) -> DamageByType {
        self.aggregate(c, damage, |d, c, acc| d.transform_damage(c, target, acc))
    }

    pub fn apply_damage_reduction(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> DamageByType {
        self.first_implemented(c, "apply_damage_reduction", |d, c| {
            d.apply_damage_reduction(c, target, damage)
        })
    }

    pub fn apply_damage_resistance(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
    ) -> DamageByType {
        self.first_implemented(c, "apply_damage_resistance", |d, c| {
            d.apply_damage_resistance(c, target, damage)
        })
    }

    pub fn compute_final_damage(
        &self,
        c: &SkillContext<'_>,
        target: EntityId,
        damage: &DamageByType,
        is_critical_hit: bool,
    ) -> i32 {
        self.first_implemented(c, "compute_final_damage", |d, c| {
            d.compute_final_damage(c, target, damage, is_critical_hit)
        })
    }

    pub fn compute_health_drain(&self, c: &SkillContext<'_>, target: EntityId, damage: i32) -> i32 {
        self.first_implemented(c, "compute_health_drain", |d, c| {
            d.compute_health_drain(c, target, damage)
        })
    }

    pub fn roll_for_stun(&self, c: &SkillContext<'_>, target: EntityId, damage: i32) -> bool {
        self.first_implemented(c, "roll_for_stun", |d, c| d.roll_for_stun(c, target, damage))
    }

    pub fn should_skip_projectile_impact(&self, c: &SkillContext<'_>) -> bool {
        self.any_returned_true(c, |d, c| d.should_skip_projectile_impact(c))
    }
}
