//! Per-invocation read-only views handed to delegates

use super::chain::DelegateChain;
use crate::creature::{Creature, ProjectileState, SkillData, SkillState};
use crate::stats::{Stat, StatTable};
use crate::types::{EntityId, GameTime, PlayerName, SkillId};
use crate::world::WorldView;
use serde::{Deserialize, Serialize};

/// Behavior shared by creature and skill contexts
pub trait Context: Clone {
    fn chain(&self) -> &DelegateChain;

    /// Position of the currently executing delegate within its chain
    fn delegate_index(&self) -> usize;

    /// A fresh invocation record for the delegate at `index`
    fn for_delegate(&self, index: usize) -> Self;
}

/// Owned identification of a skill invocation, carried by events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScope {
    pub creature: EntityId,
    pub skill: SkillId,
    /// Present when the invocation comes from an in-flight projectile
    #[serde(default)]
    pub projectile: Option<ProjectileState>,
}

impl SkillScope {
    pub fn new(creature: EntityId, skill: SkillId) -> Self {
        SkillScope {
            creature,
            skill,
            projectile: None,
        }
    }

    pub fn with_projectile(mut self, projectile: ProjectileState) -> Self {
        self.projectile = Some(projectile);
        self
    }
}

/// View of one creature for creature-level hooks
#[derive(Clone)]
pub struct CreatureContext<'w> {
    world: &'w dyn WorldView,
    chain: DelegateChain,
    creature: &'w Creature,
    delegate_index: usize,
}

impl<'w> CreatureContext<'w> {
    /// Build a context for `creature`, or `None` if it is not registered
    pub fn new(world: &'w dyn WorldView, creature: EntityId) -> Option<Self> {
        let creature = world.creature(creature)?;
        Some(CreatureContext {
            world,
            chain: DelegateChain::for_creature(&creature.data),
            creature,
            delegate_index: 0,
        })
    }

    /// Build a context with an explicit chain
    pub fn with_chain(world: &'w dyn WorldView, creature: EntityId, chain: DelegateChain) -> Option<Self> {
        let creature = world.creature(creature)?;
        Some(CreatureContext {
            world,
            chain,
            creature,
            delegate_index: 0,
        })
    }

    pub fn world(&self) -> &'w dyn WorldView {
        self.world
    }

    pub fn creature(&self) -> &'w Creature {
        self.creature
    }

    pub fn id(&self) -> EntityId {
        self.creature.id
    }

    pub fn owner(&self) -> PlayerName {
        self.creature.owner()
    }

    pub fn now(&self) -> GameTime {
        self.world.now()
    }

    /// Current value of one of this creature's stats
    pub fn get<S: Stat>(&self, stat: S) -> S::Value {
        self.creature.stats.get(stat)
    }

    /// Context for one of this creature's skills
    pub fn skill_context(&self, skill: SkillId) -> Option<SkillContext<'w>> {
        SkillContext::new(self.world, &SkillScope::new(self.creature.id, skill))
    }
}

impl Context for CreatureContext<'_> {
    fn chain(&self) -> &DelegateChain {
        &self.chain
    }

    fn delegate_index(&self) -> usize {
        self.delegate_index
    }

    fn for_delegate(&self, index: usize) -> Self {
        CreatureContext {
            delegate_index: index,
            ..self.clone()
        }
    }
}

/// View of one skill invocation for skill-level hooks
#[derive(Clone)]
pub struct SkillContext<'w> {
    world: &'w dyn WorldView,
    chain: DelegateChain,
    creature: &'w Creature,
    skill: &'w SkillData,
    /// Skill modifiers layered over the creature's current table
    stats: StatTable,
    projectile: Option<ProjectileState>,
    delegate_index: usize,
}

impl<'w> SkillContext<'w> {
    /// Build a context for `scope`, or `None` if the creature or skill is gone
    pub fn new(world: &'w dyn WorldView, scope: &SkillScope) -> Option<Self> {
        let creature = world.creature(scope.creature)?;
        let chain = DelegateChain::for_skill(&creature.data, creature.skill(scope.skill)?);
        Self::with_chain(world, scope, chain)
    }

    /// Build a context with an explicit chain
    pub fn with_chain(world: &'w dyn WorldView, scope: &SkillScope, chain: DelegateChain) -> Option<Self> {
        let creature = world.creature(scope.creature)?;
        let skill = creature.skill(scope.skill)?;
        let stats = creature.skill_stats(scope.skill)?;
        Some(SkillContext {
            world,
            chain,
            creature,
            skill,
            stats,
            projectile: scope.projectile.clone(),
            delegate_index: 0,
        })
    }

    pub fn world(&self) -> &'w dyn WorldView {
        self.world
    }

    pub fn creature(&self) -> &'w Creature {
        self.creature
    }

    /// Id of the creature using the skill
    pub fn id(&self) -> EntityId {
        self.creature.id
    }

    pub fn owner(&self) -> PlayerName {
        self.creature.owner()
    }

    pub fn skill(&self) -> &'w SkillData {
        self.skill
    }

    pub fn skill_id(&self) -> SkillId {
        self.skill.id
    }

    pub fn now(&self) -> GameTime {
        self.world.now()
    }

    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    /// Current value of a stat for this skill (skill layered over creature)
    pub fn get<S: Stat>(&self, stat: S) -> S::Value {
        self.stats.get(stat)
    }

    pub fn projectile(&self) -> Option<&ProjectileState> {
        self.projectile.as_ref()
    }

    /// Another creature by id
    pub fn lookup(&self, id: EntityId) -> Option<&'w Creature> {
        self.world.creature(id)
    }

    /// Persistent per-skill state for this creature
    pub fn skill_state(&self) -> SkillState {
        self.creature.skill_state(self.skill.id)
    }

    /// Owned scope identifying this invocation, for raising events
    pub fn scope(&self) -> SkillScope {
        SkillScope {
            creature: self.creature.id,
            skill: self.skill.id,
            projectile: self.projectile.clone(),
        }
    }

    /// Creature-level context for the skill's owner
    pub fn creature_context(&self) -> Option<CreatureContext<'w>> {
        CreatureContext::new(self.world, self.creature.id)
    }
}

impl Context for SkillContext<'_> {
    fn chain(&self) -> &DelegateChain {
        &self.chain
    }

    fn delegate_index(&self) -> usize {
        self.delegate_index
    }

    fn for_delegate(&self, index: usize) -> Self {
        SkillContext {
            delegate_index: index,
            ..self.clone()
        }
    }
}
