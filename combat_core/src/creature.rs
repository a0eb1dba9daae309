//! Creature and skill records held by the entity registry

use crate::delegates::DelegateId;
use crate::stats::{stat, LifetimeOracle, Modifier, StatTable};
use crate::types::{
    BoardPosition, Collider, EntityId, GameTime, PlayerName, SkillId, SkillType, Vec2,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hitbox and range stats are authored in thousandths of a board unit
pub const MILLI_UNITS: f32 = 1000.0;

/// A modifier a skill applies to other creatures (buffs, curses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetedModifier {
    pub modifier: Modifier,
    /// Delegate granted alongside the modifier; not supported by every applier
    #[serde(default)]
    pub delegate: Option<DelegateId>,
}

impl TargetedModifier {
    pub fn new(modifier: Modifier) -> Self {
        TargetedModifier {
            modifier,
            delegate: None,
        }
    }
}

/// Authored definition of a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillData {
    pub id: SkillId,
    pub name: String,
    pub skill_type: SkillType,
    /// Skill-local modifiers, layered over the owning creature's stats
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub delegates: Vec<DelegateId>,
    #[serde(default)]
    pub targeted_modifiers: Vec<TargetedModifier>,
    /// Creatures created by summoning delegates
    #[serde(default)]
    pub summons: Vec<CreatureData>,
}

impl SkillData {
    pub fn new(id: SkillId, name: impl Into<String>, skill_type: SkillType) -> Self {
        SkillData {
            id,
            name: name.into(),
            skill_type,
            modifiers: Vec::new(),
            delegates: Vec::new(),
            targeted_modifiers: Vec::new(),
            summons: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_delegate(mut self, delegate: DelegateId) -> Self {
        self.delegates.push(delegate);
        self
    }

    pub fn with_targeted_modifier(mut self, targeted: TargetedModifier) -> Self {
        self.targeted_modifiers.push(targeted);
        self
    }

    pub fn with_summon(mut self, summon: CreatureData) -> Self {
        self.summons.push(summon);
        self
    }

    pub fn is_melee(&self) -> bool {
        self.skill_type == SkillType::Melee
    }

    pub fn is_projectile(&self) -> bool {
        self.skill_type == SkillType::Projectile
    }
}

/// Authored definition of a creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    pub name: String,
    pub owner: PlayerName,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub delegates: Vec<DelegateId>,
    #[serde(default)]
    pub skills: Vec<SkillData>,
}

impl CreatureData {
    pub fn new(name: impl Into<String>, owner: PlayerName) -> Self {
        CreatureData {
            name: name.into(),
            owner,
            modifiers: Vec::new(),
            delegates: Vec::new(),
            skills: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_delegate(mut self, delegate: DelegateId) -> Self {
        self.delegates.push(delegate);
        self
    }

    pub fn with_skill(mut self, skill: SkillData) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.iter().find(|s| s.id == id)
    }
}

/// Per-creature, per-skill mutable state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillState {
    pub last_creature_hit: Option<EntityId>,
    pub times_hit: u32,
}

/// State carried by an in-flight projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    pub position: Vec2,
    pub direction: Vec2,
    /// Index of the delegate that fired this projectile
    pub delegate_index: usize,
    pub times_chained: u32,
    /// Creatures this projectile must not impact again
    #[serde(default)]
    pub skip_impacts: Vec<EntityId>,
    #[serde(default)]
    pub tracking: Option<EntityId>,
}

impl ProjectileState {
    /// Radius of a projectile's hitbox in board units
    pub const RADIUS: f32 = 0.1;

    pub fn collider(&self) -> Collider {
        Collider::new(self.position, Self::RADIUS)
    }
}

/// Whether a creature is still on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeState {
    Alive,
    Dead,
}

/// A creature as stored in the entity registry
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: EntityId,
    pub data: CreatureData,
    /// Current stat table; replaced wholesale, never edited in place
    pub stats: StatTable,
    skill_stats: BTreeMap<SkillId, StatTable>,
    pub position: Vec2,
    pub board: Option<BoardPosition>,
    pub damage_taken: i32,
    pub state: LifeState,
    pub stunned_until: Option<GameTime>,
    pub skill_last_used: BTreeMap<SkillId, GameTime>,
    pub skill_states: BTreeMap<SkillId, SkillState>,
}

impl Creature {
    /// Build a live creature, layering its authored modifiers over `defaults`
    pub fn spawn(id: EntityId, data: CreatureData, defaults: &StatTable, position: Vec2) -> Self {
        let stats = StatTable::with_parent(defaults.clone())
            .insert_all(data.modifiers.iter().cloned());
        let skill_stats = data
            .skills
            .iter()
            .map(|skill| {
                (skill.id, StatTable::new().insert_all(skill.modifiers.iter().cloned()))
            })
            .collect();
        Creature {
            id,
            data,
            stats,
            skill_stats,
            position,
            board: None,
            damage_taken: 0,
            state: LifeState::Alive,
            stunned_until: None,
            skill_last_used: BTreeMap::new(),
            skill_states: BTreeMap::new(),
        }
    }

    pub fn with_board_position(mut self, board: BoardPosition) -> Self {
        self.board = Some(board);
        self
    }

    pub fn owner(&self) -> PlayerName {
        self.data.owner
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn is_stunned(&self, now: GameTime) -> bool {
        self.stunned_until.is_some_and(|until| now < until)
    }

    pub fn max_health(&self) -> i32 {
        self.stats.get(stat::HEALTH)
    }

    pub fn current_health(&self) -> i32 {
        self.max_health().saturating_sub(self.damage_taken)
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.data.skill(id)
    }

    pub fn skills(&self) -> &[SkillData] {
        &self.data.skills
    }

    /// The skill's own modifiers layered over this creature's current stats
    pub fn skill_stats(&self, id: SkillId) -> Option<StatTable> {
        self.skill_stats
            .get(&id)
            .map(|table| table.reparented(self.stats.clone()))
    }

    pub fn last_used(&self, skill: SkillId) -> Option<GameTime> {
        self.skill_last_used.get(&skill).copied()
    }

    pub fn skill_state(&self, skill: SkillId) -> SkillState {
        self.skill_states.get(&skill).cloned().unwrap_or_default()
    }

    /// Circle used for melee reach and incoming hits
    pub fn collider(&self) -> Collider {
        Collider::new(
            self.position,
            self.stats.get(stat::HITBOX_RADIUS) as f32 / MILLI_UNITS,
        )
    }

    /// Replace this creature's stat table
    pub fn replace_stats(&mut self, stats: StatTable) {
        self.stats = stats;
    }

    /// Prune expired modifiers from the creature and every skill table
    pub fn prune(&mut self, oracle: &dyn LifetimeOracle) {
        self.stats = self.stats.prune(oracle);
        for table in self.skill_stats.values_mut() {
            *table = table.prune(oracle);
        }
    }
}
