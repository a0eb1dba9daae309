//! Arena - an in-memory world that runs battles
//!
//! The arena owns the entity registry, the clock, the random source, per-player
//! stat tables and in-flight projectiles. It answers every world query the
//! delegates make and interprets every [`Effect`] they produce. Each call to
//! [`Arena::tick`] advances time, prunes expired modifiers, regenerates health,
//! moves projectiles and lets every ready creature act.

use crate::config::{default_base_stats, CombatConstants};
use crate::creature::{Creature, CreatureData, LifeState, ProjectileState, MILLI_UNITS};
use crate::delegates::{execute_event, resolve, SkillScope};
use crate::effect::{DelegateEvent, Effect, EffectError, FireProjectile};
use crate::stats::{stat, LifetimeOracle, StatTable};
use crate::types::{
    BoardPosition, Collider, EntityId, GameTime, PlayerName, SkillId, SkillType, Vec2,
};
use crate::world::{
    Clock, EffectExecutor, EntityQuery, RandomSource, SpatialQuery, WorldOracle, WorldView,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Distance in board units a 100% knockback pushes a creature
pub const KNOCKBACK_DISTANCE: f32 = 0.5;

/// Projectiles further than this from their origin are discarded
pub const MAX_PROJECTILE_RANGE: f32 = 20.0;

/// Projectiles still flying this long after launch are discarded
pub const MAX_PROJECTILE_FLIGHT_MS: i64 = 10_000;

/// An effect as it was applied, for replay and inspection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedEffect {
    pub time: GameTime,
    pub effect: Effect,
}

#[derive(Debug, Clone)]
struct InFlight {
    fired_by: EntityId,
    skill: SkillId,
    state: ProjectileState,
    origin: Vec2,
    launch_at: GameTime,
    expires_at: GameTime,
    /// Board units per second
    speed: f32,
}

/// Liveness as of the start of a prune pass
struct LivenessSnapshot {
    now: GameTime,
    alive: BTreeSet<EntityId>,
}

impl LifetimeOracle for LivenessSnapshot {
    fn now(&self) -> GameTime {
        self.now
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }
}

/// In-memory world implementing every capability the rules engine needs
pub struct Arena {
    creatures: BTreeMap<EntityId, Creature>,
    next_id: u32,
    now: GameTime,
    last_regeneration: GameTime,
    random: Box<dyn RandomSource>,
    constants: CombatConstants,
    defaults: StatTable,
    players: BTreeMap<PlayerName, StatTable>,
    projectiles: Vec<InFlight>,
    log: Vec<LoggedEffect>,
    enemies_removed: u32,
}

impl Arena {
    /// Create an empty arena using the bundled base stats
    pub fn new(random: impl RandomSource + 'static) -> Self {
        Arena {
            creatures: BTreeMap::new(),
            next_id: 1,
            now: GameTime::ZERO,
            last_regeneration: GameTime::ZERO,
            random: Box::new(random),
            constants: CombatConstants::default(),
            defaults: default_base_stats(),
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            log: Vec::new(),
            enemies_removed: 0,
        }
    }

    pub fn with_constants(mut self, constants: CombatConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Replace the root table every creature spawned afterwards layers over
    pub fn with_defaults(mut self, defaults: StatTable) -> Self {
        self.defaults = defaults;
        self
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Place a creature on a board cell and activate it
    pub fn add_creature(&mut self, data: CreatureData, board: BoardPosition) -> EntityId {
        self.spawn(data, board.center(), Some(board))
    }

    /// Place a creature at a world position off the board grid and activate it
    pub fn add_creature_at(&mut self, data: CreatureData, position: Vec2) -> EntityId {
        self.spawn(data, position, None)
    }

    fn spawn(&mut self, data: CreatureData, position: Vec2, board: Option<BoardPosition>) -> EntityId {
        let id = self.register(data, position, board);
        execute_event(self, DelegateEvent::Activate { creature: id });
        id
    }

    fn register(&mut self, data: CreatureData, position: Vec2, board: Option<BoardPosition>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let mut creature = Creature::spawn(id, data, &self.defaults, position);
        creature.board = board;
        debug!(creature = %id, name = creature.name(), owner = ?creature.owner(), "creature spawned");
        self.creatures.insert(id, creature);
        id
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Every registered creature in id order
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    /// Stat table for a player; empty until a delegate adds to it
    pub fn player_stats(&self, player: PlayerName) -> StatTable {
        self.players.get(&player).cloned().unwrap_or_default()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn enemies_removed(&self) -> u32 {
        self.enemies_removed
    }

    /// Every effect executed so far, in order
    pub fn effect_log(&self) -> &[LoggedEffect] {
        &self.log
    }

    pub fn effect_log_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.log)
    }

    /// The side still standing once the other has no living creatures
    pub fn winner(&self) -> Option<PlayerName> {
        let users = self.creatures_of(PlayerName::User);
        let enemies = self.creatures_of(PlayerName::Enemy);
        match (users.is_empty(), enemies.is_empty()) {
            (false, true) => Some(PlayerName::User),
            (true, false) => Some(PlayerName::Enemy),
            _ => None,
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Dispatch `event` and everything it causes
    pub fn dispatch(&mut self, event: DelegateEvent) {
        execute_event(self, event);
    }

    /// Advance the battle by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: u64) {
        self.now = GameTime(self.now.0 + dt_ms);
        trace!(now = self.now.0, "tick");
        self.prune();
        self.regenerate();
        self.advance_projectiles(dt_ms);
        self.act(dt_ms);
    }

    /// Remove expired modifiers from every creature and player table
    pub fn prune(&mut self) {
        let snapshot = LivenessSnapshot {
            now: self.now,
            alive: self
                .creatures
                .values()
                .filter(|c| c.is_alive())
                .map(|c| c.id)
                .collect(),
        };
        for creature in self.creatures.values_mut() {
            creature.prune(&snapshot);
        }

        let oracle = WorldOracle(&*self);
        let players: BTreeMap<PlayerName, StatTable> = self
            .players
            .iter()
            .map(|(player, table)| (*player, table.prune(&oracle)))
            .collect();
        self.players = players;
    }

    fn regenerate(&mut self) {
        while self.now.0 >= self.last_regeneration.0 + 1000 {
            self.last_regeneration = GameTime(self.last_regeneration.0 + 1000);
            let heals: Vec<Effect> = self
                .creatures
                .values()
                .filter(|c| c.is_alive() && c.damage_taken > 0)
                .filter_map(|c| {
                    let amount = c.stats.get(stat::HEALTH_REGENERATION_PER_SECOND);
                    (amount > 0).then_some(Effect::Heal { target: c.id, amount })
                })
                .collect();
            for heal in heals {
                if let Err(err) = self.execute(&heal) {
                    debug!(error = %err, "regeneration skipped");
                }
            }
        }
    }

    fn advance_projectiles(&mut self, dt_ms: u64) {
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut kept = Vec::with_capacity(in_flight.len());
        let mut impacts = Vec::new();

        for mut projectile in in_flight {
            let Some(owner) = self.creature(projectile.fired_by).map(Creature::owner) else {
                trace!(creature = %projectile.fired_by, "dropping projectile of removed creature");
                continue;
            };
            if self.now < projectile.launch_at {
                kept.push(projectile);
                continue;
            }
            if self.now >= projectile.expires_at {
                trace!(creature = %projectile.fired_by, "projectile flight time exhausted");
                continue;
            }

            if let Some(target) = projectile.state.tracking {
                if let Some(tracked) = self.creature(target).filter(|c| c.is_alive()) {
                    let toward = (tracked.position - projectile.state.position).normalize_or_zero();
                    if toward != Vec2::ZERO {
                        projectile.state.direction = toward;
                    }
                }
            }
            let step = projectile.speed * dt_ms as f32 / 1000.0;
            projectile.state.position = projectile.state.position + projectile.state.direction * step;

            if projectile.state.position.distance(projectile.origin) > MAX_PROJECTILE_RANGE {
                continue;
            }

            let hits = self.overlapping(&projectile.state.collider(), owner.opponent());
            if hits.is_empty() {
                kept.push(projectile);
                continue;
            }

            let scope = SkillScope::new(projectile.fired_by, projectile.skill)
                .with_projectile(projectile.state.clone());
            if resolve::should_skip_projectile_impact(&*self, &scope) {
                kept.push(projectile);
            } else {
                impacts.push(scope);
            }
        }

        self.projectiles = kept;
        for scope in impacts {
            execute_event(self, DelegateEvent::SkillImpact(scope));
        }
    }

    fn act(&mut self, dt_ms: u64) {
        let ready: Vec<EntityId> = self.creatures.keys().copied().collect();
        for id in ready {
            let Some(creature) = self.creature(id) else {
                continue;
            };
            if !creature.is_alive() || creature.is_stunned(self.now) {
                continue;
            }
            match resolve::select_skill(&*self, id) {
                Some(skill) => self.use_skill(id, skill),
                None => self.advance_creature(id, dt_ms),
            }
        }
    }

    /// Run the full use sequence for one skill: start, use, then impact for
    /// skills that land immediately
    pub fn use_skill(&mut self, creature: EntityId, skill: SkillId) {
        let Some(skill_type) = self
            .creature(creature)
            .and_then(|c| c.skill(skill))
            .map(|s| s.skill_type)
        else {
            debug!(creature = %creature, ?skill, "cannot use unknown skill");
            return;
        };

        let scope = SkillScope::new(creature, skill);
        execute_event(self, DelegateEvent::SkillStart(scope.clone()));
        execute_event(self, DelegateEvent::SkillUsed(scope.clone()));
        if matches!(skill_type, SkillType::Melee | SkillType::Area) {
            execute_event(self, DelegateEvent::SkillImpact(scope));
        }
    }

    /// Walk toward the enemy when nothing is in reach
    fn advance_creature(&mut self, id: EntityId, dt_ms: u64) {
        if resolve::melee_could_hit(&*self, id) || resolve::projectile_could_hit(&*self, id) {
            return;
        }
        let Some(creature) = self.creatures.get_mut(&id) else {
            return;
        };
        let speed = creature.stats.get(stat::CREATURE_SPEED);
        if speed <= 0 {
            return;
        }
        let step = speed as f32 / MILLI_UNITS * dt_ms as f32 / 1000.0;
        creature.position = creature.position + creature.owner().forward() * step;
    }

    // ========================================================================
    // Effect helpers
    // ========================================================================

    fn registered_mut(&mut self, id: EntityId) -> Result<&mut Creature, EffectError> {
        self.creatures
            .get_mut(&id)
            .ok_or(EffectError::MissingCreature(id))
    }

    fn living_mut(&mut self, id: EntityId) -> Result<&mut Creature, EffectError> {
        let creature = self.registered_mut(id)?;
        if creature.is_alive() {
            Ok(creature)
        } else {
            Err(EffectError::CreatureDead(id))
        }
    }

    fn apply_damage(
        &mut self,
        source: EntityId,
        target: EntityId,
        amount: i32,
    ) -> Result<Vec<DelegateEvent>, EffectError> {
        let now = self.now;
        let victim = self.living_mut(target)?;
        victim.damage_taken = victim.damage_taken.saturating_add(amount);
        if victim.current_health() > 0 {
            return Ok(Vec::new());
        }

        victim.state = LifeState::Dead;
        let victim_owner = victim.owner();
        debug!(creature = %target, time = now.0, "creature died");

        let mut events = vec![DelegateEvent::Death { creature: target }];
        let killer_is_enemy = self
            .creature(source)
            .is_some_and(|killer| killer.is_alive() && killer.owner() != victim_owner);
        if killer_is_enemy {
            events.push(DelegateEvent::KilledEnemy {
                creature: source,
                enemy: target,
                damage: amount,
            });
        }
        Ok(events)
    }

    fn fire_projectile(&mut self, fire: &FireProjectile) -> Result<(), EffectError> {
        let creature = self
            .creature(fire.fired_by)
            .ok_or(EffectError::MissingCreature(fire.fired_by))?;
        let stats = creature
            .skill_stats(fire.skill)
            .ok_or(EffectError::MissingSkill {
                creature: fire.fired_by,
                skill: fire.skill,
            })?;
        let speed = stats.get(stat::PROJECTILE_SPEED) as f32 / MILLI_UNITS;
        let direction = fire.direction.normalize_or_zero();
        if speed <= 0.0 || direction == Vec2::ZERO {
            return Err(EffectError::StalledProjectile {
                creature: fire.fired_by,
                skill: fire.skill,
            });
        }

        let launch_at = self.now.plus_ms(fire.delay_ms as i64);
        self.projectiles.push(InFlight {
            fired_by: fire.fired_by,
            skill: fire.skill,
            state: ProjectileState {
                position: fire.origin,
                direction,
                delegate_index: fire.delegate_index,
                times_chained: fire.times_chained,
                skip_impacts: fire.skip_impacts.clone(),
                tracking: fire.tracking,
            },
            origin: fire.origin,
            launch_at,
            expires_at: launch_at.plus_ms(MAX_PROJECTILE_FLIGHT_MS),
            speed,
        });
        Ok(())
    }

    fn apply(&mut self, effect: &Effect) -> Result<Vec<DelegateEvent>, EffectError> {
        let now = self.now;
        match effect {
            Effect::ApplyDamage {
                source,
                target,
                amount,
            } => return self.apply_damage(*source, *target, *amount),
            Effect::Heal { target, amount } => {
                let creature = self.living_mut(*target)?;
                creature.damage_taken = creature.damage_taken.saturating_sub(*amount).max(0);
            }
            Effect::Stun { target, duration } => {
                let creature = self.living_mut(*target)?;
                let until = now.plus_ms(duration.millis as i64);
                creature.stunned_until = Some(creature.stunned_until.map_or(until, |u| u.max(until)));
            }
            Effect::Knockback {
                source,
                target,
                distance_multiplier,
                duration,
            } => {
                let from = self
                    .creature(*source)
                    .ok_or(EffectError::MissingCreature(*source))?
                    .position;
                let creature = self.living_mut(*target)?;
                let mut away = (creature.position - from).normalize_or_zero();
                if away == Vec2::ZERO {
                    away = -creature.owner().forward();
                }
                let distance = KNOCKBACK_DISTANCE * distance_multiplier.as_multiplier() as f32;
                creature.position = creature.position + away * distance;
                let until = now.plus_ms(duration.millis as i64);
                creature.stunned_until = Some(creature.stunned_until.map_or(until, |u| u.max(until)));
            }
            Effect::FireProjectile(fire) => self.fire_projectile(fire)?,
            Effect::ApplyModifier { target, modifier } => {
                let creature = self.living_mut(*target)?;
                let stats = creature.stats.insert(modifier.clone());
                creature.replace_stats(stats);
            }
            Effect::ApplyModifierToOwner { owner, modifier } => {
                let table = self.player_stats(*owner).insert(modifier.clone());
                self.players.insert(*owner, table);
            }
            Effect::CreateCreature {
                data,
                position,
                board,
            } => {
                let id = self.register(data.clone(), *position, *board);
                return Ok(vec![DelegateEvent::Activate { creature: id }]);
            }
            Effect::RemoveCreature { creature } => {
                self.creatures
                    .remove(creature)
                    .ok_or(EffectError::MissingCreature(*creature))?;
            }
            Effect::EnemyRemoved { .. } => self.enemies_removed += 1,
            Effect::MarkSkillUsed { creature, skill } => {
                let c = self.registered_mut(*creature)?;
                if c.skill(*skill).is_none() {
                    return Err(EffectError::MissingSkill {
                        creature: *creature,
                        skill: *skill,
                    });
                }
                c.skill_last_used.insert(*skill, now);
            }
            Effect::SetSkillState {
                creature,
                skill,
                state,
            } => {
                self.registered_mut(*creature)?
                    .skill_states
                    .insert(*skill, state.clone());
            }
            Effect::SkillEvent { .. } | Effect::DamageText { .. } | Effect::Event(_) => {}
        }
        Ok(Vec::new())
    }
}

impl EntityQuery for Arena {
    fn creature(&self, id: EntityId) -> Option<&Creature> {
        self.creatures.get(&id)
    }
}

impl SpatialQuery for Arena {
    fn overlapping(&self, collider: &Collider, team: PlayerName) -> Vec<EntityId> {
        let mut hits: Vec<(f32, EntityId)> = self
            .creatures
            .values()
            .filter(|c| c.is_alive() && c.owner() == team)
            .filter(|c| c.collider().overlaps(collider))
            .map(|c| (c.position.distance(collider.center), c.id))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn raycast(&self, origin: Vec2, direction: Vec2, team: PlayerName) -> Option<EntityId> {
        let direction = direction.normalize_or_zero();
        self.creatures
            .values()
            .filter(|c| c.is_alive() && c.owner() == team)
            .filter_map(|c| ray_circle(origin, direction, &c.collider()).map(|t| (t, c.id)))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    fn creatures_of(&self, team: PlayerName) -> Vec<EntityId> {
        self.creatures
            .values()
            .filter(|c| c.is_alive() && c.owner() == team)
            .map(|c| c.id)
            .collect()
    }

    fn adjacent_creatures(&self, position: BoardPosition, team: PlayerName) -> Vec<EntityId> {
        self.creatures
            .values()
            .filter(|c| c.is_alive() && c.owner() == team)
            .filter(|c| c.board.is_some_and(|b| b.is_adjacent(&position)))
            .map(|c| c.id)
            .collect()
    }
}

/// Distance along a unit ray to the first point inside `circle`
fn ray_circle(origin: Vec2, direction: Vec2, circle: &Collider) -> Option<f32> {
    let m = origin - circle.center;
    let b = m.dot(direction);
    let c = m.length_squared() - circle.radius * circle.radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some((-b - discriminant.sqrt()).max(0.0))
}

impl Clock for Arena {
    fn now(&self) -> GameTime {
        self.now
    }
}

impl RandomSource for Arena {
    fn next_unit(&self) -> f64 {
        self.random.next_unit()
    }
}

impl WorldView for Arena {
    fn constants(&self) -> &CombatConstants {
        &self.constants
    }
}

impl EffectExecutor for Arena {
    fn execute(&mut self, effect: &Effect) -> Result<Vec<DelegateEvent>, EffectError> {
        let events = self.apply(effect)?;
        self.log.push(LoggedEffect {
            time: self.now,
            effect: effect.clone(),
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{SkillData, SkillState};
    use crate::stats::{Lifetime, PercentageValue};
    use crate::world::ScriptedRandom;

    fn arena() -> Arena {
        Arena::new(ScriptedRandom::constant(0.5))
    }

    fn dummy(name: &str, owner: PlayerName) -> CreatureData {
        CreatureData::new(name, owner).with_modifier(stat::HEALTH.set(20))
    }

    #[test]
    fn test_overlapping_nearest_first() {
        let mut arena = arena();
        let far = arena.add_creature_at(dummy("far", PlayerName::Enemy), Vec2::new(0.6, 0.0));
        let near = arena.add_creature_at(dummy("near", PlayerName::Enemy), Vec2::new(0.3, 0.0));
        arena.add_creature_at(dummy("ally", PlayerName::User), Vec2::new(0.1, 0.0));

        let hits = arena.overlapping(&Collider::new(Vec2::ZERO, 0.4), PlayerName::Enemy);
        assert_eq!(hits, vec![near, far]);
    }

    #[test]
    fn test_raycast_along_file() {
        let mut arena = arena();
        let behind = arena.add_creature(dummy("behind", PlayerName::Enemy), BoardPosition::new(6, 2));
        let front = arena.add_creature(dummy("front", PlayerName::Enemy), BoardPosition::new(4, 2));
        arena.add_creature(dummy("other file", PlayerName::Enemy), BoardPosition::new(3, 4));

        let origin = BoardPosition::new(0, 2).center();
        assert_eq!(
            arena.raycast(origin, Vec2::new(1.0, 0.0), PlayerName::Enemy),
            Some(front)
        );
        assert_eq!(arena.raycast(origin, Vec2::new(-1.0, 0.0), PlayerName::Enemy), None);

        // Creatures behind the origin are never hit
        let between = BoardPosition::new(5, 2).center();
        assert_eq!(
            arena.raycast(between, Vec2::new(1.0, 0.0), PlayerName::Enemy),
            Some(behind)
        );
    }

    #[test]
    fn test_adjacent_creatures() {
        let mut arena = arena();
        let left = arena.add_creature(dummy("left", PlayerName::User), BoardPosition::new(1, 1));
        arena.add_creature(dummy("far", PlayerName::User), BoardPosition::new(3, 1));
        arena.add_creature(dummy("foe", PlayerName::Enemy), BoardPosition::new(2, 2));

        let adjacent = arena.adjacent_creatures(BoardPosition::new(2, 1), PlayerName::User);
        assert_eq!(adjacent, vec![left]);
    }

    #[test]
    fn test_lethal_damage_removes_creature() {
        let mut arena = arena();
        let attacker = arena.add_creature_at(dummy("attacker", PlayerName::User), Vec2::ZERO);
        let victim = arena.add_creature_at(dummy("victim", PlayerName::Enemy), Vec2::new(5.0, 0.0));

        let events = arena
            .execute(&Effect::ApplyDamage {
                source: attacker,
                target: victim,
                amount: 25,
            })
            .unwrap();
        assert_eq!(
            events,
            vec![
                DelegateEvent::Death { creature: victim },
                DelegateEvent::KilledEnemy {
                    creature: attacker,
                    enemy: victim,
                    damage: 25
                },
            ]
        );

        for event in events {
            arena.dispatch(event);
        }
        assert!(arena.creature(victim).is_none());
        assert_eq!(arena.enemies_removed(), 1);
        assert_eq!(arena.winner(), Some(PlayerName::User));
    }

    #[test]
    fn test_effects_on_missing_creature_fail() {
        let mut arena = arena();
        let missing = EntityId(42);
        assert_eq!(
            arena.execute(&Effect::Heal {
                target: missing,
                amount: 1
            }),
            Err(EffectError::MissingCreature(missing))
        );
        assert!(arena.effect_log().is_empty());
    }

    #[test]
    fn test_heal_does_not_overheal() {
        let mut arena = arena();
        let id = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        arena
            .execute(&Effect::ApplyDamage { source: id, target: id, amount: 5 })
            .unwrap();
        arena.execute(&Effect::Heal { target: id, amount: 50 }).unwrap();
        assert_eq!(arena.creature(id).unwrap().current_health(), 20);
    }

    #[test]
    fn test_damage_saturates_at_extreme_health() {
        let mut arena = arena();
        let attacker = arena.add_creature_at(dummy("attacker", PlayerName::User), Vec2::ZERO);
        let giant = arena.add_creature_at(
            CreatureData::new("giant", PlayerName::Enemy).with_modifier(stat::HEALTH.set(i32::MAX)),
            Vec2::new(5.0, 0.0),
        );

        let events = arena
            .execute(&Effect::ApplyDamage { source: attacker, target: giant, amount: i32::MAX - 1 })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(arena.creature(giant).unwrap().current_health(), 1);

        let events = arena
            .execute(&Effect::ApplyDamage { source: attacker, target: giant, amount: 10 })
            .unwrap();
        assert_eq!(events[0], DelegateEvent::Death { creature: giant });
        let giant = arena.creature(giant).unwrap();
        assert_eq!(giant.damage_taken, i32::MAX);
        assert!(giant.current_health() <= 0);
        assert!(!giant.is_alive());
    }

    #[test]
    fn test_stationary_projectiles_are_never_tracked() {
        let mut arena = arena();
        let turret = CreatureData::new("turret", PlayerName::User).with_skill(
            SkillData::new(SkillId(1), "Dud", SkillType::Projectile)
                .with_modifier(stat::PROJECTILE_SPEED.set(0)),
        );
        let id = arena.add_creature_at(turret, Vec2::ZERO);
        arena.add_creature_at(dummy("target", PlayerName::Enemy), Vec2::new(5.0, 0.0));

        assert_eq!(
            arena.execute(&Effect::FireProjectile(FireProjectile::new(
                id,
                SkillId(1),
                0,
                Vec2::ZERO,
                Vec2::X
            ))),
            Err(EffectError::StalledProjectile { creature: id, skill: SkillId(1) })
        );

        for _ in 0..1000 {
            arena.tick(100);
        }
        assert_eq!(arena.projectile_count(), 0);
    }

    #[test]
    fn test_zero_direction_projectile_rejected() {
        let mut arena = arena();
        let archer = CreatureData::new("archer", PlayerName::User)
            .with_skill(SkillData::new(SkillId(1), "Arrow", SkillType::Projectile));
        let id = arena.add_creature_at(archer, Vec2::ZERO);
        let fire = FireProjectile::new(id, SkillId(1), 0, Vec2::ZERO, Vec2::ZERO);
        assert!(arena.execute(&Effect::FireProjectile(fire)).is_err());
        assert_eq!(arena.projectile_count(), 0);
    }

    #[test]
    fn test_projectile_flight_time_is_bounded() {
        let mut arena = arena();
        let archer = CreatureData::new("archer", PlayerName::User).with_skill(
            SkillData::new(SkillId(1), "Drift", SkillType::Projectile)
                .with_modifier(stat::PROJECTILE_SPEED.set(100)),
        );
        let id = arena.add_creature_at(archer, Vec2::ZERO);
        arena
            .execute(&Effect::FireProjectile(FireProjectile::new(
                id,
                SkillId(1),
                0,
                Vec2::ZERO,
                Vec2::Y,
            )))
            .unwrap();

        // 0.1 units per second stays far inside the range limit
        for _ in 0..99 {
            arena.tick(100);
        }
        assert_eq!(arena.projectile_count(), 1);
        arena.tick(100);
        assert_eq!(arena.projectile_count(), 0);
    }

    #[test]
    fn test_timed_modifier_pruned_on_tick() {
        let mut arena = arena();
        let id = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        let base = arena.creature(id).unwrap().stats.get(stat::EVASION);
        arena
            .execute(&Effect::ApplyModifier {
                target: id,
                modifier: stat::EVASION
                    .add(30)
                    .with_lifetime(Lifetime::timed(GameTime::ZERO, 250)),
            })
            .unwrap();
        assert_eq!(arena.creature(id).unwrap().stats.get(stat::EVASION), base + 30);

        arena.tick(200);
        assert_eq!(arena.creature(id).unwrap().stats.get(stat::EVASION), base + 30);
        arena.tick(100);
        assert_eq!(arena.creature(id).unwrap().stats.get(stat::EVASION), base);
    }

    #[test]
    fn test_owner_modifier_lives_with_creature() {
        let mut arena = arena();
        let source = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        arena
            .execute(&Effect::ApplyModifierToOwner {
                owner: PlayerName::User,
                modifier: stat::MANA_GAIN
                    .add(3)
                    .with_lifetime(Lifetime::WhileAlive { entity: source }),
            })
            .unwrap();
        arena.tick(10);
        assert_eq!(arena.player_stats(PlayerName::User).get(stat::MANA_GAIN), 3);

        arena.dispatch(DelegateEvent::Death { creature: source });
        arena.tick(10);
        assert_eq!(arena.player_stats(PlayerName::User).get(stat::MANA_GAIN), 0);
    }

    #[test]
    fn test_granted_modifier_reverts_after_source_dies() {
        let mut arena = arena();
        let source = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        let holder = arena.add_creature_at(dummy("b", PlayerName::User), Vec2::new(0.0, 1.0));
        let accuracy = |arena: &Arena| {
            arena.creature(holder).unwrap().stats.get(stat::ACCURACY)
        };
        let baseline = accuracy(&arena);

        arena
            .execute(&Effect::ApplyModifier {
                target: holder,
                modifier: stat::ACCURACY
                    .add(10)
                    .with_lifetime(Lifetime::WhileAlive { entity: source }),
            })
            .unwrap();
        arena.tick(100);
        assert_eq!(accuracy(&arena), baseline + 10);

        let events = arena
            .execute(&Effect::ApplyDamage { source, target: source, amount: 1000 })
            .unwrap();
        for event in events {
            arena.dispatch(event);
        }
        assert!(arena.creature(source).is_none());
        // Still applied until the next prune
        assert_eq!(accuracy(&arena), baseline + 10);

        arena.tick(100);
        assert_eq!(accuracy(&arena), baseline);
    }

    #[test]
    fn test_regeneration_each_second() {
        let mut arena = arena();
        let id = arena.add_creature_at(
            dummy("troll", PlayerName::User).with_modifier(stat::HEALTH_REGENERATION_PER_SECOND.add(2)),
            Vec2::ZERO,
        );
        arena
            .execute(&Effect::ApplyDamage { source: id, target: id, amount: 10 })
            .unwrap();
        arena.tick(999);
        assert_eq!(arena.creature(id).unwrap().damage_taken, 10);
        arena.tick(1);
        assert_eq!(arena.creature(id).unwrap().damage_taken, 8);
        arena.tick(2000);
        assert_eq!(arena.creature(id).unwrap().damage_taken, 4);
    }

    #[test]
    fn test_stun_keeps_longest() {
        let mut arena = arena();
        let id = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        let stun = |ms| Effect::Stun {
            target: id,
            duration: crate::stats::DurationValue::from_millis(ms),
        };
        arena.execute(&stun(800)).unwrap();
        arena.execute(&stun(300)).unwrap();
        assert_eq!(arena.creature(id).unwrap().stunned_until, Some(GameTime(800)));
    }

    #[test]
    fn test_knockback_pushes_away() {
        let mut arena = arena();
        let source = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        let target = arena.add_creature_at(dummy("b", PlayerName::Enemy), Vec2::new(1.0, 0.0));
        arena
            .execute(&Effect::Knockback {
                source,
                target,
                distance_multiplier: PercentageValue::from_percent(200.0),
                duration: crate::stats::DurationValue::from_millis(100),
            })
            .unwrap();
        let moved = arena.creature(target).unwrap();
        assert!((moved.position.x - 2.0).abs() < 1e-5);
        assert!(moved.is_stunned(GameTime(50)));
    }

    #[test]
    fn test_skill_state_and_cooldown_marks() {
        let mut arena = arena();
        let data = dummy("a", PlayerName::User)
            .with_skill(SkillData::new(SkillId(1), "Slash", SkillType::Melee));
        let id = arena.add_creature_at(data, Vec2::ZERO);

        arena.tick(100);
        arena
            .execute(&Effect::MarkSkillUsed { creature: id, skill: SkillId(1) })
            .unwrap();
        let state = SkillState {
            last_creature_hit: Some(EntityId(9)),
            times_hit: 2,
        };
        arena
            .execute(&Effect::SetSkillState {
                creature: id,
                skill: SkillId(1),
                state: state.clone(),
            })
            .unwrap();

        let creature = arena.creature(id).unwrap();
        assert_eq!(creature.last_used(SkillId(1)), Some(GameTime(100)));
        assert_eq!(creature.skill_state(SkillId(1)), state);
        assert_eq!(
            arena.execute(&Effect::MarkSkillUsed { creature: id, skill: SkillId(7) }),
            Err(EffectError::MissingSkill { creature: id, skill: SkillId(7) })
        );
    }

    #[test]
    fn test_effect_log_serializes() {
        let mut arena = arena();
        let id = arena.add_creature_at(dummy("a", PlayerName::User), Vec2::ZERO);
        arena.execute(&Effect::DamageText { target: id, amount: 3 }).unwrap();
        let json = arena.effect_log_json().unwrap();
        assert!(json.contains("damage_text"));
    }
}
