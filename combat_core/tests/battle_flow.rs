//! Integration test: Spawn creatures -> Use skills -> Resolve damage and status effects
//!
//! These tests drive the full dispatch pipeline through the in-memory Arena.

use combat_core::creature::ProjectileState;
use combat_core::prelude::*;

const SLASH: SkillId = SkillId(1);

/// Skill stats that remove every random roll from the hit pipeline
fn deterministic(skill: SkillData) -> SkillData {
    skill
        .with_modifier(stat::USES_ACCURACY.set_false())
        .with_modifier(stat::CAN_CRIT.set_false())
        .with_modifier(stat::CAN_STUN.set_false())
}

fn physical(amount: i32) -> TaggedValues<DamageType, IntRangeValue> {
    TaggedValues::single(DamageType::Physical, IntRangeValue::fixed(amount))
}

fn swordsman(base_damage: i32) -> CreatureData {
    CreatureData::new("Swordsman", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(base_damage)))
        .with_skill(SkillData::new(SLASH, "Slash", SkillType::Melee))
}

fn target_dummy() -> CreatureData {
    CreatureData::new("Dummy", PlayerName::Enemy)
}

/// Place `attacker` and `target` close enough for melee
fn melee_pair(arena: &mut Arena, attacker: CreatureData, target: CreatureData) -> (EntityId, EntityId) {
    let a = arena.add_creature_at(attacker, Vec2::ZERO);
    let t = arena.add_creature_at(target, Vec2::new(0.5, 0.0));
    (a, t)
}

fn damage_taken(arena: &Arena, id: EntityId) -> i32 {
    arena.creature(id).map_or(0, |c| c.damage_taken)
}

fn applied_damage(arena: &Arena) -> Vec<i32> {
    arena
        .effect_log()
        .iter()
        .filter_map(|logged| match logged.effect {
            Effect::ApplyDamage { amount, .. } => Some(amount),
            _ => None,
        })
        .collect()
}

#[test]
fn test_melee_hit_reduced_by_flat_reduction() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Swordsman", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(10)))
        .with_skill(deterministic(SkillData::new(SLASH, "Slash", SkillType::Melee)));
    let target = target_dummy()
        .with_modifier(stat::DAMAGE_REDUCTION.add(TaggedValues::single(DamageType::Physical, 3)));
    let (a, t) = melee_pair(&mut arena, attacker, target);

    arena.use_skill(a, SLASH);

    assert_eq!(damage_taken(&arena, t), 7);
    assert_eq!(applied_damage(&arena), vec![7]);
    assert!(arena
        .effect_log()
        .iter()
        .any(|l| l.effect == Effect::DamageText { target: t, amount: 7 }));
    assert_eq!(arena.creature(a).unwrap().last_used(SLASH), Some(GameTime::ZERO));
}

#[test]
fn test_hit_roll_then_crit() {
    // Draws: hit, crit, then the stun roll falls back to 0.99
    let mut arena = Arena::new(ScriptedRandom::new([0.0, 0.0], 0.99));
    let (a, t) = melee_pair(&mut arena, swordsman(10), target_dummy());

    arena.use_skill(a, SLASH);

    assert_eq!(damage_taken(&arena, t), 20);
    assert!(arena.effect_log().iter().any(|l| l.effect
        == Effect::SkillEvent {
            creature: a,
            kind: combat_core::effect::SkillEventKind::Crit
        }));
}

#[test]
fn test_miss_deals_no_damage() {
    // A draw of 0.99 is above the 95% hit cap
    let mut arena = Arena::new(ScriptedRandom::constant(0.99));
    let (a, t) = melee_pair(&mut arena, swordsman(10), target_dummy());

    arena.use_skill(a, SLASH);

    assert_eq!(damage_taken(&arena, t), 0);
    assert!(applied_damage(&arena).is_empty());
    assert!(arena.effect_log().iter().any(|l| l.effect
        == Effect::SkillEvent {
            creature: a,
            kind: combat_core::effect::SkillEventKind::Missed
        }));
}

#[test]
fn test_repeated_hits_add_damage() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Flurry", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(10)))
        .with_skill(
            deterministic(SkillData::new(SLASH, "Flurry", SkillType::Melee))
                .with_delegate(DelegateId::AddedDamageOnRepeatedHits)
                .with_modifier(stat::SAME_TARGET_ADDED_DAMAGE.set(physical(2))),
        );
    let (a, t) = melee_pair(&mut arena, attacker, target_dummy());

    for _ in 0..3 {
        arena.use_skill(a, SLASH);
    }

    assert_eq!(applied_damage(&arena), vec![10, 12, 14]);
    assert_eq!(damage_taken(&arena, t), 36);
    let state = arena.creature(a).unwrap().skill_state(SLASH);
    assert_eq!(state.last_creature_hit, Some(t));
    assert_eq!(state.times_hit, 3);
}

#[test]
fn test_raised_events_run_after_all_effects() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Flurry", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(10)))
        .with_skill(
            deterministic(SkillData::new(SLASH, "Flurry", SkillType::Melee))
                .with_delegate(DelegateId::AddedDamageOnRepeatedHits),
        );
    let (a, t) = melee_pair(&mut arena, attacker, target_dummy());

    arena.dispatch(DelegateEvent::ApplyToTarget {
        scope: SkillScope::new(a, SLASH),
        target: t,
    });

    // HitTarget is pushed before ApplyDamage, but dispatches only after it executes
    let kinds: Vec<&'static str> = arena
        .effect_log()
        .iter()
        .map(|l| match l.effect {
            Effect::ApplyDamage { .. } => "damage",
            Effect::DamageText { .. } => "text",
            Effect::SetSkillState { .. } => "state",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["damage", "text", "state"]);
}

#[test]
fn test_lethal_hit_kills_and_removes_enemy() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Executioner", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(500)))
        .with_skill(deterministic(SkillData::new(SLASH, "Behead", SkillType::Melee)));
    let (a, t) = melee_pair(&mut arena, attacker, target_dummy());

    arena.use_skill(a, SLASH);

    assert!(arena.creature(t).is_none());
    assert_eq!(arena.enemies_removed(), 1);
    assert_eq!(arena.winner(), Some(PlayerName::User));
    assert!(arena
        .effect_log()
        .iter()
        .any(|l| l.effect == Effect::RemoveCreature { creature: t }));
}

#[test]
fn test_projectile_travels_and_impacts() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let archer = CreatureData::new("Archer", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(10)))
        .with_skill(deterministic(SkillData::new(SLASH, "Arrow", SkillType::Projectile)));
    let a = arena.add_creature_at(archer, Vec2::ZERO);
    let t = arena.add_creature_at(target_dummy(), Vec2::new(3.0, 0.0));

    arena.use_skill(a, SLASH);
    assert_eq!(arena.projectile_count(), 1);
    assert_eq!(damage_taken(&arena, t), 0);

    // 4 units per second closes the gap within 700ms
    for _ in 0..8 {
        arena.tick(100);
    }
    assert_eq!(arena.projectile_count(), 0);
    assert_eq!(damage_taken(&arena, t), 10);
}

#[test]
fn test_creature_selects_skill_each_cooldown() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Swordsman", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(5)))
        .with_skill(deterministic(SkillData::new(SLASH, "Slash", SkillType::Melee)));
    let (_, t) = melee_pair(&mut arena, attacker, target_dummy());

    // Uses at 100ms and 1100ms with the default 1s cooldown
    for _ in 0..15 {
        arena.tick(100);
    }
    assert_eq!(damage_taken(&arena, t), 10);
}

#[test]
fn test_chaining_projectile_splits_once() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let archer = CreatureData::new("Storm Archer", PlayerName::User)
        .with_delegate(DelegateId::MultipleProjectiles)
        .with_delegate(DelegateId::ProjectileArc)
        .with_delegate(DelegateId::AdjacentFileProjectiles)
        .with_skill(
            SkillData::new(SLASH, "Fork", SkillType::Projectile)
                .with_delegate(DelegateId::ChainingProjectiles),
        );
    let a = arena.add_creature_at(archer, Vec2::ZERO);
    let t = arena.add_creature_at(target_dummy(), Vec2::new(3.0, 0.0));

    let projectile = ProjectileState {
        position: Vec2::new(3.0, 0.0),
        direction: Vec2::new(1.0, 0.0),
        delegate_index: 4,
        times_chained: 0,
        skip_impacts: Vec::new(),
        tracking: None,
    };
    arena.dispatch(DelegateEvent::HitTarget {
        scope: SkillScope::new(a, SLASH).with_projectile(projectile.clone()),
        target: t,
        damage: 5,
    });

    let fired: Vec<FireProjectile> = arena
        .effect_log()
        .iter()
        .filter_map(|l| match &l.effect {
            Effect::FireProjectile(fire) => Some(fire.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(fired.len(), 2);
    for fire in &fired {
        assert_eq!(fire.delegate_index, 3);
        assert_eq!(fire.times_chained, 1);
        assert_eq!(fire.skip_impacts, vec![t]);
    }
    assert_eq!(arena.projectile_count(), 2);

    // An already-chained projectile does not chain again
    let chained = ProjectileState {
        times_chained: 1,
        skip_impacts: vec![t],
        ..projectile
    };
    arena.dispatch(DelegateEvent::HitTarget {
        scope: SkillScope::new(a, SLASH).with_projectile(chained),
        target: t,
        damage: 5,
    });
    assert_eq!(arena.projectile_count(), 2);
}

#[test]
fn test_random_chain_targets_only_opponents() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let archer = CreatureData::new("Hunter", PlayerName::User).with_skill(
        SkillData::new(SLASH, "Ricochet", SkillType::Projectile)
            .with_delegate(DelegateId::ChainToRandomTarget),
    );
    let a = arena.add_creature_at(archer, Vec2::ZERO);
    let t = arena.add_creature_at(target_dummy(), Vec2::new(3.0, 0.0));
    arena.add_creature_at(CreatureData::new("Squire", PlayerName::User), Vec2::new(3.0, 1.0));
    let far = arena.add_creature_at(target_dummy(), Vec2::new(6.0, 0.0));

    let projectile = ProjectileState {
        position: Vec2::new(3.0, 0.0),
        direction: Vec2::X,
        delegate_index: 0,
        times_chained: 0,
        skip_impacts: vec![t],
        tracking: None,
    };
    arena.dispatch(DelegateEvent::HitTarget {
        scope: SkillScope::new(a, SLASH).with_projectile(projectile.clone()),
        target: t,
        damage: 5,
    });

    let tracked: Vec<Option<EntityId>> = arena
        .effect_log()
        .iter()
        .filter_map(|l| match &l.effect {
            Effect::FireProjectile(fire) => Some(fire.tracking),
            _ => None,
        })
        .collect();
    assert_eq!(tracked, vec![Some(far)]);

    // With every enemy already hit, the ally is never chosen
    let exhausted = ProjectileState {
        skip_impacts: vec![t, far],
        ..projectile
    };
    arena.dispatch(DelegateEvent::HitTarget {
        scope: SkillScope::new(a, SLASH).with_projectile(exhausted),
        target: far,
        damage: 5,
    });
    assert_eq!(arena.projectile_count(), 1);
}

#[test]
fn test_multiple_projectiles_fire_in_sequence() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let archer = CreatureData::new("Archer", PlayerName::User)
        .with_delegate(DelegateId::MultipleProjectiles)
        .with_modifier(stat::PROJECTILE_SEQUENCE_COUNT.set(3))
        .with_skill(deterministic(SkillData::new(SLASH, "Volley", SkillType::Projectile)));
    let a = arena.add_creature_at(archer, Vec2::ZERO);

    arena.use_skill(a, SLASH);

    let delays: Vec<i32> = arena
        .effect_log()
        .iter()
        .filter_map(|l| match &l.effect {
            Effect::FireProjectile(fire) => Some(fire.delay_ms),
            _ => None,
        })
        .collect();
    assert_eq!(delays, vec![0, 200, 400]);
    assert_eq!(arena.projectile_count(), 3);
}

#[test]
fn test_shock_expires_after_duration() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Stormcaller", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(1)))
        .with_skill(
            deterministic(SkillData::new(SLASH, "Zap", SkillType::Melee))
                .with_delegate(DelegateId::ChanceToShock)
                .with_modifier(stat::SHOCK_CHANCE.set(PercentageValue::HUNDRED))
                .with_modifier(stat::COOLDOWN.set(DurationValue::from_millis(100_000))),
        );
    let (a, t) = melee_pair(&mut arena, attacker, target_dummy());

    arena.use_skill(a, SLASH);
    let shocked = &arena.creature(t).unwrap().stats;
    assert!(shocked.get(stat::IS_SHOCKED));
    assert_eq!(shocked.get(stat::RECEIVE_CRITS_CHANCE), PercentageValue::from_percent(20.0));

    arena.tick(1999);
    assert!(arena.creature(t).unwrap().stats.get(stat::IS_SHOCKED));
    arena.tick(1);
    let recovered = &arena.creature(t).unwrap().stats;
    assert!(!recovered.get(stat::IS_SHOCKED));
    assert_eq!(recovered.get(stat::RECEIVE_CRITS_CHANCE), PercentageValue::default());
}

#[test]
fn test_mana_generation_ends_with_creature() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let well = CreatureData::new("Mana Well", PlayerName::User)
        .with_delegate(DelegateId::ManaGeneration)
        .with_modifier(stat::MANA_GAIN.add(2));
    let id = arena.add_creature_at(well, Vec2::ZERO);
    assert_eq!(arena.player_stats(PlayerName::User).get(stat::MANA_GAIN), 2);

    let events = arena
        .execute(&Effect::ApplyDamage {
            source: id,
            target: id,
            amount: 1000,
        })
        .unwrap();
    for event in events {
        arena.dispatch(event);
    }
    arena.tick(10);
    assert_eq!(arena.player_stats(PlayerName::User).get(stat::MANA_GAIN), 0);
}

#[test]
fn test_buff_reaches_adjacent_allies_only() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let banner = CreatureData::new("Banner", PlayerName::User).with_skill(
        SkillData::new(SLASH, "Rally", SkillType::NoEffect)
            .with_delegate(DelegateId::ApplyToAdjacentAlliesOnUse)
            .with_targeted_modifier(TargetedModifier::new(stat::ACCURACY.add(10))),
    );
    let b = arena.add_creature(banner, BoardPosition::new(1, 1));
    let near = arena.add_creature(CreatureData::new("Near", PlayerName::User), BoardPosition::new(1, 2));
    let far = arena.add_creature(CreatureData::new("Far", PlayerName::User), BoardPosition::new(3, 3));

    arena.use_skill(b, SLASH);

    let accuracy = |id| arena.creature(id).unwrap().stats.get(stat::ACCURACY);
    assert_eq!(accuracy(near), 110);
    assert_eq!(accuracy(far), 100);
    assert_eq!(accuracy(b), 100);
}

#[test]
#[should_panic(expected = "not supported")]
fn test_targeted_modifier_with_delegate_panics() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let banner = CreatureData::new("Banner", PlayerName::User).with_skill(
        SkillData::new(SLASH, "Rally", SkillType::NoEffect)
            .with_delegate(DelegateId::ApplyToAdjacentAlliesOnUse)
            .with_targeted_modifier(TargetedModifier {
                modifier: stat::ACCURACY.add(10),
                delegate: Some(DelegateId::KnockbackOnHit),
            }),
    );
    let b = arena.add_creature(banner, BoardPosition::new(1, 1));
    arena.add_creature(CreatureData::new("Near", PlayerName::User), BoardPosition::new(1, 2));

    arena.use_skill(b, SLASH);
}

#[test]
fn test_summons_appear_in_front() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let necromancer = CreatureData::new("Necromancer", PlayerName::Enemy).with_skill(
        SkillData::new(SLASH, "Raise", SkillType::NoEffect)
            .with_delegate(DelegateId::SummonMinions)
            .with_summon(CreatureData::new("Skeleton", PlayerName::Enemy)),
    );
    let n = arena.add_creature_at(necromancer, Vec2::new(5.0, 0.0));

    arena.use_skill(n, SLASH);

    let skeleton = arena
        .creatures()
        .find(|c| c.name() == "Skeleton")
        .expect("summon spawned");
    assert_eq!(skeleton.position, Vec2::new(4.0, 0.0));
    assert_eq!(skeleton.owner(), PlayerName::Enemy);
    assert!(skeleton.board.is_none());
}

#[test]
fn test_knockback_on_melee_hit() {
    let mut arena = Arena::new(ScriptedRandom::constant(0.5));
    let attacker = CreatureData::new("Ogre", PlayerName::User)
        .with_modifier(stat::BASE_DAMAGE.set(physical(1)))
        .with_skill(
            deterministic(SkillData::new(SLASH, "Smash", SkillType::Melee))
                .with_delegate(DelegateId::KnockbackOnHit),
        );
    let (a, t) = melee_pair(&mut arena, attacker, target_dummy());

    arena.use_skill(a, SLASH);

    let target = arena.creature(t).unwrap();
    assert!((target.position.x - 1.0).abs() < 1e-5);
    assert!(target.is_stunned(GameTime(299)));
    assert!(!target.is_stunned(GameTime(300)));
}
