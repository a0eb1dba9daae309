//! Delegates that act on allies, the owning player, or the board

use super::context::{CreatureContext, SkillContext};
use super::on_hit::timed_targeted_modifiers;
use super::Delegate;
use crate::effect::{Effect, Results};
use crate::stats::{stat, Lifetime, Provenance};
use tracing::debug;

/// On use, buffs allies on adjacent board cells for BuffDuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyToAdjacentAlliesOnUse;

impl Delegate for ApplyToAdjacentAlliesOnUse {
    fn name(&self) -> &'static str {
        "apply_to_adjacent_allies_on_use"
    }

    fn on_skill_used(&self, c: &SkillContext<'_>, results: &mut Results) {
        let Some(board) = c.creature().board else {
            debug!(creature = %c.id(), "creature is not on the board, no adjacent allies");
            return;
        };
        let modifiers = timed_targeted_modifiers(c, c.get(stat::BUFF_DURATION));
        for ally in c.world().adjacent_creatures(board, c.owner()) {
            for modifier in &modifiers {
                results.push(Effect::ApplyModifier {
                    target: ally,
                    modifier: modifier.clone(),
                });
            }
        }
    }
}

/// While alive, adds the creature's ManaGain to its owner
#[derive(Debug, Clone, Copy, Default)]
pub struct ManaGeneration;

impl Delegate for ManaGeneration {
    fn name(&self) -> &'static str {
        "mana_generation"
    }

    fn on_activate(&self, c: &CreatureContext<'_>, results: &mut Results) {
        results.push(Effect::ApplyModifierToOwner {
            owner: c.owner(),
            modifier: stat::MANA_GAIN
                .add(c.get(stat::MANA_GAIN))
                .with_lifetime(Lifetime::WhileAlive { entity: c.id() })
                .with_provenance(Provenance::Creature { source: c.id() }),
        });
    }
}

/// While alive, adds the creature's Influence to its owner
#[derive(Debug, Clone, Copy, Default)]
pub struct InfluenceAdded;

impl Delegate for InfluenceAdded {
    fn name(&self) -> &'static str {
        "influence_added"
    }

    fn on_activate(&self, c: &CreatureContext<'_>, results: &mut Results) {
        results.push(Effect::ApplyModifierToOwner {
            owner: c.owner(),
            modifier: stat::INFLUENCE
                .add(c.get(stat::INFLUENCE))
                .with_lifetime(Lifetime::WhileAlive { entity: c.id() })
                .with_provenance(Provenance::Creature { source: c.id() }),
        });
    }
}

/// On use, creates each of the skill's summons next to the caster
#[derive(Debug, Clone, Copy, Default)]
pub struct SummonMinions;

impl Delegate for SummonMinions {
    fn name(&self) -> &'static str {
        "summon_minions"
    }

    fn on_skill_used(&self, c: &SkillContext<'_>, results: &mut Results) {
        let creature = c.creature();
        for summon in &c.skill().summons {
            results.push(Effect::CreateCreature {
                data: summon.clone(),
                position: creature.position + c.owner().forward(),
                board: None,
            });
        }
    }
}
