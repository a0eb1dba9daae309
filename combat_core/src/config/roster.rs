//! Roster configuration - creatures, skills and their modifiers as authored data

use super::{CombatConstants, ConfigError};
use crate::creature::{CreatureData, SkillData, TargetedModifier};
use crate::delegates::DelegateId;
use crate::stats::{
    parse_bool, parse_int, parse_tagged, DurationValue, IntRangeValue, Lifetime, Modifier,
    ModifierOperation, Operation, ParseValueError, PercentageValue, StatId, StatKind, TagName,
    TaggedOperation,
};
use crate::types::{BoardPosition, GameTime, PlayerName, SkillId, SkillType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Which operation an authored modifier performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    Add,
    Increase,
    Overwrite,
}

/// An authored modifier: `{ stat = "accuracy", operation = "add", value = "10" }`
///
/// `value` is parsed according to the stat's value kind. Increase always takes a
/// percentage (or tagged percentages for tagged stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub stat: StatId,
    #[serde(default)]
    pub operation: OperationKind,
    pub value: String,
    /// Expire this many milliseconds after the battle starts
    #[serde(default)]
    pub duration_ms: Option<i32>,
}

fn operation<V>(
    kind: OperationKind,
    value: &str,
    parse: impl Fn(&str) -> Result<V, ParseValueError>,
) -> Result<Operation<V>, ParseValueError> {
    Ok(match kind {
        OperationKind::Add => Operation::Add(parse(value)?),
        OperationKind::Increase => Operation::Increase(value.parse()?),
        OperationKind::Overwrite => Operation::Overwrite(parse(value)?),
    })
}

fn tagged_operation<K: TagName, V: Copy>(
    kind: OperationKind,
    value: &str,
    parse: impl Fn(&str) -> Result<V, ParseValueError>,
) -> Result<TaggedOperation<K, V>, ParseValueError> {
    Ok(match kind {
        OperationKind::Add => TaggedOperation::Add(parse_tagged(value, parse)?),
        OperationKind::Increase => {
            TaggedOperation::Increase(parse_tagged(value, PercentageValue::from_str)?)
        }
        OperationKind::Overwrite => TaggedOperation::Overwrite(parse_tagged(value, parse)?),
    })
}

impl ModifierConfig {
    pub fn new(stat: StatId, operation: OperationKind, value: impl Into<String>) -> Self {
        ModifierConfig {
            stat,
            operation,
            value: value.into(),
            duration_ms: None,
        }
    }

    /// Build the typed modifier described by this entry
    pub fn to_modifier(&self) -> Result<Modifier, ConfigError> {
        let value = self.value.as_str();
        let kind = self.operation;
        let parsed = match self.stat.kind() {
            StatKind::Bool => {
                if kind != OperationKind::Overwrite {
                    return Err(ConfigError::ValidationError(format!(
                        "{} is a boolean stat and only supports overwrite",
                        self.stat
                    )));
                }
                parse_bool(value).map(ModifierOperation::Bool)
            }
            StatKind::Int => operation(kind, value, parse_int).map(ModifierOperation::Int),
            StatKind::Duration => {
                operation(kind, value, DurationValue::from_str).map(ModifierOperation::Duration)
            }
            StatKind::Percentage => {
                operation(kind, value, PercentageValue::from_str).map(ModifierOperation::Percentage)
            }
            StatKind::IntRange => {
                operation(kind, value, IntRangeValue::from_str).map(ModifierOperation::IntRange)
            }
            StatKind::DamageInts => {
                tagged_operation(kind, value, parse_int).map(ModifierOperation::DamageInts)
            }
            StatKind::DamageRanges => {
                tagged_operation(kind, value, IntRangeValue::from_str)
                    .map(ModifierOperation::DamageRanges)
            }
            StatKind::SchoolInts => {
                tagged_operation(kind, value, parse_int).map(ModifierOperation::SchoolInts)
            }
        };
        let operation = parsed.map_err(|source| ConfigError::InvalidValue {
            stat: self.stat,
            source,
        })?;

        let modifier = Modifier::new(self.stat, operation);
        Ok(match self.duration_ms {
            Some(ms) => modifier.with_lifetime(Lifetime::timed(GameTime::ZERO, ms)),
            None => modifier,
        })
    }
}

fn to_modifiers(configs: &[ModifierConfig]) -> Result<Vec<Modifier>, ConfigError> {
    configs.iter().map(ModifierConfig::to_modifier).collect()
}

/// A modifier a skill applies to other creatures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetedModifierConfig {
    #[serde(flatten)]
    pub modifier: ModifierConfig,
    #[serde(default)]
    pub delegate: Option<DelegateId>,
}

/// Authored skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    pub id: u32,
    pub name: String,
    pub skill_type: SkillType,
    #[serde(default)]
    pub delegates: Vec<DelegateId>,
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
    #[serde(default)]
    pub targeted_modifiers: Vec<TargetedModifierConfig>,
    #[serde(default)]
    pub summons: Vec<CreatureConfig>,
}

/// A duplicated delegate runs its hooks twice
fn warn_duplicate_delegates(owner: &str, delegates: &[DelegateId]) {
    let mut seen = HashSet::new();
    for delegate in delegates {
        if !seen.insert(*delegate) {
            warn!(owner, ?delegate, "delegate listed more than once");
        }
    }
}

impl SkillConfig {
    pub fn to_data(&self) -> Result<SkillData, ConfigError> {
        warn_duplicate_delegates(&self.name, &self.delegates);
        let targeted = self
            .targeted_modifiers
            .iter()
            .map(|t| {
                Ok(TargetedModifier {
                    modifier: t.modifier.to_modifier()?,
                    delegate: t.delegate,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let summons = self
            .summons
            .iter()
            .map(CreatureConfig::to_data)
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(SkillData {
            id: SkillId(self.id),
            name: self.name.clone(),
            skill_type: self.skill_type,
            modifiers: to_modifiers(&self.modifiers)?,
            delegates: self.delegates.clone(),
            targeted_modifiers: targeted,
            summons,
        })
    }
}

/// Board cell a creature starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub rank: u8,
    pub file: u8,
}

impl From<PlacementConfig> for BoardPosition {
    fn from(p: PlacementConfig) -> Self {
        BoardPosition::new(p.rank, p.file)
    }
}

/// Authored creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureConfig {
    pub name: String,
    pub owner: PlayerName,
    /// Starting cell; summons without one appear beside their summoner
    #[serde(default)]
    pub placement: Option<PlacementConfig>,
    #[serde(default)]
    pub delegates: Vec<DelegateId>,
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
    #[serde(default)]
    pub skills: Vec<SkillConfig>,
}

impl CreatureConfig {
    pub fn to_data(&self) -> Result<CreatureData, ConfigError> {
        warn_duplicate_delegates(&self.name, &self.delegates);
        let mut seen = HashSet::new();
        for skill in &self.skills {
            if !seen.insert(skill.id) {
                return Err(ConfigError::ValidationError(format!(
                    "creature '{}' defines skill id {} more than once",
                    self.name, skill.id
                )));
            }
        }

        Ok(CreatureData {
            name: self.name.clone(),
            owner: self.owner,
            modifiers: to_modifiers(&self.modifiers)?,
            delegates: self.delegates.clone(),
            skills: self
                .skills
                .iter()
                .map(SkillConfig::to_data)
                .collect::<Result<Vec<_>, ConfigError>>()?,
        })
    }
}

/// A full battle setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub constants: CombatConstants,
    #[serde(default, rename = "creatures")]
    pub creatures: Vec<CreatureConfig>,
}

impl RosterConfig {
    /// Check the roster for problems serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut cells = HashSet::new();
        for creature in &self.creatures {
            if creature.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "creature name must not be empty".to_string(),
                ));
            }
            let Some(placement) = creature.placement else {
                return Err(ConfigError::ValidationError(format!(
                    "creature '{}' has no placement",
                    creature.name
                )));
            };
            if !cells.insert((placement.rank, placement.file)) {
                return Err(ConfigError::ValidationError(format!(
                    "two creatures share rank {} file {}",
                    placement.rank, placement.file
                )));
            }
        }
        Ok(())
    }

    /// Authored creatures with their starting cells
    pub fn creature_data(&self) -> Result<Vec<(CreatureData, BoardPosition)>, ConfigError> {
        self.validate()?;
        self.creatures
            .iter()
            .map(|c| {
                let placement = c.placement.map(BoardPosition::from).ok_or_else(|| {
                    ConfigError::ValidationError(format!("creature '{}' has no placement", c.name))
                })?;
                Ok((c.to_data()?, placement))
            })
            .collect()
    }
}

/// Load a roster from a TOML file
pub fn load_roster(path: &Path) -> Result<RosterConfig, ConfigError> {
    let roster: RosterConfig = super::load_toml(path)?;
    roster.validate()?;
    Ok(roster)
}

/// Load a roster from a TOML string
pub fn parse_roster(content: &str) -> Result<RosterConfig, ConfigError> {
    let roster: RosterConfig = super::parse_toml(content)?;
    roster.validate()?;
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{stat, StatTable};
    use crate::types::DamageType;

    #[test]
    fn test_parse_roster() {
        let toml = r#"
[constants.hit]
min_chance = 0.2

[[creatures]]
name = "Archer"
owner = "user"
placement = { rank = 1, file = 2 }
delegates = ["multiple_projectiles"]
modifiers = [
    { stat = "health", operation = "overwrite", value = "60" },
    { stat = "base_damage", operation = "overwrite", value = "physical=4-6" },
]

[[creatures.skills]]
id = 1
name = "Arrow"
skill_type = "projectile"
modifiers = [{ stat = "projectile_sequence_count", operation = "overwrite", value = "3" }]

[[creatures]]
name = "Ghoul"
owner = "enemy"
placement = { rank = 8, file = 2 }
"#;

        let roster = parse_roster(toml).unwrap();
        assert!((roster.constants.hit.min_chance - 0.2).abs() < f64::EPSILON);
        assert!((roster.constants.hit.max_chance - 0.95).abs() < f64::EPSILON);

        let creatures = roster.creature_data().unwrap();
        assert_eq!(creatures.len(), 2);
        let (archer, cell) = &creatures[0];
        assert_eq!(*cell, BoardPosition::new(1, 2));
        assert_eq!(archer.delegates, vec![DelegateId::MultipleProjectiles]);
        assert_eq!(archer.skills[0].skill_type, SkillType::Projectile);

        let table = StatTable::new().insert_all(archer.modifiers.iter().cloned());
        assert_eq!(table.get(stat::HEALTH), 60);
        assert_eq!(
            table.get(stat::BASE_DAMAGE).get(DamageType::Physical),
            Some(IntRangeValue::new(4, 6))
        );
    }

    #[test]
    fn test_modifier_kinds() {
        let increase = ModifierConfig::new(StatId::Accuracy, OperationKind::Increase, "20%");
        let table = StatTable::new()
            .insert(stat::ACCURACY.add(100))
            .insert(increase.to_modifier().unwrap());
        assert_eq!(table.get(stat::ACCURACY), 120);

        let flag = ModifierConfig::new(StatId::CanCrit, OperationKind::Overwrite, "true");
        assert!(StatTable::new().insert(flag.to_modifier().unwrap()).get(stat::CAN_CRIT));

        let resist = ModifierConfig::new(StatId::DamageResistance, OperationKind::Add, "fire=15");
        let table = StatTable::new().insert(resist.to_modifier().unwrap());
        assert_eq!(table.get(stat::DAMAGE_RESISTANCE).get(DamageType::Fire), Some(15));
    }

    #[test]
    fn test_timed_modifier() {
        let mut config = ModifierConfig::new(StatId::Evasion, OperationKind::Add, "5");
        config.duration_ms = Some(1500);
        assert_eq!(
            config.to_modifier().unwrap().lifetime,
            Lifetime::Timed { end: GameTime(1500) }
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad = ModifierConfig::new(StatId::CritChance, OperationKind::Add, "lots");
        assert!(matches!(
            bad.to_modifier(),
            Err(ConfigError::InvalidValue { stat: StatId::CritChance, .. })
        ));

        let bool_add = ModifierConfig::new(StatId::CanStun, OperationKind::Add, "true");
        assert!(matches!(bool_add.to_modifier(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation() {
        let overlapping = r#"
[[creatures]]
name = "A"
owner = "user"
placement = { rank = 0, file = 0 }

[[creatures]]
name = "B"
owner = "user"
placement = { rank = 0, file = 0 }
"#;
        assert!(matches!(
            parse_roster(overlapping),
            Err(ConfigError::ValidationError(_))
        ));

        let duplicate_skill = CreatureConfig {
            name: "C".to_string(),
            owner: PlayerName::User,
            placement: None,
            delegates: vec![],
            modifiers: vec![],
            skills: vec![
                SkillConfig {
                    id: 1,
                    name: "x".to_string(),
                    skill_type: SkillType::Melee,
                    delegates: vec![],
                    modifiers: vec![],
                    targeted_modifiers: vec![],
                    summons: vec![],
                };
                2
            ],
        };
        assert!(duplicate_skill.to_data().is_err());
    }

    #[test]
    fn test_unknown_stat_is_parse_error() {
        let toml = r#"
[[creatures]]
name = "A"
owner = "user"
placement = { rank = 0, file = 0 }
modifiers = [{ stat = "mana_regen_forever", value = "1" }]
"#;
        assert!(matches!(parse_roster(toml), Err(ConfigError::ParseError(_))));
    }
}
