//! Modifiers - an operation on one stat, with a lifetime and a provenance

use super::id::{StatId, StatKind};
use super::lifetime::Lifetime;
use super::value::{DurationValue, IntRangeValue, PercentageValue, TaggedValues};
use crate::types::{DamageType, EntityId, School};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operation on a numeric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation<V> {
    Add(V),
    Increase(PercentageValue),
    Overwrite(V),
}

/// Operation on a tagged map; Add and Increase apply per tag, Overwrite replaces the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggedOperation<K: Ord, V> {
    Add(TaggedValues<K, V>),
    Increase(TaggedValues<K, PercentageValue>),
    Overwrite(TaggedValues<K, V>),
}

/// A typed operation for any stat kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOperation {
    Int(Operation<i32>),
    /// Booleans only support overwrite
    Bool(bool),
    Duration(Operation<DurationValue>),
    Percentage(Operation<PercentageValue>),
    IntRange(Operation<IntRangeValue>),
    DamageInts(TaggedOperation<DamageType, i32>),
    DamageRanges(TaggedOperation<DamageType, IntRangeValue>),
    SchoolInts(TaggedOperation<School, i32>),
}

impl ModifierOperation {
    /// The stat kind this operation can be applied to
    pub fn kind(&self) -> StatKind {
        match self {
            ModifierOperation::Int(_) => StatKind::Int,
            ModifierOperation::Bool(_) => StatKind::Bool,
            ModifierOperation::Duration(_) => StatKind::Duration,
            ModifierOperation::Percentage(_) => StatKind::Percentage,
            ModifierOperation::IntRange(_) => StatKind::IntRange,
            ModifierOperation::DamageInts(_) => StatKind::DamageInts,
            ModifierOperation::DamageRanges(_) => StatKind::DamageRanges,
            ModifierOperation::SchoolInts(_) => StatKind::SchoolInts,
        }
    }
}

/// Where a modifier came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Game-wide defaults at the root of every table
    Defaults,
    /// The creature or skill base type
    #[default]
    BaseType,
    /// An equipped item or affix
    Item { name: String },
    /// A status effect, buff or curse
    StatusEffect { name: String },
    /// Produced by a creature's delegate at runtime
    Creature { source: EntityId },
}

/// A modifier whose operation cannot apply to its stat
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{found:?} operation does not match value kind {expected:?} of stat {stat}")]
pub struct KindMismatch {
    pub stat: StatId,
    pub expected: StatKind,
    pub found: StatKind,
}

/// One operation on one stat
///
/// Modifiers are immutable; tables only add and remove whole modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModifier")]
pub struct Modifier {
    pub stat: StatId,
    pub operation: ModifierOperation,
    #[serde(default)]
    pub lifetime: Lifetime,
    #[serde(default)]
    pub provenance: Provenance,
}

/// Deserialized form of [`Modifier`] before its kind is checked
#[derive(Deserialize)]
struct RawModifier {
    stat: StatId,
    operation: ModifierOperation,
    #[serde(default)]
    lifetime: Lifetime,
    #[serde(default)]
    provenance: Provenance,
}

impl TryFrom<RawModifier> for Modifier {
    type Error = KindMismatch;

    fn try_from(raw: RawModifier) -> Result<Self, Self::Error> {
        let modifier = Modifier::checked(raw.stat, raw.operation)?;
        Ok(modifier
            .with_lifetime(raw.lifetime)
            .with_provenance(raw.provenance))
    }
}

impl Modifier {
    /// Create a permanent base-type modifier
    ///
    /// Panics when the operation's kind does not match the stat's value kind,
    /// which indicates malformed authored data.
    pub fn new(stat: StatId, operation: ModifierOperation) -> Self {
        match Modifier::checked(stat, operation) {
            Ok(modifier) => modifier,
            Err(err) => panic!("operation kind does not match: {}", err),
        }
    }

    /// Create a permanent base-type modifier, rejecting a kind mismatch
    pub fn checked(stat: StatId, operation: ModifierOperation) -> Result<Self, KindMismatch> {
        if stat.kind() != operation.kind() {
            return Err(KindMismatch {
                stat,
                expected: stat.kind(),
                found: operation.kind(),
            });
        }
        Ok(Modifier {
            stat,
            operation,
            lifetime: Lifetime::Permanent,
            provenance: Provenance::BaseType,
        })
    }

    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn is_permanent(&self) -> bool {
        self.lifetime.is_permanent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameTime;

    #[test]
    fn test_builder() {
        let modifier = Modifier::new(StatId::Accuracy, ModifierOperation::Int(Operation::Add(5)))
            .with_lifetime(Lifetime::Timed { end: GameTime(100) })
            .with_provenance(Provenance::StatusEffect {
                name: "focus".to_string(),
            });
        assert!(!modifier.is_permanent());
        assert_eq!(modifier.stat, StatId::Accuracy);
    }

    #[test]
    #[should_panic(expected = "operation kind does not match")]
    fn test_kind_mismatch_panics() {
        Modifier::new(StatId::CanCrit, ModifierOperation::Int(Operation::Add(1)));
    }

    #[test]
    fn test_serializes_as_plain_data() {
        let modifier = Modifier::new(StatId::CanStun, ModifierOperation::Bool(true));
        let json = serde_json::to_string(&modifier).unwrap();
        let back: Modifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, modifier);
    }

    #[test]
    fn test_deserialize_rejects_kind_mismatch() {
        let json = r#"{"stat":"can_crit","operation":{"int":{"add":1}}}"#;
        let err = serde_json::from_str::<Modifier>(json).unwrap_err();
        assert!(err.to_string().contains("CanCrit"), "{}", err);

        let ok = r#"{"stat":"accuracy","operation":{"int":{"add":1}}}"#;
        let modifier: Modifier = serde_json::from_str(ok).unwrap();
        assert!(modifier.is_permanent());
        assert_eq!(modifier.provenance, Provenance::BaseType);
    }

    #[test]
    fn test_checked_reports_kinds() {
        let err = Modifier::checked(StatId::Health, ModifierOperation::Bool(true)).unwrap_err();
        assert_eq!(err.expected, StatKind::Int);
        assert_eq!(err.found, StatKind::Bool);
    }
}
