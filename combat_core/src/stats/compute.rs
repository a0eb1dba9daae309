//! Folding a stat's modifiers into a value (Overwrite -> Add -> Increase)

use super::modifier::{Operation, TaggedOperation};
use super::value::{NumericValue, TaggedValues, BASIS_POINTS_ONE};
use std::collections::BTreeMap;

/// Accumulates one stat's operations before producing a value
///
/// Final value is calculated as:
/// `(last_overwrite.unwrap_or(zero) + Σ add) × (10000 + Σ increase_bp) / 10000`
#[derive(Debug, Clone)]
pub struct NumericAccumulator<V> {
    /// Most recently inserted Overwrite, if any
    pub overwrite: Option<V>,
    /// Sum of all Add operations
    pub added: V,
    /// Sum of all Increase operations, in basis points
    pub increase_basis_points: i64,
}

impl<V: NumericValue> Default for NumericAccumulator<V> {
    fn default() -> Self {
        NumericAccumulator {
            overwrite: None,
            added: V::default(),
            increase_basis_points: 0,
        }
    }
}

impl<V: NumericValue> NumericAccumulator<V> {
    pub fn apply(&mut self, operation: &Operation<V>) {
        match operation {
            Operation::Add(value) => self.added = self.added.plus(*value),
            Operation::Increase(pct) => self.increase_basis_points += pct.basis_points as i64,
            Operation::Overwrite(value) => self.overwrite = Some(*value),
        }
    }

    pub fn compute(&self) -> V {
        let base = self.overwrite.unwrap_or_default().plus(self.added);
        base.scaled(BASIS_POINTS_ONE + self.increase_basis_points)
    }
}

/// Fold numeric operations given in insertion order
pub fn fold_numeric<'a, V: NumericValue + 'a>(
    operations: impl IntoIterator<Item = &'a Operation<V>>,
) -> V {
    let mut acc = NumericAccumulator::default();
    for operation in operations {
        acc.apply(operation);
    }
    acc.compute()
}

/// Fold tagged operations given in insertion order
///
/// The last Overwrite supplies the whole seed map; Add and Increase apply per tag.
/// An Increase for a tag with no value leaves that tag absent.
pub fn fold_tagged<'a, K, V>(
    operations: impl IntoIterator<Item = &'a TaggedOperation<K, V>>,
) -> TaggedValues<K, V>
where
    K: Ord + Copy + 'a,
    V: NumericValue + 'a,
{
    let mut seed: Option<&TaggedValues<K, V>> = None;
    let mut added = TaggedValues::new();
    let mut increases: BTreeMap<K, i64> = BTreeMap::new();

    for operation in operations {
        match operation {
            TaggedOperation::Overwrite(values) => seed = Some(values),
            TaggedOperation::Add(values) => added = added.plus(values),
            TaggedOperation::Increase(percentages) => {
                for (tag, pct) in percentages.iter() {
                    *increases.entry(tag).or_insert(0) += pct.basis_points as i64;
                }
            }
        }
    }

    let base = match seed {
        Some(values) => values.plus(&added),
        None => added,
    };
    base.map_values(|tag, value| {
        let bp = increases.get(&tag).copied().unwrap_or(0);
        value.scaled(BASIS_POINTS_ONE + bp)
    })
}

/// Booleans take the last overwrite, defaulting to false
pub fn fold_bool<'a>(values: impl IntoIterator<Item = &'a bool>) -> bool {
    values.into_iter().last().copied().unwrap_or(false)
}
