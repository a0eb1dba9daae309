//! StatTable - immutable, layered modifier storage
//!
//! A table holds its own modifiers plus an optional parent table (entity → item →
//! base type → game defaults). Every insert or prune returns a new table; existing
//! tables are never mutated, so readers always see a consistent snapshot.

use super::catalog::Stat;
use super::id::StatId;
use super::lifetime::LifetimeOracle;
use super::modifier::{Modifier, ModifierOperation};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion order across both static and dynamic storage
    sequence: u64,
    modifier: Modifier,
}

type ModifierMap = BTreeMap<StatId, Vec<Entry>>;

/// Layered, copy-on-write collection of modifiers
#[derive(Debug, Clone, Default)]
pub struct StatTable {
    parent: Option<Arc<StatTable>>,
    /// Permanent modifiers; never lifetime-checked
    static_modifiers: Arc<ModifierMap>,
    /// Timed and while-alive modifiers; re-checked by [`StatTable::prune`]
    dynamic_modifiers: Arc<ModifierMap>,
    next_sequence: u64,
}

impl StatTable {
    /// Create an empty root table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table layered over `parent`
    pub fn with_parent(parent: StatTable) -> Self {
        StatTable {
            parent: Some(Arc::new(parent)),
            ..Self::default()
        }
    }

    /// This table's own modifiers re-layered over a different parent
    pub fn reparented(&self, parent: StatTable) -> Self {
        StatTable {
            parent: Some(Arc::new(parent)),
            ..self.clone()
        }
    }

    pub fn parent(&self) -> Option<&StatTable> {
        self.parent.as_deref()
    }

    /// Return a new table with `modifier` added
    pub fn insert(&self, modifier: Modifier) -> Self {
        let mut next = self.clone();
        next.push(modifier);
        next
    }

    /// Return a new table with every modifier in `modifiers` added in order
    pub fn insert_all(&self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        let mut next = self.clone();
        for modifier in modifiers {
            next.push(modifier);
        }
        next
    }

    fn push(&mut self, modifier: Modifier) {
        let entry = Entry {
            sequence: self.next_sequence,
            modifier,
        };
        self.next_sequence += 1;
        let storage = if entry.modifier.is_permanent() {
            Arc::make_mut(&mut self.static_modifiers)
        } else {
            Arc::make_mut(&mut self.dynamic_modifiers)
        };
        storage.entry(entry.modifier.stat).or_default().push(entry);
    }

    /// Compute the current value of `stat`
    pub fn get<S: Stat>(&self, stat: S) -> S::Value {
        let modifiers = self.modifiers_for(stat.id());
        stat.compute(modifiers.into_iter().map(|m| &m.operation))
    }

    /// All modifiers for `stat` in evaluation order: parent layers first, then
    /// this table's modifiers in insertion order
    pub fn modifiers_for(&self, stat: StatId) -> Vec<&Modifier> {
        let mut result = match &self.parent {
            Some(parent) => parent.modifiers_for(stat),
            None => Vec::new(),
        };

        let statics = self.static_modifiers.get(&stat).map(Vec::as_slice).unwrap_or(&[]);
        let dynamics = self.dynamic_modifiers.get(&stat).map(Vec::as_slice).unwrap_or(&[]);
        let mut local: Vec<&Entry> = statics.iter().chain(dynamics.iter()).collect();
        local.sort_by_key(|entry| entry.sequence);
        result.extend(local.into_iter().map(|entry| &entry.modifier));
        result
    }

    /// Raw operations for `stat` in evaluation order
    pub fn operations_for(&self, stat: StatId) -> Vec<&ModifierOperation> {
        self.modifiers_for(stat)
            .into_iter()
            .map(|m| &m.operation)
            .collect()
    }

    /// Return a new table without dynamic modifiers whose lifetime has ended
    ///
    /// Permanent modifiers are never evaluated. Parent layers are pruned too.
    pub fn prune(&self, oracle: &dyn LifetimeOracle) -> Self {
        let parent = self
            .parent
            .as_ref()
            .map(|parent| Arc::new(parent.prune(oracle)));

        let expired = self
            .dynamic_modifiers
            .values()
            .flatten()
            .filter(|entry| !entry.modifier.lifetime.is_valid(oracle))
            .count();

        let dynamic_modifiers = if expired == 0 {
            Arc::clone(&self.dynamic_modifiers)
        } else {
            trace!(expired, "pruning expired modifiers");
            let kept: ModifierMap = self
                .dynamic_modifiers
                .iter()
                .filter_map(|(stat, entries)| {
                    let live: Vec<Entry> = entries
                        .iter()
                        .filter(|entry| entry.modifier.lifetime.is_valid(oracle))
                        .cloned()
                        .collect();
                    (!live.is_empty()).then_some((*stat, live))
                })
                .collect();
            Arc::new(kept)
        };

        StatTable {
            parent,
            static_modifiers: Arc::clone(&self.static_modifiers),
            dynamic_modifiers,
            next_sequence: self.next_sequence,
        }
    }

    /// Number of modifiers stored locally (excluding parents)
    pub fn len(&self) -> usize {
        self.static_len() + self.dynamic_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn static_len(&self) -> usize {
        self.static_modifiers.values().map(Vec::len).sum()
    }

    pub fn dynamic_len(&self) -> usize {
        self.dynamic_modifiers.values().map(Vec::len).sum()
    }
}
