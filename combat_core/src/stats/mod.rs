//! Stats - value kinds, modifiers, lifetimes and the layered StatTable

mod catalog;
mod compute;
mod id;
mod lifetime;
mod modifier;
mod table;
mod value;

pub use catalog::{
    stat, BoolStat, DamageInts, DamageIntsStat, DamageRanges, DamageRangesStat, DurationStat,
    IntRangeStat, IntStat, NumericKind, NumericStat, PercentageStat, SchoolInts, SchoolIntsStat,
    Stat, TaggedKind, TaggedStat,
};
pub use compute::{fold_bool, fold_numeric, fold_tagged, NumericAccumulator};
pub use id::{StatId, StatKind};
pub use lifetime::{Lifetime, LifetimeOracle};
pub use modifier::{
    KindMismatch, Modifier, ModifierOperation, Operation, Provenance, TaggedOperation,
};
pub use table::StatTable;
pub use value::{
    parse_bool, parse_int, parse_tagged, scale_basis_points, DurationValue, IntRangeValue, NumericValue,
    ParseValueError, PercentageValue, TagName, TaggedValues, BASIS_POINTS_ONE,
};
