//! Stat value kinds - ints, durations, percentages, ranges and tagged maps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Basis points meaning "no change" (100%)
pub const BASIS_POINTS_ONE: i64 = 10_000;

/// Error parsing an authored value string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseValueError {
    #[error("invalid integer '{0}'")]
    InvalidInt(String),
    #[error("invalid percentage '{0}' (expected e.g. '25%')")]
    InvalidPercentage(String),
    #[error("invalid duration '{0}' (expected e.g. '1500ms' or '1.5s')")]
    InvalidDuration(String),
    #[error("invalid range '{0}' (expected e.g. '10-20')")]
    InvalidRange(String),
    #[error("invalid boolean '{0}'")]
    InvalidBool(String),
    #[error("invalid tagged value '{0}' (expected e.g. 'physical=10')")]
    InvalidTagged(String),
    #[error("unknown tag '{0}'")]
    UnknownTag(String),
}

/// Values that fold through the Overwrite -> Add -> Increase pipeline
pub trait NumericValue: Copy + Default + PartialEq + fmt::Debug {
    /// Sum two values of the same kind
    fn plus(self, other: Self) -> Self;

    /// Scale by a basis-point multiplier, rounding to the nearest integer
    fn scaled(self, basis_points: i64) -> Self;
}

/// Round `value * basis_points / 10000` to the nearest integer
pub fn scale_basis_points(value: i32, basis_points: i64) -> i32 {
    let scaled = (value as i64 * basis_points) as f64 / BASIS_POINTS_ONE as f64;
    scaled.round() as i32
}

impl NumericValue for i32 {
    fn plus(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    fn scaled(self, basis_points: i64) -> Self {
        scale_basis_points(self, basis_points)
    }
}

/// A span of game time in milliseconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DurationValue {
    pub millis: i32,
}

impl DurationValue {
    pub fn from_millis(millis: i32) -> Self {
        DurationValue { millis }
    }

    pub fn from_seconds(seconds: f32) -> Self {
        DurationValue {
            millis: (seconds * 1000.0).round() as i32,
        }
    }

    pub fn as_seconds(&self) -> f32 {
        self.millis as f32 / 1000.0
    }
}

impl NumericValue for DurationValue {
    fn plus(self, other: Self) -> Self {
        DurationValue::from_millis(self.millis.saturating_add(other.millis))
    }

    fn scaled(self, basis_points: i64) -> Self {
        DurationValue::from_millis(scale_basis_points(self.millis, basis_points))
    }
}

impl FromStr for DurationValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseValueError::InvalidDuration(s.to_string());
        if let Some(ms) = trimmed.strip_suffix("ms") {
            ms.trim().parse::<i32>().map(DurationValue::from_millis).map_err(|_| err())
        } else if let Some(secs) = trimmed.strip_suffix('s') {
            secs.trim().parse::<f32>().map(DurationValue::from_seconds).map_err(|_| err())
        } else {
            trimmed.parse::<i32>().map(DurationValue::from_millis).map_err(|_| err())
        }
    }
}

/// A percentage stored in basis points (10000 = 100%)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PercentageValue {
    pub basis_points: i32,
}

impl PercentageValue {
    pub const HUNDRED: PercentageValue = PercentageValue {
        basis_points: BASIS_POINTS_ONE as i32,
    };

    pub fn from_basis_points(basis_points: i32) -> Self {
        PercentageValue { basis_points }
    }

    pub fn from_percent(percent: f64) -> Self {
        PercentageValue {
            basis_points: (percent * 100.0).round() as i32,
        }
    }

    /// This percentage as a fractional multiplier (25% -> 0.25)
    pub fn as_multiplier(&self) -> f64 {
        self.basis_points as f64 / BASIS_POINTS_ONE as f64
    }

    /// This percentage of `value`, rounded to the nearest integer
    pub fn calculate_fraction(&self, value: i32) -> i32 {
        scale_basis_points(value, self.basis_points as i64)
    }
}

impl NumericValue for PercentageValue {
    fn plus(self, other: Self) -> Self {
        PercentageValue::from_basis_points(self.basis_points.saturating_add(other.basis_points))
    }

    fn scaled(self, basis_points: i64) -> Self {
        PercentageValue::from_basis_points(scale_basis_points(self.basis_points, basis_points))
    }
}

impl FromStr for PercentageValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim().trim_end_matches('%').trim();
        number
            .parse::<f64>()
            .map(PercentageValue::from_percent)
            .map_err(|_| ParseValueError::InvalidPercentage(s.to_string()))
    }
}

impl fmt::Display for PercentageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.basis_points as f64 / 100.0)
    }
}

/// Inclusive integer range, e.g. a damage roll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRangeValue {
    pub low: i32,
    pub high: i32,
}

impl IntRangeValue {
    pub fn new(low: i32, high: i32) -> Self {
        IntRangeValue { low, high }
    }

    /// A range whose only value is `value`
    pub fn fixed(value: i32) -> Self {
        IntRangeValue::new(value, value)
    }
}

impl NumericValue for IntRangeValue {
    fn plus(self, other: Self) -> Self {
        IntRangeValue::new(
            self.low.saturating_add(other.low),
            self.high.saturating_add(other.high),
        )
    }

    fn scaled(self, basis_points: i64) -> Self {
        IntRangeValue::new(
            scale_basis_points(self.low, basis_points),
            scale_basis_points(self.high, basis_points),
        )
    }
}

impl FromStr for IntRangeValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::InvalidRange(s.to_string());
        let trimmed = s.trim();
        // Skip a leading sign so "-5" parses as a fixed negative value
        let split = trimmed
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(i, _)| i);
        match split {
            Some(i) => {
                let low = trimmed[..i].trim().parse::<i32>().map_err(|_| err())?;
                let high = trimmed[i + 1..].trim().parse::<i32>().map_err(|_| err())?;
                Ok(IntRangeValue::new(low, high))
            }
            None => trimmed.parse::<i32>().map(IntRangeValue::fixed).map_err(|_| err()),
        }
    }
}

/// Per-tag values, e.g. damage by damage type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Ord + Serialize, V: Serialize",
    deserialize = "K: Ord + Deserialize<'de>, V: Deserialize<'de>"
))]
pub struct TaggedValues<K: Ord, V> {
    pub values: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for TaggedValues<K, V> {
    fn default() -> Self {
        TaggedValues {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, V: Copy> TaggedValues<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(tag: K, value: V) -> Self {
        Self::default().with(tag, value)
    }

    /// Builder-style insert
    pub fn with(mut self, tag: K, value: V) -> Self {
        self.values.insert(tag, value);
        self
    }

    pub fn get(&self, tag: K) -> Option<V> {
        self.values.get(&tag).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply `f` to every value, keeping tags
    pub fn map_values<W: Copy>(&self, mut f: impl FnMut(K, V) -> W) -> TaggedValues<K, W> {
        TaggedValues {
            values: self.values.iter().map(|(k, v)| (*k, f(*k, *v))).collect(),
        }
    }
}

impl<K: Ord + Copy, V: NumericValue> TaggedValues<K, V> {
    /// Per-tag sum; tags missing on one side count as zero
    pub fn plus(&self, other: &TaggedValues<K, V>) -> TaggedValues<K, V> {
        let mut values = self.values.clone();
        for (tag, value) in other.iter() {
            let entry = values.entry(tag).or_default();
            *entry = entry.plus(value);
        }
        TaggedValues { values }
    }
}

impl<K: Ord + Copy> TaggedValues<K, i32> {
    /// Sum across all tags
    pub fn total(&self) -> i32 {
        self.values.values().fold(0i32, |acc, v| acc.saturating_add(*v))
    }
}

/// Tags that can appear in authored tagged values
pub trait TagName: Sized + Copy + Ord {
    fn parse_tag(name: &str) -> Option<Self>;
}

impl TagName for crate::types::DamageType {
    fn parse_tag(name: &str) -> Option<Self> {
        use crate::types::DamageType;
        DamageType::all()
            .iter()
            .copied()
            .find(|t| format!("{:?}", t).eq_ignore_ascii_case(name))
    }
}

impl TagName for crate::types::School {
    fn parse_tag(name: &str) -> Option<Self> {
        use crate::types::School;
        School::all()
            .iter()
            .copied()
            .find(|t| format!("{:?}", t).eq_ignore_ascii_case(name))
    }
}

/// Parse `"physical=10-20, fire=5"` with `parse_value` for each value
pub fn parse_tagged<K: TagName, V: Copy>(
    s: &str,
    parse_value: impl Fn(&str) -> Result<V, ParseValueError>,
) -> Result<TaggedValues<K, V>, ParseValueError> {
    let mut values = BTreeMap::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (tag, value) = part
            .split_once('=')
            .ok_or_else(|| ParseValueError::InvalidTagged(part.to_string()))?;
        let tag = K::parse_tag(tag.trim())
            .ok_or_else(|| ParseValueError::UnknownTag(tag.trim().to_string()))?;
        values.insert(tag, parse_value(value.trim())?);
    }
    Ok(TaggedValues { values })
}

impl<K: TagName, V: FromStr<Err = ParseValueError> + Copy> FromStr for TaggedValues<K, V> {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tagged(s, str::parse::<V>)
    }
}

/// Parse an authored integer
pub fn parse_int(s: &str) -> Result<i32, ParseValueError> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| ParseValueError::InvalidInt(s.to_string()))
}

/// Parse an authored boolean
pub fn parse_bool(s: &str) -> Result<bool, ParseValueError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(ParseValueError::InvalidBool(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DamageType;

    #[test]
    fn test_percentage_fraction_rounds_to_nearest() {
        let pct = PercentageValue::from_percent(25.0);
        assert_eq!(pct.calculate_fraction(10), 3); // 2.5 rounds away from zero
        assert_eq!(pct.calculate_fraction(8), 2);
        assert!((pct.as_multiplier() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!("25%".parse::<PercentageValue>().unwrap().basis_points, 2500);
        assert_eq!("1.5s".parse::<DurationValue>().unwrap().millis, 1500);
        assert_eq!("200ms".parse::<DurationValue>().unwrap().millis, 200);
        assert_eq!(
            "10-20".parse::<IntRangeValue>().unwrap(),
            IntRangeValue::new(10, 20)
        );
        assert_eq!("-5".parse::<IntRangeValue>().unwrap(), IntRangeValue::fixed(-5));
        assert!(parse_bool("true").unwrap());
        assert!(parse_int("ten").is_err());
    }

    #[test]
    fn test_parse_tagged() {
        let tagged: TaggedValues<DamageType, IntRangeValue> =
            "physical=10-20, fire=5".parse().unwrap();
        assert_eq!(tagged.get(DamageType::Physical), Some(IntRangeValue::new(10, 20)));
        assert_eq!(tagged.get(DamageType::Fire), Some(IntRangeValue::fixed(5)));

        let ints: TaggedValues<DamageType, i32> = parse_tagged("cold=3", parse_int).unwrap();
        assert_eq!(ints.get(DamageType::Cold), Some(3));

        let bad = parse_tagged::<DamageType, i32>("void=3", parse_int);
        assert_eq!(bad, Err(ParseValueError::UnknownTag("void".to_string())));
    }

    #[test]
    fn test_tagged_plus_and_total() {
        let a = TaggedValues::single(DamageType::Physical, 4).with(DamageType::Fire, 1);
        let b = TaggedValues::single(DamageType::Physical, 2);
        let sum = a.plus(&b);
        assert_eq!(sum.get(DamageType::Physical), Some(6));
        assert_eq!(sum.total(), 7);
    }
}
