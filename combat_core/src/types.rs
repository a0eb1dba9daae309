//! Core identifiers and geometry shared across the rules engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positions and directions in board units
pub use glam::Vec2;

/// Stable integer id for a creature in the entity registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a skill by its base type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillId(pub u32);

/// Game time in milliseconds since the battle started
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GameTime(pub u64);

impl GameTime {
    pub const ZERO: GameTime = GameTime(0);

    /// Offset this time by a (possibly negative) number of milliseconds
    pub fn plus_ms(self, ms: i64) -> GameTime {
        GameTime(self.0.saturating_add_signed(ms))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// The two sides of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerName {
    User,
    Enemy,
}

impl PlayerName {
    /// The opposing side
    pub fn opponent(self) -> PlayerName {
        match self {
            PlayerName::User => PlayerName::Enemy,
            PlayerName::Enemy => PlayerName::User,
        }
    }

    /// Unit direction this side's creatures face along the x axis
    pub fn forward(self) -> Vec2 {
        match self {
            PlayerName::User => Vec2::X,
            PlayerName::Enemy => Vec2::NEG_X,
        }
    }
}

/// Damage categories used by tagged damage stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Untyped,
    Physical,
    Fire,
    Lightning,
    Cold,
    Radiant,
    Necrotic,
}

impl DamageType {
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Untyped,
            DamageType::Physical,
            DamageType::Fire,
            DamageType::Lightning,
            DamageType::Cold,
            DamageType::Radiant,
            DamageType::Necrotic,
        ]
    }
}

/// Influence schools used by card costs and influence stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum School {
    Light,
    Sky,
    Flame,
    Ice,
    Earth,
    Shadow,
}

impl School {
    pub fn all() -> &'static [School] {
        &[
            School::Light,
            School::Sky,
            School::Flame,
            School::Ice,
            School::Earth,
            School::Shadow,
        ]
    }
}

/// How a skill delivers its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    Melee,
    Projectile,
    Area,
    NoEffect,
}

/// Board cell: rank counts columns away from the home edge, file counts rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardPosition {
    pub rank: u8,
    pub file: u8,
}

impl BoardPosition {
    pub fn new(rank: u8, file: u8) -> Self {
        BoardPosition { rank, file }
    }

    /// True for the (up to eight) cells touching this one
    pub fn is_adjacent(&self, other: &BoardPosition) -> bool {
        let dr = (self.rank as i16 - other.rank as i16).abs();
        let df = (self.file as i16 - other.file as i16).abs();
        dr <= 1 && df <= 1 && (dr, df) != (0, 0)
    }

    /// World-space center of this cell
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.rank as f32, self.file as f32)
    }
}

/// Circular hit area used for overlap queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub center: Vec2,
    pub radius: f32,
}

impl Collider {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Collider { center, radius }
    }

    pub fn overlaps(&self, other: &Collider) -> bool {
        self.center.distance(other.center) <= self.radius + other.radius
    }
}
