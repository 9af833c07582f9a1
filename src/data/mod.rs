pub mod items;
pub mod monsters;

use std::fmt;

use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

pub const GRID_WIDTH: i32 = 10;
pub const GRID_HEIGHT: i32 = 10;
pub const INVENTORY_CAPACITY: usize = 3;
pub const STARTING_SCORE: i32 = 100;

pub const HERO_START: Point = Point { x: 1, y: 1 };
pub const HERO_HITPOINTS: i32 = 10;
pub const HERO_POWER: i32 = 1;
pub const POISON_DAMAGE: i32 = 1;

/// Chance (percent) that an attack lands on a hero wearing armor.
pub const ARMOR_PASS_CHANCE: i32 = 50;

/// Identifier of a level, the file stem of its room file (`room0`, `room1`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pairs a key with the doors it opens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub String);

impl KeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeroStatus {
    #[default]
    Normal,
    Poisoned,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
            Direction::Right => Point::new(1, 0),
        }
    }
}

pub fn in_grid(point: Point) -> bool {
    point.x >= 0 && point.x < GRID_WIDTH && point.y >= 0 && point.y < GRID_HEIGHT
}

/// Off-grid cell where the item in inventory slot `slot` is drawn.
pub fn inventory_slot_point(slot: usize) -> Point {
    Point::new(GRID_WIDTH - 1 - slot as i32, GRID_HEIGHT)
}
