//! Per-kind opponent behaviour.
//!
//! Each turn an opponent first advances its state, then turns the resulting
//! state into a [`Plan`], which the engine hands to the movement resolver.
//! Attack rolls live here as well since they are part of what a kind does.

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use smallvec::SmallVec;

use crate::{
    data::{Direction, items::ItemKind, monsters::OpponentKind},
    ecs::resources::MovementContext,
    rng::Dice,
};

pub const BAT_PURSUE_CHANCE: i32 = 50;
pub const BAT_LEECH_CHANCE: i32 = 50;
pub const BAT_LEECH: i32 = 1;
pub const THUG_HIT_CHANCE: i32 = 30;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkeletonState {
    Idle,
    Pursuing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThiefState {
    Stealthing,
    Pursuing,
    Fleeing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    Bat,
    Scorpio,
    Thug,
    Skeleton(SkeletonState),
    Thief {
        state: ThiefState,
        loot: Option<ItemKind>,
    },
}

impl Behavior {
    pub fn for_kind(kind: OpponentKind) -> Self {
        match kind {
            OpponentKind::Bat => Behavior::Bat,
            OpponentKind::Scorpio => Behavior::Scorpio,
            OpponentKind::Thug => Behavior::Thug,
            OpponentKind::Skeleton => Behavior::Skeleton(SkeletonState::Idle),
            OpponentKind::Thief => Behavior::Thief {
                state: ThiefState::Stealthing,
                loot: None,
            },
        }
    }
}

/// What the opponent knows about the world when deciding.
#[derive(Clone, Debug)]
pub struct BehaviorContext {
    pub hero_has_items: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    Hold,
    Pursue,
    Step(Direction),
    /// Relocate to a random cell away from the hero, without interacting.
    Flee,
}

pub fn advance(behavior: &mut Behavior, ctx: &BehaviorContext, dice: &mut dyn Dice) -> Plan {
    match behavior {
        Behavior::Bat => {
            if dice.chance(BAT_PURSUE_CHANCE) {
                Plan::Pursue
            } else {
                Plan::Step(Direction::ALL[dice.pick(Direction::ALL.len())])
            }
        }
        Behavior::Scorpio | Behavior::Thug => Plan::Pursue,
        Behavior::Skeleton(state) => {
            *state = match *state {
                SkeletonState::Idle => SkeletonState::Pursuing,
                SkeletonState::Pursuing => SkeletonState::Idle,
            };
            match *state {
                SkeletonState::Pursuing => Plan::Pursue,
                SkeletonState::Idle => Plan::Hold,
            }
        }
        Behavior::Thief { state, loot } => {
            match *state {
                ThiefState::Stealthing if ctx.hero_has_items => *state = ThiefState::Pursuing,
                ThiefState::Pursuing if loot.is_some() => *state = ThiefState::Fleeing,
                _ => {}
            }
            match *state {
                ThiefState::Pursuing => Plan::Pursue,
                ThiefState::Stealthing | ThiefState::Fleeing => Plan::Flee,
            }
        }
    }
}

/// Outcome of one attack roll against the hero.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Strike {
    pub damage: i32,
    /// Hitpoints the attacker regains.
    pub leech: i32,
    pub poisons: bool,
}

pub fn strike(kind: OpponentKind, power: i32, dice: &mut dyn Dice) -> Strike {
    match kind {
        OpponentKind::Bat => {
            if dice.chance(BAT_LEECH_CHANCE) {
                Strike {
                    damage: power,
                    leech: BAT_LEECH,
                    poisons: false,
                }
            } else {
                Strike::default()
            }
        }
        OpponentKind::Thug => Strike {
            damage: if dice.chance(THUG_HIT_CHANCE) { power } else { 0 },
            ..Strike::default()
        },
        OpponentKind::Scorpio => Strike {
            damage: power,
            leech: 0,
            poisons: true,
        },
        OpponentKind::Skeleton => Strike {
            damage: power,
            ..Strike::default()
        },
        OpponentKind::Thief => Strike::default(),
    }
}

/// Unit step toward `to`. The larger axis wins; ties step vertically.
pub fn toward(from: Point, to: Point) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > dy.abs() {
        Point::new(dx.signum(), 0)
    } else {
        Point::new(0, dy.signum())
    }
}

pub fn neighbours(point: Point) -> SmallVec<[Point; 4]> {
    Direction::ALL
        .iter()
        .map(|dir| {
            let delta = dir.delta();
            Point::new(point.x + delta.x, point.y + delta.y)
        })
        .collect()
}

pub fn adjacent(a: Point, b: Point) -> bool {
    DistanceAlg::Manhattan.distance2d(a, b) <= 1.0
}

/// Cells a fleeing opponent at `origin` may relocate to.
pub fn flee_cells(origin: Point, movement: &MovementContext) -> SmallVec<[Point; 4]> {
    neighbours(origin)
        .into_iter()
        .filter(|cell| movement.is_open(*cell))
        .filter(|cell| !adjacent(*cell, movement.hero_point))
        .collect()
}
