use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{RGB, YELLOW};
use specs::prelude::{Component, Entity, NullStorage, VecStorage};

use crate::{
    ai::Behavior,
    data::{HeroStatus, KeyId, LevelId, items::ItemKind, monsters::OpponentKind},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub point: Point,
    pub level: LevelId,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub color: RGB,
    pub layer: i32,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Door {
    pub destination: LevelId,
    pub target: Point,
    pub key: Option<KeyId>,
    pub state: DoorState,
}

impl Door {
    /// Keyless doors start open.
    pub fn new(destination: LevelId, target: Point, key: Option<KeyId>) -> Self {
        let state = if key.is_some() {
            DoorState::Closed
        } else {
            DoorState::Open
        };
        Self {
            destination,
            target,
            key,
            state,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }
}

/// What a grid element is. Every interaction, damage and save rule matches on this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Hero,
    Opponent(OpponentKind),
    Item(ItemKind),
    Door(Door),
}

impl Component for Element {
    type Storage = VecStorage<Self>;
}

impl Element {
    pub fn name(&self) -> &'static str {
        match self {
            Element::Hero => "Hero",
            Element::Opponent(kind) => kind.as_str(),
            Element::Item(kind) => kind.as_str(),
            Element::Door(door) if door.is_open() => "DoorOpen",
            Element::Door(_) => "DoorClosed",
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, Element::Item(_))
    }

    pub fn blocks(&self) -> bool {
        match self {
            Element::Hero | Element::Opponent(_) => true,
            Element::Door(door) => !door.is_open(),
            Element::Item(_) => false,
        }
    }

    pub fn renderable(&self) -> Renderable {
        let (glyph, color, layer) = match self {
            Element::Hero => ('@', RGB::named(YELLOW), 2),
            Element::Opponent(kind) => {
                let template = kind.template();
                (template.glyph, template.color, template.layer)
            }
            Element::Item(kind) => (kind.glyph(), kind.color(), 1),
            Element::Door(door) if door.is_open() => ('/', RGB::from_u8(205, 133, 63), 2),
            Element::Door(_) => ('+', RGB::from_u8(205, 133, 63), 1),
        };
        Renderable {
            glyph: glyph as u16,
            color,
            layer,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub power: i32,
}

impl CombatStats {
    pub fn take_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage.max(0)).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct MonsterBrain {
    pub behavior: Behavior,
}

impl Component for MonsterBrain {
    type Storage = VecStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Condition {
    pub status: HeroStatus,
}

impl Component for Condition {
    type Storage = VecStorage<Self>;
}

/// Held item entities in slot order.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub slots: Vec<Entity>,
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

/// Insertion order within the element collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnOrder(pub u64);

impl Component for SpawnOrder {
    type Storage = VecStorage<Self>;
}
