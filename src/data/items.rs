use bracket_terminal::prelude::{GOLD, LIGHT_BLUE, MAGENTA, ORANGE, RGB, SILVER};
use serde::{Deserialize, Serialize};

use super::KeyId;

pub const HEALING_RESTORE: i32 = 5;
pub const SWORD_MULTIPLIER: i32 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Armor,
    Sword,
    Key(KeyId),
    HealingPotion,
    Treasure,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Armor => "Armor",
            ItemKind::Sword => "Sword",
            ItemKind::Key(_) => "Key",
            ItemKind::HealingPotion => "HealingPotion",
            ItemKind::Treasure => "Treasure",
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            ItemKind::Armor => '[',
            ItemKind::Sword => '/',
            ItemKind::Key(_) => 'k',
            ItemKind::HealingPotion => '!',
            ItemKind::Treasure => '$',
        }
    }

    pub fn color(&self) -> RGB {
        match self {
            ItemKind::Armor => RGB::named(SILVER),
            ItemKind::Sword => RGB::named(LIGHT_BLUE),
            ItemKind::Key(_) => RGB::named(ORANGE),
            ItemKind::HealingPotion => RGB::named(MAGENTA),
            ItemKind::Treasure => RGB::named(GOLD),
        }
    }

    pub fn key_id(&self) -> Option<&KeyId> {
        match self {
            ItemKind::Key(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_consumable(&self) -> bool {
        matches!(self, ItemKind::HealingPotion)
    }
}
