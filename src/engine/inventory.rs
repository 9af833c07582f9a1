use specs::prelude::Entity;

use super::{Outcome, Session};
use crate::{
    ai::{Behavior, ThiefState},
    data::{HeroStatus, items::{HEALING_RESTORE, ItemKind}},
    ecs::components::{Door, Element},
};

impl Session {
    /// Moves a ground item into the inventory. A full inventory leaves it
    /// where it lies.
    pub(super) fn pick_up(&mut self, item: Entity) -> bool {
        let Some(Element::Item(kind)) = self.world.element(item) else {
            return false;
        };
        if !self.world.collect(item) {
            tracing::debug!(item = kind.as_str(), "inventory full");
            self.world.log("Your pack is full.");
            return false;
        }
        self.world.log(format!("Picked up {}.", kind.as_str()));
        true
    }

    /// Opens a closed door if the hero carries its key, consuming the key.
    pub(super) fn unlock(&mut self, target: Entity, door: &Door) {
        let key = match &door.key {
            None => None,
            Some(wanted) => {
                let found = self.world.inventory().into_iter().find(|entity| {
                    matches!(
                        self.world.element(*entity),
                        Some(Element::Item(ItemKind::Key(held))) if &held == wanted
                    )
                });
                match found {
                    Some(entity) => Some(entity),
                    None => {
                        self.world.log("The door is locked.");
                        return;
                    }
                }
            }
        };

        if let Some(entity) = key {
            if let Some(slot) = self.world.inventory().iter().position(|held| *held == entity) {
                self.world.release(slot);
            }
            self.world.delete(entity);
        }
        self.world.open_door(target);
        tracing::info!(destination = %door.destination, "door opened");
        self.world.log("The door swings open.");
    }

    /// A thief lifts one random item off the hero and turns to flee.
    pub(super) fn steal(&mut self, thief: Entity) {
        let held = self.world.inventory();
        if held.is_empty() {
            tracing::debug!(?thief, "nothing to steal");
            return;
        }
        let slot = self.dice.pick(held.len());
        let Some(item) = self.world.release(slot) else {
            return;
        };
        let Some(Element::Item(kind)) = self.world.element(item) else {
            return;
        };
        self.world.delete(item);
        tracing::info!(item = kind.as_str(), "thief stole an item");
        self.world.log(format!("The thief snatches your {}!", kind.as_str()));
        self.world.set_behavior(
            thief,
            Behavior::Thief {
                state: ThiefState::Fleeing,
                loot: Some(kind),
            },
        );
    }

    /// Puts a fresh copy of the slotted item on the hero's cell.
    pub(super) fn drop_slot(&mut self, slot: usize) -> Outcome {
        let Some(item) = self.world.release(slot) else {
            return Outcome::Ignored;
        };
        let Some(Element::Item(kind)) = self.world.element(item) else {
            return Outcome::Ignored;
        };
        self.world.delete(item);
        let point = self.hero_point();
        self.world
            .spawn(Element::Item(kind.clone()), point, self.level.clone());
        self.world.log(format!("Dropped {}.", kind.as_str()));
        Outcome::Applied
    }

    /// Drinks a healing potion. Nothing else in the pack is usable.
    pub(super) fn use_slot(&mut self, slot: usize) -> Outcome {
        let Some(item) = self.world.inventory().get(slot).copied() else {
            return Outcome::Ignored;
        };
        if !matches!(self.world.element(item), Some(Element::Item(kind)) if kind.is_consumable()) {
            return Outcome::Ignored;
        }

        self.world.release(slot);
        self.world.delete(item);
        let hero = self.world.hero();
        let hp = self.world.heal(hero, HEALING_RESTORE).unwrap_or_default();
        self.world.set_hero_status(HeroStatus::Normal);
        tracing::info!(hp, "healing potion used");
        self.world.log("You feel better.");
        Outcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Command, Outcome, tests::*};
    use crate::{
        ai::{Behavior, ThiefState},
        data::{Direction, HeroStatus, KeyId, items::ItemKind},
        rng::ScriptedDice,
    };
    use bracket_geometry::prelude::Point;

    #[test]
    fn fourth_item_stays_on_the_floor() {
        let mut session = session_with(
            &[("room0", "Sword,2,1\nArmor,3,1\nHealingPotion,4,1\nKey,5,1,a")],
            ScriptedDice::new(),
        );
        for _ in 0..4 {
            session.apply(Command::Move(Direction::Right));
        }
        assert_eq!(session.inventory().len(), 3);
        assert_eq!(names_at(&session, Point::new(5, 1)), vec!["Key"]);
    }

    #[test]
    fn dropped_items_are_fresh_copies() {
        let mut session = session_with(&[("room0", "Key,2,1,gold")], ScriptedDice::new());
        session.apply(Command::Move(Direction::Right));
        let held = session.world.inventory()[0];

        assert_eq!(session.apply(Command::Drop(0)), Outcome::Applied);
        assert!(session.inventory().is_empty());
        assert!(!session.world.is_alive(held));
        assert_eq!(names_at(&session, Point::new(2, 1)), vec!["Key"]);

        session.apply(Command::Move(Direction::Left));
        session.apply(Command::Move(Direction::Right));
        assert_eq!(session.inventory(), vec![ItemKind::Key(KeyId::new("gold"))]);
        assert_ne!(session.world.inventory()[0], held);
    }

    #[test]
    fn only_potions_can_be_used() {
        let mut session = session_with(
            &[("room0", "Sword,2,1\nHealingPotion,3,1")],
            ScriptedDice::new(),
        );
        session.apply(Command::Move(Direction::Right));
        session.apply(Command::Move(Direction::Right));
        let hero = session.world.hero();
        session.world.set_hp(hero, 3);
        session.world.set_hero_status(HeroStatus::Poisoned);

        assert_eq!(session.apply(Command::Use(0)), Outcome::Ignored);
        assert_eq!(session.apply(Command::Use(2)), Outcome::Ignored);
        assert_eq!(session.apply(Command::Use(1)), Outcome::Applied);
        assert_eq!(session.hero_hp(), 8);
        assert_eq!(session.hero_status(), HeroStatus::Normal);
        assert_eq!(session.inventory(), vec![ItemKind::Sword]);

        // The poison is gone.
        session.apply(Command::Move(Direction::Left));
        assert_eq!(session.hero_hp(), 8);
    }

    #[test]
    fn thief_finds_nothing_in_an_empty_pack() {
        let mut session = session_with(&[("room0", "Thief,2,1")], ScriptedDice::new());
        let thief = session.world.opponents(session.level())[0];
        session.world.set_behavior(
            thief,
            Behavior::Thief {
                state: ThiefState::Pursuing,
                loot: None,
            },
        );
        session.apply(Command::Move(Direction::Up));
        session.apply(Command::Move(Direction::Right));
        assert!(matches!(
            session.world.behavior(thief),
            Some(Behavior::Thief {
                state: ThiefState::Pursuing,
                loot: None,
            })
        ));
    }
}
