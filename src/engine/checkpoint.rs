use bracket_geometry::prelude::Point;

use super::{Flow, Session};
use crate::{
    data::{
        HERO_HITPOINTS, HeroStatus, INVENTORY_CAPACITY, LevelId, in_grid, inventory_slot_point,
        items::ItemKind,
    },
    ecs::components::{Door, Element},
    error::{LoadError, LoadResult},
    level::Blueprint,
};

/// Everything needed to rewind the hero into the level they last entered.
///
/// Items are held by kind, so later changes to the live inventory never
/// reach a captured checkpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub level: LevelId,
    pub point: Point,
    pub hp: i32,
    pub status: HeroStatus,
    pub items: Vec<ItemKind>,
    pub score: i32,
    /// The level as it stood at capture time.
    pub blueprint: Blueprint,
}

impl Checkpoint {
    /// Rejects a checkpoint no session could have captured, such as one
    /// read back from a damaged save.
    pub fn validate(&self) -> LoadResult<()> {
        let problem = if !in_grid(self.point) {
            format!("hero at ({}, {}) is off the grid", self.point.x, self.point.y)
        } else if self.blueprint.layer.is_wall(self.point) {
            format!("hero at ({}, {}) is inside a wall", self.point.x, self.point.y)
        } else if !(1..=HERO_HITPOINTS).contains(&self.hp) {
            format!("hero hitpoints {} outside 1..={HERO_HITPOINTS}", self.hp)
        } else if self.items.len() > INVENTORY_CAPACITY {
            format!("{} items exceed the pack size of {INVENTORY_CAPACITY}", self.items.len())
        } else if self.score < 0 {
            format!("negative score {}", self.score)
        } else {
            return Ok(());
        };
        Err(LoadError::Checkpoint(problem))
    }
}

impl Session {
    pub(super) fn capture_checkpoint(&mut self) {
        let hero = self.world.hero();
        let layer = self.dungeon.layer(&self.level).cloned().unwrap_or_default();
        let checkpoint = Checkpoint {
            level: self.level.clone(),
            point: self.hero_point(),
            hp: self.world.stats(hero).map(|stats| stats.hp).unwrap_or_default(),
            status: self.world.hero_status(),
            items: self.world.inventory_kinds(),
            score: self.score,
            blueprint: Blueprint::new(layer, self.world.records(&self.level)),
        };
        tracing::info!(
            level = %checkpoint.level,
            x = checkpoint.point.x,
            y = checkpoint.point.y,
            hp = checkpoint.hp,
            score = checkpoint.score,
            "checkpoint captured"
        );

        self.checkpoint = checkpoint;
        self.persist_checkpoint();
    }

    /// Writes the current checkpoint to the save slot, if there is one.
    /// Storage trouble never interrupts play.
    pub(super) fn persist_checkpoint(&self) {
        if let Some(slot) = &self.save_slot
            && let Err(err) = slot.store(&self.checkpoint)
        {
            tracing::warn!(
                dir = %slot.dir().display(),
                error = %err,
                "failed to persist checkpoint"
            );
        }
    }

    /// Rewinds the current level and the hero to the last checkpoint.
    ///
    /// The level id and turn counter are left alone.
    pub(super) fn restore_checkpoint(&mut self) -> Flow {
        let checkpoint = self.checkpoint.clone();
        let level = self.level.clone();
        let hero = self.world.hero();

        self.world.clear_level(&level);
        self.dungeon
            .insert(level.clone(), checkpoint.blueprint.layer.clone());
        for record in &checkpoint.blueprint.records {
            self.world.spawn_record(record, &level);
        }

        self.world.set_position(hero, checkpoint.point, level.clone());
        self.world.set_hp(hero, checkpoint.hp);
        self.world.set_hero_status(checkpoint.status);
        for (slot, kind) in checkpoint.items.iter().enumerate() {
            let item = self.world.spawn(
                Element::Item(kind.clone()),
                inventory_slot_point(slot),
                level.clone(),
            );
            self.world.collect(item);
        }
        self.score = checkpoint.score;

        tracing::info!(level = %level, hp = checkpoint.hp, "hero restored from checkpoint");
        self.world.log("You black out and wake at the last checkpoint.");
        Flow::Rewound
    }

    /// Carries the hero and their inventory through an open door.
    pub(super) fn enter_door(&mut self, door: &Door) -> Flow {
        if !self.dungeon.contains(&door.destination) {
            tracing::warn!(destination = %door.destination, "door leads to an unknown level");
            return Flow::Continue;
        }

        let hero = self.world.hero();
        let destination = door.destination.clone();
        for (slot, item) in self.world.inventory().into_iter().enumerate() {
            self.world
                .set_position(item, inventory_slot_point(slot), destination.clone());
        }
        self.world
            .set_position(hero, door.target, destination.clone());
        tracing::info!(from = %self.level, to = %destination, "level transition");
        self.world.log(format!("You pass through to {destination}."));
        self.level = destination;

        self.capture_checkpoint();
        Flow::Transitioned
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Command, Outcome, tests::*};
    use crate::{
        data::{Direction, HeroStatus, LevelId, items::ItemKind},
        rng::ScriptedDice,
    };
    use bracket_geometry::prelude::Point;

    #[test]
    fn restore_twice_yields_the_same_hero() {
        let mut session = session_with(
            &[("room0", "Sword,1,2\nHealingPotion,5,5\nSkeleton,7,7")],
            ScriptedDice::new(),
        );
        session.apply(Command::Move(Direction::Down));
        assert_eq!(session.inventory(), vec![ItemKind::Sword]);

        session.restore_checkpoint();
        let first = (
            session.hero_point(),
            session.hero_hp(),
            session.inventory(),
            session.score(),
        );
        session.restore_checkpoint();
        let second = (
            session.hero_point(),
            session.hero_hp(),
            session.inventory(),
            session.score(),
        );

        assert_eq!(first, second);
        assert_eq!(first, (Point::new(1, 1), 10, Vec::new(), 100));
        // The sword went back to the floor with the rest of the level.
        assert_eq!(names_at(&session, Point::new(1, 2)), vec!["Sword"]);
    }

    #[test]
    fn checkpoint_items_are_copies() {
        let mut session = session_with(
            &[("room0", "Sword,1,2\nDoor,2,2,room1,4,4"), ("room1", "")],
            ScriptedDice::new(),
        );
        session.apply(Command::Move(Direction::Down));
        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Transitioned
        );
        assert_eq!(session.checkpoint().items, vec![ItemKind::Sword]);

        session.apply(Command::Drop(0));
        assert!(session.inventory().is_empty());
        assert_eq!(session.checkpoint().items, vec![ItemKind::Sword]);
    }

    #[test]
    fn death_after_a_transition_rewinds_to_the_door_entry() {
        let mut session = session_with(
            &[
                ("room0", "Sword,1,2\nDoor,2,2,room1,4,4"),
                ("room1", "Thug,4,6\nHealingPotion,8,8"),
            ],
            // Every thug swing lands.
            ScriptedDice::new().with_chances([true; 16]),
        );
        session.apply(Command::Move(Direction::Down));
        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Transitioned
        );
        assert_eq!(session.level(), &LevelId::new("room1"));

        let mut outcome = Outcome::Advanced;
        for _ in 0..20 {
            outcome = session.apply(Command::Move(Direction::Up));
            if outcome == Outcome::Rewound {
                break;
            }
        }

        assert_eq!(outcome, Outcome::Rewound);
        assert_eq!(session.level(), &LevelId::new("room1"));
        assert_eq!(session.hero_point(), Point::new(4, 4));
        assert_eq!(session.hero_hp(), 10);
        assert_eq!(session.hero_status(), HeroStatus::Normal);
        assert_eq!(session.inventory(), vec![ItemKind::Sword]);
        // Score rewinds to the entry value, then the fatal turn still counts.
        assert_eq!(session.score(), session.checkpoint().score - 1);
        assert_eq!(names_at(&session, Point::new(4, 6)), vec!["Thug"]);
    }
}
