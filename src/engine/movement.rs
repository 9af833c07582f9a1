use bracket_geometry::prelude::Point;
use specs::prelude::Entity;

use super::{Flow, Session};
use crate::{
    ai::{self, BehaviorContext, Plan},
    data::{in_grid, items::ItemKind, monsters::OpponentKind},
    ecs::{components::Element, resources::MovementContext},
};

impl Session {
    /// Moves `mover` by `vector` and fires interactions with whatever is at
    /// the target cell.
    ///
    /// A blocked move leaves the mover in place but still bumps every
    /// non-item occupant of the target. A legal move relocates first and then
    /// interacts with everything found there.
    pub(super) fn resolve_move(&mut self, mover: Entity, vector: Point) -> Flow {
        let Some(origin) = self.world.position(mover) else {
            return Flow::Continue;
        };
        let target = Point::new(origin.point.x + vector.x, origin.point.y + vector.y);
        let occupants = self
            .world
            .occupants(target, &origin.level)
            .into_iter()
            .filter(|entity| *entity != mover)
            .collect::<Vec<_>>();

        let blocked = !in_grid(target)
            || self.dungeon.is_wall(&origin.level, target)
            || occupants.iter().any(|entity| {
                self.world
                    .element(*entity)
                    .is_some_and(|element| element.blocks())
            });

        if !blocked {
            self.world.set_position(mover, target, origin.level.clone());
        }

        for occupant in occupants {
            if !self.world.is_alive(occupant) {
                continue;
            }
            if blocked && self.world.element(occupant).is_some_and(|e| e.is_item()) {
                continue;
            }
            let flow = self.interact(mover, occupant);
            if flow != Flow::Continue {
                return flow;
            }
        }
        Flow::Continue
    }

    fn interact(&mut self, actor: Entity, target: Entity) -> Flow {
        let (Some(actor_element), Some(target_element)) =
            (self.world.element(actor), self.world.element(target))
        else {
            return Flow::Continue;
        };

        match (actor_element, target_element) {
            (Element::Hero, Element::Opponent(kind)) => self.hero_attack(target, kind),
            (Element::Hero, Element::Item(ItemKind::Treasure)) => {
                if self.pick_up(target) {
                    tracing::info!(score = self.score, "treasure collected");
                    self.world.log("You found the treasure!");
                    Flow::Won
                } else {
                    Flow::Continue
                }
            }
            (Element::Hero, Element::Item(_)) => {
                self.pick_up(target);
                Flow::Continue
            }
            (Element::Hero, Element::Door(door)) if door.is_open() => self.enter_door(&door),
            (Element::Hero, Element::Door(door)) => {
                self.unlock(target, &door);
                Flow::Continue
            }
            (Element::Opponent(OpponentKind::Thief), Element::Hero) => {
                self.steal(actor);
                Flow::Continue
            }
            (Element::Opponent(kind), Element::Hero) => self.opponent_attack(actor, kind),
            (Element::Hero, Element::Hero)
            | (Element::Opponent(_), Element::Opponent(_) | Element::Item(_) | Element::Door(_))
            | (Element::Item(_) | Element::Door(_), _) => Flow::Continue,
        }
    }

    pub(super) fn opponent_turn(&mut self, opponent: Entity) -> Flow {
        let (Some(mut behavior), Some(origin)) =
            (self.world.behavior(opponent), self.world.point(opponent))
        else {
            return Flow::Continue;
        };
        let context = BehaviorContext {
            hero_has_items: !self.world.inventory().is_empty(),
        };
        let plan = ai::advance(&mut behavior, &context, self.dice.as_mut());
        tracing::debug!(?opponent, ?behavior, ?plan, "opponent decision");
        self.world.set_behavior(opponent, behavior);

        match plan {
            Plan::Hold => Flow::Continue,
            Plan::Pursue => {
                let vector = ai::toward(origin, self.hero_point());
                if vector == Point::new(0, 0) {
                    return Flow::Continue;
                }
                self.resolve_move(opponent, vector)
            }
            Plan::Step(direction) => self.resolve_move(opponent, direction.delta()),
            Plan::Flee => {
                self.flee(opponent, origin);
                Flow::Continue
            }
        }
    }

    /// Relocates a running opponent to a random open neighbour away from the
    /// hero. Nothing is interacted with.
    fn flee(&mut self, runner: Entity, origin: Point) {
        let Some(layer) = self.dungeon.layer(&self.level) else {
            return;
        };
        let blockers = self
            .world
            .elements(&self.level)
            .into_iter()
            .filter(|(entity, element, _)| {
                *entity != runner && matches!(element, Element::Opponent(_) | Element::Door(_))
            })
            .map(|(_, _, point)| point)
            .collect::<Vec<_>>();
        let movement = MovementContext::from_layer(layer, &blockers, self.hero_point());

        let cells = ai::flee_cells(origin, &movement);
        if cells.is_empty() {
            tracing::debug!(?runner, "no room to flee");
            return;
        }
        let cell = cells[self.dice.pick(cells.len())];
        self.world.set_position(runner, cell, self.level.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Command, Outcome, tests::*};
    use crate::{
        data::{Direction, LevelId, items::ItemKind},
        rng::ScriptedDice,
    };
    use bracket_geometry::prelude::Point;

    #[test]
    fn grid_edges_block() {
        let mut session = session_with(&[("room0", "")], ScriptedDice::new());
        session.apply(Command::Move(Direction::Up));
        assert_eq!(session.hero_point(), Point::new(1, 0));
        session.apply(Command::Move(Direction::Up));
        assert_eq!(session.hero_point(), Point::new(1, 0));
    }

    #[test]
    fn walls_hold_the_hero_and_pursuing_opponents() {
        let open = "          \n";
        let grid = format!("{open}  #       \n{}", open.repeat(8));
        let mut session = session_with_grid(&grid, "Thug,3,1", ScriptedDice::new());

        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Advanced
        );
        assert_eq!(session.hero_point(), Point::new(1, 1));
        // The thug steps toward the hero and runs into the same wall.
        assert_eq!(names_at(&session, Point::new(3, 1)), vec!["Thug"]);

        session.apply(Command::Move(Direction::Down));
        assert_eq!(session.hero_point(), Point::new(1, 2));
        assert_eq!(names_at(&session, Point::new(3, 1)), vec!["Thug"]);
        assert_eq!(session.hero_hp(), 10);
    }

    #[test]
    fn stepping_onto_an_item_collects_it() {
        let mut session = session_with(&[("room0", "Armor,2,1")], ScriptedDice::new());
        session.apply(Command::Move(Direction::Right));
        assert_eq!(session.hero_point(), Point::new(2, 1));
        assert_eq!(session.inventory(), vec![ItemKind::Armor]);
        assert!(names_at(&session, Point::new(2, 1)).is_empty());
    }

    #[test]
    fn matching_key_opens_a_door_without_moving_through() {
        let mut session = session_with(
            &[
                ("room0", "Key,1,2,gold\nDoor,1,3,room1,5,5,gold"),
                ("room1", ""),
            ],
            ScriptedDice::new(),
        );
        session.apply(Command::Move(Direction::Down));
        assert_eq!(session.inventory().len(), 1);

        assert_eq!(
            session.apply(Command::Move(Direction::Down)),
            Outcome::Advanced
        );
        assert_eq!(session.hero_point(), Point::new(1, 2));
        assert!(session.inventory().is_empty());
        assert_eq!(names_at(&session, Point::new(1, 3)), vec!["DoorOpen"]);

        assert_eq!(
            session.apply(Command::Move(Direction::Down)),
            Outcome::Transitioned
        );
        assert_eq!(session.hero_point(), Point::new(5, 5));
    }

    #[test]
    fn wrong_key_leaves_the_door_shut() {
        let mut session = session_with(
            &[
                ("room0", "Key,1,2,iron\nDoor,1,3,room1,5,5,gold"),
                ("room1", ""),
            ],
            ScriptedDice::new(),
        );
        session.apply(Command::Move(Direction::Down));
        session.apply(Command::Move(Direction::Down));
        assert_eq!(session.hero_point(), Point::new(1, 2));
        assert_eq!(session.inventory().len(), 1);
        assert_eq!(names_at(&session, Point::new(1, 3)), vec!["DoorClosed"]);
    }

    #[test]
    fn opponents_skip_the_turn_of_a_transition() {
        let mut session = session_with(
            &[("room0", "Door,2,1,room1,5,5\nThug,3,2"), ("room1", "")],
            ScriptedDice::new(),
        );
        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Transitioned
        );
        assert_eq!(session.level().as_str(), "room1");
        let thug = session
            .world
            .elements(&LevelId::new("room0"))
            .into_iter()
            .find(|(_, element, _)| element.name() == "Thug")
            .map(|(_, _, point)| point);
        assert_eq!(thug, Some(Point::new(3, 2)));
    }

    #[test]
    fn doors_to_missing_levels_do_nothing() {
        let mut session = session_with(&[("room0", "Door,2,1,room9,5,5")], ScriptedDice::new());
        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Advanced
        );
        assert_eq!(session.level().as_str(), "room0");
        assert_eq!(session.hero_point(), Point::new(2, 1));
    }

    #[test]
    fn stealthing_thief_keeps_clear_of_the_hero() {
        let mut session =
            session_with(&[("room0", "Thief,3,2")], ScriptedDice::new().with_picks([2]));
        session.apply(Command::Move(Direction::Down));
        // (2,2) touches the hero at (1,2), leaving (3,1), (3,3) and (4,2).
        let thief = session.elements()[0].1;
        assert_eq!(thief, Point::new(4, 2));
    }
}
