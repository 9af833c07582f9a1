//! Turn resolution.
//!
//! A [`Session`] owns every level, the hero and the random source. Each
//! [`Command`] is resolved to completion before `apply` returns: the hero
//! acts first, then every opponent of the current level in insertion order.

mod checkpoint;
mod combat;
mod inventory;
mod movement;

pub use checkpoint::Checkpoint;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{BLACK, RGB};

use crate::{
    config::GameConfig,
    data::{Direction, HERO_START, HeroStatus, LevelId, STARTING_SCORE, items::ItemKind},
    ecs::{EcsWorld, components::Element},
    error::{LoadError, LoadResult},
    level::Blueprint,
    map::Dungeon,
    render::RenderTile,
    rng::{self, Dice},
    storage::{SaveSlot, load_rooms},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Drop the item in the given zero-based slot.
    Drop(usize),
    /// Use the item in the given zero-based slot.
    Use(usize),
    ListInventory,
    ListElements,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed: empty slot, unusable item, or the session is over.
    Ignored,
    /// An inventory command changed state without spending a turn.
    Applied,
    Advanced,
    Transitioned,
    /// The hero died during the turn and was restored from the checkpoint.
    Rewound,
    Won,
    Listing(Vec<String>),
}

/// How far a chain of interactions got before something ended the turn early.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Transitioned,
    Rewound,
    Won,
}

pub struct Session {
    world: EcsWorld,
    dungeon: Dungeon,
    level: LevelId,
    score: i32,
    turns: u64,
    won: bool,
    checkpoint: Checkpoint,
    dice: Box<dyn Dice>,
    save_slot: Option<SaveSlot>,
}

impl Session {
    /// Loads every room from the configured directory and starts on the
    /// configured first level, falling back to the first room found.
    pub fn new(config: &GameConfig) -> LoadResult<Self> {
        let levels = load_rooms(&config.rooms_dir)?;
        let start = if levels.iter().any(|(id, _)| id == &config.first_level) {
            config.first_level.clone()
        } else {
            levels
                .first()
                .map(|(id, _)| id.clone())
                .ok_or_else(|| LoadError::NoLevels(config.rooms_dir.clone()))?
        };
        let session = Self::with_levels(levels, start, rng::seeded(config.seed))?;
        Ok(match &config.save_dir {
            Some(dir) => session.with_save_slot(SaveSlot::new(dir)),
            None => session,
        })
    }

    pub fn with_levels(
        levels: Vec<(LevelId, Blueprint)>,
        start: LevelId,
        dice: Box<dyn Dice>,
    ) -> LoadResult<Self> {
        if !levels.iter().any(|(id, _)| id == &start) {
            return Err(LoadError::UnknownLevel(start));
        }

        let mut world = EcsWorld::new(HERO_START, start.clone());
        let mut dungeon = Dungeon::default();
        for (id, blueprint) in &levels {
            for record in &blueprint.records {
                world.spawn_record(record, id);
            }
            dungeon.insert(id.clone(), blueprint.layer.clone());
        }
        world.advance();

        let placeholder = Checkpoint {
            level: start.clone(),
            point: HERO_START,
            hp: 0,
            status: HeroStatus::Normal,
            items: Vec::new(),
            score: STARTING_SCORE,
            blueprint: Blueprint::default(),
        };
        let mut session = Self {
            world,
            dungeon,
            level: start,
            score: STARTING_SCORE,
            turns: 0,
            won: false,
            checkpoint: placeholder,
            dice,
            save_slot: None,
        };
        session.capture_checkpoint();
        tracing::info!(level = %session.level, levels = levels.len(), "session started");
        Ok(session)
    }

    /// Persists every future checkpoint, starting with the current one.
    pub fn with_save_slot(mut self, slot: SaveSlot) -> Self {
        self.save_slot = Some(slot);
        self.persist_checkpoint();
        self
    }

    /// Continues from a stored checkpoint instead of the level's initial state.
    /// Nothing changes when the checkpoint is rejected.
    pub fn resume(&mut self, checkpoint: Checkpoint) -> LoadResult<()> {
        checkpoint.validate()?;
        if !self.dungeon.contains(&checkpoint.level) {
            return Err(LoadError::UnknownLevel(checkpoint.level));
        }
        tracing::info!(level = %checkpoint.level, score = checkpoint.score, "resuming");
        self.level = checkpoint.level.clone();
        self.checkpoint = checkpoint;
        self.restore_checkpoint();
        self.world.advance();
        self.persist_checkpoint();
        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        if self.won {
            return Outcome::Ignored;
        }
        let outcome = match command {
            Command::Move(direction) => self.play_turn(direction),
            Command::Drop(slot) => self.drop_slot(slot),
            Command::Use(slot) => self.use_slot(slot),
            Command::ListInventory => Outcome::Listing(self.inventory_listing()),
            Command::ListElements => Outcome::Listing(self.element_listing()),
        };
        self.world.advance();
        outcome
    }

    fn play_turn(&mut self, direction: Direction) -> Outcome {
        let hero = self.world.hero();
        let opponents = self.world.opponents(&self.level);

        let mut flow = self.poison_tick();
        if flow == Flow::Continue {
            flow = self.resolve_move(hero, direction.delta());
        }
        if flow == Flow::Won {
            self.won = true;
            self.turns += 1;
            return Outcome::Won;
        }

        if flow == Flow::Continue && !self.hero_on_open_door() {
            for opponent in opponents {
                if !self.world.is_alive(opponent) {
                    continue;
                }
                flow = self.opponent_turn(opponent);
                if flow != Flow::Continue {
                    break;
                }
            }
        }

        self.turns += 1;
        self.score = (self.score - 1).max(0);
        match flow {
            Flow::Continue => Outcome::Advanced,
            Flow::Transitioned => Outcome::Transitioned,
            Flow::Rewound => Outcome::Rewound,
            Flow::Won => Outcome::Won,
        }
    }

    fn hero_on_open_door(&self) -> bool {
        self.world
            .occupants(self.hero_point(), &self.level)
            .into_iter()
            .any(|entity| {
                matches!(self.world.element(entity), Some(Element::Door(door)) if door.is_open())
            })
    }

    pub fn level(&self) -> &LevelId {
        &self.level
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    pub fn hero_point(&self) -> Point {
        self.world.point(self.world.hero()).unwrap_or(HERO_START)
    }

    pub fn hero_hp(&self) -> i32 {
        self.world
            .stats(self.world.hero())
            .map(|stats| stats.hp)
            .unwrap_or_default()
    }

    pub fn hero_status(&self) -> HeroStatus {
        self.world.hero_status()
    }

    pub fn inventory(&self) -> Vec<ItemKind> {
        self.world.inventory_kinds()
    }

    /// Elements of the current level other than the hero, in insertion order.
    pub fn elements(&self) -> Vec<(Element, Point)> {
        self.world
            .elements(&self.level)
            .into_iter()
            .map(|(_, element, point)| (element, point))
            .collect()
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        self.world.drain_log()
    }

    /// Draw triples for the current level, stably ordered by layer.
    pub fn render_tiles(&self) -> Vec<RenderTile> {
        let mut tiles = Vec::new();
        if let Some(layer) = self.dungeon.layer(&self.level) {
            layer.each_tile(|point, tile| {
                tiles.push(RenderTile {
                    name: tile.name(),
                    point,
                    layer: if tile.blocks_move() { 1 } else { 0 },
                    glyph: tile.glyph,
                    fg: tile.fg,
                    bg: tile.bg,
                });
            });
        }
        self.world.each_renderable(&self.level, |point, element, renderable| {
            tiles.push(RenderTile {
                name: element.name(),
                point,
                layer: renderable.layer,
                glyph: renderable.glyph,
                fg: renderable.color,
                bg: RGB::named(BLACK),
            });
        });
        tiles.sort_by_key(|tile| tile.layer);
        tiles
    }

    fn inventory_listing(&self) -> Vec<String> {
        self.world
            .inventory()
            .into_iter()
            .filter_map(|entity| {
                let element = self.world.element(entity)?;
                let point = self.world.point(entity)?;
                Some(format!("{} ({}, {})", element.name(), point.x, point.y))
            })
            .collect()
    }

    fn element_listing(&self) -> Vec<String> {
        let hero = self.hero_point();
        let mut lines = vec![format!("Hero ({}, {})", hero.x, hero.y)];
        for (element, point) in self.elements() {
            lines.push(format!("{} ({}, {})", element.name(), point.x, point.y));
        }
        lines
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        ai::{Behavior, SkeletonState},
        rng::ScriptedDice,
    };

    /// Open 10x10 rooms with the given newline-separated records.
    pub fn session_with(levels: &[(&str, &str)], dice: ScriptedDice) -> Session {
        let levels = levels
            .iter()
            .map(|(id, records)| {
                let source = format!("{}\n{}\n", "          \n".repeat(10), records);
                let blueprint = source.parse::<Blueprint>().unwrap();
                (LevelId::new(*id), blueprint)
            })
            .collect::<Vec<_>>();
        let start = levels[0].0.clone();
        Session::with_levels(levels, start, Box::new(dice)).unwrap()
    }

    /// A single `room0` with the given wall map (ten newline-terminated rows).
    pub fn session_with_grid(grid: &str, records: &str, dice: ScriptedDice) -> Session {
        let blueprint = format!("{grid}\n{records}\n").parse::<Blueprint>().unwrap();
        let start = LevelId::new("room0");
        Session::with_levels(vec![(start.clone(), blueprint)], start, Box::new(dice)).unwrap()
    }

    pub fn names_at(session: &Session, point: Point) -> Vec<&'static str> {
        session
            .elements()
            .into_iter()
            .filter(|(_, at)| *at == point)
            .map(|(element, _)| element.name())
            .collect()
    }

    #[test]
    fn unknown_start_level_is_rejected() {
        let result = Session::with_levels(
            vec![(LevelId::new("room0"), Blueprint::default())],
            LevelId::new("room7"),
            Box::new(ScriptedDice::new()),
        );
        assert!(matches!(result, Err(LoadError::UnknownLevel(_))));
    }

    #[test]
    fn moves_cost_a_point_and_count_a_turn() {
        let mut session = session_with(&[("room0", "")], ScriptedDice::new());
        assert_eq!(session.apply(Command::Move(Direction::Right)), Outcome::Advanced);
        assert_eq!(session.hero_point(), Point::new(2, 1));
        assert_eq!(session.score(), 99);
        assert_eq!(session.turns(), 1);

        // Listings and empty slots are free.
        assert!(matches!(
            session.apply(Command::ListElements),
            Outcome::Listing(_)
        ));
        assert_eq!(session.apply(Command::Drop(2)), Outcome::Ignored);
        assert_eq!(session.turns(), 1);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut session = session_with(&[("room0", "")], ScriptedDice::new());
        for _ in 0..120 {
            session.apply(Command::Move(Direction::Up));
        }
        assert_eq!(session.score(), 0);
        assert_eq!(session.turns(), 120);
    }

    #[test]
    fn bumping_an_idle_skeleton_attacks_without_moving() {
        let mut session = session_with(&[("room0", "Skeleton,2,1")], ScriptedDice::new());
        // Coming off a pursuing turn, the skeleton idles this one.
        let skeleton = session.world.opponents(&LevelId::new("room0"))[0];
        session
            .world
            .set_behavior(skeleton, Behavior::Skeleton(SkeletonState::Pursuing));

        session.apply(Command::Move(Direction::Right));

        assert_eq!(session.hero_point(), Point::new(1, 1));
        assert_eq!(session.hero_hp(), 10);
        assert_eq!(session.world.stats(skeleton).map(|s| s.hp), Some(4));
        assert_eq!(session.world.point(skeleton), Some(Point::new(2, 1)));
    }

    #[test]
    fn opponents_act_in_insertion_order() {
        // Both step toward (2,1); the first listed gets there.
        let mut session =
            session_with(&[("room0", "Thug,2,2\nThug,3,1")], ScriptedDice::new());
        session.apply(Command::Move(Direction::Up));

        let positions = session
            .elements()
            .into_iter()
            .map(|(_, point)| point)
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![Point::new(2, 1), Point::new(3, 1)]);
    }

    #[test]
    fn won_sessions_ignore_further_commands() {
        let mut session = session_with(&[("room0", "Treasure,2,1")], ScriptedDice::new());
        assert_eq!(session.apply(Command::Move(Direction::Right)), Outcome::Won);
        assert!(session.is_won());
        assert_eq!(session.score(), 100);
        assert_eq!(
            session.apply(Command::Move(Direction::Right)),
            Outcome::Ignored
        );
        assert_eq!(session.hero_point(), Point::new(2, 1));
    }

    #[test]
    fn render_tiles_are_layered() {
        let session = session_with(
            &[("room0", "Thief,5,5\nSword,3,3\nDoor,9,4,room0,1,4,k")],
            ScriptedDice::new(),
        );
        let tiles = session.render_tiles();
        assert_eq!(tiles.len(), 100 + 4);
        assert!(tiles.windows(2).all(|pair| pair[0].layer <= pair[1].layer));

        let thief = tiles.iter().find(|tile| tile.name == "Thief").unwrap();
        assert_eq!(thief.layer, 3);
        let door = tiles.iter().find(|tile| tile.name == "DoorClosed").unwrap();
        assert_eq!(door.layer, 1);
        assert_eq!(tiles.last().map(|tile| tile.name), Some("Thief"));
    }

    #[test]
    fn listings_name_every_element() {
        let mut session = session_with(&[("room0", "Sword,1,2\nBat,7,7")], ScriptedDice::new());
        let Outcome::Listing(lines) = session.apply(Command::ListElements) else {
            panic!("expected a listing");
        };
        assert_eq!(lines, vec!["Hero (1, 1)", "Sword (1, 2)", "Bat (7, 7)"]);
    }
}
