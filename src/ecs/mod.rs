pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    ai::Behavior,
    data::{
        HERO_HITPOINTS, HERO_POWER, HeroStatus, INVENTORY_CAPACITY, LevelId, in_grid,
        inventory_slot_point, items::ItemKind,
    },
    level::Record,
};

use self::{
    components::{
        CombatStats, Condition, Door, DoorState, Element, Inventory, MonsterBrain, PlayerTag,
        Position, Renderable, SpawnOrder,
    },
    resources::CombatLog,
    systems::{InventoryLayoutSystem, RenderSyncSystem},
};

/// Every element of every loaded level, plus the hero.
///
/// Elements are tagged with their level through [`Position::level`]; queries
/// return entities in insertion order.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    hero: Entity,
    next_order: u64,
}

impl EcsWorld {
    pub fn new(spawn: Point, level: LevelId) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(CombatLog::default());
        let hero = Self::spawn_hero(&mut specs_world, spawn, level);
        let dispatcher = DispatcherBuilder::new()
            .with(InventoryLayoutSystem, "inventory_layout", &[])
            .with(RenderSyncSystem, "render_sync", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            hero,
            next_order: 1,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Element>();
        world.register::<CombatStats>();
        world.register::<MonsterBrain>();
        world.register::<PlayerTag>();
        world.register::<Condition>();
        world.register::<Inventory>();
        world.register::<SpawnOrder>();
    }

    fn spawn_hero(world: &mut SpecsWorld, spawn: Point, level: LevelId) -> Entity {
        world
            .create_entity()
            .with(Position {
                point: spawn,
                level,
            })
            .with(Element::Hero.renderable())
            .with(Element::Hero)
            .with(CombatStats {
                max_hp: HERO_HITPOINTS,
                hp: HERO_HITPOINTS,
                power: HERO_POWER,
            })
            .with(PlayerTag)
            .with(Condition::default())
            .with(Inventory::default())
            .with(SpawnOrder(0))
            .build()
    }

    pub fn hero(&self) -> Entity {
        self.hero
    }

    pub fn spawn(&mut self, element: Element, point: Point, level: LevelId) -> Entity {
        let order = SpawnOrder(self.next_order);
        self.next_order += 1;
        let mut builder = self
            .specs_world
            .create_entity()
            .with(Position { point, level })
            .with(element.renderable())
            .with(order);
        if let Element::Opponent(kind) = &element {
            let template = kind.template();
            builder = builder
                .with(CombatStats {
                    max_hp: template.hp,
                    hp: template.hp,
                    power: template.power,
                })
                .with(MonsterBrain {
                    behavior: Behavior::for_kind(*kind),
                });
        }
        builder.with(element).build()
    }

    pub fn spawn_record(&mut self, record: &Record, level: &LevelId) -> Entity {
        let element = match record {
            Record::Opponent { kind, .. } => Element::Opponent(*kind),
            Record::Item { kind, .. } => Element::Item(kind.clone()),
            Record::Door {
                destination,
                target,
                key,
                ..
            } => Element::Door(Door::new(destination.clone(), *target, key.clone())),
        };
        self.spawn(element, record.at(), level.clone())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.specs_world.is_alive(entity)
    }

    pub fn delete(&mut self, entity: Entity) {
        if entity == self.hero {
            return;
        }
        let _ = self.specs_world.delete_entity(entity);
    }

    pub fn element(&self, entity: Entity) -> Option<Element> {
        self.specs_world.read_component::<Element>().get(entity).cloned()
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.specs_world.read_component::<Position>().get(entity).cloned()
    }

    pub fn point(&self, entity: Entity) -> Option<Point> {
        self.position(entity).map(|pos| pos.point)
    }

    pub fn set_position(&mut self, entity: Entity, point: Point, level: LevelId) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(entity) {
            pos.point = point;
            pos.level = level;
        }
    }

    fn ordered<F>(&self, mut keep: F) -> Vec<Entity>
    where
        F: FnMut(Entity, &Position, &Element) -> bool,
    {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let elements = self.specs_world.read_component::<Element>();
        let orders = self.specs_world.read_component::<SpawnOrder>();
        let mut found = (&entities, &positions, &elements, &orders)
            .join()
            .filter(|(entity, pos, element, _)| keep(*entity, *pos, *element))
            .map(|(entity, _, _, order)| (*order, entity))
            .collect::<Vec<_>>();
        found.sort_by_key(|(order, _)| *order);
        found.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Elements standing on `point` of `level`, in insertion order.
    pub fn occupants(&self, point: Point, level: &LevelId) -> Vec<Entity> {
        self.ordered(|_, pos, _| pos.point == point && &pos.level == level)
    }

    pub fn opponents(&self, level: &LevelId) -> Vec<Entity> {
        self.ordered(|_, pos, element| {
            &pos.level == level && matches!(element, Element::Opponent(_))
        })
    }

    /// Every element of `level` except the hero, held items included.
    pub fn elements(&self, level: &LevelId) -> Vec<(Entity, Element, Point)> {
        let hero = self.hero;
        self.ordered(|entity, pos, _| entity != hero && &pos.level == level)
            .into_iter()
            .filter_map(|entity| Some((entity, self.element(entity)?, self.point(entity)?)))
            .collect()
    }

    /// On-grid elements of `level` in their save-record form.
    pub fn records(&self, level: &LevelId) -> Vec<Record> {
        let mut records = Vec::new();
        for (entity, element, at) in self.elements(level) {
            if !in_grid(at) {
                continue;
            }
            match element {
                Element::Hero => {}
                Element::Opponent(kind) => {
                    records.push(Record::Opponent { kind, at });
                    if let Some(Behavior::Thief {
                        loot: Some(item), ..
                    }) = self.behavior(entity)
                    {
                        records.push(Record::Item { kind: item, at });
                    }
                }
                Element::Item(kind) => records.push(Record::Item { kind, at }),
                Element::Door(door) => records.push(Record::Door {
                    at,
                    destination: door.destination,
                    target: door.target,
                    key: match door.state {
                        DoorState::Open => None,
                        DoorState::Closed => door.key,
                    },
                }),
            }
        }
        records
    }

    pub fn stats(&self, entity: Entity) -> Option<CombatStats> {
        self.specs_world
            .read_component::<CombatStats>()
            .get(entity)
            .cloned()
    }

    /// Applies `damage` and returns the remaining hitpoints.
    pub fn damage(&mut self, entity: Entity, damage: i32) -> Option<i32> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let target = stats.get_mut(entity)?;
        target.take_damage(damage);
        Some(target.hp)
    }

    pub fn heal(&mut self, entity: Entity, amount: i32) -> Option<i32> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let target = stats.get_mut(entity)?;
        target.heal(amount);
        Some(target.hp)
    }

    pub fn set_hp(&mut self, entity: Entity, hp: i32) {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        if let Some(target) = stats.get_mut(entity) {
            target.hp = hp.clamp(0, target.max_hp);
        }
    }

    pub fn behavior(&self, entity: Entity) -> Option<Behavior> {
        self.specs_world
            .read_component::<MonsterBrain>()
            .get(entity)
            .map(|brain| brain.behavior.clone())
    }

    pub fn set_behavior(&mut self, entity: Entity, behavior: Behavior) {
        let mut brains = self.specs_world.write_component::<MonsterBrain>();
        if let Some(brain) = brains.get_mut(entity) {
            brain.behavior = behavior;
        }
    }

    pub fn hero_status(&self) -> HeroStatus {
        self.specs_world
            .read_component::<Condition>()
            .get(self.hero)
            .map(|condition| condition.status)
            .unwrap_or_default()
    }

    pub fn set_hero_status(&mut self, status: HeroStatus) {
        let mut conditions = self.specs_world.write_component::<Condition>();
        if let Some(condition) = conditions.get_mut(self.hero) {
            condition.status = status;
        }
    }

    /// Held item entities in slot order.
    pub fn inventory(&self) -> Vec<Entity> {
        self.specs_world
            .read_component::<Inventory>()
            .get(self.hero)
            .map(|inv| inv.slots.clone())
            .unwrap_or_default()
    }

    pub fn inventory_kinds(&self) -> Vec<ItemKind> {
        self.inventory()
            .into_iter()
            .filter_map(|entity| match self.element(entity)? {
                Element::Item(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    pub fn holds(&self, wanted: impl Fn(&ItemKind) -> bool) -> bool {
        self.inventory_kinds().iter().any(wanted)
    }

    /// Moves a ground item into the next free slot. Fails when full.
    pub fn collect(&mut self, item: Entity) -> bool {
        let slot = {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            let Some(inventory) = inventories.get_mut(self.hero) else {
                return false;
            };
            if inventory.slots.len() >= INVENTORY_CAPACITY || inventory.slots.contains(&item) {
                return false;
            }
            inventory.slots.push(item);
            inventory.slots.len() - 1
        };
        let level = self.position(self.hero).map(|pos| pos.level);
        if let Some(level) = level {
            self.set_position(item, inventory_slot_point(slot), level);
        }
        true
    }

    /// Takes the item in `slot` out of the inventory. The entity stays alive.
    pub fn release(&mut self, slot: usize) -> Option<Entity> {
        let mut inventories = self.specs_world.write_component::<Inventory>();
        let inventory = inventories.get_mut(self.hero)?;
        if slot >= inventory.slots.len() {
            return None;
        }
        Some(inventory.slots.remove(slot))
    }

    pub fn open_door(&mut self, door: Entity) {
        let mut elements = self.specs_world.write_component::<Element>();
        if let Some(Element::Door(door)) = elements.get_mut(door) {
            door.state = DoorState::Open;
        }
    }

    /// Deletes every element of `level` except the hero, held items included.
    pub fn clear_level(&mut self, level: &LevelId) {
        let doomed = self
            .elements(level)
            .into_iter()
            .map(|(entity, _, _)| entity)
            .chain(self.inventory())
            .collect::<Vec<_>>();
        {
            let mut inventories = self.specs_world.write_component::<Inventory>();
            if let Some(inventory) = inventories.get_mut(self.hero) {
                inventory.slots.clear();
            }
        }
        for entity in doomed {
            self.delete(entity);
        }
    }

    /// End-of-command bookkeeping: slot layout, glyph refresh, deferred deletes.
    pub fn advance(&mut self) {
        self.dispatcher.dispatch(&self.specs_world);
        self.specs_world.maintain();
    }

    pub fn each_renderable<F>(&self, level: &LevelId, mut f: F)
    where
        F: FnMut(Point, &Element, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let elements = self.specs_world.read_component::<Element>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let orders = self.specs_world.read_component::<SpawnOrder>();
        let mut visible = (&positions, &elements, &renderables, &orders)
            .join()
            .filter(|(pos, _, _, _)| &pos.level == level)
            .collect::<Vec<_>>();
        visible.sort_by_key(|(_, _, _, order)| **order);
        for (pos, element, renderable, _) in visible {
            f(pos.point, element, renderable);
        }
    }

    pub fn log<S: Into<String>>(&mut self, entry: S) {
        self.specs_world.write_resource::<CombatLog>().push(entry);
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        let mut log = self.specs_world.write_resource::<CombatLog>();
        std::mem::take(&mut log.entries)
    }
}
