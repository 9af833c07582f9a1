use specs::prelude::*;

use super::components::{Element, Inventory, PlayerTag, Position, Renderable};
use crate::data::inventory_slot_point;

/// Parks every held item on its off-grid slot cell, on the holder's level.
#[derive(Default)]
pub struct InventoryLayoutSystem;

impl<'a> System<'a> for InventoryLayoutSystem {
    type SystemData = (
        ReadStorage<'a, Inventory>,
        ReadStorage<'a, PlayerTag>,
        WriteStorage<'a, Position>,
    );

    fn run(&mut self, (inventories, players, mut positions): Self::SystemData) {
        let holders = {
            let positions_ref: &WriteStorage<Position> = &positions;
            (&inventories, &players, positions_ref)
                .join()
                .map(|(inventory, _, pos)| (inventory.slots.clone(), pos.level.clone()))
                .collect::<Vec<_>>()
        };

        for (slots, level) in holders {
            for (slot, entity) in slots.into_iter().enumerate() {
                if let Some(pos) = positions.get_mut(entity) {
                    pos.point = inventory_slot_point(slot);
                    pos.level = level.clone();
                }
            }
        }
    }
}

/// Refreshes glyphs after elements change form (doors opening).
#[derive(Default)]
pub struct RenderSyncSystem;

impl<'a> System<'a> for RenderSyncSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Element>,
        WriteStorage<'a, Renderable>,
    );

    fn run(&mut self, (entities, elements, mut renderables): Self::SystemData) {
        for (entity, element) in (&entities, &elements).join() {
            let _ = renderables.insert(entity, element.renderable());
        }
    }
}
