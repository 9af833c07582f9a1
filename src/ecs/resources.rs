use bracket_geometry::prelude::Point;

use crate::map::MapLayer;

/// Per-decision snapshot of which cells a relocating opponent may take.
///
/// A cell is open when it is on-grid, not a wall, not one of `blockers`
/// (doors and actors other than the mover) and not the hero's cell.
#[derive(Clone)]
pub struct MovementContext {
    pub hero_point: Point,
    pub width: i32,
    pub height: i32,
    open: Vec<bool>,
}

impl MovementContext {
    pub fn from_layer(layer: &MapLayer, blockers: &[Point], hero_point: Point) -> Self {
        let mut open = layer
            .tiles
            .iter()
            .map(|tile| !tile.blocks_move())
            .collect::<Vec<bool>>();
        for point in blockers.iter().chain(std::iter::once(&hero_point)) {
            if layer.in_bounds(*point) {
                open[(point.y * layer.width + point.x) as usize] = false;
            }
        }

        Self {
            hero_point,
            width: layer.width,
            height: layer.height,
            open,
        }
    }

    pub fn is_open(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return false;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.open.get(idx).copied().unwrap_or(false)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

/// Player-facing messages produced while resolving turns.
#[derive(Default)]
pub struct CombatLog {
    pub entries: Vec<String>,
}

impl CombatLog {
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }
}
