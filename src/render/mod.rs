use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::data::{GRID_HEIGHT, HERO_HITPOINTS};

pub const HEALTH_BAR_TILES: i32 = 5;

/// One drawable cell: what it is, where, and which layer it sits on.
/// Higher layers are drawn over lower ones.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTile {
    pub name: &'static str,
    pub point: Point,
    pub layer: i32,
    pub glyph: u16,
    pub fg: RGB,
    pub bg: RGB,
}

/// The status-row hearts below the grid, two hitpoints per tile.
///
/// Missing health empties the bar from the left; an odd hitpoint leaves one
/// half-filled `RedGreen` tile at the boundary.
pub fn health_bar(hp: i32) -> Vec<RenderTile> {
    let hp = hp.clamp(0, HERO_HITPOINTS);
    let full = HEALTH_BAR_TILES - hp / 2;
    let boundary = if hp % 2 == 1 { full - 1 } else { full };

    (0..HEALTH_BAR_TILES)
        .map(|x| {
            let point = Point::new(x, GRID_HEIGHT);
            if x < boundary {
                bar_tile("Red", point, RGB::named(RED), RGB::named(BLACK))
            } else if x == boundary && hp % 2 == 1 {
                bar_tile("RedGreen", point, RGB::named(GREEN), RGB::named(RED))
            } else {
                bar_tile("Green", point, RGB::named(GREEN), RGB::named(BLACK))
            }
        })
        .collect()
}

fn bar_tile(name: &'static str, point: Point, fg: RGB, bg: RGB) -> RenderTile {
    let glyph = if name == "RedGreen" {
        to_cp437('▐')
    } else {
        to_cp437('█')
    };
    RenderTile {
        name,
        point,
        layer: 0,
        glyph,
        fg,
        bg,
    }
}

/// Draws tiles in slice order, so later entries win shared cells.
pub fn draw_tiles(ctx: &mut BTerm, tiles: &[RenderTile], origin: Point) {
    let (screen_w, screen_h) = ctx.get_char_size();
    for tile in tiles {
        let screen_x = origin.x + tile.point.x;
        let screen_y = origin.y + tile.point.y;
        if screen_x < 0
            || screen_y < 0
            || screen_x >= screen_w as i32
            || screen_y >= screen_h as i32
        {
            continue;
        }
        ctx.set(screen_x, screen_y, tile.fg, tile.bg, tile.glyph);
    }
}

pub fn draw_status(ctx: &mut BTerm, level: &str, turns: u64, score: i32, top: i32) {
    ctx.print_color(
        2,
        top,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        format!("{level} · Turns {turns} · Score {score}"),
    );
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let shown = log.len().saturating_sub(5);
    let height = (log.len() as i32).min(5) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, top + 1, RGB::named(WHITE), RGB::named(BLACK), "Messages");
    for (row, entry) in log[shown..].iter().enumerate() {
        ctx.print(2, top + 2 + row as i32, entry);
    }
}
