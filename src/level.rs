//! Text form of a level: a `GRID_HEIGHT`-line wall map followed by one
//! `Kind,x,y[,extra...]` record per dynamic element.
//!
//! The same grammar serves room files and the save written at each
//! checkpoint. A door printed with a key id is closed, one without is open.

use std::fmt;
use std::str::FromStr;

use bracket_geometry::prelude::Point;

use crate::{
    data::{GRID_HEIGHT, GRID_WIDTH, KeyId, LevelId, items::ItemKind, monsters::OpponentKind},
    error::{LoadError, LoadResult},
    map::{MapLayer, Tile},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Opponent {
        kind: OpponentKind,
        at: Point,
    },
    Item {
        kind: ItemKind,
        at: Point,
    },
    Door {
        at: Point,
        destination: LevelId,
        target: Point,
        key: Option<KeyId>,
    },
}

impl Record {
    pub fn at(&self) -> Point {
        match self {
            Record::Opponent { at, .. } | Record::Item { at, .. } | Record::Door { at, .. } => *at,
        }
    }

    /// Parses one record line. Unknown kind tags yield `Ok(None)`.
    pub fn parse(line: &str, line_no: usize) -> LoadResult<Option<Self>> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let tag = fields[0];
        let bad = |reason: String| LoadError::Record {
            line: line_no,
            reason,
        };
        let coord = |idx: usize| -> LoadResult<i32> {
            let raw = fields
                .get(idx)
                .ok_or_else(|| bad(format!("{tag} is missing field {idx}")))?;
            raw.parse::<i32>()
                .map_err(|_| bad(format!("{tag} field {idx} is not a number: {raw:?}")))
        };
        let text = |idx: usize| -> LoadResult<String> {
            fields
                .get(idx)
                .filter(|raw| !raw.is_empty())
                .map(|raw| raw.to_string())
                .ok_or_else(|| bad(format!("{tag} is missing field {idx}")))
        };

        let record = match tag {
            "Door" => Record::Door {
                at: Point::new(coord(1)?, coord(2)?),
                destination: LevelId(text(3)?),
                target: Point::new(coord(4)?, coord(5)?),
                key: fields
                    .get(6)
                    .filter(|raw| !raw.is_empty())
                    .map(|raw| KeyId::new(*raw)),
            },
            "Key" => Record::Item {
                kind: ItemKind::Key(KeyId(text(3)?)),
                at: Point::new(coord(1)?, coord(2)?),
            },
            "Armor" | "Sword" | "HealingPotion" | "Treasure" => {
                let kind = match tag {
                    "Armor" => ItemKind::Armor,
                    "Sword" => ItemKind::Sword,
                    "HealingPotion" => ItemKind::HealingPotion,
                    _ => ItemKind::Treasure,
                };
                Record::Item {
                    kind,
                    at: Point::new(coord(1)?, coord(2)?),
                }
            }
            other => match OpponentKind::from_tag(other) {
                Some(kind) => Record::Opponent {
                    kind,
                    at: Point::new(coord(1)?, coord(2)?),
                },
                None => {
                    tracing::debug!(line = line_no, tag = other, "skipping unknown element tag");
                    return Ok(None);
                }
            },
        };
        Ok(Some(record))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Opponent { kind, at } => write!(f, "{},{},{}", kind.as_str(), at.x, at.y),
            Record::Item { kind, at } => {
                write!(f, "{},{},{}", kind.as_str(), at.x, at.y)?;
                if let Some(key) = kind.key_id() {
                    write!(f, ",{key}")?;
                }
                Ok(())
            }
            Record::Door {
                at,
                destination,
                target,
                key,
            } => {
                write!(
                    f,
                    "Door,{},{},{},{},{}",
                    at.x, at.y, destination, target.x, target.y
                )?;
                if let Some(key) = key {
                    write!(f, ",{key}")?;
                }
                Ok(())
            }
        }
    }
}

/// A level's static layout plus its element records, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Blueprint {
    pub layer: MapLayer,
    pub records: Vec<Record>,
}

impl Blueprint {
    pub fn new(layer: MapLayer, records: Vec<Record>) -> Self {
        Self { layer, records }
    }
}

impl FromStr for Blueprint {
    type Err = LoadError;

    fn from_str(source: &str) -> LoadResult<Self> {
        let mut lines = source.lines();
        let mut layer = MapLayer::empty(GRID_WIDTH, GRID_HEIGHT);

        for y in 0..GRID_HEIGHT {
            let line_no = y as usize + 1;
            let row = lines.next().ok_or(LoadError::Layout {
                line: line_no,
                reason: format!("expected {GRID_HEIGHT} grid lines"),
            })?;
            let cells: Vec<char> = row.chars().collect();
            if cells.len() < GRID_WIDTH as usize {
                return Err(LoadError::Layout {
                    line: line_no,
                    reason: format!("{} cells, expected {GRID_WIDTH}", cells.len()),
                });
            }
            for (x, cell) in cells.iter().take(GRID_WIDTH as usize).enumerate() {
                if *cell == '#' {
                    layer.set_tile(Point::new(x as i32, y), Tile::wall());
                }
            }
        }

        let mut records = Vec::new();
        for (offset, line) in lines.enumerate() {
            let line_no = GRID_HEIGHT as usize + offset + 1;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(record) = Record::parse(line, line_no)? {
                records.push(record);
            }
        }

        Ok(Self { layer, records })
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.layer.height {
            for x in 0..self.layer.width {
                let cell = if self.layer.is_wall(Point::new(x, y)) {
                    '#'
                } else {
                    ' '
                };
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}
