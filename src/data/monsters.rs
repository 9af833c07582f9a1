use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpponentKind {
    Bat,
    Skeleton,
    Scorpio,
    Thug,
    Thief,
}

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub kind: OpponentKind,
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub power: i32,
    pub score: i32,
    pub layer: i32,
}

impl OpponentKind {
    pub const ALL: [OpponentKind; 5] = [
        OpponentKind::Bat,
        OpponentKind::Skeleton,
        OpponentKind::Scorpio,
        OpponentKind::Thug,
        OpponentKind::Thief,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentKind::Bat => "Bat",
            OpponentKind::Skeleton => "Skeleton",
            OpponentKind::Scorpio => "Scorpio",
            OpponentKind::Thug => "Thug",
            OpponentKind::Thief => "Thief",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn template(self) -> MonsterTemplate {
        match self {
            OpponentKind::Bat => {
                MonsterTemplate::new(self, 'b', RGB::from_u8(170, 120, 220), 3, 1, 35, 2)
            }
            OpponentKind::Skeleton => {
                MonsterTemplate::new(self, 's', RGB::from_u8(230, 230, 210), 5, 1, 65, 2)
            }
            OpponentKind::Scorpio => {
                MonsterTemplate::new(self, 'x', RGB::from_u8(126, 211, 33), 2, 0, 35, 2)
            }
            OpponentKind::Thug => {
                MonsterTemplate::new(self, 'T', RGB::from_u8(255, 95, 86), 10, 3, 85, 2)
            }
            OpponentKind::Thief => {
                MonsterTemplate::new(self, 't', RGB::from_u8(120, 98, 240), 5, 0, 75, 3)
            }
        }
    }
}

impl MonsterTemplate {
    fn new(
        kind: OpponentKind,
        glyph: char,
        color: RGB,
        hp: i32,
        power: i32,
        score: i32,
        layer: i32,
    ) -> Self {
        Self {
            kind,
            name: kind.as_str(),
            glyph,
            color,
            hp,
            power,
            score,
            layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsic_constants_match_the_bestiary() {
        let rows: Vec<(OpponentKind, i32, i32, i32)> = OpponentKind::ALL
            .into_iter()
            .map(|kind| {
                let t = kind.template();
                (kind, t.hp, t.power, t.score)
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (OpponentKind::Bat, 3, 1, 35),
                (OpponentKind::Skeleton, 5, 1, 65),
                (OpponentKind::Scorpio, 2, 0, 35),
                (OpponentKind::Thug, 10, 3, 85),
                (OpponentKind::Thief, 5, 0, 75),
            ]
        );
    }

    #[test]
    fn only_the_thief_draws_above_other_actors() {
        for kind in OpponentKind::ALL {
            let expected = if kind == OpponentKind::Thief { 3 } else { 2 };
            assert_eq!(kind.template().layer, expected, "{kind:?}");
        }
    }

    #[test]
    fn tags_round_trip_and_reject_unknown() {
        assert_eq!(OpponentKind::from_tag("Thug"), Some(OpponentKind::Thug));
        assert_eq!(OpponentKind::from_tag("Dragon"), None);
    }
}
