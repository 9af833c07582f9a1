use specs::prelude::Entity;

use super::{Flow, Session};
use crate::{
    ai::{self, Behavior},
    data::{
        ARMOR_PASS_CHANCE, HeroStatus, POISON_DAMAGE,
        items::{ItemKind, SWORD_MULTIPLIER},
        monsters::OpponentKind,
    },
    ecs::components::Element,
};

impl Session {
    /// Hero attack power: base power, doubled while a sword is held.
    pub fn hero_power(&self) -> i32 {
        let base = self
            .world
            .stats(self.world.hero())
            .map(|stats| stats.power)
            .unwrap_or_default();
        if self.world.holds(|kind| *kind == ItemKind::Sword) {
            base * SWORD_MULTIPLIER
        } else {
            base
        }
    }

    pub(super) fn hero_attack(&mut self, target: Entity, kind: OpponentKind) -> Flow {
        let damage = self.hero_power();
        let Some(remaining) = self.world.damage(target, damage) else {
            return Flow::Continue;
        };
        let template = kind.template();
        self.world
            .log(format!("You hit the {} for {damage}.", template.name));
        tracing::info!(target = template.name, damage, remaining, "hero attacks");

        if remaining == 0 {
            if let (Some(Behavior::Thief { loot: Some(item), .. }), Some(position)) =
                (self.world.behavior(target), self.world.position(target))
            {
                tracing::debug!(item = item.as_str(), "thief drops its loot");
                self.world
                    .spawn(Element::Item(item), position.point, position.level);
            }
            self.world.delete(target);
            self.score += template.score;
            self.world.log(format!(
                "The {} dies. +{} points.",
                template.name, template.score
            ));
            tracing::info!(target = template.name, score = self.score, "opponent slain");
        }
        Flow::Continue
    }

    /// An opponent strikes the hero. Armor first decides whether the blow
    /// can land at all, then the attacker rolls its own attack.
    pub(super) fn opponent_attack(&mut self, attacker: Entity, kind: OpponentKind) -> Flow {
        let template = kind.template();
        if self.world.holds(|item| *item == ItemKind::Armor)
            && !self.dice.chance(ARMOR_PASS_CHANCE)
        {
            self.world
                .log(format!("Your armor turns the {}'s blow.", template.name));
            return Flow::Continue;
        }

        let power = self
            .world
            .stats(attacker)
            .map(|stats| stats.power)
            .unwrap_or_default();
        let strike = ai::strike(kind, power, self.dice.as_mut());
        tracing::info!(
            attacker = template.name,
            damage = strike.damage,
            leech = strike.leech,
            poisons = strike.poisons,
            "opponent attacks"
        );

        if strike.leech > 0 {
            self.world.heal(attacker, strike.leech);
        }
        if strike.poisons {
            self.world.set_hero_status(HeroStatus::Poisoned);
            self.world
                .log(format!("The {} poisons you!", template.name));
        }
        if strike.damage == 0 {
            return Flow::Continue;
        }

        let hero = self.world.hero();
        let remaining = self.world.damage(hero, strike.damage).unwrap_or_default();
        self.world.log(format!(
            "The {} hits you for {}.",
            template.name, strike.damage
        ));
        if remaining == 0 {
            tracing::info!(attacker = template.name, "hero slain");
            return self.restore_checkpoint();
        }
        Flow::Continue
    }

    /// Poison bites before the hero acts. A lethal bite rewinds the level.
    pub(super) fn poison_tick(&mut self) -> Flow {
        if self.world.hero_status() != HeroStatus::Poisoned {
            return Flow::Continue;
        }
        let hero = self.world.hero();
        let remaining = self.world.damage(hero, POISON_DAMAGE).unwrap_or_default();
        self.world.log("The poison burns.");
        if remaining == 0 {
            tracing::info!("hero succumbed to poison");
            return self.restore_checkpoint();
        }
        Flow::Continue
    }
}
