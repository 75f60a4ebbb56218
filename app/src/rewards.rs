//! Turns achievement rewards into concrete inventory and menu entries.
//!
//! Synthesis is deterministic and keyed by name: applying the same reward
//! twice leaves the second call with nothing to do. Missing or malformed
//! reward parts are skipped.

use log::*;

use crate::achievements::{DishSeed, IngredientSeed, Reward};
use crate::inventory::{Category, DietaryFlags, Ingredient, Inventory};
use crate::menu::{Dish, Menu};

pub const WILDCARD_EMOJI: &str = "✨";

/// Whether the user is told about what a reward adds. Replays of rewards
/// that were granted in an earlier session are silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    Silent,
    Interactive,
}

/// Names of the entries a reward actually inserted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewardOutcome {
    pub ingredient: Option<String>,
    pub dish: Option<String>,
}

impl RewardOutcome {
    pub fn ingredient_added(&self) -> bool {
        self.ingredient.is_some()
    }

    pub fn dish_added(&self) -> bool {
        self.dish.is_some()
    }

    pub fn changed(&self) -> bool {
        self.ingredient_added() || self.dish_added()
    }
}

fn seed_name(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

/// Always a principal ingredient.
pub fn wildcard_ingredient(seed: &IngredientSeed) -> Option<Ingredient> {
    let name = seed_name(&seed.name)?;
    let defaults = DietaryFlags::default();
    let mut item = Ingredient::new(name, Category::Principal);
    item.active = seed.active.unwrap_or(true);
    item.available_quantity = seed.stock.filter(|&n| n > 0).unwrap_or(1);
    item.emoji = seed
        .emoji
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| WILDCARD_EMOJI.to_string());
    item.set_diet(DietaryFlags {
        vegetarian: seed.vegetarian.unwrap_or(defaults.vegetarian),
        vegan: seed.vegan.unwrap_or(defaults.vegan),
        pescetarian: seed.pescetarian.unwrap_or(defaults.pescetarian),
        gourmet: seed.gourmet.unwrap_or(defaults.gourmet),
    });
    Some(item)
}

pub fn bonus_dish_name(base: &str, ingredient: &str) -> String {
    format!("{} {} ({})", WILDCARD_EMOJI, base, ingredient)
}

/// A reward-only dish: the wildcard ingredient is its one protein, and it
/// has no carbs or vegetables.
pub fn bonus_dish(seed: &DishSeed, ingredient: &str) -> Option<Dish> {
    let base = seed_name(&seed.name)?;
    Some(Dish {
        proteins: vec![ingredient.to_string()],
        ..Dish::new(&bonus_dish_name(base, ingredient))
    })
}

/// Inserts the reward's wildcard ingredient and then its bonus dish, each
/// only if nothing of the same name exists yet.
///
/// The dish needs the ingredient's name, so a reward with a dish but no
/// usable ingredient adds nothing. The dish is still attempted when the
/// ingredient was already stocked.
pub fn apply_reward(reward: &Reward, inventory: &mut Inventory, menu: &mut Menu) -> RewardOutcome {
    let mut outcome = RewardOutcome::default();

    let ingredient = match reward.wildcard_ingredient.as_ref().and_then(wildcard_ingredient) {
        Some(ingredient) => ingredient,
        None => {
            if reward.new_dish.is_some() {
                debug!("Bonus dish without a wildcard ingredient; skipping");
            }
            return outcome;
        }
    };
    let ingredient_name = ingredient.name.clone();

    if inventory.insert_new(ingredient) {
        info!("Wildcard ingredient unlocked: {}", ingredient_name);
        outcome.ingredient = Some(ingredient_name.clone());
    }

    if let Some(dish) = reward
        .new_dish
        .as_ref()
        .and_then(|seed| bonus_dish(seed, &ingredient_name))
    {
        let dish_name = dish.name.clone();
        if menu.insert_new(dish) {
            info!("Bonus dish unlocked: {}", dish_name);
            outcome.dish = Some(dish_name);
        }
    }

    outcome
}
