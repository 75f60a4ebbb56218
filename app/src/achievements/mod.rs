use anyhow::Result;
use serde_json::Value;

use crate::services::Request;
use crate::store::Dataset;

mod models;

pub use self::models::{Achievement, AchievementSet, Condition, DishSeed, IngredientSeed, Reward};

/// Lists every achievement with its current lock state.
#[derive(Debug, Clone, Copy)]
pub struct ShowAchievements;

impl Request for ShowAchievements {
    type Resp = Vec<Achievement>;
}

impl Dataset for AchievementSet {
    const RESOURCE: &'static str = "logros_db.json";

    fn from_remote(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
