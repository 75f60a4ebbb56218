use anyhow::Result;
use serde_json::Value;

use crate::services::Request;
use crate::store::Dataset;

mod models;

pub use self::models::{Dish, Menu};

/// Lists the dishes currently on the menu.
#[derive(Debug, Clone, Copy)]
pub struct ShowMenu;

impl Request for ShowMenu {
    type Resp = Vec<Dish>;
}

impl Dataset for Menu {
    const RESOURCE: &'static str = "menu_db.json";

    fn from_remote(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
