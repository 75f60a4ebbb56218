use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use infra::documents::Document;

use crate::normalize;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Dish {
    #[serde(rename = "nombre", alias = "name", default, deserialize_with = "normalize::text")]
    pub name: String,
    #[serde(
        rename = "carbohidratos",
        alias = "carbs",
        default,
        deserialize_with = "normalize::string_list"
    )]
    pub carbs: Vec<String>,
    #[serde(
        rename = "principales",
        alias = "proteins",
        default,
        deserialize_with = "normalize::string_list"
    )]
    pub proteins: Vec<String>,
    #[serde(
        rename = "verduras",
        alias = "vegetables",
        default,
        deserialize_with = "normalize::string_list"
    )]
    pub vegetables: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The menu document: the list of main dishes plus whatever else the data
/// file carries, which is kept as-is.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Menu {
    #[serde(
        rename = "platos_principales",
        alias = "dishes",
        default,
        deserialize_with = "normalize::record_list"
    )]
    pub dishes: Vec<Dish>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dish {
    pub fn new(name: &str) -> Self {
        Dish {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.carbs
            .iter()
            .chain(self.proteins.iter())
            .chain(self.vegetables.iter())
            .map(|s| s.as_str())
    }

    pub fn uses(&self, ingredient: &str) -> bool {
        self.components().any(|c| c == ingredient)
    }

    /// At least three of each of carbs, proteins and vegetables.
    pub fn has_nine_items(&self) -> bool {
        self.carbs.len() >= 3 && self.proteins.len() >= 3 && self.vegetables.len() >= 3
    }

    pub(crate) fn has_protein_or_vegetable(&self) -> bool {
        !self.proteins.is_empty() || !self.vegetables.is_empty()
    }
}

impl Menu {
    pub fn with_dishes(dishes: Vec<Dish>) -> Self {
        Menu {
            dishes,
            ..Default::default()
        }
    }

    pub fn find(&self, name: &str) -> Option<&Dish> {
        self.dishes.iter().find(|d| d.name == name)
    }

    /// Appends `dish` unless one with the same name is already listed.
    pub fn insert_new(&mut self, dish: Dish) -> bool {
        if self.find(&dish.name).is_some() {
            return false;
        }
        self.dishes.push(dish);
        true
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}

impl Document for Menu {
    const KEY: &'static str = "menuData";
}
