use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use infra::documents::Document;

use crate::normalize;
use crate::services::Request;
use crate::store::Dataset;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Principal,
    Carb,
    Vegetable,
    Other(String),
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.as_str() {
            "principal" => Category::Principal,
            "carbohidrato" => Category::Carb,
            "verdura" => Category::Vegetable,
            _ => Category::Other(name),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Principal => "principal".to_string(),
            Category::Carb => "carbohidrato".to_string(),
            Category::Vegetable => "verdura".to_string(),
            Category::Other(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Category::Principal => write!(fmt, "principal"),
            Category::Carb => write!(fmt, "carbohidrato"),
            Category::Vegetable => write!(fmt, "verdura"),
            Category::Other(name) => write!(fmt, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DietaryFlags {
    pub vegetarian: bool,
    pub vegan: bool,
    pub pescetarian: bool,
    pub gourmet: bool,
}

/// Permissive but not vegan.
impl Default for DietaryFlags {
    fn default() -> Self {
        DietaryFlags {
            vegetarian: false,
            vegan: false,
            pescetarian: true,
            gourmet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "nombre", alias = "name", default, deserialize_with = "normalize::text")]
    pub name: String,
    #[serde(
        rename = "categoria",
        alias = "category",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Category>,
    #[serde(
        rename = "activo",
        alias = "active",
        default = "active_by_default",
        deserialize_with = "active_flag"
    )]
    pub active: bool,
    #[serde(
        rename = "cantidad_disponible",
        alias = "availableQuantity",
        default,
        deserialize_with = "normalize::quantity"
    )]
    pub available_quantity: u32,
    #[serde(default, deserialize_with = "normalize::text")]
    pub emoji: String,
    #[serde(
        rename = "vegetariano",
        alias = "vegetarian",
        default,
        deserialize_with = "normalize::or_default"
    )]
    pub vegetarian: bool,
    #[serde(
        rename = "vegano",
        alias = "vegan",
        default,
        deserialize_with = "normalize::or_default"
    )]
    pub vegan: bool,
    #[serde(
        rename = "pesciboro",
        alias = "pescetarian",
        default,
        deserialize_with = "normalize::or_default"
    )]
    pub pescetarian: bool,
    #[serde(default, deserialize_with = "normalize::or_default")]
    pub gourmet: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn active_by_default() -> bool {
    true
}

fn active_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    normalize::or_else(de, active_by_default)
}

impl Ingredient {
    pub fn new(name: &str, category: Category) -> Self {
        Ingredient {
            name: name.to_string(),
            category: Some(category),
            active: true,
            available_quantity: 0,
            emoji: String::new(),
            vegetarian: false,
            vegan: false,
            pescetarian: false,
            gourmet: false,
            extra: Map::new(),
        }
    }

    pub fn diet(&self) -> DietaryFlags {
        DietaryFlags {
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            pescetarian: self.pescetarian,
            gourmet: self.gourmet,
        }
    }

    pub fn set_diet(&mut self, diet: DietaryFlags) {
        self.vegetarian = diet.vegetarian;
        self.vegan = diet.vegan;
        self.pescetarian = diet.pescetarian;
        self.gourmet = diet.gourmet;
    }

    pub fn in_stock(&self) -> bool {
        self.active && self.available_quantity > 0
    }
}

/// The ingredient inventory. Stored locally as a bare array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    #[serde(deserialize_with = "normalize::record_list")]
    pub items: Vec<Ingredient>,
}

impl Inventory {
    pub fn with_items(items: Vec<Ingredient>) -> Self {
        Inventory { items }
    }

    pub fn find(&self, name: &str) -> Option<&Ingredient> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Appends `item` unless one with the same name is already stocked.
    pub fn insert_new(&mut self, item: Ingredient) -> bool {
        if self.find(&item.name).is_some() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.items.iter()
    }
}

impl Document for Inventory {
    const KEY: &'static str = "inventarioData";
}

#[derive(Deserialize)]
struct RemoteInventory {
    #[serde(alias = "inventory", deserialize_with = "normalize::record_list")]
    inventario: Vec<Ingredient>,
}

impl Dataset for Inventory {
    const RESOURCE: &'static str = "inventario_db.json";

    fn from_remote(value: Value) -> Result<Self> {
        let remote: RemoteInventory =
            serde_json::from_value(value).context("expected an `inventario` list")?;
        Ok(Inventory {
            items: remote.inventario,
        })
    }
}

/// Lists the ingredients in the inventory.
#[derive(Debug, Clone, Copy)]
pub struct ShowInventory;

impl Request for ShowInventory {
    type Resp = Vec<Ingredient>;
}
