use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use infra::documents::Document;

use crate::normalize;

/// The metric an achievement watches and the threshold it must reach. A
/// condition without a usable threshold is never met.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Condition {
    #[serde(rename = "metrica", alias = "metric", default, deserialize_with = "normalize::text")]
    pub metric: String,
    #[serde(
        rename = "valor_minimo",
        alias = "minValue",
        default,
        deserialize_with = "normalize::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_value: Option<f64>,
    #[serde(
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub param: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Template for a wildcard ingredient. Every field is optional; the reward
/// synthesizer fills in the gaps.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct IngredientSeed {
    #[serde(
        rename = "nombre",
        alias = "name",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "activo",
        alias = "active",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>,
    #[serde(
        rename = "stock_inicial",
        alias = "stock",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock: Option<u32>,
    #[serde(
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub emoji: Option<String>,
    #[serde(
        rename = "vegetariano",
        alias = "vegetarian",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub vegetarian: Option<bool>,
    #[serde(
        rename = "vegano",
        alias = "vegan",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub vegan: Option<bool>,
    #[serde(
        rename = "pesciboro",
        alias = "pescetarian",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub pescetarian: Option<bool>,
    #[serde(
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub gourmet: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct DishSeed {
    #[serde(
        rename = "nombre",
        alias = "name",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Reward {
    #[serde(
        rename = "ingrediente_comodin",
        alias = "wildcardIngredient",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub wildcard_ingredient: Option<IngredientSeed>,
    #[serde(
        rename = "plato_nuevo",
        alias = "newDish",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub new_dish: Option<DishSeed>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Achievement {
    #[serde(default, deserialize_with = "normalize::text")]
    pub id: String,
    #[serde(rename = "nombre", alias = "name", default, deserialize_with = "normalize::text")]
    pub name: String,
    #[serde(
        rename = "descripcion",
        alias = "description",
        default,
        deserialize_with = "normalize::text"
    )]
    pub description: String,
    #[serde(
        rename = "condicion",
        alias = "condition",
        default,
        deserialize_with = "normalize::or_default",
        skip_serializing_if = "Condition::is_blank"
    )]
    pub condition: Condition,
    #[serde(
        rename = "recompensa",
        alias = "reward",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub reward: Option<Reward>,
    #[serde(
        rename = "obtenido",
        alias = "unlocked",
        default,
        deserialize_with = "normalize::or_default"
    )]
    pub unlocked: bool,
    #[serde(
        rename = "fecha_obtencion",
        alias = "unlockedAt",
        default,
        deserialize_with = "normalize::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub unlocked_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole achievement document, read and written as one unit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AchievementSet {
    #[serde(
        rename = "logros",
        alias = "achievements",
        default,
        deserialize_with = "normalize::record_list"
    )]
    pub achievements: Vec<Achievement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Condition {
    pub fn new(metric: &str, min_value: f64) -> Self {
        Condition {
            metric: metric.to_string(),
            min_value: Some(min_value),
            param: None,
            extra: Map::new(),
        }
    }

    /// Nothing was given for this condition; it is left out when written.
    pub fn is_blank(&self) -> bool {
        self.metric.is_empty()
            && self.min_value.is_none()
            && self.param.is_none()
            && self.extra.is_empty()
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }
}

impl IngredientSeed {
    pub fn named(name: &str) -> Self {
        IngredientSeed {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl DishSeed {
    pub fn named(name: &str) -> Self {
        DishSeed {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl Achievement {
    pub fn new(id: &str, name: &str, condition: Condition) -> Self {
        Achievement {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            condition,
            reward: None,
            unlocked: false,
            unlocked_at: None,
            extra: Map::new(),
        }
    }

    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Locked to unlocked, once. Returns false if it was already unlocked,
    /// in which case the original date is kept.
    pub(crate) fn unlock(&mut self, date: &str) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.unlocked_at = Some(date.to_string());
        true
    }
}

impl AchievementSet {
    pub fn new(achievements: Vec<Achievement>) -> Self {
        AchievementSet {
            achievements,
            ..Default::default()
        }
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }
}

impl Document for AchievementSet {
    const KEY: &'static str = "logrosData";
}
