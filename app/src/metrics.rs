//! Derived numeric facts about the current menu and inventory.
//!
//! A [`MetricSnapshot`] is rebuilt from scratch on every evaluation pass and
//! never stored. Every [`Metric`] has an entry in it, so a lookup by a known
//! name always succeeds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use err_derive::Error;

use crate::inventory::Inventory;
use crate::menu::{Dish, Menu};

/// Ingredient counted by the bare `dishes_with_ingredient_X` metric when a
/// condition does not name one.
pub const DEFAULT_TRACKED_INGREDIENT: &str = "Tocino";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    TotalDishesCreated,
    DishWithNineItems,
    DishesWithSingleCarb,
    DishesWithDoubleProtein,
    DishesWithTripleVegetable,
    DishesWithoutCarb,
    DishesWithTripleCarb,
    DishesWithIngredient,
    TotalInventoryItems,
    // Not tracked yet; these always read as untracked.
    UnrestrictedDish,
    TotalVegetarianDishes,
    DishesWithGourmet,
    NearlyDepletedIngredients,
    TotalPlannedDays,
    UniqueIngredientsPerWeek,
    TotalVeganDishes,
    ConsecutiveDaysWithDish,
}

// (metric, canonical name, Spanish name used by the data files)
const NAMES: &[(Metric, &str, &str)] = &[
    (Metric::TotalDishesCreated, "total_dishes_created", "total_platos_creados"),
    (Metric::DishWithNineItems, "dish_with_nine_items", "plato_con_nueve_items"),
    (Metric::DishesWithSingleCarb, "dishes_with_single_carb", "platos_con_solo_1_carbo"),
    (Metric::DishesWithDoubleProtein, "dishes_with_double_protein", "platos_con_doble_proteina"),
    (Metric::DishesWithTripleVegetable, "dishes_with_triple_vegetable", "platos_con_triple_verdura"),
    (Metric::DishesWithoutCarb, "dishes_without_carb", "platos_sin_carbohidrato"),
    (Metric::DishesWithTripleCarb, "dishes_with_triple_carb", "platos_con_triple_carbo"),
    (Metric::DishesWithIngredient, "dishes_with_ingredient_X", "platos_con_ingrediente_X"),
    (Metric::TotalInventoryItems, "total_inventory_items", "total_platos_registrados"),
    (Metric::UnrestrictedDish, "unrestricted_dish", "plato_sin_restriccion"),
    (Metric::TotalVegetarianDishes, "total_vegetarian_dishes", "total_platos_vegetarianos"),
    (Metric::DishesWithGourmet, "dishes_with_gourmet", "platos_con_gourmet"),
    (Metric::NearlyDepletedIngredients, "nearly_depleted_ingredients", "ingredientes_casi_agotados"),
    (Metric::TotalPlannedDays, "total_planned_days", "total_dias_planificados"),
    (Metric::UniqueIngredientsPerWeek, "unique_ingredients_per_week", "ingredientes_unicos_por_semana"),
    (Metric::TotalVeganDishes, "total_vegan_dishes", "total_platos_veganos"),
    (Metric::ConsecutiveDaysWithDish, "consecutive_days_with_dish", "dias_con_plato_asignado_continuo"),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(display = "unknown metric: {:?}", _0)]
pub struct UnknownMetric(pub String);

impl Metric {
    pub fn all() -> impl Iterator<Item = Metric> {
        NAMES.iter().map(|&(m, _, _)| m)
    }

    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|&&(m, _, _)| m == self)
            .map(|&(_, name, _)| name)
            .unwrap_or("unknown")
    }

    pub fn is_tracked(self) -> bool {
        match self {
            Metric::UnrestrictedDish
            | Metric::TotalVegetarianDishes
            | Metric::DishesWithGourmet
            | Metric::NearlyDepletedIngredients
            | Metric::TotalPlannedDays
            | Metric::UniqueIngredientsPerWeek
            | Metric::TotalVeganDishes
            | Metric::ConsecutiveDaysWithDish => false,
            _ => true,
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(name: &str) -> Result<Self, UnknownMetric> {
        NAMES
            .iter()
            .find(|&&(_, canonical, alias)| canonical == name || alias == name)
            .map(|&(m, _, _)| m)
            .ok_or_else(|| UnknownMetric(name.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

/// Untracked metrics have a name but can never satisfy a condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Untracked,
}

impl Reading {
    pub fn reaches(self, threshold: f64) -> bool {
        match self {
            Reading::Value(v) => v >= threshold,
            Reading::Untracked => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot<'a> {
    readings: BTreeMap<Metric, Reading>,
    menu: &'a Menu,
}

impl<'a> MetricSnapshot<'a> {
    pub fn reading(&self, metric: Metric) -> Reading {
        self.readings
            .get(&metric)
            .cloned()
            .unwrap_or(Reading::Untracked)
    }

    /// Number of dishes that list `ingredient` as a carb, protein or
    /// vegetable.
    pub fn dishes_with_ingredient(&self, ingredient: &str) -> usize {
        count(self.menu, |d| d.uses(ingredient))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Reading)> + '_ {
        self.readings.iter().map(|(&m, &r)| (m, r))
    }
}

fn count<F: Fn(&Dish) -> bool>(menu: &Menu, pred: F) -> usize {
    menu.dishes.iter().filter(|d| pred(d)).count()
}

pub fn compute_metrics<'a>(menu: &'a Menu, inventory: &Inventory) -> MetricSnapshot<'a> {
    let readings = Metric::all()
        .map(|metric| {
            let n = match metric {
                Metric::TotalDishesCreated => menu.len(),
                Metric::DishWithNineItems => {
                    if menu.dishes.iter().any(Dish::has_nine_items) {
                        1
                    } else {
                        0
                    }
                }
                Metric::DishesWithSingleCarb => {
                    count(menu, |d| d.carbs.len() == 1 && d.has_protein_or_vegetable())
                }
                Metric::DishesWithDoubleProtein => count(menu, |d| d.proteins.len() >= 2),
                Metric::DishesWithTripleVegetable => count(menu, |d| d.vegetables.len() >= 3),
                Metric::DishesWithoutCarb => {
                    count(menu, |d| d.carbs.is_empty() && d.has_protein_or_vegetable())
                }
                Metric::DishesWithTripleCarb => count(menu, |d| d.carbs.len() >= 3),
                Metric::DishesWithIngredient => {
                    count(menu, |d| d.uses(DEFAULT_TRACKED_INGREDIENT))
                }
                Metric::TotalInventoryItems => inventory.len(),
                untracked => return (untracked, Reading::Untracked),
            };
            (metric, Reading::Value(n as f64))
        })
        .collect();

    MetricSnapshot { readings, menu }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::inventory::{Category, Ingredient};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dish(name: &str, carbs: &[&str], proteins: &[&str], vegetables: &[&str]) -> Dish {
        Dish {
            carbs: strings(carbs),
            proteins: strings(proteins),
            vegetables: strings(vegetables),
            ..Dish::new(name)
        }
    }

    fn value(snapshot: &MetricSnapshot, metric: Metric) -> f64 {
        match snapshot.reading(metric) {
            Reading::Value(v) => v,
            Reading::Untracked => panic!("{} should be tracked", metric),
        }
    }

    #[test]
    fn empty_menu_has_zero_counts() {
        let menu = Menu::default();
        let snapshot = compute_metrics(&menu, &Inventory::default());

        assert_eq!(value(&snapshot, Metric::TotalDishesCreated), 0.0);
        assert_eq!(value(&snapshot, Metric::DishWithNineItems), 0.0);
        assert_eq!(value(&snapshot, Metric::TotalInventoryItems), 0.0);
    }

    #[test]
    fn counts_dish_shapes() {
        let menu = Menu::with_dishes(vec![
            dish("Nueve", &["Arroz", "Pasta", "Pan"], &["Pollo", "Ternera", "Tofu"], &["Zanahoria", "Guisante", "Espinaca"]),
            dish("Solo carbo", &["Arroz"], &[], &[]),
            dish("Un carbo", &["Arroz"], &["Pollo"], &[]),
            dish("Sin carbo", &[], &[], &["Lechuga"]),
            dish("Vacio", &[], &[], &[]),
            dish("Doble", &["Pan"], &["Pollo", "Tocino"], &["Tomate", "Cebolla", "Pimiento"]),
        ]);
        let inventory = Inventory::with_items(vec![
            Ingredient::new("Pollo", Category::Principal),
            Ingredient::new("Arroz", Category::Carb),
        ]);
        let snapshot = compute_metrics(&menu, &inventory);

        assert_eq!(value(&snapshot, Metric::TotalDishesCreated), 6.0);
        assert_eq!(value(&snapshot, Metric::DishWithNineItems), 1.0);
        assert_eq!(value(&snapshot, Metric::DishesWithSingleCarb), 2.0);
        assert_eq!(value(&snapshot, Metric::DishesWithDoubleProtein), 2.0);
        assert_eq!(value(&snapshot, Metric::DishesWithTripleVegetable), 2.0);
        assert_eq!(value(&snapshot, Metric::DishesWithoutCarb), 1.0);
        assert_eq!(value(&snapshot, Metric::DishesWithTripleCarb), 1.0);
        assert_eq!(value(&snapshot, Metric::DishesWithIngredient), 1.0);
        assert_eq!(value(&snapshot, Metric::TotalInventoryItems), 2.0);
        assert_eq!(snapshot.dishes_with_ingredient("Pollo"), 3);
        assert_eq!(snapshot.dishes_with_ingredient("Arroz"), 3);
        assert_eq!(snapshot.dishes_with_ingredient("Caviar"), 0);
    }

    #[test]
    fn nine_items_needs_three_of_each() {
        let menu = Menu::with_dishes(vec![dish(
            "Casi",
            &["Arroz", "Pasta", "Pan"],
            &["Pollo", "Ternera", "Tofu", "Huevo"],
            &["Zanahoria", "Guisante"],
        )]);
        let snapshot = compute_metrics(&menu, &Inventory::default());

        assert_eq!(value(&snapshot, Metric::DishWithNineItems), 0.0);
    }

    #[test]
    fn every_metric_has_a_reading() {
        let menu = Menu::default();
        let snapshot = compute_metrics(&menu, &Inventory::default());

        assert_eq!(snapshot.iter().count(), Metric::all().count());
        for metric in Metric::all() {
            assert_eq!(snapshot.reading(metric) == Reading::Untracked, !metric.is_tracked());
        }
    }

    #[test]
    fn untracked_metrics_never_reach_a_threshold() {
        assert!(!Reading::Untracked.reaches(0.0));
        assert!(!Reading::Untracked.reaches(-1.0));
        assert!(Reading::Value(0.0).reaches(0.0));
    }

    #[test]
    fn computing_twice_gives_the_same_snapshot() {
        let menu = Menu::with_dishes(vec![dish("Sopa", &[], &["Pollo"], &["Apio"])]);
        let inventory = Inventory::with_items(vec![Ingredient::new("Apio", Category::Vegetable)]);

        assert_eq!(compute_metrics(&menu, &inventory), compute_metrics(&menu, &inventory));
    }

    #[test]
    fn names_parse_in_both_vocabularies() {
        for metric in Metric::all() {
            assert_eq!(metric.name().parse::<Metric>(), Ok(metric));
        }
        assert_eq!("plato_con_nueve_items".parse::<Metric>(), Ok(Metric::DishWithNineItems));
        assert_eq!("total_platos_registrados".parse::<Metric>(), Ok(Metric::TotalInventoryItems));
        assert_eq!(
            "platos_flotantes".parse::<Metric>(),
            Err(UnknownMetric("platos_flotantes".to_string()))
        );
    }
}
