use log::*;

use crate::achievements::{Achievement, Condition};
use crate::metrics::{Metric, MetricSnapshot, Reading};

/// Reads the value a condition is compared against. A parameterized
/// `dishes_with_ingredient_X` counts the named ingredient instead of the
/// default one; an unknown metric reads as zero.
pub fn measure(condition: &Condition, metrics: &MetricSnapshot) -> Reading {
    let param = condition.param.as_deref().filter(|p| !p.is_empty());
    match (condition.metric.parse::<Metric>(), param) {
        (Ok(Metric::DishesWithIngredient), Some(ingredient)) => {
            Reading::Value(metrics.dishes_with_ingredient(ingredient) as f64)
        }
        (Ok(metric), _) => metrics.reading(metric),
        (Err(e), _) => {
            warn!("{}; reading it as 0", e);
            Reading::Value(0.0)
        }
    }
}

/// A condition without a threshold is never satisfied.
pub fn is_satisfied(condition: &Condition, metrics: &MetricSnapshot) -> bool {
    match condition.min_value {
        Some(threshold) => measure(condition, metrics).reaches(threshold),
        None => {
            debug!("No threshold for {:?}; not satisfied", condition.metric);
            false
        }
    }
}

/// Unlocks every locked achievement whose condition holds, stamping it with
/// `today`, and returns their ids in definition order. Achievements that are
/// already unlocked are not looked at again.
///
/// Nothing is persisted or rendered here.
pub fn evaluate(achievements: &mut [Achievement], metrics: &MetricSnapshot, today: &str) -> Vec<String> {
    let mut newly = Vec::new();
    for achievement in achievements.iter_mut().filter(|a| !a.unlocked) {
        if !is_satisfied(&achievement.condition, metrics) {
            continue;
        }
        if achievement.unlock(today) {
            info!("Achievement unlocked: {} ({})", achievement.name, achievement.id);
            newly.push(achievement.id.clone());
        }
    }
    newly
}
