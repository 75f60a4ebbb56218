use std::fmt::{self, Write as _};
use std::io::Write;

use log::*;

use crate::achievements::{Achievement, AchievementSet};
use crate::inventory::Inventory;
use crate::menu::Menu;

/// Something the user should be told about as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    IngredientUnlocked(String),
    DishUnlocked(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notice::IngredientUnlocked(name) => {
                write!(fmt, "You unlocked a wildcard ingredient: {}!", name)
            }
            Notice::DishUnlocked(name) => write!(fmt, "You unlocked the dish recipe: {}!", name),
        }
    }
}

/// The presentation side of a session: where notices go, and which screens
/// are open and need redrawing after state changes.
pub trait Surface {
    fn notify(&mut self, notice: Notice);

    fn gallery_open(&self) -> bool {
        false
    }

    fn progress_open(&self) -> bool {
        false
    }

    fn render_gallery(&mut self, _menu: &Menu, _inventory: &Inventory) {}

    fn render_progress(&mut self, _achievements: &AchievementSet) {}
}

/// Headless: notices are only logged.
impl Surface for () {
    fn notify(&mut self, notice: Notice) {
        debug!("Notice: {}", notice);
    }
}

/// Writes notices as lines of text.
#[derive(Debug)]
pub struct Console<W> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Console { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for Console<W> {
    fn notify(&mut self, notice: Notice) {
        if let Err(e) = writeln!(self.out, "{}", notice) {
            warn!("Could not show notice {:?}: {}", notice, e);
        }
    }
}

fn render_achievement(out: &mut String, achievement: &Achievement, details: bool) -> fmt::Result {
    let marker = if achievement.unlocked { " ✨" } else { "" };
    let lock = if achievement.unlocked { "[x]" } else { "[ ]" };
    writeln!(out, "{} {}{}", lock, achievement.name, marker)?;
    writeln!(out, "    {}", achievement.description)?;
    if achievement.reward.is_some() {
        writeln!(out, "    ⭐️ Reward: exclusive dish")?;
    }
    if !details {
        return Ok(());
    }
    let condition = &achievement.condition;
    writeln!(out, "    Unlock condition:")?;
    writeln!(out, "      Metric: {}", condition.metric)?;
    match condition.min_value {
        Some(min) => write!(out, "      Required value: {}", min)?,
        None => write!(out, "      Required value: N/A")?,
    }
    match condition.param.as_deref() {
        Some(param) if !param.is_empty() => writeln!(out, " (with {})", param)?,
        _ => writeln!(out)?,
    }
    if achievement.unlocked {
        writeln!(
            out,
            "      Achieved! On: {}",
            achievement.unlocked_at.as_deref().unwrap_or("N/A")
        )?;
    } else {
        writeln!(out, "      Keep planning!")?;
    }
    Ok(())
}

/// The progress screen as text; `details` expands every achievement's
/// condition and unlock date.
pub fn render_progress(achievements: &[Achievement], details: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🏆 Achievements");
    for achievement in achievements {
        let _ = render_achievement(&mut out, achievement, details);
    }
    out
}

pub fn render_gallery(menu: Option<&Menu>, inventory: Option<&Inventory>) -> String {
    let mut out = String::new();
    let _ = write_gallery(&mut out, menu, inventory);
    out
}

fn write_gallery(out: &mut String, menu: Option<&Menu>, inventory: Option<&Inventory>) -> fmt::Result {
    match menu {
        Some(menu) => {
            writeln!(out, "📚 Main dishes")?;
            for dish in &menu.dishes {
                writeln!(out, "  {}", dish.name)?;
                writeln!(out, "    Carbs: {}", dish.carbs.join(", "))?;
                writeln!(out, "    Proteins: {}", dish.proteins.join(", "))?;
                writeln!(out, "    Vegetables: {}", dish.vegetables.join(", "))?;
            }
        }
        None => writeln!(out, "Menu data could not be loaded.")?,
    }
    writeln!(out)?;
    match inventory {
        Some(inventory) => {
            writeln!(out, "📦 Ingredient inventory")?;
            for item in inventory.iter() {
                let category = item
                    .category
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                let status = if item.in_stock() { "+" } else { "-" };
                writeln!(out, "  {} {} {} ({})", status, item.emoji, item.name, category)?;
                writeln!(
                    out,
                    "    Active: {}  Available: {}",
                    if item.active { "yes" } else { "no" },
                    item.available_quantity
                )?;
            }
        }
        None => writeln!(out, "Inventory data could not be loaded.")?,
    }
    Ok(())
}
