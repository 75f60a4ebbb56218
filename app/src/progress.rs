//! Evaluation passes over a loaded session.
//!
//! The menu, inventory and achievement set are persisted under separate
//! keys, one after the other. If the process dies part way through a pass
//! the snapshots can disagree (say, an achievement saved as locked whose
//! ingredient is already stocked). The next `initial_sync` + `evaluate`
//! brings them back in line, because reward synthesis is keyed by name.

use anyhow::{anyhow, Result};
use log::*;

use infra::documents::Document;
use infra::persistence::{Documents, Storage};

use crate::achievements::{Achievement, AchievementSet, Reward, ShowAchievements};
use crate::clock::{format_date, Clock, DEFAULT_DATE_FORMAT};
use crate::conditions;
use crate::inventory::{Ingredient, Inventory, ShowInventory};
use crate::menu::{Dish, Menu, ShowMenu};
use crate::metrics::compute_metrics;
use crate::rewards::{self, NotifyMode, RewardOutcome};
use crate::services::{Commandable, Queryable, Request};
use crate::view::{Notice, Surface};

/// Everything a session works on. A dataset that failed to load is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub menu: Option<Menu>,
    pub inventory: Option<Inventory>,
    pub achievements: Option<AchievementSet>,
}

impl AppState {
    pub fn is_loaded(&self) -> bool {
        self.menu.is_some() && self.inventory.is_some() && self.achievements.is_some()
    }
}

#[derive(Debug)]
pub struct Progress<S, V, C> {
    state: AppState,
    storage: S,
    surface: V,
    clock: C,
    date_format: String,
}

/// Replays earlier rewards, then unlocks whatever is newly satisfied.
#[derive(Debug, Clone, Copy)]
pub struct SyncProgress;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub replayed: Vec<RewardOutcome>,
    pub unlocked: Vec<String>,
}

impl Request for SyncProgress {
    type Resp = SyncReport;
}

fn persist<S: Storage, D: Document>(storage: &S, doc: &D) {
    if let Err(e) = storage.save(doc) {
        error!("Could not persist {}: {:?}", D::KEY, e);
    }
}

impl<S: Storage, V: Surface, C: Clock> Progress<S, V, C> {
    pub fn new(state: AppState, storage: S, surface: V, clock: C) -> Self {
        Progress {
            state,
            storage,
            surface,
            clock,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_date_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn into_state(self) -> AppState {
        self.state
    }

    /// Materializes the rewards of achievements that were already unlocked
    /// when the session was loaded, without notifying. Rewards that exist
    /// already are left alone, so this is safe to run on every start.
    pub fn initial_sync(&mut self) -> Vec<RewardOutcome> {
        if !self.state.is_loaded() {
            warn!("Data needed for the initial reward sync is not loaded");
            return Vec::new();
        }
        let rewards = self
            .state
            .achievements
            .iter()
            .flat_map(|set| set.unlocked())
            .filter_map(|a| a.reward.clone())
            .collect::<Vec<_>>();

        let outcomes = rewards
            .iter()
            .map(|reward| self.apply_reward(reward, NotifyMode::Silent))
            .collect::<Vec<_>>();
        if !outcomes.is_empty() {
            info!("Initial reward sync done ({} rewards replayed)", outcomes.len());
        }
        outcomes
    }

    /// Runs one evaluation pass: unlocks satisfied achievements, grants
    /// their rewards interactively and saves the achievement set. Returns
    /// the ids of the achievements unlocked by this pass.
    ///
    /// Metrics are computed once, before any reward is granted, so a dish
    /// added by a reward counts from the next pass on.
    pub fn evaluate(&mut self) -> Vec<String> {
        let today = format_date(self.clock.today(), &self.date_format);
        let (newly, rewards) = match &mut self.state {
            AppState {
                menu: Some(menu),
                inventory: Some(inventory),
                achievements: Some(set),
            } => {
                let metrics = compute_metrics(menu, inventory);
                let newly = conditions::evaluate(&mut set.achievements, &metrics, &today);
                let rewards = set
                    .achievements
                    .iter()
                    .filter(|a| a.unlocked && newly.contains(&a.id))
                    .filter_map(|a| a.reward.clone())
                    .collect::<Vec<_>>();
                (newly, rewards)
            }
            _ => {
                warn!("Data needed for achievement evaluation is not loaded");
                return Vec::new();
            }
        };
        if newly.is_empty() {
            return newly;
        }

        for reward in &rewards {
            self.apply_reward(reward, NotifyMode::Interactive);
        }

        if let Some(set) = &self.state.achievements {
            persist(&self.storage, set);
            if self.surface.progress_open() {
                self.surface.render_progress(set);
            }
        }
        newly
    }

    /// Grants one reward. Each collection that gains an entry is saved
    /// straight away.
    pub fn apply_reward(&mut self, reward: &Reward, mode: NotifyMode) -> RewardOutcome {
        let (menu, inventory) = match (self.state.menu.as_mut(), self.state.inventory.as_mut()) {
            (Some(menu), Some(inventory)) => (menu, inventory),
            _ => {
                warn!("Cannot grant a reward before menu and inventory are loaded");
                return RewardOutcome::default();
            }
        };

        let outcome = rewards::apply_reward(reward, inventory, menu);

        if let Some(name) = &outcome.ingredient {
            persist(&self.storage, &*inventory);
            if mode == NotifyMode::Interactive {
                self.surface.notify(Notice::IngredientUnlocked(name.clone()));
            }
        }
        if let Some(name) = &outcome.dish {
            persist(&self.storage, &*menu);
            if mode == NotifyMode::Interactive {
                self.surface.notify(Notice::DishUnlocked(name.clone()));
            }
        }
        if outcome.changed() && self.surface.gallery_open() {
            self.surface.render_gallery(menu, inventory);
        }
        outcome
    }
}

impl<S: Storage, V: Surface, C: Clock> Commandable<SyncProgress> for Progress<S, V, C> {
    fn execute(&mut self, _: SyncProgress) -> Result<SyncReport> {
        if !self.state.is_loaded() {
            warn!("Sync requested with incomplete data; nothing to do");
        }
        let replayed = self.initial_sync();
        let unlocked = self.evaluate();
        Ok(SyncReport { replayed, unlocked })
    }
}

impl<S, V, C> Queryable<ShowMenu> for Progress<S, V, C> {
    fn query(&self, _: ShowMenu) -> Result<Vec<Dish>> {
        let menu = self.state.menu.as_ref().ok_or_else(|| anyhow!("menu not loaded"))?;
        Ok(menu.dishes.clone())
    }
}

impl<S, V, C> Queryable<ShowInventory> for Progress<S, V, C> {
    fn query(&self, _: ShowInventory) -> Result<Vec<Ingredient>> {
        let inventory = self
            .state
            .inventory
            .as_ref()
            .ok_or_else(|| anyhow!("inventory not loaded"))?;
        Ok(inventory.items.clone())
    }
}

impl<S, V, C> Queryable<ShowAchievements> for Progress<S, V, C> {
    fn query(&self, _: ShowAchievements) -> Result<Vec<Achievement>> {
        let set = self
            .state
            .achievements
            .as_ref()
            .ok_or_else(|| anyhow!("achievements not loaded"))?;
        Ok(set.achievements.clone())
    }
}
