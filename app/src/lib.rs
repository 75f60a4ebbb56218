use anyhow::Result;
use log::*;

use infra::persistence::FileStorage;
use infra::sources::Source;

pub mod achievements;
pub mod clock;
pub mod conditions;
pub mod config;
pub mod inventory;
pub mod menu;
pub mod metrics;
mod normalize;
pub mod progress;
pub mod rewards;
pub mod services;
pub mod store;
pub mod view;

use crate::clock::SystemClock;
use crate::progress::Progress;
use crate::store::Store;
use crate::view::Surface;

pub struct MealPlan {
    storage: FileStorage,
    source: Box<dyn Source>,
    date_format: String,
}

impl MealPlan {
    pub fn new(config: &config::Config) -> Result<Self> {
        config.data.validate()?;
        let storage = config.data.storage()?;
        let source = config.data.source()?;
        debug!("Using source {}", config.data.source);

        Ok(MealPlan {
            storage,
            source,
            date_format: config.data.date_format.clone(),
        })
    }

    pub fn store(&self) -> Store<&FileStorage, &dyn Source> {
        Store::new(&self.storage, self.source.as_ref())
    }

    /// Loads the session's datasets and hands them to a new progress
    /// synchronizer that saves into this plan's storage.
    pub fn progress<V: Surface>(&self, surface: V) -> Progress<&FileStorage, V, SystemClock> {
        info!("Loading menu, inventory and achievements");
        let state = self.store().load_all();
        Progress::new(state, &self.storage, surface, SystemClock).with_date_format(&self.date_format)
    }

    pub fn reset(&self) -> Result<()> {
        self.store().reset()
    }
}
