//! Acquisition of the three datasets: a local snapshot when there is one,
//! otherwise a single fetch from the source, snapshotted locally for the
//! next session.

use anyhow::{Context, Result};
use log::*;
use serde_json::Value;

use infra::documents::Document;
use infra::persistence::{Documents, Storage};
use infra::sources::Source;

use crate::achievements::AchievementSet;
use crate::inventory::Inventory;
use crate::menu::Menu;
use crate::progress::AppState;

/// A document that can also be bootstrapped from a remote resource.
pub trait Dataset: Document {
    const RESOURCE: &'static str;

    fn from_remote(value: Value) -> Result<Self>;
}

#[derive(Debug)]
pub struct Store<S, R> {
    storage: S,
    source: R,
}

impl<S: Storage, R: Source> Store<S, R> {
    pub fn new(storage: S, source: R) -> Self {
        Store { storage, source }
    }

    /// Never fails; a dataset that cannot be had is logged and reported as
    /// absent. An unreadable local snapshot is discarded in favour of the
    /// source.
    pub fn load<D: Dataset>(&self) -> Option<D> {
        match self.storage.load::<D>() {
            Ok(Some(doc)) => {
                info!("{} loaded from local storage", D::KEY);
                return Some(doc);
            }
            Ok(None) => debug!("No local snapshot for {}", D::KEY),
            Err(e) => error!("Discarding unreadable snapshot {}: {:?}", D::KEY, e),
        }

        match self.fetch::<D>() {
            Ok(doc) => {
                info!("{} loaded from {}", D::KEY, D::RESOURCE);
                if let Err(e) = self.storage.save(&doc) {
                    error!("Could not snapshot {}: {:?}", D::KEY, e);
                }
                Some(doc)
            }
            Err(e) => {
                error!("Failed to load {}: {:?}", D::RESOURCE, e);
                None
            }
        }
    }

    fn fetch<D: Dataset>(&self) -> Result<D> {
        let value = self.source.fetch(D::RESOURCE)?;
        D::from_remote(value).with_context(|| format!("decode {}", D::RESOURCE))
    }

    pub fn load_all(&self) -> AppState {
        AppState {
            menu: self.load(),
            inventory: self.load(),
            achievements: self.load(),
        }
    }

    /// Forgets every local snapshot, so the next load goes back to the
    /// source.
    pub fn reset(&self) -> Result<()> {
        self.storage.forget::<Menu>()?;
        self.storage.forget::<Inventory>()?;
        self.storage.forget::<AchievementSet>()?;
        info!("Local snapshots removed");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::anyhow;
    use infra::persistence::MemStorage;
    use serde_json::json;

    #[derive(Default)]
    struct CountingSource {
        resources: HashMap<&'static str, Value>,
        fetched: RefCell<Vec<String>>,
    }

    impl Source for CountingSource {
        fn fetch(&self, resource: &str) -> Result<Value> {
            self.fetched.borrow_mut().push(resource.to_string());
            self.resources
                .get(resource)
                .cloned()
                .ok_or_else(|| anyhow!("404 {}", resource))
        }
    }

    fn source() -> CountingSource {
        let mut resources = HashMap::new();
        resources.insert(
            "menu_db.json",
            json!({"platos_principales": [{"nombre": "Paella"}]}),
        );
        resources.insert("inventario_db.json", json!({"inventario": [{"nombre": "Arroz"}]}));
        CountingSource {
            resources,
            ..Default::default()
        }
    }

    #[test]
    fn should_fetch_once_then_use_the_snapshot() {
        env_logger::try_init().unwrap_or_default();
        let source = source();
        let store = Store::new(MemStorage::new(), &source);

        let first = store.load::<Menu>().expect("menu");
        let second = store.load::<Menu>().expect("menu");

        assert_eq!(first, second);
        assert_eq!(*source.fetched.borrow(), vec!["menu_db.json".to_string()]);
        assert!(store.storage().get(Menu::KEY).expect("get").is_some());
    }

    #[test]
    fn local_snapshot_wins_over_the_source() {
        let source = source();
        let storage = MemStorage::new();
        storage
            .save(&Menu::with_dishes(vec![crate::menu::Dish::new("Local")]))
            .expect("save");
        let store = Store::new(storage, &source);

        let menu = store.load::<Menu>().expect("menu");

        assert!(menu.find("Local").is_some());
        assert!(source.fetched.borrow().is_empty());
    }

    #[test]
    fn unreadable_snapshot_falls_back_to_the_source() {
        let source = source();
        let storage = MemStorage::new();
        storage.set(Inventory::KEY, "[{").expect("set");
        let store = Store::new(storage, &source);

        let inventory = store.load::<Inventory>().expect("inventory");

        assert!(inventory.find("Arroz").is_some());
        assert_eq!(*source.fetched.borrow(), vec!["inventario_db.json".to_string()]);
    }

    #[test]
    fn failed_fetch_leaves_the_dataset_absent() {
        let source = source();
        let store = Store::new(MemStorage::new(), &source);

        let state = store.load_all();

        assert!(state.menu.is_some());
        assert!(state.inventory.is_some());
        assert!(state.achievements.is_none());
        assert!(store.storage().get(AchievementSet::KEY).expect("get").is_none());
    }

    #[test]
    fn reset_forgets_snapshots() {
        let source = source();
        let store = Store::new(MemStorage::new(), &source);
        store.load_all();

        store.reset().expect("reset");

        assert!(store.storage().get(Menu::KEY).expect("get").is_none());
        assert!(store.storage().get(Inventory::KEY).expect("get").is_none());
    }
}
