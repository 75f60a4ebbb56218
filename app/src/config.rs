use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use log::*;
use serde::{Deserialize, Serialize};
use url::Url;

use infra::persistence::FileStorage;
use infra::sources::{self, Source};

use crate::clock::DEFAULT_DATE_FORMAT;

pub const DEFAULT_SOURCE: &str =
    "https://djless.github.io/magordito_menu_semanal/calendario_menus_2025/data/";
const ENV_PREFIX: &str = "MEALPLAN_";

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DataConfig {
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    #[serde(default = "default_source")]
    pub source: Url,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

/// Settings that may be overridden from the environment, e.g.
/// `MEALPLAN_STORAGE_DIR=/tmp/state`.
#[derive(Deserialize, Debug, Default)]
struct Overrides {
    storage_dir: Option<PathBuf>,
    source: Option<Url>,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("state")
}

fn default_source() -> Url {
    Url::parse(DEFAULT_SOURCE).expect("default source is a valid url")
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            storage_dir: default_storage_dir(),
            source: default_source(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("parse config")?;
        config.data.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        let overrides: Overrides = envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("read environment overrides")?;
        self.apply(overrides);
        Ok(())
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.storage_dir {
            debug!("Storage dir from environment: {:?}", dir);
            self.data.storage_dir = dir;
        }
        if let Some(source) = overrides.source {
            debug!("Source from environment: {}", source);
            self.data.source = source;
        }
    }
}

impl DataConfig {
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| item == Item::Error) {
            bail!("invalid date_format: {:?}", self.date_format);
        }
        Ok(())
    }

    pub(crate) fn storage(&self) -> Result<FileStorage> {
        debug!("Build storage from {:?}", self);
        FileStorage::open(&self.storage_dir)
    }

    pub(crate) fn source(&self) -> Result<Box<dyn Source>> {
        sources::source_for(&self.source).with_context(|| format!("source {}", self.source))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    #[serde(default)]
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

impl LogLevel {
    fn to_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(&module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}
