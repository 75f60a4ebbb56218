use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

use mealplan::achievements::ShowAchievements;
use mealplan::inventory::ShowInventory;
use mealplan::menu::ShowMenu;
use mealplan::progress::SyncProgress;
use mealplan::services::{Commandable, Queryable};
use mealplan::view::{self, Console};

#[derive(Debug, StructOpt)]
#[structopt(name = "mp", about = "Weekly menu planner achievements.")]
struct Opt {
    /// Config file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "sync", about = "Replay granted rewards and unlock new achievements")]
    Sync,
    #[structopt(name = "achievements", about = "Show achievements")]
    Achievements {
        /// Show unlock conditions and dates
        #[structopt(long = "details")]
        details: bool,
    },
    #[structopt(name = "gallery", about = "Show dishes and inventory")]
    Gallery,
    #[structopt(name = "reset", about = "Forget local snapshots")]
    Reset,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    mealplan: mealplan::config::Config,
    #[serde(default)]
    env_logger: mealplan::config::EnvLogger,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let config_buf =
        fs::read_to_string(&opt.config).with_context(|| format!("read {:?}", opt.config))?;
    let mut config: Config = toml::from_str(&config_buf)?;
    config.mealplan.apply_env()?;

    config.env_logger.builder().init();

    let mp = mealplan::MealPlan::new(&config.mealplan)?;

    match opt.command {
        Commands::Sync => {
            let mut progress = mp.progress(Console::new(io::stdout()));
            let report = progress.execute(SyncProgress)?;
            println!(
                "Replayed {} earlier rewards; unlocked {} achievements.",
                report.replayed.len(),
                report.unlocked.len()
            );
            for id in report.unlocked {
                println!("  {}", id);
            }
        }
        Commands::Achievements { details } => {
            let progress = mp.progress(());
            match progress.query(ShowAchievements) {
                Ok(list) => print!("{}", view::render_progress(&list, details)),
                Err(e) => {
                    error!("{:?}", e);
                    println!("Achievement data could not be loaded.");
                }
            }
        }
        Commands::Gallery => {
            let progress = mp.progress(());
            let menu = progress.query(ShowMenu).ok().map(mealplan::menu::Menu::with_dishes);
            let inventory = progress
                .query(ShowInventory)
                .ok()
                .map(mealplan::inventory::Inventory::with_items);
            print!("{}", view::render_gallery(menu.as_ref(), inventory.as_ref()));
        }
        Commands::Reset => {
            mp.reset()?;
            println!("Local snapshots removed.");
        }
    }

    Ok(())
}
