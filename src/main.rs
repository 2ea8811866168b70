mod apple;
mod config;
mod game;
mod geometry;
mod input;
mod render;
mod snake;
mod term;

use std::fs::File;

use anyhow::{anyhow, Context, Result};
use log::info;
use simplelog::{LevelFilter, WriteLogger};

use crate::config::Config;
use crate::game::{Clock, SnakeGame};
use crate::term::TermManager;

pub type TermInt = u16;
pub type GridInt = u16;
pub type Cell = (GridInt, GridInt);

fn main() -> Result<()> {
    // The terminal belongs to the game, so logs go to a file
    let log_file = File::create(config::LOG_FILE)
        .with_context(|| format!("Error creating {}", config::LOG_FILE))?;
    WriteLogger::init(LevelFilter::Info, simplelog::Config::default(), log_file)
        .map_err(|e| anyhow!("Error initializing logger: {}", e))?;

    let config = Config::default();
    config.validate()?;
    let grid = config.grid();
    info!("Starting snake on a {}x{} grid at {} ticks/s", grid.width(), grid.height(), config.ticks_per_second);

    let mut clock = Clock::new(config.tick_period());
    let mut term = TermManager::open(&config)?;
    let mut game = SnakeGame::new(config, rand::thread_rng());

    // Quitting drops the terminal guard before returning
    let res = game::run(&mut term, &mut game, &mut clock);
    drop(term);

    info!("Exiting");
    res
}
