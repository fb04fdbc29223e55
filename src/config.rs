//! World configuration with a bincode file round-trip.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_INSTALLS_PER_TICK, STREAM_RADIUS};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorldSettings {
    pub seed: u32,
    pub radius: i32,
    /// Worker thread override; `None` sizes the pool from the CPU count.
    #[serde(default)]
    pub workers: Option<usize>,
    /// How many finished chunks a single tick may install.
    #[serde(default = "default_install_budget")]
    pub install_budget: usize,
}

fn default_install_budget() -> usize {
    MAX_INSTALLS_PER_TICK
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            radius: STREAM_RADIUS,
            workers: None,
            install_budget: MAX_INSTALLS_PER_TICK,
        }
    }
}

pub fn save_settings(settings: &WorldSettings, path: &Path) -> io::Result<()> {
    let encoded: Vec<u8> = bincode::serialize(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut file = File::create(path)?;
    file.write_all(&encoded)?;
    Ok(())
}

pub fn load_settings(path: &Path) -> io::Result<WorldSettings> {
    let mut file = File::open(path)?;
    let mut encoded = Vec::new();
    file.read_to_end(&mut encoded)?;
    bincode::deserialize(&encoded).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
