//! Dashboard configuration
//!
//! Settings come from command line flags, with `SUPPLY_CHAIN_DATA_DIR` as a
//! fallback for the data directory.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const ORDER_FILE: &str = "DataCoSupplyChainDataset.csv";
pub const REFERENCE_FILE: &str = "DescriptionDataCoSupplyChain.csv";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_ENV: &str = "SUPPLY_CHAIN_DATA_DIR";

pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_MAP_SAMPLE_SIZE: usize = 500;

/// How raw CSV bytes are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TextEncoding {
    /// ISO-8859-1: every byte maps to one character, never fails
    #[default]
    Latin1,
    /// UTF-8, falling back to Latin-1 for fields that are not valid UTF-8
    Auto,
    /// UTF-8 only, invalid bytes are an error
    Utf8,
}

/// Where the two input files live and how to decode them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub encoding: TextEncoding,
}

impl DataConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            encoding: TextEncoding::default(),
        }
    }

    pub fn order_path(&self) -> PathBuf {
        self.data_dir.join(ORDER_FILE)
    }

    pub fn reference_path(&self) -> PathBuf {
        self.data_dir.join(REFERENCE_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// Limits applied while building the render plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub preview_rows: usize,
    pub map_sample_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            map_sample_size: DEFAULT_MAP_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub render: RenderOptions,
    /// Fixed seed for the map sample. `None` draws a fresh sample every refresh.
    pub seed: Option<u64>,
}

impl DashboardConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Flags shared by every binary
#[derive(clap::Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory holding the two CSV files (default: $SUPPLY_CHAIN_DATA_DIR or "data")
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Text decoding for the CSV files
    #[arg(long, value_enum, default_value_t = TextEncoding::Latin1)]
    pub encoding: TextEncoding,

    /// Random seed for the map sample (omit for a fresh sample each time)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows shown in each table preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// Maximum number of orders plotted on the map
    #[arg(long, default_value_t = DEFAULT_MAP_SAMPLE_SIZE)]
    pub sample_size: usize,
}

impl DataArgs {
    pub fn into_config(self) -> DashboardConfig {
        let env_dir = std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from);
        self.into_config_with(env_dir)
    }

    fn into_config_with(self, env_dir: Option<PathBuf>) -> DashboardConfig {
        let data_dir = self
            .data_dir
            .or(env_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        DashboardConfig {
            data: DataConfig {
                data_dir,
                encoding: self.encoding,
            },
            render: RenderOptions {
                preview_rows: self.preview_rows,
                map_sample_size: self.sample_size,
            },
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rand::Rng;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        data: DataArgs,
    }

    #[test]
    fn test_default_paths() {
        let cfg = DataConfig::default();
        assert_eq!(cfg.order_path(), Path::new("data/DataCoSupplyChainDataset.csv"));
        assert_eq!(
            cfg.reference_path(),
            Path::new("data/DescriptionDataCoSupplyChain.csv")
        );
        assert_eq!(cfg.encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_flag_defaults() {
        let cli = TestCli::parse_from(["test"]);
        let cfg = cli.data.into_config_with(None);
        assert_eq!(cfg.data.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.render, RenderOptions::default());
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn test_flag_beats_env() {
        let cli = TestCli::parse_from(["test", "--data-dir", "/srv/flag"]);
        let cfg = cli.data.into_config_with(Some(PathBuf::from("/srv/env")));
        assert_eq!(cfg.data.data_dir, PathBuf::from("/srv/flag"));
    }

    #[test]
    fn test_env_beats_default() {
        let cli = TestCli::parse_from(["test", "--encoding", "auto", "--seed", "9"]);
        let cfg = cli.data.into_config_with(Some(PathBuf::from("/srv/env")));
        assert_eq!(cfg.data.data_dir, PathBuf::from("/srv/env"));
        assert_eq!(cfg.data.encoding, TextEncoding::Auto);
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let cfg = DashboardConfig {
            seed: Some(42),
            ..Default::default()
        };
        let a: u64 = cfg.rng().gen();
        let b: u64 = cfg.rng().gen();
        assert_eq!(a, b);
    }
}
