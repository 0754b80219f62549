use std::{ffi::OsString, path::PathBuf};

use clap::{error::ErrorKind, Parser};

use crate::{
    error::{Error, Result},
    resource::DEFAULT_SIZE,
    scenario::{Counts, Scenario},
};

/// Runs readers and writers against a file under the first readers-writers protocol.
#[derive(Clone, Debug, Parser)]
#[command(version)]
pub struct Config {
    /// Existing file, readable and writable, shared by every task.
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = Scenario::Mix)]
    pub scenario: Scenario,

    /// Reader/writer pairs for `mix`.
    #[arg(long, default_value_t = 10)]
    pub pairs: usize,

    /// Readers started before the writer in `flood`.
    #[arg(long, default_value_t = 10)]
    pub readers_before: usize,

    /// Readers started after the writer in `flood`.
    #[arg(long, default_value_t = 89)]
    pub readers_after: usize,

    /// Bytes each writer writes.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    pub size: usize,

    /// Seed for writer content. Unseeded runs draw from OS entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log every task's lifecycle, not just its result.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parses the process arguments. `Ok(None)` means help or version was printed.
    pub fn from_args() -> Result<Option<Self>> {
        Self::parse_args(std::env::args_os())
    }

    pub fn parse_args<I, T>(args: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(config) => Ok(Some(config)),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                // Nothing useful to do if stdout is gone
                let _ = e.print();
                Ok(None)
            }
            Err(e) => Err(Error::Usage(e.to_string())),
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            pairs: self.pairs,
            readers_before: self.readers_before,
            readers_after: self.readers_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::Error;
    use crate::scenario::{Counts, Scenario};

    #[test]
    fn defaults() {
        let config = Config::parse_args(["first-rw", "data.bin"]).unwrap().unwrap();
        assert_eq!(config.file.to_str(), Some("data.bin"));
        assert_eq!(config.scenario, Scenario::Mix);
        assert_eq!(config.counts(), Counts::default());
        assert_eq!(config.size, 1_024_000);
        assert_eq!(config.seed, None);
        assert!(!config.verbose);
    }

    #[test]
    fn flood_with_overrides() {
        let config = Config::parse_args([
            "first-rw",
            "--scenario",
            "flood",
            "--readers-after",
            "990",
            "--seed",
            "3",
            "-v",
            "data.bin",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(config.scenario, Scenario::Flood);
        assert_eq!(config.counts().readers_after, 990);
        assert_eq!(config.seed, Some(3));
        assert!(config.verbose);
    }

    #[test]
    fn missing_file_is_usage_error() {
        assert!(matches!(
            Config::parse_args(["first-rw"]),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn unknown_scenario_is_usage_error() {
        assert!(matches!(
            Config::parse_args(["first-rw", "--scenario", "fair", "data.bin"]),
            Err(Error::Usage(_))
        ));
    }
}
