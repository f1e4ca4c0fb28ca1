//! Configuration loading
//!
//! A file named on the command line must load cleanly. Without one, the
//! embedded defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use aliquot_core::config::ConfigError;
use log::{debug, info};
use thiserror::Error;

use super::RunnerConfig;

/// Embedded default configuration (compiled into the runner)
/// Edit aliquot.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../aliquot.toml");

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid [{section}] settings: {error:?}")]
    Invalid {
        section: &'static str,
        error: ConfigError,
    },
}

/// Parse and validate configuration text
pub fn parse_config(text: &str, origin: &str) -> Result<RunnerConfig, LoadError> {
    let config: RunnerConfig = toml::from_str(text).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    config
        .station_b
        .validate()
        .map_err(|error| LoadError::Invalid {
            section: "station_b",
            error,
        })?;
    config
        .station_c
        .validate()
        .map_err(|error| LoadError::Invalid {
            section: "station_c",
            error,
        })?;

    Ok(config)
}

/// Load configuration from a file, or the embedded defaults
pub fn load_config(path: Option<&Path>) -> Result<RunnerConfig, LoadError> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&text, &path.display().to_string())?
        }
        None => {
            info!("Using embedded configuration");
            parse_config(EMBEDDED_CONFIG, "embedded aliquot.toml")?
        }
    };

    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &RunnerConfig) {
    debug!(
        "  run: simulate {}, tip tracking {}, record {}",
        config.run.simulate,
        config.run.tip_tracking,
        config.run.tip_record.display()
    );
    debug!(
        "  station B: {} samples, elution {} uL",
        config.station_b.num_samples, config.station_b.elution_volume_ul
    );
    debug!(
        "  station C: {} samples, {} uL each, mastermix {}, controls {}",
        config.station_c.num_samples,
        config.station_c.sample_volume_ul,
        config.station_c.prepare_mastermix,
        config.station_c.add_controls
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use aliquot_hal::DeckSlot;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(EMBEDDED_CONFIG, "embedded").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_defaults_round_trip() {
        let text = toml::to_string(&RunnerConfig::default()).unwrap();
        let config = parse_config(&text, "round trip").unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            "[station_c]\nnum_samples = 48\n\n[station_b.layout]\nwaste = 8\n",
            "partial",
        )
        .unwrap();

        assert_eq!(config.station_c.num_samples, 48);
        assert_eq!(config.station_c.sample_volume_ul, 5);
        assert_eq!(config.station_b.layout.waste, DeckSlot(8));
        assert_eq!(config.station_b.layout.magnet, DeckSlot(4));
        assert!(config.run.simulate);
    }

    #[test]
    fn test_rejects_out_of_range_samples() {
        let err = parse_config("[station_b]\nnum_samples = 95\n", "test").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                section: "station_b",
                error: ConfigError::SampleCount {
                    samples: 95,
                    max: 94
                }
            }
        ));

        let err = parse_config("[station_c]\nnum_samples = 0\n", "test").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid {
                section: "station_c",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = parse_config("[run\nsimulate = true", "broken.toml").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nsimulate = false\ntip_tracking = true").unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert!(!config.run.simulate);
        assert!(config.run.tip_tracking);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/aliquot.toml"))).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_load_embedded() {
        assert_eq!(load_config(None).unwrap(), RunnerConfig::default());
    }
}
