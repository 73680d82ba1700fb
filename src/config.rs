//! Engine tuning parameters, TOML parsing and validation.
//!
//! Segment size and stream buffer capacity are performance knobs only: any
//! valid value yields the same prime sequence. A config file has a single
//! `[sieve]` table; missing keys fall back to the defaults.
//!
//! ```toml
//! [sieve]
//! segment_size = 65536
//! channel_capacity = 16
//! ```

use crate::error::{Result, SieveError};
use crate::sieve::SEGMENT_SIZE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest accepted segment: one 64-bit word of window.
pub const MIN_SEGMENT_SIZE: usize = 64;

/// Largest accepted segment: keeps window offsets and `low + segment`
/// comfortably inside the integer domain.
pub const MAX_SEGMENT_SIZE: usize = 1 << 31;

/// Default capacity of the stream's bounded buffer.
pub const CHANNEL_CAPACITY: usize = 16;

/// Tuning for one enumeration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SieveConfig {
    /// Integers per segment window.
    pub segment_size: usize,
    /// Primes buffered between a stream's producer and its consumer.
    pub channel_capacity: usize,
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            segment_size: SEGMENT_SIZE,
            channel_capacity: CHANNEL_CAPACITY,
        }
    }
}

impl SieveConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SEGMENT_SIZE..=MAX_SEGMENT_SIZE).contains(&self.segment_size) {
            return Err(SieveError::InvalidArgument(format!(
                "segment_size must be in [{}, {}], got {}",
                MIN_SEGMENT_SIZE, MAX_SEGMENT_SIZE, self.segment_size
            )));
        }
        if self.channel_capacity == 0 {
            return Err(SieveError::InvalidArgument(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse sieve config")?;
        file.sieve.validate()?;
        Ok(file.sieve)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }
}

/// On-disk layout: everything lives under `[sieve]`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    sieve: SieveConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SieveConfig::default();
        assert_eq!(config.segment_size, 32_768);
        assert_eq!(config.channel_capacity, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn segment_size_bounds() {
        let mut config = SieveConfig::default();
        config.segment_size = MIN_SEGMENT_SIZE;
        assert!(config.validate().is_ok());
        config.segment_size = MAX_SEGMENT_SIZE;
        assert!(config.validate().is_ok());
        config.segment_size = MIN_SEGMENT_SIZE - 1;
        assert!(matches!(
            config.validate(),
            Err(SieveError::InvalidArgument(_))
        ));
        config.segment_size = MAX_SEGMENT_SIZE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_channel_capacity_rejected() {
        let config = SieveConfig {
            channel_capacity: 0,
            ..SieveConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("channel_capacity"));
    }

    // ── TOML ──────────────────────────────────────────────────────

    #[test]
    fn parse_full_toml() {
        let config = SieveConfig::from_toml_str(
            r#"
[sieve]
segment_size = 65536
channel_capacity = 4
"#,
        )
        .unwrap();
        assert_eq!(config.segment_size, 65_536);
        assert_eq!(config.channel_capacity, 4);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config = SieveConfig::from_toml_str("[sieve]\nsegment_size = 1024\n").unwrap();
        assert_eq!(config.segment_size, 1024);
        assert_eq!(config.channel_capacity, CHANNEL_CAPACITY);
        assert_eq!(SieveConfig::from_toml_str("").unwrap(), SieveConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(SieveConfig::from_toml_str("[sieve]\nsegment = 1024\n").is_err());
        assert!(SieveConfig::from_toml_str("[wheel]\nbasis = 7\n").is_err());
    }

    #[test]
    fn invalid_values_rejected_after_parse() {
        let err = SieveConfig::from_toml_str("[sieve]\nsegment_size = 8\n").unwrap_err();
        assert!(format!("{err:#}").contains("segment_size"), "{err:#}");
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = SieveConfig::load(Path::new("/nonexistent/primesieve.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/primesieve.toml"));
    }
}
