//! Pipeline configuration.

use kline_types::Resolution;
use std::time::Duration;

use crate::{PipelineError, Result};

/// Settings shared by every pipeline task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Prefix of the resolution and current-view table names.
    pub table_prefix: String,
    /// Raw archive table. Also the real-time view's tag.
    pub raw_table: String,
    /// Time between polls. Also the real-time view's sub-period.
    pub poll_interval: Duration,
    /// Capacity of every window channel.
    pub channel_capacity: usize,
    /// Capacity of the raw-archive queue.
    pub archive_capacity: usize,
    /// How long raw rows are kept.
    pub retention: Duration,
    /// Time between retention sweeps.
    pub retention_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            table_prefix: Self::DEFAULT_TABLE_PREFIX.to_string(),
            raw_table: Self::DEFAULT_RAW_TABLE.to_string(),
            poll_interval: Duration::from_secs(10),
            channel_capacity: 100,
            archive_capacity: 4,
            retention: Duration::from_secs(7 * 24 * 3600),
            retention_interval: Duration::from_secs(3600),
        }
    }
}

impl PipelineConfig {
    /// Default table-name prefix.
    pub const DEFAULT_TABLE_PREFIX: &'static str = "coinmarketcap";

    /// Default raw archive table.
    pub const DEFAULT_RAW_TABLE: &'static str = "pricecoinmarketcap";

    /// Table receiving finalized windows of `resolution`.
    #[must_use]
    pub fn resolution_table(&self, resolution: Resolution) -> String {
        resolution.table_name(&self.table_prefix)
    }

    /// Table holding the real-time view.
    #[must_use]
    pub fn current_table(&self) -> String {
        format!("{}current", self.table_prefix)
    }

    /// Tag scoping the real-time view's rows in the current table.
    #[must_use]
    pub fn realtime_tag(&self) -> &str {
        &self.raw_table
    }

    /// Checks that the configuration can be run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for zero capacities or
    /// intervals.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 || self.archive_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "channel capacities must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.as_secs() == 0 {
            return Err(PipelineError::InvalidConfig(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if self.retention_interval.is_zero() {
            return Err(PipelineError::InvalidConfig(
                "retention interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_names() {
        let config = PipelineConfig::default();
        assert_eq!(config.resolution_table(Resolution::Minute1), "coinmarketcapmin");
        assert_eq!(config.resolution_table(Resolution::Week1), "coinmarketcapweek");
        assert_eq!(config.current_table(), "coinmarketcapcurrent");
        assert_eq!(config.realtime_tag(), "pricecoinmarketcap");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = PipelineConfig {
            channel_capacity: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            poll_interval: Duration::from_millis(500),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
