use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};
use crate::models::{MetricKind, Severity};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrequencyThresholds {
    pub very_high: u32,
    pub high: u32,
    pub medium: u32,
}

impl Default for FrequencyThresholds {
    fn default() -> Self {
        Self {
            very_high: 150,
            high: 100,
            medium: 75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DelayThresholds {
    pub critical: u32,
    pub warning: u32,
    pub elevated: u32,
}

impl Default for DelayThresholds {
    fn default() -> Self {
        Self {
            critical: 100,
            warning: 70,
            elevated: 40,
        }
    }
}

/// Lower bounds (exclusive) of each bucket above `Low`, highest first.
pub type ThresholdTable = [(u32, Severity); 3];

impl FrequencyThresholds {
    pub fn table(&self) -> ThresholdTable {
        [
            (self.very_high, Severity::VeryHigh),
            (self.high, Severity::High),
            (self.medium, Severity::Medium),
        ]
    }
}

impl DelayThresholds {
    pub fn table(&self) -> ThresholdTable {
        [
            (self.critical, Severity::VeryHigh),
            (self.warning, Severity::High),
            (self.elevated, Severity::Medium),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsConfig {
    pub api_base_url: String,
    pub top_n_chart: usize,
    pub top_n_list: usize,
    pub top_n_delay_detail: usize,
    pub top_n_table: usize,
    pub frequency_thresholds: FrequencyThresholds,
    pub delay_thresholds: DelayThresholds,
    pub refresh_timeout_ms: u64,
    pub refresh_interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            top_n_chart: 30,
            top_n_list: 10,
            top_n_delay_detail: 15,
            top_n_table: 20,
            frequency_thresholds: FrequencyThresholds::default(),
            delay_thresholds: DelayThresholds::default(),
            refresh_timeout_ms: 10_000,
            refresh_interval_secs: 60,
        }
    }
}

impl StatsConfig {
    /// Reads a JSON config file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StatsError::configuration(format!("impossibile leggere {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: StatsConfig = serde_json::from_str(json)
            .map_err(|e| StatsError::configuration(format!("JSON non valido: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("topNChart", self.top_n_chart),
            ("topNList", self.top_n_list),
            ("topNDelayDetail", self.top_n_delay_detail),
            ("topNTable", self.top_n_table),
        ];
        for (name, n) in windows {
            if n == 0 {
                return Err(StatsError::configuration(format!("{name} deve essere > 0")));
            }
        }

        if self.refresh_timeout_ms == 0 {
            return Err(StatsError::configuration("refreshTimeoutMs deve essere > 0"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(StatsError::configuration("refreshIntervalSecs deve essere > 0"));
        }

        let f = &self.frequency_thresholds;
        if !(f.very_high > f.high && f.high > f.medium) {
            return Err(StatsError::configuration(format!(
                "frequencyThresholds non ordinate: veryHigh={} high={} medium={}",
                f.very_high, f.high, f.medium
            )));
        }
        let d = &self.delay_thresholds;
        if !(d.critical > d.warning && d.warning > d.elevated) {
            return Err(StatsError::configuration(format!(
                "delayThresholds non ordinate: critical={} warning={} elevated={}",
                d.critical, d.warning, d.elevated
            )));
        }

        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StatsError::configuration(format!(
                "apiBaseUrl non valido: '{}'",
                self.api_base_url
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self, kind: MetricKind) -> ThresholdTable {
        match kind {
            MetricKind::Frequency => self.frequency_thresholds.table(),
            MetricKind::Delay => self.delay_thresholds.table(),
        }
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
