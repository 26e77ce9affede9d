use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::warn;
use serde::{Deserialize, Serialize};

pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 90;

pub fn is_valid_number(n: u32) -> bool {
    (MIN_NUMBER as u32..=MAX_NUMBER as u32).contains(&n)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Frequency,
    Delay,
}

impl MetricKind {
    /// Path segment under `/api/stats/` and key of the JSON payload.
    pub fn api_key(&self) -> &'static str {
        match self {
            MetricKind::Frequency => "frequenze",
            MetricKind::Delay => "ritardi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Frequency => "Frequenza",
            MetricKind::Delay => "Ritardo",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NumberStat {
    pub number: u8,
    pub value: u32,
}

/// Per-number values of one metric. Numbers with no recorded value are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    kind: MetricKind,
    values: BTreeMap<u8, u32>,
}

impl Dataset {
    pub fn empty(kind: MetricKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
        }
    }

    /// Builds a dataset, skipping numbers outside 1..=90. A repeated number keeps its last value.
    pub fn from_pairs<I>(kind: MetricKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, u32)>,
    {
        let mut values = BTreeMap::new();
        for (number, value) in pairs {
            if !is_valid_number(number as u32) {
                warn!("{}: numero {} fuori intervallo, ignorato", kind.api_key(), number);
                continue;
            }
            values.insert(number, value);
        }
        Self { kind, values }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn get(&self, number: u8) -> Option<u32> {
        self.values.get(&number).copied()
    }

    pub fn value_or_zero(&self, number: u8) -> u32 {
        self.get(number).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = NumberStat> + '_ {
        self.values
            .iter()
            .map(|(&number, &value)| NumberStat { number, value })
    }

    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.values.keys().copied()
    }
}

/// Ordered bucket. Delay renders the same ordinals as OK / ELEVATO / ATTENZIONE / CRITICO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Severity {
    pub fn label(&self, kind: MetricKind) -> &'static str {
        match (kind, self) {
            (MetricKind::Frequency, Severity::Low) => "BASSA",
            (MetricKind::Frequency, Severity::Medium) => "MEDIA",
            (MetricKind::Frequency, Severity::High) => "ALTA",
            (MetricKind::Frequency, Severity::VeryHigh) => "MOLTO ALTA",
            (MetricKind::Delay, Severity::Low) => "OK",
            (MetricKind::Delay, Severity::Medium) => "ELEVATO",
            (MetricKind::Delay, Severity::High) => "ATTENZIONE",
            (MetricKind::Delay, Severity::VeryHigh) => "CRITICO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub stat: NumberStat,
    pub rank: usize,
    pub bucket: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rising => write!(f, "↑ Crescita"),
            Trend::Falling => write!(f, "↓ Calo"),
            Trend::Stable => write!(f, "- Stabile"),
        }
    }
}

/// Decoration for the head of a ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Medal {
    Crown,
    Medal,
    Trophy,
    Star,
    Heart,
}

impl Medal {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => Medal::Crown,
            1 => Medal::Medal,
            2 => Medal::Trophy,
            3 => Medal::Star,
            _ => Medal::Heart,
        }
    }
}

impl std::fmt::Display for Medal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Medal::Crown => write!(f, "👑"),
            Medal::Medal => write!(f, "🥇"),
            Medal::Trophy => write!(f, "🏆"),
            Medal::Star => write!(f, "⭐"),
            Medal::Heart => write!(f, "♥"),
        }
    }
}

/// Frequency/delay pair from one successful refresh. Replaced whole, never mutated.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub frequencies: Dataset,
    pub delays: Dataset,
    pub fetched_at: DateTime<Local>,
}

impl StatsSnapshot {
    pub fn new(frequencies: Dataset, delays: Dataset) -> Arc<Self> {
        Arc::new(Self {
            frequencies,
            delays,
            fetched_at: Local::now(),
        })
    }

    pub fn dataset(&self, kind: MetricKind) -> &Dataset {
        match kind {
            MetricKind::Frequency => &self.frequencies,
            MetricKind::Delay => &self.delays,
        }
    }
}
