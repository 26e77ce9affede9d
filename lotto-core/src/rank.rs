use crate::config::{StatsConfig, ThresholdTable};
use crate::models::{Dataset, MetricKind, NumberStat, RankedEntry, Severity};

/// First bucket whose bound is strictly exceeded, `Low` otherwise.
pub fn classify_with(table: &ThresholdTable, value: u32) -> Severity {
    table
        .iter()
        .find(|(bound, _)| value > *bound)
        .map(|&(_, severity)| severity)
        .unwrap_or(Severity::Low)
}

pub fn classify(config: &StatsConfig, kind: MetricKind, value: u32) -> Severity {
    classify_with(&config.thresholds(kind), value)
}

/// Top `top_n` entries by value descending, ties by ascending number.
pub fn rank(dataset: &Dataset, top_n: usize, config: &StatsConfig) -> Vec<RankedEntry> {
    let table = config.thresholds(dataset.kind());

    let mut sorted: Vec<NumberStat> = dataset.iter().collect();
    sorted.sort_by(|a, b| b.value.cmp(&a.value).then(a.number.cmp(&b.number)));

    sorted
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(rank, stat)| RankedEntry {
            stat,
            rank,
            bucket: classify_with(&table, stat.value),
        })
        .collect()
}
