//! Presentation shapes built from ranked entries. Every function here is pure.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::StatsConfig;
use crate::models::{Dataset, Medal, MetricKind, RankedEntry, Severity, StatsSnapshot, Trend};
use crate::rank::rank;

pub const DEFAULT_LIST_LIMIT: usize = 10;

const TREND_MARGIN: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<u8>,
    pub values: Vec<u32>,
    pub buckets: Vec<Severity>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedListItem {
    pub number: u8,
    pub value: u32,
    pub severity: Severity,
    pub display_rank: usize,
    pub medal: Medal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombinedRow {
    pub number: u8,
    pub frequency: u32,
    pub delay: u32,
    pub derived_metric: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayDetail {
    pub number: u8,
    pub delay: u32,
    pub severity: Severity,
}

pub fn to_chart_series(ranked: &[RankedEntry]) -> ChartSeries {
    ChartSeries {
        labels: ranked.iter().map(|e| e.stat.number).collect(),
        values: ranked.iter().map(|e| e.stat.value).collect(),
        buckets: ranked.iter().map(|e| e.bucket).collect(),
    }
}

pub fn to_ranked_list(ranked: &[RankedEntry], limit: usize) -> Vec<RankedListItem> {
    ranked
        .iter()
        .take(limit)
        .map(|e| RankedListItem {
            number: e.stat.number,
            value: e.stat.value,
            severity: e.bucket,
            display_rank: e.rank + 1,
            medal: Medal::for_rank(e.rank),
        })
        .collect()
}

/// `delay * 1.2`, rounded half up. A display placeholder carried over from the
/// dashboard; it has no statistical meaning and must not be read as one.
pub fn placeholder_derived_metric(delay: u32) -> u32 {
    ((delay as u64 * 12 + 5) / 10) as u32
}

pub fn trend(frequency: u32, delay: u32) -> Trend {
    let score = frequency as i64 - delay as i64;
    if score > TREND_MARGIN {
        Trend::Rising
    } else if score < -TREND_MARGIN {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

/// Rows in ascending number order over numbers present in either dataset.
/// A number missing from one side reads as 0 there.
pub fn to_combined_table(frequencies: &Dataset, delays: &Dataset, limit: usize) -> Vec<CombinedRow> {
    let numbers: BTreeSet<u8> = frequencies.numbers().chain(delays.numbers()).collect();

    numbers
        .into_iter()
        .take(limit)
        .map(|number| {
            let frequency = frequencies.value_or_zero(number);
            let delay = delays.value_or_zero(number);
            CombinedRow {
                number,
                frequency,
                delay,
                derived_metric: placeholder_derived_metric(delay),
                trend: trend(frequency, delay),
            }
        })
        .collect()
}

pub fn to_delay_detail(ranked_delays: &[RankedEntry], limit: usize) -> Vec<DelayDetail> {
    ranked_delays
        .iter()
        .take(limit)
        .map(|e| DelayDetail {
            number: e.stat.number,
            delay: e.stat.value,
            severity: e.bucket,
        })
        .collect()
}

/// Every projection of one snapshot for the selected metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub metric: MetricKind,
    pub chart: ChartSeries,
    pub top: Vec<RankedListItem>,
    pub table: Vec<CombinedRow>,
    pub delays: Vec<DelayDetail>,
}

pub fn build_report(snapshot: &StatsSnapshot, metric: MetricKind, config: &StatsConfig) -> StatsReport {
    let selected = snapshot.dataset(metric);
    let window = config.top_n_chart.max(config.top_n_list);
    let ranked = rank(selected, window, config);
    let ranked_delays = rank(&snapshot.delays, config.top_n_delay_detail, config);

    let chart_len = config.top_n_chart.min(ranked.len());

    StatsReport {
        metric,
        chart: to_chart_series(&ranked[..chart_len]),
        top: to_ranked_list(&ranked, config.top_n_list),
        table: to_combined_table(&snapshot.frequencies, &snapshot.delays, config.top_n_table),
        delays: to_delay_detail(&ranked_delays, config.top_n_delay_detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(freqs: &[(u8, u32)], delays: &[(u8, u32)]) -> std::sync::Arc<StatsSnapshot> {
        StatsSnapshot::new(
            Dataset::from_pairs(MetricKind::Frequency, freqs.iter().copied()),
            Dataset::from_pairs(MetricKind::Delay, delays.iter().copied()),
        )
    }

    #[test]
    fn test_chart_series_aligned() {
        let config = StatsConfig::default();
        let ds = Dataset::from_pairs(MetricKind::Frequency, [(7, 160), (23, 120), (90, 10)]);
        let series = to_chart_series(&rank(&ds, 30, &config));
        assert_eq!(series.labels, vec![7, 23, 90]);
        assert_eq!(series.values, vec![160, 120, 10]);
        assert_eq!(series.buckets, vec![Severity::VeryHigh, Severity::High, Severity::Low]);
        assert_eq!(series.labels.len(), series.values.len());
    }

    #[test]
    fn test_chart_series_empty() {
        let series = to_chart_series(&[]);
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn test_ranked_list_limit_and_rank() {
        let config = StatsConfig::default();
        let pairs: Vec<(u8, u32)> = (1..=20u8).map(|n| (n, n as u32 * 10)).collect();
        let ds = Dataset::from_pairs(MetricKind::Frequency, pairs);
        let list = to_ranked_list(&rank(&ds, 30, &config), DEFAULT_LIST_LIMIT);
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].number, 20);
        assert_eq!(list[0].display_rank, 1);
        assert_eq!(list[0].medal, Medal::Crown);
        assert_eq!(list[0].severity, Severity::VeryHigh);
        assert_eq!(list[9].display_rank, 10);
        assert_eq!(list[9].medal, Medal::Heart);
    }

    #[test]
    fn test_placeholder_derived_metric() {
        assert_eq!(placeholder_derived_metric(110), 132);
        assert_eq!(placeholder_derived_metric(0), 0);
        assert_eq!(placeholder_derived_metric(1), 1);
        assert_eq!(placeholder_derived_metric(3), 4);
    }

    #[test]
    fn test_trend_boundaries() {
        assert_eq!(trend(151, 100), Trend::Rising);
        assert_eq!(trend(150, 100), Trend::Stable);
        assert_eq!(trend(50, 100), Trend::Stable);
        assert_eq!(trend(49, 100), Trend::Falling);
        assert_eq!(trend(0, 0), Trend::Stable);
    }

    #[test]
    fn test_combined_table_row() {
        let snap = snapshot(&[(13, 50), (47, 90), (5, 120)], &[(13, 110), (47, 75), (5, 20)]);
        let table = to_combined_table(&snap.frequencies, &snap.delays, 20);
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].number, 5);
        assert_eq!(table[0].trend, Trend::Rising);
        let row = table.iter().find(|r| r.number == 13).unwrap();
        assert_eq!(row.frequency, 50);
        assert_eq!(row.delay, 110);
        assert_eq!(row.derived_metric, 132);
        assert_eq!(row.trend, Trend::Falling);
        let row = table.iter().find(|r| r.number == 47).unwrap();
        assert_eq!(row.trend, Trend::Stable);
    }

    #[test]
    fn test_combined_table_missing_side_reads_zero() {
        let snap = snapshot(&[(1, 80)], &[(2, 60)]);
        let table = to_combined_table(&snap.frequencies, &snap.delays, 20);
        assert_eq!(table.len(), 2);
        assert_eq!((table[0].number, table[0].frequency, table[0].delay), (1, 80, 0));
        assert_eq!(table[0].trend, Trend::Rising);
        assert_eq!((table[1].number, table[1].frequency, table[1].delay), (2, 0, 60));
        assert_eq!(table[1].derived_metric, 72);
        assert_eq!(table[1].trend, Trend::Falling);
    }

    #[test]
    fn test_combined_table_limit() {
        let pairs: Vec<(u8, u32)> = (1..=90u8).map(|n| (n, 1)).collect();
        let snap = snapshot(&pairs, &pairs);
        let table = to_combined_table(&snap.frequencies, &snap.delays, 20);
        assert_eq!(table.len(), 20);
        assert_eq!(table.last().map(|r| r.number), Some(20));
    }

    #[test]
    fn test_delay_detail() {
        let config = StatsConfig::default();
        let delays = Dataset::from_pairs(MetricKind::Delay, [(13, 110), (47, 75), (5, 20), (60, 55)]);
        let detail = to_delay_detail(&rank(&delays, 15, &config), 15);
        let got: Vec<(u8, u32, Severity)> = detail.iter().map(|d| (d.number, d.delay, d.severity)).collect();
        assert_eq!(
            got,
            vec![
                (13, 110, Severity::VeryHigh),
                (47, 75, Severity::High),
                (60, 55, Severity::Medium),
                (5, 20, Severity::Low),
            ]
        );
    }

    #[test]
    fn test_build_report_windows() {
        let pairs: Vec<(u8, u32)> = (1..=90u8).map(|n| (n, n as u32 * 2)).collect();
        let snap = snapshot(&pairs, &pairs);
        let config = StatsConfig::default();
        let report = build_report(&snap, MetricKind::Frequency, &config);
        assert_eq!(report.chart.len(), 30);
        assert_eq!(report.top.len(), 10);
        assert_eq!(report.table.len(), 20);
        assert_eq!(report.delays.len(), 15);
        assert_eq!(report.chart.labels[0], 90);
        assert_eq!(report.delays[0].number, 90);
    }

    #[test]
    fn test_build_report_list_wider_than_chart() {
        let pairs: Vec<(u8, u32)> = (1..=90u8).map(|n| (n, n as u32)).collect();
        let snap = snapshot(&pairs, &pairs);
        let config = StatsConfig::from_json(r#"{ "topNChart": 5, "topNList": 12 }"#).unwrap();
        let report = build_report(&snap, MetricKind::Delay, &config);
        assert_eq!(report.chart.len(), 5);
        assert_eq!(report.top.len(), 12);
    }

    #[test]
    fn test_build_report_idempotent() {
        let snap = snapshot(&[(7, 160), (23, 120), (90, 10)], &[(13, 110), (47, 75), (5, 20)]);
        let config = StatsConfig::default();
        for metric in [MetricKind::Frequency, MetricKind::Delay] {
            let first = build_report(&snap, metric, &config);
            let second = build_report(&snap, metric, &config);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_build_report_empty_snapshot() {
        let snap = snapshot(&[], &[]);
        let report = build_report(&snap, MetricKind::Frequency, &StatsConfig::default());
        assert!(report.chart.is_empty());
        assert!(report.top.is_empty());
        assert!(report.table.is_empty());
        assert!(report.delays.is_empty());
    }
}
