use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;

use log::{debug, warn};
use reqwest::Client;

use lotto_core::error::{Result, StatsError};
use lotto_core::models::{Dataset, MetricKind, is_valid_number};

/// Where datasets come from. The refresh coordinator only sees this seam.
pub trait StatsSource {
    fn fetch(&self, kind: MetricKind) -> impl Future<Output = Result<Dataset>> + Send;
}

pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, kind: MetricKind) -> String {
        format!("{}/api/stats/{}", self.base_url, kind.api_key())
    }
}

impl StatsSource for HttpSource {
    async fn fetch(&self, kind: MetricKind) -> Result<Dataset> {
        let url = self.url(kind);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StatsError::data_unavailable(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::data_unavailable(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StatsError::data_unavailable(format!("{url}: {e}")))?;

        let dataset = parse_payload(kind, &body)?;
        debug!("{}: {} numeri ricevuti", kind.api_key(), dataset.len());
        Ok(dataset)
    }
}

/// Parses `{ "<api_key>": { "<n>": value, ... }, ... }`. Other top-level keys are ignored.
/// `null` values count as absent; numeric keys outside 1..=90 are dropped.
pub fn parse_payload(kind: MetricKind, body: &str) -> Result<Dataset> {
    let key = kind.api_key();
    let malformed = |detail: String| StatsError::data_unavailable(format!("{key}: payload non valido ({detail})"));

    let mut root: HashMap<String, serde_json::Value> =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let section = root
        .remove(key)
        .ok_or_else(|| malformed(format!("chiave '{key}' mancante")))?;
    let raw: BTreeMap<String, Option<u32>> =
        serde_json::from_value(section).map_err(|e| malformed(e.to_string()))?;

    let mut seen = BTreeSet::new();
    let mut pairs = Vec::with_capacity(raw.len());
    for (raw_number, value) in raw {
        let trimmed = raw_number.trim();
        if !is_integer_literal(trimmed) {
            return Err(malformed(format!("numero '{raw_number}' non numerico")));
        }
        let number = match trimmed.parse::<u32>() {
            Ok(n) if is_valid_number(n) => n as u8,
            _ => {
                warn!("{key}: numero {trimmed} fuori intervallo, ignorato");
                continue;
            }
        };
        if !seen.insert(number) {
            warn!("{key}: numero {number} ripetuto ('{raw_number}'), vale l'ultimo");
        }
        if let Some(value) = value {
            pairs.push((number, value));
        }
    }

    Ok(Dataset::from_pairs(kind, pairs))
}

/// Optional sign followed by ASCII digits, of any magnitude.
fn is_integer_literal(s: &str) -> bool {
    let digits = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
