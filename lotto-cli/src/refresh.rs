use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::Mutex;

use lotto_core::error::{Result, StatsError};
use lotto_core::models::{MetricKind, StatsSnapshot};

use crate::fetch::StatsSource;

/// Holds the displayed snapshot and serializes refreshes against it.
pub struct Refresher<S> {
    source: S,
    timeout: Duration,
    in_flight: Mutex<()>,
    current: RwLock<Option<Arc<StatsSnapshot>>>,
}

impl<S: StatsSource> Refresher<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            in_flight: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Arc<StatsSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Fetches both datasets concurrently and publishes them as one snapshot.
    /// A call made while another is in flight waits for it to settle first.
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<StatsSnapshot>> {
        let _guard = self.in_flight.lock().await;

        let fetched = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(
                self.source.fetch(MetricKind::Frequency),
                self.source.fetch(MetricKind::Delay),
            )
        })
        .await;

        let (frequencies, delays) = match fetched {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                warn!("Aggiornamento fallito: {e}");
                return Err(e);
            }
            Err(_) => {
                warn!("Aggiornamento scaduto dopo {} ms", self.timeout.as_millis());
                return Err(StatsError::data_unavailable(format!(
                    "nessuna risposta entro {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        info!(
            "Statistiche aggiornate: {} frequenze, {} ritardi",
            frequencies.len(),
            delays.len()
        );
        let snapshot = StatsSnapshot::new(frequencies, delays);
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
