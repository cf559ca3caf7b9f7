//! Recurring price update job
//!
//! An owned scheduler object with an explicit start/stop lifecycle. The
//! pass runs inside the scheduler task's own loop body, so a firing can
//! never overlap a pass still in flight; missed ticks are skipped, not
//! queued. Stopping halts future firings and lets an in-flight pass
//! finish on its own.

use crate::core::asset::AssetKind;
use crate::resolver::PriceResolver;
use crate::store::PriceStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub updated: usize,
    pub total: usize,
}

struct RunningJob {
    stop: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

pub struct PriceScheduler {
    resolver: Arc<PriceResolver>,
    store: Arc<PriceStore>,
    interval: Duration,
    running: Mutex<Option<RunningJob>>,
}

impl PriceScheduler {
    pub fn new(resolver: Arc<PriceResolver>, store: Arc<PriceStore>, interval: Duration) -> Self {
        PriceScheduler {
            resolver,
            store,
            interval,
            running: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().unwrap().is_some()
    }

    /// Starts the recurring job. Idempotent: a second start while running
    /// is a no-op.
    pub fn start(&self) {
        let mut guard = self.running.lock().unwrap();
        if guard.is_some() {
            info!("Price scheduler already running");
            return;
        }

        let (stop, mut stopped) = watch::channel(false);
        let resolver = Arc::clone(&self.resolver);
        let store = Arc::clone(&self.store);
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_pass(&resolver, &store).await;
                    }
                    _ = stopped.changed() => {
                        debug!("Price scheduler task exiting");
                        break;
                    }
                }
            }
        });

        *guard = Some(RunningJob {
            stop,
            _handle: handle,
        });
        info!(interval = ?self.interval, "Price scheduler started");
    }

    /// Halts future firings. An in-flight pass is allowed to complete.
    pub fn stop(&self) {
        if let Some(job) = self.running.lock().unwrap().take() {
            let _ = job.stop.send(true);
            info!("Price scheduler stopped");
        }
    }
}

impl Drop for PriceScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pass over all tracked stock assets. A failure on one asset never
/// aborts the rest of the pass.
pub async fn run_pass(resolver: &PriceResolver, store: &PriceStore) -> PassReport {
    let stocks = match store.assets_of_kind(AssetKind::Stock) {
        Ok(stocks) => stocks,
        Err(e) => {
            error!(error = %e, "Failed to list assets for price pass");
            return PassReport::default();
        }
    };

    let total = stocks.len();
    let mut updated = 0;
    for asset in &stocks {
        match resolver.resolve_price(asset).await {
            Ok(price) => {
                debug!(symbol = %asset.symbol, price, "Pass updated asset");
                updated += 1;
            }
            Err(e) => {
                warn!(symbol = %asset.symbol, error = %e, "Pass failed to update asset");
            }
        }
    }

    info!(updated, total, "Price pass complete");
    PassReport { updated, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::AssetKind;
    use crate::core::error::ProviderError;
    use crate::core::quote::QuoteProvider;
    use crate::core::reference::ReferenceTable;
    use crate::synthetic::SyntheticQuote;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Each quote takes long enough that interval firings pile up behind
    /// the in-flight pass.
    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait]
    impl QuoteProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<f64, ProviderError> {
            tokio::time::sleep(self.delay).await;
            Ok(42.0)
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl QuoteProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<f64, ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    fn build_scheduler(
        store: &Arc<PriceStore>,
        provider: Arc<dyn QuoteProvider>,
        interval: Duration,
    ) -> PriceScheduler {
        let synthetic = SyntheticQuote::new(ReferenceTable::new(vec![]), Arc::clone(store));
        let resolver = Arc::new(PriceResolver::new(
            vec![provider],
            Arc::new(FailingProvider),
            synthetic,
            Arc::clone(store),
        ));
        PriceScheduler::new(resolver, Arc::clone(store), interval)
    }

    #[tokio::test]
    async fn test_passes_never_overlap() {
        let dir = tempdir().unwrap();
        let store = Arc::new(PriceStore::open(dir.path()).unwrap());
        store
            .get_or_create_asset("AAPL", AssetKind::Stock, "Apple Inc.")
            .unwrap();

        // Pass duration (~60ms) far exceeds the interval (10ms): firings
        // must queue behind the running pass, not stack on top of it.
        let scheduler = build_scheduler(
            &store,
            Arc::new(SlowProvider {
                delay: Duration::from_millis(60),
            }),
            Duration::from_millis(10),
        );
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Sequential passes at ~60ms each over 150ms: at most 4 even with
        // scheduling slack, far fewer than the 15 an overlapping scheduler
        // would have produced.
        let count = store.price_point_count("AAPL").unwrap();
        assert!(count >= 1, "expected at least one pass");
        assert!(count <= 4, "passes overlapped: {count} price points");
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_halts_firings() {
        let dir = tempdir().unwrap();
        let store = Arc::new(PriceStore::open(dir.path()).unwrap());
        store
            .get_or_create_asset("MSFT", AssetKind::Stock, "Microsoft Corporation")
            .unwrap();

        let scheduler = build_scheduler(
            &store,
            Arc::new(SlowProvider {
                delay: Duration::from_millis(1),
            }),
            Duration::from_millis(20),
        );
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop();
        assert!(!scheduler.is_running());

        // Allow any in-flight pass to finish, then verify no new firings.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let count_after_stop = store.price_point_count("MSFT").unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.price_point_count("MSFT").unwrap(), count_after_stop);
    }

    #[tokio::test]
    async fn test_pass_covers_stocks_only_and_reports_counts() {
        let dir = tempdir().unwrap();
        let store = Arc::new(PriceStore::open(dir.path()).unwrap());
        let stock = store
            .get_or_create_asset("AAPL", AssetKind::Stock, "Apple Inc.")
            .unwrap();
        store
            .get_or_create_asset("bitcoin", AssetKind::Crypto, "bitcoin")
            .unwrap();

        let synthetic = SyntheticQuote::new(ReferenceTable::new(vec![]), Arc::clone(&store));
        let resolver = PriceResolver::new(
            vec![Arc::new(FailingProvider)],
            Arc::new(FailingProvider),
            synthetic,
            Arc::clone(&store),
        );

        let report = run_pass(&resolver, &store).await;

        // All providers failed; the synthetic fallback still counts as an
        // update. Crypto assets are not part of the pass.
        assert_eq!(report, PassReport { updated: 1, total: 1 });
        assert!(store.latest_price(&stock.symbol).unwrap().is_some());
        assert_eq!(store.price_point_count("bitcoin").unwrap(), 0);
    }
}
