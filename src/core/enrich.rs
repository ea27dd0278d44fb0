use crate::core::query::build_lookup_request;
use crate::domain::model::{
    CardRecord, EnrichedCard, EnrichmentReport, LookupRequest, LookupResult, RunSummary,
};
use crate::domain::ports::{CardLookup, LookupObserver, Pacer};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 批次之間的取消旗標，只在每筆卡片開始前檢查
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Logs one line per card through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LookupObserver for TracingObserver {
    fn on_result(
        &self,
        index: usize,
        card: &CardRecord,
        request: &LookupRequest,
        result: &LookupResult,
    ) {
        match result {
            LookupResult::Found { image_url } => {
                tracing::info!("✅ #{} {} ({}): {}", index + 1, card.name, card.set, image_url)
            }
            LookupResult::NotFound => {
                tracing::warn!("❌ #{} No image found for {} ({}) via {}", index + 1, card.name, card.set, request)
            }
            LookupResult::RemoteError(failure) => {
                tracing::error!("❗ #{} Error fetching {} ({}): {}", index + 1, card.name, card.set, failure)
            }
        }
    }

    fn on_skipped(&self, index: usize, card: &CardRecord) {
        tracing::debug!("⏭️ #{} Skipped {} ({}) after cancellation", index + 1, card.name, card.set);
    }
}

/// Resolves image URLs for a batch of cards, one at a time and in order.
pub struct CardEnricher<'a> {
    lookup: &'a dyn CardLookup,
    pacer: &'a dyn Pacer,
    observer: &'a dyn LookupObserver,
    cancel: CancelFlag,
}

impl<'a> CardEnricher<'a> {
    pub fn new(lookup: &'a dyn CardLookup, pacer: &'a dyn Pacer) -> Self {
        Self {
            lookup,
            pacer,
            observer: &TracingObserver,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn LookupObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 回傳新的記錄序列，輸入不會被修改
    ///
    /// Cards left after cancellation are still emitted, without an image.
    pub async fn enrich(&self, cards: &[CardRecord]) -> EnrichmentReport {
        let mut summary = RunSummary::start(cards.len());
        let mut enriched = Vec::with_capacity(cards.len());

        for (index, card) in cards.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                summary.skipped += 1;
                self.observer.on_skipped(index, card);
                enriched.push(EnrichedCard::new(card, None));
                continue;
            }

            tracing::debug!("🔍 Fetching: {} ({})", card.name, card.set.trim());
            let collector_number = card.collector_number();
            let request =
                build_lookup_request(&card.name, &card.set, collector_number.as_deref());
            let result = self.lookup.lookup(&request).await;

            self.observer.on_result(index, card, &request, &result);
            summary.record(&result);
            enriched.push(EnrichedCard::new(
                card,
                result.image_url().map(str::to_string),
            ));

            self.pacer.pause().await;
        }

        summary.finished_at = Utc::now();
        EnrichmentReport {
            cards: enriched,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::pacing::NoDelay;
    use crate::domain::model::RemoteFailure;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Answers by set code and records every request it sees.
    struct MockLookup {
        requests: Mutex<Vec<LookupRequest>>,
        cancel_after: Option<(usize, CancelFlag)>,
    }

    impl MockLookup {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                cancel_after: None,
            }
        }

        fn cancelling_after(calls: usize, flag: CancelFlag) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                cancel_after: Some((calls, flag)),
            }
        }

        fn seen(&self) -> Vec<LookupRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CardLookup for MockLookup {
        async fn lookup(&self, request: &LookupRequest) -> LookupResult {
            let calls = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request.clone());
                requests.len()
            };
            if let Some((limit, flag)) = &self.cancel_after {
                if calls >= *limit {
                    flag.cancel();
                }
            }

            let set_code = match request {
                LookupRequest::ExactLookup { set_code, .. } => set_code.as_str(),
                LookupRequest::SearchQuery { query } => {
                    query.split("set:").nth(1).unwrap_or_default()
                }
            };
            match set_code.split_whitespace().next().unwrap_or_default() {
                "err" => LookupResult::RemoteError(RemoteFailure::Status(500)),
                "none" => LookupResult::NotFound,
                set => LookupResult::Found {
                    image_url: format!("https://img/{}.jpg", set),
                },
            }
        }
    }

    #[derive(Default)]
    struct CountingPacer(AtomicUsize);

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        indexes: Mutex<Vec<usize>>,
        skipped: Mutex<Vec<usize>>,
    }

    impl LookupObserver for RecordingObserver {
        fn on_result(&self, index: usize, _: &CardRecord, _: &LookupRequest, _: &LookupResult) {
            self.indexes.lock().unwrap().push(index);
        }

        fn on_skipped(&self, index: usize, _: &CardRecord) {
            self.skipped.lock().unwrap().push(index);
        }
    }

    fn sample_cards() -> Vec<CardRecord> {
        vec![
            CardRecord::new("Lightning Bolt", "lea"),
            CardRecord::new("Missing Card", "none"),
            CardRecord::new("Broken Card", "err").with_collector_number("7"),
            CardRecord::new("Counterspell", " 7ED "),
        ]
    }

    #[tokio::test]
    async fn test_one_result_per_card_in_order() {
        let lookup = MockLookup::new();
        let pacer = NoDelay;
        let observer = RecordingObserver::default();
        let cards = sample_cards();

        let report = CardEnricher::new(&lookup, &pacer)
            .with_observer(&observer)
            .enrich(&cards)
            .await;

        assert_eq!(report.cards.len(), 4);
        assert_eq!(lookup.seen().len(), 4);
        assert_eq!(*observer.indexes.lock().unwrap(), vec![0, 1, 2, 3]);

        assert_eq!(report.cards[0].image_url.as_deref(), Some("https://img/lea.jpg"));
        assert_eq!(report.cards[1].image_url, None);
        assert_eq!(report.cards[2].image_url, None);
        assert_eq!(report.cards[3].image_url.as_deref(), Some("https://img/7ed.jpg"));
        assert_eq!(report.cards[3].record, cards[3]);

        assert_eq!(report.summary.found, 2);
        assert_eq!(report.summary.not_found, 1);
        assert_eq!(report.summary.remote_errors, 1);
        assert!(!report.summary.cancelled);
    }

    #[tokio::test]
    async fn test_collector_number_triggers_exact_lookup() {
        let lookup = MockLookup::new();
        let pacer = NoDelay;
        let cards = sample_cards();

        CardEnricher::new(&lookup, &pacer).enrich(&cards).await;

        assert_eq!(
            lookup.seen()[2],
            LookupRequest::ExactLookup {
                set_code: "err".to_string(),
                collector_number: "7".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_pacer_runs_after_every_lookup() {
        let lookup = MockLookup::new();
        let pacer = CountingPacer::default();

        let report = CardEnricher::new(&lookup, &pacer)
            .enrich(&sample_cards())
            .await;

        // failures are paced too
        assert_eq!(pacer.0.load(Ordering::SeqCst), 4);
        assert_eq!(report.summary.processed(), 4);
    }

    #[tokio::test]
    async fn test_cancellation_between_records() {
        let flag = CancelFlag::new();
        let lookup = MockLookup::cancelling_after(2, flag.clone());
        let pacer = NoDelay;
        let observer = RecordingObserver::default();
        let cards = sample_cards();

        let report = CardEnricher::new(&lookup, &pacer)
            .with_observer(&observer)
            .with_cancel_flag(flag)
            .enrich(&cards)
            .await;

        assert_eq!(lookup.seen().len(), 2);
        assert_eq!(report.cards.len(), 4);
        assert!(report.summary.cancelled);
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(*observer.skipped.lock().unwrap(), vec![2, 3]);
        assert!(report.cards[2..].iter().all(|card| card.image_url.is_none()));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let lookup = MockLookup::new();
        let pacer = CountingPacer::default();

        let report = CardEnricher::new(&lookup, &pacer).enrich(&[]).await;

        assert!(report.cards.is_empty());
        assert_eq!(report.summary.total, 0);
        assert_eq!(pacer.0.load(Ordering::SeqCst), 0);
    }
}
