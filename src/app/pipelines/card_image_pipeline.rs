use crate::adapters::pacing::FixedDelay;
use crate::adapters::scryfall::{ScryfallClient, ScryfallConfig};
use crate::app::record_format::RecordFormat;
use crate::core::enrich::{CancelFlag, CardEnricher, TracingObserver};
use crate::core::{CardLookup, ConfigProvider, LookupObserver, Pacer, Pipeline, Storage};
use crate::domain::model::{CardRecord, EnrichmentReport};
use crate::utils::error::Result;

/// 讀取卡片清單、查詢 Scryfall 圖片、寫出加上 ImageURL 的清單
pub struct CardImagePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    lookup: Box<dyn CardLookup>,
    pacer: Box<dyn Pacer>,
    observer: Box<dyn LookupObserver>,
    cancel: CancelFlag,
}

impl<S: Storage, C: ConfigProvider> CardImagePipeline<S, C> {
    /// Scryfall client and fixed delay, both taken from the configuration.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let lookup = ScryfallClient::new(ScryfallConfig::from_provider(&config))?;
        let pacer = FixedDelay::new(config.request_delay());
        Ok(Self::with_components(
            storage,
            config,
            Box::new(lookup),
            Box::new(pacer),
        ))
    }

    pub fn with_components(
        storage: S,
        config: C,
        lookup: Box<dyn CardLookup>,
        pacer: Box<dyn Pacer>,
    ) -> Self {
        Self {
            storage,
            config,
            lookup,
            pacer,
            observer: Box::new(TracingObserver),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn LookupObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CardImagePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<CardRecord>> {
        let input_path = self.config.input_path();
        let format = RecordFormat::from_path(input_path)?;

        tracing::info!("📥 Reading cards from: {}", input_path);
        let data = self.storage.read_file(input_path).await?;
        let cards = format.decode(&data)?;

        tracing::info!("📊 Extracted {} cards", cards.len());
        Ok(cards)
    }

    async fn transform(&self, cards: Vec<CardRecord>) -> Result<EnrichmentReport> {
        tracing::info!(
            "🔧 Looking up images for {} cards (delay {:?} between requests)",
            cards.len(),
            self.config.request_delay()
        );

        let report = CardEnricher::new(self.lookup.as_ref(), self.pacer.as_ref())
            .with_observer(self.observer.as_ref())
            .with_cancel_flag(self.cancel.clone())
            .enrich(&cards)
            .await;

        let summary = &report.summary;
        tracing::info!(
            "✅ Lookup complete: {} found, {} not found, {} errors, {} skipped",
            summary.found,
            summary.not_found,
            summary.remote_errors,
            summary.skipped
        );
        if summary.cancelled {
            tracing::warn!("⚠️ Run was cancelled; remaining cards were written without images");
        }

        Ok(report)
    }

    async fn load(&self, report: EnrichmentReport) -> Result<String> {
        let output_path = self.config.output_path();
        let format = RecordFormat::from_path(output_path)?;

        let data = format.encode(&report.cards)?;
        tracing::debug!("Writing {} bytes to storage", data.len());
        self.storage.write_file(output_path, &data).await?;

        let location = self.storage.location(output_path);
        tracing::info!("💾 Saved {} cards to {}", report.cards.len(), location);
        Ok(location)
    }
}
