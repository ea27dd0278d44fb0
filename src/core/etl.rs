use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting card image ETL process");
        self.monitor.log_stats("Start");

        // Extract
        let cards = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(cards).await?;
        let processed = report.summary.processed();
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(report).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats(processed);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CardRecord, EnrichedCard, EnrichmentReport, LookupResult, RunSummary};
    use crate::utils::error::EtlError;
    use std::sync::Mutex;

    /// Records the phases it went through.
    #[derive(Default)]
    struct PhasePipeline {
        phases: Mutex<Vec<&'static str>>,
        fail_extract: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for PhasePipeline {
        async fn extract(&self) -> Result<Vec<CardRecord>> {
            self.phases.lock().unwrap().push("extract");
            if self.fail_extract {
                return Err(EtlError::UnsupportedFormat {
                    path: "cards.txt".to_string(),
                });
            }
            Ok(vec![CardRecord::new("Opt", "xln")])
        }

        async fn transform(&self, cards: Vec<CardRecord>) -> Result<EnrichmentReport> {
            self.phases.lock().unwrap().push("transform");
            let mut summary = RunSummary::start(cards.len());
            summary.record(&LookupResult::NotFound);
            Ok(EnrichmentReport {
                cards: cards.iter().map(|card| EnrichedCard::new(card, None)).collect(),
                summary,
            })
        }

        async fn load(&self, report: EnrichmentReport) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok(format!("out/{}.json", report.cards.len()))
        }
    }

    #[tokio::test]
    async fn test_run_executes_phases_in_order() {
        let engine = EtlEngine::new(PhasePipeline::default());

        let output = engine.run().await;

        tokio_test::assert_ok!(&output);
        assert_eq!(output.unwrap(), "out/1.json");
        assert_eq!(
            *engine.pipeline().phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_extract_failure() {
        let engine = EtlEngine::new_with_monitoring(
            PhasePipeline {
                fail_extract: true,
                ..Default::default()
            },
            true,
        );

        let output = engine.run().await;

        tokio_test::assert_err!(&output);
        assert_eq!(*engine.pipeline().phases.lock().unwrap(), vec!["extract"]);
    }
}
