use crate::domain::model::{CardRecord, EnrichmentReport, LookupRequest, LookupResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 給使用者看的完整位置
    fn location(&self, path: &str) -> String {
        path.to_string()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CardRecord>>;
    async fn transform(&self, cards: Vec<CardRecord>) -> Result<EnrichmentReport>;
    async fn load(&self, report: EnrichmentReport) -> Result<String>;
}

/// 遠端卡片資料庫：一個請求對應一個結果，失敗以 `LookupResult` 表示
#[async_trait]
pub trait CardLookup: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> LookupResult;
}

/// 每筆查詢之後的節流策略
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}

/// Receives every per-record outcome, in input order.
pub trait LookupObserver: Send + Sync {
    fn on_result(&self, index: usize, card: &CardRecord, request: &LookupRequest, result: &LookupResult);

    fn on_skipped(&self, _index: usize, _card: &CardRecord) {}
}
