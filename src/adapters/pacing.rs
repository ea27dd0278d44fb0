use crate::domain::ports::Pacer;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Default pause between two Scryfall requests
pub const DEFAULT_DELAY_MS: u64 = 100;

/// 上限一分鐘
pub const MAX_DELAY_MS: u64 = 60_000;

/// 每筆查詢後固定等待一段時間
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 跑完 `lookups` 筆查詢至少需要的等待時間，溢位時回傳 `Duration::MAX`
    pub fn total_for(&self, lookups: usize) -> Duration {
        u32::try_from(lookups)
            .ok()
            .and_then(|count| self.delay.checked_mul(count))
            .unwrap_or(Duration::MAX)
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DELAY_MS)
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// No pause at all. Meant for tests and local mock servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self) {}
}
