use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const COLLECTOR_NUMBER_FIELD: &str = "CollectorNumber";

/// 輸入的卡片記錄，其餘欄位（含 CollectorNumber）依原順序原樣保留
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Set", default)]
    pub set: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CardRecord {
    pub fn new(name: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            set: set.into(),
            ..Default::default()
        }
    }

    pub fn with_collector_number(mut self, collector_number: impl Into<String>) -> Self {
        self.extra.insert(
            COLLECTOR_NUMBER_FIELD.to_string(),
            serde_json::Value::String(collector_number.into()),
        );
        self
    }

    /// Collector number as lookup text. Accepts a string or a number; null and blank count as absent.
    pub fn collector_number(&self) -> Option<String> {
        let text = match self.extra.get(COLLECTOR_NUMBER_FIELD)? {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(text).filter(|number| !number.is_empty())
    }
}

/// 加上圖片網址的輸出記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCard {
    #[serde(flatten)]
    pub record: CardRecord,

    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
}

impl EnrichedCard {
    pub fn new(record: &CardRecord, image_url: Option<String>) -> Self {
        let mut record = record.clone();
        record.extra.shift_remove("ImageURL");
        Self { record, image_url }
    }
}

/// Request descriptor derived from a card's name, set and collector number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    /// `/cards/{set}/{number}`
    ExactLookup {
        set_code: String,
        collector_number: String,
    },
    /// Full-text search; `query` holds the unencoded search text.
    SearchQuery { query: String },
}

impl LookupRequest {
    /// Percent-encoded form of the search text, as it goes on the wire.
    pub fn encoded_query(&self) -> Option<String> {
        match self {
            LookupRequest::SearchQuery { query } => Some(urlencoding::encode(query).into_owned()),
            LookupRequest::ExactLookup { .. } => None,
        }
    }
}

impl std::fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupRequest::ExactLookup {
                set_code,
                collector_number,
            } => write!(f, "exact {}/{}", set_code, collector_number),
            LookupRequest::SearchQuery { query } => write!(f, "search \"{}\"", query),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Non-success HTTP status other than 404.
    Status(u16),
    /// Timeout, connection failure or an undecodable payload.
    Transport(String),
}

impl std::fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteFailure::Status(code) => write!(f, "HTTP {}", code),
            RemoteFailure::Transport(message) => write!(f, "{}", message),
        }
    }
}

/// Outcome of one lookup. Every variant is an expected value; none aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Found { image_url: String },
    NotFound,
    RemoteError(RemoteFailure),
}

impl LookupResult {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            LookupResult::Found { image_url } => Some(image_url),
            _ => None,
        }
    }
}

/// Scryfall 卡片物件中與圖片相關的欄位
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub collector_number: Option<String>,
    #[serde(default)]
    pub image_uris: Option<HashMap<String, String>>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

impl CardObject {
    /// `Name (set #number)` for log lines, with whatever parts Scryfall returned
    pub fn label(&self) -> String {
        let name = self.name.as_deref().unwrap_or("<unnamed>");
        match (self.set.as_deref(), self.collector_number.as_deref()) {
            (Some(set), Some(number)) => format!("{} ({} #{})", name, set, number),
            (Some(set), None) => format!("{} ({})", name, set),
            _ => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_uris: Option<HashMap<String, String>>,
}

/// `/cards/search` 回應
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<CardObject>,
    #[serde(default)]
    pub total_cards: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub remote_errors: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn start(total: usize) -> Self {
        let now = Utc::now();
        Self {
            total,
            found: 0,
            not_found: 0,
            remote_errors: 0,
            skipped: 0,
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn record(&mut self, result: &LookupResult) {
        match result {
            LookupResult::Found { .. } => self.found += 1,
            LookupResult::NotFound => self.not_found += 1,
            LookupResult::RemoteError(_) => self.remote_errors += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.found + self.not_found + self.remote_errors
    }
}

/// Output of the transform phase.
#[derive(Debug, Clone)]
pub struct EnrichmentReport {
    pub cards: Vec<EnrichedCard>,
    pub summary: RunSummary,
}
