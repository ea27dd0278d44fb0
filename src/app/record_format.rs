use crate::domain::model::{CardRecord, EnrichedCard};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::path::Path;

pub const NAME_COLUMN: &str = "Name";
pub const SET_COLUMN: &str = "Set";
pub const IMAGE_URL_COLUMN: &str = "ImageURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv,
}

impl RecordFormat {
    /// 由副檔名判斷格式
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Ok(RecordFormat::Json),
            Some("csv") => Ok(RecordFormat::Csv),
            _ => Err(EtlError::UnsupportedFormat {
                path: path.to_string(),
            }),
        }
    }

    pub fn decode(self, data: &[u8]) -> Result<Vec<CardRecord>> {
        match self {
            RecordFormat::Json => Ok(serde_json::from_slice(data)?),
            RecordFormat::Csv => decode_csv(data),
        }
    }

    pub fn encode(self, cards: &[EnrichedCard]) -> Result<Vec<u8>> {
        match self {
            RecordFormat::Json => encode_json(cards),
            RecordFormat::Csv => encode_csv(cards),
        }
    }
}

fn decode_csv(data: &[u8]) -> Result<Vec<CardRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut cards = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut card = CardRecord::default();

        for (header, value) in headers.iter().zip(row.iter()) {
            match header.trim() {
                NAME_COLUMN => card.name = value.to_string(),
                SET_COLUMN => card.set = value.to_string(),
                // 舊的輸出檔再跑一次時覆寫
                IMAGE_URL_COLUMN => {}
                other => {
                    card.extra.insert(
                        other.to_string(),
                        serde_json::Value::String(value.to_string()),
                    );
                }
            }
        }
        cards.push(card);
    }

    Ok(cards)
}

/// Four-space indent, non-ASCII kept as-is.
fn encode_json(cards: &[EnrichedCard]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    cards.serialize(&mut serializer)?;
    Ok(buffer)
}

fn encode_csv(cards: &[EnrichedCard]) -> Result<Vec<u8>> {
    // 欄位順序：Name、Set、其餘欄位（依輸入順序）、ImageURL
    let mut extra_columns: Vec<&str> = Vec::new();
    for card in cards {
        for key in card.record.extra.keys() {
            if !extra_columns.contains(&key.as_str()) {
                extra_columns.push(key);
            }
        }
    }
    let mut header = vec![NAME_COLUMN, SET_COLUMN];
    header.extend(extra_columns.iter().copied());
    header.push(IMAGE_URL_COLUMN);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for card in cards {
        let mut row: Vec<String> = vec![card.record.name.clone(), card.record.set.clone()];
        for column in &extra_columns {
            row.push(match card.record.extra.get(*column) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            });
        }
        row.push(card.image_url.clone().unwrap_or_default());
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("failed to flush CSV output: {}", e),
    })
}
