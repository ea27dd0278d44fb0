use crate::domain::model::{CardObject, LookupResult, SearchResponse};

/// Image size stored in the output records.
pub const IMAGE_SIZE: &str = "normal";

/// 從單張卡片物件取出 normal 尺寸的圖片網址
///
/// Single-faced cards carry `image_uris` at the top level. Double-faced and
/// modal cards only carry them per face; the front face is used.
pub fn extract_image_url(card: &CardObject) -> LookupResult {
    tracing::debug!("🃏 Resolved card: {}", card.label());

    let image_uris = match (&card.image_uris, &card.card_faces) {
        (Some(uris), _) => Some(uris),
        (None, Some(faces)) => faces.first().and_then(|face| {
            tracing::debug!("Using front face: {}", face.name.as_deref().unwrap_or("<unnamed>"));
            face.image_uris.as_ref()
        }),
        (None, None) => None,
    };

    match image_uris.and_then(|uris| uris.get(IMAGE_SIZE)) {
        Some(url) => LookupResult::Found {
            image_url: url.clone(),
        },
        None => LookupResult::NotFound,
    }
}

/// 搜尋結果只看排名第一的卡片
pub fn first_search_hit(response: &SearchResponse) -> LookupResult {
    response
        .data
        .first()
        .map(extract_image_url)
        .unwrap_or(LookupResult::NotFound)
}
