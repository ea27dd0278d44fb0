//! Query construction for Scryfall lookups.
//!
//! Card names in collection exports carry printing hints such as
//! "(Borderless)" or "(The List)". The name is cleaned for the search text,
//! while keyword detection runs on the original name.

use crate::domain::model::LookupRequest;

/// The List / Mystery Booster reprints
pub const THE_LIST_SET: &str = "plist";

/// Secret Lair 系列的 set code 前綴
pub const SECRET_LAIR_PREFIX: &str = "sl";

pub const BORDERLESS_MODIFIER: &str = "is:borderless";
pub const SHOWCASE_MODIFIER: &str = "frame:showcase";
pub const EXTENDED_ART_MODIFIER: &str = "frame:extendedart";
pub const RAINBOW_FOIL_MODIFIER: &str = "finish:rainbow_foil";

/// Frame treatment keywords, checked in priority order.
const FRAME_MODIFIERS: &[(&str, &str)] = &[
    ("borderless", BORDERLESS_MODIFIER),
    ("showcase", SHOWCASE_MODIFIER),
    ("extended", EXTENDED_ART_MODIFIER),
];

/// Derive the lookup for one card.
///
/// A non-empty collector number always wins and yields an exact lookup;
/// otherwise the search text is `"{name} set:{set}"` plus at most one frame
/// modifier and, independently, the rainbow-foil finish modifier.
///
/// Any name containing "list" is routed to the `plist` set, including names
/// like "Checklist" that only contain it as a substring.
pub fn build_lookup_request(
    name: &str,
    set_code: &str,
    collector_number: Option<&str>,
) -> LookupRequest {
    let cleaned_name = name.split('(').next().unwrap_or_default().trim();
    let lowered_name = name.to_lowercase();

    let mut set_code = set_code.trim().to_lowercase();
    if lowered_name.contains("list") || set_code == THE_LIST_SET {
        set_code = THE_LIST_SET.to_string();
    }

    if let Some(collector_number) = collector_number
        .map(str::trim)
        .filter(|number| !number.is_empty())
    {
        return LookupRequest::ExactLookup {
            set_code,
            collector_number: collector_number.to_string(),
        };
    }

    let mut query = format!("{} set:{}", cleaned_name, set_code);

    // 框架修飾只取第一個符合的
    if let Some((_, modifier)) = FRAME_MODIFIERS
        .iter()
        .find(|(keyword, _)| lowered_name.contains(keyword))
    {
        query.push(' ');
        query.push_str(modifier);
    }

    if lowered_name.contains("rainbow foil") || set_code.starts_with(SECRET_LAIR_PREFIX) {
        query.push(' ');
        query.push_str(RAINBOW_FOIL_MODIFIER);
    }

    LookupRequest::SearchQuery { query }
}
