pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::adapters::pacing::{FixedDelay, NoDelay};
pub use crate::adapters::scryfall::{ScryfallClient, ScryfallConfig};
pub use crate::app::pipelines::card_image_pipeline::CardImagePipeline;
pub use crate::core::enrich::{CancelFlag, CardEnricher};
pub use crate::core::etl::EtlEngine;
pub use crate::core::query::build_lookup_request;
pub use crate::domain::model::{CardRecord, EnrichedCard, LookupRequest, LookupResult, RemoteFailure};
pub use crate::utils::error::{EtlError, Result};
