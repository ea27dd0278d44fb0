pub mod enrich;
pub mod etl;
pub mod normalize;
pub mod query;

pub use crate::domain::model::{CardRecord, EnrichedCard, EnrichmentReport, LookupRequest, LookupResult};
pub use crate::domain::ports::{CardLookup, ConfigProvider, LookupObserver, Pacer, Pipeline, Storage};
pub use crate::utils::error::Result;
