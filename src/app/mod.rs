// Application layer: concrete pipelines and record file formats.

pub mod pipelines;
pub mod record_format;
