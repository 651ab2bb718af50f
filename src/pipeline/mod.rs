// Pipelines: session bootstrap, the ingestion loop and the sentiment backfill.

pub mod backfill;
pub mod ingest;
pub mod session;

pub use backfill::BackfillSummary;
pub use ingest::{IngestLimits, IngestOptions, IngestSummary, StopReason};
pub use session::{SessionError, SessionOptions};
