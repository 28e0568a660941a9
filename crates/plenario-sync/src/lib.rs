//! Retrieval layer for `dadosabertos.camara.leg.br`: paginated listing,
//! per-id detail endpoints, retry with backoff.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{OpenDataClient, SyncError};
