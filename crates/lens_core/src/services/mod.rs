//! Backend services for Lens.
//!
//! - `analysis` - HTTP client for the remote analysis service and the transport seam

pub mod analysis;

pub use analysis::{AnalysisClient, AnalysisTransport};
