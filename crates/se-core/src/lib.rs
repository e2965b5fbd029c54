//! se-core: shared foundation for the silicate EOS workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (scalar validation, fractional error helpers)
//! - ids (material identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::MaterialId;
pub use numeric::*;
pub use units::*;
