//! se-eos: equation of state, phase and opacity engine for silicate materials.
//!
//! Provides:
//! - Inverse table builders on a rayon worker pool ((S, P) -> (rho, T), (u, rho) -> T)
//! - The unified query: any of (rho, u), (rho, T), (P, S) in, the full state out
//! - Phase classification and vapor quality from the saturation dome
//! - Vapor and droplet absorption coefficients and the inverse opacity table
//! - Radiative cooling helpers
//!
//! # Architecture
//!
//! An [`EosContext`] is built once per material (optionally through a
//! [`se_cache::TableStore`]) and is immutable afterwards, so it can be shared across
//! threads behind an `Arc`. [`EosRegistry`] maps material ids to contexts.
//!
//! Points outside a table's domain evaluate to NaN rather than failing; errors are
//! reserved for malformed inputs, configuration and cache problems.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use se_eos::{EosConfig, EosContext, EosQuery};
//! use se_tables::{MaterialTable, MaterialTableData};
//!
//! # fn data() -> MaterialTableData { unimplemented!() }
//! # fn main() -> se_eos::EosResult<()> {
//! let material = Arc::new(MaterialTable::new(data())?);
//! let ctx = EosContext::build_with_forward_inversion(material, EosConfig::default())?;
//! let state = ctx.query_one(&EosQuery::new().density(1.0).temperature(3000.0))?;
//! println!("phase: {}", ctx.phase(state.entropy_j_per_kg_k, state.pressure_pa()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod cooling;
pub mod error;
pub mod inverse;
pub mod opacity;
pub mod phase;
pub mod query;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{EosConfig, OpacityGridConfig, SpGridConfig, URhoGridConfig};
pub use context::{EosContext, EosRegistry, TableOrigin, TableOrigins, cache_key};
pub use cooling::{
    RadiatingCell, ThresholdCooling, cooling_time, emissivity, luminosity, optical_depth,
};
pub use error::{EosError, EosResult};
pub use inverse::{
    FlaggedCell, ForwardEnergyInversion, InverseEnergyTable, InversePair, InverseStateTable,
    TableBuilder,
};
pub use opacity::{InverseOpacityTable, OpacityModel, VaporAbsorption};
pub use phase::{Phase, SaturationModel};
pub use query::{EosQuery, EosState, QueryPair, Samples};
