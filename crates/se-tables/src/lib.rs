//! se-tables: tabulated material data and forward interpolation.
//!
//! Provides:
//! - Material tables (density/temperature grids, saturation curves, critical point)
//! - Axes and grid spacing for derived tables
//! - Coordinate pairs for element-wise lookups
//! - Bilinear 2-D and monotone 1-D interpolators
//! - The forward interpolator (ρ, T) → (P, S, u, c_s)
//!
//! # Architecture
//!
//! The `ForwardEos` trait isolates the inverse-table builder from the concrete
//! forward backend. The tabulated `ForwardInterpolator` is the default; any
//! thread-safe model that can evaluate a property at (ρ, T) may stand in for it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use se_tables::{ForwardEos, ForwardInterpolator, MaterialTable, MaterialTableData};
//!
//! # fn data() -> MaterialTableData { unimplemented!() }
//! let table = Arc::new(MaterialTable::new(data()).unwrap());
//! let forward = ForwardInterpolator::new(table).unwrap();
//! let props = forward.lookup(3000.0, 2000.0);
//! println!("P = {} Pa, S = {} J/kg/K", props.pressure, props.entropy);
//! ```

pub mod axis;
pub mod coords;
pub mod error;
pub mod forward;
pub mod interp;
pub mod inversion;
pub mod material;

// Re-exports for ergonomics
pub use axis::{Axis, AxisSpec, GridSpacing};
pub use coords::CoordinatePairs;
pub use error::{TableError, TableResult};
pub use forward::{ForwardEos, ForwardInterpolator, ForwardProperties};
pub use interp::{Linear1d, Table2d};
pub use inversion::DirectInversion;
pub use material::{
    CriticalPoint, MaterialTable, MaterialTableData, Property, ReferenceState, SaturationCurve,
    UnitScale,
};
