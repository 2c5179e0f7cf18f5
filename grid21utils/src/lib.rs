//!
//! # Grid21 Internal Utilities Crate
//!
//! Containers shared by the spatial index: growable arrays, segmented arrays,
//! generation-checked object pools, a chained string hash and a name table.
//! Plus the serialization and error-helper plumbing used across the workspace.
//!

pub mod array;
pub use array::*;

pub mod segmented;
pub use segmented::*;

pub mod pool;
pub use pool::*;

pub mod hash;
pub use hash::*;

pub mod names;
pub use names::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod enumstr;
pub use enumstr::*;
