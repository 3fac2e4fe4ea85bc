#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! C ABI layouts over raw byte buffers.
//!
//! This crate contains:
//! - Layout engines for structs (Microsoft bitfield rules) and unions
//! - `CompositeType` schemas with an Open → Frozen lifecycle
//! - Field accessors, including masked bitfield reads and writes
//! - `Instance`: a schema paired with its backing bytes
//! - Debug helpers: layout tracing, dumps, JSON declarations
//!
//! ```
//! use cabi_layout::{CompositeType, Decl, Instance};
//!
//! let mut flags = CompositeType::new_struct();
//! flags
//!     .add_field("kind", Decl::bitfield("uint32", 3))?
//!     .add_field("ready", Decl::bitfield("uint32", 1))?
//!     .add_field("count", "int16")?;
//! assert_eq!(flags.size(), 8);
//!
//! let mut value = Instance::new(&flags);
//! value.set("kind", 5)?;
//! value.set("count", -2)?;
//! assert_eq!(value.to_json()?, r#"{"kind":5,"ready":0,"count":-2}"#);
//! # Ok::<(), cabi_layout::LayoutError>(())
//! ```

pub mod accessor;
pub mod bits;
pub mod decl;
pub mod dump;
pub mod error;
pub mod instance;
mod json;
pub mod layout;
pub mod options;
pub mod schema;
pub mod trace;
pub mod union_layout;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod json_tests;
#[cfg(test)]
mod trace_tests;
#[cfg(test)]
mod union_layout_tests;

// Re-export commonly used items at crate root
pub use accessor::FieldAccessor;
pub use cabi_core::{Colors, NativeTypes, ScalarKind, TypeDescriptor, TypeError, TypeProvider, Value};
pub use decl::{ArrayType, BitfieldSpec, Decl, FieldType};
pub use dump::dump;
pub use error::{LayoutError, Result};
pub use instance::Instance;
pub use layout::{BitPlacement, FieldLayout, Layout, Placement, Target, compute_layout};
pub use options::LayoutOptions;
pub use schema::{CompositeKind, CompositeType, FieldInfo, RESERVED_FIELD_NAMES, SharedProvider};
pub use trace::{LayoutTracer, NoopTracer, PadReason, PrintTracer};
pub use union_layout::compute_union_layout;
