#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Primitive type side of the C ABI layout engine.
//!
//! Two layers:
//! - **Descriptors**: `TypeDescriptor` / `ScalarKind` describe size, alignment and
//!   indirection of a primitive type.
//! - **Provider**: `TypeProvider` resolves type names and moves scalar values in and
//!   out of raw byte buffers. `NativeTypes` is the stock implementation.
//!
//! `Value` is the plain output representation shared by providers and instances.

mod colors;
mod error;
mod native;
mod provider;
mod types;
mod value;

#[cfg(test)]
mod native_tests;
#[cfg(test)]
mod value_tests;

pub use colors::Colors;
pub use error::TypeError;
pub use native::NativeTypes;
pub use provider::{SignCache, TypeProvider, probe_signed};
pub use types::{ScalarKind, TypeDescriptor};
pub use value::Value;
