//! Purpose: Define the stable public Rust API boundary for advcsv.
//! Exports: Decode entrypoints, record tables, the conversion hook, and errors.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to decoding primitives.
//! Invariants: `impl_record!` expands to paths under `advcsv::api` only.

pub use crate::core::capability::{Parsed, Slot, UnmarshalCsv};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::pipeline::{decode, read_headers, DecodeOptions, Decoder};
pub use crate::core::record::decode_record;
pub use crate::core::resolve::{resolve_bindings, Binding, DuplicateHeaders};
pub use crate::core::schema::{
    FieldDescriptor, FieldKind, FieldPath, FieldTag, Record, Schema, SchemaBuilder,
};
pub use crate::core::shape::{validate_destination, Element, ElementShape, TypeShape};
