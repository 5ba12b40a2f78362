//! # attrs-core — Foundational Types for the Attribute Layer
//!
//! This crate is the leaf of the workspace. It defines the scalar value
//! model and the primitive coercion rules that every declared attribute
//! ultimately bottoms out in. `attrs-model` depends on it; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed set of primitive kinds.** `PrimitiveKind` is one enum with an
//!    exhaustive `match` in the coercion table. Adding a kind forces the
//!    conversion rules, the zero value, and the display name to be written.
//!
//! 2. **One failure policy.** Every primitive conversion that cannot
//!    interpret its input returns a typed [`ConversionError`]. There is no
//!    silent fallback to a zero value anywhere in the table.
//!
//! 3. **Idempotent coercion.** Coercing a scalar that is already of the
//!    target kind returns it unchanged.
//!
//! 4. **UTC-only date/times.** Textual date/times with offsets are
//!    normalized to UTC; naive date/times are assumed UTC.
//!
//! 5. **Content digests flow through `CanonicalBytes`.** Fingerprints of
//!    flattened state are computed over RFC 8785 canonical JSON only.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `attrs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod primitive;
pub mod scalar;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use config::{AbsentPolicy, EngineConfig};
pub use digest::ContentDigest;
pub use error::{
    AttrsError, CanonicalizationError, CoercionError, ConfigError, ConversionError, RegistryError,
};
pub use primitive::{coerce_scalar, PrimitiveKind};
pub use scalar::Scalar;
