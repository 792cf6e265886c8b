//! Decoded response values, re-exported from `sourcekit-bridge-core`.
//!
//! # Example
//!
//! ```rust
//! use sourcekit_bridge::value::Value;
//!
//! let small = Value::from_iter([("key.offset", Value::Int64(5))]);
//! let large = Value::from_iter([
//!     ("key.offset", Value::Int64(5)),
//!     ("key.name", Value::from("foo")),
//! ]);
//! assert!(small.structurally_equals(&large));
//! assert!(!large.structurally_equals(&small));
//! ```

pub use sourcekit_bridge_core::value::*;
