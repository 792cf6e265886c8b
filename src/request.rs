//! Request kinds and their wire encoding, re-exported from
//! `sourcekit-bridge-core`.
//!
//! # Example
//!
//! ```rust
//! use sourcekit_bridge::request::{key, Request, RequestBuilder};
//!
//! let builder = RequestBuilder::new("/sdk");
//! let wire = builder.build(&Request::CursorInfo {
//!     file: "/a.swift".into(),
//!     offset: 42,
//!     arguments: vec![],
//! });
//! assert_eq!(wire.get(key::OFFSET).and_then(|v| v.as_i64()), Some(42));
//! ```

pub use sourcekit_bridge_core::request::*;
pub use sourcekit_bridge_core::wire::WireObject;
