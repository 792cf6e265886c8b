//! # SourceKit Bridge Core
//!
//! Engine-independent marshalling logic for SourceKit Bridge: the value
//! tree, UID interning, the request builder, and the response decoder.
//!
//! This crate performs no I/O and never calls the engine itself. Engine
//! access is expressed through three seams that an adapter implements:
//! [`uid::UidSource`] (naming UIDs), [`wire::ObjectBuilder`] (building
//! request objects), and [`variant::WireNode`] (reading responses).

pub mod decode;
pub mod error;
pub mod known;
pub mod request;
pub mod uid;
pub mod value;
pub mod variant;
pub mod wire;
