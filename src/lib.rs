//! # SourceKit Bridge
//!
//! **A typed request/response bridge to the SourceKit source-analysis
//! engine.**
//!
//! Callers describe requests with the closed [`request::Request`] enum. The
//! bridge encodes each one as the engine's key/value object graph, performs
//! a blocking round trip, and decodes the engine's tagged response into a
//! plain [`value::Value`] tree, interning every UID name it meets.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌───────────┐
//! │ Request  │──▶│ WireObject │──▶│  Engine  │──▶│  Variant  │
//! │  (enum)  │   │  (build)   │   │  (sync)  │   │ (tagged)  │
//! └──────────┘   └────────────┘   └────┬─────┘   └─────┬─────┘
//!                                      │ notify        │ decode
//!                                      ▼               ▼
//!                               ┌─────────────┐   ┌──────────┐
//!                               │RestoreSignal│   │  Value   │
//!                               └─────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! skb request cursor-info --file main.swift --offset 42 -- -sdk /path/to/sdk main.swift
//! skb replay fixture.json index --file main.swift
//! skb completions zsh > _skb
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`value`] | Decoded response tree |
//! | [`request`] | Request kinds and their wire encoding |
//! | [`engine`] | The blocking engine boundary |
//! | [`session`] | Best-effort and failable sends |
//! | [`health`] | Run-once setup and restoration signalling |
//! | [`replay`] | Fixture-backed engine |
//! | [`fixture`] | JSON encoding of wire values |
//! | [`config`] | TOML configuration |
//! | [`logging`] | Diagnostic output |

pub mod config;
pub mod engine;
pub mod fixture;
pub mod health;
pub mod logging;
pub mod replay;
pub mod request;
pub mod session;
pub mod value;

pub use sourcekit_bridge_core::error::{ErrorKind, RequestError};
