//! SecureVPN Core - Demo Client State
//!
//! Owns everything the client dashboard displays: the connection-state
//! state machine, the static server catalog, the session timer, and the
//! observed/masked address pairs.
//!
//! No tunnel exists behind any of this. "Connecting" is a fixed delay,
//! the masked address is fabricated, and disconnecting flips local
//! state back. The only real network activity in the workspace is the
//! one-shot public-address lookup in `securevpn-lookup`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   SessionDriver (tokio)              │
//! │                                                      │
//! │  toggle ──▶ delayed connect task ──▶ 1s tick task    │
//! │                    │                     │           │
//! │                    ▼                     ▼           │
//! │        ┌─────────────────────────────────────┐       │
//! │        │  ConnectionController (pure state)  │       │
//! │        │  status / selection / timer / masks │       │
//! │        └─────────────────────────────────────┘       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The controller is a deterministic, synchronous state machine so the
//! transition rules can be tested without a runtime; the driver adds
//! the scheduled callbacks (simulated connect latency, per-second
//! tick) on top.

mod address;
mod catalog;
mod driver;
mod session;
mod settings;

pub use address::{
    FixedMaskedGenerator, MaskedAddress, MaskedAddressGenerator, ObservedAddress,
    RandomMaskedGenerator, UNAVAILABLE,
};
pub use catalog::{CatalogError, ServerCatalog, ServerId, ServerProfile};
pub use driver::{DriverConfig, SessionDriver};
pub use session::{
    format_uptime, ConnectionController, ConnectionStatus, StatusSnapshot, ToggleOutcome,
};
pub use settings::{Settings, SettingsError};
