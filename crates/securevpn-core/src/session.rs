//! Connection Controller
//!
//! The client-side connection state machine. Three states:
//!
//! ```text
//!                toggle              complete_connect
//! Disconnected ─────────▶ Connecting ─────────────────▶ Connected
//!       ▲                     │                             │
//!       │                     └── toggle: no-op             │
//!       └──────────────────────── toggle ───────────────────┘
//! ```
//!
//! The simulated connect always succeeds, so there is no error state
//! and no cancellation path out of `Connecting`. All operations here
//! are synchronous and total; `SessionDriver` supplies the scheduled
//! callbacks that call `complete_connect` and `tick`.

use crate::address::{MaskedAddress, MaskedAddressGenerator, ObservedAddress};
use crate::catalog::{CatalogError, ServerCatalog, ServerId, ServerProfile};
use tracing::debug;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No session, masked pair cleared (initial state)
    Disconnected,
    /// Simulated negotiation in progress, toggle disabled
    Connecting,
    /// Session up, masked pair populated, timer running
    Connected,
}

impl ConnectionStatus {
    /// Check if the session is up
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    /// Check if the simulated negotiation is in progress
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionStatus::Connecting)
    }

    /// Badge text shown on the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Left Disconnected; the caller must schedule `complete_connect`
    ConnectStarted,
    /// Left Connected; masked pair cleared, timer reset
    Disconnected,
    /// Toggle arrived while Connecting and was ignored
    Ignored,
}

/// Point-in-time copy of everything the dashboard renders
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Current state
    pub status: ConnectionStatus,
    /// Selected catalog entry
    pub server: ServerProfile,
    /// Real public addresses (per-family, may be unavailable)
    pub observed: ObservedAddress,
    /// Fabricated pair, `Some` only while connected
    pub masked: Option<MaskedAddress>,
    /// Seconds since entering Connected
    pub uptime_secs: u64,
}

/// The connection-state state machine
///
/// Invariants, held after every operation:
/// - exactly one enabled catalog entry is selected
/// - the masked pair is `Some` only while Connected
/// - the session timer is non-zero only while Connected
pub struct ConnectionController {
    status: ConnectionStatus,
    catalog: ServerCatalog,
    selected: ServerId,
    observed: ObservedAddress,
    masked: Option<MaskedAddress>,
    uptime_secs: u64,
    generator: Box<dyn MaskedAddressGenerator>,
}

impl ConnectionController {
    /// Create a controller over a catalog
    ///
    /// The first enabled entry becomes the initial selection.
    pub fn new(
        catalog: ServerCatalog,
        generator: Box<dyn MaskedAddressGenerator>,
    ) -> Result<Self, CatalogError> {
        let selected = catalog
            .first_enabled()
            .ok_or(CatalogError::EmptyCatalog)?
            .id;

        Ok(Self {
            status: ConnectionStatus::Disconnected,
            catalog,
            selected,
            observed: ObservedAddress::default(),
            masked: None,
            uptime_secs: 0,
            generator,
        })
    }

    /// Create over the built-in catalog
    pub fn with_defaults(generator: Box<dyn MaskedAddressGenerator>) -> Self {
        Self::new(ServerCatalog::default(), generator)
            .expect("built-in catalog has enabled entries")
    }

    /// Current state
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Selected server id
    pub fn selected(&self) -> ServerId {
        self.selected
    }

    /// Selected catalog entry
    pub fn selected_profile(&self) -> &ServerProfile {
        self.catalog
            .find(self.selected)
            .expect("selection always points into the catalog")
    }

    /// The catalog this session selects from
    pub fn catalog(&self) -> &ServerCatalog {
        &self.catalog
    }

    /// Real public addresses as last reported
    pub fn observed(&self) -> ObservedAddress {
        self.observed
    }

    /// Store the startup lookup result
    pub fn set_observed(&mut self, observed: ObservedAddress) {
        self.observed = observed;
    }

    /// Fabricated pair, `Some` only while connected
    pub fn masked(&self) -> Option<MaskedAddress> {
        self.masked
    }

    /// Seconds since entering Connected
    pub fn uptime_secs(&self) -> u64 {
        self.uptime_secs
    }

    /// Handle the connect/disconnect button
    pub fn toggle(&mut self) -> ToggleOutcome {
        match self.status {
            ConnectionStatus::Disconnected => {
                self.status = ConnectionStatus::Connecting;
                ToggleOutcome::ConnectStarted
            }
            ConnectionStatus::Connecting => {
                debug!("toggle ignored while connecting");
                ToggleOutcome::Ignored
            }
            ConnectionStatus::Connected => {
                self.status = ConnectionStatus::Disconnected;
                self.masked = None;
                self.uptime_secs = 0;
                ToggleOutcome::Disconnected
            }
        }
    }

    /// Finish the simulated negotiation
    ///
    /// Called by the driver once the fixed delay elapses. Only acts
    /// while Connecting; the simulated connect cannot fail.
    pub fn complete_connect(&mut self) {
        if !self.status.is_connecting() {
            return;
        }

        self.status = ConnectionStatus::Connected;
        self.masked = Some(self.generator.generate());
        self.uptime_secs = 0;
    }

    /// Advance the session timer by one second
    ///
    /// Counts only while Connected; a stray tick in any other state
    /// changes nothing.
    pub fn tick(&mut self) {
        if self.status.is_connected() {
            self.uptime_secs += 1;
        }
    }

    /// Replace the selection
    ///
    /// Allowed in every state, including mid-connection; no
    /// re-handshake is modeled, so nothing else changes.
    pub fn select_server(&mut self, id: ServerId) -> Result<(), CatalogError> {
        if self.catalog.find(id).is_none() {
            return Err(CatalogError::UnknownServer(id.to_string()));
        }

        self.selected = id;
        debug!("selected server: {}", id);
        Ok(())
    }

    /// Copy out everything the dashboard renders
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            server: self.selected_profile().clone(),
            observed: self.observed,
            masked: self.masked,
            uptime_secs: self.uptime_secs,
        }
    }
}

/// Format a session timer as HH:MM:SS
pub fn format_uptime(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}
