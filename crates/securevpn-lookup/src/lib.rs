//! SecureVPN Lookup - Public Address Discovery
//!
//! Asks an external address-lookup service for the caller's real
//! public IPv4 and IPv6 addresses, once, at startup. The two requests
//! are independent: they run concurrently, and a failure of either
//! family only marks that family unavailable on the dashboard. Nothing
//! here is fatal and nothing is retried.

mod client;

pub use client::{AddressLookup, LookupConfig, LookupError};
