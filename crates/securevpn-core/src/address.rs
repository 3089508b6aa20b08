//! Address Display Types
//!
//! Two address pairs appear on the dashboard:
//!
//! - **Observed**: the caller's real public addresses, fetched once at
//!   startup by `securevpn-lookup`. Either family can be missing and
//!   is then shown as "unavailable".
//! - **Masked**: a fabricated pair generated on every connect. It is
//!   random display data, not a network identity, and exists only
//!   while the session is connected.
//!
//! Masked generation sits behind a trait so tests can inject a fixed
//! generator and assert exact output.

use rand::Rng;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Shown when an address family could not be determined
pub const UNAVAILABLE: &str = "unavailable";

/// The caller's real public addresses, one slot per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObservedAddress {
    /// Public IPv4, `None` if the lookup failed
    pub public_v4: Option<Ipv4Addr>,
    /// Public IPv6, `None` if the lookup failed
    pub public_v6: Option<Ipv6Addr>,
}

impl ObservedAddress {
    /// Create with both families known
    pub fn new(public_v4: Ipv4Addr, public_v6: Ipv6Addr) -> Self {
        Self {
            public_v4: Some(public_v4),
            public_v6: Some(public_v6),
        }
    }

    /// IPv4 display value
    pub fn display_v4(&self) -> String {
        match self.public_v4 {
            Some(addr) => addr.to_string(),
            None => UNAVAILABLE.to_string(),
        }
    }

    /// IPv6 display value
    pub fn display_v6(&self) -> String {
        match self.public_v6 {
            Some(addr) => addr.to_string(),
            None => UNAVAILABLE.to_string(),
        }
    }
}

impl std::fmt::Display for ObservedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.display_v4(), self.display_v6())
    }
}

/// Fabricated address pair shown while connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskedAddress {
    /// Fabricated IPv4
    pub v4: Ipv4Addr,
    /// Fabricated IPv6
    pub v6: Ipv6Addr,
}

impl std::fmt::Display for MaskedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.v4, self.v6)
    }
}

/// Source of masked addresses
///
/// The session controller calls this on every transition into the
/// connected state.
pub trait MaskedAddressGenerator: Send + Sync {
    /// Fabricate a fresh masked pair
    fn generate(&mut self) -> MaskedAddress;
}

/// Default generator: uniformly random octets and segments
///
/// The IPv6 half stays inside the 2001:db8::/32 documentation prefix
/// so the fabricated value can never collide with a routable address.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMaskedGenerator;

impl MaskedAddressGenerator for RandomMaskedGenerator {
    fn generate(&mut self) -> MaskedAddress {
        let mut rng = rand::thread_rng();
        MaskedAddress {
            v4: Ipv4Addr::new(
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
                rng.gen_range(0..=255),
            ),
            v6: Ipv6Addr::new(
                0x2001,
                0xdb8,
                rng.gen_range(0..=0xffff),
                rng.gen_range(0..=0xffff),
                rng.gen_range(0..=0xffff),
                rng.gen_range(0..=0xffff),
                rng.gen_range(0..=0xffff),
                rng.gen_range(0..=0xffff),
            ),
        }
    }
}

/// Test generator returning the same pair every time
#[derive(Debug, Clone, Copy)]
pub struct FixedMaskedGenerator {
    /// The pair handed out on every call
    pub masked: MaskedAddress,
}

impl FixedMaskedGenerator {
    /// Create with a fixed pair
    pub fn new(v4: Ipv4Addr, v6: Ipv6Addr) -> Self {
        Self {
            masked: MaskedAddress { v4, v6 },
        }
    }
}

impl MaskedAddressGenerator for FixedMaskedGenerator {
    fn generate(&mut self) -> MaskedAddress {
        self.masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_display_with_missing_family() {
        let observed = ObservedAddress {
            public_v4: Some(Ipv4Addr::new(203, 0, 113, 7)),
            public_v6: None,
        };

        assert_eq!(observed.display_v4(), "203.0.113.7");
        assert_eq!(observed.display_v6(), UNAVAILABLE);
        assert_eq!(observed.to_string(), "203.0.113.7 / unavailable");
    }

    #[test]
    fn test_observed_default_is_unavailable() {
        let observed = ObservedAddress::default();
        assert_eq!(observed.display_v4(), UNAVAILABLE);
        assert_eq!(observed.display_v6(), UNAVAILABLE);
    }

    #[test]
    fn test_random_generator_stays_in_doc_prefix() {
        let mut generator = RandomMaskedGenerator;
        let masked = generator.generate();

        assert_eq!(masked.v6.segments()[0], 0x2001);
        assert_eq!(masked.v6.segments()[1], 0xdb8);
    }

    #[test]
    fn test_fixed_generator_repeats() {
        let mut generator =
            FixedMaskedGenerator::new(Ipv4Addr::new(10, 1, 2, 3), Ipv6Addr::LOCALHOST);

        assert_eq!(generator.generate(), generator.generate());
        assert_eq!(generator.generate().v4, Ipv4Addr::new(10, 1, 2, 3));
    }
}
