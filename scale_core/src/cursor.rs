use std::net::IpAddr;

use crate::{
    address::{decode_addr, to_ip_addr, AddressFamily, Network},
    big_unsigned::BigUnsigned,
    error::{AddrSpaceErr, NetworkInputErr},
};

/// Walks a network from a starting address in fixed steps.
///
/// Every address produced is strictly below the network's upper bound (its last address),
/// so a cursor starting at A with step S under upper bound B produces `floor((B - 1 - A) / S)` addresses.
/// Once a step would reach or pass the upper bound the cursor reports [AddrSpaceErr::Exhausted],
/// keeps its last address and stays exhausted.
///
/// ```
/// # use scale_core::{address::Network, cursor::AddressCursor};
/// let net = Network::parse("10.0.0.252", 30).unwrap();
/// let mut cursor = AddressCursor::new(&net, 1).unwrap();
/// assert_eq!(cursor.advance().unwrap().to_string(), "10.0.0.253");
/// assert_eq!(cursor.advance().unwrap().to_string(), "10.0.0.254");
/// assert!(cursor.advance().is_err());
/// assert!(cursor.is_exhausted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCursor {
    family: AddressFamily,
    current: BigUnsigned,
    step: BigUnsigned,
    upper_bound: BigUnsigned,
    exhausted: bool,
}
impl AddressCursor {
    /// Build a cursor from a signed step. A zero step is treated as 1, a negative step is rejected.
    pub fn new(network: &Network, step: i64) -> Result<Self, NetworkInputErr> {
        let step = match step {
            s if s < 0 => return Err(NetworkInputErr::NegativeStep(s)),
            0 => BigUnsigned::ONE,
            s => BigUnsigned::from(s as u64),
        };
        Ok(Self::with_step(network, step))
    }

    /// Build a cursor with an arbitrary 128-bit step. A zero step is treated as 1.
    pub fn with_step(network: &Network, step: BigUnsigned) -> Self {
        Self {
            family: network.family(),
            current: decode_addr(network.start()),
            step: if step.is_zero() { BigUnsigned::ONE } else { step },
            upper_bound: network.upper_bound(),
            exhausted: false,
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }
    pub fn current(&self) -> IpAddr {
        to_ip_addr(self.current, self.family)
    }
    pub fn step(&self) -> BigUnsigned {
        self.step
    }
    pub fn upper_bound(&self) -> BigUnsigned {
        self.upper_bound
    }
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The starting address itself, under the same upper-bound rule as [AddressCursor::advance].
    /// A start at or beyond the upper bound exhausts the cursor.
    ///
    /// ```
    /// # use scale_core::{address::Network, cursor::AddressCursor};
    /// let net = Network::parse("10.0.0.255", 24).unwrap();
    /// let mut cursor = AddressCursor::new(&net, 1).unwrap();
    /// assert!(cursor.start_address().is_err());
    /// assert!(cursor.is_exhausted());
    /// ```
    pub fn start_address(&mut self) -> Result<IpAddr, AddrSpaceErr> {
        if self.exhausted || self.current >= self.upper_bound {
            self.exhausted = true;
            return Err(AddrSpaceErr::Exhausted(self.family));
        }
        Ok(self.current())
    }

    /// Step to the next address.
    pub fn advance(&mut self) -> Result<IpAddr, AddrSpaceErr> {
        if self.exhausted {
            return Err(AddrSpaceErr::Exhausted(self.family));
        }
        let remaining = self.upper_bound.saturating_sub(self.current);
        if remaining <= self.step {
            log::trace!(
                "{} cursor exhausted at {} (step {:#x}, upper bound {:#x})",
                self.family,
                self.current(),
                self.step,
                self.upper_bound
            );
            self.exhausted = true;
            return Err(AddrSpaceErr::Exhausted(self.family));
        }
        self.current = self.current.add(self.step);
        let addr = self.current();
        log::trace!("{} cursor advanced to {}", self.family, addr);
        Ok(addr)
    }
}
impl Iterator for AddressCursor {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        self.advance().ok()
    }
}
