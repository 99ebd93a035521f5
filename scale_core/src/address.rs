//! Conversion between network addresses and [BigUnsigned], and parsed CIDR networks.
//!
//! Addresses are treated as fixed-width big-endian integers: 4 bytes for IPv4, 16 bytes for IPv6.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use arrayvec::ArrayVec;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::{
    big_unsigned::BigUnsigned,
    error::{AddrSpaceErr, NetworkInputErr},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    V4,
    V6,
}
impl AddressFamily {
    pub const fn byte_len(self) -> usize {
        match self {
            Self::V4 => 4,
            Self::V6 => 16,
        }
    }

    pub const fn bits(self) -> usize {
        self.byte_len() * 8
    }

    /// The largest value an address of this family can hold, 2^32 - 1 or 2^128 - 1.
    pub const fn max_value(self) -> BigUnsigned {
        match self {
            Self::V4 => BigUnsigned::new(u32::MAX as u64, 0),
            Self::V6 => BigUnsigned::MAX,
        }
    }

    pub const fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    pub const fn from_byte_len(len: usize) -> Option<Self> {
        match len {
            4 => Some(Self::V4),
            16 => Some(Self::V6),
            _ => None,
        }
    }
}
impl core::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// The byte group of an address, most significant byte first.
pub type AddressBytes = ArrayVec<u8, 16>;

fn decode_group(bytes: &[u8]) -> BigUnsigned {
    bytes.iter().fold(BigUnsigned::ZERO, |acc, byte| {
        acc.left_shift(8).add(BigUnsigned::from(*byte))
    })
}

/// Decode a 4- or 16-byte address group into its integer value.
/// Returns None for any other length.
///
/// ```
/// # use scale_core::{address::decode, big_unsigned::BigUnsigned};
/// assert_eq!(decode(&[10, 0, 1, 2]), Some(BigUnsigned::from(0x0a00_0102u32)));
/// assert_eq!(decode(&[10, 0, 1]), None);
/// ```
pub fn decode(bytes: &[u8]) -> Option<BigUnsigned> {
    AddressFamily::from_byte_len(bytes.len())?;
    Some(decode_group(bytes))
}

pub fn decode_addr(addr: IpAddr) -> BigUnsigned {
    match addr {
        IpAddr::V4(v4) => decode_group(&v4.octets()),
        IpAddr::V6(v6) => decode_group(&v6.octets()),
    }
}

/// Encode a value as the byte group of `family`.
///
/// Only the low `family.bits()` bits are kept, so values above [AddressFamily::max_value] do not round-trip.
pub fn encode(value: BigUnsigned, family: AddressFamily) -> AddressBytes {
    let len = family.byte_len();
    (0..len)
        .map(|i| value.right_shift(8 * (len - 1 - i)).low_byte())
        .collect()
}

/// ```
/// # use scale_core::{address::{to_ip_addr, AddressFamily}, big_unsigned::BigUnsigned};
/// assert_eq!(to_ip_addr(BigUnsigned::from(0x0a00_0001u32), AddressFamily::V4).to_string(), "10.0.0.1");
/// assert_eq!(to_ip_addr(BigUnsigned::new(1, 0x2001_0db8_0000_0000), AddressFamily::V6).to_string(), "2001:db8::1");
/// ```
pub fn to_ip_addr(value: BigUnsigned, family: AddressFamily) -> IpAddr {
    let bytes = encode(value, family);
    match family {
        AddressFamily::V4 => IpAddr::V4(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3])),
        AddressFamily::V6 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&bytes);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    }
}

/// Offset an address by `by`, failing if the result would not fit in the address family at all.
///
/// Unlike an [crate::cursor::AddressCursor] this only checks the family bounds, not a network.
pub fn checked_offset(addr: IpAddr, by: BigUnsigned) -> Result<IpAddr, AddrSpaceErr> {
    let family = AddressFamily::of(&addr);
    let value = decode_addr(addr);
    let headroom = family.max_value().saturating_sub(value);
    if headroom < by {
        return Err(AddrSpaceErr::Exhausted(family));
    }
    Ok(to_ip_addr(value.add(by), family))
}

/// A starting address inside a CIDR network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    start: IpAddr,
    net: IpNet,
}
impl Network {
    pub fn new(start: IpAddr, prefix_len: u8) -> Result<Self, NetworkInputErr> {
        let net = IpNet::new(start, prefix_len).map_err(|_| NetworkInputErr::InvalidPrefix {
            family: AddressFamily::of(&start),
            prefix_len,
        })?;
        Ok(Self { start, net })
    }

    pub fn parse(address: &str, prefix_len: u8) -> Result<Self, NetworkInputErr> {
        let start: IpAddr = address
            .trim()
            .parse()
            .map_err(|_| NetworkInputErr::InvalidAddress(address.to_owned()))?;
        Self::new(start, prefix_len)
    }

    /// Parse `addr/prefix` notation, keeping the host bits of `addr` as the starting address.
    ///
    /// ```
    /// # use scale_core::address::Network;
    /// let net = Network::parse_cidr("10.0.0.7/24").unwrap();
    /// assert_eq!(net.start().to_string(), "10.0.0.7");
    /// assert_eq!(net.network_address().to_string(), "10.0.0.0");
    /// assert!(Network::parse_cidr("10.0.0.7").is_err());
    /// ```
    pub fn parse_cidr(cidr: &str) -> Result<Self, NetworkInputErr> {
        let (addr_part, prefix_part) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkInputErr::InvalidAddress(cidr.to_owned()))?;
        let start: IpAddr = addr_part
            .trim()
            .parse()
            .map_err(|_| NetworkInputErr::InvalidAddress(addr_part.trim().to_owned()))?;
        let prefix_len: u8 = prefix_part
            .trim()
            .parse()
            .map_err(|_| NetworkInputErr::InvalidAddress(cidr.to_owned()))?;
        Self::new(start, prefix_len)
    }

    /// Require the network to be of a particular family.
    pub fn expect_family(self, expected: AddressFamily) -> Result<Self, NetworkInputErr> {
        if self.family() == expected {
            Ok(self)
        } else {
            Err(NetworkInputErr::FamilyMismatch {
                expected,
                address: self.start,
            })
        }
    }

    pub const fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.start)
    }
    pub const fn start(&self) -> IpAddr {
        self.start
    }
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }
    pub fn network_address(&self) -> IpAddr {
        self.net.network()
    }

    /// The numeric value of the first address of the network.
    pub fn lower_bound(&self) -> BigUnsigned {
        decode_addr(self.net.network())
    }

    /// The numeric value of the last address of the network.
    pub fn upper_bound(&self) -> BigUnsigned {
        decode_addr(self.net.broadcast())
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.net.contains(addr)
    }
}
impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.start, self.net.prefix_len())
    }
}

#[cfg(test)]
mod test {
    use std::net::IpAddr;

    use proptest::prelude::*;

    use crate::{
        address::{checked_offset, decode, decode_addr, encode, to_ip_addr, AddressFamily, Network},
        big_unsigned::BigUnsigned,
        error::{AddrSpaceErr, NetworkInputErr},
    };

    #[test]
    fn decode_is_big_endian() {
        assert_eq!(decode(&[0x01, 0x02, 0x03, 0x04]), Some(BigUnsigned::from(0x0102_0304u32)));
        let v6: [u8; 16] = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01];
        assert_eq!(decode(&v6), Some(BigUnsigned::new(1, 0x2001_0db8_0000_0000)));
        assert_eq!(decode(&[0; 5]), None);
        assert_eq!(decode(&[]), None);
    }

    #[test]
    fn encode_extremes() {
        assert_eq!(encode(AddressFamily::V4.max_value(), AddressFamily::V4).as_slice(), &[0xff; 4]);
        assert_eq!(encode(BigUnsigned::MAX, AddressFamily::V6).as_slice(), &[0xff; 16]);
        assert_eq!(encode(BigUnsigned::ZERO, AddressFamily::V6).as_slice(), &[0; 16]);
    }

    #[test]
    fn decodes_parsed_addresses() {
        let addr: IpAddr = "192.168.1.10".parse().unwrap();
        assert_eq!(decode_addr(addr), BigUnsigned::from(0xc0a8_010au32));
        let addr: IpAddr = "ffff::".parse().unwrap();
        assert_eq!(decode_addr(addr), BigUnsigned::new(0, 0xffff_0000_0000_0000));
    }

    #[test]
    fn offset_stops_at_family_max() {
        let addr: IpAddr = "255.255.255.254".parse().unwrap();
        assert_eq!(checked_offset(addr, BigUnsigned::ONE).unwrap().to_string(), "255.255.255.255");
        assert_eq!(
            checked_offset(addr, BigUnsigned::from(2u32)),
            Err(AddrSpaceErr::Exhausted(AddressFamily::V4))
        );
        let addr: IpAddr = "10.0.0.250".parse().unwrap();
        assert_eq!(checked_offset(addr, BigUnsigned::from(10u32)).unwrap().to_string(), "10.0.1.4");
    }

    #[test]
    fn network_bounds() {
        let net = Network::parse("10.0.0.0", 24).unwrap();
        assert_eq!(net.family(), AddressFamily::V4);
        assert_eq!(net.lower_bound(), BigUnsigned::from(0x0a00_0000u32));
        assert_eq!(net.upper_bound(), BigUnsigned::from(0x0a00_00ffu32));
        assert!(net.contains(&"10.0.0.200".parse().unwrap()));
        assert!(!net.contains(&"10.0.1.0".parse().unwrap()));

        let net = Network::parse("2001:db8::", 64).unwrap();
        assert_eq!(net.upper_bound(), BigUnsigned::new(u64::MAX, 0x2001_0db8_0000_0000));
        assert_eq!(net.to_string(), "2001:db8::/64");
    }

    #[test]
    fn malformed_networks() {
        assert_eq!(
            Network::parse("10.0.0.256", 24),
            Err(NetworkInputErr::InvalidAddress("10.0.0.256".to_owned()))
        );
        assert_eq!(
            Network::parse("10.0.0.0", 33),
            Err(NetworkInputErr::InvalidPrefix { family: AddressFamily::V4, prefix_len: 33 })
        );
        assert!(Network::parse("::1", 129).is_err());
        assert!(matches!(
            Network::parse("::1", 64).unwrap().expect_family(AddressFamily::V4),
            Err(NetworkInputErr::FamilyMismatch { expected: AddressFamily::V4, .. })
        ));
    }

    proptest! {
        #[test]
        fn v4_codec_round_trips(v in any::<u32>()) {
            let value = BigUnsigned::from(v);
            prop_assert_eq!(decode(&encode(value, AddressFamily::V4)), Some(value));
            prop_assert_eq!(to_ip_addr(value, AddressFamily::V4), IpAddr::from(v.to_be_bytes()));
        }

        #[test]
        fn v6_codec_round_trips(v in any::<u128>()) {
            let value = BigUnsigned::from(v);
            prop_assert_eq!(decode(&encode(value, AddressFamily::V6)), Some(value));
            let bytes = encode(value, AddressFamily::V6);
            prop_assert_eq!(bytes.as_slice(), &v.to_be_bytes());
        }
    }
}
