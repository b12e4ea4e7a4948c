//! Address width abstraction.
//!
//! All range and block arithmetic is written once against the [`Address`]
//! trait and instantiated for `u32` (IPv4) and `u128` (IPv6).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{Add, BitAnd, BitOr, Not, Shl, Sub};

use serde::{Deserialize, Serialize};

/// Address family of a range or block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressFamily {
    #[serde(rename = "ipv4")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
}

impl AddressFamily {
    /// Bit width W of the family's address space
    pub fn width(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// Unsigned integer wide enough to hold one address of a family.
pub trait Address:
    Copy
    + Ord
    + fmt::Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
{
    const FAMILY: AddressFamily;
    const BITS: u8;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn trailing_zeros(self) -> u32;
    fn leading_zeros(self) -> u32;

    fn to_ip(self) -> IpAddr;

    /// Returns `None` when `ip` belongs to the other family.
    fn from_ip(ip: IpAddr) -> Option<Self>;

    /// Mask with the low `host_bits` bits set.
    fn host_mask(host_bits: u8) -> Self {
        if host_bits >= Self::BITS {
            Self::MAX
        } else {
            (Self::ONE << u32::from(host_bits)) - Self::ONE
        }
    }

    /// Number of significant bits, i.e. `BITS - leading_zeros`.
    fn bit_length(self) -> u8 {
        // leading_zeros is at most BITS (128), so the narrowing is lossless
        Self::BITS - self.leading_zeros() as u8
    }
}

impl Address for u32 {
    const FAMILY: AddressFamily = AddressFamily::Ipv4;
    const BITS: u8 = 32;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = u32::MAX;

    fn trailing_zeros(self) -> u32 {
        u32::trailing_zeros(self)
    }

    fn leading_zeros(self) -> u32 {
        u32::leading_zeros(self)
    }

    fn to_ip(self) -> IpAddr {
        IpAddr::V4(Ipv4Addr::from(self))
    }

    fn from_ip(ip: IpAddr) -> Option<Self> {
        match ip {
            IpAddr::V4(v4) => Some(u32::from(v4)),
            IpAddr::V6(_) => None,
        }
    }
}

impl Address for u128 {
    const FAMILY: AddressFamily = AddressFamily::Ipv6;
    const BITS: u8 = 128;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = u128::MAX;

    fn trailing_zeros(self) -> u32 {
        u128::trailing_zeros(self)
    }

    fn leading_zeros(self) -> u32 {
        u128::leading_zeros(self)
    }

    fn to_ip(self) -> IpAddr {
        IpAddr::V6(Ipv6Addr::from(self))
    }

    fn from_ip(ip: IpAddr) -> Option<Self> {
        match ip {
            IpAddr::V6(v6) => Some(u128::from(v6)),
            IpAddr::V4(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_width() {
        assert_eq!(AddressFamily::Ipv4.width(), 32);
        assert_eq!(AddressFamily::Ipv6.width(), 128);
        assert_eq!(<u32 as Address>::FAMILY, AddressFamily::Ipv4);
        assert_eq!(<u128 as Address>::FAMILY, AddressFamily::Ipv6);
    }

    #[test]
    fn test_host_mask() {
        assert_eq!(<u32 as Address>::host_mask(0), 0);
        assert_eq!(<u32 as Address>::host_mask(8), 0xff);
        assert_eq!(<u32 as Address>::host_mask(32), u32::MAX);
        assert_eq!(<u128 as Address>::host_mask(127), u128::MAX >> 1);
        assert_eq!(<u128 as Address>::host_mask(128), u128::MAX);
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(Address::bit_length(0u32), 0);
        assert_eq!(Address::bit_length(1u32), 1);
        assert_eq!(Address::bit_length(256u32), 9);
        assert_eq!(Address::bit_length(u128::MAX), 128);
    }

    #[test]
    fn test_ip_conversion() {
        let ip: IpAddr = "10.1.2.3".parse().unwrap();
        let raw = <u32 as Address>::from_ip(ip).unwrap();
        assert_eq!(raw, 0x0a01_0203);
        assert_eq!(raw.to_ip(), ip);
        assert!(<u128 as Address>::from_ip(ip).is_none());

        let ip6: IpAddr = "2001:db8::1".parse().unwrap();
        let raw6 = <u128 as Address>::from_ip(ip6).unwrap();
        assert_eq!(raw6.to_ip(), ip6);
        assert!(<u32 as Address>::from_ip(ip6).is_none());
    }
}
