//! Address-space walking and traffic-distribution checks for network scale tests.
//!
//! [sequencer::DualStackSequencer] produces paired IPv4/IPv6 addresses by stepping through configured networks
//! with [cursor::AddressCursor], using [big_unsigned::BigUnsigned] so IPv6 steps never lose precision.
//! [rate] turns counter snapshots into rates and [distribution] checks how those rates are spread across paths.

pub mod address;
pub mod big_unsigned;
pub mod config;
pub mod cursor;
pub mod distribution;
pub mod error;
pub mod pool;
pub mod rand;
pub mod rate;
pub mod sequencer;
pub mod util;
pub mod weights;
