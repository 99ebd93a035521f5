//! Random test cases for address walks and traffic verification, for cross-checking other implementations.
//!
//! Expected results are computed independently of [crate::cursor] and [crate::distribution] so the generated
//! cases can also check this crate.

use core::ops::{Shl, Shr};
use std::{net::IpAddr, time::Duration};

use rand::{
    distributions::{uniform::SampleUniform, Distribution, Standard},
    seq::SliceRandom,
    Rng,
};

use crate::{
    address::{decode_addr, to_ip_addr, AddressFamily, Network},
    big_unsigned::BigUnsigned,
    error::NetworkInputErr,
    rate::CounterSnapshot,
    util::{align_to, low_mask},
    weights::next_hop_weights,
};

#[derive(Debug, Clone, Copy)]
pub enum ChooseRand<T>
where
    T: core::fmt::Debug
        + SampleUniform
        + Shl<usize, Output = T>
        + Shr<usize, Output = T>
        + From<bool>
        + core::cmp::PartialOrd,
    Standard: Distribution<T>,
{
    Any,
    /// Uniform over `0..(1 << n)`, n must be less than the width of T
    AnyNBits(usize),
    /// Any value with the lowest n bits clear
    AnyAligned(usize),
    Specific(T),
    /// Uniform distribution sampling over inclusive range (.0)..=(.1), in either order
    Between(T, T),
}
impl<T> ChooseRand<T>
where
    T: core::fmt::Debug
        + SampleUniform
        + Shl<usize, Output = T>
        + Shr<usize, Output = T>
        + From<bool>
        + core::cmp::PartialOrd,
    Standard: Distribution<T>,
{
    pub fn sample<R: Rng>(self, rng: &mut R) -> T {
        match self {
            ChooseRand::Any => rng.gen(),
            ChooseRand::AnyNBits(n) => {
                let zero: T = false.into();
                let one: T = true.into();
                rng.gen_range(zero..(one << n))
            }
            ChooseRand::AnyAligned(to) => align_to(rng.gen(), to),
            ChooseRand::Specific(t) => t,
            ChooseRand::Between(a, b) => {
                if a == b {
                    a
                } else if a < b {
                    rng.gen_range(a..=b)
                } else {
                    rng.gen_range(b..=a)
                }
            }
        }
    }
}

pub fn choose_from<T: Copy, R: Rng>(rng: &mut R, array: &[T]) -> Option<T> {
    array.choose(rng).copied()
}

/// A random network of `family`. The start is the network address if `aligned`, otherwise anywhere inside it.
pub fn rand_network<R: Rng>(
    rng: &mut R,
    family: AddressFamily,
    prefix_len: ChooseRand<u8>,
    aligned: bool,
) -> Result<Network, NetworkInputErr> {
    let prefix_len = prefix_len.sample(rng);
    let value = BigUnsigned::from(rng.gen::<u128>()).right_shift(BigUnsigned::BITS - family.bits());
    let host_bits = family.bits().saturating_sub(prefix_len as usize);
    let start = if aligned { align_to(value, host_bits) } else { value };
    Network::new(to_ip_addr(start, family), prefix_len)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkTestCase {
    pub network: Network,
    pub step: u128,
    pub count: usize,
    /// The addresses a cursor over `network` must produce when asked for `count` of them
    pub expected: Vec<IpAddr>,
}
impl WalkTestCase {
    /// Whether the network runs out before `count` addresses.
    pub fn exhausts(&self) -> bool {
        self.expected.len() < self.count
    }
}

/// A random walk through a random network. A sampled step of 0 becomes 1.
pub fn rand_walk_case<R: Rng>(
    rng: &mut R,
    family: AddressFamily,
    prefix_len: ChooseRand<u8>,
    step: ChooseRand<u128>,
    count: usize,
) -> Result<WalkTestCase, NetworkInputErr> {
    let aligned = rng.gen_bool(0.5);
    let network = rand_network(rng, family, prefix_len, aligned)?;
    let step = step.sample(rng).max(1);

    let host_bits = family.bits() - network.prefix_len() as usize;
    let start = decode_addr(network.start());
    let last = align_to(start, host_bits).add(low_mask(host_bits)).to_u128();

    let mut current = start.to_u128();
    let mut expected = vec![];
    while expected.len() < count && last - current > step {
        current += step;
        expected.push(to_ip_addr(BigUnsigned::from(current), family));
    }

    Ok(WalkTestCase {
        network,
        step,
        count,
        expected,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCategory {
    /// Every path carries exactly its weighted share
    Matching,
    /// Half of the first path's traffic moves to the second path
    Skewed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateTestCase {
    pub weights: Vec<u64>,
    pub first: Vec<CounterSnapshot>,
    pub second: Vec<CounterSnapshot>,
    pub tolerance: f64,
    pub expected_pass: bool,
}
impl RateTestCase {
    pub fn interval(&self) -> Duration {
        match (self.first.first(), self.second.first()) {
            (Some(a), Some(b)) => b.timestamp.saturating_sub(a.timestamp),
            _ => Duration::ZERO,
        }
    }
}

/// Counter snapshots of `paths` paths (at least 2) sharing traffic according to [next_hop_weights].
///
/// Rates are whole numbers of packets per second over a whole number of seconds, so the rates recovered from
/// the snapshots are exact.
pub fn rand_rate_case<R: Rng>(rng: &mut R, category: RateCategory, paths: ChooseRand<usize>) -> RateTestCase {
    let paths = paths.sample(rng).max(2);
    let weight_sum = rng.gen_range(paths as u64..=paths as u64 * 50);
    let weights = next_hop_weights(weight_sum, paths);
    let unit_rate = rng.gen_range(2..=1000u64);
    let interval_secs = rng.gen_range(1..=60u64);
    let tolerance = rng.gen_range(0.001..=0.1);

    let mut rates: Vec<u64> = weights.iter().map(|w| w * unit_rate).collect();
    if category == RateCategory::Skewed {
        let moved = rates[0] / 2;
        rates[0] -= moved;
        rates[1] += moved;
    }

    let mut first = Vec::with_capacity(paths);
    let mut second = Vec::with_capacity(paths);
    for (i, rate) in rates.iter().enumerate() {
        let path = format!("path{i}");
        let base = rng.gen_range(0..u32::MAX as u64);
        let sent = rate * interval_secs;
        first.push(CounterSnapshot::new(path.clone(), Duration::ZERO, base, base));
        second.push(CounterSnapshot::new(path, Duration::from_secs(interval_secs), base + sent, base + sent));
    }

    RateTestCase {
        weights,
        first,
        second,
        tolerance,
        expected_pass: category == RateCategory::Matching,
    }
}
