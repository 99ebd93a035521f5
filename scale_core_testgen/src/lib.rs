//! This module concerns the encoding of random address-walk and rate-verification cases into CSV test files,
//! so other implementations of the same walk and checks can be tested against this one.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use scale_core::{
    address::{decode_addr, AddressFamily},
    error::NetworkInputErr,
    rand::{rand_rate_case, rand_walk_case, ChooseRand, RateCategory, RateTestCase, WalkTestCase},
    weights::weights_to_percents,
};
use serde_with::{formats::Lowercase, DeserializeAs, SerializeAs};

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyVariant {
    V4,
    #[default]
    V6,
}
impl From<FamilyVariant> for AddressFamily {
    fn from(value: FamilyVariant) -> Self {
        match value {
            FamilyVariant::V4 => AddressFamily::V4,
            FamilyVariant::V6 => AddressFamily::V6,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum RandomCategory {
    /// Steps of 1 to 16 addresses
    SmallStep,
    /// Any step that fits in the host part of the network
    LargeStep,
    /// A quarter of the network per step, so the walk runs out after a few addresses
    Exhausting,
}

/// Prefix lengths to generate walks for. Short IPv6 prefixes are left out since the walks would never end.
pub fn variant_prefix_lens(family: FamilyVariant) -> core::ops::RangeInclusive<u8> {
    match family {
        FamilyVariant::V4 => 16..=32,
        FamilyVariant::V6 => 64..=128,
    }
}

pub fn gen_in_category<R: Rng>(
    rng: &mut R,
    family: FamilyVariant,
    category: RandomCategory,
    prefix_len: u8,
    count: usize,
) -> Result<WalkTestCase, NetworkInputErr> {
    let family = AddressFamily::from(family);
    let host_bits = family.bits().saturating_sub(prefix_len as usize);
    let step = match category {
        RandomCategory::SmallStep => ChooseRand::Between(1, 16),
        RandomCategory::LargeStep if host_bits == 0 => ChooseRand::Specific(1),
        RandomCategory::LargeStep => ChooseRand::AnyNBits(host_bits),
        RandomCategory::Exhausting => ChooseRand::Specific(((1u128 << host_bits) / 4).max(1)),
    };
    rand_walk_case(rng, family, ChooseRand::Specific(prefix_len), step, count)
}

pub fn gen_rate_case<R: Rng>(rng: &mut R, skewed: bool, max_paths: usize) -> RateTestCase {
    let category = if skewed { RateCategory::Skewed } else { RateCategory::Matching };
    rand_rate_case(rng, category, ChooseRand::Between(2, max_paths.max(2)))
}

fn serialize_hex_u128<S>(v: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serde_with::hex::Hex::<Lowercase>::serialize_as(&u128::to_be_bytes(*v), serializer)
}

fn deserialize_hex_u128<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    let bytes: [u8; 16] = serde_with::hex::Hex::<Lowercase>::deserialize_as(deserializer)?;
    Ok(u128::from_be_bytes(bytes))
}

/// One walk per row. Addresses are their numeric value, hex-encoded as 128 bits for both families.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct WalkTestCaseSerDe {
    family: u8,
    prefix_len: u8,
    #[serde(serialize_with = "serialize_hex_u128", deserialize_with = "deserialize_hex_u128")]
    start: u128,
    #[serde(serialize_with = "serialize_hex_u128", deserialize_with = "deserialize_hex_u128")]
    step: u128,
    count: usize,

    n_emitted: usize,
    /// The last address produced, or the start if none were
    #[serde(serialize_with = "serialize_hex_u128", deserialize_with = "deserialize_hex_u128")]
    last: u128,
    exhausted: bool,
}
impl From<WalkTestCase> for WalkTestCaseSerDe {
    fn from(value: WalkTestCase) -> Self {
        let start = decode_addr(value.network.start()).to_u128();
        WalkTestCaseSerDe {
            family: match value.network.family() {
                AddressFamily::V4 => 4,
                AddressFamily::V6 => 6,
            },
            prefix_len: value.network.prefix_len(),
            start,
            step: value.step,
            count: value.count,
            n_emitted: value.expected.len(),
            last: value.expected.last().map_or(start, |addr| decode_addr(*addr).to_u128()),
            exhausted: value.exhausts(),
        }
    }
}

/// One path of a rate case per row, rows of the same case share `case_id`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RateRecordSerDe {
    case_id: usize,
    path: String,
    weight_percent: f64,
    in_first: u64,
    in_second: u64,
    interval_secs: f64,
    tolerance: f64,
    expected_pass: bool,
}

pub fn rate_records(case_id: usize, case: &RateTestCase) -> Vec<RateRecordSerDe> {
    let interval_secs = case.interval().as_secs_f64();
    case.first
        .iter()
        .zip(&case.second)
        .zip(weights_to_percents(&case.weights))
        .map(|((first, second), weight_percent)| RateRecordSerDe {
            case_id,
            path: first.path.clone(),
            weight_percent,
            in_first: first.in_count,
            in_second: second.in_count,
            interval_secs,
            tolerance: case.tolerance,
            expected_pass: case.expected_pass,
        })
        .collect()
}
