//! Caller-facing configuration, deserializable from whatever format the test harness uses.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    address::Network,
    distribution::Tolerance,
    error::{NetworkInputErr, SampleErr, VerifyErr},
};

pub const DEFAULT_STEP: i64 = 1;
pub const DEFAULT_TOLERANCE: f64 = 0.01;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: f64 = 35.0;

fn default_step() -> i64 {
    DEFAULT_STEP
}
fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_sample_interval_secs() -> f64 {
    DEFAULT_SAMPLE_INTERVAL_SECS
}

/// Where one address family starts and how far it moves per scale unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConfig {
    pub address: String,
    pub prefix_len: u8,
    #[serde(default = "default_step")]
    pub step: i64,
}
impl FamilyConfig {
    pub fn new(address: impl Into<String>, prefix_len: u8, step: i64) -> Self {
        Self {
            address: address.into(),
            prefix_len,
            step,
        }
    }

    pub fn network(&self) -> Result<Network, NetworkInputErr> {
        Network::parse(&self.address, self.prefix_len)
    }
}

/// What a sequencer does with a family whose starting network cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Fail the whole generation
    #[default]
    Reject,
    /// Leave the family out of every pair
    Omit,
    /// Repeat the raw starting address without stepping, if it is at least a valid address
    HoldStatic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(default)]
    pub v4: Option<FamilyConfig>,
    #[serde(default)]
    pub v6: Option<FamilyConfig>,
    pub count: usize,
    /// Emit each starting address as the first scale unit instead of stepping past it
    #[serde(default)]
    pub include_start: bool,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// How long the caller waits between the two counter snapshots
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: f64,
}
impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
        }
    }
}
impl VerifierConfig {
    pub fn tolerance(&self) -> Result<Tolerance, VerifyErr> {
        Tolerance::new(self.tolerance)
    }

    pub fn sample_interval(&self) -> Result<Duration, SampleErr> {
        match Duration::try_from_secs_f64(self.sample_interval_secs) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(SampleErr::NonPositiveInterval("sample_interval_secs".to_owned())),
        }
    }
}
