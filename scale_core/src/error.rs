use std::net::IpAddr;

use thiserror::Error;

use crate::address::AddressFamily;

/// The starting address/prefix/step of a family could not be turned into a steppable network.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum NetworkInputErr {
    #[error("Could not parse {0:?} as an IP address")]
    InvalidAddress(String),
    #[error("Prefix length {prefix_len} exceeds the {family} address width")]
    InvalidPrefix { family: AddressFamily, prefix_len: u8 },
    #[error("Expected an {expected} address, got {address}")]
    FamilyMismatch { expected: AddressFamily, address: IpAddr },
    #[error("Step {0} is negative")]
    NegativeStep(i64),
}

/// No further address exists inside the network at the requested step.
///
/// This is recoverable: generation loops stop and keep what they produced.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum AddrSpaceErr {
    #[error("Address space exhausted for {0}")]
    Exhausted(AddressFamily),
}

/// Two counter snapshots cannot be combined into a rate.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum SampleErr {
    #[error("Snapshots refer to different paths ({first:?} vs {second:?})")]
    PathMismatch { first: String, second: String },
    #[error("Sampling interval for path {0:?} is not positive")]
    NonPositiveInterval(String),
    #[error("Path {0:?} has no matching second snapshot")]
    MissingPath(String),
    #[error("Path {0:?} appears more than once in one set of snapshots")]
    DuplicatePath(String),
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum VerifyErr {
    #[error("Tolerance {0} is outside [0, 1]")]
    InvalidTolerance(f64),
    #[error("Cannot verify an empty set of rates")]
    EmptyInput,
    #[error("Got {actual} actual entries but {expected} expected entries")]
    LengthMismatch { actual: usize, expected: usize },
    #[error("Weight {weight} at index {index} is negative or not finite")]
    InvalidWeight { index: usize, weight: f64 },
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum ScaleErr {
    #[error("Network: {0}")]
    Network(#[from] NetworkInputErr),
    #[error("Address space: {0}")]
    AddrSpace(#[from] AddrSpaceErr),
    #[error("Sample: {0}")]
    Sample(#[from] SampleErr),
    #[error("Verify: {0}")]
    Verify(#[from] VerifyErr),
}
