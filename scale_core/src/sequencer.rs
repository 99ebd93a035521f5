//! Dual-stack address generation for scaled provisioning.
//!
//! The IPv4 and IPv6 cursors advance in lockstep, so pair `i` always holds the i-th address of each family.
//! Running out of addresses in either family ends generation early and keeps the pairs produced so far;
//! callers see the truncation through the length of the result.

use std::net::IpAddr;

use log::{debug, warn};

use crate::{
    address::AddressFamily,
    config::{FamilyConfig, MalformedPolicy, ScaleConfig},
    cursor::AddressCursor,
    error::{AddrSpaceErr, NetworkInputErr},
};

/// One scale unit: the i-th address of each configured family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPair {
    pub v4: Option<IpAddr>,
    pub v6: Option<IpAddr>,
}
impl core::fmt::Display for AddressPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.v4, self.v6) {
            (Some(v4), Some(v6)) => write!(f, "{v4} {v6}"),
            (Some(addr), None) | (None, Some(addr)) => write!(f, "{addr}"),
            (None, None) => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pairs: Vec<AddressPair>,
    requested: usize,
    exhausted: Option<AddressFamily>,
    malformed: Vec<(AddressFamily, NetworkInputErr)>,
}
impl Generation {
    pub fn pairs(&self) -> &[AddressPair] {
        &self.pairs
    }
    pub fn into_pairs(self) -> Vec<AddressPair> {
        self.pairs
    }
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
    pub fn requested(&self) -> usize {
        self.requested
    }
    pub fn is_truncated(&self) -> bool {
        self.pairs.len() < self.requested
    }
    /// The family whose exhaustion stopped generation, if any.
    pub fn exhausted_family(&self) -> Option<AddressFamily> {
        self.exhausted
    }
    /// Families that were omitted or held static because their input could not be parsed.
    pub fn malformed(&self) -> &[(AddressFamily, NetworkInputErr)] {
        &self.malformed
    }

    pub fn v4_strings(&self) -> Vec<String> {
        self.pairs.iter().filter_map(|p| p.v4).map(|a| a.to_string()).collect()
    }
    pub fn v6_strings(&self) -> Vec<String> {
        self.pairs.iter().filter_map(|p| p.v6).map(|a| a.to_string()).collect()
    }
}

enum Lane {
    Stepping(AddressCursor),
    Static(IpAddr),
    Absent,
}
impl Lane {
    fn build(
        family: AddressFamily,
        config: Option<&FamilyConfig>,
        policy: MalformedPolicy,
        malformed: &mut Vec<(AddressFamily, NetworkInputErr)>,
    ) -> Result<Self, NetworkInputErr> {
        let Some(config) = config else {
            return Ok(Lane::Absent);
        };
        let cursor = config
            .network()
            .and_then(|net| net.expect_family(family))
            .and_then(|net| AddressCursor::new(&net, config.step));
        let err = match cursor {
            Ok(cursor) => return Ok(Lane::Stepping(cursor)),
            Err(err) => err,
        };
        match policy {
            MalformedPolicy::Reject => Err(err),
            MalformedPolicy::Omit => {
                warn!("Omitting {family} addresses: {err}");
                malformed.push((family, err));
                Ok(Lane::Absent)
            }
            MalformedPolicy::HoldStatic => {
                let held = config
                    .address
                    .trim()
                    .parse::<IpAddr>()
                    .ok()
                    .filter(|addr| AddressFamily::of(addr) == family);
                match held {
                    Some(addr) => warn!("Holding {family} address at {addr}: {err}"),
                    None => warn!("Omitting {family} addresses, nothing to hold: {err}"),
                }
                malformed.push((family, err));
                Ok(held.map_or(Lane::Absent, Lane::Static))
            }
        }
    }

    fn emit(&mut self, emit_start: bool) -> Result<Option<IpAddr>, AddrSpaceErr> {
        match self {
            Lane::Stepping(cursor) if emit_start => cursor.start_address().map(Some),
            Lane::Stepping(cursor) => cursor.advance().map(Some),
            Lane::Static(addr) => Ok(Some(*addr)),
            Lane::Absent => Ok(None),
        }
    }

    fn is_absent(&self) -> bool {
        matches!(self, Lane::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DualStackSequencer {
    v4: Option<FamilyConfig>,
    v6: Option<FamilyConfig>,
    include_start: bool,
    on_malformed: MalformedPolicy,
}
impl DualStackSequencer {
    pub fn new(v4: Option<FamilyConfig>, v6: Option<FamilyConfig>) -> Self {
        Self {
            v4,
            v6,
            ..Default::default()
        }
    }

    pub fn from_config(config: &ScaleConfig) -> Self {
        Self {
            v4: config.v4.clone(),
            v6: config.v6.clone(),
            include_start: config.include_start,
            on_malformed: config.on_malformed,
        }
    }

    /// Emit each family's starting address as the first pair rather than stepping past it.
    pub fn include_start(mut self, include_start: bool) -> Self {
        self.include_start = include_start;
        self
    }

    pub fn on_malformed(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Generate up to `count` address pairs.
    ///
    /// Fewer pairs are returned if either family runs out of addresses.
    /// Under [MalformedPolicy::Reject] an unparseable family fails the whole call.
    ///
    /// ```
    /// # use scale_core::{config::FamilyConfig, sequencer::DualStackSequencer};
    /// let seq = DualStackSequencer::new(
    ///     Some(FamilyConfig::new("10.0.0.0", 30, 1)),
    ///     Some(FamilyConfig::new("2001:db8::", 64, 1)),
    /// );
    /// let generation = seq.generate(5).unwrap();
    /// // 10.0.0.0/30 only has room for .1 and .2
    /// assert_eq!(generation.v4_strings(), ["10.0.0.1", "10.0.0.2"]);
    /// assert_eq!(generation.v6_strings(), ["2001:db8::1", "2001:db8::2"]);
    /// assert!(generation.is_truncated());
    /// ```
    pub fn generate(&self, count: usize) -> Result<Generation, NetworkInputErr> {
        let mut malformed = vec![];
        let mut v4 = Lane::build(AddressFamily::V4, self.v4.as_ref(), self.on_malformed, &mut malformed)?;
        let mut v6 = Lane::build(AddressFamily::V6, self.v6.as_ref(), self.on_malformed, &mut malformed)?;

        let mut pairs = vec![];
        let mut exhausted = None;
        if v4.is_absent() && v6.is_absent() {
            debug!("No address family to generate, returning an empty sequence");
        } else {
            for iteration in 0..count {
                let emit_start = self.include_start && iteration == 0;
                let pair = v4
                    .emit(emit_start)
                    .and_then(|v4_addr| Ok(AddressPair { v4: v4_addr, v6: v6.emit(emit_start)? }));
                match pair {
                    Ok(pair) => pairs.push(pair),
                    Err(AddrSpaceErr::Exhausted(family)) => {
                        debug!("{family} space exhausted, truncating generation to {iteration} of {count}");
                        exhausted = Some(family);
                        break;
                    }
                }
            }
        }

        Ok(Generation {
            pairs,
            requested: count,
            exhausted,
            malformed,
        })
    }
}

/// Generate `count` pairs with the default policies, see [DualStackSequencer::generate].
pub fn generate(
    v4: Option<&FamilyConfig>,
    v6: Option<&FamilyConfig>,
    count: usize,
) -> Result<Generation, NetworkInputErr> {
    DualStackSequencer::new(v4.cloned(), v6.cloned()).generate(count)
}

#[cfg(test)]
mod test {
    use crate::{
        address::AddressFamily,
        config::{FamilyConfig, MalformedPolicy, ScaleConfig},
        error::NetworkInputErr,
        sequencer::{generate, DualStackSequencer},
    };

    #[test]
    fn slash_24_truncates_to_254() {
        let v4 = FamilyConfig::new("10.0.0.0", 24, 1);
        let generation = generate(Some(&v4), None, 300).unwrap();
        assert_eq!(generation.len(), 254);
        assert_eq!(generation.requested(), 300);
        assert!(generation.is_truncated());
        assert_eq!(generation.exhausted_family(), Some(AddressFamily::V4));
        assert!(generation.pairs().iter().all(|p| p.v6.is_none()));
        assert_eq!(generation.v4_strings().last().unwrap(), "10.0.0.254");
    }

    #[test]
    fn lockstep_pairs_share_an_index() {
        let v4 = FamilyConfig::new("10.0.0.0", 16, 4);
        let v6 = FamilyConfig::new("2001:db8::", 48, 0x100);
        let generation = generate(Some(&v4), Some(&v6), 3).unwrap();
        assert!(!generation.is_truncated());
        assert_eq!(generation.exhausted_family(), None);
        let rendered: Vec<String> = generation.pairs().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            ["10.0.0.4 2001:db8::100", "10.0.0.8 2001:db8::200", "10.0.0.12 2001:db8::300"]
        );
    }

    #[test]
    fn the_smaller_family_stops_both() {
        let v4 = FamilyConfig::new("10.0.0.0", 16, 1);
        let v6 = FamilyConfig::new("2001:db8::", 126, 1);
        let generation = generate(Some(&v4), Some(&v6), 10).unwrap();
        assert_eq!(generation.len(), 2);
        assert_eq!(generation.exhausted_family(), Some(AddressFamily::V6));
        assert_eq!(generation.v4_strings(), ["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn include_start_emits_the_starting_address_first() {
        let seq = DualStackSequencer::new(Some(FamilyConfig::new("10.0.0.1", 24, 1)), None).include_start(true);
        let generation = seq.generate(3).unwrap();
        assert_eq!(generation.v4_strings(), ["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn include_start_never_emits_the_upper_bound() {
        let seq = DualStackSequencer::new(Some(FamilyConfig::new("10.0.0.255", 24, 1)), None).include_start(true);
        let generation = seq.generate(3).unwrap();
        assert!(generation.is_empty());
        assert_eq!(generation.exhausted_family(), Some(AddressFamily::V4));

        // One below the bound is still handed out, then the walk is over
        let seq = DualStackSequencer::new(Some(FamilyConfig::new("10.0.0.254", 24, 1)), None).include_start(true);
        assert_eq!(seq.generate(3).unwrap().v4_strings(), ["10.0.0.254"]);

        let seq = DualStackSequencer::new(
            Some(FamilyConfig::new("10.0.0.1", 24, 1)),
            Some(FamilyConfig::new("2001:db8::ffff", 112, 1)),
        )
        .include_start(true);
        let generation = seq.generate(3).unwrap();
        assert!(generation.is_empty());
        assert_eq!(generation.exhausted_family(), Some(AddressFamily::V6));
    }

    #[test]
    fn malformed_input_is_rejected_by_default() {
        let v4 = FamilyConfig::new("10.0.0.300", 24, 1);
        assert_eq!(
            generate(Some(&v4), None, 3),
            Err(NetworkInputErr::InvalidAddress("10.0.0.300".to_owned()))
        );
        // An IPv6 address configured as the IPv4 family is a mismatch
        let v4 = FamilyConfig::new("2001:db8::", 64, 1);
        assert!(matches!(
            generate(Some(&v4), None, 3),
            Err(NetworkInputErr::FamilyMismatch { expected: AddressFamily::V4, .. })
        ));
        let v6 = FamilyConfig::new("2001:db8::", 64, -1);
        assert_eq!(generate(None, Some(&v6), 3), Err(NetworkInputErr::NegativeStep(-1)));
    }

    #[test]
    fn malformed_input_can_be_omitted_or_held() {
        let config = ScaleConfig {
            v4: Some(FamilyConfig::new("10.0.0.1", 40, 1)),
            v6: Some(FamilyConfig::new("2001:db8::", 64, 1)),
            count: 2,
            include_start: false,
            on_malformed: MalformedPolicy::Omit,
        };
        let generation = DualStackSequencer::from_config(&config).generate(config.count).unwrap();
        assert_eq!(generation.len(), 2);
        assert!(generation.v4_strings().is_empty());
        assert_eq!(generation.malformed().len(), 1);
        assert_eq!(generation.malformed()[0].0, AddressFamily::V4);

        let generation = DualStackSequencer::from_config(&config)
            .on_malformed(MalformedPolicy::HoldStatic)
            .generate(config.count)
            .unwrap();
        assert_eq!(generation.v4_strings(), ["10.0.0.1", "10.0.0.1"]);
        assert_eq!(generation.v6_strings(), ["2001:db8::1", "2001:db8::2"]);
        assert_eq!(generation.malformed().len(), 1);

        // Nothing parseable to hold falls back to omitting the family
        let generation = DualStackSequencer::new(Some(FamilyConfig::new("garbage", 24, 1)), None)
            .on_malformed(MalformedPolicy::HoldStatic)
            .generate(4)
            .unwrap();
        assert!(generation.is_empty());
        assert_eq!(generation.malformed().len(), 1);
    }

    #[test]
    fn no_families_and_zero_count() {
        assert!(generate(None, None, 10).unwrap().is_empty());
        let v4 = FamilyConfig::new("10.0.0.0", 24, 1);
        let generation = generate(Some(&v4), None, 0).unwrap();
        assert!(generation.is_empty());
        assert!(!generation.is_truncated());
    }
}
