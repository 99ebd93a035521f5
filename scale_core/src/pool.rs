use crate::sequencer::{AddressPair, Generation};

/// Hands out pre-generated address pairs one at a time, in generation order.
///
/// ```
/// # use scale_core::{config::FamilyConfig, pool::AddressPool, sequencer::generate};
/// let v4 = FamilyConfig::new("10.0.0.0", 24, 1);
/// let mut pool = AddressPool::from(generate(Some(&v4), None, 2).unwrap());
/// assert_eq!(pool.next_pair().unwrap().v4.unwrap().to_string(), "10.0.0.1");
/// assert_eq!(pool.remaining(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressPool {
    pairs: Vec<AddressPair>,
    next: usize,
}
impl AddressPool {
    pub fn new(pairs: Vec<AddressPair>) -> Self {
        Self { pairs, next: 0 }
    }

    /// The next unused pair, or None once every pair has been handed out.
    pub fn next_pair(&mut self) -> Option<&AddressPair> {
        let pair = self.pairs.get(self.next)?;
        self.next += 1;
        Some(pair)
    }

    pub fn remaining(&self) -> usize {
        self.pairs.len() - self.next
    }

    /// Every pair in the pool, including ones already handed out.
    pub fn all(&self) -> &[AddressPair] {
        &self.pairs
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
impl From<Generation> for AddressPool {
    fn from(value: Generation) -> Self {
        Self::new(value.into_pairs())
    }
}
