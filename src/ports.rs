//! Fixed-capacity port pools.
//!
//! A pool is an ordered sequence of slots created at owner-node construction
//! and never resized. Allocation always takes the lowest-indexed free slot;
//! exhaustion is a hard stop because port counts are a physical constraint
//! chosen at design time.

use crate::error::{SimError, SimResult};
use crate::types::{Guid, SlotIndex};

/// A fixed-capacity collection of occupancy slots.
#[derive(Debug)]
pub struct PortPool {
    label: String,
    slots: Vec<Option<Guid>>,
}

impl PortPool {
    /// Creates a pool with the given capacity. The label appears in
    /// exhaustion errors and release notices.
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        Self {
            label: label.into(),
            slots: vec![None; capacity],
        }
    }

    /// Assigns the occupant to the first free slot and returns its index.
    ///
    /// Fails with [`SimError::PoolExhausted`] when every slot is occupied.
    pub fn allocate(&mut self, occupant: Guid) -> SimResult<SlotIndex> {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(occupant);
                return Ok(index);
            }
        }
        Err(self.exhausted())
    }

    /// Clears a slot. Releasing an already-free slot is a no-op with a
    /// notice, as is an out-of-range index.
    pub fn release(&mut self, slot: SlotIndex) {
        match self.slots.get_mut(slot) {
            Some(occupant) => {
                if occupant.is_some() {
                    *occupant = None;
                } else {
                    tracing::debug!(pool = %self.label, slot, "release: slot already free, no-op");
                }
            }
            None => {
                tracing::warn!(pool = %self.label, slot, "release: slot index out of range");
            }
        }
    }

    /// The exhaustion error for this pool.
    pub fn exhausted(&self) -> SimError {
        SimError::PoolExhausted {
            pool: self.label.clone(),
            capacity: self.slots.len(),
        }
    }

    /// Occupant of a slot, if any.
    pub fn occupant(&self, slot: SlotIndex) -> Option<Guid> {
        self.slots.get(slot).copied().flatten()
    }

    /// Fixed number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if at least one slot is free.
    pub fn has_free(&self) -> bool {
        self.slots.iter().any(|s| s.is_none())
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        !self.has_free()
    }

    /// Iterates over `(index, occupant)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, Option<Guid>)> + '_ {
        self.slots.iter().copied().enumerate()
    }
}

/// Fronthaul interface of a remote radio head.
///
/// A port pool plus protocol and data-rate bookkeeping. The rate fields are
/// bookkeeping only — nothing in this core flow-controls them.
#[derive(Debug)]
pub struct FronthaulPorts {
    pool: PortPool,
    protocol: String,
    data_rate_gbps_max: f64,
    data_rate_gbps: Vec<f64>,
}

impl FronthaulPorts {
    /// Creates a fronthaul interface with the given port count.
    pub fn new(n_ports: usize, protocol: impl Into<String>, data_rate_gbps_max: f64) -> Self {
        Self {
            pool: PortPool::new("fronthaul", n_ports),
            protocol: protocol.into(),
            data_rate_gbps_max,
            data_rate_gbps: vec![0.0; n_ports],
        }
    }

    /// The slot pool.
    pub fn pool(&self) -> &PortPool {
        &self.pool
    }

    /// Mutable access to the slot pool.
    pub fn pool_mut(&mut self) -> &mut PortPool {
        &mut self.pool
    }

    /// Transport protocol name (e.g. `CPRI`).
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Rated maximum data rate per port, in Gbps.
    pub fn data_rate_gbps_max(&self) -> f64 {
        self.data_rate_gbps_max
    }

    /// Current bookkeeping rate of one port, in Gbps.
    pub fn data_rate_gbps(&self, slot: SlotIndex) -> Option<f64> {
        self.data_rate_gbps.get(slot).copied()
    }

    /// Records a port's bookkeeping data rate.
    pub fn set_data_rate_gbps(&mut self, slot: SlotIndex, gbps: f64) {
        if let Some(rate) = self.data_rate_gbps.get_mut(slot) {
            *rate = gbps;
        } else {
            tracing::warn!(slot, "set_data_rate_gbps: slot index out of range");
        }
    }
}

impl Default for FronthaulPorts {
    fn default() -> Self {
        Self::new(2, "CPRI", 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_takes_lowest_free_slot() {
        let mut pool = PortPool::new("rf", 3);
        assert_eq!(pool.allocate(10).unwrap(), 0);
        assert_eq!(pool.allocate(11).unwrap(), 1);

        pool.release(0);
        // Slot 0 is free again and must be chosen before slot 2.
        assert_eq!(pool.allocate(12).unwrap(), 0);
        assert_eq!(pool.occupant(0), Some(12));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut pool = PortPool::new("rf", 2);
        pool.allocate(1).unwrap();
        pool.allocate(2).unwrap();

        let err = pool.allocate(3).unwrap_err();
        assert!(matches!(err, SimError::PoolExhausted { capacity: 2, .. }));
        assert_eq!(pool.occupied(), 2);
    }

    #[test]
    fn test_release_free_slot_is_noop() {
        let mut pool = PortPool::new("rf", 2);
        pool.release(1);
        assert_eq!(pool.occupied(), 0);

        pool.release(99); // out of range: notice, no panic
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_fronthaul_defaults() {
        let fh = FronthaulPorts::default();
        assert_eq!(fh.pool().capacity(), 2);
        assert_eq!(fh.protocol(), "CPRI");
        assert_eq!(fh.data_rate_gbps_max(), 10.0);
        assert_eq!(fh.data_rate_gbps(0), Some(0.0));
    }

    #[test]
    fn test_fronthaul_rate_bookkeeping() {
        let mut fh = FronthaulPorts::new(1, "eCPRI", 24.3);
        fh.set_data_rate_gbps(0, 3.5);
        assert_eq!(fh.data_rate_gbps(0), Some(3.5));
        fh.set_data_rate_gbps(5, 1.0); // out of range: notice only
        assert_eq!(fh.data_rate_gbps(5), None);
    }
}
