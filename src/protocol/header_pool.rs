//! Reusable header pool.
//!
//! Headers carry an owned string, so reusing them across calls saves the
//! string allocation on hot paths. The pool scrubs a header *before*
//! storing it, so a pooled header can never leak a previous call's fields
//! to its next user. Pools are a performance affordance, not a correctness
//! requirement; an empty pool just hands out zero-value headers.

use parking_lot::Mutex;

/// Headers the pool may retain per codec.
pub const HEADER_POOL_SIZE: usize = 16;

/// Objects that can be scrubbed back to their zero value for reuse.
pub trait Reusable: Default {
    /// Zero all fields, retaining owned allocations where possible.
    fn reset(&mut self);
}

/// A bounded free list of reusable headers.
pub struct HeaderPool<T> {
    slots: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T: Reusable> HeaderPool<T> {
    /// Create a pool retaining at most `capacity` headers.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Take a header from the pool, or a fresh zero-value one.
    pub fn get(&self) -> T {
        self.slots.lock().pop().unwrap_or_default()
    }

    /// Reset a header and return it to the pool.
    ///
    /// The header is dropped instead when the pool is already full.
    pub fn put(&self, mut header: T) {
        header.reset();
        let mut slots = self.slots.lock();
        if slots.len() < self.capacity {
            slots.push(header);
        }
    }

    /// Number of headers currently parked in the pool.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the pool currently holds no headers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Reusable> Default for HeaderPool<T> {
    fn default() -> Self {
        Self::new(HEADER_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::CompressType;
    use crate::protocol::RequestHeader;

    #[test]
    fn test_get_from_empty_pool_is_default() {
        let pool: HeaderPool<RequestHeader> = HeaderPool::new(4);
        assert!(pool.is_empty());
        assert_eq!(pool.get(), RequestHeader::default());
    }

    #[test]
    fn test_put_resets_before_storing() {
        let pool: HeaderPool<RequestHeader> = HeaderPool::new(4);
        pool.put(RequestHeader {
            id: 7,
            method: "Leaky.Secret".to_string(),
            request_len: 99,
            compress_type: CompressType::GZIP,
            checksum: 1,
        });

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(), RequestHeader::default());
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool: HeaderPool<RequestHeader> = HeaderPool::new(2);
        for _ in 0..5 {
            pool.put(RequestHeader::default());
        }
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_get_put_cycle_reuses_slots() {
        let pool: HeaderPool<RequestHeader> = HeaderPool::new(2);
        let mut header = pool.get();
        header.method.push_str("Arith.Multiply");
        pool.put(header);
        assert_eq!(pool.len(), 1);
        let _ = pool.get();
        assert!(pool.is_empty());
    }
}
