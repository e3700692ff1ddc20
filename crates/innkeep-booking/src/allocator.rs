//! Booking code allocation.
//!
//! Codes are short, human-readable identifiers of the form
//! `PREFIX-MMDD-XXX` (allocation date plus three random characters).
//! The allocator keeps a pre-generated pool so the common path is a
//! lock and a pop with no store round-trip. An empty pool degrades to
//! bounded generate-check-retry against the store; exhausting those
//! attempts is the only hard failure. Refill is a background concern
//! (see `innkeep-server`) and never blocks allocation.
//!
//! Uniqueness is ultimately enforced by the unique index on
//! `booking.code`, which holds across process restarts and multiple
//! allocator instances.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use innkeep_core::error::{InnkeepError, InnkeepResult};
use innkeep_core::repository::BookingRepository;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::BookingConfig;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 3;

/// Generate one candidate code for the given allocation date.
fn generate_code(prefix: &str, now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect();
    format!("{prefix}-{}-{suffix}", now.format("%m%d"))
}

/// Booking code allocator with a pre-generated pool.
///
/// An explicitly-owned service — tests instantiate independent
/// allocators, and each instance reasons about its own pool.
pub struct CodeAllocator<B: BookingRepository> {
    bookings: B,
    config: BookingConfig,
    pool: Mutex<Vec<String>>,
}

impl<B: BookingRepository> CodeAllocator<B> {
    pub fn new(bookings: B, config: BookingConfig) -> Self {
        Self {
            bookings,
            config,
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Allocate a unique booking code.
    ///
    /// Pops from the pool in O(1) when possible; falls back to bounded
    /// generate-check-retry when the pool is empty. Fails with
    /// [`InnkeepError::CodeAllocationExhausted`] only when every
    /// fallback attempt collided — systemic contention or a broken
    /// uniqueness check.
    pub async fn allocate(&self) -> InnkeepResult<String> {
        if let Some(code) = self.pop() {
            debug!(code = %code, "allocated booking code from pool");
            return Ok(code);
        }
        self.allocate_sync().await
    }

    /// Atomic take from the pool. A poisoned lock degrades to the
    /// synchronous fallback instead of failing the allocation.
    fn pop(&self) -> Option<String> {
        self.pool.lock().ok()?.pop()
    }

    async fn allocate_sync(&self) -> InnkeepResult<String> {
        for _ in 0..self.config.max_code_attempts {
            let code = generate_code(&self.config.code_prefix, Utc::now());
            if !self.bookings.code_exists(&code).await? {
                debug!(code = %code, "allocated booking code via fallback");
                return Ok(code);
            }
        }
        warn!(
            attempts = self.config.max_code_attempts,
            "booking code allocation exhausted"
        );
        Err(InnkeepError::CodeAllocationExhausted {
            attempts: self.config.max_code_attempts,
        })
    }

    /// Current pool level.
    pub fn pool_len(&self) -> usize {
        self.pool.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Whether the pool has drained below the refill low-water mark.
    pub fn needs_refill(&self) -> bool {
        self.pool_len() < self.config.code_pool_low_water
    }

    /// Top the pool back up to the configured size.
    ///
    /// Each candidate is checked against the durable store before it
    /// enters the pool. Runs concurrently with allocation: the lock is
    /// held only to splice the fresh batch in, never across store
    /// calls. Errors propagate to the background caller, which logs
    /// them — allocation itself keeps working via the fallback path.
    pub async fn refill(&self) -> InnkeepResult<()> {
        let needed = self
            .config
            .code_pool_size
            .saturating_sub(self.pool_len());
        if needed == 0 {
            return Ok(());
        }

        let mut fresh = Vec::with_capacity(needed);
        // Bounded: the per-day suffix space is small, so a heavily
        // used date may not yield `needed` distinct free codes.
        let max_attempts = needed * 8;
        let mut attempts = 0;
        while fresh.len() < needed && attempts < max_attempts {
            attempts += 1;
            let code = generate_code(&self.config.code_prefix, Utc::now());
            if fresh.contains(&code) {
                continue;
            }
            if self.bookings.code_exists(&code).await? {
                continue;
            }
            fresh.push(code);
        }

        if fresh.len() < needed {
            warn!(
                generated = fresh.len(),
                needed, "code pool refill under target"
            );
        }

        if let Ok(mut pool) = self.pool.lock() {
            pool.append(&mut fresh);
        }

        debug!(pool_len = self.pool_len(), "code pool refilled");
        Ok(())
    }
}
