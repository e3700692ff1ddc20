//! Booking engine configuration.

/// Configuration for the booking engine.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Prefix for generated booking codes (default: `BK`).
    pub code_prefix: String,
    /// Target size of the pre-generated code pool (default: 1000).
    pub code_pool_size: usize,
    /// Pool level below which the background refill tops up
    /// (default: 200).
    pub code_pool_low_water: usize,
    /// Bounded attempts for the synchronous fallback allocation path
    /// (default: 5).
    pub max_code_attempts: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            code_prefix: "BK".into(),
            code_pool_size: 1000,
            code_pool_low_water: 200,
            max_code_attempts: 5,
        }
    }
}
