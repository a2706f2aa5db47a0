//! Configuration types for the VPC service

use embassy_time::Duration;

/// EC protocol timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Time after which a pending EC command may be abandoned
    pub ec_timeout: Duration,
    /// Delay between two reads of the command slot
    pub poll_interval: Duration,
    /// Command slot reads that must fail before the timeout is honored
    pub min_retries: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ec_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_micros(250),
            min_retries: 5,
        }
    }
}
