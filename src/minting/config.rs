pub const API_URL: &str = "https://alpha.minting.tfchain.grid.tf/api/v1";

pub const RETRY_INTERVAL_MILLIS: u64 = 10000;
pub const RETRY_COUNT: usize = 3;
