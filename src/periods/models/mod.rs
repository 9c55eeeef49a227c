pub mod node_minting_period;
pub mod period;
