use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRanking {
    pub rank: usize,
    pub node_id: u32,
    /// Mean measured uptime in seconds over the periods with any uptime.
    pub average_uptime: f64,
    pub uptime_percent: f64,
    pub periods_counted: usize,
}
