pub mod node_ranking;
