pub mod anomaly;
pub mod botnet;
pub mod cluster;
pub mod isolation_forest;
pub mod patterns;
pub mod stats;
pub mod threat;
