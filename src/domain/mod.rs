// Domain layer - snapshot model and derived metrics
pub mod metrics;
pub mod snapshot;
