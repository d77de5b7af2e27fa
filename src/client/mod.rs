//! The two client instances built on [`LifecycleController`](crate::controller::LifecycleController).
//!
//! - [`EstimatorClient`]: form input, validation, one estimate per submit
//! - [`AnalysisClient`]: one statistics fetch per page visit, explicit refresh

pub mod analysis;
pub mod estimator;

pub use analysis::AnalysisClient;
pub use estimator::EstimatorClient;
