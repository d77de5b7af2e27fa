//! Request-lifecycle and validation client for a property valuation service
//! and a market statistics service.
//!
//! Raw user input is validated into an [`EstimateRequest`], submitted through a
//! [`LifecycleController`] that keeps at most one request outstanding, and
//! settled into a deterministic [`RequestLifecycleState`]. Settlements from
//! superseded submissions are detected by generation marker and ignored. The
//! [`render`] module projects input and state into display data.

pub mod client;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod http;
pub mod input;
pub mod render;
pub mod transport;

// Re-export commonly used types
pub use client::{AnalysisClient, EstimatorClient};
pub use config::ClientConfig;
pub use controller::{LifecycleController, Settlement, SubmitOutcome, SubmitRejection};
pub use domain::lifecycle::{
    Disposition, FailureReason, Generation, Ignored, LifecycleEvent, RequestLifecycleState,
};
pub use domain::property::{EstimateRequest, PropertyField, ValidationError};
pub use domain::statistics::StatisticsSnapshot;
pub use error::{HomevalError, Result};
pub use http::{HttpClient, HttpRequest, HttpResponse, MockHttpClient, ReqwestHttpClient};
pub use input::{InputModel, ValidationOutcome};
pub use render::{AnalysisView, EstimatorView, Locale};
pub use transport::{AnalyticsService, ServiceHealth, Transport, ValuationService};
