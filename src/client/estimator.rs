//! Property value estimator: input model bound to the valuation service.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::controller::{LifecycleController, SubmitOutcome, SubmitRejection};
use crate::domain::lifecycle::{Disposition, FailureReason, RequestLifecycleState};
use crate::domain::property::PropertyField;
use crate::http::HttpClient;
use crate::input::{InputModel, ValidationOutcome};
use crate::render::{EstimatorView, Locale, project_estimator};
use crate::transport::{ServiceHealth, ValuationService};

/// Owns the form state and the estimate request lifecycle.
///
/// The input model is only mutated through [`edit`](Self::edit); a failed
/// request never touches it, so the user can resubmit without re-entering data.
pub struct EstimatorClient<H: HttpClient> {
    input: InputModel,
    controller: LifecycleController<ValuationService<H>>,
    locale: Locale,
}

impl<H: HttpClient> EstimatorClient<H> {
    /// Create a client with the form pre-filled with default values.
    pub fn new(http: H, config: &ClientConfig) -> Self {
        Self::with_input(http, config, InputModel::default())
    }

    pub fn with_input(http: H, config: &ClientConfig, input: InputModel) -> Self {
        Self {
            input,
            controller: LifecycleController::new(
                ValuationService::new(http, config),
                config.request_timeout_ms,
            ),
            locale: config.locale,
        }
    }

    /// Apply a user edit to one field.
    pub fn edit(&mut self, field: PropertyField, raw: &str) -> ValidationOutcome {
        self.input.update(field, raw)
    }

    pub fn input(&self) -> &InputModel {
        &self.input
    }

    pub fn state(&self) -> &RequestLifecycleState<f64> {
        self.controller.state()
    }

    pub fn controller(&self) -> &LifecycleController<ValuationService<H>> {
        &self.controller
    }

    pub fn is_submittable(&self) -> bool {
        self.input.is_submittable()
    }

    /// Validate the form and dispatch an estimate request.
    ///
    /// A no-op if any field is invalid or a request is already in flight.
    pub fn submit(&mut self) -> SubmitOutcome {
        match self.input.to_request() {
            Ok(request) => self.controller.submit(request),
            Err(error) => {
                tracing::debug!(field = error.field().name(), error = %error, "Form not submittable");
                self.controller.reject(SubmitRejection::NotSubmittable)
            }
        }
    }

    /// Wait until the current request settles.
    pub async fn settle(&mut self) -> &RequestLifecycleState<f64> {
        self.controller.settle().await
    }

    /// Apply the next settlement, stale or not.
    pub async fn next_settlement(&mut self) -> Option<Disposition> {
        self.controller.next_settlement().await
    }

    /// Stop waiting for the in-flight request.
    pub fn abandon(&mut self) -> Disposition {
        self.controller.abandon()
    }

    pub async fn health(&self) -> Result<ServiceHealth, FailureReason> {
        self.controller.transport().health().await
    }

    pub async fn model_info(&self) -> Result<serde_json::Map<String, Value>, FailureReason> {
        self.controller.transport().model_info().await
    }

    pub fn display(&self) -> EstimatorView {
        project_estimator(&self.input, self.controller.state(), self.locale)
    }
}
