//! Market analysis view: statistics fetched once per visit.

use crate::config::ClientConfig;
use crate::controller::{LifecycleController, SubmitOutcome, SubmitRejection};
use crate::domain::lifecycle::{Disposition, FailureReason, RequestLifecycleState};
use crate::domain::statistics::StatisticsSnapshot;
use crate::http::HttpClient;
use crate::render::{AnalysisView, Locale, project_analysis};
use crate::transport::{AnalyticsService, ServiceHealth};

pub struct AnalysisClient<H: HttpClient> {
    controller: LifecycleController<AnalyticsService<H>>,
    mounted: bool,
    locale: Locale,
}

impl<H: HttpClient> AnalysisClient<H> {
    pub fn new(http: H, config: &ClientConfig) -> Self {
        Self {
            controller: LifecycleController::new(
                AnalyticsService::new(http, config),
                config.request_timeout_ms,
            ),
            mounted: false,
            locale: config.locale,
        }
    }

    /// Start the initial fetch. Only the first call per client does anything.
    pub fn mount(&mut self) -> SubmitOutcome {
        if self.mounted {
            return self.controller.reject(SubmitRejection::AlreadyMounted);
        }
        self.mounted = true;
        self.controller.submit(())
    }

    /// Start a new fetch cycle, replacing the current snapshot when it settles.
    pub fn refresh(&mut self) -> SubmitOutcome {
        self.mounted = true;
        self.controller.submit(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn state(&self) -> &RequestLifecycleState<StatisticsSnapshot> {
        self.controller.state()
    }

    pub fn controller(&self) -> &LifecycleController<AnalyticsService<H>> {
        &self.controller
    }

    /// Snapshot from the most recent fetch, if it succeeded.
    pub fn snapshot(&self) -> Option<&StatisticsSnapshot> {
        self.controller.state().payload()
    }

    pub async fn settle(&mut self) -> &RequestLifecycleState<StatisticsSnapshot> {
        self.controller.settle().await
    }

    pub async fn next_settlement(&mut self) -> Option<Disposition> {
        self.controller.next_settlement().await
    }

    pub async fn health(&self) -> Result<ServiceHealth, FailureReason> {
        self.controller.transport().health().await
    }

    pub fn display(&self) -> AnalysisView {
        project_analysis(self.controller.state(), self.locale)
    }
}
