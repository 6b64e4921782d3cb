//! Registration lookup: concurrent fetch from both upstreams, merge, log.

use std::sync::Arc;

use futures_util::future::try_join;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::models::{MotVehicle, NewUsageEvent, RegistrationQuery, VesVehicle};
use crate::services::attribution::UsageAttributor;
use crate::services::formatter::{render_report, CombinedReport};
use crate::services::usage::UsageRecorder;
use crate::sources::{SourceKind, VehicleDataSource};

pub type MotSource = Arc<dyn VehicleDataSource<Record = MotVehicle>>;
pub type VesSource = Arc<dyn VehicleDataSource<Record = VesVehicle>>;

pub struct LookupService {
    mot: MotSource,
    ves: VesSource,
    recorder: Arc<dyn UsageRecorder>,
    attributor: UsageAttributor,
}

impl LookupService {
    pub fn new(
        mot: MotSource,
        ves: VesSource,
        recorder: Arc<dyn UsageRecorder>,
        attributor: UsageAttributor,
    ) -> Self {
        Self {
            mot,
            ves,
            recorder,
            attributor,
        }
    }

    /// Runs one lookup end to end and returns the rendered report.
    ///
    /// Either both sources succeed and a full report is produced, or the
    /// first failure is returned. Successful lookups are appended to the
    /// request log; a logging failure is only reported in the logs.
    pub async fn lookup(
        &self,
        cancel: &CancellationToken,
        query: &RegistrationQuery,
    ) -> AppResult<CombinedReport> {
        let (mot, ves) = self.fetch_both(cancel, &query.registration).await?;

        let report = render_report(&mot, &ves);

        let identity = self
            .attributor
            .identify(query.chat_id, query.sender.as_ref())
            .await;

        let event = NewUsageEvent {
            user_id: identity.user_id,
            label: identity.label,
            registration: query.registration.clone(),
            report: report.as_str().to_string(),
        };
        if let Err(e) = self.recorder.append(&event).await {
            log::error!("Failed to log request for {}: {}", query.registration, e);
        }

        Ok(report)
    }

    /// Fetches from both sources concurrently.
    ///
    /// The first error wins and the other fetch is dropped, which aborts its
    /// request. Cancellation takes priority over both.
    pub async fn fetch_both(
        &self,
        cancel: &CancellationToken,
        registration: &str,
    ) -> AppResult<(MotVehicle, VesVehicle)> {
        let mot = async {
            self.mot
                .fetch(registration)
                .await
                .map_err(|e| AppError::upstream(SourceKind::Mot, e))
        };
        let ves = async {
            self.ves
                .fetch(registration)
                .await
                .map_err(|e| AppError::upstream(SourceKind::Ves, e))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = try_join(mot, ves) => result,
        }
    }
}
