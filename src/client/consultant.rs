//! Multi-app consultation: fan a change-log query out over many apps.
//!
//! Fetches run concurrently on the calling task, at most `max_concurrent`
//! in flight, all sharing one client (and so one cache and one limiter).

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};

use super::changes::{ChangeLogClient, FetchOutcome};
use super::models::{ChangeLogRequest, ChangeLogResponse, Store};
use super::ChangeLogApi;

/// Type alias for boxed per-app fetch futures
type AppFuture<'a> = Pin<Box<dyn Future<Output = (String, FetchOutcome)> + Send + 'a>>;

/// Every app's outcome for one batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub store: Store,
    pub outcomes: BTreeMap<String, FetchOutcome>,
}

impl BatchReport {
    /// Successful responses keyed by app id
    pub fn successes(&self) -> BTreeMap<String, ChangeLogResponse> {
        self.outcomes
            .iter()
            .filter_map(|(app, outcome)| outcome.response().map(|r| (app.clone(), r.clone())))
            .collect()
    }

    /// Consume the report, keeping only successful responses
    pub fn into_successes(self) -> BTreeMap<String, ChangeLogResponse> {
        self.outcomes
            .into_iter()
            .filter_map(|(app, outcome)| outcome.into_response().map(|r| (app, r)))
            .collect()
    }

    /// App ids that produced no result
    pub fn failed_apps(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(app, _)| app.as_str())
            .collect()
    }
}

/// Queries many apps through one [`ChangeLogClient`].
pub struct AppConsultant<'c, C: ChangeLogApi> {
    client: &'c ChangeLogClient<C>,
    max_concurrent: usize,
}

impl<'c, C: ChangeLogApi> AppConsultant<'c, C> {
    pub fn new(client: &'c ChangeLogClient<C>, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch every app and return only the successful responses.
    ///
    /// Apps that failed are left out of the mapping; the log records why.
    #[allow(dead_code)]
    pub async fn consult_apps(
        &self,
        apps: &[String],
        store: Store,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BTreeMap<String, ChangeLogResponse> {
        self.consult_apps_detailed(apps, store, start_date, end_date)
            .await
            .into_successes()
    }

    /// Fetch every app and report each one's outcome.
    pub async fn consult_apps_detailed(
        &self,
        apps: &[String],
        store: Store,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> BatchReport {
        let mut report = BatchReport {
            store,
            outcomes: BTreeMap::new(),
        };
        if apps.is_empty() {
            return report;
        }

        info!(
            "Consulting {} {} apps for {} to {} (max {} concurrent)",
            apps.len(),
            store,
            start_date,
            end_date,
            self.max_concurrent
        );

        let client = self.client;
        let make_future = |app_id: &String| -> AppFuture<'c> {
            let request = ChangeLogRequest::new(app_id.clone(), store, start_date, end_date);
            Box::pin(async move {
                let outcome = client.fetch_changes_log(&request).await;
                (request.app_id, outcome)
            })
        };

        let mut futures: FuturesUnordered<AppFuture<'c>> = FuturesUnordered::new();
        let mut pending = apps.iter();

        // Seed initial batch up to max_concurrent
        for app_id in pending.by_ref().take(self.max_concurrent) {
            futures.push(make_future(app_id));
        }

        // Refill as fetches complete
        while let Some((app_id, outcome)) = futures.next().await {
            debug!("{} finished: {}", app_id, outcome.status_label());
            report.outcomes.insert(app_id, outcome);

            if let Some(next) = pending.next() {
                futures.push(make_future(next));
            }
        }

        let failed = report.failed_apps();
        if failed.is_empty() {
            info!("All {} {} apps returned data", report.outcomes.len(), store);
        } else {
            warn!(
                "{} of {} {} apps returned no data: {}",
                failed.len(),
                report.outcomes.len(),
                store,
                failed.join(", ")
            );
        }

        report
    }
}
