//! The polling loop.
//!
//! Each iteration: open a store session, run the early stage then the final
//! stage, drop the session, sleep. A store that cannot be reached skips both
//! stages and waits out the reconnect backoff instead.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use std::time::Duration;

use super::event::EventStore;
use super::stage::ReminderStage;
use super::window::TimeWindow;
use crate::core::Config;
use crate::features::delivery::Dispatcher;
use crate::features::enrichment::Enricher;

/// What one stage did during one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: ReminderStage,
    pub candidates: usize,
    pub completed: usize,
    pub channel_failures: usize,
    /// Store error that abandoned the rest of the stage
    pub error: Option<String>,
}

impl StageReport {
    fn new(stage: ReminderStage) -> Self {
        StageReport {
            stage,
            candidates: 0,
            completed: 0,
            channel_failures: 0,
            error: None,
        }
    }

    fn log_summary(&self) {
        let summary = format!(
            "{}: {} due, {} completed, {} channel failures",
            self.stage, self.candidates, self.completed, self.channel_failures
        );
        match &self.error {
            Some(e) => warn!("{summary}, abandoned: {e}"),
            None if self.candidates > 0 => info!("{summary}"),
            None => debug!("{summary}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// No session could be opened; no stage ran
    StoreUnavailable,
    /// Both stages ran, in order
    Completed(Vec<StageReport>),
}

pub struct ReminderScheduler<S: EventStore> {
    store: S,
    enricher: Box<dyn Enricher>,
    dispatcher: Box<dyn Dispatcher>,
    timezone: Tz,
    window_width: chrono::Duration,
    poll_interval: Duration,
    reconnect_backoff: Duration,
}

impl<S: EventStore> ReminderScheduler<S> {
    pub fn new(
        store: S,
        enricher: Box<dyn Enricher>,
        dispatcher: Box<dyn Dispatcher>,
        config: &Config,
    ) -> Self {
        ReminderScheduler {
            store,
            enricher,
            dispatcher,
            timezone: config.timezone,
            window_width: chrono::Duration::minutes(config.window_minutes),
            poll_interval: config.poll_interval,
            reconnect_backoff: config.reconnect_backoff,
        }
    }

    /// Poll until the process is stopped
    pub async fn run_forever(&self) {
        info!(
            "Reminder scheduler started (poll: {:?}, backoff: {:?}, zone: {})",
            self.poll_interval,
            self.reconnect_backoff,
            self.timezone.name()
        );

        loop {
            let now = Utc::now().with_timezone(&self.timezone);
            let pause = self.tick(now).await;
            info!("Sleeping for {} seconds...", pause.as_secs());
            tokio::time::sleep(pause).await;
        }
    }

    /// Run one iteration and return how long to wait before the next
    pub async fn tick(&self, now: DateTime<Tz>) -> Duration {
        match self.run_iteration(now).await {
            IterationOutcome::StoreUnavailable => self.reconnect_backoff,
            IterationOutcome::Completed(reports) => {
                for report in &reports {
                    report.log_summary();
                }
                self.poll_interval
            }
        }
    }

    pub async fn run_iteration(&self, now: DateTime<Tz>) -> IterationOutcome {
        let mut session = match self.store.connect() {
            Ok(session) => session,
            Err(e) => {
                error!(
                    "Failed to connect to database: {e:#}. Retrying in {} seconds...",
                    self.reconnect_backoff.as_secs()
                );
                return IterationOutcome::StoreUnavailable;
            }
        };

        let window = TimeWindow::around(now, self.window_width);
        let mut reports = Vec::with_capacity(ReminderStage::ALL.len());
        for stage in ReminderStage::ALL {
            reports.push(self.run_stage(&mut session, stage, &window).await);
        }

        drop(session);
        IterationOutcome::Completed(reports)
    }

    async fn run_stage(
        &self,
        session: &mut S::Session,
        stage: ReminderStage,
        window: &TimeWindow,
    ) -> StageReport {
        let mut report = StageReport::new(stage);
        if let Err(e) = self.process_stage(session, stage, window, &mut report).await {
            error!("Database error for {stage}: {e:#}");
            report.error = Some(format!("{e:#}"));
        }
        report
    }

    async fn process_stage(
        &self,
        session: &mut S::Session,
        stage: ReminderStage,
        window: &TimeWindow,
        report: &mut StageReport,
    ) -> Result<()> {
        let events = stage.fetch_candidates(session, window)?;
        report.candidates = events.len();
        if events.is_empty() {
            debug!("No events due for {stage}");
            return Ok(());
        }

        info!("Found {} events for {stage}.", events.len());
        let zone_label = window.zone_label();

        for event in events {
            info!("Processing {stage} for '{}'...", event.title);

            let enrichment = self
                .enricher
                .generate(&event.title, &event.description, &window.now)
                .await;
            let notification = stage.compose(&event, self.timezone, &zone_label, &enrichment);
            let delivery = self.dispatcher.deliver(&event.contact, &notification).await;

            // Commits regardless of delivery; a failed channel is not retried.
            if delivery.failures() > 0 {
                warn!(
                    "Event {} {stage} delivered with failures (chat: {}, email: {})",
                    event.id, delivery.chat, delivery.email
                );
                report.channel_failures += delivery.failures();
            }

            stage.complete(session, event.id)?;
            report.completed += 1;
            info!("Successfully updated event {} as '{stage}' sent.", event.id);
        }

        Ok(())
    }
}
