//! The control agent: ties transport events to the dispatcher.
//!
//! Inbound messages and periodic ticks are handled one at a time on the
//! agent task. Device calls run on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use deskctl_core::{
    AgentState, DispatchResult, Dispatcher, ReportTrigger, StatusReport, StatusReporter, parse,
};
use deskctl_mqtt::TransportEvent;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

/// Drives command handling and status reporting for one broker session.
pub struct Agent {
    dispatcher: Arc<Dispatcher>,
    status_tx: mpsc::Sender<Vec<u8>>,
    status_interval: Option<Duration>,
    state: AgentState,
}

impl Agent {
    /// Create an agent publishing rendered reports on `status_tx`.
    ///
    /// A zero `status_interval` disables periodic reports like `None`.
    #[must_use]
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        status_tx: mpsc::Sender<Vec<u8>>,
        status_interval: Option<Duration>,
    ) -> Self {
        Self {
            dispatcher,
            status_tx,
            status_interval: status_interval.filter(|period| !period.is_zero()),
            state: AgentState::Disconnected,
        }
    }

    /// Process transport events until shutdown is requested or the
    /// transport goes away.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TransportEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Transport closed");
                        break;
                    };
                    self.handle_event(event, &mut ticker).await;
                }

                () = next_tick(&mut ticker) => {
                    self.report_periodic().await;
                }

                Some(()) = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(state = %self.state, "Agent stopped");
    }

    async fn handle_event(&mut self, event: TransportEvent, ticker: &mut Option<Interval>) {
        match event {
            TransportEvent::Connected => {
                self.transition(AgentState::Connected);
                // First tick fires right away, then every period.
                *ticker = self.status_interval.map(|period| {
                    let mut ticker = interval(period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker
                });
            }
            TransportEvent::Disconnected(reason) => {
                warn!(reason = %reason, "Lost broker connection");
                self.transition(AgentState::Disconnected);
                *ticker = None;
            }
            TransportEvent::Message { topic, payload } => {
                if self.state == AgentState::Connected {
                    self.handle_message(&topic, payload).await;
                } else {
                    debug!(topic = %topic, "Discarding message received while disconnected");
                }
            }
        }
    }

    async fn handle_message(&self, topic: &str, payload: Bytes) {
        let command = match parse(&payload) {
            Ok(command) => command,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Dropping control message");
                return;
            }
        };
        debug!(%command, "Dispatching command");

        let dispatcher = Arc::clone(&self.dispatcher);
        let result = run_blocking(move || dispatcher.dispatch(command)).await;
        match result {
            Some(Ok(report)) => self.publish(&report, ReportTrigger::Dispatch).await,
            Some(Err(e)) => warn!(%command, error = %e, "Command failed"),
            None => {}
        }
    }

    async fn report_periodic(&self) {
        let dispatcher = Arc::clone(&self.dispatcher);
        match run_blocking(move || dispatcher.snapshot()).await {
            Some(Ok(report)) => self.publish(&report, ReportTrigger::Periodic).await,
            Some(Err(e)) => warn!(error = %e, "Periodic status read failed"),
            None => {}
        }
    }

    async fn publish(&self, report: &StatusReport, trigger: ReportTrigger) {
        let payload = match StatusReporter::render(report) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to render status report");
                return;
            }
        };

        if self.status_tx.send(payload).await.is_err() {
            warn!(%trigger, "Status publisher is gone, report dropped");
        } else {
            debug!(%trigger, volume = report.volume, muted = report.muted, "Status reported");
        }
    }

    fn transition(&mut self, next: AgentState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "Agent state changed");
            self.state = next;
        }
    }
}

/// Run device work on the blocking pool. `None` if the task panicked.
async fn run_blocking(
    work: impl FnOnce() -> DispatchResult<StatusReport> + Send + 'static,
) -> Option<DispatchResult<StatusReport>> {
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => Some(result),
        Err(e) => {
            error!(error = %e, "Device task failed");
            None
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
