use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::{
    render_stats, ADMIN_ONLY_MESSAGE, GENERIC_APOLOGY, HELP_MESSAGE, LOOKUP_APOLOGY,
    WELCOME_MESSAGE,
};
use crate::error::{AppError, AppResult};
use crate::models::{Command, EventKind, InboundEvent, RegistrationQuery, Sender};
use crate::services::chunker::outbound_messages;
use crate::services::{AdminList, LookupService, UsageRecorder};
use crate::transport::Transport;

/// Routes inbound events to command handlers and registration lookups
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    lookup: LookupService,
    recorder: Arc<dyn UsageRecorder>,
    admins: AdminList,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        lookup: LookupService,
        recorder: Arc<dyn UsageRecorder>,
        admins: AdminList,
    ) -> Self {
        Self {
            transport,
            lookup,
            recorder,
            admins,
        }
    }

    /// Processes events one at a time, in arrival order, until `cancel` fires.
    ///
    /// Handler errors never stop the loop. The only way out is cancellation,
    /// so the result is always `Err(AppError::Cancelled)`. If the update
    /// stream ends early, the loop idles until cancelled.
    pub async fn run<S>(&self, cancel: &CancellationToken, mut updates: S) -> AppResult<()>
    where
        S: Stream<Item = InboundEvent> + Unpin,
    {
        log::info!("Dispatcher started");

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = updates.next() => next,
            };

            match next {
                Some(event) => self.dispatch(cancel, event).await,
                None => {
                    log::warn!("Update stream ended, waiting for shutdown");
                    cancel.cancelled().await;
                    break;
                }
            }
        }

        log::info!("Dispatcher stopped");
        Err(AppError::Cancelled)
    }

    /// Handles a single event. Errors are logged and answered with an
    /// apology; a failed apology is logged as well.
    pub async fn dispatch(&self, cancel: &CancellationToken, event: InboundEvent) {
        let chat_id = event.chat_id;

        match self.handle(cancel, &event).await {
            Ok(()) => {}
            Err(AppError::Cancelled) => {
                log::info!("Abandoned update for chat {} on shutdown", chat_id);
            }
            Err(e) => {
                log::error!("{}", failure_log_line(chat_id, &e));

                let apology = match event.kind {
                    EventKind::Command { .. } => GENERIC_APOLOGY,
                    EventKind::Text(_) => LOOKUP_APOLOGY,
                };
                if let Err(e) = self.reply(chat_id, apology).await {
                    log::error!("Error sending error message to chat {}: {}", chat_id, e);
                }
            }
        }
    }

    /// Runs the handler for one event and returns its error unreported.
    /// Unknown commands are ignored.
    pub async fn handle(&self, cancel: &CancellationToken, event: &InboundEvent) -> AppResult<()> {
        let chat_id = event.chat_id;

        match &event.kind {
            EventKind::Command { name } => match Command::parse(name) {
                Some(command) => {
                    self.handle_command(command, chat_id, event.sender.as_ref())
                        .await
                }
                None => {
                    log::debug!("Ignoring unknown command /{} in chat {}", name, chat_id);
                    Ok(())
                }
            },
            EventKind::Text(text) => {
                let query = RegistrationQuery::new(text, chat_id, event.sender.clone());
                self.handle_registration(cancel, &query).await
            }
        }
    }

    async fn handle_command(
        &self,
        command: Command,
        chat_id: i64,
        sender: Option<&Sender>,
    ) -> AppResult<()> {
        match command {
            Command::Start => self.reply(chat_id, WELCOME_MESSAGE).await,
            Command::Help => self.reply(chat_id, HELP_MESSAGE).await,
            Command::Stats => self.handle_stats(chat_id, sender).await,
        }
    }

    async fn handle_registration(
        &self,
        cancel: &CancellationToken,
        query: &RegistrationQuery,
    ) -> AppResult<()> {
        let report = self.lookup.lookup(cancel, query).await?;
        self.reply(query.chat_id, report.as_str()).await
    }

    /// Admin-only usage counters. Refusals are not logged to the request log.
    async fn handle_stats(&self, chat_id: i64, sender: Option<&Sender>) -> AppResult<()> {
        let allowed = sender
            .is_some_and(|s| self.admins.is_admin(s.id, s.username.as_deref()));

        if !allowed {
            return self.reply(chat_id, ADMIN_ONLY_MESSAGE).await;
        }

        let stats = self.recorder.stats().await?;
        self.reply(chat_id, &render_stats(&stats)).await
    }

    /// Sends a reply, split into parts if it exceeds the message limit
    async fn reply(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let messages = outbound_messages(text);
        let total = messages.len();

        for (i, message) in messages.iter().enumerate() {
            self.transport
                .send(chat_id, message)
                .await
                .map_err(|error| AppError::Delivery {
                    part: i + 1,
                    total,
                    error,
                })?;
        }

        Ok(())
    }
}

/// Log line for an update whose handler failed. Upstream errors carry the
/// provider tag (`MOT` or `VES`).
pub fn failure_log_line(chat_id: i64, error: &AppError) -> String {
    format!("Error handling update for chat {}: {}", chat_id, error)
}
