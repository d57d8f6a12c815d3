// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proactive check-ins.
//!
//! A once-per-tick scheduler that sends a morning and an evening message at
//! fixed local times, plus an optional startup message. Each firing fans out
//! over the users named by a [`UserSource`].

use std::sync::Arc;
use std::time::Duration;

use aura_config::model::CheckinConfig;
use aura_core::{
    AuraError, GenerationProvider, GenerationRequest, Message, MessageStore, NewMessage, Turn,
    UserId,
};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::memory::MemoryAccessor;
use crate::prompt::{CHECKIN_FALLBACK, CheckInKind, Persona};

/// Which users a check-in goes to.
#[derive(Clone)]
pub enum UserSource {
    /// Single-tenant deployment.
    Fixed(UserId),
    /// Every user known to the store.
    Directory(Arc<dyn MessageStore>),
}

impl UserSource {
    pub async fn users(&self) -> Result<Vec<UserId>, AuraError> {
        match self {
            UserSource::Fixed(user) => Ok(vec![user.clone()]),
            UserSource::Directory(store) => store.list_users().await,
        }
    }
}

/// Generates and stores a single check-in message.
#[derive(Clone)]
pub struct CheckInSender {
    provider: Arc<dyn GenerationProvider>,
    messages: Arc<dyn MessageStore>,
    memory: MemoryAccessor,
    persona: Persona,
    temperature: f32,
    personalize: bool,
}

impl CheckInSender {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        messages: Arc<dyn MessageStore>,
        memory: MemoryAccessor,
        persona: Persona,
        temperature: f32,
        personalize: bool,
    ) -> Self {
        Self {
            provider,
            messages,
            memory,
            persona,
            temperature,
            personalize,
        }
    }

    /// Sends one check-in of `kind` to `user`.
    ///
    /// Generation failures fall back to [`CHECKIN_FALLBACK`]; only the store
    /// append can fail.
    pub async fn send(&self, user: &UserId, kind: CheckInKind) -> Result<Message, AuraError> {
        let memory = if self.personalize {
            self.memory.get(user).await
        } else {
            String::new()
        };

        let request = GenerationRequest {
            system_prompt: self.persona.system_prompt(&memory),
            turns: vec![Turn::user(kind.prompt())],
            temperature: self.temperature,
        };

        let text = match self.provider.complete(request).await {
            Ok(response) => response.text,
            Err(e) => {
                warn!(user_id = %user, kind = %kind, error = %e, "check-in generation failed, sending fallback");
                CHECKIN_FALLBACK.to_string()
            }
        };

        let stored = self.messages.append_message(user, NewMessage::ai(text)).await?;
        info!(user_id = %user, kind = %kind, message_id = %stored.id, "check-in sent");
        Ok(stored)
    }
}

/// A daily check-in at a fixed local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInJob {
    pub kind: CheckInKind,
    pub at: NaiveTime,
    pub next_run: NaiveDateTime,
}

impl CheckInJob {
    pub fn new(kind: CheckInKind, at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            kind,
            at,
            next_run: next_occurrence(at, now),
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_run <= now
    }
}

/// The first time `at` occurs strictly after `now`.
pub fn next_occurrence(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Result of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct ProactiveScheduler {
    sender: CheckInSender,
    users: UserSource,
    jobs: Vec<CheckInJob>,
    tick: Duration,
}

impl ProactiveScheduler {
    /// Builds the morning and evening jobs, each scheduled after `now`.
    pub fn new(
        sender: CheckInSender,
        users: UserSource,
        config: &CheckinConfig,
        now: NaiveDateTime,
    ) -> Result<Self, AuraError> {
        let morning = config.morning_time().ok_or_else(|| {
            AuraError::Config(format!("invalid checkin.morning time: {:?}", config.morning))
        })?;
        let evening = config.evening_time().ok_or_else(|| {
            AuraError::Config(format!("invalid checkin.evening time: {:?}", config.evening))
        })?;

        Ok(Self {
            sender,
            users,
            jobs: vec![
                CheckInJob::new(CheckInKind::Morning, morning, now),
                CheckInJob::new(CheckInKind::Evening, evening, now),
            ],
            tick: Duration::from_secs(config.tick_secs.max(1)),
        })
    }

    pub fn jobs(&self) -> &[CheckInJob] {
        &self.jobs
    }

    /// Sends the startup check-in to every user.
    pub async fn send_startup(&self) -> FanOutReport {
        self.fan_out(CheckInKind::Startup).await
    }

    /// Runs every job due at `now` and reschedules it. Returns the kinds that fired.
    pub async fn run_pending_at(&mut self, now: NaiveDateTime) -> Vec<CheckInKind> {
        let mut fired = Vec::new();
        for i in 0..self.jobs.len() {
            if !self.jobs[i].is_due(now) {
                continue;
            }
            let kind = self.jobs[i].kind;
            self.fan_out(kind).await;
            let job = &mut self.jobs[i];
            job.next_run = next_occurrence(job.at, now);
            debug!(kind = %kind, next_run = %job.next_run, "check-in rescheduled");
            fired.push(kind);
        }
        fired
    }

    /// Sends one check-in of `kind` to each user. Per-user failures are logged and skipped.
    pub async fn fan_out(&self, kind: CheckInKind) -> FanOutReport {
        let users = match self.users.users().await {
            Ok(users) => users,
            Err(e) => {
                warn!(kind = %kind, error = %e, "failed to enumerate users");
                return FanOutReport::default();
            }
        };

        let mut report = FanOutReport::default();
        for user in &users {
            match self.sender.send(user, kind).await {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    warn!(user_id = %user, kind = %kind, error = %e, "check-in failed");
                    report.failed += 1;
                }
            }
        }
        info!(kind = %kind, sent = report.sent, failed = report.failed, "check-in fan-out complete");
        report
    }

    /// Ticks until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        for job in &self.jobs {
            info!(kind = %job.kind, next_run = %job.next_run, "check-in scheduled");
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("scheduler stopping");
                    return;
                }
                _ = interval.tick() => {
                    let now = chrono::Local::now().naive_local();
                    self.run_pending_at(now).await;
                }
            }
        }
    }
}
