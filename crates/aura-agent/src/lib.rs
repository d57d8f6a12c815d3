// SPDX-FileCopyrightText: 2026 Aura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Companion behavior for Aura.
//!
//! The [`ChangeListener`] feeds new user messages into the
//! [`ResponsePipeline`], which replies and periodically consolidates the
//! user's long-term memory through the [`Summarizer`]. The
//! [`ProactiveScheduler`] sends unprompted check-ins on a daily schedule.

pub mod history;
pub mod listener;
pub mod memory;
pub mod pipeline;
pub mod prompt;
pub mod scheduler;
pub mod shutdown;
pub mod summarizer;

pub use history::HistoryAccessor;
pub use listener::ChangeListener;
pub use memory::MemoryAccessor;
pub use pipeline::{PipelineOutcome, PipelineSettings, ResponsePipeline, SummaryState};
pub use prompt::{CHECKIN_FALLBACK, CheckInKind, Persona, REPLY_FALLBACK, load_persona};
pub use scheduler::{CheckInSender, FanOutReport, ProactiveScheduler, UserSource};
pub use summarizer::Summarizer;
