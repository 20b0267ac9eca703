//! Job and quote lifecycle status policy.
//!
//! The single authority on which status transitions are legal and on what
//! status a job takes when a schedule timestamp is written onto it. Status
//! values arrive from the database and from API payloads as strings, and
//! legacy records may carry values outside the current enums, so the
//! boundary functions operate on raw strings and treat anything
//! unrecognized as invalid rather than failing.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle stage of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Quote,
    WaitingSchedule,
    WaitingExecution,
    Done,
}

/// Lifecycle stage of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl JobStatus {
    /// Legal successor check.
    ///
    /// `Done` is terminal apart from its self-loop, so no path through this
    /// policy can reopen a completed job. The two waiting states each allow
    /// a one-step revert so unschedule/reschedule operations stay legal.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, to),
            (Quote, WaitingSchedule)
                | (WaitingSchedule, WaitingExecution)
                | (WaitingSchedule, Quote)
                | (WaitingExecution, Done)
                | (WaitingExecution, WaitingSchedule)
                | (Done, Done)
        )
    }

    /// Status a job adopts the moment a scheduled start time is set on it.
    ///
    /// Idempotent: applying it to its own output is a no-op. Scheduling a
    /// completed job does not resurrect it; scheduling a quote-stage job
    /// gives it a tentative slot; a tentative job with a concrete time
    /// becomes confirmed and stays confirmed on reschedule.
    pub fn on_scheduled(self) -> JobStatus {
        match self {
            JobStatus::Done => JobStatus::Done,
            JobStatus::Quote => JobStatus::WaitingSchedule,
            JobStatus::WaitingSchedule => JobStatus::WaitingExecution,
            JobStatus::WaitingExecution => JobStatus::WaitingExecution,
        }
    }
}

impl QuoteStatus {
    /// Legal successor check.
    ///
    /// `Approved` is terminal: an approved quote converts to a job through
    /// a separate operation and never cycles back. `Rejected` may be revived
    /// to `Draft` for re-quoting, and `Sent` may revert to `Draft` to
    /// support edit-and-resend.
    pub fn can_transition_to(self, to: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, to),
            (Draft, Sent)
                | (Draft, Approved)
                | (Draft, Rejected)
                | (Sent, Approved)
                | (Sent, Rejected)
                | (Sent, Draft)
                | (Approved, Approved)
                | (Rejected, Rejected)
                | (Rejected, Draft)
        )
    }
}

/// True iff `value` is exactly one of the four job status literals.
pub fn is_job_status(value: &str) -> bool {
    value.parse::<JobStatus>().is_ok()
}

/// True iff both strings are valid job statuses and the transition is legal.
pub fn can_transition_job_status(from: &str, to: &str) -> bool {
    match (from.parse::<JobStatus>(), to.parse::<JobStatus>()) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// True iff `value` is exactly one of the four quote status literals.
pub fn is_quote_status(value: &str) -> bool {
    value.parse::<QuoteStatus>().is_ok()
}

/// True iff both strings are valid quote statuses and the transition is legal.
pub fn can_transition_quote_status(from: &str, to: &str) -> bool {
    match (from.parse::<QuoteStatus>(), to.parse::<QuoteStatus>()) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// String-level scheduling derivation.
///
/// Unrecognized input falls through to `WaitingSchedule`: the caller already
/// intends to schedule the job, so a record with a corrupt status string is
/// pulled back into the normal flow rather than rejected.
pub fn status_for_scheduling(current: &str) -> JobStatus {
    current
        .parse::<JobStatus>()
        .map(JobStatus::on_scheduled)
        .unwrap_or(JobStatus::WaitingSchedule)
}
