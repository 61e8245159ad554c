//! Submit lifecycle: `Idle -> Pending -> {Succeeded | Failed}`.

use shared::{domain::FormValues, protocol::PredictResponse};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{RequestTicket, ServiceError};

const MISSING_PREDICTION: &str = "prediction missing from response";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service could not be reached or answered with something unreadable.
    Transport,
    /// The service answered but without a usable prediction.
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmissionFailure {
    pub fn transport(err: &ServiceError) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: describe_transport_failure(err),
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Semantic,
            message: message.into(),
        }
    }
}

pub fn describe_transport_failure(err: &ServiceError) -> String {
    let detail = err.to_string();
    let lower = detail.to_ascii_lowercase();
    let hint = if lower.contains("connection refused")
        || lower.contains("failed to connect")
        || lower.contains("dns")
        || lower.contains("error sending request")
    {
        "server unreachable; check the API URL and network"
    } else if lower.contains("timed out") || lower.contains("timeout") {
        "request timed out"
    } else {
        detail.as_str()
    };
    format!("Something went wrong: {hint}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Pending,
    Succeeded {
        price: f64,
        /// Values that produced `price`, detached from the live form.
        snapshot: FormValues,
    },
    Failed(SubmissionFailure),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Pending => "pending",
            SubmissionState::Succeeded { .. } => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded { .. } | SubmissionState::Failed(_)
        )
    }
}

/// Whether the live form is cleared after a submission settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Clear after success and after failure.
    #[default]
    Always,
    /// Keep the entries when the prediction failed so they can be corrected.
    OnSuccessOnly,
}

impl ResetPolicy {
    pub fn resets_after(self, state: &SubmissionState) -> bool {
        match (self, state) {
            (ResetPolicy::Always, state) => state.is_settled(),
            (ResetPolicy::OnSuccessOnly, SubmissionState::Succeeded { .. }) => true,
            (ResetPolicy::OnSuccessOnly, _) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Stale,
    Settled { reset_values: bool },
}

#[derive(Debug)]
struct InFlight {
    ticket: RequestTicket,
    snapshot: FormValues,
}

#[derive(Debug)]
pub struct SubmissionController {
    state: SubmissionState,
    in_flight: Option<InFlight>,
    policy: ResetPolicy,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new(ResetPolicy::default())
    }
}

impl SubmissionController {
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            state: SubmissionState::Idle,
            in_flight: None,
            policy,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn policy(&self) -> ResetPolicy {
        self.policy
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drops a settled outcome. Has no effect while a request is in flight.
    pub fn dismiss(&mut self) {
        if !self.is_pending() {
            self.state = SubmissionState::Idle;
        }
    }

    /// Moves to `Pending`, capturing the values being sent. Returns `false`
    /// if another submission is already in flight.
    pub fn begin(&mut self, ticket: RequestTicket, snapshot: FormValues) -> bool {
        if let Some(current) = &self.in_flight {
            debug!(
                ticket = ticket.id(),
                in_flight = current.ticket.id(),
                "ignoring re-entrant submit"
            );
            return false;
        }
        self.in_flight = Some(InFlight { ticket, snapshot });
        self.state = SubmissionState::Pending;
        true
    }

    pub fn resolve(
        &mut self,
        ticket: RequestTicket,
        result: Result<PredictResponse, ServiceError>,
    ) -> Resolution {
        let snapshot = match self.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight.snapshot,
            other => {
                self.in_flight = other;
                debug!(ticket = ticket.id(), "ignoring stale prediction response");
                return Resolution::Stale;
            }
        };

        self.state = match interpret_response(result) {
            Ok(price) => {
                info!(price, "prediction received");
                SubmissionState::Succeeded { price, snapshot }
            }
            Err(failure) => {
                warn!(kind = ?failure.kind, message = %failure.message, "prediction failed");
                SubmissionState::Failed(failure)
            }
        };
        Resolution::Settled {
            reset_values: self.policy.resets_after(&self.state),
        }
    }
}

/// Extracts the predicted price from a service reply.
pub fn interpret_response(
    result: Result<PredictResponse, ServiceError>,
) -> Result<f64, SubmissionFailure> {
    let response = result.map_err(|err| SubmissionFailure::transport(&err))?;
    if let Some(price) = response.prediction_value() {
        return Ok(price);
    }
    Err(SubmissionFailure::semantic(
        response
            .error_message()
            .unwrap_or_else(|| MISSING_PREDICTION.to_string()),
    ))
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
