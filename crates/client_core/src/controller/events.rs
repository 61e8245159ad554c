//! Discrete form events and the reducer that applies them.

use shared::{
    domain::FormField,
    protocol::{CatalogResponse, PredictResponse},
};

use super::{FormController, InteractionError, PendingSubmission, SubmitOutcome};
use crate::{validation::ValidationState, RequestTicket, ServiceError};

#[derive(Debug, Clone)]
pub enum FormEvent {
    CatalogLoaded {
        ticket: RequestTicket,
        result: Result<CatalogResponse, ServiceError>,
    },
    FieldChanged {
        field: FormField,
        value: String,
    },
    SubmitRequested,
    PredictionResolved {
        ticket: RequestTicket,
        result: Result<PredictResponse, ServiceError>,
    },
    ResetRequested,
    OutcomeDismissed,
    Remounted,
}

/// What the presentation layer has to do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEffect {
    /// State changed; re-render.
    Updated,
    /// The event referred to a request nobody is waiting on any more.
    Ignored,
    Rejected(InteractionError),
    Blocked(ValidationState),
    /// Send this request and feed the reply back as `PredictionResolved`.
    Dispatch(PendingSubmission),
    /// Start a catalog load and feed the reply back as `CatalogLoaded`.
    LoadCatalog(RequestTicket),
}

impl FormController {
    pub fn apply(&mut self, event: FormEvent) -> FormEffect {
        match event {
            FormEvent::CatalogLoaded { ticket, result } => {
                settled(self.on_catalog_loaded(ticket, result))
            }
            FormEvent::FieldChanged { field, value } => match self.on_field_change(field, value) {
                Ok(()) => FormEffect::Updated,
                Err(err) => FormEffect::Rejected(err),
            },
            FormEvent::SubmitRequested => match self.on_submit() {
                Ok(SubmitOutcome::Dispatch(pending)) => FormEffect::Dispatch(pending),
                Ok(SubmitOutcome::Blocked(validation)) => FormEffect::Blocked(validation),
                Err(err) => FormEffect::Rejected(err),
            },
            FormEvent::PredictionResolved { ticket, result } => {
                settled(self.on_prediction_resolved(ticket, result))
            }
            FormEvent::ResetRequested => {
                self.reset();
                FormEffect::Updated
            }
            FormEvent::OutcomeDismissed => {
                self.dismiss_outcome();
                FormEffect::Updated
            }
            FormEvent::Remounted => {
                self.remount();
                match self.begin_catalog_load() {
                    Some(ticket) => FormEffect::LoadCatalog(ticket),
                    None => FormEffect::Ignored,
                }
            }
        }
    }
}

fn settled(applied: bool) -> FormEffect {
    if applied {
        FormEffect::Updated
    } else {
        FormEffect::Ignored
    }
}
