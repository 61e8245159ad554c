//! Controller layer: form state, handlers for the presentation layer, and
//! the event reducer built on them.

use std::collections::BTreeSet;

use shared::{
    domain::{Catalog, FormField, FormValues},
    protocol::{CatalogResponse, PredictRequest, PredictResponse},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::{CatalogState, CatalogStore},
    filter::filter_items,
    submission::{Resolution, ResetPolicy, SubmissionController, SubmissionState},
    validation::{validate, ValidationState},
    RequestTicket, ServiceError,
};

pub mod events;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("options are still loading")]
    Loading,
    #[error("{value:?} is not an available option for {field}")]
    NotAnOption { field: FormField, value: String },
    #[error("a prediction request is already in flight")]
    SubmissionPending,
}

/// A validated request the caller must send, then report back with
/// [`FormController::on_prediction_resolved`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub ticket: RequestTicket,
    pub request: PredictRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Dispatch(PendingSubmission),
    Blocked(ValidationState),
}

#[derive(Debug)]
pub struct FormController {
    catalog: CatalogStore,
    values: FormValues,
    touched: BTreeSet<FormField>,
    validation: ValidationState,
    item_options: Vec<String>,
    submission: SubmissionController,
    next_ticket: u64,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    pub fn new() -> Self {
        Self::with_reset_policy(ResetPolicy::default())
    }

    pub fn with_reset_policy(policy: ResetPolicy) -> Self {
        let values = FormValues::default();
        Self {
            catalog: CatalogStore::new(),
            validation: validate(&values),
            values,
            touched: BTreeSet::new(),
            item_options: Vec::new(),
            submission: SubmissionController::new(policy),
            next_ticket: 0,
        }
    }

    fn issue_ticket(&mut self) -> RequestTicket {
        self.next_ticket += 1;
        RequestTicket(self.next_ticket)
    }

    /// Issues the ticket for this mount's catalog load, or `None` when the
    /// load was already issued.
    pub fn begin_catalog_load(&mut self) -> Option<RequestTicket> {
        if !self.catalog.is_loading() || self.catalog.has_load_in_flight() {
            return None;
        }
        let ticket = self.issue_ticket();
        self.catalog.begin_load(ticket).then_some(ticket)
    }

    /// Applies a catalog response. Returns `false` for stale responses.
    pub fn on_catalog_loaded(
        &mut self,
        ticket: RequestTicket,
        result: Result<CatalogResponse, ServiceError>,
    ) -> bool {
        if !self.catalog.complete_load(ticket, result) {
            return false;
        }
        self.refresh_item_options();
        self.revalidate();
        true
    }

    /// Drops every piece of state tied to the current mount. Responses for
    /// requests issued before the remount are ignored when they arrive.
    pub fn remount(&mut self) {
        info!("remounting form");
        let policy = self.submission.policy();
        self.catalog = CatalogStore::new();
        self.submission = SubmissionController::new(policy);
        self.item_options.clear();
        self.reset();
    }

    pub fn is_loading(&self) -> bool {
        self.catalog.is_loading()
    }

    pub fn catalog_state(&self) -> &CatalogState {
        self.catalog.state()
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.catalog()
    }

    pub fn catalog_load_error(&self) -> Option<&ServiceError> {
        self.catalog.load_error()
    }

    /// Options currently offered for `field`. Empty for free-text fields.
    pub fn options(&self, field: FormField) -> Vec<String> {
        let Some(catalog) = self.catalog.catalog() else {
            return Vec::new();
        };
        match field {
            FormField::Item => self.item_options.clone(),
            FormField::Group => catalog.group_values.clone(),
            FormField::FuelType => catalog.fuel_type_values.clone(),
            FormField::Year => catalog.year_options(),
            FormField::KmsDriven => Vec::new(),
        }
    }

    pub fn item_options(&self) -> &[String] {
        &self.item_options
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    /// Errors of fields the user has interacted with.
    pub fn visible_errors(&self) -> ValidationState {
        self.validation
            .retain_fields(|field| self.touched.contains(&field))
    }

    pub fn submission(&self) -> &SubmissionState {
        self.submission.state()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_pending()
    }

    pub fn on_field_change(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), InteractionError> {
        if self.is_loading() {
            return Err(InteractionError::Loading);
        }
        let value = value.into();
        if field.is_select() && !value.is_empty() && !self.options(field).contains(&value) {
            return Err(InteractionError::NotAnOption { field, value });
        }

        self.values.set(field, value);
        self.touched.insert(field);
        if field == FormField::Group {
            self.refresh_item_options();
        }
        self.revalidate();
        Ok(())
    }

    /// Validates and, when clean, hands back the request to send.
    pub fn on_submit(&mut self) -> Result<SubmitOutcome, InteractionError> {
        if self.is_loading() {
            return Err(InteractionError::Loading);
        }
        if self.submission.is_pending() {
            debug!("submit ignored while a prediction is pending");
            return Err(InteractionError::SubmissionPending);
        }

        self.submission.dismiss();
        self.touched.extend(FormField::ALL);
        self.revalidate();
        let request = match PredictRequest::from_values(&self.values) {
            Ok(request) if self.validation.is_valid() => request,
            _ => return Ok(SubmitOutcome::Blocked(self.validation.clone())),
        };

        let ticket = self.issue_ticket();
        self.submission.begin(ticket, self.values.clone());
        info!(ticket = ticket.id(), "submitting prediction request");
        Ok(SubmitOutcome::Dispatch(PendingSubmission { ticket, request }))
    }

    /// Settles the submission. Values are reset only after the response has
    /// been interpreted. Returns `false` for stale responses.
    pub fn on_prediction_resolved(
        &mut self,
        ticket: RequestTicket,
        result: Result<PredictResponse, ServiceError>,
    ) -> bool {
        match self.submission.resolve(ticket, result) {
            Resolution::Stale => false,
            Resolution::Settled { reset_values } => {
                if reset_values {
                    self.reset();
                }
                true
            }
        }
    }

    /// Clears the entries without touching the submission outcome.
    pub fn reset(&mut self) {
        self.values = FormValues::default();
        self.touched.clear();
        self.refresh_item_options();
        self.revalidate();
    }

    pub fn dismiss_outcome(&mut self) {
        self.submission.dismiss();
    }

    fn refresh_item_options(&mut self) {
        self.item_options = match self.catalog.catalog() {
            Some(catalog) => filter_items(&catalog.item_values, &self.values.group),
            None => Vec::new(),
        };
        if !self.values.item.is_empty() && !self.item_options.contains(&self.values.item) {
            debug!(item = %self.values.item, "clearing item outside the selected company");
            self.values.item.clear();
        }
    }

    fn revalidate(&mut self) {
        self.validation = validate(&self.values);
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
