use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{
    CatalogResponse, PredictRequest, PredictResponse, CATALOG_PATH, PREDICT_PATH,
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub mod catalog;
pub mod config;
pub mod controller;
pub mod filter;
pub mod submission;
pub mod validation;

pub use catalog::{CatalogState, CatalogStore};
pub use config::ClientSettings;
pub use controller::{
    events::{FormEffect, FormEvent},
    FormController, InteractionError, PendingSubmission, SubmitOutcome,
};
pub use filter::filter_items;
pub use submission::{FailureKind, ResetPolicy, SubmissionFailure, SubmissionState};
pub use validation::{validate, ValidationState};

/// Identifies one in-flight request so late responses can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("prediction service unreachable: {0}")]
    Transport(String),
    #[error("prediction service returned status {0}")]
    Status(u16),
    #[error("malformed response from prediction service: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return ServiceError::Malformed(value.to_string());
        }
        match value.status() {
            Some(status) => ServiceError::Status(status.as_u16()),
            None => ServiceError::Transport(value.to_string()),
        }
    }
}

/// The two calls the form makes against the prediction backend.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn fetch_catalog(&self) -> Result<CatalogResponse, ServiceError>;
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ServiceError>;
}

pub struct MissingPredictionService;

#[async_trait]
impl PredictionService for MissingPredictionService {
    async fn fetch_catalog(&self) -> Result<CatalogResponse, ServiceError> {
        Err(ServiceError::Transport(
            "prediction service is not configured".to_string(),
        ))
    }

    async fn predict(&self, _request: &PredictRequest) -> Result<PredictResponse, ServiceError> {
        Err(ServiceError::Transport(
            "prediction service is not configured".to_string(),
        ))
    }
}

pub struct HttpPredictionService {
    http: Client,
    base_url: Url,
}

impl HttpPredictionService {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let base_url = settings.base_url()?;
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn fetch_catalog(&self) -> Result<CatalogResponse, ServiceError> {
        let catalog = self
            .http
            .get(self.endpoint(CATALOG_PATH))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(catalog)
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ServiceError> {
        let res = self
            .http
            .post(self.endpoint(PREDICT_PATH))
            .json(request)
            .send()
            .await?;
        // The service reports model failures in the body, sometimes with a non-2xx status.
        let status = res.status();
        let body = res.bytes().await?;
        decode_body(&body).map_err(|err| {
            if status.is_success() {
                err
            } else {
                ServiceError::Status(status.as_u16())
            }
        })
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|err| ServiceError::Malformed(err.to_string()))
}

/// Result of driving one submit attempt to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReport {
    Settled(SubmissionState),
    Blocked(ValidationState),
}

/// Owns a [`FormController`] and performs the network calls it requests.
pub struct FormSession<S: PredictionService + ?Sized> {
    controller: FormController,
    service: Arc<S>,
}

impl<S: PredictionService + ?Sized> FormSession<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self::with_controller(service, FormController::new())
    }

    pub fn with_controller(service: Arc<S>, controller: FormController) -> Self {
        Self {
            controller,
            service,
        }
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    /// Loads the catalog for this mount. Failures leave an empty catalog; a
    /// mount that already loaded is left as is.
    pub async fn mount(&mut self) -> &CatalogState {
        if let Some(ticket) = self.controller.begin_catalog_load() {
            let result = self.service.fetch_catalog().await;
            self.controller.on_catalog_loaded(ticket, result);
        }
        self.controller.catalog_state()
    }

    /// Tears down the current mount and loads a fresh catalog.
    pub async fn remount(&mut self) -> &CatalogState {
        self.controller.remount();
        self.mount().await
    }

    pub fn on_field_change(
        &mut self,
        field: shared::domain::FormField,
        value: impl Into<String>,
    ) -> Result<(), InteractionError> {
        self.controller.on_field_change(field, value)
    }

    pub async fn submit(&mut self) -> Result<SubmitReport, InteractionError> {
        match self.controller.on_submit()? {
            SubmitOutcome::Blocked(validation) => {
                debug!(errors = validation.len(), "submit blocked by validation");
                Ok(SubmitReport::Blocked(validation))
            }
            SubmitOutcome::Dispatch(pending) => {
                let result = self.service.predict(&pending.request).await;
                self.controller.on_prediction_resolved(pending.ticket, result);
                let state = self.controller.submission().clone();
                info!(outcome = state.label(), "submission settled");
                Ok(SubmitReport::Settled(state))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
