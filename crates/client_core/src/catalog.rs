//! Catalog of legal field values, fetched once per mount.

use shared::{domain::Catalog, protocol::CatalogResponse};
use tracing::{debug, info, warn};

use crate::{RequestTicket, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Loading,
    /// Ready for interaction. A failed load still lands here, with an empty
    /// catalog and the error that caused it.
    Ready {
        catalog: Catalog,
        load_error: Option<ServiceError>,
    },
}

#[derive(Debug)]
pub struct CatalogStore {
    state: CatalogState,
    in_flight: Option<RequestTicket>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            state: CatalogState::Loading,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CatalogState::Loading)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.state {
            CatalogState::Loading => None,
            CatalogState::Ready { catalog, .. } => Some(catalog),
        }
    }

    pub fn load_error(&self) -> Option<&ServiceError> {
        match &self.state {
            CatalogState::Ready {
                load_error: Some(err),
                ..
            } => Some(err),
            _ => None,
        }
    }

    pub fn has_load_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Records the ticket of the load this mount is waiting on. Only the
    /// first load of a mount is accepted.
    pub fn begin_load(&mut self, ticket: RequestTicket) -> bool {
        if !self.is_loading() || self.in_flight.is_some() {
            debug!(ticket = ticket.id(), "catalog load already issued for this mount");
            return false;
        }
        self.in_flight = Some(ticket);
        true
    }

    /// Applies a load result. Returns `false` when the response is stale.
    pub fn complete_load(
        &mut self,
        ticket: RequestTicket,
        result: Result<CatalogResponse, ServiceError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(ticket = ticket.id(), "ignoring stale catalog response");
            return false;
        }
        self.in_flight = None;

        self.state = match result {
            Ok(response) => {
                let catalog = Catalog::from(response);
                info!(
                    companies = catalog.group_values.len(),
                    names = catalog.item_values.len(),
                    fuel_types = catalog.fuel_type_values.len(),
                    years = catalog.year_values.len(),
                    "catalog loaded"
                );
                CatalogState::Ready {
                    catalog,
                    load_error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "catalog load failed; continuing with empty options");
                CatalogState::Ready {
                    catalog: Catalog::default(),
                    load_error: Some(err),
                }
            }
        };
        true
    }
}
