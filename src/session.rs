//! Explicit inspection state, threaded through every operation.
//!
//! A session has one active-layer slot. Starting an inspection hands out a
//! ticket; a result is only applied if its ticket still names the active
//! inspection, so a slow resolution for a layer the user has since left is
//! dropped instead of overwriting the newer one.

use tracing::debug;

use crate::bounds::LatLngBounds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionTicket {
    layer_url: String,
    generation: u64,
}

impl InspectionTicket {
    pub fn layer_url(&self) -> &str {
        &self.layer_url
    }
}

#[derive(Debug, Clone)]
struct ActiveLayer {
    url: String,
    generation: u64,
    bounds: Option<LatLngBounds>,
}

#[derive(Debug, Default)]
pub struct InspectionSession {
    token: Option<String>,
    service_url: Option<String>,
    active: Option<ActiveLayer>,
    generation: u64,
}

impl InspectionSession {
    pub fn new(token: Option<String>) -> Self {
        InspectionSession {
            token: token.filter(|t| !t.trim().is_empty()),
            ..Default::default()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    pub fn set_service_url(&mut self, url: &str) {
        self.service_url = Some(url.to_string());
    }

    pub fn active_layer(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.url.as_str())
    }

    pub fn active_bounds(&self) -> Option<&LatLngBounds> {
        self.active.as_ref().and_then(|a| a.bounds.as_ref())
    }

    /// Makes `layer_url` the active layer, superseding any inspection in flight.
    pub fn begin(&mut self, layer_url: &str) -> InspectionTicket {
        self.generation += 1;
        self.active = Some(ActiveLayer {
                               url: layer_url.to_string(),
                               generation: self.generation,
                               bounds: None,
                           });
        InspectionTicket {
            layer_url: layer_url.to_string(),
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &InspectionTicket) -> bool {
        match self.active {
            Some(ref active) => {
                active.generation == ticket.generation && active.url == ticket.layer_url
            }
            None => false,
        }
    }

    /// Stores resolved bounds for the inspection `ticket` was issued for.
    /// Returns `false`, leaving the session untouched, when it is stale.
    pub fn apply_bounds(&mut self,
                        ticket: &InspectionTicket,
                        bounds: Option<LatLngBounds>)
                        -> bool {
        if !self.is_current(ticket) {
            debug!(layer = ticket.layer_url.as_str(),
                   generation = ticket.generation,
                   "discarding stale bounds");
            return false;
        }
        if let Some(ref mut active) = self.active {
            active.bounds = bounds;
        }
        true
    }

    /// Forgets everything; outstanding tickets become stale. For callers that
    /// reuse one session across several services.
    pub fn clear(&mut self) {
        self.token = None;
        self.service_url = None;
        self.active = None;
        self.generation += 1;
    }
}
