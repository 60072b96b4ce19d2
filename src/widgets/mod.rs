//! The three page widgets
//!
//! Each widget owns its state privately and shares nothing with the others.
//! Operations that talk to the backend come in two halves: a synchronous
//! `prepare_*` that decides whether a request is needed and what it carries,
//! and an `apply_*` that folds the answer back in. The async convenience
//! methods simply chain both around a [`PlacesBackend`](crate::backend::PlacesBackend)
//! call; the web layer calls the halves itself so no lock spans the request.

pub mod distance_probe;
pub mod location_form;
pub mod nearby_search;

pub use distance_probe::{DistanceProbe, DistanceProbeView, DistanceQuery, Measurement, ProbeState};
pub use location_form::{Field, LocationForm, LocationFormView, ServerMessage, ValidationErrors};
pub use nearby_search::{NearbySearch, NearbySearchView, NearestQuery, PlacesQuery};

/// Identifies which generation of widget state a request was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic counter behind [`Ticket`]s. Advancing it orphans every
/// outstanding ticket, so late answers can be recognised and dropped.
#[derive(Debug, Default)]
pub(crate) struct Generation(u64);

impl Generation {
    pub(crate) fn ticket(&self) -> Ticket {
        Ticket(self.0)
    }

    pub(crate) fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.0 == ticket.0
    }
}
