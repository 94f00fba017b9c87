use super::error::RoutingError;
use super::types::RouteResponse;
use crate::sdk::form::request::TripRequest;
use std::future::Future;

pub trait DirectionsProvider: Send + Sync + 'static {
    /// Requests every alternative route for `request`.
    fn directions(
        &self,
        request: &TripRequest,
    ) -> impl Future<Output = Result<RouteResponse, RoutingError>> + Send;
}
