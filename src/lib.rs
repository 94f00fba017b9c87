pub mod sdk;

pub use sdk::config::{DirectionsConfig, Settings};
pub use sdk::form::{FormError, FormState, TravelMode, TripRequest};
pub use sdk::routing::{format_response, DirectionsProvider, RemoteDirectionsProvider, RouteResponse};
pub use sdk::search::{SearchController, SearchEvent, SessionUpdate, TripSession};
