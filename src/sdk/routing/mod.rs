pub mod error;
pub mod format;
pub mod provider;
pub mod service;
pub mod types;

pub use error::RoutingError;
pub use format::{format_response, format_route, spoken_summary, strip_instructions, TripResults};
pub use provider::RemoteDirectionsProvider;
pub use service::DirectionsProvider;
pub use types::{Leg, MalformedRoute, Route, RouteAlternative, RouteResponse, Step, SubStep};
