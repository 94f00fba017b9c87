pub mod datetime;
pub mod request;
pub mod state;

pub use datetime::{days_in_month, twelve_hour, twenty_four_hour, DateTimeSelection, Meridiem};
pub use request::{
    Avoid, DeparturePolicy, TransitOptions, TransitRoutingPreference, TransitVehicle, TravelMode,
    TripRequest,
};
pub use state::{DateField, EnabledFields, FormState};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0}")]
    Validation(String),

    #[error("Selection {index} is out of range for {field}")]
    InvalidSelection { field: &'static str, index: usize },

    #[error("The {0} field is disabled")]
    FieldDisabled(&'static str),

    #[error("Invalid date or time: {0}")]
    InvalidDateTime(String),
}
