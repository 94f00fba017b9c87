pub mod remote;

pub use remote::RemoteDirectionsProvider;
