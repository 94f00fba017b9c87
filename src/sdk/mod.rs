pub mod config;
pub mod form;
pub mod notify;
pub mod routing;
pub mod search;
pub mod util;
