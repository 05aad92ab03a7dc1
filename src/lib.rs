pub mod catalog;
pub mod config;
pub mod content;
pub mod domain;
pub mod filters;
pub mod gateway;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod submission;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod validation;
pub mod wizard;
