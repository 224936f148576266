pub mod auth;
pub mod error;
pub mod gateway;
pub mod observation;
pub mod point;
pub mod stats;
pub mod window;

#[cfg(feature = "api")]
pub mod client;
