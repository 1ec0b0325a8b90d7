//! Adapters to the outside world: the model backend client and the HTTP
//! server.

pub mod model;
pub mod server;
