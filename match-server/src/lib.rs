//! Match server: hosts many concurrent matches of the board game and exposes them over HTTP and
//! per match web sockets.
//!
//! - [`registry::SessionRegistry`] owns every live match
//! - [`session::MatchSession`] binds one engine to its players and connections
//! - [`connection`] relays one web socket to its session
//! - [`routes`] is the thin HTTP layer on top

pub mod config;
pub mod connection;
pub mod error;
pub mod registry;
pub mod routes;
pub mod session;
