//! A small Redis-compatible server in Rust.
//!
//! This crate provides an in-memory key-value store reachable over the
//! Redis Serialization Protocol (RESP), supporting:
//!
//! - Basic key-value operations (GET, SET with PX/EX expiration)
//! - List operations (RPUSH, LPUSH, LRANGE)
//! - Server commands (PING, ECHO)
//! - Lazy expiration on read plus a background expiry sweeper
//!
//! The server handles concurrent connections through async/await with
//! Tokio; the store is shared behind a single mutex and is volatile.

pub mod commands;
pub mod connection;
pub mod key_value_store;
pub mod resp;
pub mod server;
