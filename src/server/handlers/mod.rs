//! HTTP handlers for the relay.

pub mod printer;
