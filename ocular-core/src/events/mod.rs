//! Event system for ocular
//!
//! Host-raised events reach plugin handlers through a single
//! [`EventDispatcher`] per host. Handler failures never escape dispatch; they
//! come back as [`HandlerFault`] values in a [`DispatchReport`].

pub mod dispatcher;

pub use dispatcher::{DispatchReport, EventDispatcher, Handler, HandlerFault, invoke_isolated};
