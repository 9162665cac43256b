//! Backend bridge: command queue types and the worker that runs store calls.

pub mod commands;
pub mod runtime;
