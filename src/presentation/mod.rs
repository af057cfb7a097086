//! Presentation layer: view models handed to the host's rendering stack.

pub mod account;
