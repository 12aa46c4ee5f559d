//! Bounded worker slots for concurrent fetches.

pub mod manager;
