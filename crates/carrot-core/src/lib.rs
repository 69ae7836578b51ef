//! Marketplace logic that does not touch the network or the database:
//! catalog filtering, favorites reconciliation, the location table, form
//! validation and display formatting.

pub mod catalog;
pub mod display;
pub mod favorites;
pub mod locations;
pub mod messages;
pub mod validation;
