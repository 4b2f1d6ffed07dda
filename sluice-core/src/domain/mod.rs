//! Core domain types
//!
//! These types describe a query's lifecycle on the managed query service and the
//! shape of the results it produces. They are shared between the client (which
//! fetches and parses them) and the CLI (which renders them).

pub mod query;
pub mod results;
