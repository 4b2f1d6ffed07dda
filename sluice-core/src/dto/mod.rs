//! Data Transfer Objects for the managed query service
//!
//! The service speaks JSON with PascalCase field names. DTOs mirror that wire
//! format exactly and convert into the domain types where the two differ.

pub mod query;
