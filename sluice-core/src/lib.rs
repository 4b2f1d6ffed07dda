//! Sluice Core
//!
//! Core types shared by the Sluice query client and CLI.
//!
//! This crate contains:
//! - Domain types: query executions, result sets and typed values
//! - DTOs: wire representations used by the managed query service's HTTP API

pub mod domain;
pub mod dto;
