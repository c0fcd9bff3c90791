//! Foundation types for the raycon console.
//!
//! This crate contains the types shared by the console engine and its
//! hosts: error enums, configuration, and console input events.

pub mod config;
pub mod error;
pub mod input;
