//! Placeboard library
//!
//! Terminal client for a places-and-reviews API: the listing card row with
//! price filter and search, place details with reviews, and the account
//! forms. The binary in `main.rs` only wires these to a terminal.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod detail;
pub mod forms;
pub mod listing;
pub mod logging;
pub mod session;
pub mod tasks;
pub mod ui;

#[cfg(test)]
mod testing;
