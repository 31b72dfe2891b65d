//! PokeAPI catalog browser - headless core
//!
//! Builds a region-partitioned catalog from the remote listing, enriches
//! entries on demand, filters them client-side and reveals the result in
//! pages. The reducer/effect split follows tui-dispatch; `session` runs the
//! effects without a terminal.

pub mod action;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod error;
pub mod filter;
pub mod moves;
pub mod profile;
pub mod reducer;
pub mod reveal;
pub mod session;
pub mod state;
