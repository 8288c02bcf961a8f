//! Proximity Server - on-demand separation checks between two drones

pub mod api;
pub mod config;
pub mod state;
