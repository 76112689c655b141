pub mod api;
pub mod config;
pub mod engine;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod search;
pub mod state;
