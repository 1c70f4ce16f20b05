pub mod api;
pub mod config;
pub mod models;
pub mod registry;
pub mod services;
pub mod sources;
