pub mod cli;
pub mod config;
pub mod controller;
pub mod envy;
pub mod errors;
pub mod models;
pub mod router;
pub mod server;
pub mod service;
pub mod templates;
pub mod util;
