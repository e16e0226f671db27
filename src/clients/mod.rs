pub mod config;
pub mod models;
pub mod zpa;

pub use zpa::{is_not_found, Client, Config};
