// src/summary/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;


pub use routes::summary_routes;
