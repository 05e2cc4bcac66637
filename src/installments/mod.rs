// src/installments/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::installments_routes;
