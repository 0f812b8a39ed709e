pub mod auth;
pub mod checkout;
pub mod config;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod reconcile;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;
