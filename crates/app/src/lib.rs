//! Shopping cart domain, persistence and outbound service clients.

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod context;
pub mod database;
pub mod domain;
pub mod uuids;

#[cfg(test)]
mod test;
