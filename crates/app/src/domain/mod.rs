//! Trolley Domain Concerns

pub mod carts;
