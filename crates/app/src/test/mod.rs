//! Shared test infrastructure.

mod fakes;

pub(crate) use context::TestContext;
pub(crate) use fakes::{InMemoryCartCache, InMemoryCartStore};
