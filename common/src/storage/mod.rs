#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod notion;
pub mod store;
pub mod types;
