#[cfg(test)]
pub mod memory;
pub mod models;
pub mod queries;
pub mod store;
