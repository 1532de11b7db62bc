pub mod health;
pub mod parks;
pub mod sync;
