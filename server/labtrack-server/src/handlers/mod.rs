pub mod analyzers;
pub mod health;
