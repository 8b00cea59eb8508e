pub mod analyzer;

pub use analyzer::{ErrorCodeResponse, UpdateManyRequest};
