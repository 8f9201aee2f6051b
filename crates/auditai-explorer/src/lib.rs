pub mod address;
pub mod client;
pub mod envelope;
pub mod resolver;

pub use address::is_contract_address;
pub use client::*;
pub use envelope::{unwrap_source, UNSUPPORTED_FORMAT_PLACEHOLDER};
pub use resolver::Resolver;
