pub mod config_manager;
pub mod error;
pub mod package;
pub mod report;
pub mod types;

pub use config_manager::*;
pub use error::*;
pub use package::*;
pub use report::*;
pub use types::*;
