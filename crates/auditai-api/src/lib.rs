pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use error::*;
pub use handlers::*;
pub use pipeline::AnalysisPipeline;
pub use routes::*;
pub use server::*;
pub use state::*;
pub use telemetry::{bootstrap_subscriber, init_tracing};
