pub mod config;
pub mod payload;
pub mod pool;
pub mod queue;
pub mod runner;
pub mod stats;
pub mod transport;

pub use config::*;
pub use payload::*;
pub use pool::*;
pub use queue::*;
pub use runner::*;
pub use stats::*;
pub use transport::*;
