//! CLI command implementations.

mod config;
mod index;
mod init;
mod process;
mod search;
mod serve;
mod stats;

pub use config::run_config;
pub use index::run_index;
pub use init::run_init;
pub use process::run_process;
pub use search::run_search;
pub use serve::run_serve;
pub use stats::run_stats;
