pub mod config;
pub mod error;
pub mod record;
pub mod store;
pub mod filter;
pub mod label;
pub mod graph;
pub mod resolve;
pub mod assemble;
pub mod walk;

pub use assemble::{Assembler, IngestOutcome};
pub use config::Config;
pub use error::{GraphError, Result};
pub use graph::{Graph, GraphAccumulator};
pub use walk::{index_paths, WalkMode, WalkStats};
