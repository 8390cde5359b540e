//! Processing pipeline engine.
//!
//! ```text
//! assets ──► Select (only / except) ──► Chain::on ──► Batch ──► export
//!                                         │
//!                         stage → stage → stage   (per asset, on a rayon pool)
//! ```
//!
//! - [`Processor`]: one named transformation, `&Asset -> Result<Option<Asset>>`
//! - [`Chain`]: ordered processors, short-circuits when a stage yields nothing
//! - [`Batch`]: a chain bound to many assets, run with bounded parallelism
//! - [`Select`]: glob/regex filtering over relative names

mod chain;
mod executor;
mod processor;
mod select;

pub use chain::Chain;
pub use executor::{Batch, BatchReport, DEFAULT_PARALLELISM};
pub use processor::{
    FnProcessor, Processor, ProcessorExt, StageOutcome, panic_message, processor, run_stage,
};
pub use select::{Pattern, Patterns, Select, SelectError, glob_to_regex};
