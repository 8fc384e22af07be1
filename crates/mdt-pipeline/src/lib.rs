//! `mdt-pipeline` — runs the whole road-emissions computation for one network.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`builder`]  | `PipelineBuilder` (fluent input collection + validation)    |
//! | [`pipeline`] | `Pipeline::run`, `PipelineOutput`, `TopologyInput`          |
//! | [`config`]   | `PipelineConfig`                                            |
//! | [`observer`] | `PipelineObserver`, `Stage`, `NoopObserver`                 |
//! | [`error`]    | `PipelineError`, `PipelineResult<T>`                        |
//!
//! # Stages
//!
//! ```text
//! build ─► simplify ─► match ─► emissions ─► aggregate
//! ```
//!
//! The stages run in sequence on one thread.  The only blocking step is
//! draining a [`mdt_ingest::TopologySource`], which sleeps between retries
//! of transient faults.

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use builder::PipelineBuilder;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use observer::{NoopObserver, PipelineObserver, Stage};
pub use pipeline::{Pipeline, PipelineOutput, TopologyInput};
