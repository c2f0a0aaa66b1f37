//! Ordered, short-circuitable pre-flight check pipeline.
//!
//! Composes the validators from `preflight-checks` into the default stage
//! sequence — command syntax, CLI availability, environment, file
//! validation, network connectivity — plus any caller-supplied checks, and
//! aggregates one [`PreFlightReport`](report::PreFlightReport).
//!
//! Semantics:
//!
//! - Stages run strictly in order; once one has failed and short-circuit is
//!   on (the default), the rest are recorded `skipped` without executing.
//! - A stage never raises: internal faults degrade to a failed
//!   [`CheckResult`](check::CheckResult) carrying the fault text.
//! - `passed` is "no stage failed" — skipped and warning stages do not fail
//!   a run.
//!
//! # Example
//!
//! ```no_run
//! use preflight_core::SchemaRegistry;
//! use preflight_pipeline::runner::{PreFlightOptions, run_preflight};
//!
//! let registry = SchemaRegistry::builtin();
//! let options = PreFlightOptions::for_command("build")
//!     .with_parameter("--profile", "release")
//!     .dry_run();
//!
//! let report = run_preflight(options, &registry).unwrap();
//! print!("{}", report.render());
//! ```

pub mod check;
pub mod config;
pub mod report;
pub mod runner;
pub mod stages;

pub use check::{CheckContext, CheckResult, CheckStatus, PreFlightCheck};
pub use config::PreflightConfig;
pub use report::PreFlightReport;
pub use runner::{PipelineError, PreFlightOptions, SchemaRef, run_preflight};
