#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! XILLEN social engineering simulator – fabricates target profiles, runs mock
//! phishing and pretexting campaigns against them, and reports the outcome.
//!
//! Nothing here touches a network or a real person; every record is drawn
//! from a [`DrawSource`].

/// Telemetry and random draw sources.
#[path = "../helper.rs"]
pub mod helper;

/// Console sink for the progress/report stream.
#[path = "../console.rs"]
pub mod console;

/// Synthetic target profiles.
#[path = "../target_generator.rs"]
pub mod target_generator;

/// Technique reference catalog.
#[path = "../techniques.rs"]
pub mod techniques;

/// Phishing and pretexting simulators.
#[path = "../simulator.rs"]
pub mod simulator;

/// Run session state.
#[path = "../session.rs"]
pub mod session;

/// Report rendering and persistence.
#[path = "../report.rs"]
pub mod report;

/// Error types.
#[path = "../error.rs"]
pub mod error;

/// Run orchestration.
#[path = "../main.rs"]
pub mod runtime;

pub use console::Console;
pub use error::ReportWriteFailure;
pub use helper::{
    DrawSource, RandomDraws, ScriptedDraws, SimulationTelemetry, SimulationTelemetryBuilder,
};
pub use report::{ReportGenerator, ReportSnapshot, ReportSummary, REPORT_FILE};
pub use runtime::{RunOutcome, SocialEngineeringRun, SocialEngineeringRunBuilder};
pub use session::Session;
