use anyhow::Result;
use clap::Parser;
use shared_logging::{JsonLogger, LogLevel};
use xillen_social_engineering::{SimulationTelemetry, SocialEngineeringRun};

/// Runs one synthetic social engineering simulation and writes
/// `social_engineering_report.json` to the working directory.
#[derive(Parser, Debug)]
#[command(name = "social_engineering", version)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    // Structured logs stay on stderr; stdout carries the report.
    let telemetry = SimulationTelemetry::builder("social-engineering")
        .logger(JsonLogger::stderr(LogLevel::Warn))
        .build()?;

    // A failed report write is printed by the run and does not change the exit status.
    let _outcome = SocialEngineeringRun::builder()
        .telemetry(telemetry)
        .build()
        .run();
    Ok(())
}
