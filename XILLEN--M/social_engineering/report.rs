use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{
    console::Console, error::ReportWriteFailure, session::Session, simulator::AttackResult,
    target_generator::Target, techniques::Technique,
};

/// File the snapshot is written to, relative to the working directory.
pub const REPORT_FILE: &str = "social_engineering_report.json";
/// Author handle stamped on every report.
pub const AUTHOR: &str = "@Bengamin_Button";
/// Team handle stamped on every report.
pub const TEAM: &str = "@XillenAdapter";
/// Targets scoring above this count as high risk in the summary.
pub const HIGH_RISK_SCORE_THRESHOLD: u32 = 7;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const RULE: &str = "===============================================";

/// Totals derived from a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Targets generated.
    pub total_targets: usize,
    /// Techniques in the catalog.
    pub total_techniques: usize,
    /// Attack results produced.
    pub total_attacks: usize,
    /// Targets with a vulnerability score above 7, whatever was simulated.
    pub high_risk_targets: usize,
}

impl ReportSummary {
    /// Computes totals for a session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            total_targets: session.targets().len(),
            total_techniques: session.techniques().len(),
            total_attacks: session.results().len(),
            high_risk_targets: session
                .targets()
                .iter()
                .filter(|target| target.vulnerability_score > HIGH_RISK_SCORE_THRESHOLD)
                .count(),
        }
    }
}

/// Full-state JSON object persisted once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Author handle.
    pub author: String,
    /// Team handle.
    pub team: String,
    /// Host operating system name.
    pub platform: String,
    /// Targets in generation order.
    pub targets: Vec<Target>,
    /// Techniques in catalog order.
    pub techniques: Vec<Technique>,
    /// Results in simulation order.
    pub results: Vec<AttackResult>,
    /// Derived totals.
    pub summary: ReportSummary,
}

/// Builder for `ReportSnapshot`.
pub struct ReportSnapshotBuilder<'a> {
    session: &'a Session,
    generated_at: Option<DateTime<Local>>,
    platform: Option<String>,
}

impl<'a> ReportSnapshotBuilder<'a> {
    /// Creates a builder over a session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self {
            session,
            generated_at: None,
            platform: None,
        }
    }

    /// Overrides the timestamp (defaults to now).
    #[must_use]
    pub fn generated_at(mut self, at: DateTime<Local>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Overrides the platform name (defaults to the host OS).
    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Builds the snapshot.
    #[must_use]
    pub fn build(self) -> ReportSnapshot {
        let generated_at = self.generated_at.unwrap_or_else(Local::now);
        ReportSnapshot {
            timestamp: generated_at.format(TIMESTAMP_FORMAT).to_string(),
            author: AUTHOR.to_string(),
            team: TEAM.to_string(),
            platform: self.platform.unwrap_or_else(platform_name),
            targets: self.session.targets().to_vec(),
            techniques: self.session.techniques().to_vec(),
            results: self.session.results().to_vec(),
            summary: ReportSummary::from_session(self.session),
        }
    }
}

/// Host OS name in its conventional spelling (`Linux`, `Darwin`, `Windows`).
#[must_use]
pub fn platform_name() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

/// What the report stage produced.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Snapshot handed to persistence.
    pub snapshot: ReportSnapshot,
    /// Written path, or why the write failed.
    pub persisted: Result<PathBuf, ReportWriteFailure>,
}

/// Renders the console report and persists the snapshot.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_path: PathBuf,
}

impl ReportGenerator {
    /// Generator writing to `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Destination of the snapshot.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Writes totals, target profiles, and attack results to the console.
    pub fn render(&self, session: &Session, console: &mut Console) {
        console.blank();
        console.line(RULE);
        console.line("    Social Engineering Attack Report");
        console.line(RULE);
        console.line(format!("Targets analyzed: {}", session.targets().len()));
        console.line(format!("Techniques available: {}", session.techniques().len()));
        console.line(format!("Attack simulations: {}", session.results().len()));

        if !session.targets().is_empty() {
            console.blank();
            console.line("Target Profiles:");
            for target in session.targets() {
                console.line(format!(
                    "{}. {} - {}",
                    target.id, target.role, target.department
                ));
                console.line(format!(
                    "   Vulnerability Score: {}/10",
                    target.vulnerability_score
                ));
                console.line(format!(
                    "   Social Media: {}",
                    if target.social_media_presence { "Yes" } else { "No" }
                ));
                console.line(format!("   Email: {}", target.email_pattern));
                console.blank();
            }
        }

        if !session.results().is_empty() {
            console.blank();
            console.line("Attack Results:");
            for result in session.results() {
                console.line(format!("Target {} - {}", result.target, result.technique()));
                console.line(format!("   Success Rate: {}%", result.success_rate));
                console.line(format!("   Risk Level: {}", result.risk_level));
                let (label, value) = result.vector.detail();
                console.line(format!("   {label}: {value}"));
                console.blank();
            }
        }
    }

    /// Snapshot of the session stamped with the current local time.
    #[must_use]
    pub fn snapshot(&self, session: &Session) -> ReportSnapshot {
        ReportSnapshotBuilder::new(session).build()
    }

    /// Writes the snapshot as 2-space pretty JSON, replacing any previous file.
    pub fn persist(&self, snapshot: &ReportSnapshot) -> Result<PathBuf, ReportWriteFailure> {
        let body = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.output_path, body).map_err(|source| ReportWriteFailure::Io {
            path: self.output_path.clone(),
            source,
        })?;
        Ok(self.output_path.clone())
    }

    /// Renders, snapshots, and persists. A failed write prints one diagnostic
    /// line and is handed back rather than raised.
    pub fn generate(&self, session: &Session, console: &mut Console) -> ReportOutcome {
        self.render(session, console);
        let snapshot = self.snapshot(session);
        let persisted = self.persist(&snapshot);
        match &persisted {
            Ok(path) => console.line(format!("[+] Report saved to: {}", path.display())),
            Err(err) => console.line(format!("[-] Error saving report: {err}")),
        }
        ReportOutcome {
            snapshot,
            persisted,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(REPORT_FILE)
    }
}
