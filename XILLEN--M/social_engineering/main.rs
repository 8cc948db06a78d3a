use std::path::PathBuf;

use serde_json::{json, Value};
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    console::Console,
    helper::{DrawSource, RandomDraws, SimulationTelemetry},
    report::{ReportGenerator, ReportOutcome, AUTHOR, REPORT_FILE, RULE, TEAM},
    session::Session,
    simulator::{AttackSimulator, PhishingSimulator, PretextingSimulator},
    target_generator::TargetGenerator,
    techniques::TechniqueCatalog,
};

/// One end-to-end run: targets, catalog, both simulators, then the report.
pub struct SocialEngineeringRun {
    run_id: Uuid,
    seed: Option<u64>,
    draws: Box<dyn DrawSource>,
    report: ReportGenerator,
    telemetry: Option<SimulationTelemetry>,
    console: Console,
}

/// Everything a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    /// Id used to correlate telemetry.
    pub run_id: Uuid,
    /// Final session state.
    pub session: Session,
    /// Snapshot and write result.
    pub report: ReportOutcome,
    /// Console stream as written.
    pub console: Console,
}

impl RunOutcome {
    /// Whether the snapshot reached disk.
    #[must_use]
    pub const fn persisted(&self) -> bool {
        self.report.persisted.is_ok()
    }
}

impl SocialEngineeringRun {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> SocialEngineeringRunBuilder {
        SocialEngineeringRunBuilder::default()
    }

    /// Executes every stage once, in order. A failed report write is carried
    /// in the outcome; nothing here fails the run.
    pub fn run(mut self) -> RunOutcome {
        self.banner();
        self.note(
            LogLevel::Debug,
            "run.start",
            json!({
                "seed": self.seed,
                "output": self.report.output_path().display().to_string(),
            }),
        );

        let mut session = Session::new();
        let targets = TargetGenerator.generate(&mut *self.draws, &mut self.console);
        self.stage_completed("targets", json!({ "produced": targets.len() }));
        session.record_targets(targets);
        self.console.blank();

        let catalog = TechniqueCatalog::analyze(&mut self.console);
        self.stage_completed("catalog", json!({ "techniques": catalog.len() }));
        session.record_techniques(catalog.to_vec());
        self.console.blank();

        let simulators: [&dyn AttackSimulator; 2] = [&PhishingSimulator, &PretextingSimulator];
        for simulator in simulators {
            let kind = simulator.kind();
            let results =
                simulator.simulate(session.targets(), &mut *self.draws, &mut self.console);
            let reference = catalog.get(kind.name());
            self.stage_completed(
                &kind.name().to_lowercase(),
                json!({
                    "produced": results.len(),
                    "effectiveness": reference.map(|t| t.effectiveness),
                    "difficulty": reference.map(|t| t.difficulty),
                }),
            );
            session.record_results(results);
            self.console.blank();
        }

        let report = self.report.generate(&session, &mut self.console);
        match &report.persisted {
            Ok(path) => self.stage_completed(
                "report",
                json!({ "path": path.display().to_string(), "summary": report.snapshot.summary }),
            ),
            Err(err) => {
                self.note(
                    LogLevel::Warn,
                    "report.write_failed",
                    json!({ "error": err.to_string() }),
                );
                self.event("simulation.report.write_failed", json!({ "error": err.to_string() }));
            }
        }

        RunOutcome {
            run_id: self.run_id,
            session,
            report,
            console: self.console,
        }
    }

    fn banner(&mut self) {
        self.console.line(RULE);
        self.console.line("    XILLEN Social Engineering");
        self.console.line("    Социальная инженерия");
        self.console.line(RULE);
        self.console.line(format!("Author: {AUTHOR}"));
        self.console.line(format!("Team: {TEAM}"));
        self.console.blank();
    }

    fn stage_completed(&self, stage: &str, payload: Value) {
        self.note(LogLevel::Info, &format!("{stage}.completed"), payload.clone());
        self.event(&format!("simulation.{stage}.completed"), payload);
    }

    fn note(&self, level: LogLevel, message: &str, mut metadata: Value) {
        if let Some(tel) = &self.telemetry {
            if let Value::Object(fields) = &mut metadata {
                fields.insert("run_id".into(), json!(self.run_id));
            }
            let _ = tel.log(level, message, metadata);
        }
    }

    fn event(&self, event_type: &str, mut payload: Value) {
        if let Some(tel) = &self.telemetry {
            if let Value::Object(fields) = &mut payload {
                fields.insert("run_id".into(), json!(self.run_id));
            }
            let _ = tel.event(event_type, payload);
        }
    }
}

/// Builder for `SocialEngineeringRun`.
pub struct SocialEngineeringRunBuilder {
    seed: Option<u64>,
    draws: Option<Box<dyn DrawSource>>,
    output_path: PathBuf,
    telemetry: Option<SimulationTelemetry>,
    console: Console,
}

impl SocialEngineeringRunBuilder {
    /// Seeds the pseudo-random draws.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the random source entirely; takes precedence over `seed`.
    #[must_use]
    pub fn draws(mut self, draws: impl DrawSource + 'static) -> Self {
        self.draws = Some(Box::new(draws));
        self
    }

    /// Where the snapshot is written.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets telemetry.
    #[must_use]
    pub fn telemetry(mut self, telemetry: SimulationTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Sets the console sink.
    #[must_use]
    pub fn console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Builds the run.
    #[must_use]
    pub fn build(self) -> SocialEngineeringRun {
        let (seed, draws) = match self.draws {
            Some(draws) => (None, draws),
            None => {
                let random = self
                    .seed
                    .map_or_else(RandomDraws::from_entropy, RandomDraws::seeded);
                (Some(random.seed()), Box::new(random) as Box<dyn DrawSource>)
            }
        };
        SocialEngineeringRun {
            run_id: Uuid::new_v4(),
            seed,
            draws,
            report: ReportGenerator::new(self.output_path),
            telemetry: self.telemetry,
            console: self.console,
        }
    }
}

impl Default for SocialEngineeringRunBuilder {
    fn default() -> Self {
        Self {
            seed: None,
            draws: None,
            output_path: PathBuf::from(REPORT_FILE),
            telemetry: None,
            console: Console::stdout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ReportWriteFailure,
        helper::ScriptedDraws,
        report::ReportSnapshot,
        simulator::{RiskLevel, TechniqueKind},
        target_generator::Department,
    };
    use shared_event_bus::MemoryEventBus;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Scores [8,3,9,2,6], departments [IT,Finance,HR,Marketing,IT].
    fn scenario_draws() -> ScriptedDraws {
        ScriptedDraws::new()
            .with_picks([0, 2, 1, 1, 2, 0, 3, 3, 4, 2])
            .with_picks([0, 1, 2])
            .with_picks([3, 2, 1])
            .with_ints([8, 3, 9, 2, 6])
            .with_ints([81, 60, 95])
            .with_ints([70, 71, 40])
            .with_coins([true, false, true, false, true])
    }

    fn ids_for(outcome: &RunOutcome, kind: TechniqueKind) -> Vec<u32> {
        outcome
            .session
            .results()
            .iter()
            .filter(|r| r.technique() == kind)
            .map(|r| r.target)
            .collect()
    }

    #[test]
    fn forced_scenario_hits_expected_targets() {
        let dir = tempdir().unwrap();
        let outcome = SocialEngineeringRun::builder()
            .draws(scenario_draws())
            .output_path(dir.path().join(REPORT_FILE))
            .console(Console::captured())
            .build()
            .run();

        let departments: Vec<Department> = outcome
            .session
            .targets()
            .iter()
            .map(|t| t.department)
            .collect();
        assert_eq!(
            departments,
            vec![
                Department::It,
                Department::Finance,
                Department::Hr,
                Department::Marketing,
                Department::It
            ]
        );
        assert_eq!(ids_for(&outcome, TechniqueKind::Phishing), vec![1, 3, 5]);
        assert_eq!(ids_for(&outcome, TechniqueKind::Pretexting), vec![1, 3, 5]);

        let risks: Vec<RiskLevel> = outcome
            .session
            .results()
            .iter()
            .map(|r| r.risk_level)
            .collect();
        assert_eq!(
            risks,
            vec![
                RiskLevel::High,
                RiskLevel::Medium,
                RiskLevel::High,
                RiskLevel::Medium,
                RiskLevel::High,
                RiskLevel::Medium
            ]
        );
        assert!(outcome.persisted());
        assert_eq!(outcome.report.snapshot.summary.high_risk_targets, 2);
        assert_eq!(outcome.report.snapshot.summary.total_attacks, 6);
    }

    #[test]
    fn persisted_file_round_trips_console_totals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE);
        let outcome = SocialEngineeringRun::builder()
            .seed(2024)
            .output_path(&path)
            .console(Console::captured())
            .build()
            .run();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: ReportSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, outcome.report.snapshot);

        let lines = outcome.console.lines();
        assert!(lines.contains(&format!("Targets analyzed: {}", parsed.targets.len())));
        assert!(lines.contains(&format!("Techniques available: {}", parsed.techniques.len())));
        assert!(lines.contains(&format!("Attack simulations: {}", parsed.results.len())));
        assert_eq!(parsed.summary.total_targets, parsed.targets.len());
        assert_eq!(parsed.summary.total_attacks, outcome.session.results().len());

        let value: Value = serde_json::from_str(&raw).unwrap();
        for result in value["results"].as_array().unwrap() {
            let has_template = result.get("template").is_some();
            let has_pretext = result.get("pretext").is_some();
            assert!(has_template ^ has_pretext);
            match result["technique"].as_str().unwrap() {
                "Phishing" => assert!(has_template),
                "Pretexting" => assert!(has_pretext),
                other => panic!("unexpected technique {other}"),
            }
        }
        for target in value["targets"].as_array().unwrap() {
            for key in [
                "id",
                "type",
                "department",
                "vulnerability_score",
                "social_media_presence",
                "email_pattern",
            ] {
                assert!(target.get(key).is_some(), "missing {key}");
            }
        }
        assert_eq!(
            lines.last().unwrap(),
            &format!("[+] Report saved to: {}", path.display())
        );
    }

    #[test]
    fn unwritable_output_still_completes() {
        let dir = tempdir().unwrap();
        let bus = Arc::new(MemoryEventBus::new(16));
        let telemetry = SimulationTelemetry::builder("social-engineering")
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        let outcome = SocialEngineeringRun::builder()
            .draws(scenario_draws())
            .output_path(dir.path().join("no-such-dir").join(REPORT_FILE))
            .telemetry(telemetry)
            .console(Console::captured())
            .build()
            .run();

        assert!(!outcome.persisted());
        assert!(matches!(
            outcome.report.persisted,
            Err(ReportWriteFailure::Io { .. })
        ));
        assert_eq!(outcome.console.count_containing("Error saving report"), 1);
        assert!(outcome
            .console
            .lines()
            .last()
            .unwrap()
            .starts_with("[-] Error saving report: "));
        assert_eq!(outcome.console.count_containing("Target Profiles:"), 1);
        assert_eq!(outcome.console.count_containing("Attack Results:"), 1);
        assert_eq!(bus.of_type("simulation.report.write_failed").len(), 1);
        assert!(bus.of_type("simulation.report.completed").is_empty());
    }

    #[test]
    fn console_follows_stage_order() {
        let dir = tempdir().unwrap();
        let outcome = SocialEngineeringRun::builder()
            .seed(9)
            .output_path(dir.path().join(REPORT_FILE))
            .console(Console::captured())
            .build()
            .run();
        let lines = outcome.console.lines();
        let position = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert_eq!(lines[0], RULE);
        assert_eq!(lines[1], "    XILLEN Social Engineering");
        assert_eq!(lines[2], "    Социальная инженерия");
        assert_eq!(lines[3], RULE);
        assert_eq!(lines[4], format!("Author: {AUTHOR}"));
        assert!(position("Generating target profiles") < position("Analyzing social engineering"));
        assert!(position("Analyzing social engineering") < position("Simulating phishing"));
        assert!(position("Simulating phishing") < position("Simulating pretexting"));
        assert!(position("Simulating pretexting") < position("Social Engineering Attack Report"));
    }

    #[test]
    fn stage_events_carry_catalog_reference() {
        let dir = tempdir().unwrap();
        let bus = Arc::new(MemoryEventBus::new(16));
        let telemetry = SimulationTelemetry::builder("social-engineering")
            .log_path(dir.path().join("run.log"), LogLevel::Debug)
            .event_publisher(bus.clone())
            .build()
            .unwrap();
        let outcome = SocialEngineeringRun::builder()
            .draws(scenario_draws())
            .output_path(dir.path().join(REPORT_FILE))
            .telemetry(telemetry)
            .console(Console::captured())
            .build()
            .run();

        let phishing = bus.of_type("simulation.phishing.completed");
        assert_eq!(phishing.len(), 1);
        assert_eq!(phishing[0].payload["produced"], 3);
        assert_eq!(phishing[0].payload["effectiveness"], 8);
        assert_eq!(phishing[0].payload["difficulty"], 3);
        assert_eq!(phishing[0].payload["run_id"], json!(outcome.run_id));
        assert_eq!(bus.of_type("simulation.report.completed").len(), 1);
        let log = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(log.contains("targets.completed"));
        assert!(log.contains("run.start"));
    }
}
