use crate::{simulator::AttackResult, target_generator::Target, techniques::Technique};

/// In-memory state of one run. Collections are append-only and keep
/// generation order.
#[derive(Debug, Clone, Default)]
pub struct Session {
    targets: Vec<Target>,
    techniques: Vec<Technique>,
    results: Vec<AttackResult>,
}

impl Session {
    /// Empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends generated targets.
    pub fn record_targets(&mut self, targets: impl IntoIterator<Item = Target>) {
        self.targets.extend(targets);
    }

    /// Appends catalog techniques.
    pub fn record_techniques(&mut self, techniques: impl IntoIterator<Item = Technique>) {
        self.techniques.extend(techniques);
    }

    /// Appends simulation results. Each must reference a recorded target.
    pub fn record_results(&mut self, results: impl IntoIterator<Item = AttackResult>) {
        for result in results {
            debug_assert!(
                self.knows_target(result.target),
                "result references unknown target {}",
                result.target
            );
            self.results.push(result);
        }
    }

    /// Whether a target with `id` was generated in this run.
    #[must_use]
    pub fn knows_target(&self, id: u32) -> bool {
        self.targets.iter().any(|target| target.id == id)
    }

    /// Generated targets.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Catalog techniques.
    #[must_use]
    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    /// Simulation results.
    #[must_use]
    pub fn results(&self) -> &[AttackResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        console::Console,
        helper::RandomDraws,
        simulator::{AttackSimulator, PhishingSimulator},
        target_generator::TargetGenerator,
        techniques::TechniqueCatalog,
    };

    #[test]
    fn stages_append_in_order() {
        let mut session = Session::new();
        let mut draws = RandomDraws::seeded(5);
        let mut console = Console::captured();
        session.record_targets(TargetGenerator.generate(&mut draws, &mut console));
        session.record_techniques(TechniqueCatalog::reference().to_vec());
        let phishing = PhishingSimulator.simulate(session.targets(), &mut draws, &mut console);
        let produced = phishing.len();
        session.record_results(phishing);
        assert_eq!(session.targets().len(), 5);
        assert_eq!(session.techniques().len(), 8);
        assert_eq!(session.results().len(), produced);
        assert!(session.results().iter().all(|r| session.knows_target(r.target)));
    }

    #[test]
    fn unknown_ids_are_not_targets() {
        let session = Session::new();
        assert!(!session.knows_target(1));
    }
}
