use std::{fmt, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::{
    console::Console,
    helper::{choose, DrawSource},
    target_generator::{Department, Target},
};

const PHISHING_TEMPLATES: [&str; 4] = [
    "Urgent: Your account has been compromised",
    "Important: System maintenance required",
    "Action required: Password expiration",
    "Security alert: Suspicious activity detected",
];

const PRETEXTS: [&str; 4] = [
    "IT Support calling about system issues",
    "HR department requesting verification",
    "Security team conducting audit",
    "Vendor representative with urgent delivery",
];

/// Phishing only targets scores above this.
pub const PHISHING_MIN_SCORE_EXCLUSIVE: u32 = 5;

/// Departments pretexting calls go to.
pub const PRETEXTING_DEPARTMENTS: [Department; 2] = [Department::It, Department::Hr];

/// Label derived from a success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Above the technique threshold.
    High,
    /// At or below the technique threshold.
    Medium,
}

impl RiskLevel {
    /// `High` iff `success_rate` is strictly above `threshold`.
    #[must_use]
    pub const fn from_rate(success_rate: u32, threshold: u32) -> Self {
        if success_rate > threshold {
            Self::High
        } else {
            Self::Medium
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Techniques with a simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueKind {
    /// Email lure.
    Phishing,
    /// Invented scenario over the phone or in person.
    Pretexting,
}

impl TechniqueKind {
    /// Catalog name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Phishing => "Phishing",
            Self::Pretexting => "Pretexting",
        }
    }

    /// Closed range success rates are drawn from.
    #[must_use]
    pub const fn success_range(self) -> RangeInclusive<u32> {
        match self {
            Self::Phishing => 60..=95,
            Self::Pretexting => 40..=85,
        }
    }

    /// Rates above this are `High`.
    #[must_use]
    pub const fn high_risk_threshold(self) -> u32 {
        match self {
            Self::Phishing => 80,
            Self::Pretexting => 70,
        }
    }

    /// Risk label for a rate drawn for this technique.
    #[must_use]
    pub const fn risk_for(self, success_rate: u32) -> RiskLevel {
        RiskLevel::from_rate(success_rate, self.high_risk_threshold())
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Technique-specific payload, tagged by technique name on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "technique")]
pub enum AttackVector {
    /// Phishing email subject line.
    Phishing {
        /// Template used.
        template: String,
    },
    /// Pretext story.
    Pretexting {
        /// Pretext used.
        pretext: String,
    },
}

impl AttackVector {
    /// Technique this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> TechniqueKind {
        match self {
            Self::Phishing { .. } => TechniqueKind::Phishing,
            Self::Pretexting { .. } => TechniqueKind::Pretexting,
        }
    }

    /// Console label and value of the payload.
    #[must_use]
    pub fn detail(&self) -> (&'static str, &str) {
        match self {
            Self::Phishing { template } => ("Template", template.as_str()),
            Self::Pretexting { pretext } => ("Pretext", pretext.as_str()),
        }
    }
}

/// Outcome of simulating one technique against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackResult {
    /// Id of a target from the same run.
    pub target: u32,
    /// Technique and its payload.
    #[serde(flatten)]
    pub vector: AttackVector,
    /// Drawn from the technique's success range.
    pub success_rate: u32,
    /// Derived from `success_rate`.
    pub risk_level: RiskLevel,
}

impl AttackResult {
    /// Technique that produced this result.
    #[must_use]
    pub const fn technique(&self) -> TechniqueKind {
        self.vector.kind()
    }
}

/// One simulated technique.
///
/// Implementations decide eligibility and draw the payload; the shared
/// `simulate` loop keeps target order, draws the rate after the payload, and
/// never touches the targets.
pub trait AttackSimulator {
    /// Technique simulated.
    fn kind(&self) -> TechniqueKind;

    /// Stage header line.
    fn header(&self) -> &'static str;

    /// Whether the target is attacked at all.
    fn is_eligible(&self, target: &Target) -> bool;

    /// Draws the technique-specific payload.
    fn draw_vector(&self, draws: &mut dyn DrawSource) -> AttackVector;

    /// Runs the technique against every eligible target, in order.
    fn simulate(
        &self,
        targets: &[Target],
        draws: &mut dyn DrawSource,
        console: &mut Console,
    ) -> Vec<AttackResult> {
        console.line(self.header());
        let kind = self.kind();
        let mut results = Vec::new();
        for target in targets.iter().filter(|target| self.is_eligible(target)) {
            let vector = self.draw_vector(draws);
            let success_rate = draws.int(kind.success_range());
            console.line(format!(
                "    [+] Target {}: {}% success rate",
                target.id, success_rate
            ));
            results.push(AttackResult {
                target: target.id,
                vector,
                success_rate,
                risk_level: kind.risk_for(success_rate),
            });
        }
        results
    }
}

/// Phishes every target with a vulnerability score above 5.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhishingSimulator;

impl AttackSimulator for PhishingSimulator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::Phishing
    }

    fn header(&self) -> &'static str {
        "[+] Simulating phishing attack..."
    }

    fn is_eligible(&self, target: &Target) -> bool {
        target.vulnerability_score > PHISHING_MIN_SCORE_EXCLUSIVE
    }

    fn draw_vector(&self, draws: &mut dyn DrawSource) -> AttackVector {
        AttackVector::Phishing {
            template: (*choose(draws, &PHISHING_TEMPLATES)).to_string(),
        }
    }
}

/// Pretexts every target in IT or HR.
#[derive(Debug, Clone, Copy, Default)]
pub struct PretextingSimulator;

impl AttackSimulator for PretextingSimulator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::Pretexting
    }

    fn header(&self) -> &'static str {
        "[+] Simulating pretexting attack..."
    }

    fn is_eligible(&self, target: &Target) -> bool {
        PRETEXTING_DEPARTMENTS.contains(&target.department)
    }

    fn draw_vector(&self, draws: &mut dyn DrawSource) -> AttackVector {
        AttackVector::Pretexting {
            pretext: (*choose(draws, &PRETEXTS)).to_string(),
        }
    }
}
