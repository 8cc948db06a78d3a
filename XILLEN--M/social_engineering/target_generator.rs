use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    console::Console,
    helper::{choose, DrawSource},
};

/// Number of targets generated per run.
pub const TARGET_COUNT: u32 = 5;

/// Closed range of vulnerability scores.
pub const VULNERABILITY_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Role a synthetic target plays in the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRole {
    /// Regular staff.
    Employee,
    /// Line manager.
    Manager,
    /// IT staff.
    #[serde(rename = "IT Staff")]
    ItStaff,
    /// Front desk.
    Receptionist,
    /// Physical security.
    #[serde(rename = "Security Guard")]
    SecurityGuard,
}

impl TargetRole {
    /// Every role, in draw order.
    pub const ALL: [Self; 5] = [
        Self::Employee,
        Self::Manager,
        Self::ItStaff,
        Self::Receptionist,
        Self::SecurityGuard,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::ItStaff => "IT Staff",
            Self::Receptionist => "Receptionist",
            Self::SecurityGuard => "Security Guard",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Department a target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    /// Human resources.
    #[serde(rename = "HR")]
    Hr,
    /// Finance.
    Finance,
    /// Information technology.
    #[serde(rename = "IT")]
    It,
    /// Marketing.
    Marketing,
    /// Operations.
    Operations,
    /// Sales.
    Sales,
}

impl Department {
    /// Every department, in draw order.
    pub const ALL: [Self; 6] = [
        Self::Hr,
        Self::Finance,
        Self::It,
        Self::Marketing,
        Self::Operations,
        Self::Sales,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Finance => "Finance",
            Self::It => "IT",
            Self::Marketing => "Marketing",
            Self::Operations => "Operations",
            Self::Sales => "Sales",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Synthetic person/role subject to a mock attack. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// 1-based, sequential within a run.
    pub id: u32,
    /// Role in the organization.
    #[serde(rename = "type")]
    pub role: TargetRole,
    /// Department.
    pub department: Department,
    /// Score in `VULNERABILITY_RANGE`.
    pub vulnerability_score: u32,
    /// Whether the target is visible on social media.
    pub social_media_presence: bool,
    /// `user<id>@company.com`.
    pub email_pattern: String,
}

impl Target {
    /// Email address derived from a target id.
    #[must_use]
    pub fn email_for(id: u32) -> String {
        format!("user{id}@company.com")
    }
}

/// Generates the fixed-size target population.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetGenerator;

impl TargetGenerator {
    /// Draws `TARGET_COUNT` targets: role, department, score, then social flag.
    pub fn generate(self, draws: &mut dyn DrawSource, console: &mut Console) -> Vec<Target> {
        console.line("[+] Generating target profiles...");
        (1..=TARGET_COUNT)
            .map(|id| {
                let role = *choose(draws, &TargetRole::ALL);
                let department = *choose(draws, &Department::ALL);
                let vulnerability_score = draws.int(VULNERABILITY_RANGE);
                let social_media_presence = draws.coin();
                console.line(format!("    [+] Created target: {role} from {department}"));
                Target {
                    id,
                    role,
                    department,
                    vulnerability_score,
                    social_media_presence,
                    email_pattern: Target::email_for(id),
                }
            })
            .collect()
    }
}
