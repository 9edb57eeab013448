//! Validator - reports every structural problem in a built graph.
//!
//! Checks never stop at the first problem and never fail: each one appends
//! typed findings to a shared list, which is then sorted so that a run over
//! an unchanged graph always produces the same report. The run succeeds iff
//! no finding has `Severity::Error`.

mod checks;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use story_rules::{SpreadNumber, CODE_WIDTH, EXCLUSIVE_SPREADS};

use crate::graph::World;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural break; fails the run.
    Error,
    /// Content-shape issue; reported but never fails the run.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identifier of the check that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCode {
    SpreadExclusivity,
    NodeParticipants,
    MeetingSharing,
    NodeAlignment,
    ResonantPrecedence,
    Naming,
    Orphan,
    SceneCompleteness,
    NodeType,
    SpreadPlacement,
    MotifCatalog,
}

impl CheckCode {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckCode::SpreadExclusivity => "spread-exclusivity",
            CheckCode::NodeParticipants => "node-participants",
            CheckCode::MeetingSharing => "meeting-sharing",
            CheckCode::NodeAlignment => "node-alignment",
            CheckCode::ResonantPrecedence => "resonant-precedence",
            CheckCode::Naming => "naming",
            CheckCode::Orphan => "orphan",
            CheckCode::SceneCompleteness => "scene-completeness",
            CheckCode::NodeType => "node-type",
            CheckCode::SpreadPlacement => "spread-placement",
            CheckCode::MotifCatalog => "motif-catalog",
        }
    }
}

impl std::fmt::Display for CheckCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural finding about a record.
///
/// Field order is the sort order: severity, then record name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub record: String,
    pub code: CheckCode,
    pub message: String,
}

impl Finding {
    pub fn error(code: CheckCode, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            record: record.into(),
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: CheckCode, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            record: record.into(),
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Tunable limits for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Spreads that must belong to exactly one character.
    pub exclusive_spreads: Vec<SpreadNumber>,

    /// Scenes every page should have.
    pub scenes_per_page: usize,

    /// Inclusive sentence range for scene text.
    pub min_sentences: usize,
    pub max_sentences: usize,

    /// Width of a character code.
    pub code_width: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            exclusive_spreads: EXCLUSIVE_SPREADS
                .iter()
                .filter_map(|&s| SpreadNumber::new(s).ok())
                .collect(),
            scenes_per_page: 2,
            min_sentences: 3,
            max_sentences: 4,
            code_width: CODE_WIDTH,
        }
    }
}

/// The sorted findings of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Sort and deduplicate findings into a report.
    pub fn from_findings(mut findings: Vec<Finding>) -> Self {
        findings.sort();
        findings.dedup();
        Self { findings }
    }

    /// True iff there are no error findings.
    pub fn is_success(&self) -> bool {
        !self.findings.iter().any(Finding::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Findings produced by one check.
    pub fn with_code(&self, code: CheckCode) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.code == code)
    }

    /// Findings grouped by record name.
    pub fn by_record(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut grouped: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            grouped.entry(finding.record.as_str()).or_default().push(finding);
        }
        grouped
    }

    /// Format the report as plain text, grouped by record.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for (record, findings) in self.by_record() {
            out.push_str(&format!("{}\n", record));
            for finding in findings {
                let marker = match finding.severity {
                    Severity::Error => "✗",
                    Severity::Warning => "⚠",
                };
                out.push_str(&format!(
                    "  {} {} [{}] {}\n",
                    marker, finding.severity, finding.code, finding.message
                ));
            }
        }

        if !self.findings.is_empty() {
            out.push('\n');
        }
        let status = if self.is_success() { "PASSED" } else { "FAILED" };
        out.push_str(&format!(
            "{}: {} error(s), {} warning(s)\n",
            status,
            self.error_count(),
            self.warning_count()
        ));
        out
    }
}

type Check = fn(&World, &ValidatorConfig, &mut Vec<Finding>);

const CHECKS: [(CheckCode, Check); 11] = [
    (CheckCode::SpreadExclusivity, checks::spread_exclusivity),
    (CheckCode::NodeParticipants, checks::node_participants),
    (CheckCode::MeetingSharing, checks::meeting_sharing),
    (CheckCode::NodeAlignment, checks::node_alignment),
    (CheckCode::ResonantPrecedence, checks::resonant_precedence),
    (CheckCode::Naming, checks::naming),
    (CheckCode::Orphan, checks::orphans),
    (CheckCode::SceneCompleteness, checks::scene_completeness),
    (CheckCode::NodeType, checks::node_type),
    (CheckCode::SpreadPlacement, checks::spread_placement),
    (CheckCode::MotifCatalog, checks::motif_catalog),
];

/// Runs every structural check over a built world.
pub struct Validator<'w> {
    world: &'w World,
    config: ValidatorConfig,
}

impl<'w> Validator<'w> {
    /// Create a validator with the given configuration.
    pub fn new(world: &'w World, config: ValidatorConfig) -> Self {
        Self { world, config }
    }

    /// Create a validator with default configuration.
    pub fn with_defaults(world: &'w World) -> Self {
        Self::new(world, ValidatorConfig::default())
    }

    /// Run all checks and collect a sorted report.
    pub fn validate(&self) -> ValidationReport {
        let mut findings = Vec::new();

        for (code, check) in CHECKS {
            let before = findings.len();
            check(self.world, &self.config, &mut findings);
            debug!(check = %code, findings = findings.len() - before, "ran check");
        }

        let report = ValidationReport::from_findings(findings);
        info!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validation finished"
        );
        report
    }
}
