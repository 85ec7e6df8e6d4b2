//! Core data models for the drafting pipeline.
//!
//! These types carry the structured findings produced by each stage, the
//! decision derived from them, and the email draft the run ends with.

use serde::{Deserialize, Serialize};

/// Email style selected by the decision policy (or forced via `--style`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStyle {
    ExecutiveFormal,
    StartupCasual,
    TechnicalDetailed,
    LeadershipFocused,
}

impl EmailStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStyle::ExecutiveFormal => "executive_formal",
            EmailStyle::StartupCasual => "startup_casual",
            EmailStyle::TechnicalDetailed => "technical_detailed",
            EmailStyle::LeadershipFocused => "leadership_focused",
        }
    }

    /// Parse a style name as given on the CLI. `auto` is not a style and is
    /// handled by the caller.
    pub fn parse(s: &str) -> Option<EmailStyle> {
        match s {
            "executive_formal" => Some(EmailStyle::ExecutiveFormal),
            "startup_casual" => Some(EmailStyle::StartupCasual),
            "technical_detailed" => Some(EmailStyle::TechnicalDetailed),
            "leadership_focused" => Some(EmailStyle::LeadershipFocused),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmailStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content focus directive, driven by the size of the skill intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFocus {
    /// Three or more matched skills: cover multiple matches.
    #[serde(rename = "comprehensive")]
    Comprehensive,
    /// One or two matched skills: lead with the single best match.
    #[serde(rename = "strongest-match")]
    StrongestMatch,
    /// No matched skills: emphasize adjacent, transferable experience.
    #[serde(rename = "transferable")]
    Transferable,
}

impl std::fmt::Display for ContentFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContentFocus::Comprehensive => "comprehensive",
            ContentFocus::StrongestMatch => "strongest-match",
            ContentFocus::Transferable => "transferable",
        };
        f.write_str(s)
    }
}

/// Role category inferred from the job description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    Leadership,
    Technical,
    Other,
}

/// Contact fields pulled from the top of a resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

/// One work-experience entry, in resume order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: Option<String>,
    pub duration: Option<String>,
}

/// A detected resume section, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSection {
    pub heading: String,
    pub body: String,
}

/// Structured output of the resume parser stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeFindings {
    pub contact: ContactInfo,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub sections: Vec<ResumeSection>,
}

/// Structured output of the job analyzer stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFindings {
    pub company: Option<String>,
    pub location: Option<String>,
    pub role_title: Option<String>,
    pub required_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Estimated headcount; `None` when the description gives no signal.
    pub company_size: Option<u32>,
    pub role_category: RoleCategory,
    pub culture_signals: Vec<String>,
}

impl Default for JobFindings {
    fn default() -> Self {
        Self {
            company: None,
            location: None,
            role_title: None,
            required_skills: Vec::new(),
            soft_skills: Vec::new(),
            company_size: None,
            role_category: RoleCategory::Other,
            culture_signals: Vec::new(),
        }
    }
}

/// Outcome of the decision policy. Derived, stored as a context entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResult {
    pub selected_style: EmailStyle,
    pub content_focus: ContentFocus,
    pub matched_skills: Vec<String>,
    pub rationale: String,
}

/// Which branch produced the email draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailOrigin {
    Generated,
    Fallback,
}

/// Final email draft. Both the generated and the fallback branch produce
/// this same shape, so downstream code never special-cases which path ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    pub style_used: EmailStyle,
    pub origin: EmailOrigin,
}

/// Pipeline state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    CacheResolved,
    ResumeParsed,
    JobAnalyzed,
    Decided,
    EmailWritten,
    Done,
    Failed,
}

/// Wall-clock duration of one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u64,
}

/// Which stage failed and why, for FAILED runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: String,
    pub error: String,
}

/// Post-run summary derived from the final context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub matched_skills: Vec<String>,
    pub skill_match_ratio: f64,
    pub assessment: String,
    pub next_steps: Vec<String>,
}
