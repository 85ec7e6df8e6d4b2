//! Decision policy: findings in, style and content focus out.
//!
//! The style rules form an ordered table evaluated top to bottom with a
//! mandatory default, so each rule can be read and tested on its own. The
//! content-focus rule is independent of style and driven only by the size
//! of the skill intersection. `decide` is total: every valid pair of
//! findings yields exactly one result, and unknown fields (such as a
//! missing company size) simply fall through to the default.

use async_trait::async_trait;

use crate::context::{SharedContext, StageOutput};
use crate::error::StageError;
use crate::models::{
    ContentFocus, DecisionResult, EmailStyle, JobFindings, ResumeFindings, RoleCategory,
};
use crate::stage::Stage;

struct StyleRule {
    name: &'static str,
    applies: fn(&ResumeFindings, &JobFindings) -> bool,
    style: EmailStyle,
}

/// Ordered style rules; the first match wins.
const STYLE_RULES: &[StyleRule] = &[
    StyleRule {
        name: "leadership role",
        applies: |_, job| job.role_category == RoleCategory::Leadership,
        style: EmailStyle::LeadershipFocused,
    },
    StyleRule {
        name: "small company (< 100)",
        applies: |_, job| matches!(job.company_size, Some(n) if n < 100),
        style: EmailStyle::StartupCasual,
    },
    StyleRule {
        name: "large company (> 1000)",
        applies: |_, job| matches!(job.company_size, Some(n) if n > 1000),
        style: EmailStyle::ExecutiveFormal,
    },
    StyleRule {
        name: "technical role",
        applies: |_, job| job.role_category == RoleCategory::Technical,
        style: EmailStyle::TechnicalDetailed,
    },
];

const DEFAULT_STYLE: EmailStyle = EmailStyle::ExecutiveFormal;

/// Skills present in both the resume and the job requirements, in job order.
pub fn matched_skills(resume: &ResumeFindings, job: &JobFindings) -> Vec<String> {
    job.required_skills
        .iter()
        .filter(|req| {
            resume
                .skills
                .iter()
                .any(|s| s.eq_ignore_ascii_case(req))
        })
        .cloned()
        .collect()
}

fn focus_for(match_count: usize) -> ContentFocus {
    match match_count {
        0 => ContentFocus::Transferable,
        1 | 2 => ContentFocus::StrongestMatch,
        _ => ContentFocus::Comprehensive,
    }
}

/// Map findings to a style and content focus. Pure and total; repeated
/// calls with the same findings return the same result.
pub fn decide(resume: &ResumeFindings, job: &JobFindings) -> DecisionResult {
    let (selected_style, rule_name) = STYLE_RULES
        .iter()
        .find(|rule| (rule.applies)(resume, job))
        .map(|rule| (rule.style, rule.name))
        .unwrap_or((DEFAULT_STYLE, "default"));

    let matched = matched_skills(resume, job);
    let content_focus = focus_for(matched.len());

    let rationale = format!(
        "style {} via rule '{}'; {} of {} required skills matched -> focus {}",
        selected_style,
        rule_name,
        matched.len(),
        job.required_skills.len(),
        content_focus,
    );

    DecisionResult {
        selected_style,
        content_focus,
        matched_skills: matched,
        rationale,
    }
}

/// Stage wrapper around [`decide`], so the pipeline can sequence and time
/// the policy like any other step. It cannot fail beyond a missing
/// prerequisite entry, which would be a pipeline ordering defect.
pub struct DecisionStage;

#[async_trait]
impl Stage for DecisionStage {
    fn name(&self) -> &'static str {
        "decision_policy"
    }

    async fn run(&self, ctx: &SharedContext) -> Result<StageOutput, StageError> {
        let resume = ctx.require_resume_findings()?;
        let job = ctx.require_job_findings()?;
        Ok(StageOutput::Decision(decide(resume, job)))
    }
}
