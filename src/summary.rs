//! Post-run summary derived from the completed context.
//!
//! Pure function of the findings and decision; attached to the workflow
//! result and printed by the CLI.

use crate::models::{DecisionResult, JobFindings, ResumeFindings, RunSummary};

pub fn summarize(
    resume: &ResumeFindings,
    job: &JobFindings,
    decision: &DecisionResult,
) -> RunSummary {
    let ratio = if job.required_skills.is_empty() {
        0.0
    } else {
        decision.matched_skills.len() as f64 / job.required_skills.len() as f64
    };

    let has_experience = !resume.experience.is_empty();

    let assessment = if ratio >= 0.7 && has_experience {
        "Strong application with excellent skill match and relevant experience"
    } else if ratio >= 0.4 || has_experience {
        "Good application with moderate skill match and some relevant experience"
    } else {
        "Challenging application requiring emphasis on transferable skills and potential"
    };

    let mut next_steps = Vec::new();
    if ratio < 0.5 {
        next_steps.push("Consider highlighting transferable skills and learning ability".to_string());
    }
    if !has_experience {
        next_steps.push("Emphasize project work and academic achievements".to_string());
    }
    next_steps.extend([
        "Review and customize the generated email".to_string(),
        "Prepare specific examples for interview questions".to_string(),
        "Research the company culture and recent news".to_string(),
    ]);

    RunSummary {
        matched_skills: decision.matched_skills.clone(),
        skill_match_ratio: ratio,
        assessment: assessment.to_string(),
        next_steps,
    }
}
