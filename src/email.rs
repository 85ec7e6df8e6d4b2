//! Email writer stage.
//!
//! Reads the resume findings, job findings, and decision from the context,
//! attempts model-backed generation, and on any [`GenerationError`] falls
//! back to the deterministic templates. The fallback is part of the stage's
//! success path; a generation failure never fails the run.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::context::{SharedContext, StageOutput};
use crate::error::{GenerationError, StageError};
use crate::generation::generate_text;
use crate::models::{
    DecisionResult, EmailDraft, EmailOrigin, EmailStyle, JobFindings, ResumeFindings,
};
use crate::stage::Stage;
use crate::templates;

pub struct EmailWriterStage {
    config: GenerationConfig,
    /// Forced style from the CLI; `None` means use the decision's selection.
    style_override: Option<EmailStyle>,
}

impl EmailWriterStage {
    pub fn new(config: GenerationConfig, style_override: Option<EmailStyle>) -> Self {
        Self {
            config,
            style_override,
        }
    }

    fn effective_style(&self, decision: &DecisionResult) -> EmailStyle {
        self.style_override.unwrap_or(decision.selected_style)
    }

    async fn generate_draft(
        &self,
        resume: &ResumeFindings,
        job: &JobFindings,
        decision: &DecisionResult,
        style: EmailStyle,
    ) -> Result<EmailDraft, GenerationError> {
        let prompt = build_prompt(resume, job, decision, style);

        // Bound the whole attempt, retries included. The HTTP client has its
        // own per-request timeout inside generate_text.
        let budget = Duration::from_secs(self.config.timeout_secs);
        let text = match tokio::time::timeout(budget, generate_text(&self.config, &prompt)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(GenerationError::Timeout(self.config.timeout_secs)),
        };

        let (subject, body) = split_subject(&text, style, job);
        Ok(EmailDraft {
            subject,
            body,
            style_used: style,
            origin: EmailOrigin::Generated,
        })
    }

    fn fallback_draft(
        &self,
        resume: &ResumeFindings,
        job: &JobFindings,
        decision: &DecisionResult,
        style: EmailStyle,
    ) -> EmailDraft {
        let role = job.role_title.as_deref().unwrap_or("open");
        let company = job.company.as_deref().unwrap_or("your company");

        let effective = DecisionResult {
            selected_style: style,
            ..decision.clone()
        };

        EmailDraft {
            subject: templates::subject_line(style, role, company),
            body: templates::fallback_body(resume, job, &effective),
            style_used: style,
            origin: EmailOrigin::Fallback,
        }
    }
}

#[async_trait]
impl Stage for EmailWriterStage {
    fn name(&self) -> &'static str {
        "email_writer"
    }

    async fn run(&self, ctx: &SharedContext) -> Result<StageOutput, StageError> {
        let resume = ctx.require_resume_findings()?;
        let job = ctx.require_job_findings()?;
        let decision = ctx.require_decision()?;
        let style = self.effective_style(decision);

        let draft = match self.generate_draft(resume, job, decision, style).await {
            Ok(draft) => {
                info!(style = %style, "email generated");
                draft
            }
            Err(e) => {
                warn!(style = %style, error = %e, "generation failed, using template fallback");
                self.fallback_draft(resume, job, decision, style)
            }
        };

        Ok(StageOutput::Email(draft))
    }
}

fn build_prompt(
    resume: &ResumeFindings,
    job: &JobFindings,
    decision: &DecisionResult,
    style: EmailStyle,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Write a professional job application email. Start the first line with \
         'Subject: ' followed by the subject, then a blank line, then the body.\n\n",
    );
    prompt.push_str(&format!("Style: {}\n", style));
    prompt.push_str(&format!("Content focus: {}\n", decision.content_focus));

    if let Some(name) = &resume.contact.name {
        prompt.push_str(&format!("Candidate: {}\n", name));
    }
    if let Some(company) = &job.company {
        prompt.push_str(&format!("Company: {}\n", company));
    }
    if let Some(role) = &job.role_title {
        prompt.push_str(&format!("Role: {}\n", role));
    }
    if !decision.matched_skills.is_empty() {
        prompt.push_str(&format!(
            "Matched skills to emphasize: {}\n",
            decision.matched_skills.join(", ")
        ));
    }
    if !resume.experience.is_empty() {
        prompt.push_str("Experience:\n");
        for entry in &resume.experience {
            prompt.push_str(&format!(
                "- {} {}\n",
                entry.role.as_deref().unwrap_or("role unknown"),
                entry.company
            ));
        }
    }
    prompt
}

/// Split a generated completion into subject and body. Falls back to the
/// style's templated subject when the model did not emit a `Subject:` line.
fn split_subject(text: &str, style: EmailStyle, job: &JobFindings) -> (String, String) {
    let trimmed = text.trim();

    if let Some(rest) = trimmed
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("Subject:"))
    {
        let subject = rest.trim().to_string();
        let body = trimmed
            .splitn(2, '\n')
            .nth(1)
            .unwrap_or("")
            .trim()
            .to_string();
        if !subject.is_empty() && !body.is_empty() {
            return (subject, body);
        }
    }

    let role = job.role_title.as_deref().unwrap_or("open");
    let company = job.company.as_deref().unwrap_or("your company");
    (
        templates::subject_line(style, role, company),
        trimmed.to_string(),
    )
}
