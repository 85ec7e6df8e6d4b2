//! Deterministic email templates, one per [`EmailStyle`].
//!
//! These back the email writer's fallback path: when text generation is
//! disabled or fails, the draft is assembled entirely from structured
//! findings, so the output is reproducible for a given input pair.

use crate::models::{
    ContentFocus, DecisionResult, EmailStyle, JobFindings, ResumeFindings,
};

struct StyleTemplate {
    subject: &'static str,
    greeting: &'static str,
    opener: &'static str,
    closing: &'static str,
    signoff: &'static str,
}

fn template_for(style: EmailStyle) -> StyleTemplate {
    match style {
        EmailStyle::ExecutiveFormal => StyleTemplate {
            subject: "Experienced {role} Professional - {company} Opportunity",
            greeting: "Dear Hiring Manager,",
            opener: "I am writing to express my strong interest in the {role} position at {company}. I believe my background positions me to make significant contributions to your team and help drive {company}'s continued success.",
            closing: "I look forward to the possibility of contributing to {company}'s success.",
            signoff: "Best regards,",
        },
        EmailStyle::StartupCasual => StyleTemplate {
            subject: "Hey {company} team - {role} role looks perfect!",
            greeting: "Hi there,",
            opener: "I came across your {role} opening and got really excited about the opportunity to join {company}! This is exactly the kind of work I've been looking for.",
            closing: "Looking forward to potentially joining the {company} team!",
            signoff: "Cheers,",
        },
        EmailStyle::TechnicalDetailed => StyleTemplate {
            subject: "Senior {role} - Technical Expert for {company}",
            greeting: "Dear Hiring Manager,",
            opener: "I am excited to apply for the {role} position at {company}. With deep technical expertise and experience building scalable systems, I am confident I can contribute significantly to your technical initiatives.",
            closing: "I look forward to discussing how my technical expertise can benefit {company}.",
            signoff: "Best regards,",
        },
        EmailStyle::LeadershipFocused => StyleTemplate {
            subject: "Strategic {role} Leader - Driving {company} Growth",
            greeting: "Dear Hiring Manager,",
            opener: "I am writing to express my interest in the {role} position at {company}. As a proven leader with experience building and scaling teams, I am excited about the opportunity to contribute to {company}'s strategic growth.",
            closing: "I look forward to discussing how my leadership experience can contribute to {company}'s success.",
            signoff: "Best regards,",
        },
    }
}

fn fill(template: &str, role: &str, company: &str) -> String {
    template.replace("{role}", role).replace("{company}", company)
}

/// Subject line for a style, with role and company substituted.
pub fn subject_line(style: EmailStyle, role: &str, company: &str) -> String {
    fill(template_for(style).subject, role, company)
}

/// Build the complete fallback email body (greeting through signature).
pub fn fallback_body(
    resume: &ResumeFindings,
    job: &JobFindings,
    decision: &DecisionResult,
) -> String {
    let template = template_for(decision.selected_style);
    let role = job.role_title.as_deref().unwrap_or("open");
    let company = job.company.as_deref().unwrap_or("your company");
    let name = resume.contact.name.as_deref().unwrap_or("The Candidate");

    let mut paragraphs = vec![
        fill(template.opener, role, company),
        focus_paragraph(decision, resume),
        experience_paragraph(resume),
    ];

    if decision.selected_style == EmailStyle::LeadershipFocused {
        paragraphs.push(
            "Throughout my career, I have built and led high-performing teams, \
             creating collaborative environments that foster innovation and \
             professional growth."
                .to_string(),
        );
    }

    paragraphs.push(
        "I would welcome the opportunity to discuss how my experience can \
         contribute to your team's success."
            .to_string(),
    );

    format!(
        "{}\n\n{}\n\n{}\n\n{}\n{}",
        template.greeting,
        paragraphs.join("\n\n"),
        fill(template.closing, role, company),
        template.signoff,
        name,
    )
}

/// Skills paragraph shaped by the decision's content focus.
fn focus_paragraph(decision: &DecisionResult, resume: &ResumeFindings) -> String {
    match decision.content_focus {
        ContentFocus::Comprehensive => {
            let skills = decision.matched_skills.join(", ");
            format!(
                "I bring hands-on expertise in {}, directly matching the core \
                 requirements of this role, with a proven track record of \
                 delivering solutions that drive business value.",
                skills
            )
        }
        ContentFocus::StrongestMatch => {
            let best = decision
                .matched_skills
                .first()
                .map(String::as_str)
                .unwrap_or("my core technical skills");
            format!(
                "My strongest qualification for this role is my depth of \
                 experience with {}, which I have applied across production \
                 systems at scale.",
                best
            )
        }
        ContentFocus::Transferable => {
            let skills = if resume.skills.is_empty() {
                "technology and innovation".to_string()
            } else {
                resume.skills[..resume.skills.len().min(3)].join(", ")
            };
            format!(
                "While my background is in {}, I have consistently demonstrated \
                 the adaptability and learning ability to pick up new domains \
                 quickly and deliver results.",
                skills
            )
        }
    }
}

fn experience_paragraph(resume: &ResumeFindings) -> String {
    match resume.experience.first() {
        Some(entry) => {
            let role_part = entry
                .role
                .as_deref()
                .map(|r| format!("as {} ", r))
                .unwrap_or_default();
            format!(
                "Most recently I have been working {}at {}, where I have \
                 consistently delivered high-quality solutions in fast-paced \
                 environments.",
                role_part, entry.company
            )
        }
        None => "I have extensive experience delivering impactful projects, \
                 consistently meeting deadlines and exceeding expectations."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, EmailOrigin, ExperienceEntry};

    fn decision(style: EmailStyle, focus: ContentFocus, matched: &[&str]) -> DecisionResult {
        DecisionResult {
            selected_style: style,
            content_focus: focus,
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            rationale: String::new(),
        }
    }

    fn sample_resume() -> ResumeFindings {
        ResumeFindings {
            contact: ContactInfo {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            },
            skills: vec!["rust".to_string(), "python".to_string()],
            experience: vec![ExperienceEntry {
                company: "Acme Corp".to_string(),
                role: Some("Senior Engineer".to_string()),
                duration: None,
            }],
            sections: Vec::new(),
        }
    }

    fn sample_job() -> JobFindings {
        JobFindings {
            company: Some("Initech".to_string()),
            role_title: Some("Staff Engineer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_subject_line_per_style() {
        assert_eq!(
            subject_line(EmailStyle::StartupCasual, "Engineer", "Initech"),
            "Hey Initech team - Engineer role looks perfect!"
        );
        assert_eq!(
            subject_line(EmailStyle::LeadershipFocused, "CTO", "Initech"),
            "Strategic CTO Leader - Driving Initech Growth"
        );
    }

    #[test]
    fn test_fallback_body_is_never_empty() {
        for style in [
            EmailStyle::ExecutiveFormal,
            EmailStyle::StartupCasual,
            EmailStyle::TechnicalDetailed,
            EmailStyle::LeadershipFocused,
        ] {
            let body = fallback_body(
                &ResumeFindings::default(),
                &JobFindings::default(),
                &decision(style, ContentFocus::Transferable, &[]),
            );
            assert!(!body.trim().is_empty());
            assert!(body.contains("open"), "role placeholder filled: {}", body);
        }
    }

    #[test]
    fn test_fallback_body_reflects_focus() {
        let resume = sample_resume();
        let job = sample_job();

        let comprehensive = fallback_body(
            &resume,
            &job,
            &decision(
                EmailStyle::ExecutiveFormal,
                ContentFocus::Comprehensive,
                &["rust", "python", "sql"],
            ),
        );
        assert!(comprehensive.contains("rust, python, sql"));

        let strongest = fallback_body(
            &resume,
            &job,
            &decision(
                EmailStyle::ExecutiveFormal,
                ContentFocus::StrongestMatch,
                &["rust"],
            ),
        );
        assert!(strongest.contains("strongest qualification"));
        assert!(strongest.contains("rust"));

        let transferable = fallback_body(
            &resume,
            &job,
            &decision(EmailStyle::ExecutiveFormal, ContentFocus::Transferable, &[]),
        );
        assert!(transferable.contains("adaptability"));
    }

    #[test]
    fn test_fallback_body_uses_findings() {
        let body = fallback_body(
            &sample_resume(),
            &sample_job(),
            &decision(EmailStyle::ExecutiveFormal, ContentFocus::StrongestMatch, &["rust"]),
        );
        assert!(body.contains("Initech"));
        assert!(body.contains("Staff Engineer"));
        assert!(body.contains("Acme Corp"));
        assert!(body.ends_with("Jane Doe"));
    }

    #[test]
    fn test_leadership_style_adds_leadership_paragraph() {
        let body = fallback_body(
            &sample_resume(),
            &sample_job(),
            &decision(EmailStyle::LeadershipFocused, ContentFocus::Transferable, &[]),
        );
        assert!(body.contains("high-performing teams"));
    }

    #[test]
    fn test_origin_enum_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EmailOrigin::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
