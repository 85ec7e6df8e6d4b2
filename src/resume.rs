//! Resume parser stage.
//!
//! Splits raw resume text into sections by header line, pulls contact
//! fields from the preamble, collects skills from the skills section plus a
//! vocabulary scan, and walks experience sections into ordered entries.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::context::{SharedContext, StageOutput};
use crate::error::{ExtractionError, StageError};
use crate::job::TECH_SKILLS;
use crate::models::{ContactInfo, ExperienceEntry, ResumeFindings, ResumeSection};
use crate::stage::Stage;

/// Headers that open a new resume section.
const SECTION_HEADERS: &[&str] = &[
    "experience",
    "work experience",
    "employment history",
    "education",
    "academic background",
    "qualifications",
    "skills",
    "technical skills",
    "competencies",
    "projects",
    "achievements",
    "summary",
    "objective",
];

/// Tokens that mark a line as a company name inside an experience section.
const COMPANY_MARKERS: &[&str] = &[
    "Inc", "Corp", "LLC", "Ltd", "Company", "Technologies", "Systems", "Labs",
];

pub struct ResumeParserStage {
    text: String,
}

impl ResumeParserStage {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

#[async_trait]
impl Stage for ResumeParserStage {
    fn name(&self) -> &'static str {
        "resume_parser"
    }

    async fn run(&self, _ctx: &SharedContext) -> Result<StageOutput, StageError> {
        let findings = parse_resume(&self.text)?;
        debug!(
            skills = findings.skills.len(),
            sections = findings.sections.len(),
            experience = findings.experience.len(),
            "resume parsed"
        );
        Ok(StageOutput::ResumeFindings(findings))
    }
}

/// Parse resume text into structured findings. Fails when the text has no
/// usable content.
pub fn parse_resume(text: &str) -> Result<ResumeFindings, ExtractionError> {
    if text.trim().len() < 50 {
        return Err(ExtractionError::UnusableText("resume"));
    }

    let sections = split_sections(text);
    let contact = extract_contact(text, &sections);
    let skills = extract_skills(text, &sections);
    let experience = extract_experience(&sections);

    Ok(ResumeFindings {
        contact,
        skills,
        experience,
        sections,
    })
}

fn is_section_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.len() <= 60 && SECTION_HEADERS.iter().any(|h| lower.contains(h))
}

fn split_sections(text: &str) -> Vec<ResumeSection> {
    let mut sections: Vec<ResumeSection> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_section_header(line) {
            if let Some((heading, body)) = current.take() {
                sections.push(ResumeSection {
                    heading,
                    body: body.join("\n"),
                });
            }
            current = Some((line.to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line.to_string());
        }
    }

    if let Some((heading, body)) = current {
        sections.push(ResumeSection {
            heading,
            body: body.join("\n"),
        });
    }

    sections
}

fn extract_contact(text: &str, sections: &[ResumeSection]) -> ContactInfo {
    let mut contact = ContactInfo::default();

    let email_re = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
    let phone_re = Regex::new(r"\+?\d[\d\s()./-]{7,}\d").unwrap();

    // Contact details usually sit in the preamble, before the first section.
    let preamble_end = sections
        .first()
        .and_then(|s| text.find(s.heading.as_str()))
        .unwrap_or(text.len());
    let preamble = &text[..preamble_end];

    for line in preamble.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if contact.email.is_none() {
            if let Some(m) = email_re.find(line) {
                contact.email = Some(m.as_str().to_string());
                continue;
            }
        }
        if contact.linkedin.is_none() && lower.contains("linkedin.com") {
            contact.linkedin = Some(line.to_string());
            continue;
        }
        if contact.phone.is_none()
            && (lower.contains("phone") || lower.contains("mobile") || phone_re.is_match(line))
        {
            if let Some(m) = phone_re.find(line) {
                contact.phone = Some(m.as_str().trim().to_string());
                continue;
            }
        }
        // First plausible non-contact line is the candidate's name.
        if contact.name.is_none()
            && line.len() > 2
            && !lower.contains("email")
            && !lower.contains("github")
        {
            contact.name = Some(line.to_string());
        }
    }

    contact
}

fn extract_skills(text: &str, sections: &[ResumeSection]) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();

    // Explicit skills sections, split on common delimiters.
    for section in sections {
        if !section.heading.to_lowercase().contains("skill")
            && !section.heading.to_lowercase().contains("competenc")
        {
            continue;
        }
        for line in section.body.lines() {
            for raw in line.split([',', ';', '•', '|']) {
                let skill = raw.trim().trim_start_matches('-').trim().to_lowercase();
                if skill.len() > 1 && !skills.contains(&skill) {
                    skills.push(skill);
                }
            }
        }
    }

    // Vocabulary scan over the whole document catches skills mentioned
    // inline rather than listed.
    let lower = text.to_lowercase();
    for skill in TECH_SKILLS {
        if lower.contains(skill) && !skills.iter().any(|s| s == skill) {
            skills.push(skill.to_string());
        }
    }

    skills
}

fn extract_experience(sections: &[ResumeSection]) -> Vec<ExperienceEntry> {
    let duration_re = Regex::new(r"(?i)\b(19|20)\d{2}\b|\bpresent\b").unwrap();
    let mut entries: Vec<ExperienceEntry> = Vec::new();

    for section in sections {
        let heading = section.heading.to_lowercase();
        if !heading.contains("experience")
            && !heading.contains("work")
            && !heading.contains("employment")
        {
            continue;
        }

        let mut current: Option<ExperienceEntry> = None;
        for line in section.body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if COMPANY_MARKERS.iter().any(|m| line.contains(m)) {
                if let Some(entry) = current.take() {
                    entries.push(entry);
                }
                current = Some(ExperienceEntry {
                    company: line.to_string(),
                    ..Default::default()
                });
            } else if let Some(entry) = current.as_mut() {
                if entry.duration.is_none() && duration_re.is_match(line) {
                    entry.duration = Some(line.to_string());
                } else if entry.role.is_none() {
                    entry.role = Some(line.to_string());
                }
            }
        }
        if let Some(entry) = current {
            entries.push(entry);
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Jane Doe
jane.doe@example.com
+1 (555) 010-2233
linkedin.com/in/janedoe

Summary
Systems engineer focused on storage and networking.

Work Experience
Acme Systems Inc
Senior Engineer
2019 - Present
Built a distributed cache in Rust serving 2M requests per day.

Widget Corp
Backend Engineer
2015 - 2019

Technical Skills
Rust, Python, Kubernetes, PostgreSQL
";

    #[test]
    fn test_contact_extraction() {
        let findings = parse_resume(SAMPLE).unwrap();
        assert_eq!(findings.contact.name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            findings.contact.email.as_deref(),
            Some("jane.doe@example.com")
        );
        assert!(findings.contact.phone.is_some());
        assert!(findings
            .contact
            .linkedin
            .as_deref()
            .unwrap()
            .contains("linkedin.com"));
    }

    #[test]
    fn test_skills_from_section_and_vocabulary() {
        let findings = parse_resume(SAMPLE).unwrap();
        assert!(findings.skills.contains(&"rust".to_string()));
        assert!(findings.skills.contains(&"kubernetes".to_string()));
        assert!(findings.skills.contains(&"postgresql".to_string()));
        // Dedup: "rust" appears in the skills section and the body.
        assert_eq!(
            findings.skills.iter().filter(|s| *s == "rust").count(),
            1
        );
    }

    #[test]
    fn test_experience_entries_in_order() {
        let findings = parse_resume(SAMPLE).unwrap();
        assert_eq!(findings.experience.len(), 2);
        assert!(findings.experience[0].company.contains("Acme Systems"));
        assert_eq!(
            findings.experience[0].role.as_deref(),
            Some("Senior Engineer")
        );
        assert!(findings.experience[0]
            .duration
            .as_deref()
            .unwrap()
            .contains("2019"));
        assert!(findings.experience[1].company.contains("Widget Corp"));
    }

    #[test]
    fn test_empty_resume_rejected() {
        let err = parse_resume("  \n ").unwrap_err();
        assert!(matches!(err, ExtractionError::UnusableText("resume")));
    }
}
