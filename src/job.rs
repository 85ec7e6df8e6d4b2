//! Job analyzer stage.
//!
//! Scans a job description for required skills, company facts, an estimated
//! company size, the role category, and culture signals. All heuristics are
//! keyword and pattern based; they only need to be good enough to drive the
//! decision policy and the fallback templates.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::context::{SharedContext, StageOutput};
use crate::error::{ExtractionError, StageError};
use crate::models::{JobFindings, RoleCategory};
use crate::stage::Stage;

/// Technical skill vocabulary shared with the resume parser.
pub(crate) const TECH_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c++",
    "c#",
    "go",
    "rust",
    "scala",
    "machine learning",
    "deep learning",
    "data science",
    "analytics",
    "sql",
    "nosql",
    "mongodb",
    "postgresql",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "microservices",
    "react",
    "angular",
    "vue",
    "node.js",
    "django",
    "flask",
    "spring",
    "tensorflow",
    "pytorch",
    "pandas",
    "numpy",
];

const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "problem solving",
    "analytical thinking",
    "adaptability",
    "time management",
    "project management",
    "collaboration",
    "mentoring",
    "strategic thinking",
];

const CULTURE_SIGNALS: &[&str] = &[
    "fast-paced environment",
    "dynamic team",
    "innovative solutions",
    "cutting-edge technology",
    "collaborative culture",
    "growth mindset",
    "results-driven",
    "customer-focused",
    "data-driven",
    "agile",
    "mission-critical",
    "end-to-end",
];

const LEADERSHIP_MARKERS: &[&str] = &[
    "leadership",
    "director",
    "vice president",
    "vp of",
    "head of",
    "chief",
    "engineering manager",
    "team lead",
];

const TECHNICAL_MARKERS: &[&str] = &[
    "engineer",
    "developer",
    "architect",
    "programmer",
    "scientist",
    "sre",
];

pub struct JobAnalyzerStage {
    text: String,
}

impl JobAnalyzerStage {
    pub fn new(text: String) -> Self {
        Self { text }
    }
}

#[async_trait]
impl Stage for JobAnalyzerStage {
    fn name(&self) -> &'static str {
        "job_analyzer"
    }

    async fn run(&self, _ctx: &SharedContext) -> Result<StageOutput, StageError> {
        let findings = analyze_job(&self.text)?;
        debug!(
            required_skills = findings.required_skills.len(),
            company_size = ?findings.company_size,
            role_category = ?findings.role_category,
            "job description analyzed"
        );
        Ok(StageOutput::JobFindings(findings))
    }
}

/// Analyze job description text into structured findings.
pub fn analyze_job(text: &str) -> Result<JobFindings, ExtractionError> {
    if text.trim().len() < 50 {
        return Err(ExtractionError::UnusableText("job description"));
    }

    let lower = text.to_lowercase();

    let required_skills: Vec<String> = TECH_SKILLS
        .iter()
        .filter(|s| lower.contains(*s))
        .map(|s| s.to_string())
        .collect();

    let soft_skills: Vec<String> = SOFT_SKILLS
        .iter()
        .filter(|s| lower.contains(*s))
        .map(|s| s.to_string())
        .collect();

    let culture_signals: Vec<String> = CULTURE_SIGNALS
        .iter()
        .filter(|s| lower.contains(*s))
        .map(|s| s.to_string())
        .collect();

    let role_category = infer_role_category(&lower, &required_skills);

    Ok(JobFindings {
        company: extract_company(text),
        location: extract_location(text),
        role_title: extract_role_title(text),
        required_skills,
        soft_skills,
        company_size: estimate_company_size(&lower),
        role_category,
        culture_signals,
    })
}

fn extract_company(text: &str) -> Option<String> {
    let patterns = [
        r"(?m)^\s*[Cc]ompany:\s*(.+)$",
        r"at\s+([A-Z][A-Za-z&\- ]+(?:Inc|Corp|LLC|Ltd|Company|Technologies|Systems|Labs))",
        r"([A-Z][A-Za-z&\- ]+(?:Inc|Corp|LLC|Ltd|Company|Technologies|Systems|Labs))",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(text) {
            return Some(caps[1].trim().to_string());
        }
    }
    None
}

fn extract_location(text: &str) -> Option<String> {
    let re = Regex::new(r"(?mi)^\s*location:\s*(.+)$").unwrap();
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

fn extract_role_title(text: &str) -> Option<String> {
    let re = Regex::new(r"(?mi)^\s*(?:role|position|title|job title):\s*(.+)$").unwrap();
    if let Some(caps) = re.captures(text) {
        return Some(caps[1].trim().to_string());
    }

    // Fall back to the first short line, which is usually a posting title.
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .filter(|l| l.len() < 80)
        .map(|l| l.to_string())
}

/// Estimate headcount: an explicit "N employees" figure wins, otherwise
/// keyword buckets, otherwise unknown.
fn estimate_company_size(lower: &str) -> Option<u32> {
    let re = Regex::new(r"([0-9][0-9,]*)\s*\+?\s*(?:employees|people|person team)").unwrap();
    if let Some(caps) = re.captures(lower) {
        let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<u32>() {
            return Some(n);
        }
    }

    const STARTUP: &[&str] = &["startup", "early stage", "early-stage", "seed", "series a"];
    const MID: &[&str] = &["mid-size", "medium-sized", "growing company"];
    const ENTERPRISE: &[&str] = &["fortune 500", "enterprise", "large corporation"];

    if STARTUP.iter().any(|k| lower.contains(k)) {
        Some(25)
    } else if ENTERPRISE.iter().any(|k| lower.contains(k)) {
        Some(5000)
    } else if MID.iter().any(|k| lower.contains(k)) {
        Some(500)
    } else {
        None
    }
}

fn infer_role_category(lower: &str, required_skills: &[String]) -> RoleCategory {
    if LEADERSHIP_MARKERS.iter().any(|m| lower.contains(m)) {
        RoleCategory::Leadership
    } else if TECHNICAL_MARKERS.iter().any(|m| lower.contains(m)) || required_skills.len() >= 3 {
        RoleCategory::Technical
    } else {
        RoleCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Senior Rust Engineer
Company: Ferrous Systems
Location: Berlin, Germany

We are an early-stage startup building developer tools in Rust.
You will work with Kubernetes, PostgreSQL, and AWS in a fast-paced environment.
Strong communication skills required.
";

    #[test]
    fn test_required_skills_found() {
        let findings = analyze_job(SAMPLE).unwrap();
        assert!(findings.required_skills.contains(&"rust".to_string()));
        assert!(findings.required_skills.contains(&"kubernetes".to_string()));
        assert!(findings.required_skills.contains(&"aws".to_string()));
        assert!(findings.soft_skills.contains(&"communication".to_string()));
    }

    #[test]
    fn test_company_and_location() {
        let findings = analyze_job(SAMPLE).unwrap();
        assert_eq!(findings.company.as_deref(), Some("Ferrous Systems"));
        assert_eq!(findings.location.as_deref(), Some("Berlin, Germany"));
        assert_eq!(findings.role_title.as_deref(), Some("Senior Rust Engineer"));
    }

    #[test]
    fn test_startup_size_bucket() {
        let findings = analyze_job(SAMPLE).unwrap();
        assert_eq!(findings.company_size, Some(25));
    }

    #[test]
    fn test_explicit_headcount_wins() {
        let text = "Platform Engineer role at a startup with 1,200 employees. \
                    Rust and Kubernetes experience required.";
        let findings = analyze_job(text).unwrap();
        assert_eq!(findings.company_size, Some(1200));
    }

    #[test]
    fn test_role_category_priority() {
        let findings = analyze_job(SAMPLE).unwrap();
        assert_eq!(findings.role_category, RoleCategory::Technical);

        let text = "Head of Engineering at a Fortune 500 insurer. \
                    You will lead three platform teams and set technical direction.";
        let findings = analyze_job(text).unwrap();
        assert_eq!(findings.role_category, RoleCategory::Leadership);
        assert_eq!(findings.company_size, Some(5000));
    }

    #[test]
    fn test_unknown_size() {
        let text = "Operations Coordinator needed. You will schedule deliveries \
                    and keep our warehouse records accurate and current.";
        let findings = analyze_job(text).unwrap();
        assert_eq!(findings.company_size, None);
    }

    #[test]
    fn test_too_short_rejected() {
        let err = analyze_job("hiring!").unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::UnusableText("job description")
        ));
    }

    #[test]
    fn test_culture_signals() {
        let findings = analyze_job(SAMPLE).unwrap();
        assert!(findings
            .culture_signals
            .contains(&"fast-paced environment".to_string()));
    }
}
