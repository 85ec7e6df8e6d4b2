//! Workflow orchestration.
//!
//! Runs the fixed stage sequence against a shared context and tracks the run
//! through its state machine. A stage failure records the failing stage and
//! skips everything downstream; the result always serializes, DONE or FAILED.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::DocumentCache;
use crate::config::Config;
use crate::context::SharedContext;
use crate::email::EmailWriterStage;
use crate::error::ExtractionError;
use crate::extract::extract_document;
use crate::job::JobAnalyzerStage;
use crate::models::{
    EmailStyle, RunState, RunSummary, StageFailure, StageTiming,
};
use crate::policy::DecisionStage;
use crate::resume::ResumeParserStage;
use crate::stage::Stage;
use crate::summary::summarize;

/// Complete record of one drafting run.
#[derive(Debug, Serialize)]
pub struct WorkflowResult {
    pub run_id: String,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub context: SharedContext,
    pub timings: Vec<StageTiming>,
    pub failure: Option<StageFailure>,
    pub summary: Option<RunSummary>,
}

impl WorkflowResult {
    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }
}

/// Options for one `draft` invocation.
pub struct DraftOptions {
    pub style_override: Option<EmailStyle>,
    pub use_cache: bool,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            style_override: None,
            use_cache: true,
        }
    }
}

/// Run the full pipeline for one resume/job pair.
///
/// Never returns `Err` for stage failures; those end up in the result with
/// state `FAILED`. The `Result` here only reflects conditions before the
/// run exists at all (none today, kept for signature stability).
pub async fn run_draft(
    config: &Config,
    resume_path: &Path,
    job_path: &Path,
    options: DraftOptions,
) -> WorkflowResult {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!(run_id = %run_id, "starting draft run");

    let mut state = RunState::Init;
    let mut context = SharedContext::new();
    let mut timings = Vec::new();
    let mut failure = None;

    // Stage 0: resolve both documents, through the cache when enabled.
    // A load failure is attributed to the stage that would consume the
    // document, since that is the work the missing text blocks.
    let cache = if options.use_cache {
        match DocumentCache::open(&config.cache.path).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "cache unavailable, loading documents directly");
                None
            }
        }
    } else {
        None
    };

    let mut documents = None;
    match resolve_document(cache.as_ref(), resume_path).await {
        Err(e) => {
            failure = Some(StageFailure {
                stage: "resume_parser".to_string(),
                error: e.to_string(),
            });
        }
        Ok(resume_text) => match resolve_document(cache.as_ref(), job_path).await {
            Err(e) => {
                failure = Some(StageFailure {
                    stage: "job_analyzer".to_string(),
                    error: e.to_string(),
                });
            }
            Ok(job_text) => {
                state = RunState::CacheResolved;
                documents = Some((resume_text, job_text));
            }
        },
    }

    if let Some((resume_text, job_text)) = documents {
        let stages: Vec<(Box<dyn Stage>, RunState)> = vec![
            (
                Box::new(ResumeParserStage::new(resume_text)),
                RunState::ResumeParsed,
            ),
            (
                Box::new(JobAnalyzerStage::new(job_text)),
                RunState::JobAnalyzed,
            ),
            (Box::new(DecisionStage), RunState::Decided),
            (
                Box::new(EmailWriterStage::new(
                    config.generation.clone(),
                    options.style_override,
                )),
                RunState::EmailWritten,
            ),
        ];

        for (stage, next_state) in stages {
            let name = stage.name();
            info!(stage = name, "stage starting");
            let start = Instant::now();

            match stage.run(&context).await {
                Ok(output) => {
                    let duration_ms = start.elapsed().as_millis() as u64;
                    timings.push(StageTiming {
                        stage: name.to_string(),
                        duration_ms,
                    });
                    info!(stage = name, duration_ms, "stage complete");

                    if let Err(e) = context.insert(output.key(), output) {
                        failure = Some(StageFailure {
                            stage: name.to_string(),
                            error: e.to_string(),
                        });
                        break;
                    }
                    state = next_state;
                }
                Err(e) => {
                    warn!(stage = name, error = %e, "stage failed");
                    failure = Some(StageFailure {
                        stage: name.to_string(),
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }
    }

    if let Some(cache) = cache {
        cache.close().await;
    }

    let summary = match (context.resume_findings(), context.job_findings(), context.decision()) {
        (Some(resume), Some(job), Some(decision)) if failure.is_none() => {
            Some(summarize(resume, job, decision))
        }
        _ => None,
    };

    let final_state = if failure.is_some() {
        RunState::Failed
    } else if state == RunState::EmailWritten {
        RunState::Done
    } else {
        // All stages ran without producing the email entry; treat as failed.
        RunState::Failed
    };

    info!(run_id = %run_id, state = ?final_state, "draft run finished");

    WorkflowResult {
        run_id,
        state: final_state,
        started_at,
        finished_at: Utc::now(),
        context,
        timings,
        failure,
        summary,
    }
}

/// Load one document, through the cache when present. A cache failure is
/// already downgraded inside `get_or_load`; this only adds the no-cache path.
async fn resolve_document(
    cache: Option<&DocumentCache>,
    path: &Path,
) -> Result<String, ExtractionError> {
    match cache {
        Some(cache) => cache.get_or_load(path, extract_document).await,
        None => extract_document(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const RESUME: &str = "\
Jane Doe
jane.doe@example.com
(555) 123-4567

EXPERIENCE
Senior Engineer at Acme Corp
2019 - Present
Built distributed systems in Rust and Python.

SKILLS
Rust, Python, SQL, Docker, Kubernetes
";

    const JOB: &str = "\
Staff Engineer
Company: Initech
Location: Remote

We are a startup of 45 employees looking for a hands-on engineer.
Requirements: Rust, Python, AWS. Strong communication skills required.
";

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.cache.path = dir.path().join("cache.sqlite");
        config.output.dir = dir.path().join("output");
        config
    }

    #[tokio::test]
    async fn test_happy_path_reaches_done_with_fallback_email() {
        let dir = tempfile::TempDir::new().unwrap();
        let resume = write_file(&dir, "resume.txt", RESUME);
        let job = write_file(&dir, "job.txt", JOB);
        let config = test_config(&dir);

        let result = run_draft(&config, &resume, &job, DraftOptions::default()).await;

        assert_eq!(result.state, RunState::Done);
        assert!(result.failure.is_none());
        assert_eq!(result.timings.len(), 4);

        let email = result.context.email().unwrap();
        assert!(!email.body.trim().is_empty());
        assert_eq!(email.origin, crate::models::EmailOrigin::Fallback);

        let summary = result.summary.unwrap();
        assert!(summary.matched_skills.iter().any(|s| s == "rust"));
    }

    #[tokio::test]
    async fn test_unusable_resume_fails_at_resume_stage() {
        let dir = tempfile::TempDir::new().unwrap();
        let resume = write_file(&dir, "resume.txt", "too short");
        let job = write_file(&dir, "job.txt", JOB);
        let config = test_config(&dir);

        let result = run_draft(&config, &resume, &job, DraftOptions::default()).await;

        assert_eq!(result.state, RunState::Failed);
        let failure = result.failure.unwrap();
        assert_eq!(failure.stage, "resume_parser");
        assert!(result.context.email().is_none());
        assert!(result.summary.is_none());
    }

    #[tokio::test]
    async fn test_missing_job_file_fails_at_job_stage() {
        let dir = tempfile::TempDir::new().unwrap();
        let resume = write_file(&dir, "resume.txt", RESUME);
        let job = dir.path().join("does-not-exist.txt");
        let config = test_config(&dir);

        let result = run_draft(&config, &resume, &job, DraftOptions::default()).await;

        assert_eq!(result.state, RunState::Failed);
        assert_eq!(result.failure.unwrap().stage, "job_analyzer");
    }

    #[tokio::test]
    async fn test_no_cache_run_still_completes() {
        let dir = tempfile::TempDir::new().unwrap();
        let resume = write_file(&dir, "resume.txt", RESUME);
        let job = write_file(&dir, "job.txt", JOB);
        let config = test_config(&dir);

        let result = run_draft(
            &config,
            &resume,
            &job,
            DraftOptions {
                style_override: None,
                use_cache: false,
            },
        )
        .await;

        assert_eq!(result.state, RunState::Done);
        assert!(!config.cache.path.exists());
    }

    #[tokio::test]
    async fn test_style_override_recorded_in_draft() {
        let dir = tempfile::TempDir::new().unwrap();
        let resume = write_file(&dir, "resume.txt", RESUME);
        let job = write_file(&dir, "job.txt", JOB);
        let config = test_config(&dir);

        let result = run_draft(
            &config,
            &resume,
            &job,
            DraftOptions {
                style_override: Some(EmailStyle::LeadershipFocused),
                use_cache: true,
            },
        )
        .await;

        assert_eq!(result.state, RunState::Done);
        let email = result.context.email().unwrap();
        assert_eq!(email.style_used, EmailStyle::LeadershipFocused);
        // The policy's own outcome stays visible in the decision entry.
        let decision = result.context.decision().unwrap();
        assert_ne!(decision.selected_style, EmailStyle::LeadershipFocused);
    }
}
