//! Shared context threaded through the pipeline.
//!
//! An append-only, ordered mapping from stage name to that stage's output.
//! Each stage writes exactly one entry under its own name and may read any
//! prior entry; entries are never mutated after insertion, so stages cannot
//! corrupt each other's results.

use serde::ser::SerializeMap;
use serde::Serialize;

use crate::error::StageError;
use crate::models::{DecisionResult, EmailDraft, JobFindings, ResumeFindings};

pub const RESUME_FINDINGS: &str = "resume_findings";
pub const JOB_FINDINGS: &str = "job_findings";
pub const DECISION: &str = "decision";
pub const EMAIL: &str = "email";

/// One stage's structured result.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageOutput {
    ResumeFindings(ResumeFindings),
    JobFindings(JobFindings),
    Decision(DecisionResult),
    Email(EmailDraft),
}

impl StageOutput {
    /// Context entry name for this output.
    pub fn key(&self) -> &'static str {
        match self {
            StageOutput::ResumeFindings(_) => RESUME_FINDINGS,
            StageOutput::JobFindings(_) => JOB_FINDINGS,
            StageOutput::Decision(_) => DECISION,
            StageOutput::Email(_) => EMAIL,
        }
    }
}

/// Write-once ordered map of stage outputs.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    entries: Vec<(String, StageOutput)>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Rejects a name that has already been written.
    pub fn insert(&mut self, name: &str, output: StageOutput) -> Result<(), StageError> {
        if self.get(name).is_some() {
            return Err(StageError::DuplicateEntry(name.to_string()));
        }
        self.entries.push((name.to_string(), output));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StageOutput> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, output)| output)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resume_findings(&self) -> Option<&ResumeFindings> {
        match self.get(RESUME_FINDINGS) {
            Some(StageOutput::ResumeFindings(f)) => Some(f),
            _ => None,
        }
    }

    pub fn job_findings(&self) -> Option<&JobFindings> {
        match self.get(JOB_FINDINGS) {
            Some(StageOutput::JobFindings(f)) => Some(f),
            _ => None,
        }
    }

    pub fn decision(&self) -> Option<&DecisionResult> {
        match self.get(DECISION) {
            Some(StageOutput::Decision(d)) => Some(d),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<&EmailDraft> {
        match self.get(EMAIL) {
            Some(StageOutput::Email(e)) => Some(e),
            _ => None,
        }
    }

    pub fn require_resume_findings(&self) -> Result<&ResumeFindings, StageError> {
        self.resume_findings()
            .ok_or_else(|| StageError::MissingEntry(RESUME_FINDINGS.to_string()))
    }

    pub fn require_job_findings(&self) -> Result<&JobFindings, StageError> {
        self.job_findings()
            .ok_or_else(|| StageError::MissingEntry(JOB_FINDINGS.to_string()))
    }

    pub fn require_decision(&self) -> Result<&DecisionResult, StageError> {
        self.decision()
            .ok_or_else(|| StageError::MissingEntry(DECISION.to_string()))
    }
}

impl Serialize for SharedContext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, output) in &self.entries {
            map.serialize_entry(name, output)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResumeFindings;

    #[test]
    fn test_insert_is_write_once() {
        let mut ctx = SharedContext::new();
        ctx.insert(
            RESUME_FINDINGS,
            StageOutput::ResumeFindings(ResumeFindings::default()),
        )
        .unwrap();

        let err = ctx
            .insert(
                RESUME_FINDINGS,
                StageOutput::ResumeFindings(ResumeFindings::default()),
            )
            .unwrap_err();
        assert!(matches!(err, StageError::DuplicateEntry(_)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut ctx = SharedContext::new();
        ctx.insert(
            RESUME_FINDINGS,
            StageOutput::ResumeFindings(ResumeFindings::default()),
        )
        .unwrap();
        ctx.insert(
            JOB_FINDINGS,
            StageOutput::JobFindings(crate::models::JobFindings::default()),
        )
        .unwrap();

        let names: Vec<&str> = ctx.names().collect();
        assert_eq!(names, vec![RESUME_FINDINGS, JOB_FINDINGS]);

        let json = serde_json::to_string(&ctx).unwrap();
        let resume_pos = json.find(RESUME_FINDINGS).unwrap();
        let job_pos = json.find(JOB_FINDINGS).unwrap();
        assert!(resume_pos < job_pos);
    }

    #[test]
    fn test_typed_accessor_on_missing_entry() {
        let ctx = SharedContext::new();
        assert!(ctx.resume_findings().is_none());
        assert!(ctx.require_decision().is_err());
    }
}
