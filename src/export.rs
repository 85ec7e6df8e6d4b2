//! Output sink: writes the drafted email and the full run record to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::EmailDraft;
use crate::pipeline::WorkflowResult;

/// Write `email.md` and `workflow_result.json` under `output_dir`, creating
/// the directory if needed. Returns the paths written.
pub fn export_result(output_dir: &Path, result: &WorkflowResult) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let mut written = Vec::new();

    if let Some(email) = result.context.email() {
        let email_path = output_dir.join("email.md");
        std::fs::write(&email_path, render_markdown_email(email, result))
            .with_context(|| format!("Failed to write {}", email_path.display()))?;
        info!(path = %email_path.display(), "email written");
        written.push(email_path);
    }

    let result_path = output_dir.join("workflow_result.json");
    let json = serde_json::to_string_pretty(result).context("Failed to serialize run result")?;
    std::fs::write(&result_path, json)
        .with_context(|| format!("Failed to write {}", result_path.display()))?;
    info!(path = %result_path.display(), "run record written");
    written.push(result_path);

    Ok(written)
}

fn render_markdown_email(email: &EmailDraft, result: &WorkflowResult) -> String {
    let origin = match email.origin {
        crate::models::EmailOrigin::Generated => "generated",
        crate::models::EmailOrigin::Fallback => "fallback",
    };

    format!(
        "# {subject}\n\n---\n\n**Subject:** {subject}\n\n---\n\n{body}\n\n---\n\n\
         ## Metadata\n\n\
         **Style:** {style}\n\
         **Origin:** {origin}\n\
         **Run:** {run_id}\n\
         **Drafted:** {drafted}\n",
        subject = email.subject,
        body = email.body,
        style = email.style_used,
        origin = origin,
        run_id = result.run_id,
        drafted = result.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
