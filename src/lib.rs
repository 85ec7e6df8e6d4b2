//! # Apply Harness
//!
//! A local-first job application drafting pipeline.
//!
//! Apply Harness extracts text from a resume and a job description (plain
//! text or PDF), caches the extracted text in SQLite keyed by content
//! fingerprint, runs a fixed sequence of analysis stages over a shared
//! context, picks an email style with a deterministic decision policy, and
//! drafts an application email (model-backed when a provider is configured,
//! templated otherwise).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────────┐   ┌──────────┐
//! │  Documents   │──▶│          Pipeline              │──▶│  Output  │
//! │ resume, job  │   │ parse ▶ analyze ▶ decide ▶    │   │ email.md │
//! │  (txt/pdf)   │   │          write email           │   │  + JSON  │
//! └──────┬───────┘   └───────────────────────────────┘   └──────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ SQLite cache │  content-fingerprint + mtime validation
//! └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! apply init                          # create the cache database
//! apply draft resume.pdf job.txt     # draft an email
//! apply cache info                   # inspect cached documents
//! ```
//!
//! Stages communicate only through the write-once [`context::SharedContext`];
//! each stage reads prior entries and appends exactly one of its own.

pub mod cache;
pub mod config;
pub mod context;
pub mod db;
pub mod email;
pub mod error;
pub mod export;
pub mod extract;
pub mod generation;
pub mod job;
pub mod models;
pub mod pipeline;
pub mod policy;
pub mod resume;
pub mod stage;
pub mod summary;
pub mod templates;
