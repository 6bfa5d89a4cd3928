//! # Pordisto (Authenticating Request Gateway)
//!
//! `pordisto` fronts a multi-tenant HTTP API and decides, for every inbound
//! request, *who* is making it and *whether* they may perform the requested
//! action, while shielding the backing store from repeated identity lookups
//! and limiting request volume per client.
//!
//! ## Pipeline
//!
//! Admission gate → credential extraction (bearer or basic, by route class)
//! → claims or static-credential verification → cache-aside identity
//! resolution → typed request-scoped principal → ownership/role guard →
//! handler. Each stage is an explicitly constructed, injected service; the
//! orchestrator in [`gateway`] only sequences them.
//!
//! ## Collaborators
//!
//! - **System of record** (`PostgreSQL`): users by numeric identity, roles
//!   by name.
//! - **Cache store** (Redis): one profile snapshot per identity with a
//!   freshness window; a failed population write fails the resolution.
//!
//! Credential failures surface as 401 without internal detail, privilege
//! denials as 403, admission denials as 429 with retry guidance, and
//! collaborator failures as 500. No failure is fatal to the process.

pub mod api;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
