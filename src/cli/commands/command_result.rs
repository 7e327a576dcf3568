use std::path::PathBuf;

use super::super::exit_status::ExitStatus;
use crate::ops::{
    backport::BackportSummary, merge::MergeSummary, normalize::NormalizeSummary,
    update::UpdateSummary, validate::ValidationSummary,
};

#[derive(Debug)]
pub enum CommandSummary {
    Update(UpdateSummary),
    Merge(MergeSummary),
    Validate(ValidationSummary),
    Normalize(NormalizeSummary),
    Backport(BackportSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
}

/// Result of running a strata command
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Invalid catalogs found by `validate`.
    pub error_count: usize,
    /// Files or languages skipped as unreadable.
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        if self.exit_on_errors && self.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
