use crate::errors::{AppError, Result};

/// What happened to one orchestration step.
#[derive(Debug)]
pub enum StepOutcome {
    Succeeded,
    Failed(AppError),
    /// Not attempted because an earlier step failed.
    Skipped,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

impl From<Result<()>> for StepOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e),
        }
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Succeeded => f.write_str("succeeded"),
            StepOutcome::Failed(e) => write!(f, "failed ({})", e),
            StepOutcome::Skipped => f.write_str("skipped"),
        }
    }
}
