use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// StepResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub description: String,
    pub outcome: Outcome,
}

impl StepResult {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            outcome: Outcome::Success,
        }
    }

    pub fn failed(description: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            outcome: Outcome::Failed(message.into()),
        }
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success => write!(f, "• {}: Success", self.description),
            Outcome::Failed(msg) => write!(f, "• {}: FAILED: {}", self.description, msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result of one operation on one work item. `success` is true only when
/// every step succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: String,
    pub steps: Vec<StepResult>,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Report {
    pub fn new(summary: impl Into<String>, steps: Vec<StepResult>, started_at: DateTime<Utc>) -> Self {
        let success = steps.iter().all(|s| s.outcome.is_success());
        Self {
            summary: summary.into(),
            steps,
            success,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| !s.outcome.is_success())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;
        if !self.steps.is_empty() {
            write!(f, "\n\n--- Details ---")?;
            for step in &self.steps {
                write!(f, "\n{step}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BatchReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub task: String,
    pub message: String,
}

/// Result of running one recipe over every task in a cart.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub cart: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
    pub success: bool,
}

impl BatchReport {
    pub fn new(cart: impl Into<String>, succeeded: Vec<String>, failed: Vec<BatchFailure>) -> Self {
        Self {
            cart: cart.into(),
            success: !succeeded.is_empty(),
            succeeded,
            failed,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Move Cart '{}' complete. Success: {}, Failed: {}.",
            self.cart,
            self.succeeded.len(),
            self.failed.len()
        )?;
        if !self.failed.is_empty() {
            write!(f, "\n\n--- Failures ---")?;
            for failure in &self.failed {
                write!(f, "\n• {}: {}", failure.task, failure.message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_and_of_steps() {
        let ok = Report::new(
            "done",
            vec![StepResult::success("a"), StepResult::success("b")],
            Utc::now(),
        );
        assert!(ok.success);

        let mixed = Report::new(
            "done",
            vec![StepResult::success("a"), StepResult::failed("b", "boom")],
            Utc::now(),
        );
        assert!(!mixed.success);
        assert_eq!(mixed.failures().count(), 1);
    }

    #[test]
    fn report_display_lists_details() {
        let report = Report::new(
            "Custom operation for WIP W1 finished.",
            vec![
                StepResult::success("Adding tag 'DOG' to subtask"),
                StepResult::failed("Action 'assign_to' for 'Nobody'", "not found"),
            ],
            Utc::now(),
        );
        assert_eq!(
            report.to_string(),
            "Custom operation for WIP W1 finished.\n\n--- Details ---\n\
             • Adding tag 'DOG' to subtask: Success\n\
             • Action 'assign_to' for 'Nobody': FAILED: not found"
        );
    }

    #[test]
    fn batch_success_needs_one_success() {
        let none = BatchReport::new("Cart 1", vec![], vec![]);
        assert!(!none.success);
        let one = BatchReport::new(
            "Cart 1",
            vec!["A".into()],
            vec![BatchFailure {
                task: "B".into(),
                message: "x".into(),
            }],
        );
        assert!(one.success);
        assert!(one.to_string().contains("Success: 1, Failed: 1."));
        assert!(one.to_string().ends_with("• B: x"));
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_value(StepResult::failed("x", "why")).unwrap();
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["message"], "why");
    }
}
