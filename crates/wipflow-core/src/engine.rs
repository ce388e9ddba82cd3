use crate::client::{ApiResult, Attachment, TaskTracker};
use crate::error::{CoreError, Result};
use crate::recipe::{Action, ActionKind, Recipe, Target};
use crate::report::{BatchFailure, BatchReport, Report, StepResult};
use crate::resolve::resolve_value;
use crate::session::Session;
use crate::workitem::{resolve_work_item, WorkItem};
use chrono::Utc;

pub const AUTO_PREFIX: &str = "AUTO: ";

// ---------------------------------------------------------------------------
// Step plans
// ---------------------------------------------------------------------------

/// One remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<'a> {
    AddTag { task: String, tag: String },
    RemoveTag { task: String, tag: String },
    Assign { task: String, user: String },
    Comment { task: String, text: String },
    Rename { task: String, name: String },
    MoveToSection { task: String, section: String },
    Upload { task: String, attachment: &'a Attachment },
}

impl Call<'_> {
    fn dispatch<C: TaskTracker + ?Sized>(&self, client: &C) -> ApiResult<()> {
        match self {
            Call::AddTag { task, tag } => client.add_tag(task, tag),
            Call::RemoveTag { task, tag } => client.remove_tag(task, tag),
            Call::Assign { task, user } => client.assign(task, user),
            Call::Comment { task, text } => client.comment(task, text),
            Call::Rename { task, name } => client.rename(task, name),
            Call::MoveToSection { task, section } => client.move_to_section(task, section),
            Call::Upload { task, attachment } => client.upload_attachment(task, attachment),
        }
    }
}

/// A described step whose call could not be prepared carries the reason
/// instead, and is reported as failed without touching the network.
#[derive(Debug, Clone)]
pub struct PlannedStep<'a> {
    pub description: String,
    pub call: std::result::Result<Call<'a>, String>,
}

impl<'a> PlannedStep<'a> {
    pub fn new(description: impl Into<String>, call: Call<'a>) -> Self {
        Self {
            description: description.into(),
            call: Ok(call),
        }
    }

    pub fn unavailable(description: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            call: Err(reason.into()),
        }
    }
}

/// Run every step in order. A failed step never stops the ones after it.
pub fn run_plan<C: TaskTracker + ?Sized>(client: &C, plan: Vec<PlannedStep<'_>>) -> Vec<StepResult> {
    plan.into_iter()
        .map(|step| {
            let outcome = match &step.call {
                Ok(call) => call.dispatch(client).map_err(|e| e.to_string()),
                Err(reason) => Err(reason.clone()),
            };
            match outcome {
                Ok(()) => StepResult::success(step.description),
                Err(msg) => {
                    tracing::warn!(step = %step.description, "step failed: {msg}");
                    StepResult::failed(step.description, msg)
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

fn plan_action<'a, C: TaskTracker>(
    session: &Session<C>,
    item: &WorkItem,
    action: &Action,
) -> PlannedStep<'a> {
    let target = action.effective_target();
    let task = match target {
        Target::Child => item.child_gid.clone(),
        Target::Parent => item.parent_gid().to_string(),
    };
    let value = &action.value;
    let description = match action.kind {
        ActionKind::AddTag => format!("Adding tag '{value}' to {target}"),
        ActionKind::RemoveTag => format!("Removing tag '{value}' from {target}"),
        ActionKind::AssignTo => format!("Assigning {target} to '{value}'"),
        ActionKind::MoveToSection => format!("Moving main task to section '{value}'"),
        ActionKind::AddComment => format!("Adding comment to {target}"),
    };

    // Comment text is sent as-is; every other value names a remote object.
    let argument = if action.kind == ActionKind::AddComment {
        Ok(format!("{AUTO_PREFIX}{value}"))
    } else {
        resolve_value(value, &session.taxonomy)
    };
    let argument = match argument {
        Ok(argument) => argument,
        Err(e) => {
            return PlannedStep::unavailable(
                format!("Action '{}' for '{value}'", action.kind),
                e.to_string(),
            )
        }
    };

    let call = match action.kind {
        ActionKind::AddTag => Call::AddTag { task, tag: argument },
        ActionKind::RemoveTag => Call::RemoveTag { task, tag: argument },
        ActionKind::AssignTo => Call::Assign { task, user: argument },
        ActionKind::MoveToSection => Call::MoveToSection {
            task,
            section: argument,
        },
        ActionKind::AddComment => Call::Comment {
            task,
            text: argument,
        },
    };
    PlannedStep::new(description, call)
}

fn audit_comment(recipe: &Recipe, device: &str) -> String {
    let lines = recipe
        .actions()
        .iter()
        .map(Action::audit_line)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{AUTO_PREFIX}Custom Recipe Executed:\n{lines}\n\n~{device}")
}

/// Run `recipe` against an already resolved work item.
pub fn execute<C: TaskTracker>(session: &Session<C>, item: &WorkItem, recipe: &Recipe) -> Report {
    let started = Utc::now();
    let plan = recipe
        .actions()
        .iter()
        .map(|action| plan_action(session, item, action))
        .collect();
    let steps = run_plan(&session.client, plan);

    // The audit trail is informational; its outcome does not count.
    if let Err(e) = session
        .client
        .comment(&item.child_gid, &audit_comment(recipe, &session.device))
    {
        tracing::warn!(code = %item.code, "audit comment failed: {e}");
    }

    let report = Report::new(
        format!("Custom operation for WIP {} finished.", item.code),
        steps,
        started,
    );
    tracing::info!(code = %item.code, success = report.success, "recipe executed");
    report
}

/// Resolve `code`, then run `recipe` against it.
pub fn run_recipe<C: TaskTracker>(session: &Session<C>, code: &str, recipe: &Recipe) -> Result<Report> {
    let item = resolve_work_item(&session.client, &session.bindings, code)?;
    Ok(execute(session, &item, recipe))
}

/// Run `recipe` once for every task carrying the cart tag.
///
/// Each task's name is used as its WIP code. Tasks run one after another;
/// a failure on one never stops the rest.
pub fn move_cart<C: TaskTracker>(
    session: &Session<C>,
    cart_tag: &str,
    recipe: &Recipe,
) -> Result<BatchReport> {
    let tag_gid = resolve_value(cart_tag, &session.taxonomy)?;
    let tasks = session.client.get_by_tag(&tag_gid)?;
    if tasks.is_empty() {
        return Err(CoreError::EmptyCart(cart_tag.to_string()));
    }
    tracing::info!(cart = cart_tag, tasks = tasks.len(), "moving cart");

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for task in tasks {
        match run_recipe(session, &task.name, recipe) {
            Ok(report) if report.success => succeeded.push(task.name),
            Ok(report) => failed.push(BatchFailure {
                task: task.name,
                message: report.to_string(),
            }),
            Err(e) => {
                tracing::warn!(task = %task.name, "cart task failed: {e}");
                failed.push(BatchFailure {
                    task: task.name,
                    message: e.to_string(),
                })
            }
        }
    }
    Ok(BatchReport::new(cart_tag, succeeded, failed))
}
