//! The fixed shop-floor operations behind the station buttons.
//!
//! Each one resolves the work item first (aborting on failure), then builds
//! a step plan and runs it through [`run_plan`]. A binding missing from the
//! taxonomy fails only the step that needs it.

use crate::binding::{keys, tag_key_for, BindingTable};
use crate::client::{Attachment, TaskTracker};
use crate::engine::{run_plan, Call, PlannedStep};
use crate::error::{CoreError, Result};
use crate::policy;
use crate::reason::ReasonSelection;
use crate::report::Report;
use crate::session::Session;
use crate::workitem::{resolve_work_item, WorkItem};
use chrono::Utc;

/// Plan builder that knows which bindings are available.
struct Planner<'a> {
    bindings: &'a BindingTable,
    steps: Vec<PlannedStep<'a>>,
}

impl<'a> Planner<'a> {
    fn new(bindings: &'a BindingTable) -> Self {
        Self {
            bindings,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, description: impl Into<String>, call: Call<'a>) {
        self.steps.push(PlannedStep::new(description, call));
    }

    /// Push a step that needs the gid bound under `key`.
    fn push_bound(
        &mut self,
        description: impl Into<String>,
        key: &str,
        call: impl FnOnce(String) -> Call<'a>,
    ) {
        let step = match self.bindings.require(key) {
            Ok(gid) => PlannedStep::new(description, call(gid.to_string())),
            Err(e) => PlannedStep::unavailable(description, e.to_string()),
        };
        self.steps.push(step);
    }

    fn add_tag(&mut self, description: impl Into<String>, task: &str, key: &str) {
        let task = task.to_string();
        self.push_bound(description, key, |tag| Call::AddTag { task, tag });
    }

    fn assign(&mut self, description: impl Into<String>, task: &str, key: &str) {
        let task = task.to_string();
        self.push_bound(description, key, |user| Call::Assign { task, user });
    }

    fn move_to(&mut self, description: impl Into<String>, task: &str, key: &str) {
        let task = task.to_string();
        self.push_bound(description, key, |section| Call::MoveToSection {
            task,
            section,
        });
    }

    fn comment(&mut self, description: impl Into<String>, task: &str, text: String) {
        self.push(
            description,
            Call::Comment {
                task: task.to_string(),
                text,
            },
        );
    }

    fn reason(&mut self, task: &str, reason: &ReasonSelection, device: &str) {
        self.comment(
            "Adding reason comment",
            task,
            format!("{} ~{device}", reason.comment()),
        );
        if let Some(tag) = reason.tag_name() {
            self.add_tag(format!("Adding tag '{tag}'"), task, &tag_key_for(tag));
        }
    }
}

fn finish<C: TaskTracker>(
    session: &Session<C>,
    summary: String,
    planner: Planner<'_>,
    started: chrono::DateTime<Utc>,
) -> Report {
    let steps = run_plan(&session.client, planner.steps);
    let report = Report::new(summary, steps, started);
    tracing::info!(success = report.success, "{}", report.summary);
    report
}

fn resolve<C: TaskTracker>(session: &Session<C>, code: &str) -> Result<WorkItem> {
    resolve_work_item(&session.client, &session.bindings, code)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

pub fn heater_swap<C: TaskTracker>(session: &Session<C>, code: &str) -> Result<Report> {
    let started = Utc::now();
    let item = resolve(session, code)?;
    let child = item.child_gid.as_str();

    let mut plan = Planner::new(&session.bindings);
    plan.add_tag(
        "Adding tag 'Heater Board Replacement'",
        child,
        keys::HEATER_SWAP_TAGS,
    );
    plan.comment(
        "Adding comment",
        child,
        session.signed("Heater Board Swapped"),
    );
    Ok(finish(
        session,
        format!("Heater Board Swap for WIP {code} finished."),
        plan,
        started,
    ))
}

pub fn cleaned<C: TaskTracker>(session: &Session<C>, code: &str) -> Result<Report> {
    let started = Utc::now();
    let item = resolve(session, code)?;
    let child = item.child_gid.as_str();

    let mut plan = Planner::new(&session.bindings);
    plan.add_tag("Adding tag 'Cleaned'", child, keys::CLEANED_TAG);
    plan.comment("Adding comment", child, session.signed("Device Cleaned"));
    Ok(finish(
        session,
        format!("Device Cleaned for WIP {code} finished."),
        plan,
        started,
    ))
}

/// Attach a calibration certificate and hand the device off.
///
/// Without `manual_code` the certificate's file stem is taken as the WIP
/// code; if that fails to resolve the caller gets
/// [`CoreError::ManualCodeRequired`] and should ask for the code.
pub fn complete<C: TaskTracker>(
    session: &Session<C>,
    certificate: &Attachment,
    manual_code: Option<&str>,
) -> Result<Report> {
    let started = Utc::now();
    let manual_code = manual_code.map(str::trim).filter(|c| !c.is_empty());
    let code = manual_code.unwrap_or_else(|| certificate.stem());

    let item = match resolve(session, code) {
        Ok(item) => item,
        Err(e) if manual_code.is_none() => {
            return Err(CoreError::ManualCodeRequired {
                code: code.to_string(),
                source: Box::new(e),
            })
        }
        Err(e) => return Err(e),
    };
    let child = item.child_gid.as_str();
    let parent = item.parent_gid();

    let mut plan = Planner::new(&session.bindings);
    plan.push(
        "Uploading certificate",
        Call::Upload {
            task: child.to_string(),
            attachment: certificate,
        },
    );
    plan.assign("Assigning subtask", child, keys::SHARED_SUBTASK_ASSIGNEE);
    plan.add_tag(
        "Adding tag 'Device Calibrated'",
        child,
        keys::DEVICE_COMPLETE_TAG,
    );
    plan.comment(
        "Adding comment",
        child,
        session.signed("AUTO: Device Complete"),
    );
    if policy::in_root_project(&item.parent, &session.bindings) {
        plan.assign("Assigning parent task", parent, keys::ACCOUNT_MANAGER_ASSIGNEE);
        if session.bindings.single(keys::READY_FOR_BUYER_SECTION).is_some() {
            plan.move_to("Moving parent task", parent, keys::READY_FOR_BUYER_SECTION);
        }
    }
    Ok(finish(
        session,
        format!("Device Complete for '{code}' finished."),
        plan,
        started,
    ))
}

/// Set a device aside ("dead on the ground"), optionally placing the order
/// on hold.
///
/// Order holds only apply outside the root project; asking for one on a
/// root project item fails with [`CoreError::OrderHoldUnavailable`] before
/// anything is changed.
pub fn dog<C: TaskTracker>(
    session: &Session<C>,
    code: &str,
    reason: Option<&ReasonSelection>,
    order_hold: Option<&str>,
) -> Result<Report> {
    let started = Utc::now();
    let item = resolve(session, code)?;
    let child = item.child_gid.as_str();
    let order_hold = order_hold.map(str::trim).filter(|h| !h.is_empty());
    if order_hold.is_some() && !policy::order_hold_available(&item.parent, &session.bindings) {
        return Err(CoreError::OrderHoldUnavailable(code.to_string()));
    }

    let mut plan = Planner::new(&session.bindings);
    if let Some(hold) = order_hold {
        plan.assign("Assigning to Susan Hearon", child, keys::SUSAN_HEARON_USER);
        plan.add_tag("Adding tag 'Order Hold'", child, keys::ORDER_HOLD_TAG);
        plan.comment(
            "Adding ORDER HOLD comment",
            child,
            session.signed(&format!("AUTO: ORDER HOLD - {hold}")),
        );
    }
    plan.add_tag("Adding tag 'DOG'", child, keys::DOG_TAG);
    if let Some(reason) = reason {
        plan.reason(child, reason, &session.device);
    }
    Ok(finish(
        session,
        format!("Dog Operation for WIP {code} finished."),
        plan,
        started,
    ))
}

/// Return a device unrepaired (COR): tag it, mark its title and, for root
/// project orders, route the parent back to the account manager.
pub fn return_unrepaired<C: TaskTracker>(
    session: &Session<C>,
    code: &str,
    reason: &ReasonSelection,
) -> Result<Report> {
    let started = Utc::now();
    let item = resolve(session, code)?;
    let child = item.child_gid.as_str();
    let parent = item.parent_gid();
    let child_name = session.client.get_details(child)?.name;

    let mut plan = Planner::new(&session.bindings);
    plan.reason(child, reason, &session.device);
    plan.add_tag("Adding tag 'Return Unrepaired'", child, keys::COR_TAG);
    if let Some(title) = policy::cor_title(&child_name) {
        plan.push(
            "Renaming subtask",
            Call::Rename {
                task: child.to_string(),
                name: title,
            },
        );
    }
    if policy::in_root_project(&item.parent, &session.bindings) {
        if let Some(title) = policy::cor_title(&item.parent.name) {
            plan.push(
                "Renaming parent",
                Call::Rename {
                    task: parent.to_string(),
                    name: title,
                },
            );
        }
        plan.assign("Assigning parent", parent, keys::ACCOUNT_MANAGER_ASSIGNEE);
        plan.assign("Assigning subtask", child, keys::SHARED_SUBTASK_ASSIGNEE);
        plan.move_to("Moving parent", parent, keys::NEEDS_COR_SECTION);
    }
    Ok(finish(
        session,
        format!("COR Operation for WIP {code} finished."),
        plan,
        started,
    ))
}
