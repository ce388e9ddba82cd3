//! In-memory [`TaskTracker`] and fixtures shared by unit tests.

use crate::client::{
    ApiError, ApiResult, Attachment, GidRef, TaskDetails, TaskRef, TaskSummary, TaskTracker,
};
use crate::taxonomy::{NamedItem, Project, Taxonomy};
use std::cell::RefCell;

#[derive(Debug, Clone)]
pub struct FakeTask {
    pub gid: String,
    pub name: String,
    pub parent: Option<String>,
    pub tags: Vec<String>,
    pub projects: Vec<String>,
    /// Extra searchable text, like a task description.
    pub notes: String,
}

/// Records every call as `"<op> <args..>"`; any call containing one of the
/// `fail_on` fragments returns an error instead.
#[derive(Default)]
pub struct FakeTracker {
    pub tasks: Vec<FakeTask>,
    pub fail_on: Vec<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTracker {
    pub fn task(&mut self, gid: &str, name: &str, parent: Option<&str>) -> &mut FakeTask {
        self.tasks.push(FakeTask {
            gid: gid.into(),
            name: name.into(),
            parent: parent.map(str::to_string),
            tags: vec![],
            projects: vec![],
            notes: String::new(),
        });
        self.tasks.last_mut().expect("just pushed")
    }

    pub fn fail(&mut self, fragment: &str) {
        self.fail_on.push(fragment.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        const READS: [&str; 4] = ["search ", "details ", "children ", "by_tag "];
        self.calls()
            .into_iter()
            .filter(|c| !READS.iter().any(|r| c.starts_with(r)))
            .collect()
    }

    fn record(&self, call: String) -> ApiResult<()> {
        let failed = self.fail_on.iter().any(|f| call.contains(f.as_str()));
        self.calls.borrow_mut().push(call);
        if failed {
            Err(ApiError::Status {
                status: 500,
                reason: "Internal Server Error".into(),
                body: "boom".into(),
            })
        } else {
            Ok(())
        }
    }

    fn find(&self, gid: &str) -> ApiResult<&FakeTask> {
        self.tasks
            .iter()
            .find(|t| t.gid == gid)
            .ok_or(ApiError::NotFound { body: gid.into() })
    }
}

impl TaskTracker for FakeTracker {
    fn search_by_text(&self, text: &str) -> ApiResult<Vec<TaskSummary>> {
        self.record(format!("search {text}"))?;
        let needle = text.to_lowercase();
        Ok(self
            .tasks
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle) || t.notes.to_lowercase().contains(&needle)
            })
            .map(|t| TaskSummary {
                gid: t.gid.clone(),
                name: t.name.clone(),
                parent: t.parent.as_ref().map(|p| TaskRef::new(p.clone(), "")),
            })
            .collect())
    }

    fn get_details(&self, task_gid: &str) -> ApiResult<TaskDetails> {
        self.record(format!("details {task_gid}"))?;
        let t = self.find(task_gid)?;
        Ok(TaskDetails {
            gid: t.gid.clone(),
            name: t.name.clone(),
            tags: t.tags.iter().map(|g| GidRef { gid: g.clone() }).collect(),
            projects: t.projects.iter().map(|g| GidRef { gid: g.clone() }).collect(),
        })
    }

    fn get_children(&self, task_gid: &str) -> ApiResult<Vec<TaskRef>> {
        self.record(format!("children {task_gid}"))?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.parent.as_deref() == Some(task_gid))
            .map(|t| TaskRef::new(t.gid.clone(), t.name.clone()))
            .collect())
    }

    fn get_by_tag(&self, tag_gid: &str) -> ApiResult<Vec<TaskRef>> {
        self.record(format!("by_tag {tag_gid}"))?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.tags.iter().any(|g| g == tag_gid))
            .map(|t| TaskRef::new(t.gid.clone(), t.name.clone()))
            .collect())
    }

    fn add_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()> {
        self.record(format!("add_tag {task_gid} {tag_gid}"))
    }

    fn remove_tag(&self, task_gid: &str, tag_gid: &str) -> ApiResult<()> {
        self.record(format!("remove_tag {task_gid} {tag_gid}"))
    }

    fn assign(&self, task_gid: &str, user_gid: &str) -> ApiResult<()> {
        self.record(format!("assign {task_gid} {user_gid}"))
    }

    fn comment(&self, task_gid: &str, text: &str) -> ApiResult<()> {
        self.record(format!("comment {task_gid} {text}"))
    }

    fn rename(&self, task_gid: &str, name: &str) -> ApiResult<()> {
        self.record(format!("rename {task_gid} {name}"))
    }

    fn move_to_section(&self, task_gid: &str, section_gid: &str) -> ApiResult<()> {
        self.record(format!("move {task_gid} {section_gid}"))
    }

    fn upload_attachment(&self, task_gid: &str, attachment: &Attachment) -> ApiResult<()> {
        self.record(format!("upload {task_gid} {}", attachment.file_name))
    }
}

/// A snapshot with every default binding present.
///
/// gids: root project 100 (sections 101 Ready for Buyer, 102 Needs COR);
/// tags 2xx; users 3xx.
pub fn full_taxonomy() -> Taxonomy {
    Taxonomy {
        workspace_id: Some("1".into()),
        projects: vec![
            Project {
                gid: "100".into(),
                name: "AMAT AGS".into(),
                sections: vec![
                    NamedItem::new("101", "Ready for Buyer"),
                    NamedItem::new("102", "Needs COR"),
                ],
            },
            Project {
                gid: "110".into(),
                name: "Repairs".into(),
                sections: vec![NamedItem::new("111", "Shipping")],
            },
        ],
        tags: vec![
            NamedItem::new("200", "Heater Board Replacement"),
            NamedItem::new("201", "Order Hold"),
            NamedItem::new("202", "DOG"),
            NamedItem::new("203", "Device Calibrated"),
            NamedItem::new("204", "Return Unrepaired"),
            NamedItem::new("205", "PURGE"),
            NamedItem::new("206", "Bad Sensor"),
            NamedItem::new("207", "Cleaned"),
            NamedItem::new("208", "Cart 7"),
            NamedItem::new("209", "Negative ReadError"),
        ],
        users: vec![
            NamedItem::new("300", "Susan Hearon"),
            NamedItem::new("301", "Michelle Hughes"),
            NamedItem::new("302", "Mandy McIntosh"),
        ],
    }
}
