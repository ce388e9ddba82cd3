use crate::output::{print_json, print_table};
use crate::station::Station;
use wipflow_core::policy;
use wipflow_core::workitem::resolve_work_item;

/// Show the parent/subtask pair a WIP resolves to, without changing
/// anything.
pub fn run(station: &Station, device: Option<&str>, wip: &str, json: bool) -> anyhow::Result<()> {
    let session = station.open(device)?;
    let item = resolve_work_item(&session.client, &session.bindings, wip)?;
    let in_root = policy::in_root_project(&item.parent, &session.bindings);

    if json {
        let value = serde_json::json!({
            "code": item.code,
            "parent_gid": item.parent.gid,
            "parent_name": item.parent.name,
            "child_gid": item.child_gid,
            "in_root_project": in_root,
            "order_hold_available": policy::order_hold_available(&item.parent, &session.bindings),
        });
        return print_json(&value);
    }

    print_table(
        &["FIELD", "VALUE"],
        vec![
            vec!["wip".into(), item.code.clone()],
            vec!["parent".into(), format!("{} ({})", item.parent.name, item.parent.gid)],
            vec!["subtask".into(), item.child_gid.clone()],
            vec!["root project".into(), if in_root { "yes" } else { "no" }.into()],
        ],
    );
    Ok(())
}
