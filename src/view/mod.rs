//! Terminal rendering of the department form, results table and detail pane.

pub mod session;

use crate::handlers::department::{Alert, AlertLevel};
use crate::models::department::Department;
use crate::utils::validation::DepartmentForm;
use comfy_table::{presets::ASCII_FULL, ContentArrangement, Table};

const RULE: &str = "==========================";

pub fn render_table(rows: &[Department], selected: Option<usize>) -> String {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "Code", "Name", "Location", "Manager"]);

    for (idx, dept) in rows.iter().enumerate() {
        let marker = if selected == Some(idx) { ">" } else { "" };
        table.add_row(vec![
            marker.to_string(),
            dept.code.clone(),
            dept.name.clone(),
            dept.location_id.to_string(),
            dept.manager_id.to_string(),
        ]);
    }

    table.to_string()
}

pub fn render_details(dept: &Department) -> String {
    format!("DEPARTMENT DETAILS\n{}\n{}\n", RULE, dept)
}

pub fn render_summary(count: usize) -> String {
    if count == 0 {
        return "No departments to show.".to_string();
    }
    format!(
        "DEPARTMENT LISTING\n{}\n{} departments loaded.\n\
         Use `edit <code>` to load a department into the form.",
        RULE, count
    )
}

pub fn render_form(form: &DepartmentForm) -> String {
    format!(
        "Department form\n  Code:     {}\n  Name:     {}\n  Location: {}\n  Manager:  {}",
        form.code, form.name, form.location_id, form.manager_id
    )
}

pub fn render_alert(alert: &Alert) -> String {
    let tag = match alert.level {
        AlertLevel::Info => "INFO",
        AlertLevel::Error => "ERROR",
    };
    format!("[{}] {}: {}", tag, alert.title, alert.message)
}

pub const HELP: &str = "\
Form fields:
  code <value>        set the department code
  name <value>        set the department name
  location <value>    set the location id
  manager <value>     set the manager id
  form                show the form
Actions:
  insert              insert the department in the form
  update              update the department in the form (asks first)
  delete              delete the department with the form's code (asks first)
  search [code]       look a department up and show its details
  list                reload and show every department
  select <code>       select a row of the table and show its details
  edit [code]         load a department (or the selected row) into the form
  clear               clear the form
  reset               clear the detail pane and the selection
  help                show this help
  quit                leave";
