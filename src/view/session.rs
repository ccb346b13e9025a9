use crate::handlers::department::{Alert, AlertLevel, DepartmentController};
use crate::models::department::Department;
use crate::utils::validation::{format_errors, DepartmentForm};
use crate::view::{render_alert, render_details, render_form, render_summary, render_table, HELP};
use log::debug;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set(Field, String),
    ShowForm,
    Insert,
    Update,
    Delete,
    Search(Option<String>),
    List,
    Select(String),
    Edit(Option<String>),
    Clear,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Code,
    Name,
    Location,
    Manager,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let cmd = match word.to_lowercase().as_str() {
            "code" => Command::Set(Field::Code, rest.to_string()),
            "name" => Command::Set(Field::Name, rest.to_string()),
            "location" => Command::Set(Field::Location, rest.to_string()),
            "manager" => Command::Set(Field::Manager, rest.to_string()),
            "form" => Command::ShowForm,
            "insert" => Command::Insert,
            "update" => Command::Update,
            "delete" => Command::Delete,
            "search" => Command::Search(arg),
            "list" => Command::List,
            "select" => match arg {
                Some(code) => Command::Select(code),
                None => Command::Unknown(line.to_string()),
            },
            "edit" => Command::Edit(arg),
            "clear" => Command::Clear,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
        Some(cmd)
    }
}

/// An interactive department form bound to a controller.
///
/// Holds what a window would: the form fields, the last loaded table, the
/// selected row and the detail pane text. Update and delete ask for
/// confirmation on `input` before the controller is called.
pub struct Session<R, W> {
    controller: DepartmentController,
    input: R,
    output: W,
    form: DepartmentForm,
    rows: Vec<Department>,
    selected: Option<usize>,
    info: String,
    auto_confirm: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(controller: DepartmentController, input: R, output: W) -> Self {
        Session {
            controller,
            input,
            output,
            form: DepartmentForm::default(),
            rows: Vec::new(),
            selected: None,
            info: String::new(),
            auto_confirm: false,
        }
    }

    /// Skips confirmation prompts, treating every one as accepted.
    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    pub fn selected(&self) -> Option<&Department> {
        self.selected.and_then(|idx| self.rows.get(idx))
    }

    pub fn set_form(&mut self, form: DepartmentForm) {
        self.form = form;
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        let value = value.trim().to_string();
        match field {
            Field::Code => self.form.code = value,
            Field::Name => self.form.name = value,
            Field::Location => self.form.location_id = value,
            Field::Manager => self.form.manager_id = value,
        }
    }

    pub async fn run(&mut self) -> io::Result<()> {
        self.load_initial().await?;
        writeln!(self.output, "Department manager. Type `help` for commands.")?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            debug!("Command: {:?}", command);
            if !self.dispatch(command).await? {
                break;
            }
        }

        self.controller.shutdown().await;
        Ok(())
    }

    /// Runs one command. Returns false when the session should end.
    pub async fn dispatch(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Set(field, value) => self.set_field(field, &value),
            Command::ShowForm => self.show_form()?,
            Command::Insert => {
                self.insert().await?;
            }
            Command::Update => {
                self.update().await?;
            }
            Command::Delete => {
                self.delete().await?;
            }
            Command::Search(code) => {
                self.search(code.as_deref()).await?;
            }
            Command::List => {
                self.list().await?;
            }
            Command::Select(code) => {
                self.select(&code)?;
            }
            Command::Edit(code) => {
                self.edit(code.as_deref()).await?;
            }
            Command::Clear => self.clear_form(),
            Command::Reset => self.reset_info(),
            Command::Help => writeln!(self.output, "{}", HELP)?,
            Command::Quit => return Ok(false),
            Command::Unknown(text) => {
                let message = format!("'{}'. Type `help` for commands.", text);
                self.alert(&Alert::error("Unknown command", message))?
            }
        }
        Ok(true)
    }

    /// Fills the table without printing anything.
    pub async fn load_initial(&mut self) -> io::Result<()> {
        if let Some(rows) = self.controller.list_departments().await {
            self.rows = rows;
        }
        self.flush_alerts()?;
        Ok(())
    }

    pub async fn insert(&mut self) -> io::Result<bool> {
        let Some(dept) = self.validated()? else {
            return Ok(false);
        };

        let done = self.controller.insert_department(&dept).await;
        self.flush_alerts()?;
        if done {
            self.refresh().await?;
            self.clear_form();
        }
        Ok(done)
    }

    pub async fn update(&mut self) -> io::Result<bool> {
        let Some(dept) = self.validated()? else {
            return Ok(false);
        };

        let prompt = format!(
            "Are you sure you want to update the department with code: {}?",
            dept.code
        );
        if !self.confirm(&prompt)? {
            writeln!(self.output, "Update cancelled.")?;
            return Ok(false);
        }

        let done = self.controller.update_department(&dept).await;
        self.flush_alerts()?;
        if done {
            self.refresh().await?;
        }
        Ok(done)
    }

    pub async fn delete(&mut self) -> io::Result<bool> {
        let code = self.form.code.trim().to_string();
        if code.is_empty() {
            self.alert(&Alert::error("Error", "A department code is required."))?;
            return Ok(false);
        }

        let prompt = format!("Are you sure you want to delete the department with code: {}?", code);
        if !self.confirm(&prompt)? {
            writeln!(self.output, "Delete cancelled.")?;
            return Ok(false);
        }

        let done = self.controller.delete_department(&code).await;
        self.flush_alerts()?;
        if done {
            self.clear_form();
            self.refresh().await?;
        }
        Ok(done)
    }

    /// Looks a department up in the store and shows its details.
    pub async fn search(&mut self, code: Option<&str>) -> io::Result<Option<Department>> {
        let code = code.unwrap_or(&self.form.code).trim().to_string();
        if code.is_empty() {
            self.alert(&Alert::error("Error", "A department code is required to search."))?;
            return Ok(None);
        }

        let found = self.controller.find_department(&code).await;
        let failed = self.flush_alerts()?;
        match &found {
            Some(dept) => {
                self.selected = self.rows.iter().position(|row| row.code == dept.code);
                self.info = render_details(dept);
                writeln!(self.output, "{}", self.info)?;
            }
            None if failed => {}
            None => self.not_found(&code)?,
        }
        Ok(found)
    }

    pub async fn list(&mut self) -> io::Result<bool> {
        let Some(rows) = self.controller.list_departments().await else {
            self.flush_alerts()?;
            return Ok(false);
        };
        self.rows = rows;
        self.selected = None;
        self.info = render_summary(self.rows.len());

        if !self.rows.is_empty() {
            writeln!(self.output, "{}", render_table(&self.rows, self.selected))?;
        }
        writeln!(self.output, "{}", self.info)?;
        Ok(true)
    }

    /// Selects a row of the loaded table. Never touches the store.
    pub fn select(&mut self, code: &str) -> io::Result<bool> {
        let code = code.trim();
        match self.rows.iter().position(|row| row.code == code) {
            Some(idx) => {
                self.selected = Some(idx);
                self.info = render_details(&self.rows[idx]);
                writeln!(self.output, "{}", self.info)?;
                Ok(true)
            }
            None => {
                self.not_found(code)?;
                Ok(false)
            }
        }
    }

    /// Loads a department into the form, by code or from the selected row.
    pub async fn edit(&mut self, code: Option<&str>) -> io::Result<bool> {
        let code = code
            .map(str::to_string)
            .or_else(|| self.selected().map(|d| d.code.clone()));
        let code = match code {
            Some(code) => code,
            None => {
                self.alert(&Alert::error("Error", "Select a department or give a code to edit."))?;
                return Ok(false);
            }
        };

        match self.controller.find_department(&code).await {
            Some(dept) => {
                self.flush_alerts()?;
                self.form = DepartmentForm::from_department(&dept);
                self.show_form()?;
                Ok(true)
            }
            None => {
                if !self.flush_alerts()? {
                    self.not_found(&code)?;
                }
                Ok(false)
            }
        }
    }

    pub fn clear_form(&mut self) {
        self.form = DepartmentForm::default();
    }

    pub fn reset_info(&mut self) {
        self.info.clear();
        self.selected = None;
    }

    pub fn show_form(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", render_form(&self.form))
    }

    /// Writes every department as a JSON array.
    pub async fn export_json(&mut self) -> io::Result<bool> {
        let Some(rows) = self.controller.list_departments().await else {
            self.flush_alerts()?;
            return Ok(false);
        };
        let json = serde_json::to_string_pretty(&rows).map_err(io::Error::other)?;
        writeln!(self.output, "{}", json)?;
        Ok(true)
    }

    pub async fn shutdown(&mut self) {
        self.controller.shutdown().await;
    }

    fn validated(&mut self) -> io::Result<Option<Department>> {
        match self.form.to_department() {
            Ok(dept) => Ok(Some(dept)),
            Err(errors) => {
                write!(self.output, "{}", format_errors(&errors))?;
                Ok(None)
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        if self.auto_confirm {
            return Ok(true);
        }
        write!(self.output, "{} [y/N]: ", prompt)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    async fn refresh(&mut self) -> io::Result<()> {
        if let Some(rows) = self.controller.list_departments().await {
            self.rows = rows;
            self.selected = None;
            writeln!(self.output, "{}", render_table(&self.rows, self.selected))?;
        }
        self.flush_alerts()?;
        Ok(())
    }

    /// Writes the controller's queued alerts. Returns whether any was an error.
    fn flush_alerts(&mut self) -> io::Result<bool> {
        let mut failed = false;
        for alert in self.controller.take_alerts() {
            failed |= alert.level == AlertLevel::Error;
            writeln!(self.output, "{}", render_alert(&alert))?;
        }
        Ok(failed)
    }

    fn not_found(&mut self, code: &str) -> io::Result<()> {
        let message = format!("No department found with code: {}", code);
        self.alert(&Alert::error("Not found", message))
    }

    fn alert(&mut self, alert: &Alert) -> io::Result<()> {
        writeln!(self.output, "{}", render_alert(alert))
    }
}
