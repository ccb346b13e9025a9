use crate::db::department::DepartmentRepository;
use crate::errors::DbError;
use crate::models::department::Department;
use log::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Error,
}

/// A message the view owes the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert { level: AlertLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Alert { level: AlertLevel::Error, title: title.into(), message: message.into() }
    }
}

/// Turns user actions into repository calls.
///
/// Store failures stop here: each operation reports `false` or `None` and
/// queues an [`Alert`] for the view instead of returning the error.
/// Confirmation for update and delete is the caller's job.
pub struct DepartmentController {
    repository: DepartmentRepository,
    alerts: Vec<Alert>,
}

impl DepartmentController {
    pub fn new(repository: DepartmentRepository) -> Self {
        DepartmentController { repository, alerts: Vec::new() }
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub async fn insert_department(&mut self, dept: &Department) -> bool {
        match self.repository.insert(dept).await {
            Ok(true) => {
                info!("Inserted department {}", dept.code);
                self.alerts.push(Alert::info("Success", "Department inserted successfully."));
                true
            }
            Ok(false) => {
                let message = format!("Department {} was not inserted.", dept.code);
                self.alerts.push(Alert::error("Error", message));
                false
            }
            Err(err) => self.report("insert the department", err),
        }
    }

    pub async fn update_department(&mut self, dept: &Department) -> bool {
        match self.repository.update(dept).await {
            Ok(true) => {
                info!("Updated department {}", dept.code);
                self.alerts.push(Alert::info("Success", "Department updated successfully."));
                true
            }
            Ok(false) => {
                let message = format!("No department found with code: {}", dept.code);
                self.alerts.push(Alert::error("Not found", message));
                false
            }
            Err(err) => self.report("update the department", err),
        }
    }

    pub async fn delete_department(&mut self, code: &str) -> bool {
        match self.repository.delete(code).await {
            Ok(true) => {
                info!("Deleted department {}", code);
                self.alerts.push(Alert::info("Success", "Department deleted successfully."));
                true
            }
            Ok(false) => {
                let message = format!("No department found with code: {}", code);
                self.alerts.push(Alert::error("Not found", message));
                false
            }
            Err(err) => self.report("delete the department", err),
        }
    }

    /// Looks a department up by code. Absence is not an error and raises no alert.
    pub async fn find_department(&mut self, code: &str) -> Option<Department> {
        match self.repository.find_by_code(code).await {
            Ok(found) => found,
            Err(err) => {
                self.report("look up the department", err);
                None
            }
        }
    }

    pub async fn list_departments(&mut self) -> Option<Vec<Department>> {
        match self.repository.list_all().await {
            Ok(departments) => Some(departments),
            Err(err) => {
                self.report("load the departments", err);
                None
            }
        }
    }

    pub async fn shutdown(&mut self) {
        self.repository.provider_mut().close().await;
    }

    fn report(&mut self, action: &str, err: DbError) -> bool {
        error!("Could not {}: {}", action, err);
        let title = match &err {
            DbError::Connection(_) => "Connection error",
            DbError::Constraint(_) => "Constraint error",
            DbError::Data(_) | DbError::Mapping(_) => "Database error",
        };
        self.alerts.push(Alert::error(title, format!("Could not {}. {}", action, err)));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::MEMORY_URL;
    use crate::db::ConnectionProvider;

    async fn controller() -> DepartmentController {
        let mut provider = ConnectionProvider::new(MEMORY_URL);
        provider.init_schema().await.unwrap();
        DepartmentController::new(DepartmentRepository::new(provider))
    }

    fn levels(alerts: &[Alert]) -> Vec<AlertLevel> {
        alerts.iter().map(|a| a.level).collect()
    }

    #[tokio::test]
    async fn crud_scenario() {
        let mut ctl = controller().await;
        let dept = Department::new("D01", "Engineering", 100, 7);

        assert!(ctl.insert_department(&dept).await);
        assert_eq!(ctl.find_department("D01").await, Some(dept.clone()));

        let renamed = Department { name: "R&D".to_string(), ..dept };
        assert!(ctl.update_department(&renamed).await);
        assert_eq!(ctl.find_department("D01").await.unwrap().name, "R&D");

        assert!(ctl.delete_department("D01").await);
        assert_eq!(ctl.find_department("D01").await, None);

        assert_eq!(levels(&ctl.take_alerts()), vec![AlertLevel::Info; 3]);
    }

    #[tokio::test]
    async fn duplicate_insert_reports_instead_of_failing() {
        let mut ctl = controller().await;
        let dept = Department::new("D01", "Engineering", 100, 7);
        assert!(ctl.insert_department(&dept).await);
        ctl.take_alerts();

        assert!(!ctl.insert_department(&dept).await);
        let alerts = ctl.take_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[0].title, "Constraint error");
        assert_eq!(ctl.list_departments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_code_is_a_plain_false() {
        let mut ctl = controller().await;

        assert!(!ctl.update_department(&Department::new("D99", "Ghost", 1, 1)).await);
        assert!(!ctl.delete_department("D99").await);

        let alerts = ctl.take_alerts();
        assert!(alerts.iter().all(|a| a.title == "Not found"));
        assert!(ctl.take_alerts().is_empty());
    }

    #[tokio::test]
    async fn find_missing_code_raises_no_alert() {
        let mut ctl = controller().await;
        assert_eq!(ctl.find_department("nope").await, None);
        assert!(ctl.take_alerts().is_empty());
    }

    #[tokio::test]
    async fn store_failures_become_none() {
        let repository = DepartmentRepository::new(ConnectionProvider::new(MEMORY_URL));
        let mut ctl = DepartmentController::new(repository);

        assert_eq!(ctl.list_departments().await, None);
        assert_eq!(ctl.find_department("D01").await, None);

        let alerts = ctl.take_alerts();
        assert_eq!(levels(&alerts), vec![AlertLevel::Error, AlertLevel::Error]);
        assert!(alerts[0].message.starts_with("Could not load the departments."));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_connection_error() {
        let provider =
            ConnectionProvider::new("sqlite:///nonexistent-dir/for/sure/departments.db?mode=ro");
        let mut ctl = DepartmentController::new(DepartmentRepository::new(provider));

        assert!(!ctl.insert_department(&Department::new("D01", "Engineering", 100, 7)).await);
        let alerts = ctl.take_alerts();
        assert_eq!(alerts[0].title, "Connection error");
    }
}
