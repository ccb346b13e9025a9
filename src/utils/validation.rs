use crate::models::department::Department;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Raw text of the four form fields, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct DepartmentForm {
    #[validate(length(min = 1, message = "Code cannot be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Location ID cannot be empty"),
        custom = "validate_location_id"
    )]
    pub location_id: String,
    #[validate(
        length(min = 1, message = "Manager ID cannot be empty"),
        custom = "validate_manager_id"
    )]
    pub manager_id: String,
}

/// Field order used when reporting errors.
const FIELDS: [&str; 4] = ["code", "name", "location_id", "manager_id"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl DepartmentForm {
    pub fn new(
        code: impl AsRef<str>,
        name: impl AsRef<str>,
        location_id: impl AsRef<str>,
        manager_id: impl AsRef<str>,
    ) -> Self {
        DepartmentForm {
            code: code.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
            location_id: location_id.as_ref().trim().to_string(),
            manager_id: manager_id.as_ref().trim().to_string(),
        }
    }

    pub fn from_department(dept: &Department) -> Self {
        DepartmentForm {
            code: dept.code.clone(),
            name: dept.name.clone(),
            location_id: dept.location_id.to_string(),
            manager_id: dept.manager_id.to_string(),
        }
    }

    /// Validates every field and builds the record.
    pub fn to_department(&self) -> Result<Department, Vec<FieldError>> {
        self.validate().map_err(|errors| field_errors(&errors))?;

        let location_id = parse_integer(&self.location_id)
            .map_err(|err| vec![field_error("location_id", &err)])?;
        let manager_id = parse_integer(&self.manager_id)
            .map_err(|err| vec![field_error("manager_id", &err)])?;

        Ok(Department::new(self.code.clone(), self.name.clone(), location_id, manager_id))
    }
}

fn parse_integer(value: &str) -> Result<i32, ValidationError> {
    value.trim().parse::<i32>().map_err(|_| ValidationError::new("integer"))
}

fn integer_field(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    parse_integer(value).map(|_| ()).map_err(|mut err| {
        err.message = Some(Cow::Borrowed(message));
        err
    })
}

fn validate_location_id(value: &str) -> Result<(), ValidationError> {
    integer_field(value, "Location ID must be an integer")
}

fn validate_manager_id(value: &str) -> Result<(), ValidationError> {
    integer_field(value, "Manager ID must be an integer")
}

fn field_error(field: &'static str, err: &ValidationError) -> FieldError {
    FieldError {
        field,
        message: err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid ({})", field, err.code)),
    }
}

/// Flattens validator output into one message per failing field, in form order.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    FIELDS
        .iter()
        .filter_map(|field| {
            by_field
                .get(field)
                .and_then(|errs| errs.first())
                .map(|err| field_error(*field, err))
        })
        .collect()
}

pub fn format_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = String::from("Please correct the following errors:\n");
    for err in errors {
        out.push_str("- ");
        out.push_str(&err.message);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn accepts_a_complete_form() {
        let form = DepartmentForm::new("D01", "Engineering", "100", "7");
        assert_eq!(
            form.to_department().unwrap(),
            Department::new("D01", "Engineering", 100, 7)
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let form = DepartmentForm::new("  D01 ", " Engineering", " 100", "7 ");
        assert_eq!(
            form.to_department().unwrap(),
            Department::new("D01", "Engineering", 100, 7)
        );
    }

    #[test]
    fn rejects_empty_code() {
        let errors = DepartmentForm::new("", "Engineering", "100", "7")
            .to_department()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["code"]);
        assert_eq!(errors[0].message, "Code cannot be empty");
    }

    #[test]
    fn rejects_blank_name() {
        let errors = DepartmentForm::new("D01", "   ", "100", "7").to_department().unwrap_err();
        assert_eq!(fields(&errors), vec!["name"]);
    }

    #[test]
    fn rejects_non_integer_location() {
        let errors = DepartmentForm::new("D01", "Engineering", "abc", "7")
            .to_department()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["location_id"]);
        assert_eq!(errors[0].message, "Location ID must be an integer");
    }

    #[test]
    fn rejects_fractional_manager() {
        let errors = DepartmentForm::new("D01", "Engineering", "100", "12.5")
            .to_department()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["manager_id"]);
        assert_eq!(errors[0].message, "Manager ID must be an integer");
    }

    #[test]
    fn empty_number_reports_emptiness_only() {
        let errors = DepartmentForm::new("D01", "Engineering", "", "7")
            .to_department()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Location ID cannot be empty");
    }

    #[test]
    fn reports_every_field_in_form_order() {
        let errors = DepartmentForm::default().to_department().unwrap_err();
        assert_eq!(fields(&errors), vec!["code", "name", "location_id", "manager_id"]);

        let text = format_errors(&errors);
        assert!(text.starts_with("Please correct the following errors:\n- Code cannot be empty\n"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn out_of_range_integer_is_rejected() {
        let errors = DepartmentForm::new("D01", "Engineering", "99999999999", "7")
            .to_department()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["location_id"]);
    }

    #[test]
    fn round_trips_through_a_record() {
        let dept = Department::new("D07", "Sales", -3, 0);
        assert_eq!(DepartmentForm::from_department(&dept).to_department().unwrap(), dept);
    }
}
