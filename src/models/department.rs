use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub code: String,
    pub name: String,
    pub location_id: i32,
    pub manager_id: i32,
}

impl Department {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        location_id: i32,
        manager_id: i32,
    ) -> Self {
        Department {
            code: code.into(),
            name: name.into(),
            location_id,
            manager_id,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Code: {}", self.code)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Location ID: {}", self.location_id)?;
        write!(f, "Manager ID: {}", self.manager_id)
    }
}
