use crate::db::ConnectionProvider;
use crate::errors::DbError;
use crate::models::department::Department;
use log::{debug, error};
use sqlx::AnyConnection;

/// SQL for one placeholder dialect.
struct Statements {
    insert: &'static str,
    update: &'static str,
    delete: &'static str,
    find: &'static str,
    list: &'static str,
}

/// Postgres numbers its parameters.
const NUMBERED: Statements = Statements {
    insert: "INSERT INTO departments (code, name, location_id, manager_id) VALUES ($1, $2, $3, $4)",
    update: "UPDATE departments SET name = $1, location_id = $2, manager_id = $3 WHERE code = $4",
    delete: "DELETE FROM departments WHERE code = $1",
    find: "SELECT * FROM departments WHERE code = $1",
    list: "SELECT * FROM departments",
};

/// SQLite and MySQL/MariaDB bind `?` in order.
const POSITIONAL: Statements = Statements {
    insert: "INSERT INTO departments (code, name, location_id, manager_id) VALUES (?, ?, ?, ?)",
    update: "UPDATE departments SET name = ?, location_id = ?, manager_id = ? WHERE code = ?",
    delete: "DELETE FROM departments WHERE code = ?",
    find: "SELECT * FROM departments WHERE code = ?",
    list: "SELECT * FROM departments",
};

fn statements(conn: &AnyConnection) -> &'static Statements {
    if conn.backend_name().eq_ignore_ascii_case("PostgreSQL") {
        &NUMBERED
    } else {
        &POSITIONAL
    }
}

/// CRUD access to the `departments` table.
///
/// Every call runs a single auto-committed statement on the provider's
/// connection.
pub struct DepartmentRepository {
    provider: ConnectionProvider,
}

impl DepartmentRepository {
    pub fn new(provider: ConnectionProvider) -> Self {
        DepartmentRepository { provider }
    }

    pub fn provider_mut(&mut self) -> &mut ConnectionProvider {
        &mut self.provider
    }

    pub async fn insert(&mut self, dept: &Department) -> Result<bool, DbError> {
        let result = async {
            let conn = self.provider.get_connection().await?;
            let done = sqlx::query(statements(conn).insert)
                .bind(&dept.code)
                .bind(&dept.name)
                .bind(dept.location_id)
                .bind(dept.manager_id)
                .execute(&mut *conn)
                .await?;
            Ok::<_, DbError>(done.rows_affected() == 1)
        }
        .await;

        self.finish("insert", &dept.code, result)
    }

    pub async fn update(&mut self, dept: &Department) -> Result<bool, DbError> {
        let result = async {
            let conn = self.provider.get_connection().await?;
            let done = sqlx::query(statements(conn).update)
                .bind(&dept.name)
                .bind(dept.location_id)
                .bind(dept.manager_id)
                .bind(&dept.code)
                .execute(&mut *conn)
                .await?;
            Ok::<_, DbError>(done.rows_affected() > 0)
        }
        .await;

        self.finish("update", &dept.code, result)
    }

    pub async fn delete(&mut self, code: &str) -> Result<bool, DbError> {
        let result = async {
            let conn = self.provider.get_connection().await?;
            let done = sqlx::query(statements(conn).delete)
                .bind(code)
                .execute(&mut *conn)
                .await?;
            Ok::<_, DbError>(done.rows_affected() > 0)
        }
        .await;

        self.finish("delete", code, result)
    }

    pub async fn find_by_code(&mut self, code: &str) -> Result<Option<Department>, DbError> {
        let result = async {
            let conn = self.provider.get_connection().await?;
            let dept = sqlx::query_as::<_, Department>(statements(conn).find)
                .bind(code)
                .fetch_optional(&mut *conn)
                .await?;
            Ok::<_, DbError>(dept)
        }
        .await;

        self.finish("find", code, result)
    }

    pub async fn list_all(&mut self) -> Result<Vec<Department>, DbError> {
        let result = async {
            let conn = self.provider.get_connection().await?;
            let departments = sqlx::query_as::<_, Department>(statements(conn).list)
                .fetch_all(&mut *conn)
                .await?;
            Ok::<_, DbError>(departments)
        }
        .await;

        self.finish("list", "*", result)
    }

    fn finish<T: std::fmt::Debug>(
        &mut self,
        op: &str,
        code: &str,
        result: Result<T, DbError>,
    ) -> Result<T, DbError> {
        match &result {
            Ok(value) => debug!("{} department {} -> {:?}", op, code, value),
            Err(err) => {
                error!("Failed to {} department {}: {}", op, code, err);
                if err.is_connectivity() {
                    self.provider.invalidate();
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{temp_db_url, MEMORY_URL};

    async fn repository() -> DepartmentRepository {
        let mut provider = ConnectionProvider::new(MEMORY_URL);
        provider.init_schema().await.unwrap();
        DepartmentRepository::new(provider)
    }

    fn engineering() -> Department {
        Department::new("D01", "Engineering", 100, 7)
    }

    #[tokio::test]
    async fn insert_then_find_returns_the_same_record() {
        let mut repo = repository().await;

        assert!(repo.insert(&engineering()).await.unwrap());
        assert_eq!(repo.find_by_code("D01").await.unwrap(), Some(engineering()));
    }

    #[tokio::test]
    async fn find_missing_code_is_none() {
        let mut repo = repository().await;
        assert_eq!(repo.find_by_code("ZZZ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_code_is_a_constraint_error() {
        let mut repo = repository().await;
        repo.insert(&engineering()).await.unwrap();

        let err = repo
            .insert(&Department::new("D01", "Sales", 200, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)), "unexpected error: {err:?}");
        assert_eq!(repo.find_by_code("D01").await.unwrap(), Some(engineering()));
    }

    #[tokio::test]
    async fn update_missing_code_returns_false_and_leaves_rows_alone() {
        let mut repo = repository().await;
        repo.insert(&engineering()).await.unwrap();

        let updated = repo
            .update(&Department::new("D99", "Ghost", 1, 1))
            .await
            .unwrap();
        assert!(!updated);
        assert_eq!(repo.list_all().await.unwrap(), vec![engineering()]);
    }

    #[tokio::test]
    async fn update_changes_fields_by_code() {
        let mut repo = repository().await;
        repo.insert(&engineering()).await.unwrap();

        let changed = Department::new("D01", "R&D", 150, 8);
        assert!(repo.update(&changed).await.unwrap());
        assert_eq!(repo.find_by_code("D01").await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn delete_missing_code_returns_false() {
        let mut repo = repository().await;
        assert!(!repo.delete("D99").await.unwrap());
    }

    #[tokio::test]
    async fn insert_then_delete_leaves_nothing_behind() {
        let mut repo = repository().await;
        repo.insert(&engineering()).await.unwrap();

        assert!(repo.delete("D01").await.unwrap());
        assert_eq!(repo.find_by_code("D01").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_counts_surviving_inserts() {
        let mut repo = repository().await;
        for (i, code) in ["D01", "D02", "D03", "D04"].iter().enumerate() {
            let dept = Department::new(*code, format!("Dept {i}"), 100 + i as i32, i as i32);
            assert!(repo.insert(&dept).await.unwrap());
        }
        let _ = repo.insert(&Department::new("D02", "Duplicate", 0, 0)).await;
        repo.delete("D03").await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|d| d.code != "D03"));
    }

    #[tokio::test]
    async fn missing_column_is_a_mapping_error() {
        let mut provider = ConnectionProvider::new(MEMORY_URL);
        {
            let conn = provider.get_connection().await.unwrap();
            sqlx::query(
                "CREATE TABLE departments \
                 (code VARCHAR(20) PRIMARY KEY, name VARCHAR(50), location_id INTEGER)",
            )
            .execute(&mut *conn)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO departments (code, name, location_id) \
                 VALUES ('D01', 'Engineering', 100)",
            )
            .execute(&mut *conn)
            .await
            .unwrap();
        }
        let mut repo = DepartmentRepository::new(provider);

        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, DbError::Mapping(_)), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn missing_table_fails_without_panicking() {
        let mut repo = DepartmentRepository::new(ConnectionProvider::new(MEMORY_URL));
        assert!(repo.find_by_code("D01").await.is_err());
        assert!(repo.provider.conn.is_some());
    }

    #[tokio::test]
    async fn sqlite_binds_positional_parameters() {
        let mut repo = repository().await;
        let conn = repo.provider.get_connection().await.unwrap();
        assert_eq!(statements(conn).find, POSITIONAL.find);
    }

    #[test]
    fn dialects_bind_the_same_parameters() {
        for (numbered, positional) in [
            (NUMBERED.insert, POSITIONAL.insert),
            (NUMBERED.update, POSITIONAL.update),
            (NUMBERED.delete, POSITIONAL.delete),
            (NUMBERED.find, POSITIONAL.find),
            (NUMBERED.list, POSITIONAL.list),
        ] {
            assert_eq!(numbered.matches('$').count(), positional.matches('?').count());
            assert!(!numbered.contains('?'));
            assert!(!positional.contains('$'));
        }
    }

    #[tokio::test]
    async fn invalidated_connection_is_reopened() {
        let mut provider = ConnectionProvider::new(temp_db_url("invalidate"));
        provider.init_schema().await.unwrap();
        let mut repo = DepartmentRepository::new(provider);
        assert!(repo.insert(&engineering()).await.unwrap());

        repo.provider.invalidate();
        assert!(repo.provider.conn.is_none());

        assert_eq!(repo.find_by_code("D01").await.unwrap(), Some(engineering()));
        assert!(repo.provider.conn.is_some());
    }

    #[tokio::test]
    async fn connectivity_failure_drops_the_connection() {
        let mut repo = repository().await;
        assert!(repo.provider.conn.is_some());

        let result: Result<bool, DbError> =
            repo.finish("insert", "D01", Err(DbError::Connection("reset by peer".to_string())));
        assert!(matches!(result, Err(DbError::Connection(_))));
        assert!(repo.provider.conn.is_none());
    }

    #[tokio::test]
    async fn data_failure_keeps_the_connection() {
        let mut repo = repository().await;

        let result: Result<bool, DbError> =
            repo.finish("update", "D01", Err(DbError::Data("value too long".to_string())));
        assert!(matches!(result, Err(DbError::Data(_))));
        assert!(repo.provider.conn.is_some());
    }
}
