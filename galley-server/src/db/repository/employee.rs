//! Employee Repository

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::models::{Employee, EmployeeCreate};
use crate::utils::snowflake_id;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, name, role, employee_code FROM employees ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, role, employee_code FROM employees WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, role, employee_code FROM employees WHERE employee_code = ? LIMIT 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn create(pool: &SqlitePool, data: EmployeeCreate) -> RepoResult<Employee> {
    if find_by_code(pool, &data.employee_code).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Employee code \"{}\" already exists",
            data.employee_code
        )));
    }

    let id = snowflake_id();
    sqlx::query("INSERT INTO employees (id, name, role, employee_code) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(&data.name)
        .bind(&data.role)
        .bind(&data.employee_code)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE employees (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                employee_code TEXT NOT NULL UNIQUE
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn sample(code: &str) -> EmployeeCreate {
        EmployeeCreate {
            name: "Sari".to_string(),
            role: "Cashier".to_string(),
            employee_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let pool = test_pool().await;
        let e = create(&pool, sample("EMP-001")).await.unwrap();
        assert_eq!(e.employee_code, "EMP-001");

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Sari");
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let pool = test_pool().await;
        create(&pool, sample("EMP-001")).await.unwrap();
        let err = create(&pool, sample("EMP-001")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let pool = test_pool().await;
        create(&pool, sample("EMP-007")).await.unwrap();
        assert!(find_by_code(&pool, "EMP-007").await.unwrap().is_some());
        assert!(find_by_code(&pool, "EMP-404").await.unwrap().is_none());
    }
}
