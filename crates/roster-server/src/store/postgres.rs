//! PostgreSQL employee store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{BatchReport, EmployeePage, EmployeeStore, StoreError};
use crate::db::is_unique_violation;
use crate::models::{Employee, EmployeeField, NewEmployee};

const INSERT_ONE: &str = r#"
    INSERT INTO employees
        (first_name, last_name, company_name, address, city, county, postal, phone, email, web)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING id, first_name, last_name, company_name, address, city, county, postal,
              phone, email, web, created_at, updated_at
"#;

const INSERT_MANY: &str = r#"
    INSERT INTO employees
        (first_name, last_name, company_name, address, city, county, postal, phone, email, web)
    SELECT * FROM UNNEST(
        $1::text[], $2::text[], $3::text[], $4::text[], $5::text[],
        $6::text[], $7::text[], $8::text[], $9::text[], $10::text[]
    )
"#;

const SELECT_COLUMNS: &str = "id, first_name, last_name, company_name, address, city, county, \
                              postal, phone, email, web, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whole-batch insert with one statement, binding each column as an array.
    async fn insert_many(
        tx: &mut Transaction<'_, Postgres>,
        records: &[NewEmployee],
    ) -> Result<u64, sqlx::Error> {
        let column = |field: EmployeeField| -> Vec<String> {
            records.iter().map(|r| r.get(field).to_string()).collect()
        };

        let mut query = sqlx::query(INSERT_MANY);
        for field in EmployeeField::ALL {
            query = query.bind(column(field));
        }

        let result = query.execute(&mut **tx).await?;

        Ok(result.rows_affected())
    }

    async fn insert_one(
        tx: &mut Transaction<'_, Postgres>,
        record: &NewEmployee,
    ) -> Result<(), sqlx::Error> {
        bind_record(sqlx::query_as::<_, Employee>(INSERT_ONE), record)
            .fetch_one(&mut **tx)
            .await
            .map(|_| ())
    }

    async fn page(
        &self,
        filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<EmployeePage, StoreError> {
        let where_clause = if filter.is_some() {
            "WHERE first_name ILIKE $1 ESCAPE '\\' OR last_name ILIKE $1 ESCAPE '\\' \
             OR email ILIKE $1 ESCAPE '\\' OR company_name ILIKE $1 ESCAPE '\\'"
        } else {
            ""
        };
        let pattern = filter.map(|q| format!("%{}%", escape_like(q)));
        let (limit_param, offset_param) = if filter.is_some() { ("$2", "$3") } else { ("$1", "$2") };

        let count_sql = format!("SELECT COUNT(*) FROM employees {where_clause}");
        let list_sql = format!(
            "SELECT {SELECT_COLUMNS} FROM employees {where_clause} \
             ORDER BY id LIMIT {limit_param} OFFSET {offset_param}"
        );

        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut list = sqlx::query_as::<_, Employee>(&list_sql);
        if let Some(ref pattern) = pattern {
            count = count.bind(pattern);
            list = list.bind(pattern);
        }

        let total = count.fetch_one(&self.pool).await?;
        let employees = list.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(EmployeePage { employees, total })
    }
}

fn bind_record<'q>(
    query: sqlx::query::QueryAs<'q, Postgres, Employee, sqlx::postgres::PgArguments>,
    record: &'q NewEmployee,
) -> sqlx::query::QueryAs<'q, Postgres, Employee, sqlx::postgres::PgArguments> {
    query
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.company_name)
        .bind(&record.address)
        .bind(&record.city)
        .bind(&record.county)
        .bind(&record.postal)
        .bind(&record.phone)
        .bind(&record.email)
        .bind(&record.web)
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_write_error(err: sqlx::Error, email: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::UniqueViolation {
            email: email.to_string(),
        }
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    #[tracing::instrument(skip(self, record), fields(email = %record.email))]
    async fn create_one(&self, record: &NewEmployee) -> Result<Employee, StoreError> {
        bind_record(sqlx::query_as::<_, Employee>(INSERT_ONE), record)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &record.email))
    }

    #[tracing::instrument(skip(self, records), fields(batch = records.len()))]
    async fn create_batch(&self, records: &[NewEmployee]) -> Result<BatchReport, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SAVEPOINT bulk_insert").execute(&mut *tx).await?;
        match Self::insert_many(&mut tx, records).await {
            Ok(inserted) => {
                sqlx::query("RELEASE SAVEPOINT bulk_insert").execute(&mut *tx).await?;
                tx.commit().await?;
                return Ok(BatchReport {
                    inserted: inserted as usize,
                    duplicates: Vec::new(),
                });
            },
            Err(e) => {
                tracing::debug!(error = %e, "Bulk insert failed, inserting records one by one");
                sqlx::query("ROLLBACK TO SAVEPOINT bulk_insert").execute(&mut *tx).await?;
            },
        }

        let mut report = BatchReport::default();
        for record in records {
            sqlx::query("SAVEPOINT record_insert").execute(&mut *tx).await?;
            match Self::insert_one(&mut tx, record).await {
                Ok(()) => {
                    sqlx::query("RELEASE SAVEPOINT record_insert").execute(&mut *tx).await?;
                    report.inserted += 1;
                },
                Err(e) if is_unique_violation(&e) => {
                    sqlx::query("ROLLBACK TO SAVEPOINT record_insert").execute(&mut *tx).await?;
                    report.duplicates.push(record.email.clone());
                },
                Err(e) => {
                    tracing::warn!(error = %e, email = %record.email, "Record insert failed, rolling back batch");
                    return Err(StoreError::Database(e));
                },
            }
        }

        tx.commit().await?;
        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Employee, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM employees WHERE id = $1");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM employees WHERE email = $1");
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<EmployeePage, StoreError> {
        self.page(None, limit, offset).await
    }

    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<EmployeePage, StoreError> {
        self.page(Some(query), limit, offset).await
    }

    #[tracing::instrument(skip(self, record), fields(email = %record.email))]
    async fn update(&self, id: i64, record: &NewEmployee) -> Result<Employee, StoreError> {
        let sql = format!(
            "UPDATE employees SET first_name = $1, last_name = $2, company_name = $3, \
             address = $4, city = $5, county = $6, postal = $7, phone = $8, email = $9, \
             web = $10, updated_at = NOW() WHERE id = $11 RETURNING {SELECT_COLUMNS}"
        );

        bind_record(sqlx::query_as::<_, Employee>(&sql), record)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &record.email))?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(first: &str, email: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            company_name: "Acme 100%".to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ann"), "ann");
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_and_find(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);

        let created = store.create_one(&record("Ann", "ann@x.com")).await.unwrap();
        assert!(created.id > 0);

        let found = store.find_by_id(created.id).await.unwrap();
        assert_eq!(found.email, "ann@x.com");

        let by_email = store.find_by_email("ann@x.com").await.unwrap();
        assert_eq!(by_email.map(|e| e.id), Some(created.id));
        assert!(store.find_by_email("ANN@x.com").await.unwrap().is_none());

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_email_is_unique_violation(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);
        store.create_one(&record("Ann", "ann@x.com")).await.unwrap();

        let err = store.create_one(&record("Annie", "ann@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref email } if email == "ann@x.com"));

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_batch_falls_back_on_duplicates(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);
        store.create_one(&record("Ann", "ann@x.com")).await.unwrap();

        let report = store
            .create_batch(&[
                record("Bob", "bob@x.com"),
                record("Ann", "ann@x.com"),
                record("Cat", "cat@x.com"),
                record("Bobby", "bob@x.com"),
            ])
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.duplicates, vec!["ann@x.com", "bob@x.com"]);
        assert_eq!(store.find_all(10, 0).await.unwrap().total, 3);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_batch_without_conflicts_uses_one_statement(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);
        let records: Vec<_> = (0..25)
            .map(|i| record("Worker", &format!("worker{i}@x.com")))
            .collect();

        let report = store.create_batch(&records).await.unwrap();
        assert_eq!(report.inserted, 25);
        assert!(report.duplicates.is_empty());

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_search_and_pagination(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);
        for (first, email) in [("Ann", "ann@x.com"), ("Bob", "bob@y.com"), ("Anna", "anna@z.com")] {
            store.create_one(&record(first, email)).await.unwrap();
        }

        let page = store.search("ANN", 10, 0).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.employees[0].first_name, "Ann");

        let literal = store.search("100%", 10, 0).await.unwrap();
        assert_eq!(literal.total, 3);

        let second = store.find_all(2, 2).await.unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.employees.len(), 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_update_and_delete(pool: PgPool) -> sqlx::Result<()> {
        let store = PgEmployeeStore::new(pool);
        let ann = store.create_one(&record("Ann", "ann@x.com")).await.unwrap();
        store.create_one(&record("Bob", "bob@x.com")).await.unwrap();

        let mut changed = NewEmployee::from(&ann);
        changed.city = "Leeds".to_string();
        let updated = store.update(ann.id, &changed).await.unwrap();
        assert_eq!(updated.city, "Leeds");

        changed.email = "bob@x.com".to_string();
        assert!(matches!(
            store.update(ann.id, &changed).await,
            Err(StoreError::UniqueViolation { .. })
        ));

        store.delete(ann.id).await.unwrap();
        assert!(matches!(store.delete(ann.id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.find_by_id(ann.id).await, Err(StoreError::NotFound(_))));

        Ok(())
    }
}
