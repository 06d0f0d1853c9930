//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/bulk-save/query/update/delete APIs over `students`.
//! - Keep SQL text inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - Read paths reject persisted rows that fail validation.
//! - `bulk_save` is all-or-nothing and does not report generated ids.

use crate::db::DbError;
use crate::model::student::{Student, StudentId, StudentValidationError};
use crate::repo::query::{Assignment, Column, StudentQuery};
use chrono::{Local, NaiveDateTime};
use log::{debug, info};
use rusqlite::types::{FromSql, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    grade,
    birthday,
    enrolled_date
FROM students";

const STUDENT_INSERT_SQL: &str = "INSERT INTO students (
    name,
    email,
    grade,
    birthday,
    enrolled_date
) VALUES (?1, ?2, ?3, ?4, ?5);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
    InvalidQuery(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::InvalidQuery(message) => write!(f, "invalid student query: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::InvalidQuery(_) => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for student persistence.
pub trait StudentRepository {
    /// Inserts one student and returns the generated id.
    fn insert(&self, student: &Student) -> RepoResult<StudentId>;
    /// Inserts all students in one transaction and returns the row count.
    fn bulk_save(&mut self, students: &[Student]) -> RepoResult<usize>;
    /// Replaces every column of an existing row identified by `student.id`.
    fn update(&self, student: &Student) -> RepoResult<()>;
    /// Gets one student by id.
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Lists full records matching the query.
    fn list(&self, query: &StudentQuery) -> RepoResult<Vec<Student>>;
    /// Returns the first record after filtering and ordering.
    fn first(&self, query: &StudentQuery) -> RepoResult<Option<Student>>;
    /// Returns only the requested columns for each matching row.
    fn project(&self, columns: &[Column], query: &StudentQuery) -> RepoResult<Vec<Vec<Value>>>;
    /// Counts non-null ids of matching rows. Ordering and pagination are ignored.
    fn count(&self, query: &StudentQuery) -> RepoResult<u64>;
    /// Applies assignments to every matching row and returns the changed count.
    fn update_where(&self, query: &StudentQuery, assignments: &[Assignment])
        -> RepoResult<usize>;
    /// Deletes one student by id.
    fn delete(&self, id: StudentId) -> RepoResult<()>;
    /// Deletes every matching row and returns the deleted count.
    fn delete_where(&self, query: &StudentQuery) -> RepoResult<usize>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn insert(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;
        insert_row(&*self.conn, student)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn bulk_save(&mut self, students: &[Student]) -> RepoResult<usize> {
        for student in students {
            student.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for student in students {
            insert_row(&tx, student)?;
        }
        tx.commit()?;

        info!(
            "event=student_bulk_save module=repo status=ok rows={}",
            students.len()
        );
        Ok(students.len())
    }

    fn update(&self, student: &Student) -> RepoResult<()> {
        let id = student
            .id
            .ok_or_else(|| RepoError::InvalidQuery("cannot update a student without id".into()))?;
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                email = ?2,
                grade = ?3,
                birthday = ?4,
                enrolled_date = ?5
             WHERE id = ?6;",
            params![
                student.name.as_deref(),
                student.email.as_deref(),
                student.grade,
                student.birthday,
                student.enrolled_date,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, query: &StudentQuery) -> RepoResult<Vec<Student>> {
        let mut sql = STUDENT_SELECT_SQL.to_string();
        let mut bind_values: Vec<Value> = Vec::new();
        query.push_where(&mut sql, &mut bind_values);
        query.push_order_and_page(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn first(&self, query: &StudentQuery) -> RepoResult<Option<Student>> {
        let limited = query.clone().limit(1);
        Ok(self.list(&limited)?.into_iter().next())
    }

    fn project(&self, columns: &[Column], query: &StudentQuery) -> RepoResult<Vec<Vec<Value>>> {
        if columns.is_empty() {
            return Err(RepoError::InvalidQuery(
                "projection needs at least one column".into(),
            ));
        }

        let column_list = columns
            .iter()
            .map(|column| column.as_sql())
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {column_list} FROM students");
        let mut bind_values: Vec<Value> = Vec::new();
        query.push_where(&mut sql, &mut bind_values);
        query.push_order_and_page(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projected = Vec::new();

        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(row.get::<_, Value>(index)?);
            }
            projected.push(values);
        }

        Ok(projected)
    }

    fn count(&self, query: &StudentQuery) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(id) FROM students");
        let mut bind_values: Vec<Value> = Vec::new();
        query.push_where(&mut sql, &mut bind_values);

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn update_where(
        &self,
        query: &StudentQuery,
        assignments: &[Assignment],
    ) -> RepoResult<usize> {
        if query.has_order_or_page() {
            return Err(RepoError::InvalidQuery(
                "bulk update does not support ordering or pagination".into(),
            ));
        }
        if assignments.is_empty() {
            return Err(RepoError::InvalidQuery(
                "bulk update needs at least one assignment".into(),
            ));
        }

        let mut set_clauses = Vec::with_capacity(assignments.len());
        let mut bind_values: Vec<Value> = Vec::new();
        for assignment in assignments {
            match assignment {
                Assignment::Set(Column::Id, _) => {
                    return Err(RepoError::InvalidQuery(
                        "primary key cannot be reassigned".into(),
                    ));
                }
                Assignment::Set(column, value) => {
                    validate_assigned_value(*column, value)?;
                    set_clauses.push(format!("{} = ?", column.as_sql()));
                    bind_values.push(value.clone());
                }
                Assignment::Increment(Column::Grade, delta) => {
                    set_clauses.push("grade = grade + ?".to_string());
                    bind_values.push(Value::Integer(*delta));
                }
                Assignment::Increment(column, _) => {
                    return Err(RepoError::InvalidQuery(format!(
                        "column `{}` is not numeric",
                        column.as_sql()
                    )));
                }
            }
        }

        let mut sql = format!("UPDATE students SET {}", set_clauses.join(", "));
        query.push_where(&mut sql, &mut bind_values);

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        info!("event=student_update module=repo status=ok rows={changed}");
        Ok(changed)
    }

    fn delete(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=student_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn delete_where(&self, query: &StudentQuery) -> RepoResult<usize> {
        if query.has_order_or_page() {
            return Err(RepoError::InvalidQuery(
                "bulk delete does not support ordering or pagination".into(),
            ));
        }

        let mut sql = String::from("DELETE FROM students");
        let mut bind_values: Vec<Value> = Vec::new();
        query.push_where(&mut sql, &mut bind_values);

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        info!("event=student_delete module=repo status=ok rows={changed}");
        Ok(changed)
    }
}

fn insert_row(conn: &Connection, student: &Student) -> RepoResult<()> {
    let enrolled_date = student.enrolled_date.unwrap_or_else(now_local);
    conn.execute(
        STUDENT_INSERT_SQL,
        params![
            student.name.as_deref(),
            student.email.as_deref(),
            student.grade,
            student.birthday,
            enrolled_date,
        ],
    )?;
    Ok(())
}

fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Rejects values the column cannot hold, then applies the same field rules
/// as `Student::validate()`.
fn validate_assigned_value(column: Column, value: &Value) -> RepoResult<()> {
    let fits = match (column, value) {
        (_, Value::Null) => true,
        (Column::Id | Column::Grade, Value::Integer(_)) => true,
        (Column::Name | Column::Email, Value::Text(_)) => true,
        (Column::Birthday | Column::EnrolledDate, Value::Text(_)) => {
            NaiveDateTime::column_result(ValueRef::from(value)).is_ok()
        }
        _ => false,
    };
    if !fits {
        return Err(RepoError::InvalidQuery(format!(
            "value {value:?} does not fit column `{}`",
            column.as_sql()
        )));
    }

    let mut assigned = Student::default();
    match (column, value) {
        (Column::Name, Value::Text(name)) => assigned.name = Some(name.clone()),
        (Column::Email, Value::Text(email)) => assigned.email = Some(email.clone()),
        _ => {}
    }
    assigned.validate()?;
    Ok(())
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        grade: row.get("grade")?,
        birthday: row.get("birthday")?,
        enrolled_date: row.get("enrolled_date")?,
    };
    student.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "row {} failed validation: {err}",
            student.id.unwrap_or_default()
        ))
    })?;
    Ok(student)
}
