//! Roster use-case service.
//!
//! # Responsibility
//! - Name the roster use cases (enroll, search, promote, remove).
//! - Turn raw column projections into typed tuples.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Unordered listings are returned in id order so output is stable.

use crate::model::student::Student;
use crate::repo::query::{Assignment, Column, StudentQuery};
use crate::repo::student_repo::{RepoError, RepoResult, StudentRepository};
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, Value, ValueRef};

/// `(name, grade)` projection row.
pub type NameGrade = (Option<String>, Option<i64>);

/// `(name, birthday)` projection row.
pub type NameBirthday = (Option<String>, Option<NaiveDateTime>);

/// Use-case wrapper over a student repository.
pub struct RosterService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> RosterService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves all students in one transaction.
    pub fn enroll_all(&mut self, students: &[Student]) -> RepoResult<usize> {
        self.repo.bulk_save(students)
    }

    pub fn all_students(&self) -> RepoResult<Vec<Student>> {
        self.repo.list(&StudentQuery::new().order_by(Column::Id))
    }

    /// Name column only, in id order.
    pub fn names(&self) -> RepoResult<Vec<Option<String>>> {
        self.project_names(&StudentQuery::new().order_by(Column::Id))
    }

    /// Name column only, sorted by name ascending.
    pub fn names_sorted(&self) -> RepoResult<Vec<Option<String>>> {
        self.project_names(&StudentQuery::new().order_by(Column::Name))
    }

    pub fn names_and_grades_by_grade_desc(&self) -> RepoResult<Vec<NameGrade>> {
        self.name_grade_rows(&StudentQuery::new().order_by_desc(Column::Grade))
    }

    /// `(name, grade)` for every student in id order.
    pub fn roster(&self) -> RepoResult<Vec<NameGrade>> {
        self.name_grade_rows(&StudentQuery::new().order_by(Column::Id))
    }

    /// Student with the earliest known birthday.
    ///
    /// Rows without a birthday are skipped, since SQLite sorts NULL first.
    pub fn oldest_student(&self) -> RepoResult<Option<NameBirthday>> {
        let query = StudentQuery::new()
            .filter_not_null(Column::Birthday)
            .order_by(Column::Birthday)
            .limit(1);
        let rows = self.repo.project(&[Column::Name, Column::Birthday], &query)?;

        rows.into_iter()
            .next()
            .map(|row| -> RepoResult<NameBirthday> {
                Ok((text_at(&row, 0)?, datetime_at(&row, 1)?))
            })
            .transpose()
    }

    pub fn student_count(&self) -> RepoResult<u64> {
        self.repo.count(&StudentQuery::new())
    }

    /// Students whose name contains `fragment` and whose grade equals `grade`.
    ///
    /// `fragment` is wrapped in `%` wildcards; `%` or `_` inside it keep their
    /// LIKE meaning. Matching is ASCII case-insensitive, as in SQLite.
    pub fn search(&self, fragment: &str, grade: i64) -> RepoResult<Vec<Student>> {
        let query = StudentQuery::new()
            .filter_like(Column::Name, format!("%{fragment}%"))
            .filter_eq(Column::Grade, grade)
            .order_by(Column::Id);
        self.repo.list(&query)
    }

    /// Deletes every student with exactly this name.
    pub fn remove_by_name(&self, name: &str) -> RepoResult<usize> {
        self.repo
            .delete_where(&StudentQuery::new().filter_eq(Column::Name, name.to_string()))
    }

    /// Raises every student's grade by one.
    pub fn promote_all(&self) -> RepoResult<usize> {
        self.repo.update_where(
            &StudentQuery::new(),
            &[Assignment::Increment(Column::Grade, 1)],
        )
    }

    fn project_names(&self, query: &StudentQuery) -> RepoResult<Vec<Option<String>>> {
        self.repo
            .project(&[Column::Name], query)?
            .iter()
            .map(|row| text_at(row, 0))
            .collect()
    }

    fn name_grade_rows(&self, query: &StudentQuery) -> RepoResult<Vec<NameGrade>> {
        self.repo
            .project(&[Column::Name, Column::Grade], query)?
            .iter()
            .map(|row| -> RepoResult<NameGrade> { Ok((text_at(row, 0)?, integer_at(row, 1)?)) })
            .collect()
    }
}

fn text_at(row: &[Value], index: usize) -> RepoResult<Option<String>> {
    match row.get(index) {
        Some(Value::Text(text)) => Ok(Some(text.clone())),
        Some(Value::Null) => Ok(None),
        other => Err(unexpected_value("text", index, other)),
    }
}

fn integer_at(row: &[Value], index: usize) -> RepoResult<Option<i64>> {
    match row.get(index) {
        Some(Value::Integer(value)) => Ok(Some(*value)),
        Some(Value::Null) => Ok(None),
        other => Err(unexpected_value("integer", index, other)),
    }
}

/// Decodes with rusqlite's own timestamp parser, the same one full-row reads use.
fn datetime_at(row: &[Value], index: usize) -> RepoResult<Option<NaiveDateTime>> {
    let value = row
        .get(index)
        .ok_or_else(|| unexpected_value("timestamp", index, None))?;
    Option::<NaiveDateTime>::column_result(ValueRef::from(value)).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid timestamp {value:?} at projection column {index}: {err}"
        ))
    })
}

fn unexpected_value(expected: &str, index: usize, found: Option<&Value>) -> RepoError {
    RepoError::InvalidData(format!(
        "expected {expected} at projection column {index}, found {found:?}"
    ))
}

#[cfg(test)]
mod tests {
    use super::{datetime_at, integer_at, text_at};
    use chrono::NaiveDate;
    use rusqlite::types::Value;

    #[test]
    fn converters_accept_null_and_matching_types() {
        let row = vec![
            Value::Text("Ada".to_string()),
            Value::Null,
            Value::Text("1912-06-23 00:00:00".to_string()),
        ];

        assert_eq!(text_at(&row, 0).unwrap().as_deref(), Some("Ada"));
        assert_eq!(integer_at(&row, 1).unwrap(), None);
        let expected = NaiveDate::from_ymd_opt(1912, 6, 23)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(datetime_at(&row, 2).unwrap(), Some(expected));
    }

    #[test]
    fn datetime_accepts_t_separator_and_rejects_garbage() {
        let row = vec![
            Value::Text("1815-12-10T00:00:00".to_string()),
            Value::Text("tenth of december".to_string()),
            Value::Integer(1815),
        ];

        let expected = NaiveDate::from_ymd_opt(1815, 12, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(datetime_at(&row, 0).unwrap(), Some(expected));
        assert!(datetime_at(&row, 1).is_err());
        assert!(datetime_at(&row, 2).is_err());
        assert!(datetime_at(&row, 3).is_err());
    }

    #[test]
    fn converters_reject_mismatched_types() {
        let row = vec![Value::Integer(7)];
        assert!(text_at(&row, 0).is_err());
        assert!(integer_at(&row, 1).is_err());
    }
}
