//! Student domain model.
//!
//! # Responsibility
//! - Define the record stored in the `students` table.
//! - Render the human-readable summary line used by the sandbox output.
//!
//! # Invariants
//! - `id` is assigned by storage and uniquely identifies a persisted row.
//! - `email` never exceeds `EMAIL_MAX_CHARS` characters once validated.
//! - Unset fields stay `None`; only `enrolled_date` has a storage default.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row identifier generated by SQLite (`INTEGER PRIMARY KEY`).
pub type StudentId = i64;

/// Declared width of the `email` column.
pub const EMAIL_MAX_CHARS: usize = 55;

/// Record backed by one row of the `students` table.
///
/// Every field is optional so a student can be built from a partial field
/// set, mirroring how rows with NULL columns come back from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Primary key. `None` until the row is persisted and re-read.
    pub id: Option<StudentId>,
    /// Indexed (non-unique) display name.
    pub name: Option<String>,
    pub email: Option<String>,
    pub grade: Option<i64>,
    pub birthday: Option<NaiveDateTime>,
    /// Filled with the insert time when left unset.
    pub enrolled_date: Option<NaiveDateTime>,
}

/// Validation failures for student write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    EmailTooLong { length: usize, max: usize },
    BlankName,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailTooLong { length, max } => {
                write!(f, "email is {length} characters long; maximum is {max}")
            }
            Self::BlankName => write!(f, "name must not be blank when set"),
        }
    }
}

impl Error for StudentValidationError {}

impl Student {
    /// Creates a student with only `name` set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_grade(mut self, grade: i64) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_birthday(mut self, birthday: NaiveDateTime) -> Self {
        self.birthday = Some(birthday);
        self
    }

    pub fn with_enrolled_date(mut self, enrolled_date: NaiveDateTime) -> Self {
        self.enrolled_date = Some(enrolled_date);
        self
    }

    /// Checks column constraints that SQLite itself does not enforce.
    ///
    /// # Errors
    /// - `EmailTooLong` when `email` exceeds `EMAIL_MAX_CHARS` characters.
    /// - `BlankName` when `name` is set to an empty or whitespace string.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if let Some(email) = self.email.as_deref() {
            let length = email.chars().count();
            if length > EMAIL_MAX_CHARS {
                return Err(StudentValidationError::EmailTooLong {
                    length,
                    max: EMAIL_MAX_CHARS,
                });
            }
        }

        if matches!(self.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(StudentValidationError::BlankName);
        }

        Ok(())
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Student {}: {}, Grade {}",
            OrNone(self.id.as_ref()),
            OrNone(self.name.as_ref()),
            OrNone(self.grade.as_ref())
        )
    }
}

/// Renders unset values as `None` in summary lines.
struct OrNone<'a, T: Display>(Option<&'a T>);

impl<T: Display> Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Student, StudentValidationError, EMAIL_MAX_CHARS};

    #[test]
    fn display_uses_summary_format() {
        let mut student = Student::new("Alan Turing").with_grade(11);
        student.id = Some(2);
        assert_eq!(student.to_string(), "Student 2: Alan Turing, Grade 11");
    }

    #[test]
    fn display_renders_unset_fields_as_none() {
        let student = Student::new("Albert Einstein").with_grade(6);
        assert_eq!(student.to_string(), "Student None: Albert Einstein, Grade 6");
        assert_eq!(Student::default().to_string(), "Student None: None, Grade None");
    }

    #[test]
    fn validate_rejects_long_email() {
        let email = format!("{}@x.edu", "a".repeat(EMAIL_MAX_CHARS));
        let err = Student::new("Long Mail").with_email(email).validate().unwrap_err();
        assert!(matches!(
            err,
            StudentValidationError::EmailTooLong { max, .. } if max == EMAIL_MAX_CHARS
        ));
    }

    #[test]
    fn validate_accepts_email_at_limit_and_rejects_blank_name() {
        let email = "a".repeat(EMAIL_MAX_CHARS);
        assert!(Student::new("Edge").with_email(email).validate().is_ok());
        assert_eq!(
            Student::new("   ").validate(),
            Err(StudentValidationError::BlankName)
        );
        assert!(Student::default().validate().is_ok());
    }
}
