//! Straight-line ORM walkthrough over the `students` table.
//!
//! # Responsibility
//! - Seed two sample students, run the read queries, delete one row and
//!   promote the rest.
//! - Return every intermediate result so callers decide how to print it.
//!
//! # Invariants
//! - Read results are captured before the delete and the bulk update.
//! - Any storage failure aborts the run and is returned unchanged.

use crate::model::student::Student;
use crate::repo::student_repo::{RepoError, SqliteStudentRepository};
use crate::service::roster_service::{NameBirthday, NameGrade, RosterService};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const EINSTEIN: &str = "Albert Einstein";
pub const TURING: &str = "Alan Turing";

pub type SandboxResult<T> = Result<T, SandboxError>;

#[derive(Debug)]
pub enum SandboxError {
    Repo(RepoError),
    InvalidSampleDate { year: i32, month: u32, day: u32 },
}

impl Display for SandboxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidSampleDate { year, month, day } => {
                write!(f, "invalid sample date {year:04}-{month:02}-{day:02}")
            }
        }
    }
}

impl Error for SandboxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidSampleDate { .. } => None,
        }
    }
}

impl From<RepoError> for SandboxError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Everything the walkthrough observed, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxReport {
    pub saved: usize,
    pub students: Vec<Student>,
    pub names: Vec<Option<String>>,
    pub names_sorted: Vec<Option<String>>,
    pub by_grade_desc: Vec<NameGrade>,
    pub oldest: Option<NameBirthday>,
    pub count: u64,
    pub search_hits: Vec<Student>,
    pub deleted: usize,
    pub before_promotion: Vec<NameGrade>,
    pub promoted: usize,
    pub after_promotion: Vec<NameGrade>,
    /// Local Einstein value; bulk save never writes the id back.
    pub local_einstein: Student,
}

/// Builds the two sample students: Einstein (grade 6) and Turing (grade 11).
pub fn sample_students() -> SandboxResult<[Student; 2]> {
    let albert_einstein = Student::new(EINSTEIN)
        .with_email("albert.einstein@zurich.edu")
        .with_grade(6)
        .with_birthday(midnight(1987, 3, 14)?);

    let alan_turing = Student::new(TURING)
        .with_email("alan.turing@sherborne.edu")
        .with_grade(11)
        .with_birthday(midnight(1912, 6, 23)?);

    Ok([albert_einstein, alan_turing])
}

/// Runs the walkthrough against a freshly bootstrapped connection.
///
/// # Side effects
/// - Inserts, deletes and updates rows in `students`.
/// - Emits `sandbox_run` events with duration and status.
pub fn run_sandbox(conn: &mut Connection) -> SandboxResult<SandboxReport> {
    let started_at = Instant::now();
    info!("event=sandbox_run module=sandbox status=start");

    let [albert_einstein, alan_turing] = sample_students()?;
    let mut roster = RosterService::new(SqliteStudentRepository::new(conn));

    let saved = roster.enroll_all(&[albert_einstein.clone(), alan_turing])?;

    let students = roster.all_students()?;
    let names = roster.names()?;
    let names_sorted = roster.names_sorted()?;
    let by_grade_desc = roster.names_and_grades_by_grade_desc()?;
    let oldest = roster.oldest_student()?;
    let count = roster.student_count()?;
    let search_hits = roster.search("Alan", 11)?;

    let deleted = roster.remove_by_name(EINSTEIN)?;

    let before_promotion = roster.roster()?;
    let promoted = roster.promote_all()?;
    let after_promotion = roster.roster()?;

    info!(
        "event=sandbox_run module=sandbox status=ok duration_ms={} saved={} deleted={} promoted={}",
        started_at.elapsed().as_millis(),
        saved,
        deleted,
        promoted
    );

    Ok(SandboxReport {
        saved,
        students,
        names,
        names_sorted,
        by_grade_desc,
        oldest,
        count,
        search_hits,
        deleted,
        before_promotion,
        promoted,
        after_promotion,
        local_einstein: albert_einstein,
    })
}

fn midnight(year: i32, month: u32, day: u32) -> SandboxResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or(SandboxError::InvalidSampleDate { year, month, day })
}
