//! Roster walkthrough entry point.
//!
//! # Responsibility
//! - Run the student walkthrough against a transient in-memory database.
//! - Print each intermediate result in execution order.
//!
//! Projections print as `[a, b]` lists and `(name, grade)` pairs, and the count
//! as a bare number, rather than as one-element row tuples.

use log::error;
use schoolbook_core::db::open_db_in_memory;
use schoolbook_core::{default_log_level, init_logging, run_sandbox, NameGrade, Student};
use std::error::Error;
use std::fmt::Display;

fn main() -> Result<(), Box<dyn Error>> {
    init_logging(default_log_level(), None)?;

    let mut conn = open_db_in_memory()?;
    let report = run_sandbox(&mut conn).inspect_err(|err| {
        error!("event=sandbox_run module=cli status=error error={err}");
    })?;

    println!("{}", bracketed(report.students.iter().map(Student::to_string)));
    println!("{}", bracketed(report.names.iter().map(|name| or_none(name.as_ref()))));
    println!(
        "{}",
        bracketed(report.names_sorted.iter().map(|name| or_none(name.as_ref())))
    );
    println!("{}", name_grades(&report.by_grade_desc));
    match &report.oldest {
        Some((name, birthday)) => println!(
            "({}, {})",
            or_none(name.as_ref()),
            or_none(birthday.as_ref())
        ),
        None => println!("None"),
    }
    println!("{}", report.count);
    for student in &report.search_hits {
        println!("{}", or_none(student.name.as_ref()));
    }

    println!("{}", name_grades(&report.after_promotion));
    println!("{}", report.local_einstein);

    Ok(())
}

fn name_grades(rows: &[NameGrade]) -> String {
    bracketed(rows.iter().map(|(name, grade)| {
        format!("({}, {})", or_none(name.as_ref()), or_none(grade.as_ref()))
    }))
}

fn bracketed(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

fn or_none<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "None".to_string(), ToString::to_string)
}
