//! Declarative filter/order/limit options for `students` queries.
//!
//! # Responsibility
//! - Describe predicates, sort keys and pagination as plain data.
//! - Render that data into parameterized SQL fragments.
//!
//! # Invariants
//! - Only `Column::as_sql` text is interpolated into SQL; every value is bound.
//! - Conditions are combined with `AND` in insertion order.

use rusqlite::types::Value;

/// Columns of the `students` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Email,
    Grade,
    Birthday,
    EnrolledDate,
}

impl Column {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Grade => "grade",
            Self::Birthday => "birthday",
            Self::EnrolledDate => "enrolled_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Single predicate over one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`. A `Value::Null` renders as `column IS NULL`.
    Eq(Column, Value),
    /// `column LIKE pattern`, with SQLite's `%` and `_` wildcards.
    Like(Column, String),
    /// `column IS NOT NULL`
    IsNotNull(Column),
}

/// Column write used by bulk updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `column = value`
    Set(Column, Value),
    /// `column = column + delta`
    Increment(Column, i64),
}

/// Query options shared by read, update and delete paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentQuery {
    pub conditions: Vec<Condition>,
    pub order_by: Vec<(Column, SortDirection)>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl StudentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filter_eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.filter(Condition::Eq(column, value.into()))
    }

    pub fn filter_like(self, column: Column, pattern: impl Into<String>) -> Self {
        self.filter(Condition::Like(column, pattern.into()))
    }

    pub fn filter_not_null(self, column: Column) -> Self {
        self.filter(Condition::IsNotNull(column))
    }

    pub fn order_by(mut self, column: Column) -> Self {
        self.order_by.push((column, SortDirection::Asc));
        self
    }

    pub fn order_by_desc(mut self, column: Column) -> Self {
        self.order_by.push((column, SortDirection::Desc));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Appends ` WHERE ...` (if any conditions) and pushes bind values.
    pub(crate) fn push_where(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        for (index, condition) in self.conditions.iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            match condition {
                Condition::Eq(column, Value::Null) => {
                    sql.push_str(column.as_sql());
                    sql.push_str(" IS NULL");
                }
                Condition::Eq(column, value) => {
                    sql.push_str(column.as_sql());
                    sql.push_str(" = ?");
                    bind_values.push(value.clone());
                }
                Condition::Like(column, pattern) => {
                    sql.push_str(column.as_sql());
                    sql.push_str(" LIKE ?");
                    bind_values.push(Value::Text(pattern.clone()));
                }
                Condition::IsNotNull(column) => {
                    sql.push_str(column.as_sql());
                    sql.push_str(" IS NOT NULL");
                }
            }
        }
    }

    /// Appends ordering and pagination clauses for SELECT statements.
    pub(crate) fn push_order_and_page(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if !self.order_by.is_empty() {
            let keys = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column.as_sql(), direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys);
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }
    }

    /// True when the query carries ordering or pagination, which UPDATE and
    /// DELETE statements cannot honor.
    pub(crate) fn has_order_or_page(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, StudentQuery};
    use rusqlite::types::Value;

    #[test]
    fn renders_conditions_order_and_limit() {
        let query = StudentQuery::new()
            .filter_like(Column::Name, "%Alan%")
            .filter_eq(Column::Grade, 11_i64)
            .order_by_desc(Column::Grade)
            .order_by(Column::Name)
            .limit(1);

        let mut sql = String::from("SELECT id FROM students");
        let mut binds = Vec::new();
        query.push_where(&mut sql, &mut binds);
        query.push_order_and_page(&mut sql, &mut binds);

        assert_eq!(
            sql,
            "SELECT id FROM students WHERE name LIKE ? AND grade = ? \
             ORDER BY grade DESC, name ASC LIMIT ?"
        );
        assert_eq!(
            binds,
            vec![
                Value::Text("%Alan%".to_string()),
                Value::Integer(11),
                Value::Integer(1),
            ]
        );
    }

    #[test]
    fn null_checks_render_without_binds() {
        let query = StudentQuery::new()
            .filter_eq(Column::Email, Value::Null)
            .filter_not_null(Column::Birthday);
        let mut sql = String::new();
        let mut binds = Vec::new();
        query.push_where(&mut sql, &mut binds);

        assert_eq!(sql, " WHERE email IS NULL AND birthday IS NOT NULL");
        assert!(binds.is_empty());
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let query = StudentQuery::new().offset(3);
        let mut sql = String::new();
        let mut binds = Vec::new();
        query.push_order_and_page(&mut sql, &mut binds);

        assert_eq!(sql, " LIMIT -1 OFFSET ?");
        assert_eq!(binds, vec![Value::Integer(3)]);
        assert!(query.has_order_or_page());
        assert!(!StudentQuery::new().has_order_or_page());
    }
}
