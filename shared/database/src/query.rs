//! Filtering, keyword search and pagination shared by the public pages and
//! the admin API.

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use suzstar_common::AppError;

/// Escapes `\`, `%` and `_` and wraps the term for a substring `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Treats absent and blank query parameters the same way.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub enum Condition {
    /// Trusted SQL fragment with no bind parameters.
    Raw(&'static str),
    Text(&'static str, String),
    Bool(&'static str, bool),
    Int(&'static str, i64),
    /// `column::text = value`; used by the generic admin filters.
    TextCast(&'static str, String),
    /// Case-insensitive substring match ORed across the columns.
    Keyword(&'static [&'static str], String),
    /// Case-insensitive exact match of one element of a `TEXT[]` column.
    ArrayContains(&'static str, String),
    /// Row id is not this one.
    ExcludeId(i64),
}

/// A `SELECT * FROM table WHERE ... ORDER BY ...` assembled from conditions.
#[derive(Debug, Clone)]
pub struct ListQuery {
    table: &'static str,
    conditions: Vec<Condition>,
    order_by: &'static str,
}

impl ListQuery {
    pub fn new(table: &'static str, order_by: &'static str) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            order_by,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filter_opt(self, condition: Option<Condition>) -> Self {
        match condition {
            Some(condition) => self.filter(condition),
            None => self,
        }
    }

    /// Adds a keyword condition unless the term is blank.
    pub fn search(self, columns: &'static [&'static str], term: Option<&str>) -> Self {
        let condition = non_empty(term).map(|t| Condition::Keyword(columns, t.to_string()));
        self.filter_opt(condition)
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, condition) in self.conditions.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            match condition {
                Condition::Raw(sql) => {
                    builder.push("(").push(*sql).push(")");
                }
                Condition::Text(column, value) => {
                    builder.push(*column).push(" = ").push_bind(value.clone());
                }
                Condition::Bool(column, value) => {
                    builder.push(*column).push(" = ").push_bind(*value);
                }
                Condition::Int(column, value) => {
                    builder.push(*column).push(" = ").push_bind(*value);
                }
                Condition::TextCast(column, value) => {
                    builder.push(*column).push("::text = ").push_bind(value.clone());
                }
                Condition::Keyword(columns, term) => {
                    let pattern = like_pattern(term);
                    builder.push("(");
                    for (j, column) in columns.iter().enumerate() {
                        if j > 0 {
                            builder.push(" OR ");
                        }
                        builder
                            .push(*column)
                            .push("::text ILIKE ")
                            .push_bind(pattern.clone());
                    }
                    builder.push(")");
                }
                Condition::ArrayContains(column, value) => {
                    builder
                        .push("EXISTS (SELECT 1 FROM unnest(")
                        .push(*column)
                        .push(") AS element WHERE lower(element) = lower(")
                        .push_bind(value.trim().to_string())
                        .push("))");
                }
                Condition::ExcludeId(id) => {
                    builder.push("id <> ").push_bind(*id);
                }
            }
        }
    }

    fn select(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::new("SELECT * FROM ");
        builder.push(self.table);
        self.push_where(&mut builder);
        builder.push(" ORDER BY ").push(self.order_by);
        builder
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
        builder.push(self.table);
        self.push_where(&mut builder);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.select()
            .build_query_as::<T>()
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn fetch_limited<T>(&self, pool: &PgPool, limit: i64) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut builder = self.select();
        builder.push(" LIMIT ").push_bind(limit);
        builder
            .build_query_as::<T>()
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn fetch_page<T>(
        &self,
        pool: &PgPool,
        paginator: Paginator,
        requested: Option<&str>,
    ) -> Result<Page<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let total_count = self.count(pool).await?;
        let window = paginator.window(requested, total_count);

        let mut builder = self.select();
        builder
            .push(" LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);
        let items = builder
            .build_query_as::<T>()
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(Page::new(items, window, total_count))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: i64,
}

/// The slice of rows one page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub total_pages: i64,
    pub offset: i64,
    pub limit: i64,
}

impl Paginator {
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// An empty result set still has one (empty) page.
    pub fn total_pages(&self, total_count: i64) -> i64 {
        if total_count <= 0 {
            1
        } else {
            (total_count + self.per_page - 1) / self.per_page
        }
    }

    /// Non-numeric input falls back to the first page; numbers outside
    /// `1..=total_pages` land on the last page.
    pub fn window(&self, requested: Option<&str>, total_count: i64) -> PageWindow {
        let total_pages = self.total_pages(total_count);
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n >= 1 && n <= total_pages => n,
            Some(Ok(_)) => total_pages,
        };

        PageWindow {
            number,
            total_pages,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<i64>,
    pub previous_page: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total_count: i64) -> Self {
        let has_next = window.number < window.total_pages;
        let has_previous = window.number > 1;
        Self {
            items,
            number: window.number,
            total_pages: window.total_pages,
            total_count,
            has_next,
            has_previous,
            next_page: has_next.then_some(window.number + 1),
            previous_page: has_previous.then_some(window.number - 1),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page: self.next_page,
            previous_page: self.previous_page,
        }
    }
}
