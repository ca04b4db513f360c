//! Placeholder rewriting for the CUBRID driver.
//!
//! The framework renders query templates with `%s` markers and escapes a
//! literal percent as `%%`. The CUBRID driver binds positional `?` markers and
//! treats `%` as an ordinary character, so templates are rewritten before they
//! reach the driver.
//!
//! The scan is not quote-aware: a `%s` inside a string literal is rewritten
//! like any structural marker. Templates produced by the framework keep values
//! out of the SQL text, so this only matters for hand-written raw SQL.

/// Marker the framework uses for bound parameters
pub const HOST_MARKER: &str = "%s";

/// Marker the driver expects for bound parameters
pub const DRIVER_MARKER: char = '?';

/// A template rewritten for the driver, with the number of markers it binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenQuery {
    /// SQL text with driver markers
    pub sql: String,
    /// Count of `?` markers produced
    pub markers: usize,
}

/// Rewrite `%s` markers to `?` and collapse `%%` to `%`.
///
/// ```
/// use cubrid_backend::placeholder::rewrite;
///
/// assert_eq!(
///     rewrite("SELECT * FROM t WHERE a = %s AND b LIKE 'x%%'"),
///     "SELECT * FROM t WHERE a = ? AND b LIKE 'x%'"
/// );
/// ```
pub fn rewrite(template: &str) -> String {
    rewrite_counted(template).sql
}

/// Rewrite a template and report how many markers it binds.
pub fn rewrite_counted(template: &str) -> RewrittenQuery {
    // Fast path: nothing to rewrite
    if !template.contains('%') {
        return RewrittenQuery {
            sql: template.to_string(),
            markers: 0,
        };
    }

    let mut sql = String::with_capacity(template.len());
    let mut markers = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            sql.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                sql.push('%');
            }
            Some('s') => {
                chars.next();
                sql.push(DRIVER_MARKER);
                markers += 1;
            }
            _ => sql.push('%'),
        }
    }

    RewrittenQuery { sql, markers }
}
