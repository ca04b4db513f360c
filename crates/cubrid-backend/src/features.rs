//! Capability flags for the CUBRID dialect.
//!
//! The framework consults these to adapt the SQL it generates. They are facts
//! about CUBRID (9.3 and later), fixed at construction.

use std::fmt;

use crate::error::ErrorKind;

/// Value of a single capability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Boolean capability
    Flag(bool),
    /// Numeric capability
    Number(u32),
    /// Error class reported for a condition
    ErrorClass(ErrorKind),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::ErrorClass(kind) => write!(f, "{}", kind),
        }
    }
}

/// Feature descriptor for CUBRID
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DatabaseFeatures {
    pub allows_group_by_pk: bool,
    /// Can an object have a primary key of 0
    pub allows_primary_key_0: bool,
    pub allow_sliced_subqueries: bool,
    /// Does the backend prevent running SQL queries in broken transactions
    pub atomic_transactions: bool,
    pub can_defer_constraint_checks: bool,
    /// DISTINCT ON support
    pub can_distinct_on_fields: bool,
    /// CUBRID 9.3 can't retrieve foreign key info from catalog tables
    pub can_introspect_foreign_keys: bool,
    pub can_introspect_small_integer_field: bool,
    /// Inserted ids must be fetched with a follow-up query
    pub can_return_id_from_insert: bool,
    pub can_rollback_ddl: bool,
    /// Error class raised when a closed cursor is used
    pub closed_cursor_error_class: ErrorKind,
    /// `INSERT INTO ... VALUES (), (), ()`
    pub has_bulk_insert: bool,
    /// Supported from 9.3
    pub has_select_for_update: bool,
    pub has_select_for_update_nowait: bool,
    pub has_zoneinfo_database: bool,
    pub ignores_nulls_in_unique_constraints: bool,
    pub related_fields_match_type: bool,
    pub requires_explicit_null_ordering_when_grouping: bool,
    /// Defaults can't be passed as parameters
    pub requires_literal_defaults: bool,
    pub supports_date_lookup_using_string: bool,
    /// FK constraints are checked per statement, not at commit
    pub supports_forward_references: bool,
    /// Fractional seconds are stored (to the millisecond)
    pub supports_microsecond_precision: bool,
    pub supports_paramstyle_pyformat: bool,
    pub supports_regex_backreferencing: bool,
    pub supports_timezones: bool,
    pub uses_autocommit: bool,
    pub uses_savepoints: bool,
    /// Maximum identifier length
    pub max_name_length: u32,
}

impl DatabaseFeatures {
    /// The CUBRID capability table
    pub const fn cubrid() -> Self {
        Self {
            allows_group_by_pk: true,
            allows_primary_key_0: true,
            allow_sliced_subqueries: false,
            atomic_transactions: false,
            can_defer_constraint_checks: false,
            can_distinct_on_fields: false,
            can_introspect_foreign_keys: false,
            can_introspect_small_integer_field: true,
            can_return_id_from_insert: false,
            can_rollback_ddl: true,
            closed_cursor_error_class: ErrorKind::Interface,
            has_bulk_insert: true,
            has_select_for_update: true,
            has_select_for_update_nowait: false,
            has_zoneinfo_database: false,
            ignores_nulls_in_unique_constraints: false,
            related_fields_match_type: true,
            requires_explicit_null_ordering_when_grouping: false,
            requires_literal_defaults: true,
            supports_date_lookup_using_string: false,
            supports_forward_references: false,
            supports_microsecond_precision: true,
            supports_paramstyle_pyformat: false,
            supports_regex_backreferencing: false,
            supports_timezones: false,
            uses_autocommit: true,
            uses_savepoints: true,
            max_name_length: 64,
        }
    }

    /// All capabilities as `(name, value)` pairs, in declaration order
    pub fn capabilities(&self) -> Vec<(&'static str, Capability)> {
        use Capability::{ErrorClass, Flag, Number};

        vec![
            ("allows_group_by_pk", Flag(self.allows_group_by_pk)),
            ("allows_primary_key_0", Flag(self.allows_primary_key_0)),
            ("allow_sliced_subqueries", Flag(self.allow_sliced_subqueries)),
            ("atomic_transactions", Flag(self.atomic_transactions)),
            (
                "can_defer_constraint_checks",
                Flag(self.can_defer_constraint_checks),
            ),
            ("can_distinct_on_fields", Flag(self.can_distinct_on_fields)),
            (
                "can_introspect_foreign_keys",
                Flag(self.can_introspect_foreign_keys),
            ),
            (
                "can_introspect_small_integer_field",
                Flag(self.can_introspect_small_integer_field),
            ),
            (
                "can_return_id_from_insert",
                Flag(self.can_return_id_from_insert),
            ),
            ("can_rollback_ddl", Flag(self.can_rollback_ddl)),
            (
                "closed_cursor_error_class",
                ErrorClass(self.closed_cursor_error_class),
            ),
            ("has_bulk_insert", Flag(self.has_bulk_insert)),
            ("has_select_for_update", Flag(self.has_select_for_update)),
            (
                "has_select_for_update_nowait",
                Flag(self.has_select_for_update_nowait),
            ),
            ("has_zoneinfo_database", Flag(self.has_zoneinfo_database)),
            (
                "ignores_nulls_in_unique_constraints",
                Flag(self.ignores_nulls_in_unique_constraints),
            ),
            (
                "related_fields_match_type",
                Flag(self.related_fields_match_type),
            ),
            (
                "requires_explicit_null_ordering_when_grouping",
                Flag(self.requires_explicit_null_ordering_when_grouping),
            ),
            (
                "requires_literal_defaults",
                Flag(self.requires_literal_defaults),
            ),
            (
                "supports_date_lookup_using_string",
                Flag(self.supports_date_lookup_using_string),
            ),
            (
                "supports_forward_references",
                Flag(self.supports_forward_references),
            ),
            (
                "supports_microsecond_precision",
                Flag(self.supports_microsecond_precision),
            ),
            (
                "supports_paramstyle_pyformat",
                Flag(self.supports_paramstyle_pyformat),
            ),
            (
                "supports_regex_backreferencing",
                Flag(self.supports_regex_backreferencing),
            ),
            ("supports_timezones", Flag(self.supports_timezones)),
            ("uses_autocommit", Flag(self.uses_autocommit)),
            ("uses_savepoints", Flag(self.uses_savepoints)),
            ("max_name_length", Number(self.max_name_length)),
        ]
    }

    /// Look up a capability by name
    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.capabilities()
            .into_iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, value)| value)
    }

    /// Look up a boolean capability; non-boolean or unknown names yield `None`
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.capability(name)? {
            Capability::Flag(b) => Some(b),
            _ => None,
        }
    }
}

impl Default for DatabaseFeatures {
    fn default() -> Self {
        Self::cubrid()
    }
}
