//! # Repository Implementations
//!
//! One repository per aggregate. All take the pool by value (it is a cheap
//! handle) and are constructed through [`crate::Database`] accessors.

pub mod category;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;
pub mod stock;
pub mod supplier;
pub mod user;

/// Soft-delete visibility for read queries.
///
/// Category, Product and User rows are deactivated rather than deleted, and
/// every read query must say which rows it wants - passing this explicitly
/// keeps inactive rows from leaking into listings by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `is_active = 1`. The default for API listings.
    ActiveOnly,
    /// All rows, including deactivated ones. For admin views and lookups
    /// from historical ledger entries.
    IncludeInactive,
}

impl Visibility {
    /// SQL predicate fragment for the entity's `is_active` column.
    pub(crate) fn predicate(&self) -> &'static str {
        match self {
            Visibility::ActiveOnly => "is_active = 1",
            Visibility::IncludeInactive => "1 = 1",
        }
    }
}
