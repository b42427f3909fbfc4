//! The pure reporting slice.
//!
//! Everything in here is a pure function of its inputs (records + rate +
//! criteria): no I/O, no clocks, no shared state. The server recomputes the
//! same figures with SQL for convenience; both paths must agree.

mod aggregate;
mod filter;
mod sort;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use aggregate::{AggregateRow, Grouping, aggregate_by, grand_total};
pub use filter::{FilterCriteria, filter};
pub use sort::{SortColumn, SortDirection, SummarySortMode, sort_records, sort_rows};
