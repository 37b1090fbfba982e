//! Schema descriptors consumed by DDL synthesis.
//!
//! These are plain data: the schema model hands them in, the platform turns
//! them into SQL.

mod column;
mod diff;
mod foreign_key;
mod index;
mod sequence;
mod table;

pub use column::{Column, DefaultValue};
pub use diff::{ColumnDiff, ColumnProperty, RenamedColumn, RenamedIndex, TableDiff};
pub use foreign_key::{ForeignKey, MatchType, ReferentialAction};
pub use index::{CheckConstraint, Index, UniqueConstraint};
pub use sequence::Sequence;
pub use table::Table;
