//! Core infrastructure for metadata table processing.
//!
//! The `#~` stream stores every table as densely packed rows whose column
//! widths depend on the image (row counts and heap-size flags). This module
//! provides the pieces that make typed, zero-copy access to those rows
//! possible:
//!
//! - [`RowDefinition`] - per-row-type size computation and parsing
//! - [`MetadataTable`] - O(1) row access, iteration and sorted-column search
//! - [`TableData`] - the enum holding one present table of any type
//! - [`TableId`] / [`CodedIndexKind`] / [`CodedIndex`] - table identities and
//!   packed cross-table references
//! - [`TableInfo`] - row counts and 2-vs-4-byte index width decisions
//!
//! # Reference
//! - [ECMA-335 II.22 and II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

mod codedindex;
mod data;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexKind};
pub use data::{TableAccess, TableData};
pub use table::{MetadataTable, TableIterator};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

use crate::Result;

/// Interface for reading and parsing the rows of one metadata table.
///
/// Implemented by every `*Raw` row type. `row_size` must account for every
/// variable-width column, since the computed size positions all subsequent
/// tables in the stream; `read_row` parses one row and advances the offset by
/// exactly that size.
pub trait RowDefinition<'a>: Sized + Send {
    /// Size in bytes of a single row of this table.
    ///
    /// ## Arguments
    /// * 'sizes' - Size information for variable-width index columns
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Read and parse a single row from the table buffer.
    ///
    /// ## Arguments
    /// * 'data'   - The table buffer
    /// * 'offset' - Read position, advanced by the row size
    /// * 'rid'    - The 1-based row id of this entry
    /// * 'sizes'  - Size information for variable-width index columns
    ///
    /// # Errors
    /// Returns an error when the buffer is truncated or a column is invalid.
    fn read_row(data: &'a [u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}
