use std::sync::Arc;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::types::{CodedIndexKind, TableId},
    Error::OutOfBounds,
    Result,
};

/// Row count and index width information for one table.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The number of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// True if indexes into this table from other tables need 4 bytes
    pub is_large: bool,
}

impl TableRowInfo {
    /// Create a `TableRowInfo` for a table with the given row count.
    ///
    /// ## Arguments
    /// * 'rows' - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Size information for every table and heap index in a metadata image.
///
/// `TableInfo` is computed once from the `#~` header (row counts plus the
/// heap-size flags) and then consulted by every row reader to decide whether
/// each index column is 2 or 4 bytes wide. The coded index widths follow
/// ECMA-335 §II.24.2.6: a kind is 4 bytes wide exactly when its largest
/// candidate table cannot be indexed in `16 − tagBits` bits.
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_index_bits: Vec<u8>,
    large_str: bool,
    large_guid: bool,
    large_blob: bool,
}

/// Cheap-copy reference to a [`TableInfo`].
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Parse table size information from the `#~` stream header.
    ///
    /// ## Arguments
    /// * 'data'         - The full `#~` stream, starting at its header
    /// * '`valid_bitvec`' - The valid bitvector naming the present tables
    ///
    /// # Errors
    /// Returns an error if the header is truncated.
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut row_count_offset = 24;

        for table_id in TableId::iter() {
            if (valid_bitvec & (1_u64 << table_id as usize)) == 0 {
                continue;
            }

            if data.len() < row_count_offset + 4 {
                return Err(OutOfBounds);
            }

            let row_count = read_le_at::<u32>(data, &mut row_count_offset)?;
            if row_count == 0 {
                // A conforming writer omits empty tables; tolerate the bit anyway
                continue;
            }

            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        let mut info = TableInfo {
            rows,
            coded_index_bits: vec![0; CodedIndexKind::COUNT],
            large_str: heap_size_flags & 0x01 != 0,
            large_guid: heap_size_flags & 0x02 != 0,
            large_blob: heap_size_flags & 0x04 != 0,
        };

        info.compute_coded_index_bits();

        Ok(info)
    }

    #[cfg(test)]
    /// Construct a `TableInfo` directly from row counts, for tests.
    ///
    /// ## Arguments
    /// * '`valid_tables`' - (table, row count) pairs of the present tables
    /// * '`large_str`'    - True for 4-byte `#Strings` indexes
    /// * '`large_blob`'   - True for 4-byte `#Blob` indexes
    /// * '`large_guid`'   - True for 4-byte `#GUID` indexes
    #[must_use]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_index_bits: vec![0; CodedIndexKind::COUNT],
            large_str,
            large_guid,
            large_blob,
        };

        for (table, rows) in valid_tables {
            info.rows[*table as usize] = TableRowInfo::new(*rows);
        }

        info.compute_coded_index_bits();
        info
    }

    /// Size information for a specific table.
    ///
    /// ## Arguments
    /// * 'table' - The table to query
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// True if indexes into the given table need 4 bytes.
    ///
    /// ## Arguments
    /// * 'table' - The table to query
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.rows[table as usize].is_large
    }

    /// True if `#Strings` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.large_str
    }

    /// True if `#GUID` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.large_guid
    }

    /// True if `#Blob` indexes are 4 bytes wide.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.large_blob
    }

    /// Byte width of a `#Strings` index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.large_str {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#GUID` index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.large_guid {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#Blob` index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.large_blob {
            4
        } else {
            2
        }
    }

    /// Byte width of a simple index into the given table.
    ///
    /// ## Arguments
    /// * 'table' - The referenced table
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u8 {
        if self.rows[table as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Byte width of a coded index of the given kind.
    ///
    /// ## Arguments
    /// * 'kind' - The coded index kind
    #[must_use]
    pub fn coded_index_bytes(&self, kind: CodedIndexKind) -> u8 {
        if self.coded_index_bits[kind as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn compute_coded_index_bits(&mut self) {
        for kind in CodedIndexKind::iter() {
            let max_bits = kind
                .tables()
                .iter()
                .map(|table| self.rows[*table as usize].bits)
                .max()
                .unwrap_or(1);

            self.coded_index_bits[kind as usize] = max_bits + kind.tag_bits();
        }
    }
}
