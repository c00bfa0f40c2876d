//! The metadata tables stream (`#~`).
//!
//! [`TablesHeader`] parses the stream header (heap-size flags, the valid and
//! sorted bitmasks, one row count per present table), computes every table's
//! row layout from those counts, and positions the table bodies that follow
//! the header back to back in table-id order. Rows are parsed on demand; no
//! table data is copied.
//!
//! # Reference
//! - [ECMA-335 II.24.2.6](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{TableAccess, TableData, TableId, TableInfo, TableInfoRef, MetadataTable},
    Error::OutOfBounds,
    Result,
};

/// Parsed view of the `#~` stream: header fields plus one lazily-row-parsed
/// table per bit set in the valid mask.
///
/// # Examples
///
/// ```rust,ignore
/// let tables = TablesHeader::from(stream_bytes)?;
/// if let Some(typedefs) = tables.table::<TypeDefRaw>(TableId::TypeDef) {
///     for row in typedefs.iter() {
///         println!("type {} at name index {}", row.rid, row.type_name);
///     }
/// }
/// ```
pub struct TablesHeader<'a> {
    /// Major version of the table schema, shall be 2
    pub major_version: u8,
    /// Minor version of the table schema, shall be 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and index widths computed from the header
    pub info: TableInfoRef,
    tables: Vec<Option<TableData<'a>>>,
}

impl<'a> TablesHeader<'a> {
    /// Parse a `TablesHeader` from the bytes of the `#~` stream.
    ///
    /// ## Arguments
    /// * 'data' - The stream bytes, starting at the stream header
    ///
    /// # Errors
    /// Returns an error if the header is truncated, the valid mask names a
    /// table this implementation does not know, or a table body crosses the
    /// end of the stream.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        if valid == 0 {
            return Err(malformed_error!("No valid rows in any of the tables"));
        }
        if valid >> TableId::COUNT != 0 {
            return Err(malformed_error!(
                "Valid mask names unknown tables - {:#018x}",
                valid
            ));
        }

        let info: TableInfoRef = Arc::new(TableInfo::new(data, valid)?);

        let mut tables: Vec<Option<TableData<'a>>> = Vec::with_capacity(TableId::COUNT);
        tables.resize_with(TableId::COUNT, || None);

        // Row counts follow the 24-byte header, one u32 per set bit; the
        // table bodies start right after them.
        let mut offset = 24 + valid.count_ones() as usize * 4;
        for table_id in TableId::iter() {
            let rows = info.get(table_id).rows;
            if rows == 0 {
                continue;
            }

            if offset > data.len() {
                return Err(OutOfBounds);
            }

            let table = TableData::read(table_id, &data[offset..], rows, info.clone())?;
            offset += table.byte_size();
            tables[table_id as usize] = Some(table);
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            tables,
        })
    }

    /// Number of tables present in this stream.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Returns true if the given table is present.
    ///
    /// ## Arguments
    /// * 'id' - The table to query
    #[must_use]
    pub fn has_table(&self, id: TableId) -> bool {
        self.valid & (1_u64 << id as usize) != 0
    }

    /// Returns true if the given table is declared sorted.
    ///
    /// ## Arguments
    /// * 'id' - The table to query
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        self.sorted & (1_u64 << id as usize) != 0
    }

    /// Typed access to a present table.
    ///
    /// The row type selects which variant to extract; asking for a row type
    /// that does not match `id` yields `None`.
    ///
    /// ## Arguments
    /// * 'id' - The table to retrieve
    #[must_use]
    pub fn table<T: TableAccess<'a>>(&self, id: TableId) -> Option<&MetadataTable<'a, T>> {
        self.tables
            .get(id as usize)
            .and_then(|slot| slot.as_ref())
            .and_then(T::from_data)
    }

    /// Untyped access to a present table.
    ///
    /// ## Arguments
    /// * 'id' - The table to retrieve
    #[must_use]
    pub fn table_data(&self, id: TableId) -> Option<&TableData<'a>> {
        self.tables.get(id as usize).and_then(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::ModuleRaw;

    /// Builds a `#~` stream holding a single Module row
    fn crafted_stream() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved
        data.push(2); // major version
        data.push(0); // minor version
        data.push(0); // heap size flags
        data.push(1); // reserved
        data.extend_from_slice(&0x01_u64.to_le_bytes()); // valid: Module
        data.extend_from_slice(&0u64.to_le_bytes()); // sorted
        data.extend_from_slice(&1u32.to_le_bytes()); // Module row count
        // Module row: generation, name, mvid, encid, encbaseid
        data.extend_from_slice(&[0x00, 0x00, 0x2A, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        data
    }

    #[test]
    fn crafted() {
        let data = crafted_stream();
        let header = TablesHeader::from(&data).unwrap();

        assert_eq!(header.major_version, 2);
        assert_eq!(header.minor_version, 0);
        assert_eq!(header.table_count(), 1);
        assert!(header.has_table(TableId::Module));
        assert!(!header.has_table(TableId::TypeDef));

        let module = header.table::<ModuleRaw>(TableId::Module).unwrap();
        assert_eq!(module.row_count(), 1);
        assert_eq!(module.get(1).unwrap().name, 0x2A);
    }

    #[test]
    fn declared_byte_lengths_hold() {
        let data = crafted_stream();
        let header = TablesHeader::from(&data).unwrap();

        for id in TableId::iter() {
            if let Some(table) = header.table_data(id) {
                assert_eq!(
                    table.byte_size(),
                    table.row_count() as usize * table.row_size() as usize
                );
            }
        }
    }

    #[test]
    fn empty_valid_mask_rejected() {
        let mut data = crafted_stream();
        data[8..16].fill(0);
        assert!(TablesHeader::from(&data).is_err());
    }

    #[test]
    fn unknown_table_bit_rejected() {
        let mut data = crafted_stream();
        data[13] = 0x80; // bit 45
        assert!(TablesHeader::from(&data).is_err());
    }

    #[test]
    fn truncated_body_rejected() {
        let mut data = crafted_stream();
        data.truncate(data.len() - 4);
        assert!(TablesHeader::from(&data).is_err());
    }

    #[test]
    fn wrong_row_type_yields_none() {
        let data = crafted_stream();
        let header = TablesHeader::from(&data).unwrap();
        assert!(header
            .table::<crate::metadata::tables::TypeDefRaw>(TableId::Module)
            .is_none());
    }
}
