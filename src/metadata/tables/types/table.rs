use std::marker::PhantomData;

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    metadata::tables::types::{RowDefinition, TableInfoRef},
    Error::OutOfBounds,
    Result,
};

/// Typed view over the rows of one metadata table.
///
/// The table holds a borrowed slice of exactly `row_count × row_size` bytes
/// and parses rows on demand: `get(rid)` is O(1) via `base + (rid − 1) ×
/// row_size`. Row ids are 1-based; rid 0 is the null reference and yields
/// `None`.
///
/// Sorted parent-pointer tables additionally support binary search over a
/// column ([`MetadataTable::find_range`], [`MetadataTable::find_owner`]);
/// unsorted tables fall back to a linear scan ([`MetadataTable::scan_rows`]).
pub struct MetadataTable<'a, T: RowDefinition<'a>> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    info: TableInfoRef,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: RowDefinition<'a>> MetadataTable<'a, T> {
    /// Create a table view over raw table bytes.
    ///
    /// ## Arguments
    /// * 'data'      - Buffer starting at the first row of this table
    /// * '`row_count`' - Number of rows the header declared
    /// * 'info'      - Size information for parsing variable-width columns
    ///
    /// # Errors
    /// Returns [`OutOfBounds`] if the buffer cannot hold `row_count` rows.
    pub fn new(data: &'a [u8], row_count: u32, info: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&info);
        let Some(total) = (row_size as usize).checked_mul(row_count as usize) else {
            return Err(OutOfBounds);
        };

        if total > data.len() {
            return Err(OutOfBounds);
        }

        Ok(MetadataTable {
            data: &data[..total],
            row_count,
            row_size,
            info,
            _marker: PhantomData,
        })
    }

    /// Number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Total size of the table body in bytes.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Parse the row with the given 1-based id.
    ///
    /// Returns `None` for rid 0, for rids beyond the row count, and for rows
    /// whose bytes fail to parse.
    ///
    /// ## Arguments
    /// * 'rid' - The 1-based row id
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<T> {
        if rid == 0 || rid > self.row_count {
            return None;
        }

        let mut offset = (rid as usize - 1) * self.row_size as usize;
        T::read_row(self.data, &mut offset, rid, &self.info).ok()
    }

    /// Sequential iterator over all rows, in rid order.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'a, '_, T> {
        TableIterator {
            table: self,
            rid: 1,
        }
    }

    /// Parallel iterator over all rows.
    pub fn par_iter(&self) -> impl ParallelIterator<Item = T> + use<'_, 'a, T>
    where
        T: Send,
    {
        (1..=self.row_count)
            .into_par_iter()
            .filter_map(move |rid| self.get(rid))
    }

    /// Binary-search a column that the table is sorted by, returning the
    /// contiguous `[lo, hi)` rid range whose column equals `key`.
    ///
    /// The lowest matching rid wins ties. Returns an empty range positioned
    /// at the insertion point when no row matches. Only meaningful when the
    /// table is declared sorted on that column.
    ///
    /// ## Arguments
    /// * 'key'    - The column value to search for
    /// * 'column' - Extracts the sort column from a row
    pub fn find_range<F>(&self, key: u32, column: F) -> (u32, u32)
    where
        F: Fn(&T) -> u32,
    {
        // lower bound: first rid with column >= key
        let mut lo = 1_u32;
        let mut hi = self.row_count + 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.get(mid) {
                Some(row) if column(&row) < key => lo = mid + 1,
                Some(_) => hi = mid,
                None => return (1, 1),
            }
        }
        let start = lo;

        // upper bound: first rid with column > key
        let mut hi = self.row_count + 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.get(mid) {
                Some(row) if column(&row) <= key => lo = mid + 1,
                Some(_) => hi = mid,
                None => return (start, start),
            }
        }

        (start, lo)
    }

    /// Linear scan collecting the rids whose column equals `key`, in rid
    /// order. The fallback for columns the table is not sorted by.
    ///
    /// ## Arguments
    /// * 'key'    - The column value to search for
    /// * 'column' - Extracts the column from a row
    pub fn scan_rows<F>(&self, key: u32, column: F) -> Vec<u32>
    where
        F: Fn(&T) -> u32,
    {
        let mut matches = Vec::new();
        for rid in 1..=self.row_count {
            if let Some(row) = self.get(rid) {
                if column(&row) == key {
                    matches.push(rid);
                }
            }
        }
        matches
    }

    /// Find the parent row of a child rid in a list-range table.
    ///
    /// List columns (`FieldList`, `MethodList`, ...) store the first child rid
    /// of each parent; a parent's range extends to the next parent's start.
    /// The owner of `child_rid` is therefore the largest rid whose list start
    /// is ≤ `child_rid`.
    ///
    /// ## Arguments
    /// * '`child_rid`'  - The 1-based rid in the child table
    /// * '`list_start`' - Extracts the list-start column from a parent row
    pub fn find_owner<F>(&self, child_rid: u32, list_start: F) -> Option<u32>
    where
        F: Fn(&T) -> u32,
    {
        let mut lo = 1_u32;
        let mut hi = self.row_count + 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let row = self.get(mid)?;
            if list_start(&row) <= child_rid {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        if lo > 1 {
            Some(lo - 1)
        } else {
            None
        }
    }
}

impl<'a, 'b, T: RowDefinition<'a>> IntoIterator for &'b MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'a, 'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'a, 'b, T: RowDefinition<'a>> {
    table: &'b MetadataTable<'a, T>,
    rid: u32,
}

impl<'a, T: RowDefinition<'a>> Iterator for TableIterator<'a, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.table.get(self.rid)?;
        self.rid += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .table
            .row_count
            .saturating_sub(self.rid.saturating_sub(1)) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::types::TableInfo;
    use crate::Result;
    use std::sync::Arc;

    /// Fixed 4-byte row for exercising the generic table machinery
    #[derive(Debug, PartialEq)]
    struct PairRow {
        rid: u32,
        key: u32,
        value: u32,
    }

    impl<'a> RowDefinition<'a> for PairRow {
        fn row_size(_sizes: &TableInfoRef) -> u32 {
            4
        }

        fn read_row(
            data: &'a [u8],
            offset: &mut usize,
            rid: u32,
            _sizes: &TableInfoRef,
        ) -> Result<Self> {
            let key = u32::from(crate::file::io::read_le_at::<u16>(data, offset)?);
            let value = u32::from(crate::file::io::read_le_at::<u16>(data, offset)?);
            Ok(PairRow { rid, key, value })
        }
    }

    fn table_of(pairs: &[(u16, u16)]) -> Vec<u8> {
        let mut data = Vec::new();
        for (key, value) in pairs {
            data.extend_from_slice(&key.to_le_bytes());
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    fn info() -> TableInfoRef {
        Arc::new(TableInfo::new_test(&[], false, false, false))
    }

    #[test]
    fn get_is_one_based() {
        let data = table_of(&[(10, 100), (20, 200)]);
        let table = MetadataTable::<PairRow>::new(&data, 2, info()).unwrap();

        assert!(table.get(0).is_none());
        assert_eq!(table.get(1).unwrap().key, 10);
        assert_eq!(table.get(2).unwrap().value, 200);
        assert!(table.get(3).is_none());
    }

    #[test]
    fn byte_size_is_rows_times_row_size() {
        let data = table_of(&[(1, 1), (2, 2), (3, 3)]);
        let table = MetadataTable::<PairRow>::new(&data, 3, info()).unwrap();
        assert_eq!(table.byte_size(), table.row_count() as usize * table.row_size() as usize);
    }

    #[test]
    fn undersized_buffer_rejected() {
        let data = table_of(&[(1, 1)]);
        assert!(MetadataTable::<PairRow>::new(&data, 2, info()).is_err());
    }

    #[test]
    fn iteration_in_rid_order() {
        let data = table_of(&[(1, 0), (2, 0), (3, 0)]);
        let table = MetadataTable::<PairRow>::new(&data, 3, info()).unwrap();

        let keys: Vec<u32> = table.iter().map(|row| row.key).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn find_range_on_sorted_column() {
        let data = table_of(&[(1, 0), (2, 0), (2, 0), (2, 0), (5, 0)]);
        let table = MetadataTable::<PairRow>::new(&data, 5, info()).unwrap();

        assert_eq!(table.find_range(2, |row| row.key), (2, 5));
        assert_eq!(table.find_range(1, |row| row.key), (1, 2));
        assert_eq!(table.find_range(5, |row| row.key), (5, 6));
        // absent key yields an empty range
        let (lo, hi) = table.find_range(3, |row| row.key);
        assert_eq!(lo, hi);
    }

    #[test]
    fn scan_rows_collects_matches() {
        let data = table_of(&[(7, 0), (3, 0), (7, 0)]);
        let table = MetadataTable::<PairRow>::new(&data, 3, info()).unwrap();

        assert_eq!(table.scan_rows(7, |row| row.key), vec![1, 3]);
        assert_eq!(table.scan_rows(9, |row| row.key), Vec::<u32>::new());
    }

    #[test]
    fn find_owner_picks_largest_start_at_or_below() {
        // Parents with list starts 1, 4, 4, 8: child 5 belongs to the second
        // parent with start 4 (rid 3), child 3 to rid 1, child 9 to rid 4.
        let data = table_of(&[(1, 0), (4, 0), (4, 0), (8, 0)]);
        let table = MetadataTable::<PairRow>::new(&data, 4, info()).unwrap();

        assert_eq!(table.find_owner(5, |row| row.key), Some(3));
        assert_eq!(table.find_owner(3, |row| row.key), Some(1));
        assert_eq!(table.find_owner(9, |row| row.key), Some(4));
        assert_eq!(table.find_owner(0, |row| row.key), None);
    }
}
