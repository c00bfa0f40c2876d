//! GUID heap (`#GUID`).
//!
//! A 1-based array of 16-byte GUIDs identifying modules and their
//! Edit-and-Continue generations.
//!
//! # Reference
//! - [ECMA-335 II.24.2.5](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{Error::OutOfBounds, Result};

/// Zero-copy view over the `#GUID` heap.
///
/// Indexes are 1-based; index 0 means "no GUID" and reads as the zero GUID.
pub struct GuidHeap<'a> {
    data: &'a [u8],
}

impl<'a> GuidHeap<'a> {
    /// Create a `GuidHeap` view over a heap
    ///
    /// ## Arguments
    /// * 'data' - The stream bytes
    ///
    /// # Errors
    /// Returns an error if the data cannot hold a single GUID.
    pub fn from(data: &'a [u8]) -> Result<GuidHeap<'a>> {
        if data.len() < 16 {
            return Err(malformed_error!("Data for #GUID heap is too small"));
        }

        Ok(GuidHeap { data })
    }

    /// Returns the GUID at the given 1-based index; index 0 yields the zero GUID.
    ///
    /// ## Arguments
    /// * 'index' - 1-based index of the GUID (as stored in metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is beyond the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        match self.get_optional(index)? {
            Some(guid) => Ok(guid),
            None => Ok(uguid::Guid::ZERO),
        }
    }

    /// Returns the GUID at the given 1-based index, or `None` for index 0.
    ///
    /// ## Arguments
    /// * 'index' - 1-based index of the GUID (as stored in metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is beyond the heap.
    pub fn get_optional(&self, index: usize) -> Result<Option<uguid::Guid>> {
        if index == 0 {
            return Ok(None);
        }

        let Some(end) = index.checked_mul(16) else {
            return Err(OutOfBounds);
        };

        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[end - 16..end]);

        Ok(Some(uguid::Guid::from_bytes(buffer)))
    }

    /// Number of GUIDs stored in the heap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 48] = [
            /* 1 */ 0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
            /* 2 */ 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
            /* 3 */ 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let guids = GuidHeap::from(&data).unwrap();

        assert_eq!(guids.count(), 3);
        assert_eq!(
            guids.get(1).unwrap(),
            uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5")
        );
        assert_eq!(
            guids.get(2).unwrap(),
            uguid::guid!("AAAAAAAA-AAAA-AAAA-AAAA-AAAAAAAAAAAA")
        );
        assert_eq!(guids.get(3).unwrap(), uguid::Guid::ZERO);
    }

    #[test]
    fn index_zero_is_null() {
        let data = [0xFF_u8; 16];
        let guids = GuidHeap::from(&data).unwrap();
        assert_eq!(guids.get_optional(0).unwrap(), None);
        assert_eq!(guids.get(0).unwrap(), uguid::Guid::ZERO);
    }

    #[test]
    fn out_of_range_rejected() {
        let data = [0u8; 16];
        let guids = GuidHeap::from(&data).unwrap();
        assert!(matches!(guids.get(2), Err(OutOfBounds)));
    }

    #[test]
    fn undersized_heap_rejected() {
        assert!(GuidHeap::from(&[0u8; 10]).is_err());
    }
}
