//! String heap (`#Strings`).
//!
//! Identifier strings (type names, member names, namespaces) referenced by the
//! metadata tables, stored as zero-terminated UTF-8 starting at byte offsets.
//!
//! # Reference
//! - [ECMA-335 II.24.2.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// Zero-copy view over the `#Strings` heap.
///
/// Index 0 is the reserved empty entry and reads as `None`; every other index
/// yields the UTF-8 string starting at that offset, terminated by a zero byte.
///
/// # Examples
///
/// ```rust,ignore
/// let data = &[0u8, b'H', b'e', b'l', b'l', b'o', 0u8];
/// let strings = Strings::from(data)?;
/// assert_eq!(strings.get(1)?, Some("Hello"));
/// assert_eq!(strings.get(0)?, None);
/// ```
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a `Strings` view over a heap
    ///
    /// ## Arguments
    /// * 'data' - The stream bytes
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the
    /// mandatory zero byte.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is invalid"));
        }

        Ok(Strings { data })
    }

    /// Get the string starting at a heap offset.
    ///
    /// ## Arguments
    /// * 'index' - The heap offset (as stored in metadata tables)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds, the string is
    /// unterminated, or the bytes are not valid UTF-8.
    pub fn get(&self, index: usize) -> Result<Option<&'a str>> {
        if index == 0 {
            return Ok(None);
        }

        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(value) => match value.to_str() {
                Ok(value) => Ok(Some(value)),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 33] = [
            0x00,
            0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00, // "<Module>"
            0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x57, 0x6f, 0x72, 0x6c, 0x64, 0x00, // "HelloWorld"
            0x53, 0x79, 0x73, 0x74, 0x65, 0x6d, 0x00, // "System"
            0x4d, 0x61, 0x69, 0x6e, 0x00, // "Main"
        ];

        let strings = Strings::from(&data).unwrap();

        assert_eq!(strings.get(1).unwrap(), Some("<Module>"));
        assert_eq!(strings.get(10).unwrap(), Some("HelloWorld"));
        assert_eq!(strings.get(21).unwrap(), Some("System"));
        assert_eq!(strings.get(28).unwrap(), Some("Main"));

        // Offsets into the middle of an entry are valid suffixes
        assert_eq!(strings.get(11).unwrap(), Some("elloWorld"));
    }

    #[test]
    fn index_zero_is_null() {
        let data = [0x00, b'A', 0x00];
        let strings = Strings::from(&data).unwrap();
        assert_eq!(strings.get(0).unwrap(), None);
    }

    #[test]
    fn invalid_heap_rejected() {
        assert!(Strings::from(&[]).is_err());
        assert!(Strings::from(&[0x41, 0x00]).is_err());
    }

    #[test]
    fn out_of_bounds_index() {
        let data = [0x00, b'A', 0x00];
        let strings = Strings::from(&data).unwrap();
        assert!(matches!(strings.get(3), Err(OutOfBounds)));
    }

    #[test]
    fn unterminated_string_rejected() {
        let data = [0x00, b'A', b'B'];
        let strings = Strings::from(&data).unwrap();
        assert!(strings.get(1).is_err());
    }
}
