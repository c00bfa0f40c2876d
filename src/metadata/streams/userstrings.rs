//! User string heap (`#US`).
//!
//! String literals referenced by IL, stored as length-prefixed UTF-16 with a
//! trailing flag byte.
//!
//! # Reference
//! - [ECMA-335 II.24.2.4](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use widestring::U16CStr;

use crate::{Error::OutOfBounds, Result};

/// Zero-copy view over the `#US` heap.
///
/// Each entry is a blob (compressed length prefix) of UTF-16 code units
/// followed by one flag byte. Index 0 is the reserved empty entry.
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a `UserStrings` view over a heap
    ///
    /// ## Arguments
    /// * 'data' - The stream bytes
    ///
    /// # Errors
    /// Returns an error if the heap is empty or does not start with the
    /// mandatory zero byte.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #US heap is invalid"));
        }

        Ok(UserStrings { data })
    }

    /// Get the user string stored at a heap offset.
    ///
    /// ## Arguments
    /// * 'index' - The heap offset (as referenced by `ldstr` tokens)
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the UTF-16 data is
    /// invalid.
    pub fn get(&self, index: usize) -> Result<String> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let blob = crate::metadata::streams::Blob { data: self.data }.get(index)?;
        if blob.is_empty() {
            return Ok(String::new());
        }

        // The trailing byte flags whether any character needs special handling;
        // it is not part of the string.
        let utf16_bytes = &blob[..blob.len() - 1];
        if utf16_bytes.len() % 2 != 0 {
            return Err(malformed_error!(
                "Invalid user string length at index - {}",
                index
            ));
        }

        let mut code_units: Vec<u16> = Vec::with_capacity(utf16_bytes.len() / 2);
        for pair in utf16_bytes.chunks_exact(2) {
            code_units.push(u16::from_le_bytes([pair[0], pair[1]]));
        }

        match U16CStr::from_slice_truncate(&code_units) {
            Ok(value) => Ok(value.to_string_lossy()),
            Err(_) => String::from_utf16(&code_units)
                .map_err(|_| malformed_error!("Invalid user string at index - {}", index)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 29] = [
            0x00,
            0x1b, // blob length: 13 UTF-16 chars + flag byte
            0x48, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x2c, 0x00, 0x20, 0x00,
            0x57, 0x00, 0x6f, 0x00, 0x72, 0x00, 0x6c, 0x00, 0x64, 0x00, 0x21, 0x00,
            0x00, // flag byte
        ];

        let us = UserStrings::from(&data).unwrap();
        assert_eq!(us.get(1).unwrap(), "Hello, World!");
    }

    #[test]
    fn index_zero_is_empty() {
        let data = [0x00, 0x00];
        let us = UserStrings::from(&data).unwrap();
        assert_eq!(us.get(0).unwrap(), "");
    }

    #[test]
    fn invalid_heap_rejected() {
        assert!(UserStrings::from(&[]).is_err());
        assert!(UserStrings::from(&[0x22, 0x1b]).is_err());
    }

    #[test]
    fn truncated_entry_rejected() {
        let data = [0x00, 0x0A, 0x48, 0x00];
        let us = UserStrings::from(&data).unwrap();
        assert!(us.get(1).is_err());
    }
}
