//! Stream headers of the metadata root.
//!
//! Each stream header names one metadata stream and locates it relative to the
//! metadata root. Headers are variable-length: the name is a zero-terminated
//! string padded to a 4-byte boundary.
//!
//! # Reference
//! - [ECMA-335 II.24.2.2](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::io::read_le, Error::OutOfBounds, Result};

/// The set of stream names a conforming image may carry.
const VALID_NAMES: [&str; 6] = ["#~", "#-", "#Strings", "#US", "#GUID", "#Blob"];

/// A stream header: name, offset and size of one metadata stream.
///
/// The offset is relative to the start of the metadata root. The on-disk size
/// of a header depends on its name length; [`StreamHeader::byte_size`] reports
/// how far the directory cursor must advance past this entry.
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream, at most 32 characters
    pub name: String,
}

impl StreamHeader {
    /// Read a `StreamHeader` from a byte slice
    ///
    /// ## Arguments
    /// * 'data' - The byte slice positioned at the start of the header
    ///
    /// # Errors
    /// Returns an error if the data is too short or the stream name is not one
    /// of the names ECMA-335 defines.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let mut name = String::with_capacity(32);
        for counter in 0..std::cmp::min(32, data.len() - 8) {
            let name_char = read_le::<u8>(&data[8 + counter..])?;
            if name_char == 0 {
                break;
            }

            name.push(char::from(name_char));
        }

        if !VALID_NAMES.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// The on-disk size of this header: 8 bytes plus the zero-terminated name
    /// padded to a 4-byte boundary.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        8 + (self.name.len() + 1).div_ceil(4) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
        assert_eq!(parsed_header.byte_size(), 12);
    }

    #[test]
    fn crafted_invalid_name() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x24, 0x7E, 0x00,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
    }

    #[test]
    fn padded_name_size() {
        let mut header_bytes = vec![0u8; 20];
        header_bytes[8..16].copy_from_slice(b"#Strings");

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();
        assert_eq!(parsed_header.name, "#Strings");
        // "#Strings" + terminator is 9 bytes, padded to 12
        assert_eq!(parsed_header.byte_size(), 20);
    }
}
