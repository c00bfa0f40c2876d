//! Metadata root header and stream directory.
//!
//! The [`Root`] is the entry point for reading .NET metadata: it validates the
//! `BSJB` signature, carries the runtime version string, and lists the stream
//! headers that locate `#~`, `#Strings`, `#US`, `#GUID` and `#Blob` within the
//! metadata blob.
//!
//! # Reference
//! - [ECMA-335 II.24.2.1](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The magic value opening a metadata root
pub const METADATA_MAGIC: u32 = 0x424A_5342;

/// The header of the metadata blob, with the stream directory required to
/// locate every metadata stream.
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string, rounded up to 4
    pub length: u32,
    /// The runtime version string, without padding
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read a [`Root`] from the start of the metadata blob.
    ///
    /// ## Arguments
    /// * 'data' - The metadata blob, starting with the `BSJB` signature
    ///
    /// # Errors
    /// Returns an error if the data is too short, the signature does not
    /// match, the version string is degenerate, or the stream directory is
    /// malformed (bad count, duplicate or unknown names, out-of-range spans).
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 20 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != METADATA_MAGIC {
            return Err(malformed_error!(
                "Metadata signature does not match BSJB - {:#010x}",
                signature
            ));
        }

        let version_length = read_le_at::<u32>(data, &mut 12_usize)?;
        let Some(version_end) = (version_length as usize).checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causes overflow - {}",
                version_length
            ));
        };
        if version_end + 4 > data.len() {
            return Err(OutOfBounds);
        }
        if version_length == 0 || version_length > 255 {
            return Err(malformed_error!(
                "Unreasonable version string length - {}",
                version_length
            ));
        }

        let version_bytes = &data[16..version_end];
        let terminator = version_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8(version_bytes[..terminator].to_vec())
            .map_err(|_| malformed_error!("Version string is not valid UTF-8"))?;

        let flags = read_le::<u16>(&data[version_end..])?;
        let stream_number = read_le::<u16>(&data[version_end + 2..])?;
        if stream_number == 0 || stream_number > 6 {
            return Err(malformed_error!("Invalid stream count - {}", stream_number));
        }

        let mut stream_headers = Vec::with_capacity(stream_number as usize);
        let mut stream_offset = version_end + 4;
        let mut seen: Vec<String> = Vec::with_capacity(stream_number as usize);

        for _ in 0..stream_number {
            if stream_offset >= data.len() {
                return Err(OutOfBounds);
            }

            let header = StreamHeader::from(&data[stream_offset..])?;

            if seen.iter().any(|name| *name == header.name) {
                return Err(malformed_error!("Duplicate stream - {}", header.name));
            }
            seen.push(header.name.clone());

            let Some(stream_end) = header.offset.checked_add(header.size) else {
                return Err(malformed_error!(
                    "Stream span overflows - {} + {}",
                    header.offset,
                    header.size
                ));
            };
            if stream_end as usize > data.len() {
                return Err(OutOfBounds);
            }

            stream_offset += header.byte_size();
            stream_headers.push(header);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_length,
            version,
            flags,
            stream_number,
            stream_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crafted_root() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&METADATA_MAGIC.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes()); // major
        data.extend_from_slice(&1u16.to_le_bytes()); // minor
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved
        data.extend_from_slice(&8u32.to_le_bytes()); // version length (padded)
        data.extend_from_slice(b"v4.0.1\0\0");
        data.extend_from_slice(&0u16.to_le_bytes()); // flags
        data.extend_from_slice(&1u16.to_le_bytes()); // stream count
        data.extend_from_slice(&32u32.to_le_bytes()); // stream offset
        data.extend_from_slice(&4u32.to_le_bytes()); // stream size
        data.extend_from_slice(b"#~\0\0");
        data.resize(64, 0);
        data
    }

    #[test]
    fn crafted() {
        let root = Root::read(&crafted_root()).unwrap();

        assert_eq!(root.signature, METADATA_MAGIC);
        assert_eq!(root.version, "v4.0.1");
        assert_eq!(root.stream_number, 1);
        assert_eq!(root.stream_headers.len(), 1);
        assert_eq!(root.stream_headers[0].name, "#~");
        assert_eq!(root.stream_headers[0].offset, 32);
        assert_eq!(root.stream_headers[0].size, 4);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut data = crafted_root();
        data[0] = 0xFF;
        assert!(Root::read(&data).is_err());
    }

    #[test]
    fn stream_crossing_end_rejected() {
        let mut data = crafted_root();
        // stream size beyond the blob
        data[32..36].copy_from_slice(&0x1000_u32.to_le_bytes());
        assert!(Root::read(&data).is_err());
    }

    #[test]
    fn zero_streams_rejected() {
        let mut data = crafted_root();
        data[26..28].copy_from_slice(&0u16.to_le_bytes());
        assert!(Root::read(&data).is_err());
    }
}
