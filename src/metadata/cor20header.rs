//! CLR 2.0 (Cor20) header parsing.
//!
//! The [`Cor20Header`] sits at the start of the CLR runtime data directory of
//! a PE image and locates the metadata root blob.
//!
//! # Reference
//! - [ECMA-335 II.25.3.3](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// The main CLI header, located at the beginning of the
/// `IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR` data directory of a PE image.
pub struct Cor20Header {
    /// Size of the header in bytes, shall be 72
    pub cb: u32,
    /// The minimum major runtime version required to run this program
    pub major_runtime_version: u16,
    /// The minor portion of the runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// Flags describing this runtime image
    pub flags: u32,
    /// Token of the `MethodDef` or `File` entry point for the image
    pub entry_point_token: u32,
    /// RVA of implementation-specific resources
    pub resource_rva: u32,
    /// Size of implementation-specific resources
    pub resource_size: u32,
    /// RVA of the strong name signature hash
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature hash
    pub strong_name_signature_size: u32,
    /// Always 0
    pub code_manager_table_rva: u32,
    /// Always 0
    pub code_manager_table_size: u32,
    /// RVA of the vtable fixup array
    pub vtable_fixups_rva: u32,
    /// Size of the vtable fixup array
    pub vtable_fixups_size: u32,
    /// Always 0
    pub export_address_table_jmp_rva: u32,
    /// Always 0
    pub export_address_table_jmp_size: u32,
    /// Always 0
    pub managed_native_header_rva: u32,
    /// Always 0
    pub managed_native_header_size: u32,
}

impl Cor20Header {
    /// Read a `Cor20Header` from a byte slice
    ///
    /// ## Arguments
    /// * 'data' - The byte slice from which the header is read
    ///
    /// # Errors
    /// Returns an error if the data is shorter than 72 bytes or the declared
    /// header size is wrong.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < 72 {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(data);

        let cb = parser.read_le::<u32>()?;
        if cb != 72 {
            return Err(malformed_error!(
                "Invalid CLR header size: expected 72, got {}",
                cb
            ));
        }

        let header = Cor20Header {
            cb,
            major_runtime_version: parser.read_le::<u16>()?,
            minor_runtime_version: parser.read_le::<u16>()?,
            meta_data_rva: parser.read_le::<u32>()?,
            meta_data_size: parser.read_le::<u32>()?,
            flags: parser.read_le::<u32>()?,
            entry_point_token: parser.read_le::<u32>()?,
            resource_rva: parser.read_le::<u32>()?,
            resource_size: parser.read_le::<u32>()?,
            strong_name_signature_rva: parser.read_le::<u32>()?,
            strong_name_signature_size: parser.read_le::<u32>()?,
            code_manager_table_rva: parser.read_le::<u32>()?,
            code_manager_table_size: parser.read_le::<u32>()?,
            vtable_fixups_rva: parser.read_le::<u32>()?,
            vtable_fixups_size: parser.read_le::<u32>()?,
            export_address_table_jmp_rva: parser.read_le::<u32>()?,
            export_address_table_jmp_size: parser.read_le::<u32>()?,
            managed_native_header_rva: parser.read_le::<u32>()?,
            managed_native_header_size: parser.read_le::<u32>()?,
        };

        if header.meta_data_rva == 0 || header.meta_data_size == 0 {
            return Err(malformed_error!(
                "CLR header declares no metadata - rva: {}, size: {}",
                header.meta_data_rva,
                header.meta_data_size
            ));
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_header() -> Vec<u8> {
        let mut data = vec![0u8; 72];
        data[0] = 72; // cb
        data[4] = 2; // major runtime version
        data[8..12].copy_from_slice(&0x2000_u32.to_le_bytes()); // metadata rva
        data[12..16].copy_from_slice(&0x1000_u32.to_le_bytes()); // metadata size
        data
    }

    #[test]
    fn crafted() {
        let header = Cor20Header::read(&valid_header()).unwrap();
        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.meta_data_rva, 0x2000);
        assert_eq!(header.meta_data_size, 0x1000);
    }

    #[test]
    fn bad_size_rejected() {
        let mut data = valid_header();
        data[0] = 64;
        assert!(Cor20Header::read(&data).is_err());
    }

    #[test]
    fn missing_metadata_rejected() {
        let mut data = valid_header();
        data[8..16].fill(0);
        assert!(Cor20Header::read(&data).is_err());
    }

    #[test]
    fn truncated_rejected() {
        assert!(matches!(
            Cor20Header::read(&[0u8; 40]),
            Err(OutOfBounds)
        ));
    }
}
