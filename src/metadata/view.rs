//! Shared, parsed view of one metadata image.
//!
//! [`MetadataView`] owns the metadata bytes (either a whole PE image or a bare
//! metadata root blob) together with the parsed [`Root`], heaps and tables
//! borrowing into them. Loaded members of the object model hold an
//! `Arc<MetadataView>` and source their lazy fields from it, so the backing
//! bytes live exactly as long as anything still reads from them.

use ouroboros::self_referencing;
use std::{path::Path, sync::Arc};

use crate::{
    file::ImageFile,
    metadata::{
        cor20header::Cor20Header,
        root::Root,
        streams::{Blob, GuidHeap, Strings, TablesHeader, UserStrings},
    },
    Result,
};

/// Where the metadata bytes come from.
enum MetadataSource {
    /// A full PE image; the metadata root sits inside it
    Image {
        file: Arc<ImageFile>,
        offset: usize,
        size: usize,
        cor20: Cor20Header,
    },
    /// A bare metadata root blob with no PE container
    Raw(Vec<u8>),
}

impl MetadataSource {
    fn metadata(&self) -> &[u8] {
        match self {
            MetadataSource::Image { file, offset, size, .. } => {
                &file.data()[*offset..*offset + *size]
            }
            MetadataSource::Raw(data) => data,
        }
    }
}

/// The structures parsed out of the metadata blob.
struct ViewData<'a> {
    root: Root,
    tables: Option<TablesHeader<'a>>,
    strings: Option<Strings<'a>>,
    userstrings: Option<UserStrings<'a>>,
    guids: Option<GuidHeap<'a>>,
    blobs: Option<Blob<'a>>,
}

impl<'a> ViewData<'a> {
    fn parse(data: &'a [u8]) -> Result<Self> {
        let root = Root::read(data)?;

        let mut tables = None;
        let mut strings = None;
        let mut userstrings = None;
        let mut guids = None;
        let mut blobs = None;

        for stream in &root.stream_headers {
            // Root::read validated every stream span
            let stream_data = &data[stream.offset as usize..(stream.offset + stream.size) as usize];

            match stream.name.as_str() {
                "#~" | "#-" => tables = Some(TablesHeader::from(stream_data)?),
                "#Strings" => strings = Some(Strings::from(stream_data)?),
                "#US" => userstrings = Some(UserStrings::from(stream_data)?),
                "#GUID" => guids = Some(GuidHeap::from(stream_data)?),
                "#Blob" => blobs = Some(Blob::from(stream_data)?),
                _ => {}
            }
        }

        Ok(ViewData {
            root,
            tables,
            strings,
            userstrings,
            guids,
            blobs,
        })
    }
}

#[self_referencing]
/// Owns one metadata image and every parsed structure borrowing into it.
///
/// Constructed from a PE file on disk, PE bytes in memory, an already-loaded
/// [`ImageFile`], or a bare metadata root blob. All loaded members created
/// from a view share it through an `Arc`.
pub struct MetadataView {
    source: MetadataSource,
    #[borrows(source)]
    #[covariant]
    data: ViewData<'this>,
}

impl MetadataView {
    /// Open a PE file and parse its metadata directory.
    ///
    /// ## Arguments
    /// * 'path' - Path to the image on disk
    ///
    /// # Errors
    /// Returns an error if the file is not a .NET PE image or its metadata is
    /// malformed.
    pub fn from_file(path: &Path) -> Result<Arc<MetadataView>> {
        Self::from_image(Arc::new(ImageFile::from_file(path)?))
    }

    /// Parse the metadata directory of PE bytes held in memory.
    ///
    /// ## Arguments
    /// * 'data' - The bytes of the PE image
    ///
    /// # Errors
    /// Returns an error if the bytes are not a .NET PE image or its metadata
    /// is malformed.
    pub fn from_bytes(data: Vec<u8>) -> Result<Arc<MetadataView>> {
        Self::from_image(Arc::new(ImageFile::from_mem(data)?))
    }

    /// Parse the metadata directory of an already-loaded PE image.
    ///
    /// ## Arguments
    /// * 'file' - The loaded image
    ///
    /// # Errors
    /// Returns an error if the CLR directory or metadata root is malformed.
    pub fn from_image(file: Arc<ImageFile>) -> Result<Arc<MetadataView>> {
        let (clr_rva, clr_size) = file.clr();
        let clr_offset = file.rva_to_offset(clr_rva)?;
        let cor20 = Cor20Header::read(file.data_slice(clr_offset, clr_size)?)?;

        let offset = file.rva_to_offset(cor20.meta_data_rva as usize)?;
        let size = cor20.meta_data_size as usize;
        file.data_slice(offset, size)?;

        Self::from_source(MetadataSource::Image {
            file,
            offset,
            size,
            cor20,
        })
    }

    /// Parse a bare metadata root blob (starting with the `BSJB` signature)
    /// that is not wrapped in a PE container.
    ///
    /// ## Arguments
    /// * 'data' - The metadata bytes
    ///
    /// # Errors
    /// Returns an error if the blob is malformed.
    pub fn from_metadata(data: Vec<u8>) -> Result<Arc<MetadataView>> {
        Self::from_source(MetadataSource::Raw(data))
    }

    fn from_source(source: MetadataSource) -> Result<Arc<MetadataView>> {
        Ok(Arc::new(MetadataView::try_new(source, |source| {
            ViewData::parse(source.metadata())
        })?))
    }

    /// The metadata root header and stream directory.
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.borrow_data().root
    }

    /// The Cor20 header, when this view was loaded from a PE image.
    #[must_use]
    pub fn cor20(&self) -> Option<&Cor20Header> {
        match self.borrow_source() {
            MetadataSource::Image { cor20, .. } => Some(cor20),
            MetadataSource::Raw(_) => None,
        }
    }

    /// The PE image backing this view, when loaded from one.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<ImageFile>> {
        match self.borrow_source() {
            MetadataSource::Image { file, .. } => Some(file),
            MetadataSource::Raw(_) => None,
        }
    }

    /// The tables stream, if present.
    #[must_use]
    pub fn tables(&self) -> Option<&TablesHeader<'_>> {
        self.borrow_data().tables.as_ref()
    }

    /// The tables stream, or a structural error if the image carries none.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the `#~` stream is missing.
    pub fn tables_required(&self) -> Result<&TablesHeader<'_>> {
        self.tables()
            .ok_or_else(|| malformed_error!("Image carries no #~ stream"))
    }

    /// The `#Strings` heap, if present.
    #[must_use]
    pub fn strings(&self) -> Option<&Strings<'_>> {
        self.borrow_data().strings.as_ref()
    }

    /// The `#US` heap, if present.
    #[must_use]
    pub fn userstrings(&self) -> Option<&UserStrings<'_>> {
        self.borrow_data().userstrings.as_ref()
    }

    /// The `#GUID` heap, if present.
    #[must_use]
    pub fn guids(&self) -> Option<&GuidHeap<'_>> {
        self.borrow_data().guids.as_ref()
    }

    /// The `#Blob` heap, if present.
    #[must_use]
    pub fn blobs(&self) -> Option<&Blob<'_>> {
        self.borrow_data().blobs.as_ref()
    }

    /// Read an owned copy of a `#Strings` entry; `None` for index 0.
    ///
    /// ## Arguments
    /// * 'index' - The heap offset from a table row
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the entry is invalid.
    pub fn string_at(&self, index: u32) -> Result<Option<String>> {
        if index == 0 {
            return Ok(None);
        }

        let strings = self
            .strings()
            .ok_or_else(|| malformed_error!("Image carries no #Strings heap"))?;
        Ok(strings.get(index as usize)?.map(str::to_string))
    }

    /// Read an owned copy of a `#Blob` entry.
    ///
    /// ## Arguments
    /// * 'index' - The heap offset from a table row
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the entry is invalid.
    pub fn blob_at(&self, index: u32) -> Result<Vec<u8>> {
        let blobs = self
            .blobs()
            .ok_or_else(|| malformed_error!("Image carries no #Blob heap"))?;
        Ok(blobs.get(index as usize)?.to_vec())
    }

    /// Read a `#GUID` entry; `None` for index 0.
    ///
    /// ## Arguments
    /// * 'index' - The 1-based heap index from a table row
    ///
    /// # Errors
    /// Returns an error if the heap is missing or the index is out of range.
    pub fn guid_at(&self, index: u32) -> Result<Option<uguid::Guid>> {
        if index == 0 {
            return Ok(None);
        }

        let guids = self
            .guids()
            .ok_or_else(|| malformed_error!("Image carries no #GUID heap"))?;
        guids.get_optional(index as usize)
    }
}
