//! Builders for crafting minimal metadata images in memory.
//!
//! The loader tests assemble a metadata root (`BSJB` signature, stream
//! directory, `#~` plus heaps) byte by byte and feed it through
//! `MetadataView::from_metadata`, exercising the whole reader stack without
//! any file on disk.

/// Incrementally built `#Strings` heap.
pub struct StringsHeap {
    data: Vec<u8>,
}

impl StringsHeap {
    pub fn new() -> Self {
        StringsHeap { data: vec![0] }
    }

    /// Append a string, returning its heap offset.
    pub fn add(&mut self, value: &str) -> u32 {
        let index = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        index
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Incrementally built `#Blob` heap.
pub struct BlobHeap {
    data: Vec<u8>,
}

impl BlobHeap {
    pub fn new() -> Self {
        BlobHeap { data: vec![0] }
    }

    /// Append a blob (short-form length), returning its heap offset.
    pub fn add(&mut self, value: &[u8]) -> u32 {
        assert!(value.len() < 0x80, "short-form blobs only");
        let index = self.data.len() as u32;
        self.data.push(value.len() as u8);
        self.data.extend_from_slice(value);
        index
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Assemble a `#~` stream from (table id, row count, body) triples, which
/// must be given in ascending table-id order.
pub fn tables_stream(sorted: u64, tables: &[(usize, u32, Vec<u8>)]) -> Vec<u8> {
    let mut valid = 0u64;
    for (id, _, _) in tables {
        valid |= 1u64 << id;
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.push(2); // major version
    out.push(0); // minor version
    out.push(0); // heap size flags: all 2-byte indexes
    out.push(1); // reserved
    out.extend_from_slice(&valid.to_le_bytes());
    out.extend_from_slice(&sorted.to_le_bytes());

    for (_, rows, _) in tables {
        out.extend_from_slice(&rows.to_le_bytes());
    }
    for (_, _, body) in tables {
        out.extend_from_slice(body);
    }

    out
}

/// Assemble a metadata root around the given named streams.
pub fn build_metadata(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let version = b"v4.0.30319\0\0"; // padded to a 4-byte boundary

    let mut headers_size = 0usize;
    for (name, _) in streams {
        headers_size += 8 + (name.len() + 1).div_ceil(4) * 4;
    }
    let data_start = 16 + version.len() + 4 + headers_size;

    let mut out = Vec::new();
    out.extend_from_slice(&0x424A_5342u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // major
    out.extend_from_slice(&1u16.to_le_bytes()); // minor
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&(version.len() as u32).to_le_bytes());
    out.extend_from_slice(version);
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

    let mut offset = data_start;
    for (name, data) in streams {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        offset += data.len();
    }

    assert_eq!(out.len(), data_start);
    for (_, data) in streams {
        out.extend_from_slice(data);
    }

    out
}

/// Row builder helpers writing little-endian columns.
pub struct RowBytes {
    data: Vec<u8>,
}

impl RowBytes {
    pub fn new() -> Self {
        RowBytes { data: Vec::new() }
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// A 2-byte heap or table index.
    pub fn idx(self, value: u32) -> Self {
        self.u16(value as u16)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
