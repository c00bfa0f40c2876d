//! Metadata streams and heaps.
//!
//! The metadata root carries up to six named streams. The four heaps
//! ([`Strings`], [`Blob`], [`GuidHeap`], [`UserStrings`]) are byte blobs
//! addressed by offset or index; the tables stream ([`TablesHeader`]) is the
//! row-oriented store everything else references into. All views borrow the
//! underlying stream bytes; nothing is copied up front.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;
mod userstrings;

pub use blob::Blob;
pub use guid::GuidHeap;
pub use streamheader::StreamHeader;
pub use strings::Strings;
pub use tablesheader::TablesHeader;
pub use userstrings::UserStrings;
