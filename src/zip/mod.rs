//! ZIP archive parsing and entry decoding.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`archive`]: An open archive handle that lists and decodes entries
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first, then the Central Directory. Entry content is
//! only touched when a caller decodes it, which keeps listing cheap.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//!
//! ## Limitations
//!
//! - Encrypted entries can be listed but not decoded
//! - No multi-disk archive support
//! - No CRC verification

mod archive;
mod parser;
mod structures;

pub use archive::{MAX_DECODED_SIZE, ZipArchive};
pub use parser::ZipParser;
pub use structures::*;
