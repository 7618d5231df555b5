use std::io::Read;
use std::sync::Arc;

use flate2::read::DeflateDecoder;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Upper bound on compressed bytes fetched when only a prefix is wanted
const PREFIX_CHUNK: u64 = 16 * 1024;

/// Largest entry decoded into memory as a whole
pub const MAX_DECODED_SIZE: u64 = 1 << 30;

/// An open ZIP archive: the parsed central directory plus its byte source.
///
/// Root archives wrap a [`LocalFileReader`](crate::io::LocalFileReader),
/// nested ones a [`MemoryReader`](crate::io::MemoryReader). Dropping the
/// archive releases whichever resource backs it.
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
}

impl<R: ReadAt> ZipArchive<R> {
    /// Parse the central directory of `reader`.
    pub async fn open(reader: R) -> Result<Self> {
        let parser = ZipParser::new(Arc::new(reader));
        let entries = parser.read_central_directory().await?;
        Ok(Self { parser, entries })
    }

    /// Entries in central-directory order
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Decode the full content of an entry.
    ///
    /// Output is capped at the size the central directory declares, so an
    /// entry that inflates further is rejected instead of filling memory.
    pub async fn read_entry(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        let declared = entry.uncompressed_size;
        if declared > MAX_DECODED_SIZE {
            bail!(
                "{} is too large to decode in memory ({} bytes)",
                entry.file_name,
                declared
            );
        }

        let raw = self.read_raw(entry, entry.compressed_size).await?;
        let capacity = declared.min(1 << 26);
        let data = decode(entry, raw, declared + 1, capacity as usize)?;
        if data.len() as u64 > declared {
            bail!(
                "{} inflates beyond its declared size of {} bytes",
                entry.file_name,
                declared
            );
        }
        Ok(data)
    }

    /// Decode at most `len` bytes from the start of an entry.
    ///
    /// Only as much compressed data as a prefix could need is read, so
    /// sniffing a large entry stays cheap. The result may be shorter than
    /// `len` when the entry is.
    pub async fn read_entry_prefix(&self, entry: &ZipFileEntry, len: usize) -> Result<Vec<u8>> {
        let wanted = match entry.compression_method {
            CompressionMethod::Stored => (len as u64).min(entry.compressed_size),
            _ => PREFIX_CHUNK.min(entry.compressed_size),
        };
        let raw = self.read_raw(entry, wanted).await?;
        decode(entry, raw, len as u64, len)
    }

    /// Read the first `len` bytes of an entry's stored (still compressed) data.
    async fn read_raw(&self, entry: &ZipFileEntry, len: u64) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            bail!("{} is an encrypted entry", entry.file_name);
        }
        if let CompressionMethod::Unknown(_) = entry.compression_method {
            bail!(
                "Unsupported compression method {} for {}",
                entry.compression_method.as_u16(),
                entry.file_name
            );
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        let mut buf = vec![0u8; len as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut buf)
            .await?;
        Ok(buf)
    }
}

/// Inflate `raw` according to the entry's method, stopping after `limit` bytes.
fn decode(entry: &ZipFileEntry, mut raw: Vec<u8>, limit: u64, capacity: usize) -> Result<Vec<u8>> {
    match entry.compression_method {
        CompressionMethod::Stored => {
            raw.truncate(limit.min(raw.len() as u64) as usize);
            Ok(raw)
        }
        CompressionMethod::Deflate => {
            let mut out = Vec::with_capacity(capacity);
            DeflateDecoder::new(raw.as_slice())
                .take(limit)
                .read_to_end(&mut out)
                .with_context(|| format!("Corrupted deflate data in {}", entry.file_name))?;
            Ok(out)
        }
        CompressionMethod::Unknown(_) => bail!(
            "Unsupported compression method {} for {}",
            entry.compression_method.as_u16(),
            entry.file_name
        ),
    }
}
