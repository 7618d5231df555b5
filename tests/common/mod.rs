//! In-process ZIP writer for test fixtures.
//!
//! Writes just enough of the format for the reader under test: local
//! headers, a central directory and an EOCD, optionally the ZIP64 records.
//! CRCs are left at zero since nothing verifies them.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::DeflateEncoder;

pub const STORED: u16 = 0;
pub const DEFLATE: u16 = 8;

#[derive(Default)]
pub struct ZipBuilder {
    body: Vec<u8>,
    central: Vec<u8>,
    count: u16,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entry
    pub fn file(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, STORED, 0, data.to_vec(), data.len())
    }

    /// Deflate-compressed entry
    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.deflated_claiming(name, data, data.len())
    }

    /// Deflate-compressed entry whose headers declare `size` decoded bytes
    pub fn deflated_claiming(self, name: &str, data: &[u8], size: usize) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let packed = encoder.finish().unwrap();
        self.entry(name, DEFLATE, 0, packed, size)
    }

    pub fn dir(self, name: &str) -> Self {
        self.entry(name, STORED, 0, Vec::new(), 0)
    }

    /// Entry flagged as encrypted; the bytes are stored as given
    pub fn encrypted(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, STORED, 0x0001, data.to_vec(), data.len())
    }

    /// Entry claiming an arbitrary compression method
    pub fn with_method(self, name: &str, method: u16, data: &[u8]) -> Self {
        self.entry(name, method, 0, data.to_vec(), data.len())
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.as_bytes().to_vec();
        self
    }

    /// Close with ZIP64 end records instead of the plain EOCD values
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    fn entry(mut self, name: &str, method: u16, flags: u16, data: Vec<u8>, size: usize) -> Self {
        let offset = self.body.len() as u32;
        let name = name.as_bytes();

        let lfh = &mut self.body;
        lfh.extend_from_slice(b"PK\x03\x04");
        lfh.write_u16::<LittleEndian>(20).unwrap();
        lfh.write_u16::<LittleEndian>(flags).unwrap();
        lfh.write_u16::<LittleEndian>(method).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap(); // time
        lfh.write_u16::<LittleEndian>(0).unwrap(); // date
        lfh.write_u32::<LittleEndian>(0).unwrap(); // crc
        lfh.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        lfh.write_u32::<LittleEndian>(size as u32).unwrap();
        lfh.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap();
        lfh.extend_from_slice(name);
        lfh.extend_from_slice(&data);

        let cd = &mut self.central;
        cd.extend_from_slice(b"PK\x01\x02");
        cd.write_u16::<LittleEndian>(20).unwrap();
        cd.write_u16::<LittleEndian>(20).unwrap();
        cd.write_u16::<LittleEndian>(flags).unwrap();
        cd.write_u16::<LittleEndian>(method).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap();
        cd.write_u32::<LittleEndian>(0).unwrap();
        cd.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        cd.write_u32::<LittleEndian>(size as u32).unwrap();
        cd.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap(); // extra
        cd.write_u16::<LittleEndian>(0).unwrap(); // comment
        cd.write_u16::<LittleEndian>(0).unwrap(); // disk
        cd.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        cd.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        cd.write_u32::<LittleEndian>(offset).unwrap();
        cd.extend_from_slice(name);

        self.count += 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = self.body;
        let cd_offset = out.len() as u64;
        let cd_size = self.central.len() as u64;
        out.extend_from_slice(&self.central);

        if self.zip64 {
            let eocd64_offset = out.len() as u64;
            out.extend_from_slice(b"PK\x06\x06");
            out.write_u64::<LittleEndian>(44).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(self.count as u64).unwrap();
            out.write_u64::<LittleEndian>(self.count as u64).unwrap();
            out.write_u64::<LittleEndian>(cd_size).unwrap();
            out.write_u64::<LittleEndian>(cd_offset).unwrap();

            out.extend_from_slice(b"PK\x06\x07");
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
            out.write_u32::<LittleEndian>(1).unwrap();
        }

        let (entries, size, offset) = if self.zip64 {
            (0xFFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)
        } else {
            (self.count, cd_size as u32, cd_offset as u32)
        };
        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(entries).unwrap();
        out.write_u16::<LittleEndian>(entries).unwrap();
        out.write_u32::<LittleEndian>(size).unwrap();
        out.write_u32::<LittleEndian>(offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.extend_from_slice(&self.comment);
        out
    }

    /// Build and write to `dir/name`, returning the full path
    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// `Archive2.zip` containing `Archive1.zip` containing `Program.cs`
pub fn two_level_fixture() -> ZipBuilder {
    let archive1 = ZipBuilder::new()
        .file("Program.cs", b"class Program {}")
        .dir("Properties/")
        .file("Properties/AssemblyInfo.cs", b"[assembly]")
        .build();
    ZipBuilder::new()
        .file("readme.txt", b"hello")
        .file("Archive1.zip", &archive1)
}
