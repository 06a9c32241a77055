//! Building package images.
//!
//! The writer is the producing half of the format documented in
//! [`reader`](super::reader): packaging tooling uses it to assemble engine
//! data files, and tests use it to fabricate fixtures. Sections are written
//! in insertion order.

use std::fs;
use std::io;
use std::path::Path;

/// Assembles a package image from named sections.
#[derive(Debug, Clone)]
pub struct PackageWriter {
    magic: Vec<u8>,
    sections: Vec<(String, Vec<u8>)>,
}

impl PackageWriter {
    /// Creates a writer that stamps `magic` at the head of the image.
    pub fn new(magic: impl Into<Vec<u8>>) -> Self {
        Self {
            magic: magic.into(),
            sections: Vec::new(),
        }
    }

    /// Appends a section. Duplicate names are not checked here; the reader
    /// rejects them at parse time.
    pub fn add_section(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.sections.push((name.into(), data.into()));
        self
    }

    /// Serializes the image to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload: usize = self
            .sections
            .iter()
            .map(|(name, data)| 8 + name.len() + data.len())
            .sum();
        let mut image = Vec::with_capacity(self.magic.len() + 4 + payload);

        image.extend_from_slice(&self.magic);
        image.extend_from_slice(&(self.sections.len() as u32).to_le_bytes());
        for (name, data) in &self.sections {
            image.extend_from_slice(&(name.len() as u32).to_le_bytes());
            image.extend_from_slice(name.as_bytes());
            image.extend_from_slice(&(data.len() as u32).to_le_bytes());
            image.extend_from_slice(data);
        }
        image
    }

    /// Writes the image to `path`, overwriting any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::reader::PackageReader;

    const MAGIC: &[u8] = b"YMKT";

    #[test]
    fn test_written_image_parses_back() {
        let mut writer = PackageWriter::new(MAGIC);
        writer
            .add_section("version", b"2.0.1")
            .add_section("dictionary", vec![1, 2, 3]);
        let image = writer.to_bytes();

        let reader = PackageReader::parse(&image, MAGIC).unwrap();
        assert_eq!(reader.section("version"), Some(&b"2.0.1"[..]));
        assert_eq!(reader.section("dictionary"), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_image_starts_with_magic() {
        let writer = PackageWriter::new(MAGIC);
        let image = writer.to_bytes();
        assert!(image.starts_with(MAGIC));
    }

    #[test]
    fn test_write_to_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.data");

        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("version", b"1.0.0");
        writer.write_to(&path).unwrap();

        let image = fs::read(&path).unwrap();
        assert_eq!(image, writer.to_bytes());
    }

    #[test]
    fn test_empty_section_payload_roundtrips() {
        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("segmenter", b"");
        let image = writer.to_bytes();
        let reader = PackageReader::parse(&image, MAGIC).unwrap();
        assert_eq!(reader.section("segmenter"), Some(&b""[..]));
    }
}
