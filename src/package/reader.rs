//! Zero-copy parsing of package images.
//!
//! # Format
//!
//! ```text
//! [magic bytes]                     (request-supplied, compared verbatim)
//! [u32 LE section count]
//! per section:
//!   [u32 LE name length][name bytes (UTF-8)]
//!   [u32 LE data length][data bytes]
//! ```
//!
//! The reader borrows the image; section payloads are returned as slices
//! into it. Unknown section names are preserved and accessible, so newer
//! packages stay readable by older engines.

use super::error::PackageError;

/// One named section of a package image.
#[derive(Debug, Clone, Copy)]
struct Section<'a> {
    name: &'a str,
    data: &'a [u8],
}

/// Parsed view over a package image.
///
/// Holds borrowed slices only; the caller keeps the image alive.
#[derive(Debug)]
pub struct PackageReader<'a> {
    sections: Vec<Section<'a>>,
}

impl<'a> PackageReader<'a> {
    /// Parses `image`, validating the magic number first.
    ///
    /// The magic check runs before any structural parsing so that a file
    /// with the wrong magic is reported as a mismatch rather than as
    /// truncation noise.
    pub fn parse(image: &'a [u8], magic: &[u8]) -> Result<Self, PackageError> {
        if image.len() < magic.len() || &image[..magic.len()] != magic {
            return Err(PackageError::MagicMismatch {
                expected: magic.to_vec(),
            });
        }

        let mut cursor = Cursor {
            image,
            offset: magic.len(),
        };
        let count = cursor.read_u32()? as usize;

        let mut sections: Vec<Section<'a>> = Vec::with_capacity(count);
        for _ in 0..count {
            let name_offset = cursor.offset;
            let name_bytes = cursor.read_block()?;
            let name = std::str::from_utf8(name_bytes).map_err(|_| {
                PackageError::InvalidSectionName {
                    offset: name_offset,
                }
            })?;
            let data = cursor.read_block()?;

            if sections.iter().any(|section| section.name == name) {
                return Err(PackageError::DuplicateSection(name.to_string()));
            }
            sections.push(Section { name, data });
        }

        Ok(Self { sections })
    }

    /// Returns the payload of the named section, if present.
    pub fn section(&self, name: &str) -> Option<&'a [u8]> {
        self.sections
            .iter()
            .find(|section| section.name == name)
            .map(|section| section.data)
    }

    /// Iterates over section names in image order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.name)
    }

    /// Iterates over `(name, payload)` pairs in image order.
    pub fn sections(&self) -> impl Iterator<Item = (&'a str, &'a [u8])> + '_ {
        self.sections.iter().map(|section| (section.name, section.data))
    }

    /// Number of sections in the image.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the image carries no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

struct Cursor<'a> {
    image: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn read_u32(&mut self) -> Result<u32, PackageError> {
        let end = self
            .offset
            .checked_add(4)
            .filter(|end| *end <= self.image.len())
            .ok_or(PackageError::Truncated {
                offset: self.offset,
            })?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.image[self.offset..end]);
        self.offset = end;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a length-prefixed block.
    fn read_block(&mut self) -> Result<&'a [u8], PackageError> {
        let length = self.read_u32()? as usize;
        let image = self.image;
        let end = self
            .offset
            .checked_add(length)
            .filter(|end| *end <= image.len())
            .ok_or(PackageError::Truncated {
                offset: self.offset,
            })?;
        let block = &image[self.offset..end];
        self.offset = end;
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::writer::PackageWriter;

    const MAGIC: &[u8] = b"YMKT";

    fn sample_image() -> Vec<u8> {
        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("version", b"1.2.3");
        writer.add_section("dictionary", b"dict-bytes");
        writer.add_section("connection", b"conn-bytes");
        writer.to_bytes()
    }

    #[test]
    fn test_parse_finds_sections() {
        let image = sample_image();
        let reader = PackageReader::parse(&image, MAGIC).unwrap();

        assert_eq!(reader.len(), 3);
        assert_eq!(reader.section("version"), Some(&b"1.2.3"[..]));
        assert_eq!(reader.section("dictionary"), Some(&b"dict-bytes"[..]));
        assert_eq!(reader.section("missing"), None);
    }

    #[test]
    fn test_parse_preserves_section_order() {
        let image = sample_image();
        let reader = PackageReader::parse(&image, MAGIC).unwrap();
        let names: Vec<&str> = reader.section_names().collect();
        assert_eq!(names, vec!["version", "dictionary", "connection"]);
    }

    #[test]
    fn test_parse_rejects_wrong_magic() {
        let image = sample_image();
        let result = PackageReader::parse(&image, b"WRNG");
        assert!(matches!(result, Err(PackageError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_rejects_image_shorter_than_magic() {
        let result = PackageReader::parse(b"YM", MAGIC);
        assert!(matches!(result, Err(PackageError::MagicMismatch { .. })));
    }

    #[test]
    fn test_parse_rejects_truncated_section_count() {
        // Magic followed by a partial count field.
        let image = b"YMKT\x02\x00".to_vec();
        let result = PackageReader::parse(&image, MAGIC);
        assert!(matches!(result, Err(PackageError::Truncated { .. })));
    }

    #[test]
    fn test_parse_rejects_truncated_payload() {
        let mut image = sample_image();
        image.truncate(image.len() - 3);
        let result = PackageReader::parse(&image, MAGIC);
        assert!(matches!(result, Err(PackageError::Truncated { .. })));
    }

    #[test]
    fn test_parse_rejects_length_overrun() {
        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("version", b"1.0.0");
        let mut image = writer.to_bytes();
        // Inflate the declared payload length past the end of the image.
        let version_data_len_offset = MAGIC.len() + 4 + 4 + "version".len();
        image[version_data_len_offset] = 0xFF;
        let result = PackageReader::parse(&image, MAGIC);
        assert!(matches!(result, Err(PackageError::Truncated { .. })));
    }

    #[test]
    fn test_parse_rejects_duplicate_section() {
        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("version", b"1.0.0");
        writer.add_section("version", b"2.0.0");
        let image = writer.to_bytes();
        let result = PackageReader::parse(&image, MAGIC);
        assert!(matches!(result, Err(PackageError::DuplicateSection(name)) if name == "version"));
    }

    #[test]
    fn test_parse_rejects_invalid_section_name() {
        let mut image = MAGIC.to_vec();
        image.extend_from_slice(&1u32.to_le_bytes());
        image.extend_from_slice(&2u32.to_le_bytes());
        image.extend_from_slice(&[0xFF, 0xFE]); // not UTF-8
        image.extend_from_slice(&0u32.to_le_bytes());
        let result = PackageReader::parse(&image, MAGIC);
        assert!(matches!(
            result,
            Err(PackageError::InvalidSectionName { .. })
        ));
    }

    #[test]
    fn test_parse_accepts_unknown_sections() {
        let mut writer = PackageWriter::new(MAGIC);
        writer.add_section("version", b"1.0.0");
        writer.add_section("zipcode", b"extra");
        let image = writer.to_bytes();
        let reader = PackageReader::parse(&image, MAGIC).unwrap();
        assert_eq!(reader.section("zipcode"), Some(&b"extra"[..]));
    }

    #[test]
    fn test_parse_empty_package() {
        let writer = PackageWriter::new(MAGIC);
        let image = writer.to_bytes();
        let reader = PackageReader::parse(&image, MAGIC).unwrap();
        assert!(reader.is_empty());
    }
}
