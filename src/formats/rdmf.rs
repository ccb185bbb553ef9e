// .4rdmf codeplug file handler
//
// A .4rdmf file is the raw codeplug image: 275,456 bytes, no header, no
// metadata trailer. Anything else is rejected on load.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::memmap::image::{CodeplugImage, ImageError};

#[derive(Error, Debug)]
pub enum RdmfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] ImageError),
}

pub type Result<T> = std::result::Result<T, RdmfError>;

/// Load a codeplug image from a .4rdmf file.
pub fn load_rdmf(filename: impl AsRef<Path>) -> Result<CodeplugImage> {
    let mut file = File::open(filename)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(CodeplugImage::from_bytes(data)?)
}

/// Save a codeplug image to a .4rdmf file.
pub fn save_rdmf(filename: impl AsRef<Path>, image: &CodeplugImage) -> Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(image.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memmap::CODEPLUG_SIZE;
    use crate::models::{Contact, ContactKind};
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_load_roundtrip() -> Result<()> {
        let mut image = CodeplugImage::factory_fresh();
        image
            .set_contacts(&[Contact::new(0, "Alice", ContactKind::Private, 3114321)])
            .unwrap();

        let temp_file = NamedTempFile::new().unwrap();
        save_rdmf(temp_file.path(), &image)?;

        let loaded = load_rdmf(temp_file.path())?;
        assert_eq!(loaded.as_bytes(), image.as_bytes());
        assert_eq!(loaded.contacts().unwrap().len(), 1);
        Ok(())
    }

    #[test]
    fn test_truncated_file_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), vec![0u8; CODEPLUG_SIZE - 1]).unwrap();

        assert!(matches!(
            load_rdmf(temp_file.path()),
            Err(RdmfError::Image(ImageError::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), vec![0u8; CODEPLUG_SIZE + 16]).unwrap();
        assert!(load_rdmf(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_rdmf("/nonexistent/radio.4rdmf"),
            Err(RdmfError::Io(_))
        ));
    }
}
