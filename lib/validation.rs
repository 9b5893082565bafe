//! Client-side checks run before anything leaves the machine.
//!
//! The contract never sees image bytes, so size and type limits are
//! enforced here, before the pinning upload.

use thiserror::Error;

pub const MAX_IMAGE_COUNT: usize = 10;
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] =
    ["gif", "jpeg", "jpg", "png", "webp"];

/// An image staged for upload.
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Lowercased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("no image files selected")]
    Empty,
    #[error("{count} images selected, maximum is {MAX_IMAGE_COUNT}")]
    TooMany { count: usize },
    #[error("image {index} ({name}): only images are allowed")]
    UnsupportedType { index: usize, name: String },
    #[error(
        "image {index} ({name}): {size} bytes exceeds the \
         {MAX_IMAGE_BYTES} byte limit"
    )]
    TooLarge {
        index: usize,
        name: String,
        size: usize,
    },
}

/// Check a staged image set, collecting every problem rather than
/// stopping at the first.
pub fn validate_image_files(
    files: &[ImageFile],
) -> Result<(), Vec<ImageError>> {
    let mut errors = Vec::new();

    if files.is_empty() {
        return Err(vec![ImageError::Empty]);
    }
    if files.len() > MAX_IMAGE_COUNT {
        errors.push(ImageError::TooMany { count: files.len() });
    }

    for (index, file) in files.iter().enumerate() {
        let extension = file.extension();
        let allowed = extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext));
        if !allowed {
            errors.push(ImageError::UnsupportedType {
                index,
                name: file.name.clone(),
            });
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            errors.push(ImageError::TooLarge {
                index,
                name: file.name.clone(),
                size: file.bytes.len(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("a category is required")]
    EmptyCategory,
    #[error("a description is required")]
    EmptyDescription,
}

/// Check the text fields of a new report before submission.
pub fn validate_report_input(
    category: &str,
    description: &str,
) -> Result<(), ReportError> {
    if category.trim().is_empty() {
        return Err(ReportError::EmptyCategory);
    }
    if description.trim().is_empty() {
        return Err(ReportError::EmptyDescription);
    }
    Ok(())
}
