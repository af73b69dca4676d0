//! Profile photo storage.
//!
//! # Responsibilities
//! - Turn the client's image intent into an explicit keep / clear / replace
//! - Decode uploads and shrink them to fit a `THUMBNAIL_SIZE` square
//! - Write the re-encoded JPEG under `<media root>/photo/` with a generated name

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use uuid::Uuid;

use crate::model::{FieldErrors, ImageRef};

const PHOTO_DIR: &str = "photo";

/// Stored photos fit within this many pixels on each side.
pub const THUMBNAIL_SIZE: u32 = 200;
const JPEG_QUALITY: u8 = 75;

pub const MSG_INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const MSG_CONTRADICTION: &str =
    "Please either submit a file or check the clear checkbox, not both.";

/// An uploaded file, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A decoded upload, shrunk and re-encoded as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Photo {
    /// Decode `upload`, shrink it to fit the thumbnail square and encode it.
    ///
    /// Images already within the square keep their size.
    pub fn from_upload(upload: &Upload) -> Result<Self, ImageError> {
        let decoded = image::load_from_memory(&upload.bytes)?;
        let fitted = if decoded.width() > THUMBNAIL_SIZE || decoded.height() > THUMBNAIL_SIZE {
            decoded.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
        } else {
            decoded
        };
        Self::encode(&fitted)
    }

    fn encode(image: &DynamicImage) -> Result<Self, ImageError> {
        // JPEG carries no alpha channel.
        let rgb = image.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;
        Ok(Self {
            jpeg,
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}

/// What the client asked to happen to the stored photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Keep,
    Clear,
    Replace(Photo),
}

impl ImageChange {
    /// Combine a (possibly empty) file part with the clear checkbox.
    ///
    /// A replacement is decoded here, so an unreadable file never reaches storage.
    pub fn from_parts(upload: Option<Upload>, clear: bool) -> Result<Self, FieldErrors> {
        let upload = upload.filter(|u| !u.bytes.is_empty());
        match (upload, clear) {
            (Some(_), true) => Err(image_error(MSG_CONTRADICTION)),
            (Some(upload), false) => match Photo::from_upload(&upload) {
                Ok(photo) => Ok(ImageChange::Replace(photo)),
                Err(e) => {
                    tracing::debug!(
                        file = ?upload.file_name,
                        bytes = upload.bytes.len(),
                        error = %e,
                        "Rejected image upload"
                    );
                    Err(image_error(MSG_INVALID_IMAGE))
                }
            },
            (None, true) => Ok(ImageChange::Clear),
            (None, false) => Ok(ImageChange::Keep),
        }
    }
}

fn image_error(message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add("image", message);
    errors
}

/// Filesystem store for profile photos.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored image.
    pub fn path_of(&self, image: &ImageRef) -> PathBuf {
        self.root.join(&image.path)
    }

    /// Write a photo and describe it.
    pub fn save(&self, photo: &Photo) -> io::Result<ImageRef> {
        let dir = self.root.join(PHOTO_DIR);
        fs::create_dir_all(&dir)?;

        let name = format!("{}.jpg", Uuid::new_v4());
        fs::write(dir.join(&name), &photo.jpeg)?;

        tracing::info!(
            file = %name,
            bytes = photo.jpeg.len(),
            width = photo.width,
            height = photo.height,
            "Stored photo"
        );
        Ok(ImageRef {
            path: format!("{}/{}", PHOTO_DIR, name),
            width: Some(photo.width),
            height: Some(photo.height),
        })
    }

    /// Delete a stored image. A file that is already gone is not an error.
    pub fn remove(&self, image: &ImageRef) -> io::Result<()> {
        match fs::remove_file(self.path_of(image)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
