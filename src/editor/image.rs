use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use crate::editor::error::EditError;
use crate::llm::media::{detect_mime_type, normalize_mime_type, DEFAULT_IMAGE_MIME};

/// An encoded image as it travels between the file picker, the session slots
/// and the generation API. Slots replace these wholesale; the bytes are never
/// edited in place.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl AsRef<str>) -> Self {
        let mime_type = normalize_mime_type(mime_type.as_ref());
        let mime_type = if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME.to_string()
        } else {
            mime_type
        };
        Self { bytes, mime_type }
    }

    /// Decodes an inline base64 payload as returned by the API.
    pub fn from_base64(data: &str, mime_type: &str) -> Result<Self, EditError> {
        let bytes = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|err| EditError::InvalidImagePayload(err.to_string()))?;
        Ok(Self::new(bytes, mime_type))
    }

    pub fn from_data_url(url: &str) -> Result<Self, EditError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| EditError::ImageLoad("not a data URL".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EditError::ImageLoad("data URL has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| EditError::ImageLoad("data URL is not base64 encoded".to_string()))?;
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|err| EditError::ImageLoad(err.to_string()))?;
        Ok(Self::new(bytes, mime_type))
    }

    /// Reads an image file the way the file picker does: the bytes are kept
    /// as-is and the MIME type comes from content sniffing.
    pub async fn load(path: &Path) -> Result<Self, EditError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| EditError::ImageLoad(format!("{}: {}", path.display(), err)))?;
        if bytes.is_empty() {
            return Err(EditError::ImageLoad(format!("{} is empty", path.display())));
        }
        let mime_type = detect_mime_type(&bytes).ok_or_else(|| {
            EditError::ImageLoad(format!("{}: unrecognised file type", path.display()))
        })?;
        if !mime_type.starts_with("image/") {
            return Err(EditError::ImageLoad(format!(
                "{}: expected an image, found {}",
                path.display(),
                mime_type
            )));
        }
        debug!(path = %path.display(), mime_type = %mime_type, len = bytes.len(), "image loaded");
        Ok(Self::new(bytes, mime_type))
    }

    /// Accepts either an inline `data:` URL or a file path.
    pub async fn from_source(source: &str) -> Result<Self, EditError> {
        let source = source.trim();
        if source.starts_with("data:") {
            return Self::from_data_url(source);
        }
        Self::load(Path::new(source)).await
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Pixel dimensions read from the header, when the format is decodable.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}
