//! `data:` URL codec for inline images.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use merchmagic_core::models::mockup::ImageData;

use crate::error::MockupError;

/// MIME type assumed for bare base64 input and untagged provider output.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Parse `data:<mime>;base64,<payload>` or bare base64 (taken as PNG).
pub fn parse(input: &str) -> Result<ImageData, MockupError> {
    let input = input.trim();
    let (mime_type, data) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (mime, data) = rest
                .split_once(";base64,")
                .ok_or_else(|| MockupError::InvalidImage("expected a base64 data URL".into()))?;
            if mime.is_empty() {
                return Err(MockupError::InvalidImage("missing MIME type".into()));
            }
            (mime, data)
        }
        None => (DEFAULT_MIME_TYPE, input),
    };

    if data.is_empty() {
        return Err(MockupError::InvalidImage("empty image payload".into()));
    }
    STANDARD
        .decode(data)
        .map_err(|e| MockupError::InvalidImage(format!("payload is not base64: {e}")))?;

    Ok(ImageData {
        mime_type: mime_type.to_owned(),
        data: data.to_owned(),
    })
}

pub fn to_data_url(image: &ImageData) -> String {
    format!("data:{};base64,{}", image.mime_type, image.data)
}
