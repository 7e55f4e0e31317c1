//! Mockup generation inputs and outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Merchandise the logo can be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    TShirt,
    Hoodie,
    Cap,
    ToteBag,
    Mug,
    PhoneCase,
    Poster,
}

impl ProductType {
    pub const ALL: [ProductType; 7] = [
        Self::TShirt,
        Self::Hoodie,
        Self::Cap,
        Self::ToteBag,
        Self::Mug,
        Self::PhoneCase,
        Self::Poster,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TShirt => "t-shirt",
            Self::Hoodie => "hoodie",
            Self::Cap => "cap",
            Self::ToteBag => "tote-bag",
            Self::Mug => "mug",
            Self::PhoneCase => "phone-case",
            Self::Poster => "poster",
        }
    }
}

/// An inline image: base64 payload tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub mime_type: String,
    /// Standard base64, no data-URL prefix.
    pub data: String,
}

/// What the caller asks the image provider to produce.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Create {
        logo: ImageData,
        product_type: ProductType,
        color: Option<String>,
        prompt: Option<String>,
    },
    Edit {
        current_mockup: ImageData,
        logo: ImageData,
        instruction: String,
        product_type: Option<ProductType>,
    },
}

impl GenerationRequest {
    pub fn product_type(&self) -> Option<ProductType> {
        match self {
            Self::Create { product_type, .. } => Some(*product_type),
            Self::Edit { product_type, .. } => *product_type,
        }
    }

    /// The free-text part supplied by the user, if any.
    pub fn user_prompt(&self) -> Option<&str> {
        match self {
            Self::Create { prompt, .. } => prompt.as_deref(),
            Self::Edit { instruction, .. } => Some(instruction.as_str()),
        }
    }
}

/// A successfully generated mockup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMockup {
    pub id: Uuid,
    pub image: ImageData,
    pub product_type: Option<ProductType>,
    pub prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    /// The caller's counter after this generation was charged.
    pub generations_used_today: u32,
}
