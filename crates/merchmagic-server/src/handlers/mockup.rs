//! Mockup create and edit.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use merchmagic_core::error::MerchError;
use merchmagic_core::models::mockup::{GeneratedMockup, GenerationRequest, ProductType};
use merchmagic_mockup::data_url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_account;
use crate::error::ApiError;
use crate::session::SessionToken;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMockupBody {
    /// Data URL or bare base64.
    pub logo: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMockupBody {
    pub current_mockup: String,
    pub logo: String,
    pub instruction: String,
    #[serde(default)]
    pub product_type: Option<ProductType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupResponse {
    pub success: bool,
    pub id: Uuid,
    pub image_url: String,
    pub product_type: Option<ProductType>,
    pub prompt: Option<String>,
    pub created_at: i64,
    pub generations_used: u32,
}

impl From<GeneratedMockup> for MockupResponse {
    fn from(mockup: GeneratedMockup) -> Self {
        Self {
            success: true,
            id: mockup.id,
            image_url: data_url::to_data_url(&mockup.image),
            product_type: mockup.product_type,
            prompt: mockup.prompt,
            created_at: mockup.created_at.timestamp_millis(),
            generations_used: mockup.generations_used_today,
        }
    }
}

/// Unwrap a JSON body, rendering rejections as `validation_failed`.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| MerchError::validation(rejection.body_text()).into())
}

// The caller is resolved before the body is looked at, so an anonymous
// request is always `unauthenticated` whatever it carries.
pub async fn generate(
    State(state): State<AppState>,
    token: SessionToken,
    body: Result<Json<CreateMockupBody>, JsonRejection>,
) -> Result<Json<MockupResponse>, ApiError> {
    require_account(&state, &token).await?;
    let body = json_body(body)?;
    let request = GenerationRequest::Create {
        logo: data_url::parse(&body.logo)?,
        product_type: body.product_type,
        color: body.color,
        prompt: body.prompt,
    };
    let mockup = state.generations.handle(token.as_deref(), request).await?;
    Ok(Json(mockup.into()))
}

pub async fn edit(
    State(state): State<AppState>,
    token: SessionToken,
    body: Result<Json<EditMockupBody>, JsonRejection>,
) -> Result<Json<MockupResponse>, ApiError> {
    require_account(&state, &token).await?;
    let body = json_body(body)?;
    let request = GenerationRequest::Edit {
        current_mockup: data_url::parse(&body.current_mockup)?,
        logo: data_url::parse(&body.logo)?,
        instruction: body.instruction,
        product_type: body.product_type,
    };
    let mockup = state.generations.handle(token.as_deref(), request).await?;
    Ok(Json(mockup.into()))
}
