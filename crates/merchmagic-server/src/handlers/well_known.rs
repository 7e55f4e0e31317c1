//! Digital asset links for the Android wrapper app.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn assetlinks(State(state): State<AppState>) -> Json<Value> {
    let android = &state.config.android;
    Json(json!([{
        "relation": ["delegate_permission/common.handle_all_urls"],
        "target": {
            "namespace": "android_app",
            "package_name": android.package_name,
            "sha256_cert_fingerprints": [android.sha256_cert_fingerprint],
        }
    }]))
}
