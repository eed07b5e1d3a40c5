//! JSON response envelope: `{"success": bool, "message": string, "data"?: any}`.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

pub fn success<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> EnvelopeResponse<T> {
    (
        status,
        Json(Envelope {
            success: true,
            message: message.into(),
            data,
        }),
    )
}

pub fn failure(status: StatusCode, message: impl Into<String>) -> EnvelopeResponse<()> {
    (
        status,
        Json(Envelope {
            success: false,
            message: message.into(),
            data: None,
        }),
    )
}
