//! Success envelope shared by every handler.
//!
//! Responses look like `{"status":"success","message":...,<fields>}`: the
//! payload's fields are flattened next to `status` and `message`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

/// Public URL of an artifact served from the output directory.
pub fn output_url(filename: &str) -> String {
    format!("/output/{filename}")
}
