//! JSON response envelope
//!
//! Mutating endpoints answer `{success, message, redirect?}` or
//! `{success:false, errors}`; read endpoints wrap their payload in
//! `data`.

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Default, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            message: message.into(),
            ..Default::default()
        })
    }

    pub fn ok_with<T: Serialize>(message: impl Into<String>, data: &T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            message: message.into(),
            data: serde_json::to_value(data).ok(),
            ..Default::default()
        })
    }

    pub fn data<T: Serialize>(data: &T) -> HttpResponse {
        Self::ok_with("", data)
    }

    pub fn redirect(message: impl Into<String>, redirect: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse {
            success: true,
            message: message.into(),
            redirect: Some(redirect.into()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_omitted() {
        let body = serde_json::to_string(&ApiResponse {
            success: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, "{\"success\":true}");
    }
}
