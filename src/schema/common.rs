use poem_openapi::{
    types::{ParseFromJSON, ToJSON},
    Object,
};
use serde::{Deserialize, Serialize};

#[derive(Object, Deserialize, Serialize)]
pub struct BadRequestResponse {
    pub message: String,
}

impl BadRequestResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Invalid token".to_string(),
        }
    }
}

impl UnauthorizedResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct ForbiddenResponse {
    pub message: String,
}

impl ForbiddenResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct NotFoundResponse {
    pub message: String,
}

impl NotFoundResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Persistence failure. The detail goes to the log, the client only sees a
/// generic message.
#[derive(Object, Deserialize, Serialize)]
pub struct ServiceUnavailableResponse {
    pub message: String,
}

impl ServiceUnavailableResponse {
    pub fn new(module: &str, function: &str, step: &str, error: &str) -> Self {
        tracing::error!(
            module = module,
            function = function,
            step = step,
            "{}",
            error
        );
        Self {
            message: "Service unavailable, please try again later".to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct RecordsResponse<T: ParseFromJSON + ToJSON> {
    pub records: Vec<T>,
}
