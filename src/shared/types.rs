use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::MAX_PAGE_SIZE;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl Meta {
    pub fn of_len(len: usize) -> Self {
        Self { total: len as i64 }
    }
}

// =============================================================================
// LIMITS
// =============================================================================

/// `?limit=` query parameter shared by list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LimitQuery {
    /// Maximum number of items to return (max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// Requested limit clamped to `[1, MAX_PAGE_SIZE]`, or `default` when absent
    pub fn resolve(&self, default: i64) -> usize {
        self.limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE) as usize
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}
