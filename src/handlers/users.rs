//! Users API Handlers
//! /api/users エンドポイント (登録・ログインは認証レイヤの責務で、ここには無い)

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::{UpdateProfileRequest, UpdateUserRequest, UserDto};
use crate::AppState;

// ========================================
// Response Types
// ========================================

#[derive(Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserDto>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct UserDetailResponse {
    pub success: bool,
    pub user: Option<UserDto>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

// ========================================
// Handlers
// ========================================

/// GET /api/users - ユーザー一覧取得
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<UserListResponse> {
    let users: Vec<UserDto> = state.users.all().into_iter().map(UserDto::from).collect();
    let total = users.len();
    Json(UserListResponse {
        success: true,
        users,
        total,
    })
}

/// GET /api/users/:id - ユーザー詳細取得
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.users.get(&id) {
        Some(user) => Ok(Json(UserDetailResponse {
            success: true,
            user: Some(UserDto::from(user)),
        })),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("User not found: {}", id),
        )),
    }
}

/// PUT /api/users/:id/profile - プロフィール更新
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_self(&id, &headers)?;

    let update = UpdateUserRequest {
        full_name: req.full_name,
        phone: req.phone,
        address: req.address,
        ..Default::default()
    };

    match state.users.update(&id, &update).map_err(store_error_response)? {
        Some(updated) => {
            info!("User profile updated: id={}", id);
            Ok(Json(UserDetailResponse {
                success: true,
                user: Some(UserDto::from(updated)),
            }))
        }
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("User not found: {}", id),
        )),
    }
}

/// DELETE /api/users/:id - ユーザー削除
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_self(&id, &headers)?;

    let deleted = state.users.delete(&id).map_err(store_error_response)?;
    if !deleted {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("User not found: {}", id),
        ));
    }

    info!("User deleted: id={}", id);
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted user {}", id),
    }))
}

// ========================================
// Helper Functions
// ========================================

/// 自分以外のユーザーに対する操作を拒否する
///
/// 識別子が渡されなかった場合は許可する (旧クライアント互換)。
fn check_self(id: &str, headers: &HeaderMap) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !user_id.is_empty() && user_id != id {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "You can only modify your own account".to_string(),
        ));
    }

    Ok(())
}

/// ストアエラーを HTTP レスポンスへ変換
fn store_error_response(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        StoreError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

/// エラーレスポンス生成
fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    warn!("API Error: {}", message);
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
}
