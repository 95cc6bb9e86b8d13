//! Posts API Handlers
//! /api/posts エンドポイント

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::{
    BulletinPost, BulletinPostDto, ChangeStatusRequest, CreatePostRequest, PostFilter, PostStatus,
    UpdatePostRequest,
};
use crate::AppState;

// ========================================
// Response Types
// ========================================

#[derive(Serialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<BulletinPostDto>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct PostDetailResponse {
    pub success: bool,
    pub post: Option<BulletinPostDto>,
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

/// GET /api/posts - 投稿一覧取得
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Json<PostListResponse> {
    let posts = state.posts.all();
    Json(list_response(posts, &state))
}

/// GET /api/posts/:id - 投稿詳細取得
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PostDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.posts.get(&id) {
        Some(post) => Ok(Json(PostDetailResponse {
            success: true,
            post: Some(to_dto(post, &state)),
        })),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", id),
        )),
    }
}

/// GET /api/posts/category/:category - カテゴリ別一覧
pub async fn list_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Json<PostListResponse> {
    let posts = state.posts.by_category(&category);
    Json(list_response(posts, &state))
}

/// GET /api/posts/city/:city - 市区町村別一覧
pub async fn list_by_city(
    State(state): State<Arc<AppState>>,
    Path(city): Path<String>,
) -> Json<PostListResponse> {
    let posts = state.posts.by_city(&city);
    Json(list_response(posts, &state))
}

/// GET /api/posts/status/:status - ステータス別一覧
pub async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> Result<Json<PostListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let status: PostStatus = status
        .parse()
        .map_err(|e: StoreError| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    let posts = state.posts.by_status(status);
    Ok(Json(list_response(posts, &state)))
}

/// POST /api/posts/search - 複合条件検索
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<PostFilter>,
) -> Result<Json<PostListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let posts = state.posts.search(&filter).map_err(store_error_response)?;
    Ok(Json(list_response(posts, &state)))
}

/// POST /api/posts - 投稿作成
///
/// 認証レイヤが解決した X-User-Id ヘッダを createdBy に記録する。
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<PostDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = resolved_user_id(&headers);

    let status = match req.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse::<PostStatus>()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?,
        None => PostStatus::Active,
    };

    let post = BulletinPost {
        id: String::new(), // ストアが採番する
        title: req.title,
        category: req.category,
        sub_category: req.sub_category.unwrap_or_default(),
        price: req.price,
        image_url: req.image_url,
        location: req.location,
        owner_name: req.owner_name,
        phone1: req.phone1,
        phone2: req.phone2,
        description: req.description,
        status,
        created_at: Utc::now(), // ストアが打刻し直す
        created_by: user_id,
    };

    let created = state.posts.create(post).map_err(store_error_response)?;
    info!("Post created: id={}, category={}", created.id, created.category);

    Ok(Json(PostDetailResponse {
        success: true,
        post: Some(to_dto(created, &state)),
    }))
}

/// PUT /api/posts/:id - 投稿更新 (部分更新)
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_ownership(&state, &id, &headers, "edit")?;

    match state.posts.update(&id, &req).map_err(store_error_response)? {
        Some(updated) => {
            info!("Post updated: id={}", id);
            Ok(Json(PostDetailResponse {
                success: true,
                post: Some(to_dto(updated, &state)),
            }))
        }
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", id),
        )),
    }
}

/// DELETE /api/posts/:id - 投稿削除
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_ownership(&state, &id, &headers, "delete")?;

    let deleted = state.posts.delete(&id).map_err(store_error_response)?;
    if !deleted {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", id),
        ));
    }

    info!("Post deleted: id={}", id);
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted post {}", id),
    }))
}

/// PATCH /api/posts/:id/status - ステータス変更
pub async fn change_post_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    // パースして検証してから更新に回す
    req.status
        .parse::<PostStatus>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    let update = UpdatePostRequest {
        status: Some(req.status.clone()),
        ..Default::default()
    };

    match state.posts.update(&id, &update).map_err(store_error_response)? {
        Some(_) => {
            info!("Post status changed: id={}, status={}", id, req.status);
            Ok(Json(MessageResponse {
                success: true,
                message: format!("Status changed to {}", req.status),
            }))
        }
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", id),
        )),
    }
}

// ========================================
// Helper Functions
// ========================================

/// 認証レイヤで解決済みのユーザーIDを取り出す (未指定なら空文字)
fn resolved_user_id(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// 自分の投稿以外の編集・削除を拒否する
///
/// 識別子が渡されなかった場合は許可する (旧クライアント互換)。
fn check_ownership(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
    action: &str,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let user_id = resolved_user_id(headers);

    let Some(existing) = state.posts.get(id) else {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", id),
        ));
    };

    if !user_id.is_empty() && existing.created_by != user_id {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            format!("You can only {} your own posts", action),
        ));
    }

    Ok(())
}

/// 一覧レスポンスを組み立てる
fn list_response(posts: Vec<BulletinPost>, state: &AppState) -> PostListResponse {
    let dtos: Vec<BulletinPostDto> = posts.into_iter().map(|p| to_dto(p, state)).collect();
    let total = dtos.len();
    PostListResponse {
        success: true,
        posts: dtos,
        total,
    }
}

/// レコードをレスポンス DTO に変換 (投稿者のプロフィール画像を結合)
fn to_dto(post: BulletinPost, state: &AppState) -> BulletinPostDto {
    let profile_image_url = if post.created_by.is_empty() {
        None
    } else {
        state
            .users
            .get(&post.created_by)
            .and_then(|u| u.profile_image_url)
    };
    BulletinPostDto::from_post(post, profile_image_url)
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
