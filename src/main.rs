//! Bulletin Board API Server

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use bulletin_board_api::handlers::{posts, users};
use bulletin_board_api::store::{LoadOutcome, PostStore, UserStore};
use bulletin_board_api::AppState;

// ========================================
// 設定
// ========================================

#[derive(Clone)]
struct AppConfig {
    data_dir: PathBuf,
    bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// 環境変数から設定を組み立てる (未指定はデフォルト)
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("BOARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            bind_addr: std::env::var("BOARD_BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

// ========================================
// ヘルスチェック
// ========================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// ヘルスチェック
async fn health_check() -> axum::response::Json<HealthResponse> {
    axum::response::Json(HealthResponse {
        status: "ok".to_string(),
        service: "bulletin-board-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ========================================
// メイン
// ========================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ログ初期化
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();

    // ストア構築 (ロード結果を起動ログに残す)
    let (post_store, outcome) = PostStore::open(&config.data_dir)?;
    log_load_outcome("posts", outcome);
    let (user_store, outcome) = UserStore::open(&config.data_dir)?;
    log_load_outcome("users", outcome);

    let state = Arc::new(AppState {
        posts: post_store,
        users: user_store,
    });

    // ルーター構築
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/search", post(posts::search_posts))
        .route("/api/posts/category/:category", get(posts::list_by_category))
        .route("/api/posts/city/:city", get(posts::list_by_city))
        .route("/api/posts/status/:status", get(posts::list_by_status))
        .route(
            "/api/posts/:id",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/api/posts/:id/status", patch(posts::change_post_status))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/:id",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/api/users/:id/profile", put(users::update_profile))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("🚀 Bulletin Board API Server listening on {}", config.bind_addr);
    info!("📁 Data directory: {:?}", config.data_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 起動時ロード結果のログ出力
fn log_load_outcome(name: &str, outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded(n) => info!("Loaded {} {} from disk", n, name),
        LoadOutcome::MissingFile => info!("No existing {} file, starting empty", name),
        LoadOutcome::ParseError => {
            warn!("Existing {} file is corrupt, starting empty (file left on disk)", name)
        }
    }
}
