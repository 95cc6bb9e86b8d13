//! Bulletin Board API
//! 掲示板サービスのコア (永続化ストア + 検索エンジン) と API ハンドラ

pub mod error;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod query;
pub mod store;

use store::{PostStore, UserStore};

/// アプリケーション共有状態
///
/// ストアはここが唯一の所有点。各コンシューマへは明示的に渡す。
pub struct AppState {
    pub posts: PostStore,
    pub users: UserStore,
}
