//! Persistent Store
//! JSON ファイルへ永続化するレコードコレクションの共通処理

mod posts;
mod users;

pub use posts::PostStore;
pub use users::UserStore;

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StoreError;

/// 起動時ロードの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// ファイルから n 件読み込んだ
    Loaded(usize),
    /// ファイルが存在しない (初回起動)
    MissingFile,
    /// ファイルはあるが読み込み・解析に失敗した (空で開始、ファイルは残す)
    ParseError,
}

/// コレクションをファイルから読み込む
///
/// 読み込み失敗は空コレクションへ縮退し、壊れたファイルには手を付けない。
pub(crate) fn load_collection<T: DeserializeOwned>(path: &Path) -> (Vec<T>, LoadOutcome) {
    if !path.exists() {
        return (Vec::new(), LoadOutcome::MissingFile);
    }

    let result = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|json| serde_json::from_str::<Vec<T>>(&json).map_err(anyhow::Error::from));

    match result {
        Ok(items) => {
            let outcome = LoadOutcome::Loaded(items.len());
            (items, outcome)
        }
        Err(e) => {
            warn!("Failed to load store file {:?}, starting empty: {}", path, e);
            (Vec::new(), LoadOutcome::ParseError)
        }
    }
}

/// コレクション全体をファイルへ書き出す (毎回全書き換え)
pub(crate) fn save_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(items).map_err(io::Error::from)?;
    fs::write(path, json)?;
    Ok(())
}
