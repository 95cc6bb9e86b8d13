//! Error Types
//! ストア操作の型付きエラー

use thiserror::Error;

/// ストア操作のエラー
///
/// 対象レコードの不存在はエラーではなく `Option` / `bool` で表す。
#[derive(Debug, Error)]
pub enum StoreError {
    /// フィルタや更新リクエストに不正なステータス文字列が指定された
    #[error("invalid status value: {0}")]
    InvalidStatus(String),

    /// 永続化ファイルの読み書きに失敗した
    #[error("storage fault: {0}")]
    Storage(#[from] std::io::Error),
}
