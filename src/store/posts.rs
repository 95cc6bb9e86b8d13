//! Post Store
//! 掲示板投稿の永続化ストア (単一ロックで直列化 + JSON ファイル全書き換え)

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use super::{load_collection, save_collection, LoadOutcome};
use crate::error::StoreError;
use crate::models::{BulletinPost, PostFilter, PostStatus, UpdatePostRequest};
use crate::query;

/// 投稿ファイル名
const POSTS_FILE: &str = "posts.json";

/// 掲示板投稿ストア
///
/// 読み書きのすべてを単一の Mutex で直列化する。ファイルは常に直近の
/// コミット済み操作のスナップショット全体を反映する。呼び出し側には
/// 複製のみを返し、内部コレクションへの参照は渡さない。
pub struct PostStore {
    posts: Mutex<Vec<BulletinPost>>,
    file_path: PathBuf,
}

impl PostStore {
    /// データディレクトリ配下の posts.json からストアを開く
    ///
    /// ディレクトリは無ければ作成する。ロード結果は `LoadOutcome` で返す。
    pub fn open(data_dir: &Path) -> Result<(Self, LoadOutcome), StoreError> {
        std::fs::create_dir_all(data_dir)?;

        let file_path = data_dir.join(POSTS_FILE);
        let (posts, outcome) = load_collection(&file_path);

        Ok((
            Self {
                posts: Mutex::new(posts),
                file_path,
            },
            outcome,
        ))
    }

    // ポイズンされたロックは中身を取り出して継続する
    fn lock(&self) -> MutexGuard<'_, Vec<BulletinPost>> {
        self.posts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 投稿を作成する
    ///
    /// 呼び出し側が渡した ID と作成日時は無視し、ストアが採番・打刻する。
    pub fn create(&self, mut post: BulletinPost) -> Result<BulletinPost, StoreError> {
        let mut posts = self.lock();

        post.id = Uuid::new_v4().to_string();
        post.created_at = Utc::now();
        posts.push(post.clone());

        self.persist(&posts)?;
        Ok(post)
    }

    /// ID で 1 件取得
    pub fn get(&self, id: &str) -> Option<BulletinPost> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    /// 全件取得 (挿入順)
    pub fn all(&self) -> Vec<BulletinPost> {
        self.lock().clone()
    }

    /// カテゴリで絞り込み (大文字小文字は区別しない)
    pub fn by_category(&self, category: &str) -> Vec<BulletinPost> {
        self.lock()
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    /// 市区町村で絞り込み (大文字小文字は区別しない)
    pub fn by_city(&self, city: &str) -> Vec<BulletinPost> {
        self.lock()
            .iter()
            .filter(|p| p.location.city.eq_ignore_ascii_case(city))
            .cloned()
            .collect()
    }

    /// ステータスで絞り込み
    pub fn by_status(&self, status: PostStatus) -> Vec<BulletinPost> {
        self.lock()
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect()
    }

    /// 部分更新
    ///
    /// リクエストに含まれるフィールドだけを上書きする。必須文字列は
    /// 空文字列を未指定として扱う。対象が存在しなければ `Ok(None)`。
    pub fn update(
        &self,
        id: &str,
        req: &UpdatePostRequest,
    ) -> Result<Option<BulletinPost>, StoreError> {
        // 不正なステータスは書き込む前に弾く
        let status = match non_empty(&req.status) {
            Some(s) => Some(s.parse::<PostStatus>()?),
            None => None,
        };

        let mut posts = self.lock();

        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(title) = non_empty(&req.title) {
            post.title = title.to_string();
        }
        if let Some(category) = non_empty(&req.category) {
            post.category = category.to_string();
        }
        if let Some(sub_category) = non_empty(&req.sub_category) {
            post.sub_category = sub_category.to_string();
        }
        if let Some(price) = req.price {
            post.price = price;
        }
        if let Some(image_url) = &req.image_url {
            post.image_url = image_url.clone();
        }
        if let Some(owner_name) = non_empty(&req.owner_name) {
            post.owner_name = owner_name.to_string();
        }
        if let Some(phone1) = non_empty(&req.phone1) {
            post.phone1 = phone1.to_string();
        }
        if let Some(phone2) = &req.phone2 {
            post.phone2 = Some(phone2.clone());
        }
        if let Some(description) = &req.description {
            post.description = Some(description.clone());
        }
        if let Some(city) = non_empty(&req.location_city) {
            post.location.city = city.to_string();
        }
        if let Some(area) = &req.location_area {
            post.location.area = Some(area.clone());
        }
        if let Some(street) = &req.location_street {
            post.location.street = Some(street.clone());
        }
        if let Some(latitude) = req.location_latitude {
            post.location.latitude = Some(latitude);
        }
        if let Some(longitude) = req.location_longitude {
            post.location.longitude = Some(longitude);
        }
        if let Some(status) = status {
            post.status = status;
        }

        let updated = post.clone();
        self.persist(&posts)?;
        Ok(Some(updated))
    }

    /// 削除 (即時、復元不可)
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut posts = self.lock();

        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Ok(false);
        }

        self.persist(&posts)?;
        Ok(true)
    }

    /// 検索フィルタを適用する
    ///
    /// ロック中にスナップショットを複製し、フィルタ評価はロック外で行う。
    pub fn search(&self, filter: &PostFilter) -> Result<Vec<BulletinPost>, StoreError> {
        let snapshot = self.lock().clone();
        query::apply(snapshot, filter)
    }

    /// コレクション全体をファイルへ書き出す
    ///
    /// 失敗してもメモリ上の変更はコミット済みのまま残る。ディスクは
    /// 次に成功した書き込みで再収束する。
    fn persist(&self, posts: &[BulletinPost]) -> Result<(), StoreError> {
        save_collection(&self.file_path, posts).inspect_err(|e| {
            error!("Failed to persist posts to {:?}: {}", self.file_path, e);
        })
    }
}

/// 空文字列を未指定として扱う
fn non_empty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}
