//! User Store
//! ユーザーレコードの永続化ストア (投稿ストアと同型のより単純な対)

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use super::{load_collection, save_collection, LoadOutcome};
use crate::error::StoreError;
use crate::models::{UpdateUserRequest, User};

/// ユーザーファイル名
const USERS_FILE: &str = "users.json";

/// ユーザーストア
///
/// 投稿ストアと同じ規律: 単一 Mutex で直列化し、ファイルは常に
/// 直近のコミット済みスナップショット全体を反映する。
pub struct UserStore {
    users: Mutex<Vec<User>>,
    file_path: PathBuf,
}

impl UserStore {
    /// データディレクトリ配下の users.json からストアを開く
    pub fn open(data_dir: &Path) -> Result<(Self, LoadOutcome), StoreError> {
        std::fs::create_dir_all(data_dir)?;

        let file_path = data_dir.join(USERS_FILE);
        let (users, outcome) = load_collection(&file_path);

        Ok((
            Self {
                users: Mutex::new(users),
                file_path,
            },
            outcome,
        ))
    }

    // ポイズンされたロックは中身を取り出して継続する
    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ユーザーを作成する (ID と作成日時はストアが採番・打刻)
    pub fn create(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.lock();

        user.id = Uuid::new_v4().to_string();
        user.created_at = Utc::now();
        users.push(user.clone());

        self.persist(&users)?;
        Ok(user)
    }

    /// ID で 1 件取得
    pub fn get(&self, id: &str) -> Option<User> {
        self.lock().iter().find(|u| u.id == id).cloned()
    }

    /// ユーザー名で 1 件取得 (大文字小文字は区別しない)
    pub fn by_username(&self, username: &str) -> Option<User> {
        self.lock()
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned()
    }

    /// メールアドレスで 1 件取得 (大文字小文字は区別しない)
    pub fn by_email(&self, email: &str) -> Option<User> {
        self.lock()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// 全件取得 (挿入順)
    pub fn all(&self) -> Vec<User> {
        self.lock().clone()
    }

    /// ユーザー名・メールアドレスの使用状況を返す
    pub fn exists(&self, username: &str, email: &str) -> (bool, bool) {
        let users = self.lock();
        let username_exists = users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username));
        let email_exists = users.iter().any(|u| u.email.eq_ignore_ascii_case(email));
        (username_exists, email_exists)
    }

    /// 部分更新
    ///
    /// リクエストに含まれるフィールドだけを上書きする。ユーザー名と
    /// パスワードハッシュはここでは変更できない。
    pub fn update(&self, id: &str, req: &UpdateUserRequest) -> Result<Option<User>, StoreError> {
        let mut users = self.lock();

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(email) = req.email.as_deref().filter(|s| !s.is_empty()) {
            user.email = email.to_string();
        }
        if let Some(full_name) = req.full_name.as_deref().filter(|s| !s.is_empty()) {
            user.full_name = full_name.to_string();
        }
        if let Some(phone) = &req.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &req.address {
            user.address = Some(address.clone());
        }
        if let Some(profile_image_url) = &req.profile_image_url {
            user.profile_image_url = Some(profile_image_url.clone());
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(is_active) = req.is_active {
            user.is_active = is_active;
        }
        if let Some(last_login_at) = req.last_login_at {
            user.last_login_at = Some(last_login_at);
        }

        let updated = user.clone();
        self.persist(&users)?;
        Ok(Some(updated))
    }

    /// 削除 (即時、復元不可)
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut users = self.lock();

        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }

        self.persist(&users)?;
        Ok(true)
    }

    fn persist(&self, users: &[User]) -> Result<(), StoreError> {
        save_collection(&self.file_path, users).inspect_err(|e| {
            error!("Failed to persist users to {:?}: {}", self.file_path, e);
        })
    }
}
