//! Data Models
//! BulletinPost / User などのデータ構造定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// ========================================
// Post Status
// ========================================

/// 投稿ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Active,   // 掲載中
    Sold,     // 売却済み / 取引終了
    Archived, // アーカイブ済み
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::str::FromStr for PostStatus {
    type Err = StoreError;

    /// 大文字小文字を区別せずにパースする
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "sold" => Ok(Self::Sold),
            "archived" => Ok(Self::Archived),
            _ => Err(StoreError::InvalidStatus(s.to_string())),
        }
    }
}

// ========================================
// Bulletin Post
// ========================================

/// 所在地情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub city: String,
    pub area: Option<String>,
    pub street: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationInfo {
    /// 緯度と経度が両方そろっている場合のみ座標を返す
    ///
    /// 片方しかないレコードは座標なしとして扱う。
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// 掲示板投稿 (永続化レコード)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinPost {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    pub location: LocationInfo,
    pub owner_name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String, // 投稿者のユーザーID (旧データでは空)
}

/// 投稿作成リクエスト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    pub location: LocationInfo,
    pub owner_name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>, // 省略時は Active
}

/// 投稿更新リクエスト
///
/// 含まれるフィールドだけを上書きする部分更新。所在地は
/// フィールド単位で更新できるよう平坦化している。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub owner_name: Option<String>,
    pub phone1: Option<String>,
    pub phone2: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub location_city: Option<String>,
    pub location_area: Option<String>,
    pub location_street: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
}

/// ステータス変更リクエスト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: String,
}

/// 検索フィルタ (全フィールド任意、AND で合成)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    pub search_text: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
}

/// 投稿レスポンス (API返却用)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinPostDto {
    pub id: String,
    pub title: String,
    pub category: String,
    pub sub_category: String,
    pub price: f64,
    pub image_url: String,
    pub location: LocationInfo,
    pub owner_name: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub description: Option<String>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub profile_image_url: Option<String>, // 投稿者プロフィールから結合
}

impl BulletinPostDto {
    /// レコードをレスポンス DTO に変換する
    pub fn from_post(post: BulletinPost, profile_image_url: Option<String>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            category: post.category,
            sub_category: post.sub_category,
            price: post.price,
            image_url: post.image_url,
            location: post.location,
            owner_name: post.owner_name,
            phone1: post.phone1,
            phone2: post.phone2,
            description: post.description,
            status: post.status,
            created_at: post.created_at,
            created_by: post.created_by,
            profile_image_url,
        }
    }
}

// ========================================
// User
// ========================================

/// ユーザー権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    User,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

/// ユーザー (永続化レコード)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String, // ハッシュ化は認証レイヤの責務 (不透明文字列として保持)
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// ユーザー更新リクエスト (部分更新)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// プロフィール更新リクエスト (API向けサブセット)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// ユーザーレスポンス (API返却用、パスワードハッシュは含めない)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            address: user.address,
            profile_image_url: user.profile_image_url,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}
