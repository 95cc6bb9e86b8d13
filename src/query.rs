//! Query Engine
//! 検索フィルタの評価 (ストアのスナップショットに対して実行)

use crate::error::StoreError;
use crate::geo;
use crate::models::{BulletinPost, PostFilter, PostStatus};

/// フィルタをスナップショット全件へ適用する
///
/// 全条件を AND で合成する。挿入順を保ち、追加のソートは行わない。
/// 空文字列のフィルタは未指定とみなす。
pub fn apply(
    posts: Vec<BulletinPost>,
    filter: &PostFilter,
) -> Result<Vec<BulletinPost>, StoreError> {
    // ステータスはスキャン前に一度だけパースする
    let status = match non_empty(&filter.status) {
        Some(s) => Some(s.parse::<PostStatus>()?),
        None => None,
    };

    Ok(posts
        .into_iter()
        .filter(|p| matches(p, filter, status))
        .collect())
}

/// 1件がフィルタの全条件を満たすか
///
/// 安価な完全一致系を先に、部分一致と距離計算を後に評価する。
fn matches(post: &BulletinPost, filter: &PostFilter, status: Option<PostStatus>) -> bool {
    if let Some(want) = status {
        if post.status != want {
            return false;
        }
    }

    if let Some(category) = non_empty(&filter.category) {
        if !post.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }

    if let Some(sub_category) = non_empty(&filter.sub_category) {
        if !post.sub_category.eq_ignore_ascii_case(sub_category) {
            return false;
        }
    }

    if let Some(min) = filter.min_price {
        if post.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if post.price > max {
            return false;
        }
    }

    if let Some(city) = non_empty(&filter.city) {
        if !post.location.city.eq_ignore_ascii_case(city) {
            return false;
        }
    }

    // area 未設定のレコードは area 指定の検索にヒットしない
    if let Some(area) = non_empty(&filter.area) {
        match post.location.area.as_deref() {
            Some(post_area) if post_area.eq_ignore_ascii_case(area) => {}
            _ => return false,
        }
    }

    // 日付は時刻を切り捨てて両端含む比較
    if let Some(from) = filter.from_date {
        if post.created_at.date_naive() < from.date_naive() {
            return false;
        }
    }
    if let Some(to) = filter.to_date {
        if post.created_at.date_naive() > to.date_naive() {
            return false;
        }
    }

    if let Some(text) = non_empty(&filter.search_text) {
        let hit = contains_ci(&post.title, text)
            || post
                .description
                .as_deref()
                .map_or(false, |d| contains_ci(d, text));
        if !hit {
            return false;
        }
    }

    // address は street / area / city のいずれかに部分一致すればよい
    if let Some(address) = non_empty(&filter.address) {
        let hit = post
            .location
            .street
            .as_deref()
            .map_or(false, |s| contains_ci(s, address))
            || post
                .location
                .area
                .as_deref()
                .map_or(false, |a| contains_ci(a, address))
            || contains_ci(&post.location.city, address);
        if !hit {
            return false;
        }
    }

    // 距離フィルタは緯度・経度・半径の 3 つがそろったときだけ有効
    if let (Some(lat), Some(lon), Some(radius_km)) =
        (filter.latitude, filter.longitude, filter.radius_km)
    {
        match post.location.coordinates() {
            Some((post_lat, post_lon)) => {
                // 境界ちょうどは含む
                if geo::haversine_km(lat, lon, post_lat, post_lon) > radius_km {
                    return false;
                }
            }
            // 座標のないレコードは距離検索から除外
            None => return false,
        }
    }

    true
}

/// 空文字列を未指定として扱う
fn non_empty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().filter(|s| !s.is_empty())
}

/// 大文字小文字を無視した部分一致
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
