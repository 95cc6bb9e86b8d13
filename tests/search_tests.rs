//! 検索フィルタ (Query Engine) のテスト

use bulletin_board_api::error::StoreError;
use bulletin_board_api::models::{BulletinPost, LocationInfo, PostFilter, PostStatus};
use bulletin_board_api::store::PostStore;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// テスト用の投稿を組み立てる
fn post(title: &str) -> BulletinPost {
    BulletinPost {
        id: String::new(),
        title: title.to_string(),
        category: "Electronics".to_string(),
        sub_category: "Phones".to_string(),
        price: 500.0,
        image_url: String::new(),
        location: LocationInfo {
            city: "Tel Aviv".to_string(),
            area: Some("Florentin".to_string()),
            street: Some("Herzl 10".to_string()),
            latitude: None,
            longitude: None,
        },
        owner_name: "Dana".to_string(),
        phone1: "050-0000000".to_string(),
        phone2: None,
        description: None,
        status: PostStatus::Active,
        created_at: Utc::now(),
        created_by: String::new(),
    }
}

fn open_store() -> (PostStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let (store, _) = PostStore::open(dir.path()).unwrap();
    (store, dir)
}

fn titles(posts: &[BulletinPost]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

#[test]
fn empty_filter_returns_everything_in_insertion_order() {
    let (store, _dir) = open_store();
    store.create(post("First")).unwrap();
    store.create(post("Second")).unwrap();
    store.create(post("Third")).unwrap();

    let found = store.search(&PostFilter::default()).unwrap();
    assert_eq!(titles(&found), vec!["First", "Second", "Third"]);
}

#[test]
fn category_match_is_case_insensitive() {
    let (store, _dir) = open_store();
    store.create(post("A phone")).unwrap();

    let filter = PostFilter {
        category: Some("electronics".to_string()),
        ..Default::default()
    };
    assert_eq!(store.search(&filter).unwrap().len(), 1);

    let filter = PostFilter {
        category: Some("furniture".to_string()),
        ..Default::default()
    };
    assert!(store.search(&filter).unwrap().is_empty());
}

#[test]
fn search_text_matches_title_or_description() {
    let (store, _dir) = open_store();
    store.create(post("iPhone 13 for sale")).unwrap();
    let mut in_description = post("Old handset");
    in_description.description = Some("Cracked iPhone screen, for parts".to_string());
    store.create(in_description).unwrap();
    store.create(post("Garden chair")).unwrap();

    let filter = PostFilter {
        search_text: Some("IPHONE".to_string()),
        ..Default::default()
    };
    let found = store.search(&filter).unwrap();
    assert_eq!(titles(&found), vec!["iPhone 13 for sale", "Old handset"]);
}

#[test]
fn price_bounds_are_inclusive() {
    let (store, _dir) = open_store();
    let mut cheap = post("Cheap");
    cheap.price = 100.0;
    let mut exact = post("Exact");
    exact.price = 250.0;
    let mut pricey = post("Pricey");
    pricey.price = 400.0;
    for p in [cheap, exact, pricey] {
        store.create(p).unwrap();
    }

    let filter = PostFilter {
        min_price: Some(250.0),
        max_price: Some(250.0),
        ..Default::default()
    };
    assert_eq!(titles(&store.search(&filter).unwrap()), vec!["Exact"]);
}

#[test]
fn area_filter_excludes_records_without_area() {
    let (store, _dir) = open_store();
    store.create(post("Has area")).unwrap();
    let mut no_area = post("No area");
    no_area.location.area = None;
    store.create(no_area).unwrap();

    let filter = PostFilter {
        area: Some("florentin".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&store.search(&filter).unwrap()), vec!["Has area"]);
}

#[test]
fn address_matches_any_of_street_area_or_city() {
    let (store, _dir) = open_store();
    store.create(post("Listing")).unwrap();

    // street / area / city のどれか 1 つへの部分一致で十分
    for term in ["herzl", "florent", "tel aviv"] {
        let filter = PostFilter {
            address: Some(term.to_string()),
            ..Default::default()
        };
        assert_eq!(store.search(&filter).unwrap().len(), 1, "term {term}");
    }

    let filter = PostFilter {
        address: Some("haifa".to_string()),
        ..Default::default()
    };
    assert!(store.search(&filter).unwrap().is_empty());
}

#[test]
fn address_or_still_composes_with_other_filters_as_and() {
    let (store, _dir) = open_store();
    store.create(post("Matching")).unwrap();

    // address はヒットするがカテゴリが外れる → 全体では除外
    let filter = PostFilter {
        address: Some("herzl".to_string()),
        category: Some("Furniture".to_string()),
        ..Default::default()
    };
    assert!(store.search(&filter).unwrap().is_empty());
}

#[test]
fn record_failing_one_of_k_predicates_is_excluded() {
    let (store, _dir) = open_store();

    // 3 条件すべて満たす 1 件と、ちょうど 1 条件だけ外す 3 件
    store.create(post("All match")).unwrap();

    let mut wrong_category = post("Wrong category");
    wrong_category.category = "Furniture".to_string();
    store.create(wrong_category).unwrap();

    let mut wrong_city = post("Wrong city");
    wrong_city.location.city = "Haifa".to_string();
    store.create(wrong_city).unwrap();

    let mut too_cheap = post("Too cheap");
    too_cheap.price = 10.0;
    store.create(too_cheap).unwrap();

    let filter = PostFilter {
        category: Some("Electronics".to_string()),
        city: Some("Tel Aviv".to_string()),
        min_price: Some(100.0),
        ..Default::default()
    };
    assert_eq!(titles(&store.search(&filter).unwrap()), vec!["All match"]);
}

#[test]
fn status_filter_parses_case_insensitively() {
    let (store, _dir) = open_store();
    store.create(post("Active one")).unwrap();
    let mut sold = post("Sold one");
    sold.status = PostStatus::Sold;
    store.create(sold).unwrap();

    let filter = PostFilter {
        status: Some("sold".to_string()),
        ..Default::default()
    };
    assert_eq!(titles(&store.search(&filter).unwrap()), vec!["Sold one"]);
}

#[test]
fn invalid_status_is_an_error_not_a_silent_no_op() {
    let (store, _dir) = open_store();
    store.create(post("Anything")).unwrap();

    let filter = PostFilter {
        status: Some("banana".to_string()),
        ..Default::default()
    };
    let err = store.search(&filter).unwrap_err();
    assert!(matches!(err, StoreError::InvalidStatus(s) if s == "banana"));
}

#[test]
fn empty_string_filters_are_treated_as_absent() {
    let (store, _dir) = open_store();
    store.create(post("Anything")).unwrap();

    let filter = PostFilter {
        status: Some(String::new()),
        category: Some(String::new()),
        search_text: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(store.search(&filter).unwrap().len(), 1);
}

#[test]
fn date_bounds_are_inclusive_and_ignore_time_of_day() {
    let (store, _dir) = open_store();
    let created = store.create(post("Today")).unwrap();
    let date = created.created_at.date_naive();

    // 同じ日の遅い時刻を from にしても、日付単位の比較なので含まれる
    let late_same_day = date.and_hms_opt(23, 59, 59).unwrap().and_utc();
    let filter = PostFilter {
        from_date: Some(late_same_day),
        ..Default::default()
    };
    assert_eq!(store.search(&filter).unwrap().len(), 1);

    let early_same_day = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let filter = PostFilter {
        to_date: Some(early_same_day),
        ..Default::default()
    };
    assert_eq!(store.search(&filter).unwrap().len(), 1);

    // 前日まで・翌日から、はともに除外
    let filter = PostFilter {
        to_date: Some(late_same_day - Duration::days(1)),
        ..Default::default()
    };
    assert!(store.search(&filter).unwrap().is_empty());

    let filter = PostFilter {
        from_date: Some(early_same_day + Duration::days(1)),
        ..Default::default()
    };
    assert!(store.search(&filter).unwrap().is_empty());
}

// ========================================
// 距離フィルタ
// ========================================

fn post_at(title: &str, latitude: Option<f64>, longitude: Option<f64>) -> BulletinPost {
    let mut p = post(title);
    p.location.latitude = latitude;
    p.location.longitude = longitude;
    p
}

fn radius_filter(latitude: f64, longitude: f64, radius_km: f64) -> PostFilter {
    PostFilter {
        latitude: Some(latitude),
        longitude: Some(longitude),
        radius_km: Some(radius_km),
        ..Default::default()
    }
}

#[test]
fn radius_filter_includes_zero_distance_and_excludes_far_records() {
    let (store, _dir) = open_store();
    store
        .create(post_at("At the point", Some(32.0), Some(34.0)))
        .unwrap();
    // 緯度 0.05 度 ≈ 5.6km
    store
        .create(post_at("Nearby", Some(32.05), Some(34.0)))
        .unwrap();
    // 緯度 0.1349 度 ≈ 15km
    store
        .create(post_at("Too far", Some(32.1349), Some(34.0)))
        .unwrap();

    let found = store.search(&radius_filter(32.0, 34.0, 10.0)).unwrap();
    assert_eq!(titles(&found), vec!["At the point", "Nearby"]);
}

#[test]
fn radius_filter_excludes_records_without_both_coordinates() {
    let (store, _dir) = open_store();
    store.create(post_at("No coords", None, None)).unwrap();
    store
        .create(post_at("Latitude only", Some(32.0), None))
        .unwrap();
    store
        .create(post_at("Longitude only", None, Some(34.0)))
        .unwrap();
    store
        .create(post_at("Complete", Some(32.0), Some(34.0)))
        .unwrap();

    let found = store.search(&radius_filter(32.0, 34.0, 10.0)).unwrap();
    assert_eq!(titles(&found), vec!["Complete"]);
}

#[test]
fn radius_filter_requires_all_three_parameters() {
    let (store, _dir) = open_store();
    store.create(post_at("No coords", None, None)).unwrap();

    // 半径が無ければ距離フィルタは無効 → 座標なしのレコードも返る
    let filter = PostFilter {
        latitude: Some(32.0),
        longitude: Some(34.0),
        ..Default::default()
    };
    assert_eq!(store.search(&filter).unwrap().len(), 1);
}
