//! Watch page (`GET /watch/bm`) over HTTP
//!
//! Run with: cargo test --package bm-server --test watch_tests

use bm_model::User;
use bm_server::http;
use bm_test_utils::{authed, body_json, test_config, TestWorld, TEST_SERVE_PATH};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use warp::http::StatusCode;

async fn watch_as(world: &TestWorld, user: Option<&User>, query: &str) -> (StatusCode, Value) {
    let routes = http::routes(world.router.clone());
    let path = format!("/watch/bm{query}");
    let request = match user {
        Some(user) => authed("GET", &path, &world.login(user).await),
        None => warp::test::request().path(&path),
    };
    let res = request.reply(&routes).await;
    let status = res.status();
    let body = if status == StatusCode::FOUND {
        json!({ "location": res.headers()["location"].to_str().unwrap() })
    } else {
        body_json(&res)
    };
    (status, body)
}

#[tokio::test]
async fn anonymous_sees_everyone_with_pagination() {
    let world = TestWorld::new();
    world.post(&world.alice, "older", 10);
    world.post(&world.bob, "newer", 1);

    let (status, body) = watch_as(&world, None, "?p=abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "breezemoon.ftl");
    let model = &body["dataModel"];
    assert_eq!(model["selected"], "watch");
    assert_eq!(model["current"], "/bm");
    assert_eq!(model["isLoggedIn"], false);
    assert_eq!(model["pagination"]["pageNum"], 1);
    assert_eq!(model["pagination"]["pageSize"], 20);
    assert_eq!(model["pagination"]["recordCount"], 2);

    let contents: Vec<&str> = model["watchingBreezemoons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|bm| bm["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["newer", "older"]);

    assert_eq!(
        model["permissions"],
        json!({
            "commonAddBreezemoon": false,
            "commonUpdateBreezemoon": false,
            "commonRemoveBreezemoon": false,
            "commonViewBreezemoon": true,
        })
    );
}

#[tokio::test]
async fn follower_sees_followed_feed_without_pagination() {
    let world = TestWorld::new();
    world.post(&world.bob, "from bob", 3);
    world.post(&world.visitor, "from visitor", 1);

    let (status, body) = watch_as(&world, Some(&world.alice), "").await;

    assert_eq!(status, StatusCode::OK);
    let model = &body["dataModel"];
    let feed = model["watchingBreezemoons"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["content"], "from bob");
    assert_eq!(feed[0]["authorColor"], "119944");
    assert!(model.get("pagination").is_none());
    assert_eq!(model["isLoggedIn"], true);
    assert_eq!(model["currentUser"]["name"], "alice");
    assert_eq!(model["permissions"]["commonAddBreezemoon"], true);
}

#[tokio::test]
async fn empty_feed_falls_back_to_everyone() {
    let world = TestWorld::new();
    world.post(&world.visitor, "only visitor posted", 1);

    let (_, body) = watch_as(&world, Some(&world.alice), "").await;

    let model = &body["dataModel"];
    assert_eq!(model["watchingBreezemoons"][0]["content"], "only visitor posted");
    assert_eq!(model["pagination"]["recordCount"], 1);
}

#[tokio::test]
async fn user_page_size_and_page_number_apply() {
    let world = TestWorld::new();
    let reader = User::new("reader").with_list_page_size(2);
    world.store.insert_user(reader.clone());
    for minutes in 1..=5 {
        world.post(&world.bob, &format!("post {minutes}"), minutes);
    }

    let (_, body) = watch_as(&world, Some(&reader), "?p=2").await;

    let model = &body["dataModel"];
    assert_eq!(model["pagination"]["pageNum"], 2);
    assert_eq!(model["pagination"]["pageSize"], 2);
    assert_eq!(model["pagination"]["pageCount"], 3);
    assert_eq!(model["pagination"]["pageNums"], json!([1, 2, 3]));
    let contents: Vec<&str> = model["watchingBreezemoons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|bm| bm["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["post 3", "post 4"]);
}

#[tokio::test]
async fn static_avatar_viewer_gets_first_frame_urls() {
    let world = TestWorld::new();
    world.post(&world.bob, "gif time", 1);

    let (_, body) = watch_as(&world, Some(&world.bob), "").await;

    assert_eq!(
        body["dataModel"]["watchingBreezemoons"][0]["authorAvatarUrl"],
        "https://img.test/bob.gif?imageView2/1/format/jpg"
    );
}

#[tokio::test]
async fn unfinished_guide_redirects() {
    let world = TestWorld::new();

    let (status, body) = watch_as(&world, Some(&world.newbie), "").await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(body["location"], format!("{TEST_SERVE_PATH}/guide"));
}

#[tokio::test]
async fn anonymous_redirected_to_login_when_anonymous_view_disabled() {
    let world = TestWorld::with_config(test_config().with_anonymous_view(false));

    let (status, body) = watch_as(&world, None, "").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(
        body["location"],
        format!("{TEST_SERVE_PATH}/login?goto=/watch/bm")
    );

    let (status, _) = watch_as(&world, Some(&world.alice), "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn side_panels_are_filled() {
    let world = TestWorld::new();

    let (_, body) = watch_as(&world, None, "").await;

    let model = &body["dataModel"];
    assert_eq!(model["servePath"], TEST_SERVE_PATH);
    assert_eq!(model["sideHotArticles"].as_array().unwrap().len(), 5);
    assert_eq!(model["sideHotArticles"][0]["title"], "Article 8");
    assert_eq!(model["sideRandomArticles"].as_array().unwrap().len(), 5);
    assert_eq!(model["sideTags"], json!(["rust", "moon"]));
    assert_eq!(model["sideLatestCmts"][0]["authorName"], "bob");
}
