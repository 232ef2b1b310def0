//! Data model service
//!
//! Fills the shared parts of every page: header/footer and the side panels
//! (random articles, hot articles, tags, latest comments).

use crate::error::ServiceResult;
use async_trait::async_trait;
use bm_model::{keys, DataModel, User};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Per-request facts the header and footer depend on
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub path: String,
    pub user: Option<User>,
    pub csrf_token: Option<String>,
}

/// Page chrome filler
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait DataModelService: Send + Sync {
    async fn fill_header_and_footer(
        &self,
        meta: &RequestMeta,
        data_model: &mut DataModel,
    ) -> ServiceResult<()>;

    async fn fill_random_articles(&self, data_model: &mut DataModel) -> ServiceResult<()>;

    async fn fill_side_hot_articles(&self, data_model: &mut DataModel) -> ServiceResult<()>;

    async fn fill_side_tags(&self, data_model: &mut DataModel) -> ServiceResult<()>;

    async fn fill_latest_cmts(&self, data_model: &mut DataModel) -> ServiceResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub title: String,
    pub permalink: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub author_name: String,
    pub content: String,
    pub article_title: String,
}

/// Snapshot of site content used for side panels
///
/// `comments` is expected newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteData {
    pub articles: Vec<ArticleSummary>,
    pub tags: Vec<String>,
    pub comments: Vec<CommentSummary>,
}

/// [`DataModelService`] backed by a static [`SiteData`] snapshot
#[derive(Debug, Clone)]
pub struct SiteDataModelService {
    site: SiteData,
    serve_path: String,
    static_resource_version: String,
    side_count: usize,
    seed: Option<u64>,
}

impl SiteDataModelService {
    /// Create a service for the given site snapshot
    #[must_use]
    pub fn new(site: SiteData, serve_path: impl Into<String>) -> Self {
        Self {
            site,
            serve_path: serve_path.into(),
            static_resource_version: "1".to_string(),
            side_count: 5,
            seed: None,
        }
    }

    /// With static resource version (cache buster)
    #[inline]
    #[must_use]
    pub fn with_static_resource_version(mut self, version: impl Into<String>) -> Self {
        self.static_resource_version = version.into();
        self
    }

    /// With number of entries per side panel
    #[inline]
    #[must_use]
    pub fn with_side_count(mut self, count: usize) -> Self {
        self.side_count = count;
        self
    }

    /// With a fixed shuffle seed, making random articles reproducible
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[async_trait]
impl DataModelService for SiteDataModelService {
    async fn fill_header_and_footer(
        &self,
        meta: &RequestMeta,
        data_model: &mut DataModel,
    ) -> ServiceResult<()> {
        data_model.put(keys::SERVE_PATH, &self.serve_path);
        data_model.put(keys::STATIC_RESOURCE_VERSION, &self.static_resource_version);
        data_model.put(keys::IS_LOGGED_IN, meta.user.is_some());

        if let Some(user) = &meta.user {
            data_model.put(
                keys::CURRENT_USER,
                json!({
                    "id": user.id,
                    "name": user.name,
                    "avatarUrl": user.avatar_view_mode.apply(&user.avatar_url),
                    "color": user.color(),
                }),
            );
        }
        if let Some(csrf_token) = &meta.csrf_token {
            data_model.put(keys::CSRF_TOKEN, csrf_token);
        }

        Ok(())
    }

    async fn fill_random_articles(&self, data_model: &mut DataModel) -> ServiceResult<()> {
        let mut articles = self.site.articles.clone();
        match self.seed {
            Some(seed) => articles.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => articles.shuffle(&mut rand::rng()),
        }
        articles.truncate(self.side_count);

        data_model.put(keys::SIDE_RANDOM_ARTICLES, articles);
        Ok(())
    }

    async fn fill_side_hot_articles(&self, data_model: &mut DataModel) -> ServiceResult<()> {
        let mut articles = self.site.articles.clone();
        articles.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        articles.truncate(self.side_count);

        data_model.put(keys::SIDE_HOT_ARTICLES, articles);
        Ok(())
    }

    async fn fill_side_tags(&self, data_model: &mut DataModel) -> ServiceResult<()> {
        let tags: Vec<_> = self.site.tags.iter().take(self.side_count).collect();
        data_model.put(keys::SIDE_TAGS, tags);
        Ok(())
    }

    async fn fill_latest_cmts(&self, data_model: &mut DataModel) -> ServiceResult<()> {
        let comments: Vec<_> = self.site.comments.iter().take(self.side_count).collect();
        data_model.put(keys::SIDE_LATEST_CMTS, comments);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn site() -> SiteData {
        SiteData {
            articles: (1..=8)
                .map(|i| ArticleSummary {
                    title: format!("article {i}"),
                    permalink: format!("/article/{i}"),
                    view_count: i * 10,
                })
                .collect(),
            tags: vec!["rust".into(), "moon".into()],
            comments: vec![CommentSummary {
                author_name: "bob".into(),
                content: "nice".into(),
                article_title: "article 1".into(),
            }],
        }
    }

    #[tokio::test]
    async fn header_footer_for_anonymous() {
        let service = SiteDataModelService::new(site(), "http://localhost:8080")
            .with_static_resource_version("42");
        let mut model = DataModel::new();

        service
            .fill_header_and_footer(&RequestMeta::default(), &mut model)
            .await
            .unwrap();

        assert_eq!(model.get(keys::SERVE_PATH), Some(&json!("http://localhost:8080")));
        assert_eq!(model.get(keys::STATIC_RESOURCE_VERSION), Some(&json!("42")));
        assert_eq!(model.get(keys::IS_LOGGED_IN), Some(&json!(false)));
        assert!(!model.contains_key(keys::CURRENT_USER));
        assert!(!model.contains_key(keys::CSRF_TOKEN));
    }

    #[tokio::test]
    async fn header_footer_for_user_includes_color_and_csrf() {
        let service = SiteDataModelService::new(site(), "");
        let user = User::new("alice").with_points(10);
        let meta = RequestMeta {
            path: "/watch/bm".into(),
            user: Some(user),
            csrf_token: Some("abc".into()),
        };
        let mut model = DataModel::new();

        service.fill_header_and_footer(&meta, &mut model).await.unwrap();

        assert_eq!(model.get(keys::IS_LOGGED_IN), Some(&json!(true)));
        assert_eq!(model.get(keys::CURRENT_USER).unwrap()["color"], json!("aaaaaa"));
        assert_eq!(model.get(keys::CSRF_TOKEN), Some(&json!("abc")));
    }

    #[tokio::test]
    async fn hot_articles_sorted_by_views() {
        let service = SiteDataModelService::new(site(), "").with_side_count(3);
        let mut model = DataModel::new();

        service.fill_side_hot_articles(&mut model).await.unwrap();

        let titles: Vec<_> = model.get(keys::SIDE_HOT_ARTICLES).unwrap().as_array().unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["article 8", "article 7", "article 6"]);
    }

    #[tokio::test]
    async fn seeded_random_articles_are_reproducible() {
        let service = SiteDataModelService::new(site(), "").with_seed(7).with_side_count(4);
        let mut first = DataModel::new();
        let mut second = DataModel::new();

        service.fill_random_articles(&mut first).await.unwrap();
        service.fill_random_articles(&mut second).await.unwrap();

        let picked = first.get(keys::SIDE_RANDOM_ARTICLES).and_then(Value::as_array).unwrap();
        assert_eq!(picked.len(), 4);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn side_tags_and_comments() {
        let service = SiteDataModelService::new(site(), "").with_side_count(1);
        let mut model = DataModel::new();

        service.fill_side_tags(&mut model).await.unwrap();
        service.fill_latest_cmts(&mut model).await.unwrap();

        assert_eq!(model.get(keys::SIDE_TAGS), Some(&json!(["rust"])));
        assert_eq!(model.get(keys::SIDE_LATEST_CMTS).unwrap()[0]["authorName"], json!("bob"));
    }
}
