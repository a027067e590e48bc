//! WordPress REST API (`/wp-json/wp/v2`) client.
//!
//! Blocking `ureq` agent, Basic auth with an application password, JSON
//! request and response bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::{Agent, Request};

use mdpress_core::{Config, PageId, PageStatus, RemotePage, Slug};

use crate::error::PublishError;
use crate::publisher::{PageApi, PageDraft};

/// Longest error body kept in a [`PublishError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Page/post object as returned by the REST API.
#[derive(Debug, Deserialize)]
struct WpPage {
    id: u64,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    parent: u64,
    #[serde(default)]
    menu_order: i64,
    #[serde(default)]
    title: WpText,
    #[serde(default)]
    content: WpText,
    #[serde(default)]
    status: PageStatus,
}

/// `{raw, rendered}` pair; `raw` is only present with `context=edit`.
#[derive(Debug, Default, Deserialize)]
struct WpText {
    #[serde(default)]
    raw: Option<String>,
    #[serde(default)]
    rendered: String,
}

impl WpText {
    fn into_text(self) -> String {
        self.raw.unwrap_or(self.rendered)
    }
}

impl From<WpPage> for RemotePage {
    fn from(p: WpPage) -> Self {
        RemotePage {
            id: PageId(p.id),
            slug: Slug::from(p.slug),
            parent: PageId(p.parent),
            order: p.menu_order,
            title: p.title.into_text(),
            html_body: p.content.into_text(),
            status: p.status,
        }
    }
}

/// Create/update request body.
#[derive(Debug, Serialize)]
struct WpPageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<&'a str>,
    title: &'a str,
    content: &'a str,
    parent: u64,
    menu_order: i64,
    status: &'a str,
}

impl<'a> WpPageBody<'a> {
    fn new(draft: &'a PageDraft<'a>, include_slug: bool) -> Self {
        Self {
            slug: include_slug.then(|| draft.slug.as_str()),
            title: draft.title,
            content: draft.html_body,
            parent: draft.parent.0,
            menu_order: draft.order,
            status: draft.status.as_str(),
        }
    }
}

/// WordPress REST client.
pub struct WordPressClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl WordPressClient {
    /// # Arguments
    /// * `agent` - shared HTTP agent (carries the request timeout)
    /// * `base_url` - API root, e.g. `https://example.com/wp-json/wp/v2`
    /// * `username` / `apikey` - Basic auth credentials
    pub fn new(agent: Agent, base_url: &str, username: &str, apikey: &str) -> Self {
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: basic_auth(username, apikey),
        }
    }

    pub fn from_config(agent: Agent, config: &Config) -> Self {
        Self::new(agent, &config.api_base(), &config.username, &config.apikey)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn page_url(&self, collection: &str, id: PageId) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    fn request(&self, method: &str, url: &str) -> Request {
        self.agent
            .request(method, url)
            .set("Authorization", &self.auth_header)
            .set("Accept", "application/json")
    }

    /// Send `request` and decode a JSON response, mapping every failure to
    /// a [`PublishError`] that names `slug` and the endpoint.
    fn execute<T: DeserializeOwned>(
        &self,
        slug: &Slug,
        request: Request,
        body: Option<&WpPageBody<'_>>,
    ) -> Result<T, PublishError> {
        let endpoint = format!("{} {}", request.method(), request.url());
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| "(unable to read error body)".to_owned());
                return Err(PublishError::Status {
                    slug: slug.clone(),
                    endpoint,
                    status,
                    body: truncate(body),
                });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(PublishError::Transport {
                    slug: slug.clone(),
                    endpoint,
                    reason: t.to_string(),
                })
            }
        };

        let text = response
            .into_string()
            .map_err(|e| PublishError::Transport {
                slug: slug.clone(),
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&text).map_err(|source| PublishError::Decode {
            slug: slug.clone(),
            endpoint,
            source,
        })
    }
}

impl PageApi for WordPressClient {
    fn find_by_slug(
        &self,
        collection: &str,
        slug: &Slug,
    ) -> Result<Vec<RemotePage>, PublishError> {
        let request = self
            .request("GET", &self.collection_url(collection))
            .query("slug", slug.as_str())
            .query("status", "any")
            .query("context", "edit");
        let pages: Vec<WpPage> = self.execute(slug, request, None)?;
        Ok(pages.into_iter().map(RemotePage::from).collect())
    }

    fn create_page(
        &self,
        collection: &str,
        draft: &PageDraft<'_>,
    ) -> Result<RemotePage, PublishError> {
        let request = self.request("POST", &self.collection_url(collection));
        let body = WpPageBody::new(draft, true);
        let page: WpPage = self.execute(draft.slug, request, Some(&body))?;
        Ok(page.into())
    }

    fn update_page(
        &self,
        collection: &str,
        id: PageId,
        draft: &PageDraft<'_>,
    ) -> Result<RemotePage, PublishError> {
        let request = self.request("POST", &self.page_url(collection, id));
        let body = WpPageBody::new(draft, false);
        let page: WpPage = self.execute(draft.slug, request, Some(&body))?;
        Ok(page.into())
    }
}

fn basic_auth(username: &str, apikey: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{apikey}")))
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
