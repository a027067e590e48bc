//! Create-or-update reconciliation against the remote site.
//!
//! [`Publisher`] owns the in-run [`SlugIndex`]. Every slug is looked up
//! remotely at most once per run; creates and updates refresh the index so
//! later children resolve their parent without another round trip.

use std::collections::HashMap;

use mdpress_core::{PageId, PageStatus, RemotePage, Slug};

use crate::error::PublishError;

/// Remote page operations needed by the publisher.
pub trait PageApi {
    /// Every page in `collection` whose slug is `slug`, in any status.
    fn find_by_slug(
        &self,
        collection: &str,
        slug: &Slug,
    ) -> Result<Vec<RemotePage>, PublishError>;

    fn create_page(
        &self,
        collection: &str,
        draft: &PageDraft<'_>,
    ) -> Result<RemotePage, PublishError>;

    /// Full replace of title, body, parent, order and status.
    fn update_page(
        &self,
        collection: &str,
        id: PageId,
        draft: &PageDraft<'_>,
    ) -> Result<RemotePage, PublishError>;
}

/// Field set written on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft<'a> {
    pub slug: &'a Slug,
    pub title: &'a str,
    pub html_body: &'a str,
    pub parent: PageId,
    pub order: i64,
    pub status: PageStatus,
}

/// What the caller wants published.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub slug: &'a Slug,
    pub title: &'a str,
    pub html_body: &'a str,
    pub parent: Option<&'a Slug>,
    pub order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    Created,
    Updated,
}

/// A successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub page: RemotePage,
    pub action: PublishAction,
}

/// In-run cache of slug → page id, per collection.
///
/// `Some(None)` from [`get`](Self::get) means "looked up, not on the site".
#[derive(Debug, Default, Clone)]
pub struct SlugIndex {
    entries: HashMap<(String, Slug), Option<PageId>>,
}

impl SlugIndex {
    pub fn get(&self, collection: &str, slug: &Slug) -> Option<Option<PageId>> {
        self.entries
            .get(&(collection.to_owned(), slug.clone()))
            .copied()
    }

    pub fn insert(&mut self, collection: &str, slug: Slug, id: Option<PageId>) {
        self.entries.insert((collection.to_owned(), slug), id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves slugs and writes pages through a [`PageApi`].
pub struct Publisher<'a, A: PageApi + ?Sized> {
    api: &'a A,
    index: SlugIndex,
    lookups: usize,
}

impl<'a, A: PageApi + ?Sized> Publisher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            index: SlugIndex::default(),
            lookups: 0,
        }
    }

    /// Number of remote slug lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn index(&self) -> &SlugIndex {
        &self.index
    }

    /// Page id for `slug`, consulting the index before the remote site.
    ///
    /// The answer, including "absent", is cached. Errors are not.
    pub fn resolve_slug(
        &mut self,
        collection: &str,
        slug: &Slug,
    ) -> Result<Option<PageId>, PublishError> {
        if let Some(cached) = self.index.get(collection, slug) {
            tracing::debug!(%slug, "slug index hit");
            return Ok(cached);
        }

        self.lookups += 1;
        let found = self.api.find_by_slug(collection, slug)?;
        if found.len() > 1 {
            tracing::warn!(
                %slug,
                matches = found.len(),
                "multiple pages share this slug; using the first live one"
            );
        }
        let id = found
            .iter()
            .find(|p| p.status != PageStatus::Trash)
            .or_else(|| found.first())
            .map(|p| p.id);

        self.index.insert(collection, slug.clone(), id);
        Ok(id)
    }

    /// Create the page if its slug is unknown to the site, else update it.
    ///
    /// An unresolvable parent is logged and the page is written unparented.
    /// The status is always [`PageStatus::Publish`].
    pub fn publish(
        &mut self,
        collection: &str,
        request: PageRequest<'_>,
    ) -> Result<Published, PublishError> {
        let parent = match request.parent {
            None => PageId::NONE,
            Some(parent) if parent == request.slug => {
                tracing::warn!(
                    slug = %request.slug,
                    "page lists itself as parent; publishing unparented"
                );
                PageId::NONE
            }
            Some(parent) => match self.resolve_slug(collection, parent)? {
                Some(id) => id,
                None => {
                    tracing::warn!(
                        slug = %request.slug,
                        %parent,
                        "parent page not found; publishing unparented"
                    );
                    PageId::NONE
                }
            },
        };

        let draft = PageDraft {
            slug: request.slug,
            title: request.title,
            html_body: request.html_body,
            parent,
            order: request.order,
            status: PageStatus::Publish,
        };

        let (page, action) = match self.resolve_slug(collection, request.slug)? {
            Some(id) => (
                self.api.update_page(collection, id, &draft)?,
                PublishAction::Updated,
            ),
            None => (
                self.api.create_page(collection, &draft)?,
                PublishAction::Created,
            ),
        };

        if page.slug != *request.slug && !page.slug.is_blank() {
            tracing::warn!(
                requested = %request.slug,
                assigned = %page.slug,
                "site assigned a different slug"
            );
        }
        self.index
            .insert(collection, request.slug.clone(), Some(page.id));

        tracing::info!(
            slug = %request.slug,
            id = %page.id,
            parent = %parent,
            "{}",
            match action {
                PublishAction::Created => "created page",
                PublishAction::Updated => "updated page",
            }
        );
        Ok(Published { page, action })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// Records calls; pages live in a Vec keyed by slug.
    #[derive(Default)]
    struct FakeApi {
        pages: RefCell<Vec<RemotePage>>,
        finds: RefCell<Vec<String>>,
        fail_writes: bool,
        /// While set, every lookup fails with a transport error.
        fail_finds: Cell<bool>,
    }

    impl FakeApi {
        fn with_page(id: u64, slug: &str, status: PageStatus) -> Self {
            let api = Self::default();
            api.pages.borrow_mut().push(page(id, slug, status));
            api
        }
    }

    fn page(id: u64, slug: &str, status: PageStatus) -> RemotePage {
        RemotePage {
            id: PageId(id),
            slug: Slug::from(slug),
            parent: PageId::NONE,
            order: 0,
            title: String::new(),
            html_body: String::new(),
            status,
        }
    }

    fn written(draft: &PageDraft<'_>, id: u64) -> RemotePage {
        RemotePage {
            id: PageId(id),
            slug: draft.slug.clone(),
            parent: draft.parent,
            order: draft.order,
            title: draft.title.to_owned(),
            html_body: draft.html_body.to_owned(),
            status: draft.status.clone(),
        }
    }

    impl PageApi for FakeApi {
        fn find_by_slug(&self, _: &str, slug: &Slug) -> Result<Vec<RemotePage>, PublishError> {
            self.finds.borrow_mut().push(slug.to_string());
            if self.fail_finds.get() {
                return Err(PublishError::Transport {
                    slug: slug.clone(),
                    endpoint: "GET /pages".to_string(),
                    reason: "connection reset".to_string(),
                });
            }
            Ok(self
                .pages
                .borrow()
                .iter()
                .filter(|p| p.slug == *slug)
                .cloned()
                .collect())
        }

        fn create_page(&self, _: &str, draft: &PageDraft<'_>) -> Result<RemotePage, PublishError> {
            if self.fail_writes {
                return Err(PublishError::Status {
                    slug: draft.slug.clone(),
                    endpoint: "POST /pages".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            let id = 100 + self.pages.borrow().len() as u64;
            let page = written(draft, id);
            self.pages.borrow_mut().push(page.clone());
            Ok(page)
        }

        fn update_page(
            &self,
            _: &str,
            id: PageId,
            draft: &PageDraft<'_>,
        ) -> Result<RemotePage, PublishError> {
            Ok(written(draft, id.0))
        }
    }

    fn request<'a>(slug: &'a Slug, parent: Option<&'a Slug>) -> PageRequest<'a> {
        PageRequest {
            slug,
            title: "T",
            html_body: "<p>b</p>",
            parent,
            order: 1,
        }
    }

    #[test]
    fn creates_unknown_slug_and_caches_id() {
        let api = FakeApi::default();
        let mut publisher = Publisher::new(&api);
        let slug = Slug::from("intro");

        let out = publisher.publish("pages", request(&slug, None)).unwrap();
        assert_eq!(out.action, PublishAction::Created);
        assert_eq!(out.page.status, PageStatus::Publish);
        assert_eq!(
            publisher.resolve_slug("pages", &slug).unwrap(),
            Some(out.page.id)
        );
        assert_eq!(publisher.lookups(), 1);
    }

    #[test]
    fn updates_existing_slug() {
        let api = FakeApi::with_page(7, "intro", PageStatus::Draft);
        let mut publisher = Publisher::new(&api);
        let slug = Slug::from("intro");

        let out = publisher.publish("pages", request(&slug, None)).unwrap();
        assert_eq!(out.action, PublishAction::Updated);
        assert_eq!(out.page.id, PageId(7));
        assert_eq!(out.page.status, PageStatus::Publish, "drafts are forced to publish");
    }

    #[test]
    fn missing_parent_publishes_unparented_and_is_looked_up_once() {
        let api = FakeApi::default();
        let mut publisher = Publisher::new(&api);
        let parent = Slug::from("ghost");
        let a = Slug::from("a");
        let b = Slug::from("b");

        let first = publisher.publish("pages", request(&a, Some(&parent))).unwrap();
        let second = publisher.publish("pages", request(&b, Some(&parent))).unwrap();

        assert_eq!(first.page.parent, PageId::NONE);
        assert_eq!(second.page.parent, PageId::NONE);
        let ghost_lookups = api.finds.borrow().iter().filter(|s| *s == "ghost").count();
        assert_eq!(ghost_lookups, 1);
    }

    #[test]
    fn self_parent_is_ignored() {
        let api = FakeApi::default();
        let mut publisher = Publisher::new(&api);
        let slug = Slug::from("loop");

        let out = publisher.publish("pages", request(&slug, Some(&slug))).unwrap();
        assert_eq!(out.page.parent, PageId::NONE);
    }

    #[test]
    fn trashed_duplicate_is_skipped_when_live_page_exists() {
        let api = FakeApi::with_page(3, "dup", PageStatus::Trash);
        api.pages
            .borrow_mut()
            .push(page(4, "dup", PageStatus::Publish));
        let mut publisher = Publisher::new(&api);

        let id = publisher.resolve_slug("pages", &Slug::from("dup")).unwrap();
        assert_eq!(id, Some(PageId(4)));
    }

    #[test]
    fn failed_write_leaves_index_as_looked_up() {
        let api = FakeApi {
            fail_writes: true,
            ..FakeApi::default()
        };
        let mut publisher = Publisher::new(&api);
        let slug = Slug::from("x");

        let err = publisher.publish("pages", request(&slug, None)).unwrap_err();
        assert_eq!(err.slug(), &slug);
        assert_eq!(publisher.index().get("pages", &slug), Some(None));
    }

    #[test]
    fn parent_lookup_error_fails_publish_and_is_not_cached() {
        let api = FakeApi::with_page(5, "hub", PageStatus::Publish);
        api.fail_finds.set(true);
        let mut publisher = Publisher::new(&api);
        let hub = Slug::from("hub");
        let child = Slug::from("child");

        let err = publisher
            .publish("pages", request(&child, Some(&hub)))
            .unwrap_err();
        assert!(matches!(err, PublishError::Transport { .. }));
        assert_eq!(err.slug(), &hub);
        assert_eq!(publisher.index().get("pages", &hub), None);
        assert!(api.pages.borrow().iter().all(|p| p.slug != child), "nothing written");

        api.fail_finds.set(false);
        let out = publisher
            .publish("pages", request(&child, Some(&hub)))
            .unwrap();
        assert_eq!(out.page.parent, PageId(5));
        let hub_lookups = api.finds.borrow().iter().filter(|s| *s == "hub").count();
        assert_eq!(hub_lookups, 2, "failed lookup must be retried");
    }

    #[test]
    fn index_is_scoped_per_collection() {
        let mut index = SlugIndex::default();
        let slug = Slug::from("about");
        index.insert("pages", slug.clone(), Some(PageId(1)));
        assert_eq!(index.get("pages", &slug), Some(Some(PageId(1))));
        assert_eq!(index.get("posts", &slug), None);
    }
}
