//! Paginated listing support.
//!
//! Listing endpoints answer with an envelope `{data, page, pages, results}`.
//! [`Paginator`] drives a [`PageSource`] from page 1 to the last page and
//! concatenates the records in order; [`EndpointPages`] is the HTTP-backed
//! source used by every resource client.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::client::ServiceClient;
use crate::error::Result;

/// Smallest page size the API accepts.
pub const MIN_PAGE_SIZE: u32 = 25;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Options controlling a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ListOptions {
    /// Fetch only this page instead of walking every page
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Records per page
    #[validate(range(min = 25, max = 500))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// JSON filter sent in the `X-Filter` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Stop after this many pages
    #[validate(range(min = 1))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl ListOptions {
    /// Options that fetch every page with the server's default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single page.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set a raw JSON filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the filter from a JSON value.
    #[must_use]
    pub fn with_filter_json(mut self, filter: &serde_json::Value) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    /// Cap the number of pages fetched.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Query pairs for the given page.
    #[must_use]
    pub fn query_pairs(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", page.to_string())];
        if let Some(page_size) = self.page_size {
            pairs.push(("page_size", page_size.to_string()));
        }
        pairs
    }
}

/// One page as returned by a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    /// Records on this page
    pub data: Vec<T>,

    /// This page's number (1-based)
    #[serde(default)]
    pub page: u32,

    /// Total number of pages
    #[serde(default)]
    pub pages: u32,

    /// Total number of records across all pages
    #[serde(default)]
    pub results: u64,
}

/// Records gathered from one or more pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedList<T> {
    /// Records in page order
    pub data: Vec<T>,

    /// Total number of pages the server reported
    pub pages: u32,

    /// Total number of records the server reported
    pub results: u64,

    /// Number of pages actually fetched
    pub pages_fetched: u32,
}

impl<T> PagedList<T> {
    /// Number of records collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no records were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if fewer pages were fetched than exist.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.pages_fetched < self.pages
    }

    /// Consume the list, returning the records.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> IntoIterator for PagedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PagedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Something that can fetch numbered pages of records.
#[cfg_attr(test, mockall::automock(type Item = u32;))]
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Record type carried by each page.
    type Item: Send;

    /// Fetch one page (1-based).
    async fn fetch_page(&self, page: u32) -> Result<PageEnvelope<Self::Item>>;
}

/// Walks a [`PageSource`] according to [`ListOptions`].
pub struct Paginator<'a, S: ?Sized> {
    source: &'a S,
    options: &'a ListOptions,
}

impl<'a, S> Paginator<'a, S>
where
    S: PageSource + ?Sized,
{
    /// Create a paginator over `source`.
    pub const fn new(source: &'a S, options: &'a ListOptions) -> Self {
        Self { source, options }
    }

    /// Fetch the requested page, or every page up to `max_pages`.
    ///
    /// Pages are fetched sequentially. The first failure aborts the listing
    /// and is returned as is.
    ///
    /// # Errors
    ///
    /// [`crate::Error::ValidationError`] for invalid options, otherwise the
    /// first error reported by the source.
    pub async fn fetch_all(self) -> Result<PagedList<S::Item>> {
        self.options.validate()?;

        if let Some(page) = self.options.page {
            let envelope = self.source.fetch_page(page).await?;
            return Ok(PagedList {
                data: envelope.data,
                pages: envelope.pages,
                results: envelope.results,
                pages_fetched: 1,
            });
        }

        let first = self.source.fetch_page(1).await?;
        let total_pages = first.pages;
        let last_page = self
            .options
            .max_pages
            .map_or(total_pages, |cap| cap.min(total_pages));

        let mut data = first.data;
        let mut pages_fetched = 1;

        for page in 2..=last_page {
            debug!(page, total_pages, "Fetching next page");
            let envelope = self.source.fetch_page(page).await?;
            data.extend(envelope.data);
            pages_fetched += 1;
        }

        Ok(PagedList {
            data,
            pages: total_pages,
            results: first.results,
            pages_fetched,
        })
    }
}

/// HTTP-backed [`PageSource`] for one listing endpoint.
pub struct EndpointPages<'a, T> {
    client: &'a ServiceClient,
    path: &'a str,
    options: &'a ListOptions,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T> EndpointPages<'a, T> {
    /// Create a source for `path`, sending `options` with every page request.
    #[must_use]
    pub const fn new(client: &'a ServiceClient, path: &'a str, options: &'a ListOptions) -> Self {
        Self {
            client,
            path,
            options,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource for EndpointPages<'_, T>
where
    T: DeserializeOwned + Send,
{
    type Item = T;

    async fn fetch_page(&self, page: u32) -> Result<PageEnvelope<T>> {
        self.client.get_page(self.path, self.options, page).await
    }
}
