//! Paged listings
//!
//! [`ItemPaged`] wraps a snapshot taken when the listing was requested.
//! Later store mutations are not reflected. It can be consumed item by item
//! (with a small simulated delay at every page boundary) or page by page via
//! [`ItemPaged::by_page`], which is restartable from any continuation token.
//!
//! Continuation tokens are the decimal start offset into the snapshot and are
//! only meaningful for the snapshot that produced them.

use crate::error::{Error, Result};
use futures::stream::{self, Stream};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default delay applied when flat iteration crosses into a new page
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(1);

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the following page; `None` on the final page
    pub continuation_token: Option<String>,
}

/// Snapshot listing with item and page access
#[derive(Debug, Clone)]
pub struct ItemPaged<T> {
    items: Vec<T>,
    page_size: usize,
    page_delay: Duration,
    cursor: usize,
}

impl<T: Clone> ItemPaged<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            page_delay: Duration::ZERO,
            cursor: 0,
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of items in the snapshot
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next item of the flat iteration, `None` once exhausted
    pub async fn next(&mut self) -> Option<T> {
        if self.cursor >= self.items.len() {
            return None;
        }
        if self.cursor % self.page_size == 0 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        let item = self.items[self.cursor].clone();
        self.cursor += 1;
        Some(item)
    }

    /// Like [`next`](Self::next), but stops once `cancel` fires
    pub async fn next_cancellable(&mut self, cancel: &CancellationToken) -> Option<T> {
        if cancel.is_cancelled() {
            return None;
        }
        self.next().await
    }

    /// Drain the remaining items
    pub async fn collect_all(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.items.len() - self.cursor);
        while let Some(item) = self.next().await {
            out.push(item);
        }
        out
    }

    /// Flat iteration as a stream
    pub fn into_stream(self) -> impl Stream<Item = T> {
        stream::unfold(self, |mut paged| async move {
            let item = paged.next().await?;
            Some((item, paged))
        })
    }

    /// Page iterator starting at `continuation_token` (or the beginning)
    ///
    /// Fails with `Validation` if the token is not a decimal offset.
    pub fn by_page(&self, continuation_token: Option<&str>) -> Result<Pages<'_, T>> {
        let start = match continuation_token {
            None => 0,
            Some(token) => token.trim().parse::<usize>().map_err(|_| {
                Error::Validation(format!("Invalid continuation token '{}'", token))
            })?,
        };
        Ok(Pages {
            items: &self.items,
            page_size: self.page_size,
            next_start: Some(start),
        })
    }
}

/// Lazy page sequence borrowed from an [`ItemPaged`]
#[derive(Debug, Clone)]
pub struct Pages<'a, T> {
    items: &'a [T],
    page_size: usize,
    next_start: Option<usize>,
}

impl<T: Clone> Iterator for Pages<'_, T> {
    type Item = Page<T>;

    fn next(&mut self) -> Option<Page<T>> {
        let start = self.next_start?;
        if start >= self.items.len() {
            self.next_start = None;
            return None;
        }

        let end = start.saturating_add(self.page_size).min(self.items.len());
        let continuation_token = (end < self.items.len()).then(|| end.to_string());
        self.next_start = (end < self.items.len()).then_some(end);

        Some(Page {
            items: self.items[start..end].to_vec(),
            continuation_token,
        })
    }
}
