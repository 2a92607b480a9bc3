//! Cursor pagination over list endpoints

use crate::api::{ApiError, ApiResult};
use crate::context::RequestContext;
use futures_util::stream::{self, Stream};
use std::collections::HashSet;
use std::future::Future;
use tracing::warn;

/// One page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Cursor (the `next` link) for the following page, if any
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

enum Cursor {
    First,
    Next(String),
    Done,
}

struct Walk<F> {
    fetch: F,
    cursor: Cursor,
    seen: HashSet<String>,
}

/// Stream every page of a list endpoint.
///
/// `fetch` receives `None` for the first page and the previous page's `next`
/// cursor afterwards. The stream ends after the last page, right after
/// yielding the first error, or when a `next` cursor repeats one already
/// followed. Cancelling `ctx` between pages yields [`ApiError::Cancelled`].
pub fn paginate<'a, T, F, Fut>(
    ctx: &'a RequestContext,
    fetch: F,
) -> impl Stream<Item = ApiResult<Page<T>>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = ApiResult<Page<T>>> + 'a,
{
    let walk = Walk {
        fetch,
        cursor: Cursor::First,
        seen: HashSet::new(),
    };

    stream::unfold(walk, move |mut walk| async move {
        let cursor = match std::mem::replace(&mut walk.cursor, Cursor::Done) {
            Cursor::Done => return None,
            Cursor::First => None,
            Cursor::Next(next) => Some(next),
        };
        if ctx.is_cancelled() {
            return Some((Err(ApiError::Cancelled), walk));
        }

        match (walk.fetch)(cursor).await {
            Ok(response) => {
                walk.cursor = match &response.value.next {
                    Some(next) if !walk.seen.insert(next.clone()) => {
                        warn!(next = %next, "Next page link repeats, stopping pagination");
                        Cursor::Done
                    }
                    Some(next) => Cursor::Next(next.clone()),
                    None => Cursor::Done,
                };
                Some((Ok(response), walk))
            }
            Err(error) => Some((Err(error), walk)),
        }
    })
}
