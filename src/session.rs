use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Anything a ranking session can page through. Items that contain their own
/// navigable sub-items (a channel's videos) report a non-zero count.
pub trait Pageable: Clone {
    fn virality_score(&self) -> f64;

    fn sub_item_count(&self) -> usize {
        0
    }
}

/// One ranked item with its 1-based position in the session.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<T> {
    pub item: T,
    pub position: usize,
    pub total: usize,
}

/// A parent item plus the 1-based position of the selected sub-item.
#[derive(Debug, Clone, PartialEq)]
pub struct SubView<T> {
    pub item: T,
    pub position: usize,
    pub total: usize,
    pub sub_position: usize,
    pub sub_total: usize,
}

/// Cursor-move outcomes. Hitting a boundary is an ordinary result, not an
/// error, and leaves the cursor where it was.
#[derive(Debug, Clone, PartialEq)]
pub enum Nav<T> {
    Page(PageView<T>),
    EndOfList,
    StartOfList,
    NoSession,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubNav<T> {
    Page(SubView<T>),
    EndOfList,
    StartOfList,
    NoSession,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("no active session for this user")]
    NoSession,
    #[error("index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },
    #[error("item has no sub-items to navigate")]
    NoSubItems,
}

struct RankingSession<T> {
    items: Vec<T>,
    cursor: usize,
    // Independent sub-item cursor per item index; survives jumps between
    // parent items.
    nested: HashMap<usize, usize>,
    last_touch: u64,
}

struct Inner<T> {
    sessions: HashMap<u64, RankingSession<T>>,
    clock: u64,
}

/// In-memory, per-user ranked navigation state. All cursor updates happen
/// under one lock, so at-most-one navigation command per key is an enforced
/// invariant rather than a caller convention. Bounded: once `capacity`
/// sessions exist, starting a session for a new key evicts the
/// least-recently-touched one. Volatile by design; ranked results are cheap
/// to recompute.
pub struct SessionStore<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
}

impl<T: Pageable> SessionStore<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Sorts `items` descending by score (stable, so exact ties keep fetch
    /// order and repeated runs are deterministic) and stores them under
    /// `key`, replacing any prior session. Returns the first page, or `None`
    /// for an empty item list, which is terminal and stores nothing.
    pub fn start(&self, key: u64, mut items: Vec<T>) -> Option<PageView<T>> {
        items.sort_by(|a, b| {
            b.virality_score()
                .partial_cmp(&a.virality_score())
                .unwrap_or(Ordering::Equal)
        });

        let mut inner = self.inner.lock().expect("session store poisoned");
        if items.is_empty() {
            inner.sessions.remove(&key);
            return None;
        }

        if inner.sessions.len() >= self.capacity && !inner.sessions.contains_key(&key) {
            let oldest = inner
                .sessions
                .iter()
                .min_by_key(|(_, session)| session.last_touch)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                tracing::debug!(evicted = oldest, "session store at capacity");
                inner.sessions.remove(&oldest);
            }
        }

        inner.clock += 1;
        let touch = inner.clock;
        let total = items.len();
        let first = items[0].clone();
        inner.sessions.insert(
            key,
            RankingSession {
                items,
                cursor: 0,
                nested: HashMap::new(),
                last_touch: touch,
            },
        );

        Some(PageView {
            item: first,
            position: 1,
            total,
        })
    }

    pub fn current(&self, key: u64) -> Nav<T> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.clock += 1;
        let touch = inner.clock;
        let Some(session) = inner.sessions.get_mut(&key) else {
            return Nav::NoSession;
        };
        session.last_touch = touch;
        Nav::Page(page_view(session))
    }

    pub fn next(&self, key: u64) -> Nav<T> {
        self.step(key, 1)
    }

    pub fn prev(&self, key: u64) -> Nav<T> {
        self.step(key, -1)
    }

    fn step(&self, key: u64, delta: i64) -> Nav<T> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.clock += 1;
        let touch = inner.clock;
        let Some(session) = inner.sessions.get_mut(&key) else {
            return Nav::NoSession;
        };
        session.last_touch = touch;

        if delta > 0 && session.cursor + 1 >= session.items.len() {
            return Nav::EndOfList;
        }
        if delta < 0 && session.cursor == 0 {
            return Nav::StartOfList;
        }

        session.cursor = (session.cursor as i64 + delta) as usize;
        Nav::Page(page_view(session))
    }

    /// Moves the cursor straight to `index` after validating it.
    pub fn jump_to(&self, key: u64, index: usize) -> Result<PageView<T>, NavError> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.clock += 1;
        let touch = inner.clock;
        let session = inner.sessions.get_mut(&key).ok_or(NavError::NoSession)?;
        session.last_touch = touch;

        if index >= session.items.len() {
            return Err(NavError::OutOfRange {
                index,
                len: session.items.len(),
            });
        }

        session.cursor = index;
        Ok(page_view(session))
    }

    /// "View details of item N": moves the cursor to `index` and opens (or
    /// resumes) the nested cursor for that item's sub-items. Nested
    /// navigation never moves any other item's cursor.
    pub fn open_details(&self, key: u64, index: usize) -> Result<SubView<T>, NavError> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.clock += 1;
        let touch = inner.clock;
        let session = inner.sessions.get_mut(&key).ok_or(NavError::NoSession)?;
        session.last_touch = touch;

        if index >= session.items.len() {
            return Err(NavError::OutOfRange {
                index,
                len: session.items.len(),
            });
        }

        session.cursor = index;
        let sub_total = session.items[index].sub_item_count();
        if sub_total == 0 {
            return Err(NavError::NoSubItems);
        }

        let sub_cursor = *session.nested.entry(index).or_insert(0);
        Ok(sub_view(session, sub_cursor, sub_total))
    }

    pub fn sub_next(&self, key: u64) -> SubNav<T> {
        self.sub_step(key, 1)
    }

    pub fn sub_prev(&self, key: u64) -> SubNav<T> {
        self.sub_step(key, -1)
    }

    fn sub_step(&self, key: u64, delta: i64) -> SubNav<T> {
        let mut inner = self.inner.lock().expect("session store poisoned");
        inner.clock += 1;
        let touch = inner.clock;
        let Some(session) = inner.sessions.get_mut(&key) else {
            return SubNav::NoSession;
        };
        session.last_touch = touch;

        let index = session.cursor;
        let sub_total = session.items[index].sub_item_count();
        let sub_cursor = session.nested.get(&index).copied().unwrap_or(0);

        if delta > 0 && sub_cursor + 1 >= sub_total {
            return SubNav::EndOfList;
        }
        if delta < 0 && sub_cursor == 0 {
            return SubNav::StartOfList;
        }

        let moved = (sub_cursor as i64 + delta) as usize;
        session.nested.insert(index, moved);
        SubNav::Page(sub_view(session, moved, sub_total))
    }

    pub fn session_count(&self) -> usize {
        self.inner
            .lock()
            .expect("session store poisoned")
            .sessions
            .len()
    }

    pub fn contains(&self, key: u64) -> bool {
        self.inner
            .lock()
            .expect("session store poisoned")
            .sessions
            .contains_key(&key)
    }
}

fn page_view<T: Pageable>(session: &RankingSession<T>) -> PageView<T> {
    PageView {
        item: session.items[session.cursor].clone(),
        position: session.cursor + 1,
        total: session.items.len(),
    }
}

fn sub_view<T: Pageable>(
    session: &RankingSession<T>,
    sub_cursor: usize,
    sub_total: usize,
) -> SubView<T> {
    SubView {
        item: session.items[session.cursor].clone(),
        position: session.cursor + 1,
        total: session.items.len(),
        sub_position: sub_cursor + 1,
        sub_total,
    }
}
