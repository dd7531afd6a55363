//! The "currently shown" pointer.
//!
//! The cursor is `None` exactly when the collection is empty, and
//! otherwise always in `0..len`. It moves for two reasons only:
//! - navigation (`next`, `prev`, `jump_to`), which the engine routes
//!   through the transition animator so every visible change is animated
//! - rebasing after a store mutation, so the user keeps looking at the
//!   same item when something is inserted or removed around it

use crate::store::StoreDelta;

/// Owns the cursor and its rebasing policy.
#[derive(Debug, Clone, Default)]
pub struct CursorController {
    /// Current index, `None` when empty.
    position: Option<usize>,
    /// Collection length the cursor was last rebased against.
    len: usize,
    /// Whether navigation wraps around the ends.
    wrap: bool,
}

impl CursorController {
    /// Create a controller over an empty collection.
    pub fn new(wrap: bool) -> Self {
        Self {
            position: None,
            len: 0,
            wrap,
        }
    }

    /// Current index, `None` when the collection is empty.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Collection length as last seen.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rebase after a single store mutation.
    ///
    /// `new_len` is the collection length after the mutation. Returns
    /// `true` if the cursor value changed.
    pub fn on_store_mutated(&mut self, delta: StoreDelta, new_len: usize) -> bool {
        let before = self.position;
        self.len = new_len;

        self.position = match before {
            _ if new_len == 0 => None,
            None => Some(0),
            Some(cursor) => Some(rebase(cursor, delta).min(new_len - 1)),
        };

        before != self.position
    }

    /// Point at a fresh collection of `new_len` items.
    ///
    /// `follow` is where the previously shown item ended up, if it
    /// survived. Otherwise the old index is kept and clamped.
    pub fn retarget(&mut self, new_len: usize, follow: Option<usize>) -> bool {
        let before = self.position;
        self.len = new_len;

        self.position = if new_len == 0 {
            None
        } else {
            let target = follow.or(before).unwrap_or(0);
            Some(target.min(new_len - 1))
        };

        before != self.position
    }

    /// Move one item forward. Returns `true` if the cursor moved.
    pub fn next(&mut self) -> bool {
        let Some(cursor) = self.position else {
            return false;
        };
        let target = if cursor + 1 < self.len {
            cursor + 1
        } else if self.wrap {
            0
        } else {
            cursor
        };
        self.set(target)
    }

    /// Move one item back. Returns `true` if the cursor moved.
    pub fn prev(&mut self) -> bool {
        let Some(cursor) = self.position else {
            return false;
        };
        let target = if cursor > 0 {
            cursor - 1
        } else if self.wrap {
            self.len - 1
        } else {
            cursor
        };
        self.set(target)
    }

    /// Jump to `index`, clamped into range. Returns `true` if the cursor moved.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.position.is_none() {
            return false;
        }
        self.set(index.min(self.len - 1))
    }

    fn set(&mut self, target: usize) -> bool {
        let changed = self.position != Some(target);
        self.position = Some(target);
        changed
    }
}

/// Apply removal then insertion to a cursor over a non-empty collection.
fn rebase(cursor: usize, delta: StoreDelta) -> usize {
    match (delta.removed_at, delta.inserted_at) {
        // The shown item itself moved; follow it.
        (Some(removed), Some(inserted)) if removed == cursor => inserted,
        (removed, inserted) => {
            let mut cursor = cursor;
            if matches!(removed, Some(r) if r < cursor) {
                cursor -= 1;
            }
            if matches!(inserted, Some(i) if i <= cursor) {
                cursor += 1;
            }
            cursor
        }
    }
}
