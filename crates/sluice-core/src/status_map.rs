//! Interval index from HTTP status codes to handlers.
//!
//! Ranges may overlap. Inside an overlap the entry inserted first wins, which
//! lets callers register narrow handlers ahead of broad fallbacks:
//!
//! ```text
//! insert 200..=299  A
//! insert 150..=600  C
//!
//! 150       200        299 300          600
//!  |---C----|-----A-----|-------C-------|
//! ```
//!
//! Every insert rebuilds a flat list of disjoint segments with a sweep over
//! the range boundaries, so [`StatusMap::find`] is a binary search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Serialize, Serializer};

use crate::error::ConfigurationError;

/// An inclusive range of status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusRange {
    start: u16,
    end: u16,
}

impl StatusRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: u16, end: u16) -> Result<Self, ConfigurationError> {
        if start > end {
            return Err(ConfigurationError::InvalidStatusRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range holding exactly one status.
    #[must_use]
    pub const fn single(status: u16) -> Self {
        Self {
            start: status,
            end: status,
        }
    }

    /// First status in the range.
    #[must_use]
    pub const fn start(&self) -> u16 {
        self.start
    }

    /// Last status in the range.
    #[must_use]
    pub const fn end(&self) -> u16 {
        self.end
    }

    /// True when `status` falls inside the range.
    #[must_use]
    pub const fn contains(&self, status: u16) -> bool {
        self.start <= status && status <= self.end
    }
}

impl From<u16> for StatusRange {
    fn from(status: u16) -> Self {
        Self::single(status)
    }
}

impl TryFrom<RangeInclusive<u16>> for StatusRange {
    type Error = ConfigurationError;

    fn try_from(range: RangeInclusive<u16>) -> Result<Self, Self::Error> {
        Self::new(*range.start(), *range.end())
    }
}

impl fmt::Display for StatusRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..={}", self.start, self.end)
        }
    }
}

impl Serialize for StatusRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    range: StatusRange,
    value: T,
}

/// A disjoint run of statuses owned by one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: u16,
    end: u16,
    entry: usize,
}

/// Maps status codes to values over possibly overlapping ranges.
///
/// # Example
///
/// ```
/// use sluice_core::StatusMap;
///
/// let mut map = StatusMap::new();
/// map.insert(200..=299, "success").unwrap();
/// map.insert(100..=599, "fallback").unwrap();
///
/// assert_eq!(map.find(204), Some(&"success"));
/// assert_eq!(map.find(404), Some(&"fallback"));
/// assert_eq!(map.find(700), None);
/// ```
#[derive(Debug, Clone)]
pub struct StatusMap<T> {
    entries: Vec<Entry<T>>,
    segments: Vec<Segment>,
}

impl<T> Default for StatusMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            segments: Vec::new(),
        }
    }
}

impl<T> StatusMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` for every status in `range` not already claimed.
    ///
    /// # Errors
    ///
    /// Fails when `range` converts to an invalid [`StatusRange`].
    pub fn insert<R>(&mut self, range: R, value: T) -> Result<(), ConfigurationError>
    where
        R: TryInto<StatusRange>,
        ConfigurationError: From<R::Error>,
    {
        let range = range.try_into()?;
        self.entries.push(Entry { range, value });
        self.rebuild();
        Ok(())
    }

    /// Returns the value owning `status`, if any.
    #[must_use]
    pub fn find(&self, status: u16) -> Option<&T> {
        let index = self.segments.partition_point(|s| s.end < status);
        let segment = self.segments.get(index)?;
        (segment.start <= status).then(|| &self.entries[segment.entry].value)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusRange, &T)> {
        self.entries.iter().map(|e| (e.range, &e.value))
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Number of inserted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rebuild(&mut self) {
        // (position, opens, entry); a range closes one past its end
        let mut events: Vec<(u32, bool, usize)> = Vec::with_capacity(self.entries.len() * 2);
        for (i, entry) in self.entries.iter().enumerate() {
            events.push((u32::from(entry.range.start), true, i));
            events.push((u32::from(entry.range.end) + 1, false, i));
        }
        events.sort_unstable_by_key(|&(position, _, _)| position);

        let mut active: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
        let mut closed = vec![false; self.entries.len()];
        let mut segments: Vec<Segment> = Vec::new();
        let mut cursor = 0;

        while cursor < events.len() {
            let position = events[cursor].0;
            while let Some(&(p, opens, entry)) = events.get(cursor) {
                if p != position {
                    break;
                }
                if opens {
                    active.push(Reverse(entry));
                } else {
                    closed[entry] = true;
                }
                cursor += 1;
            }

            while active.peek().is_some_and(|Reverse(top)| closed[*top]) {
                active.pop();
            }

            let Some(&Reverse(winner)) = active.peek() else {
                continue;
            };
            let Some(&(next, _, _)) = events.get(cursor) else {
                break;
            };
            let (Ok(start), Ok(end)) = (u16::try_from(position), u16::try_from(next - 1)) else {
                continue;
            };

            match segments.last_mut() {
                Some(last) if last.entry == winner && u32::from(last.end) + 1 == position => {
                    last.end = end;
                }
                _ => segments.push(Segment {
                    start,
                    end,
                    entry: winner,
                }),
            }
        }

        self.segments = segments;
    }
}
