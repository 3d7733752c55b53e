//! Page navigation controls

use crate::api::PageMetadata;
use colored::Colorize;
use std::fmt;

/// Prev/Next state derived from the latest page metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current: u32,
    first: u32,
    last: u32,
    total: u64,
}

impl Pager {
    /// `None` until a page has been received
    #[must_use]
    pub fn from_metadata(metadata: Option<&PageMetadata>) -> Option<Self> {
        metadata.map(|m| Self {
            current: m.current_page,
            first: m.first_page,
            last: m.last_page,
            total: m.total_records,
        })
    }

    #[must_use]
    pub const fn prev_enabled(&self) -> bool {
        self.current > self.first
    }

    #[must_use]
    pub const fn next_enabled(&self) -> bool {
        self.current < self.last
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    /// One-line summary without controls, e.g. `Page 2 of 3 (30 products)`
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.total == 1 { "product" } else { "products" };
        format!("Page {} of {} ({} {noun})", self.current, self.last, self.total)
    }
}

impl fmt::Display for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prev = if self.prev_enabled() {
            "< Prev".normal()
        } else {
            "< Prev".dimmed()
        };
        let next = if self.next_enabled() {
            "Next >".normal()
        } else {
            "Next >".dimmed()
        };
        write!(f, "{prev}  {}  {next}", self.summary().bold())
    }
}
