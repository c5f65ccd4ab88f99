//! Spread positions and their presentation
//!
//! A spread is identified by its left page index, `-1` being the cover
//! (nothing on the left, page 0 on the right). Narrow viewports reuse the
//! same index space and show only page `left_index + 1`. Everything that maps
//! an index to visible pages or a label lives here.

/// How many pages the presentation shows at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Two facing pages
    #[default]
    Book,
    /// One page (narrow viewports)
    Single,
}

impl Layout {
    pub fn for_narrow(narrow: bool) -> Self {
        if narrow { Layout::Single } else { Layout::Book }
    }
}

/// Page indices visible for a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisiblePages {
    Book {
        left: Option<usize>,
        right: Option<usize>,
    },
    Single(Option<usize>),
}

impl VisiblePages {
    /// Visible page indices, left to right
    pub fn indices(&self) -> Vec<usize> {
        match *self {
            VisiblePages::Book { left, right } => left.into_iter().chain(right).collect(),
            VisiblePages::Single(page) => page.into_iter().collect(),
        }
    }
}

/// Viewing position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spread {
    left_index: isize,
}

impl Spread {
    pub const COVER: Spread = Spread { left_index: -1 };

    /// Spread whose left page is `left_index`, `-1` for the cover
    ///
    /// # Panics
    /// If `left_index < -1`.
    pub fn at(left_index: isize) -> Self {
        assert!(left_index >= -1, "spread index {} below cover", left_index);
        Spread { left_index }
    }

    pub fn left_index(self) -> isize {
        self.left_index
    }

    pub fn is_cover(self) -> bool {
        self.left_index == -1
    }

    /// Whether this is the last reachable spread
    ///
    /// The last reachable spread is the one whose right-hand page is the
    /// final page. An empty score is terminal everywhere.
    pub fn is_terminal(self, page_count: usize) -> bool {
        self.left_index + 2 >= page_count as isize
    }

    /// The following spread, or `None` at the terminal spread
    pub fn next(self, page_count: usize) -> Option<Spread> {
        if self.is_terminal(page_count) {
            None
        } else {
            Some(Spread {
                left_index: self.left_index + 1,
            })
        }
    }

    /// The previous spread, never before the cover
    pub fn prev(self) -> Spread {
        Spread {
            left_index: (self.left_index - 1).max(-1),
        }
    }

    /// Index of the page whose interval times this spread
    ///
    /// That is the first page of the spread: the right page on the cover,
    /// the left page otherwise.
    pub fn timing_page(self) -> usize {
        (self.left_index + 1) as usize
    }

    /// Pages visible at this position
    pub fn visible_pages(self, layout: Layout, page_count: usize) -> VisiblePages {
        let page = |index: isize| {
            (index >= 0 && (index as usize) < page_count).then_some(index as usize)
        };
        match layout {
            Layout::Book => VisiblePages::Book {
                left: page(self.left_index),
                right: page(self.left_index + 1),
            },
            Layout::Single => VisiblePages::Single(page(self.left_index + 1)),
        }
    }

    /// Human-readable page range, `None` for an empty score
    pub fn label(self, layout: Layout, page_count: usize) -> Option<String> {
        if page_count == 0 {
            return None;
        }
        let label = match layout {
            Layout::Single => format!("Page {} of {}", self.left_index + 2, page_count),
            Layout::Book if self.is_cover() => format!("Cover (1 of {})", page_count),
            Layout::Book if self.is_terminal(page_count) => format!(
                "Pages {}-{} of {}",
                page_count - 1,
                page_count,
                page_count
            ),
            Layout::Book => format!(
                "Pages {}-{} of {}",
                self.left_index + 1,
                self.left_index + 2,
                page_count
            ),
        };
        Some(label)
    }
}

impl Default for Spread {
    fn default() -> Self {
        Spread::COVER
    }
}
