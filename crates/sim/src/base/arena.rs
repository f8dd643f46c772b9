use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// log2 of the slot count of the first page.
const FIRST_PAGE_BITS: u32 = 10;
/// Slot count of the first page. Page `p` holds `FIRST_PAGE_LEN << p` slots.
const FIRST_PAGE_LEN: usize = 1 << FIRST_PAGE_BITS;
/// Enough doubling pages to address every `usize` index.
const PAGE_COUNT: usize = (usize::BITS - FIRST_PAGE_BITS) as usize;

type Page<T> = Box<[OnceLock<T>]>;

/// A paged, append-only arena that can be shared between threads.
///
/// Storage is a fixed table of pages whose sizes double (1024, 2048, ...),
/// so a slot never moves once written and the arena never reallocates
/// existing data. `push` reserves an index with a single atomic increment
/// and publishes the value through the slot's `OnceLock`; `get` is
/// wait-free and takes no lock.
///
/// Indices are dense, start at zero, and are never reused.
pub struct PagedArena<T> {
    pages: Box<[OnceLock<Page<T>>]>,
    reserved: AtomicUsize,
}

impl<T> PagedArena<T> {
    pub fn new() -> Self {
        Self {
            pages: (0..PAGE_COUNT).map(|_| OnceLock::new()).collect(),
            reserved: AtomicUsize::new(0),
        }
    }

    /// Map a flat index to `(page, offset)`.
    #[inline]
    fn locate(index: usize) -> (usize, usize) {
        let shifted = index + FIRST_PAGE_LEN;
        let page = (usize::BITS - 1 - shifted.leading_zeros() - FIRST_PAGE_BITS) as usize;
        (page, shifted - (FIRST_PAGE_LEN << page))
    }

    /// Append a value and return its index.
    ///
    /// Safe to call from many threads at once. The returned index is
    /// readable through [`get`](Self::get) by any thread that learns of it.
    pub fn push(&self, value: T) -> usize {
        let index = self.reserved.fetch_add(1, Ordering::Relaxed);
        let (page, offset) = Self::locate(index);
        let slots = self.pages[page]
            .get_or_init(|| (0..FIRST_PAGE_LEN << page).map(|_| OnceLock::new()).collect());
        let stored = slots[offset].set(value).is_ok();
        debug_assert!(stored, "arena slot {index} written twice");
        index
    }

    /// Access the value at `index`.
    ///
    /// Returns `None` for indices that were never handed out by `push`
    /// (or, transiently, for an index reserved by another thread that has
    /// not finished publishing it).
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        let (page, offset) = Self::locate(index);
        self.pages.get(page)?.get()?.get(offset)?.get()
    }

    /// Number of indices handed out so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.reserved.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every published value in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).map(|v| (i, v)))
    }
}

impl<T> Default for PagedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PagedArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pages = self.pages.iter().filter(|p| p.get().is_some()).count();
        f.debug_struct("PagedArena")
            .field("len", &self.len())
            .field("pages", &pages)
            .finish()
    }
}
