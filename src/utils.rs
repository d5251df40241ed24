use rand::Rng;
use std::{
    marker::PhantomData,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Structure holding possibly uninitialized data.
///
/// This differs from other similar types found on crates.io in that it doesn't
/// lock or synchronise access in any way, instead assuming it is safe to
/// initialize the value multiple times, and only keep one result.
#[derive(Debug)]
pub struct SingleInit<T> {
    cell: AtomicUsize,
    _type: PhantomData<T>,
}

impl<T> SingleInit<T> {
    /// Create a new uninitialized atomic cell.
    pub const fn uninit() -> Self {
        SingleInit {
            cell: AtomicUsize::new(0),
            _type: PhantomData,
        }
    }
}

impl<T> SingleInit<T>
where
    T: Sync,
    Self: 'static,
{
    /// Get stored value, or `None` if it hasn't been initialized yet.
    pub fn get(&self) -> Option<&'static T> {
        let ptr = self.cell.load(Ordering::Relaxed);

        if ptr != 0 {
            Some(unsafe { &*(ptr as *const T) })
        } else {
            None
        }
    }

    /// Get stored value, initializing it if necessary.
    pub fn get_or_init<F>(&self, init: F) -> &'static T
    where
        F: FnOnce() -> T,
    {
        self.get_or_try_init::<(), _>(|| Ok(init())).unwrap()
    }

    /// Same as [`get_or_init`] except that initialisation function can fail.
    ///
    /// If initialisation function fails, the value will be unchanged and
    /// another thread (or the same thread) can safely attempt to initialise it
    /// again.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<&'static T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let ptr = self.cell.load(Ordering::Relaxed);

        if ptr != 0 {
            return Ok(unsafe { &*(ptr as *const T) });
        }

        // Create a new value, place it on heap, obtain reference to it, and
        // prevent destructor from running.
        let value = Box::leak(Box::new(init()?)) as *mut T;

        // Try to update cell.
        let old = self.cell.compare_and_swap(ptr, value as usize, Ordering::Relaxed);

        if old == ptr {
            // Update succeeded, value is now the value of cell.
            Ok(unsafe { &*value })
        } else {
            // Update failed, cell was initialised by another thread. In this
            // case we drop value and return old.
            std::mem::drop(unsafe { Box::from_raw(value) });
            Ok(unsafe { &*(old as *const T) })
        }
    }
}

/// Characters appended to a slug when the plain form is already taken.
const SLUG_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_SUFFIX_LEN: usize = 6;

/// Derive a URL-safe slug from an article's title.
///
/// Lower-cases the title, maps every run of non-alphanumeric characters to
/// a single hyphen, and trims leading and trailing hyphens. Empty or fully
/// symbolic titles produce `"article"` rather than an empty slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("article");
    }

    slug
}

/// Extend a taken slug with a short random suffix.
pub fn slug_with_suffix(slug: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(slug.len() + SLUG_SUFFIX_LEN + 1);

    out.push_str(slug);
    out.push('-');

    for _ in 0..SLUG_SUFFIX_LEN {
        let inx = rng.gen_range(0, SLUG_SUFFIX_CHARS.len());
        out.push(SLUG_SUFFIX_CHARS[inx] as char);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("A Study of Word Diffs"), "a-study-of-word-diffs");
    }

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("Graphs, Trees & Lattices!"), "graphs-trees-lattices");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn slugify_never_empty() {
        assert_eq!(slugify(""), "article");
        assert_eq!(slugify("???"), "article");
    }

    #[test]
    fn suffix_preserves_base() {
        let slug = slug_with_suffix("a-title");
        assert!(slug.starts_with("a-title-"));
        assert_eq!(slug.len(), "a-title-".len() + SLUG_SUFFIX_LEN);
    }
}
