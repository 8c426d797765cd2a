//! Grammar symbols are distinguished by their IDs. Names live in the grammar.

use std::num::NonZeroU32;

/// The first usable symbol ID.
const FIRST_ID: u32 = 0;
/// Reserved. Never handed out.
const NULL_ID: u32 = !0;

/// A grammar symbol. Cheap to copy, only meaningful for the grammar that
/// created it.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
pub struct Symbol(NonZeroU32);

impl Default for Symbol {
    fn default() -> Self {
        FIRST_ID.into()
    }
}

impl From<u32> for Symbol {
    #[inline]
    fn from(id: u32) -> Self {
        debug_assert_ne!(
            id, NULL_ID,
            "invalid coversion from a null id to non-null Symbol"
        );
        match NonZeroU32::new(id.wrapping_add(1)) {
            Some(n) => Symbol(n),
            None => Symbol(NonZeroU32::MIN),
        }
    }
}

impl From<usize> for Symbol {
    #[inline]
    fn from(id: usize) -> Self {
        Symbol::from(id as u32)
    }
}

impl From<Symbol> for u32 {
    #[inline]
    fn from(sym: Symbol) -> u32 {
        sym.0.get().wrapping_sub(1)
    }
}

impl Symbol {
    /// Cast the symbol's ID to `usize`.
    #[inline]
    pub fn usize(self) -> usize {
        u32::from(self) as usize
    }
}

/// Joins name parts with hyphens and wraps the result in brackets.
///
/// Brackets already present on a part are stripped, so names of existing
/// symbols can be composed into new ones:
///
/// ```
/// use cfg_compile::symbol::hyphenate;
///
/// assert_eq!(hyphenate(&["be", "pl"]), "[be-pl]");
/// assert_eq!(hyphenate(&["[be-pl]", "negation"]), "[be-pl-negation]");
/// ```
pub fn hyphenate<S: AsRef<str>>(parts: &[S]) -> String {
    let inner = parts
        .iter()
        .map(|part| strip_brackets(part.as_ref()))
        .collect::<Vec<_>>()
        .join("-");
    format!("[{}]", inner)
}

fn strip_brackets(name: &str) -> &str {
    name.strip_prefix('[')
        .and_then(|name| name.strip_suffix(']'))
        .unwrap_or(name)
}
