//! Unicode general-category sets for `UnicodeCategory` patterns.
//!
//! Category data comes from `regex-syntax`: the category name is run
//! through its parser as `\p{..}` and the resulting class ranges are
//! clamped to the BMP, which is the widest universe a compilation
//! can select.

use regex_syntax::hir::{Class, HirKind};

use crate::charset::{CharSet, Universe};

/// The code points of a Unicode general category, clamped to the
/// BMP. Returns `None` for anything that is not a known category
/// name (`Lu`, `Nd`, ..., or a one-letter group like `L`).
#[must_use]
pub fn category_set(code: &str) -> Option<CharSet> {
    // only general-category shaped names; scripts and blocks are not
    // part of the surface language
    let mut chars = code.chars();
    let first_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    let rest_lower = chars.as_str().len() <= 1 && chars.all(|c| c.is_ascii_lowercase());
    if !first_upper || !rest_lower {
        return None;
    }

    let hir = regex_syntax::Parser::new()
        .parse(&format!(r"\p{{{code}}}"))
        .ok()?;
    let HirKind::Class(Class::Unicode(class)) = hir.kind() else {
        return None;
    };
    let bmp_max = Universe::Unicode.max_char();
    Some(CharSet::of_ranges(class.iter().filter_map(|range| {
        let lo = range.start() as u32;
        let hi = range.end() as u32;
        if lo > bmp_max {
            None
        } else {
            Some((lo, hi.min(bmp_max)))
        }
    })))
}
