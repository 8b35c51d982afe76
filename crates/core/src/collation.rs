//! Locale-aware string ordering for display lists.
//!
//! Category names are sorted the way a user expects to read them: letters
//! compare with accents and case folded away first ("Électronique" sits with
//! the other e-words, "mobile" next to "Mobile"). Ties on the base letters
//! are broken by accents, then by case with lowercase ahead of uppercase.

use core::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compare two display strings: base letters, then accents, then case.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = base_letters(a).cmp(base_letters(b));
    if primary != Ordering::Equal {
        return primary;
    }

    let secondary = accents(a).cmp(&accents(b));
    if secondary != Ordering::Equal {
        return secondary;
    }

    let tertiary = a
        .chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase));
    tertiary.then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Combining marks attached to each base character, in order.
fn accents(s: &str) -> Vec<Vec<char>> {
    let mut marks: Vec<Vec<char>> = Vec::new();
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(last) = marks.last_mut() {
                last.push(c);
            }
        } else {
            marks.push(Vec::new());
        }
    }
    marks
}
