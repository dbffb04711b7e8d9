//! Identifier to table/column name conversion.
//!
//! Record types and fields are declared with identifier-style names (`OrangeJuice`,
//! `HTMLOrangeJuice`, `normalPILLINGStuffs`). Tables and columns use snake_case.
//!
//! - A run of capitals is one word (`HTML`); its last capital starts the next word when
//!   a lowercase letter follows (`HTMLOrange` -> `html_orange`).
//! - Input without any uppercase letter is returned verbatim, no case folding happens.
//! - `id` in any casing maps to `id`.

/// Convert an identifier into a snake_case table or column name.
///
/// # Example
/// ```
/// assert_eq!(orange::naming::mangle("HTMLOrangeJuice"), "html_orange_juice");
/// assert_eq!(orange::naming::mangle("orangeJuice"), "orange_juice");
/// ```
pub fn mangle(name: &str) -> String {
    if name.eq_ignore_ascii_case("id") {
        return "id".to_string();
    }
    if !name.chars().any(char::is_uppercase) {
        return name.to_string();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && starts_word(&chars, i) && !out.ends_with('_') {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Whether the uppercase letter at `i` opens a new segment.
fn starts_word(chars: &[char], i: usize) -> bool {
    if !chars[i].is_uppercase() {
        return false;
    }
    let prev_upper = chars[i - 1].is_uppercase();
    if !prev_upper {
        return true;
    }
    // Inside a capital run: only the capital right before a lowercase letter splits.
    chars.get(i + 1).is_some_and(|next| next.is_lowercase())
}
