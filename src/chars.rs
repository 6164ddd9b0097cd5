//! Classification and case mapping for single 16-bit code units.
//!
//! The matcher works directly on UTF-16 code units, so everything here is
//! defined for every possible `u16` value. Code units that do not decode to
//! a scalar value (unpaired surrogates) classify as nothing and case-map to
//! themselves.

/// Decode a lone code unit to a scalar value, if it is one.
#[inline]
fn scalar(u: u16) -> Option<char> {
    char::from_u32(u as u32)
}

/// Letter or digit.
#[inline]
pub fn is_alnum(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_alphanumeric())
}

/// Letter.
#[inline]
pub fn is_alpha(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_alphabetic())
}

/// Numeric character (Unicode, not just ASCII `0-9`).
#[inline]
pub fn is_digit(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_numeric())
}

/// Whitespace.
#[inline]
pub fn is_space(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_whitespace())
}

/// Uppercase letter.
#[inline]
pub fn is_upper(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_uppercase())
}

/// Lowercase letter.
#[inline]
pub fn is_lower(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_lowercase())
}

/// Word constituent: letter, digit, or underscore.
#[inline]
pub fn is_word(u: u16) -> bool {
    u == b'_' as u16 || is_alnum(u)
}

/// Hexadecimal digit.
#[inline]
pub fn is_xdigit(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_ascii_hexdigit())
}

/// Control character.
#[inline]
pub fn is_cntrl(u: u16) -> bool {
    scalar(u).is_some_and(|c| c.is_control())
}

/// Punctuation or symbol, excluding letters, digits, and whitespace.
#[inline]
pub fn is_punct(u: u16) -> bool {
    is_graph(u) && !is_alnum(u)
}

/// Visible character (anything printable except space).
#[inline]
pub fn is_graph(u: u16) -> bool {
    scalar(u).is_some_and(|c| !c.is_whitespace() && !c.is_control())
}

/// Printable character (visible characters plus the plain space).
#[inline]
pub fn is_print(u: u16) -> bool {
    u == b' ' as u16 || is_graph(u)
}

/// Space or horizontal tab.
#[inline]
pub fn is_blank(u: u16) -> bool {
    u == b' ' as u16 || u == b'\t' as u16
}

/// Map a single code unit through a char-level case conversion, keeping the
/// input unchanged when the conversion does not produce exactly one code
/// unit inside the BMP (multi-char expansions like `ß` → `SS` are not
/// representable as a single unit).
#[inline]
fn map_single<I: Iterator<Item = char>>(u: u16, mut mapped: I) -> u16 {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) if (c as u32) <= 0xFFFF => c as u16,
        _ => u,
    }
}

/// Lowercase form of a code unit, or the unit itself.
#[inline]
pub fn to_lower(u: u16) -> u16 {
    match scalar(u) {
        Some(c) => map_single(u, c.to_lowercase()),
        None => u,
    }
}

/// Uppercase form of a code unit, or the unit itself.
#[inline]
pub fn to_upper(u: u16) -> u16 {
    match scalar(u) {
        Some(c) => map_single(u, c.to_uppercase()),
        None => u,
    }
}

/// Titlecase form of a code unit, or the unit itself.
///
/// Titlecase differs from uppercase only for the Latin digraph compatibility
/// characters, where the titlecase form is the Xx variant rather than XX.
#[inline]
pub fn to_title(u: u16) -> u16 {
    match u {
        // Ǆǅǆ Ǉǈǉ Ǌǋǌ: each triple titlecases to its middle member.
        0x01C4..=0x01CC => 0x01C5 + (u - 0x01C4) / 3 * 3,
        // Ǳǲǳ
        0x01F1..=0x01F3 => 0x01F2,
        _ => to_upper(u),
    }
}

/// Case-blind equality between two code units.
///
/// Comparing both the lowercase and uppercase images covers letters whose
/// two lowercase forms share one uppercase form (e.g. `σ` and `ς`).
#[inline]
pub fn eq_ignore_case(a: u16, b: u16) -> bool {
    a == b || to_lower(a) == to_lower(b) || to_upper(a) == to_upper(b)
}
