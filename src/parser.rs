//! Pattern parsing for the Advanced Regular Expression (ARE) syntax.
//!
//! This module parses pattern strings into a tree structure for program
//! compilation. Supports:
//! - `.` matches any code unit
//! - `[...]` character classes with ranges, `[:name:]` named classes
//! - `[^...]` negated character classes
//! - `|` alternation
//! - `(...)` capturing and `(?:...)` non-capturing groups
//! - `?` `+` `*` `{m}` `{m,}` `{m,n}` greedy quantifiers
//! - `^` `$` anchors, `\A` `\Z` synonyms
//! - `\m` `\M` `\y` `\Y` word-boundary constraints (ARE spelling)
//! - `\d` `\s` `\w` class shorthands and their negations
//! - `\1`..`\9` backreferences
//!
//! The parser works on the pattern's UTF-16 code units, the same alphabet
//! the matcher runs on, so error offsets and literals line up with the
//! matched text's indexing.

use smallvec::SmallVec;

use crate::chars;
use crate::MAX_SUBEXPRESSIONS;

/// Largest value allowed in a `{m,n}` quantifier.
pub const QUANTIFIER_MAX: u32 = 255;

/// Marker for an unbounded quantifier upper limit (`*`, `+`, `{n,}`).
pub const QUANT_UNBOUNDED: u32 = u32::MAX;

/// A named POSIX character class, `[:alpha:]` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    Xdigit,
}

impl NamedClass {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "alnum" => NamedClass::Alnum,
            "alpha" => NamedClass::Alpha,
            "blank" => NamedClass::Blank,
            "cntrl" => NamedClass::Cntrl,
            "digit" => NamedClass::Digit,
            "graph" => NamedClass::Graph,
            "lower" => NamedClass::Lower,
            "print" => NamedClass::Print,
            "punct" => NamedClass::Punct,
            "space" => NamedClass::Space,
            "upper" => NamedClass::Upper,
            "word" => NamedClass::Word,
            "xdigit" => NamedClass::Xdigit,
            _ => return None,
        })
    }

    /// Whether a code unit belongs to the class.
    pub fn contains(self, u: u16) -> bool {
        match self {
            NamedClass::Alnum => chars::is_alnum(u),
            NamedClass::Alpha => chars::is_alpha(u),
            NamedClass::Blank => chars::is_blank(u),
            NamedClass::Cntrl => chars::is_cntrl(u),
            NamedClass::Digit => chars::is_digit(u),
            NamedClass::Graph => chars::is_graph(u),
            NamedClass::Lower => chars::is_lower(u),
            NamedClass::Print => chars::is_print(u),
            NamedClass::Punct => chars::is_punct(u),
            NamedClass::Space => chars::is_space(u),
            NamedClass::Upper => chars::is_upper(u),
            NamedClass::Word => chars::is_word(u),
            NamedClass::Xdigit => chars::is_xdigit(u),
        }
    }
}

/// One element of a bracket expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    /// Inclusive code-unit range `[lo, hi]`; single units are `lo == hi`.
    Range(u16, u16),
    /// Named class like `[:alpha:]` or a `\d`-style shorthand.
    Named(NamedClass),
}

impl ClassItem {
    #[inline]
    fn contains(self, u: u16) -> bool {
        match self {
            ClassItem::Range(lo, hi) => lo <= u && u <= hi,
            ClassItem::Named(nc) => nc.contains(u),
        }
    }
}

/// A (possibly negated) character class.
#[derive(Debug, Clone, PartialEq)]
pub struct CharClass {
    pub items: SmallVec<[ClassItem; 4]>,
    pub negated: bool,
}

impl CharClass {
    pub fn new(items: SmallVec<[ClassItem; 4]>, negated: bool) -> Self {
        CharClass { items, negated }
    }

    fn shorthand(nc: NamedClass, negated: bool) -> Self {
        let mut items = SmallVec::new();
        items.push(ClassItem::Named(nc));
        CharClass { items, negated }
    }

    /// Test a code unit against the class. Under `ignore_case`, a unit is in
    /// the class if any of its case images is; negation applies afterwards,
    /// so `[^a]` with ignore-case rejects both `a` and `A`.
    pub fn matches(&self, u: u16, ignore_case: bool) -> bool {
        let mut hit = self.items.iter().any(|item| item.contains(u));
        if ignore_case && !hit {
            let lower = chars::to_lower(u);
            let upper = chars::to_upper(u);
            hit = (lower != u && self.items.iter().any(|item| item.contains(lower)))
                || (upper != u && self.items.iter().any(|item| item.contains(upper)));
        }
        hit != self.negated
    }
}

/// The unquantified part of a piece.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    /// A single literal code unit.
    Literal(u16),
    /// `.`
    Dot,
    /// `[...]`, `\d`, etc.
    Class(CharClass),
    /// A parenthesized group. `capture` is the capture-slot index, `None`
    /// for `(?:...)` and for groups past the engine's capture limit.
    Group {
        capture: Option<usize>,
        tree: Tree,
    },
    /// `^` / `\A`
    BeginText,
    /// `$` / `\Z`
    EndText,
    /// `\m`
    BeginWord,
    /// `\M`
    EndWord,
    /// `\y`
    WordBoundary,
    /// `\Y`
    NotWordBoundary,
    /// `\1`..`\9`
    Backref(usize),
}

impl AtomKind {
    /// Constraints match positions, not code units, and take no quantifier.
    fn is_constraint(&self) -> bool {
        matches!(
            self,
            AtomKind::BeginText
                | AtomKind::EndText
                | AtomKind::BeginWord
                | AtomKind::EndWord
                | AtomKind::WordBoundary
                | AtomKind::NotWordBoundary
        )
    }
}

/// A quantified atom in the pattern tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantifiedAtom {
    pub kind: AtomKind,
    /// Minimum number of times to match.
    pub quant_min: u32,
    /// Maximum number of times to match; `QUANT_UNBOUNDED` for no limit.
    pub quant_max: u32,
}

impl QuantifiedAtom {
    fn new(kind: AtomKind) -> Self {
        QuantifiedAtom {
            kind,
            quant_min: 1,
            quant_max: 1,
        }
    }

    /// Returns true if this atom matches exactly once (no quantifier).
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.quant_min == 1 && self.quant_max == 1
    }

    /// Returns true if this atom is optional (?).
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.quant_min == 0 && self.quant_max == 1
    }

    /// Returns true if this atom uses + (one or more).
    #[inline]
    pub fn is_plus(&self) -> bool {
        self.quant_min == 1 && self.quant_max == QUANT_UNBOUNDED
    }

    /// Returns true if this atom uses * (zero or more).
    #[inline]
    pub fn is_star(&self) -> bool {
        self.quant_min == 0 && self.quant_max == QUANT_UNBOUNDED
    }
}

/// A branch in the pattern (sequence of quantified atoms).
pub type Branch = Vec<QuantifiedAtom>;

/// The root of a parsed pattern (alternatives separated by |).
pub type Tree = Vec<Branch>;

/// Parse result: the tree plus the number of capturing groups that appear
/// in the pattern (which may exceed the engine's retrievable limit).
#[derive(Debug, Clone)]
pub struct ParsedRegexp {
    pub tree: Tree,
    pub group_count: usize,
}

/// Error type for pattern parsing.
#[derive(Debug, Clone)]
pub struct RegexpError {
    pub message: String,
    /// Code-unit offset into the pattern where the problem was noticed.
    pub offset: usize,
}

impl std::fmt::Display for RegexpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for RegexpError {}

// Internal sentinel message meaning "this branch is done, not an error".
const STUCK: &str = "stuck";

/// Parser state.
struct Parse {
    units: Vec<u16>,
    index: usize,
    last_index: usize,
    nesting: Vec<Tree>,
    tree: Tree,
    group_count: usize,
}

impl Parse {
    fn new(pattern: &str) -> Self {
        Parse {
            units: pattern.encode_utf16().collect(),
            index: 0,
            last_index: 0,
            nesting: Vec::new(),
            tree: Vec::new(),
            group_count: 0,
        }
    }

    fn nest(&mut self) {
        self.nesting.push(std::mem::take(&mut self.tree));
    }

    fn unnest(&mut self) -> Tree {
        let subtree = std::mem::take(&mut self.tree);
        self.tree = self.nesting.pop().unwrap_or_default();
        subtree
    }

    fn is_nested(&self) -> bool {
        !self.nesting.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.index >= self.units.len()
    }

    fn next_unit(&mut self) -> Result<u16, RegexpError> {
        match self.units.get(self.index) {
            Some(&u) => {
                self.last_index = self.index;
                self.index += 1;
                Ok(u)
            }
            None => Err(self.error_at("end of pattern", self.index)),
        }
    }

    fn require(&mut self, wanted: u16) -> Result<(), RegexpError> {
        let got = self.next_unit()?;
        if got != wanted {
            return Err(self.error(format!(
                "expected '{}', got '{}'",
                unit_display(wanted),
                unit_display(got)
            )));
        }
        Ok(())
    }

    fn bypass_optional(&mut self, wanted: u16) -> bool {
        if self.units.get(self.index) == Some(&wanted) {
            self.last_index = self.index;
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn backup1(&mut self) {
        self.index -= 1;
    }

    fn error(&self, message: impl Into<String>) -> RegexpError {
        self.error_at(message, self.last_index)
    }

    fn error_at(&self, message: impl Into<String>, offset: usize) -> RegexpError {
        RegexpError {
            message: message.into(),
            offset,
        }
    }

    fn stuck(&self) -> RegexpError {
        self.error(STUCK)
    }
}

fn unit_display(u: u16) -> String {
    match char::from_u32(u as u32) {
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("\\u{:04X}", u),
    }
}

const U_BAR: u16 = b'|' as u16;
const U_LPAREN: u16 = b'(' as u16;
const U_RPAREN: u16 = b')' as u16;
const U_LBRACKET: u16 = b'[' as u16;
const U_RBRACKET: u16 = b']' as u16;
const U_LBRACE: u16 = b'{' as u16;
const U_RBRACE: u16 = b'}' as u16;
const U_BACKSLASH: u16 = b'\\' as u16;
const U_CARET: u16 = b'^' as u16;
const U_DOLLAR: u16 = b'$' as u16;
const U_DOT: u16 = b'.' as u16;
const U_STAR: u16 = b'*' as u16;
const U_PLUS: u16 = b'+' as u16;
const U_QM: u16 = b'?' as u16;
const U_DASH: u16 = b'-' as u16;
const U_COLON: u16 = b':' as u16;
const U_COMMA: u16 = b',' as u16;

/// Parse a pattern string into a tree structure.
pub fn parse(pattern: &str) -> Result<ParsedRegexp, RegexpError> {
    let mut parse = Parse::new(pattern);
    read_branches(&mut parse)?;

    if parse.is_nested() {
        return Err(parse.error_at("unclosed '('", parse.index));
    }
    if !parse.is_empty() {
        // Only an unbalanced ')' can stop the reader early at top level.
        return Err(parse.error_at("unbalanced ')'", parse.index));
    }

    Ok(ParsedRegexp {
        tree: parse.tree,
        group_count: parse.group_count,
    })
}

/// Read branches separated by `|`. An empty pattern still contributes one
/// (empty) branch, which matches the empty string.
fn read_branches(parse: &mut Parse) -> Result<(), RegexpError> {
    loop {
        let branch = read_branch(parse)?;
        parse.tree.push(branch);

        if parse.is_empty() {
            return Ok(());
        }

        let u = parse.next_unit()?;
        if u == U_BAR {
            continue;
        } else if u == U_RPAREN {
            parse.backup1();
            return Ok(());
        }
        parse.backup1();
        return Ok(());
    }
}

/// Read a single branch (sequence of pieces). End of pattern only ends a
/// branch between pieces; running out of input inside a piece (an open
/// `(?` or `[:name:` tail) stays an error.
fn read_branch(parse: &mut Parse) -> Result<Branch, RegexpError> {
    let mut branch = Vec::new();

    loop {
        if parse.is_empty() {
            break;
        }
        match read_piece(parse) {
            Ok(piece) => branch.push(piece),
            Err(e) if e.message == STUCK => break,
            Err(e) => return Err(e),
        }
    }

    Ok(branch)
}

/// Read a piece (atom with optional quantifier).
fn read_piece(parse: &mut Parse) -> Result<QuantifiedAtom, RegexpError> {
    let mut qa = read_atom(parse)?;
    read_quantifier(parse, &mut qa)?;
    Ok(qa)
}

/// Read an atom.
fn read_atom(parse: &mut Parse) -> Result<QuantifiedAtom, RegexpError> {
    let u = parse.next_unit()?;

    match u {
        U_DOT => Ok(QuantifiedAtom::new(AtomKind::Dot)),
        U_CARET => Ok(QuantifiedAtom::new(AtomKind::BeginText)),
        U_DOLLAR => Ok(QuantifiedAtom::new(AtomKind::EndText)),
        U_LPAREN => read_group(parse),
        U_RPAREN => {
            if parse.is_nested() {
                parse.backup1();
                Err(parse.stuck())
            } else {
                Err(parse.error("unbalanced ')'"))
            }
        }
        U_LBRACKET => {
            let class = read_char_class(parse)?;
            Ok(QuantifiedAtom::new(AtomKind::Class(class)))
        }
        U_RBRACKET => Err(parse.error("unbalanced ']'")),
        U_BACKSLASH => read_escape(parse),
        U_STAR | U_PLUS | U_QM | U_LBRACE => Err(parse.error(format!(
            "quantifier '{}' without a preceding atom",
            unit_display(u)
        ))),
        U_BAR => {
            parse.backup1();
            Err(parse.stuck())
        }
        _ => Ok(QuantifiedAtom::new(AtomKind::Literal(u))),
    }
}

/// Read a group body after `(`, handling `(?:` and capture numbering.
/// Capture groups past the engine limit still parse; they just get no slot.
fn read_group(parse: &mut Parse) -> Result<QuantifiedAtom, RegexpError> {
    let non_capturing = if parse.bypass_optional(U_QM) {
        parse.require(U_COLON)?;
        true
    } else {
        false
    };

    let capture = if non_capturing {
        None
    } else {
        parse.group_count += 1;
        if parse.group_count < MAX_SUBEXPRESSIONS {
            Some(parse.group_count)
        } else {
            None
        }
    };

    parse.nest();
    read_branches(parse)?;
    parse.require(U_RPAREN)?;
    let tree = parse.unnest();
    Ok(QuantifiedAtom::new(AtomKind::Group { capture, tree }))
}

/// Read an escape sequence outside a bracket expression.
fn read_escape(parse: &mut Parse) -> Result<QuantifiedAtom, RegexpError> {
    let u = parse
        .next_unit()
        .map_err(|_| parse.error("'\\' at end of pattern"))?;

    let kind = match char::from_u32(u as u32) {
        Some('A') => AtomKind::BeginText,
        Some('Z') => AtomKind::EndText,
        Some('m') => AtomKind::BeginWord,
        Some('M') => AtomKind::EndWord,
        Some('y') => AtomKind::WordBoundary,
        Some('Y') => AtomKind::NotWordBoundary,
        Some(c @ '1'..='9') => {
            let group = c.to_digit(10).unwrap() as usize;
            if group > parse.group_count {
                return Err(parse.error(format!("backreference \\{} to undefined group", group)));
            }
            AtomKind::Backref(group)
        }
        _ => match escape_class(u) {
            Some(class) => AtomKind::Class(class),
            None => AtomKind::Literal(read_escape_literal(parse, u)?),
        },
    };
    Ok(QuantifiedAtom::new(kind))
}

/// Shorthand classes usable both standalone and inside brackets.
fn escape_class(u: u16) -> Option<CharClass> {
    match u {
        u if u == b'd' as u16 => Some(CharClass::shorthand(NamedClass::Digit, false)),
        u if u == b'D' as u16 => Some(CharClass::shorthand(NamedClass::Digit, true)),
        u if u == b's' as u16 => Some(CharClass::shorthand(NamedClass::Space, false)),
        u if u == b'S' as u16 => Some(CharClass::shorthand(NamedClass::Space, true)),
        u if u == b'w' as u16 => Some(CharClass::shorthand(NamedClass::Word, false)),
        u if u == b'W' as u16 => Some(CharClass::shorthand(NamedClass::Word, true)),
        _ => None,
    }
}

/// Single-unit escapes: control characters, `\uXXXX`, and identity escapes
/// for punctuation. Alphanumeric escapes with no assigned meaning are
/// errors, which keeps them available as future syntax.
fn read_escape_literal(parse: &mut Parse, u: u16) -> Result<u16, RegexpError> {
    match u {
        u if u == b'n' as u16 => Ok(b'\n' as u16),
        u if u == b'r' as u16 => Ok(b'\r' as u16),
        u if u == b't' as u16 => Ok(b'\t' as u16),
        u if u == b'f' as u16 => Ok(0x0C),
        u if u == b'v' as u16 => Ok(0x0B),
        // ARE: \b is backspace (word boundaries are \m \M \y \Y), and \B is
        // a synonym for a literal backslash.
        u if u == b'b' as u16 => Ok(0x08),
        u if u == b'B' as u16 => Ok(U_BACKSLASH),
        u if u == b'u' as u16 => read_hex4(parse),
        _ => {
            if chars::is_alnum(u) {
                Err(parse.error(format!("invalid escape '\\{}'", unit_display(u))))
            } else {
                Ok(u)
            }
        }
    }
}

/// Read the four hex digits of a `\uXXXX` escape.
fn read_hex4(parse: &mut Parse) -> Result<u16, RegexpError> {
    let mut value: u16 = 0;
    for _ in 0..4 {
        let u = parse
            .next_unit()
            .map_err(|_| parse.error("incomplete \\u escape"))?;
        let digit = match char::from_u32(u as u32).and_then(|c| c.to_digit(16)) {
            Some(d) => d as u16,
            None => return Err(parse.error("invalid hex digit in \\u escape")),
        };
        value = (value << 4) | digit;
    }
    Ok(value)
}

/// Read a bracket expression after the opening `[`.
fn read_char_class(parse: &mut Parse) -> Result<CharClass, RegexpError> {
    if parse.is_empty() {
        return Err(parse.error_at("unclosed character class", parse.index));
    }

    let negated = parse.bypass_optional(U_CARET);
    let mut items: SmallVec<[ClassItem; 4]> = SmallVec::new();

    // A ']' directly after '[' or '[^' is a literal.
    if parse.bypass_optional(U_RBRACKET) {
        items.push(ClassItem::Range(U_RBRACKET, U_RBRACKET));
    }

    loop {
        if parse.is_empty() {
            return Err(parse.error_at("unclosed character class", parse.index));
        }
        if parse.bypass_optional(U_RBRACKET) {
            break;
        }
        read_class_item(parse, &mut items)?;
    }

    Ok(CharClass::new(items, negated))
}

/// Read one element of a bracket expression: a named class, a shorthand,
/// a range, or a single unit.
fn read_class_item(
    parse: &mut Parse,
    items: &mut SmallVec<[ClassItem; 4]>,
) -> Result<(), RegexpError> {
    let u = parse.next_unit()?;

    // [:name:]
    if u == U_LBRACKET && parse.bypass_optional(U_COLON) {
        return read_named_class(parse, items);
    }

    let lo = if u == U_BACKSLASH {
        let esc = parse
            .next_unit()
            .map_err(|_| parse.error("unclosed character class"))?;
        if let Some(class) = escape_class(esc) {
            // Shorthands cannot be a range endpoint, and the negated forms
            // have no single-item representation inside a class; ARE rejects
            // those too.
            if class.negated {
                return Err(parse.error(format!(
                    "negated shorthand '\\{}' not allowed inside a class",
                    unit_display(esc)
                )));
            }
            if let Some(&ClassItem::Named(nc)) = class.items.first() {
                items.push(ClassItem::Named(nc));
            }
            return Ok(());
        }
        read_escape_literal(parse, esc)?
    } else {
        u
    };

    // Range?
    if parse.bypass_optional(U_DASH) {
        if parse.units.get(parse.index) == Some(&U_RBRACKET) || parse.is_empty() {
            // Trailing '-' is a literal.
            items.push(ClassItem::Range(lo, lo));
            items.push(ClassItem::Range(U_DASH, U_DASH));
            return Ok(());
        }
        let hi_unit = parse.next_unit()?;
        let hi = if hi_unit == U_BACKSLASH {
            let esc = parse
                .next_unit()
                .map_err(|_| parse.error("unclosed character class"))?;
            if escape_class(esc).is_some() {
                return Err(parse.error("class shorthand cannot end a range"));
            }
            read_escape_literal(parse, esc)?
        } else {
            hi_unit
        };
        if lo > hi {
            return Err(parse.error(format!(
                "invalid range {}-{}",
                unit_display(lo),
                unit_display(hi)
            )));
        }
        items.push(ClassItem::Range(lo, hi));
    } else {
        items.push(ClassItem::Range(lo, lo));
    }
    Ok(())
}

/// Read the remainder of a `[:name:]` element (the `[:` is consumed).
fn read_named_class(
    parse: &mut Parse,
    items: &mut SmallVec<[ClassItem; 4]>,
) -> Result<(), RegexpError> {
    let mut name = String::new();
    loop {
        let u = parse
            .next_unit()
            .map_err(|_| parse.error("unclosed [:name:] class"))?;
        if u == U_COLON {
            parse.require(U_RBRACKET)?;
            break;
        }
        match char::from_u32(u as u32) {
            Some(c) if c.is_ascii_lowercase() => name.push(c),
            _ => return Err(parse.error("invalid character in [:name:] class")),
        }
    }

    match NamedClass::from_name(&name) {
        Some(nc) => {
            items.push(ClassItem::Named(nc));
            Ok(())
        }
        None => Err(parse.error(format!("unknown class [:{}:]", name))),
    }
}

/// Read a quantifier (?, *, +, {m,n}) following an atom.
fn read_quantifier(parse: &mut Parse, qa: &mut QuantifiedAtom) -> Result<(), RegexpError> {
    let u = match parse.next_unit() {
        Ok(u) => u,
        Err(_) => return Ok(()),
    };

    let quantified = match u {
        U_STAR => {
            qa.quant_min = 0;
            qa.quant_max = QUANT_UNBOUNDED;
            true
        }
        U_PLUS => {
            qa.quant_min = 1;
            qa.quant_max = QUANT_UNBOUNDED;
            true
        }
        U_QM => {
            qa.quant_min = 0;
            qa.quant_max = 1;
            true
        }
        U_LBRACE => {
            read_range_quantifier(parse, qa)?;
            true
        }
        _ => {
            parse.backup1();
            false
        }
    };

    if quantified && qa.kind.is_constraint() {
        return Err(parse.error("quantifier applied to a constraint"));
    }
    Ok(())
}

/// Read a `{m}`, `{m,}`, or `{m,n}` quantifier body.
fn read_range_quantifier(parse: &mut Parse, qa: &mut QuantifiedAtom) -> Result<(), RegexpError> {
    let lo = read_quantifier_number(parse)?;
    qa.quant_min = lo;
    qa.quant_max = lo;

    let u = parse
        .next_unit()
        .map_err(|_| parse.error("unterminated quantifier"))?;
    match u {
        U_RBRACE => Ok(()),
        U_COMMA => {
            if parse.bypass_optional(U_RBRACE) {
                qa.quant_max = QUANT_UNBOUNDED;
                return Ok(());
            }
            let hi = read_quantifier_number(parse)?;
            if hi < lo {
                return Err(parse.error("quantifier upper bound is below lower bound"));
            }
            qa.quant_max = hi;
            parse.require(U_RBRACE)
        }
        _ => Err(parse.error(format!(
            "unexpected '{}' in quantifier",
            unit_display(u)
        ))),
    }
}

/// Read one decimal number inside `{...}`, enforcing the quantifier ceiling.
fn read_quantifier_number(parse: &mut Parse) -> Result<u32, RegexpError> {
    let mut digits = String::new();
    loop {
        let u = parse
            .next_unit()
            .map_err(|_| parse.error("unterminated quantifier"))?;
        match char::from_u32(u as u32) {
            Some(c) if c.is_ascii_digit() => digits.push(c),
            _ => {
                parse.backup1();
                break;
            }
        }
    }
    if digits.is_empty() {
        return Err(parse.error("expected a number in quantifier"));
    }
    let n: u32 = digits
        .parse()
        .map_err(|_| parse.error("invalid number in quantifier"))?;
    if n > QUANTIFIER_MAX {
        return Err(parse.error(format!("quantifier value exceeds {}", QUANTIFIER_MAX)));
    }
    Ok(n)
}
