//! arex: an Advanced Regular Expression engine for 16-bit code-unit text
//!
//! A pattern string in POSIX-ERE-plus-extensions ("Advanced Regular
//! Expression") syntax is compiled into an executable program which can
//! then be matched against candidate strings, with the extents of up to
//! [`MAX_SUBEXPRESSIONS`] capturing subexpressions retrievable from a
//! successful match.
//!
//! Matching runs over UTF-16 code units, and the matching primitive is
//! anchored: a program either matches starting at the first position of
//! the search range or it does not. The [`Regexp`] entry points ask for a
//! match of the whole range; callers that want free search try successive
//! start offsets against the anchored primitive themselves.
//!
//! A [`Regexp`] keeps a one-entry cache of its last match so repeated
//! subexpression queries against the same candidate string do not re-run
//! the program. The cache makes `Regexp` deliberately single-threaded
//! (`!Sync`); clone it per thread or guard it externally for shared use.

pub mod chars;
mod compile;
mod exec;
mod parser;

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};

use compile::Program;
use exec::MatchMode;

pub use exec::SubexpSpans;
pub use parser::RegexpError;

/// The maximum number of subexpressions a match can report, counting the
/// whole match as subexpression 0. Patterns with more capturing groups
/// are accepted; the extra groups simply have no retrievable extent.
pub const MAX_SUBEXPRESSIONS: usize = 20;

/// Candidates longer than this (in bytes) are matched but never cached:
/// for large strings the cost of retaining a copy for cache validation
/// outweighs the saved re-match.
const CACHE_CEILING: usize = 1 << 14;

/// A code-unit range: offset and length within a candidate.
///
/// A subexpression that did not participate in a match is reported as the
/// absence of a span (`None`), which is distinct from a present span of
/// length zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Span { start, len }
    }

    /// One past the last code unit covered.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    ptr: usize,
    len: usize,
    /// `None` for whole-string entry points, `Some` for explicit ranges.
    range: Option<Span>,
}

struct MatchCache {
    key: Option<CacheKey>,
    /// Owned copy of the last candidate, compared on a key hit to guard
    /// against a freed string's address being reused.
    candidate: String,
    matched: bool,
    spans: SubexpSpans,
}

impl MatchCache {
    fn empty() -> Self {
        MatchCache {
            key: None,
            candidate: String::new(),
            matched: false,
            spans: [None; MAX_SUBEXPRESSIONS],
        }
    }
}

/// A compiled regular expression.
///
/// A `Regexp` is immutable with respect to its matching semantics: the
/// pattern text and case flag are fixed at construction, and the compiled
/// program lives and dies with the object. Only the internal match cache
/// mutates, invisibly to callers' observable results.
///
/// Two `Regexp`s compare equal when their pattern text and case flag are
/// equal; that pair is also the only state worth persisting, since the
/// program is always rebuilt from it.
///
/// ```
/// use arex::Regexp;
///
/// let re = Regexp::new("([0-9]+)-([0-9]+)").unwrap();
/// assert!(re.matches("42-7"));
/// assert_eq!(re.subexpression_string(1, "42-7").as_deref(), Some("42"));
/// assert_eq!(re.subexpression_string(2, "42-7").as_deref(), Some("7"));
/// assert!(!re.matches("42-"));
/// ```
pub struct Regexp {
    pattern: String,
    ignore_case: bool,
    program: Program,
    cache: RefCell<MatchCache>,
}

impl Regexp {
    /// Compile a case-sensitive expression from a pattern string.
    ///
    /// Fails if and only if the pattern is not syntactically valid.
    pub fn new(pattern: &str) -> Result<Self, RegexpError> {
        Self::with_ignore_case(pattern, false)
    }

    /// Compile an expression, optionally ignoring case differences.
    ///
    /// Case-insensitivity is baked into the compiled program: every
    /// literal, class, and backreference comparison accepts any case
    /// image of the target. The candidate text is never folded, so
    /// reported spans index the original text.
    pub fn with_ignore_case(pattern: &str, ignore_case: bool) -> Result<Self, RegexpError> {
        let parsed = parser::parse(pattern)?;
        let program = compile::compile(&parsed, ignore_case);
        Ok(Regexp {
            pattern: pattern.to_owned(),
            ignore_case,
            program,
            cache: RefCell::new(MatchCache::empty()),
        })
    }

    /// Syntax-check a pattern string by compiling it and discarding the
    /// result. Malformed patterns are an expected input, not an error
    /// condition, hence the plain boolean.
    pub fn is_valid(pattern: &str) -> bool {
        Self::new(pattern).is_ok()
    }

    /// The pattern string this expression was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this expression ignores case differences.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Whether the whole candidate string matches the expression.
    ///
    /// The empty pattern matches only the empty candidate.
    pub fn matches(&self, candidate: &str) -> bool {
        self.run_cached(candidate, None).0
    }

    /// Whether `range` (in code units) of the candidate matches the
    /// expression in its entirety.
    pub fn matches_in(&self, candidate: &str, range: Span) -> bool {
        self.run_cached(candidate, Some(range)).0
    }

    /// The extent matched by subexpression `index` when the candidate
    /// matches, or `None` when the candidate does not match or the
    /// subexpression did not participate in the match.
    ///
    /// Subexpression 0 is the whole match. `index` must be below
    /// [`MAX_SUBEXPRESSIONS`]; violating that is a caller bug and panics.
    pub fn subexpression_range(&self, index: usize, candidate: &str) -> Option<Span> {
        assert!(
            index < MAX_SUBEXPRESSIONS,
            "subexpression index {} out of range",
            index
        );
        self.run_cached(candidate, None).1[index]
    }

    /// Like [`Regexp::subexpression_range`], restricted to `range` of the
    /// candidate.
    pub fn subexpression_range_in(
        &self,
        index: usize,
        candidate: &str,
        range: Span,
    ) -> Option<Span> {
        assert!(
            index < MAX_SUBEXPRESSIONS,
            "subexpression index {} out of range",
            index
        );
        self.run_cached(candidate, Some(range)).1[index]
    }

    /// The substring matched by subexpression `index`.
    ///
    /// Returns `None` when the candidate does not match or the
    /// subexpression did not participate; returns an empty string when
    /// the subexpression matched a zero-length extent. The two cases are
    /// observably different and never conflated.
    pub fn subexpression_string(&self, index: usize, candidate: &str) -> Option<String> {
        let span = self.subexpression_range(index, candidate)?;
        let units: Vec<u16> = candidate.encode_utf16().collect();
        Some(String::from_utf16_lossy(&units[span.start..span.end()]))
    }

    /// All subexpression substrings of a matching candidate, empty
    /// strings standing in for subexpressions that did not participate.
    ///
    /// Returns `None` when the candidate does not match. Prefer the
    /// range/substring accessors, which keep "did not participate"
    /// distinct from "matched zero length"; this bulk form exists for
    /// formatter-style collaborators that only splice text.
    pub fn subexpression_strings(&self, candidate: &str) -> Option<Vec<String>> {
        let (matched, spans) = self.run_cached(candidate, None);
        if !matched {
            return None;
        }
        let units: Vec<u16> = candidate.encode_utf16().collect();
        Some(
            spans
                .iter()
                .map(|span| match span {
                    Some(s) => String::from_utf16_lossy(&units[s.start..s.end()]),
                    None => String::new(),
                })
                .collect(),
        )
    }

    /// Whether `range` of a raw code-unit buffer matches in its entirety.
    ///
    /// Buffer entry points never touch the match cache; they exist for
    /// callers working with large buffers or text that never was a
    /// `String`.
    pub fn matches_units(&self, units: &[u16], range: Span) -> bool {
        exec::match_at(&self.program, units, range, MatchMode::WholeRange).is_some()
    }

    /// All subexpression extents for a whole-range match of a raw buffer,
    /// or `None` when the range does not match. Every slot a
    /// subexpression did not fill is `None`.
    pub fn subexpression_ranges_in_units(
        &self,
        units: &[u16],
        range: Span,
    ) -> Option<SubexpSpans> {
        exec::match_at(&self.program, units, range, MatchMode::WholeRange)
    }

    /// The anchored matching primitive: does the expression match starting
    /// exactly at `range.start`? The match may cover only a leading part
    /// of the range; greedy quantifiers take the longest extent available
    /// at each choice point. Returns the subexpression extents on match.
    ///
    /// Callers wanting free search call this at successive start offsets.
    pub fn match_at(&self, units: &[u16], range: Span) -> Option<SubexpSpans> {
        exec::match_at(&self.program, units, range, MatchMode::Prefix)
    }

    /// Run a whole-range match through the cache.
    ///
    /// The cache is keyed on the identity (address and length) of the
    /// candidate plus the requested range; a key hit is confirmed against
    /// a retained copy of the last candidate before being trusted, so an
    /// address reused by a new string cannot serve a stale result.
    /// Candidates over [`CACHE_CEILING`] are matched but never stored.
    fn run_cached(&self, candidate: &str, range: Option<Span>) -> (bool, SubexpSpans) {
        let cacheable = candidate.len() <= CACHE_CEILING;
        let key = CacheKey {
            ptr: candidate.as_ptr() as usize,
            len: candidate.len(),
            range,
        };

        if cacheable {
            let cache = self.cache.borrow();
            if cache.key == Some(key) && cache.candidate == candidate {
                return (cache.matched, cache.spans);
            }
        }

        let units: Vec<u16> = candidate.encode_utf16().collect();
        let search = range.unwrap_or_else(|| Span::new(0, units.len()));
        let result = exec::match_at(&self.program, &units, search, MatchMode::WholeRange);
        let matched = result.is_some();
        let spans = result.unwrap_or([None; MAX_SUBEXPRESSIONS]);

        if cacheable {
            *self.cache.borrow_mut() = MatchCache {
                key: Some(key),
                candidate: candidate.to_owned(),
                matched,
                spans,
            };
        }
        (matched, spans)
    }
}

impl Clone for Regexp {
    /// Cloning copies the pattern and program but starts with an empty
    /// cache; cloned expressions are how callers share one pattern across
    /// threads.
    fn clone(&self) -> Self {
        Regexp {
            pattern: self.pattern.clone(),
            ignore_case: self.ignore_case,
            program: self.program.clone(),
            cache: RefCell::new(MatchCache::empty()),
        }
    }
}

impl fmt::Debug for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regexp")
            .field("pattern", &self.pattern)
            .field("ignore_case", &self.ignore_case)
            .finish()
    }
}

impl PartialEq for Regexp {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.ignore_case == other.ignore_case
    }
}

impl Eq for Regexp {}

impl Hash for Regexp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
        self.ignore_case.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_round_trip() {
        let re = Regexp::new("(a+)(b*)").unwrap();
        assert_eq!(re.pattern(), "(a+)(b*)");
        assert!(!re.ignore_case());

        let re = Regexp::with_ignore_case("x", true).unwrap();
        assert!(re.ignore_case());
    }

    #[test]
    fn test_invalid_pattern_is_no_expression() {
        assert!(Regexp::new("(unclosed").is_err());
        assert!(!Regexp::is_valid("(unclosed"));
        assert!(Regexp::is_valid("(closed)"));
    }

    #[test]
    fn test_truncated_pattern_is_invalid_not_empty() {
        // A pattern cut off mid-construct must fail to compile, not
        // quietly become the empty pattern.
        assert!(Regexp::new("(?").is_err());
        assert!(!Regexp::is_valid("(?"));
        assert!(!Regexp::is_valid("[[:alpha:"));
    }

    #[test]
    fn test_unicode_escape_matches() {
        let re = Regexp::new("\\u0041\\u0042").unwrap();
        assert!(re.matches("AB"));
        assert!(!re.matches("ab"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty() {
        let re = Regexp::new("").unwrap();
        assert!(re.matches(""));
        assert!(!re.matches("x"));
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(!Regexp::new("ABC").unwrap().matches("abc"));
        assert!(Regexp::with_ignore_case("ABC", true).unwrap().matches("abc"));
        assert!(Regexp::with_ignore_case("[a-z]+", true).unwrap().matches("MiXeD"));
    }

    #[test]
    fn test_anchored_digits() {
        let re = Regexp::new("[0-9]+").unwrap();
        let units: Vec<u16> = "room42".encode_utf16().collect();

        assert!(re.match_at(&units, Span::new(0, 6)).is_none());

        let spans = re.match_at(&units, Span::new(4, 2)).unwrap();
        assert_eq!(spans[0], Some(Span::new(4, 2)));
    }

    #[test]
    fn test_subexpression_extraction() {
        let re = Regexp::new("(a+)(b*)").unwrap();
        let candidate = "aaab";
        assert!(re.matches(candidate));
        assert_eq!(re.subexpression_range(0, candidate), Some(Span::new(0, 4)));
        assert_eq!(re.subexpression_range(1, candidate), Some(Span::new(0, 3)));
        assert_eq!(re.subexpression_range(2, candidate), Some(Span::new(3, 1)));
        assert_eq!(re.subexpression_string(1, candidate).as_deref(), Some("aaa"));
        assert_eq!(re.subexpression_string(2, candidate).as_deref(), Some("b"));
    }

    #[test]
    fn test_alternation_nonparticipating_group() {
        let re = Regexp::new("^(foo)|(bar)$").unwrap();
        assert!(re.matches("bar"));
        assert_eq!(re.subexpression_range(0, "bar"), Some(Span::new(0, 3)));
        assert_eq!(re.subexpression_range(1, "bar"), None);
        assert_eq!(re.subexpression_range(2, "bar"), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_unmatched_optional_group_is_not_empty_match() {
        let re = Regexp::new("(a)?").unwrap();
        assert!(re.matches(""));
        // Did not participate: no range, no substring.
        assert_eq!(re.subexpression_range(1, ""), None);
        assert_eq!(re.subexpression_string(1, ""), None);

        // A group that participated with zero length is a real empty span.
        let re = Regexp::new("(a*)b").unwrap();
        assert_eq!(re.subexpression_range(1, "b"), Some(Span::new(0, 0)));
        assert_eq!(re.subexpression_string(1, "b").as_deref(), Some(""));
    }

    #[test]
    fn test_whole_match_substring_is_candidate() {
        let re = Regexp::new("[a-z]+").unwrap();
        assert_eq!(re.subexpression_string(0, "hello").as_deref(), Some("hello"));
    }

    #[test]
    fn test_no_match_yields_nothing() {
        let re = Regexp::new("[0-9]+").unwrap();
        assert!(!re.matches("letters"));
        assert_eq!(re.subexpression_range(0, "letters"), None);
        assert_eq!(re.subexpression_string(0, "letters"), None);
        assert_eq!(re.subexpression_strings("letters"), None);
    }

    #[test]
    fn test_subexpression_strings_bulk() {
        let re = Regexp::new("(a+)(b)?(c*)").unwrap();
        let all = re.subexpression_strings("aac").unwrap();
        assert_eq!(all.len(), MAX_SUBEXPRESSIONS);
        assert_eq!(all[0], "aac");
        assert_eq!(all[1], "aa");
        assert_eq!(all[2], ""); // did not participate
        assert_eq!(all[3], "c");
        assert_eq!(all[4], "");
    }

    #[test]
    #[should_panic(expected = "subexpression index")]
    fn test_out_of_range_index_panics() {
        let re = Regexp::new("a").unwrap();
        re.subexpression_range(MAX_SUBEXPRESSIONS, "a");
    }

    #[test]
    fn test_repeated_queries_are_idempotent() {
        let re = Regexp::new("([0-9]+)-([0-9]+)").unwrap();
        let candidate = String::from("123-456");

        // Same string object twice: second call is the cache-hit path.
        let first = re.subexpression_range(1, &candidate);
        let second = re.subexpression_range(1, &candidate);
        assert_eq!(first, second);
        assert_eq!(first, Some(Span::new(0, 3)));

        // A content-equal but distinct string gives identical results.
        let other = String::from("123-456");
        assert_eq!(re.subexpression_range(1, &other), first);

        // And flipping between candidates keeps answers straight.
        let third = String::from("9-8");
        assert_eq!(re.subexpression_range(1, &third), Some(Span::new(0, 1)));
        assert_eq!(re.subexpression_range(1, &candidate), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_ranged_and_whole_queries_do_not_mix() {
        let re = Regexp::new("[0-9]+").unwrap();
        let candidate = "room42";
        assert!(!re.matches(candidate));
        assert!(re.matches_in(candidate, Span::new(4, 2)));
        assert_eq!(
            re.subexpression_range_in(0, candidate, Span::new(4, 2)),
            Some(Span::new(4, 2))
        );
        // The whole-string answer is unchanged after the ranged query.
        assert!(!re.matches(candidate));
    }

    #[test]
    fn test_large_candidates_bypass_cache() {
        let re = Regexp::new("a+").unwrap();
        let big = "a".repeat(CACHE_CEILING + 1);
        assert!(re.matches(&big));
        assert!(re.matches(&big)); // second run re-executes, same answer
        assert_eq!(
            re.subexpression_range(0, &big),
            Some(Span::new(0, big.len()))
        );
    }

    #[test]
    fn test_units_entry_points() {
        let re = Regexp::new("(a+)b").unwrap();
        let units: Vec<u16> = "xaab".encode_utf16().collect();
        assert!(re.matches_units(&units, Span::new(1, 3)));
        assert!(!re.matches_units(&units, Span::new(0, 4)));

        let spans = re
            .subexpression_ranges_in_units(&units, Span::new(1, 3))
            .unwrap();
        assert_eq!(spans[0], Some(Span::new(1, 3)));
        assert_eq!(spans[1], Some(Span::new(1, 2)));
        assert_eq!(spans[2], None);
    }

    #[test]
    fn test_non_bmp_candidates_use_utf16_indexing() {
        // '𝒳' is one scalar, two UTF-16 code units.
        let re = Regexp::new("..a").unwrap();
        assert!(re.matches("𝒳a"));
        let re = Regexp::new(".a").unwrap();
        assert!(!re.matches("𝒳a"));
    }

    #[test]
    fn test_clone_and_equality() {
        let re = Regexp::with_ignore_case("(x)|(y)", true).unwrap();
        assert!(re.matches("X")); // warm the cache
        let clone = re.clone();
        assert_eq!(re, clone);
        assert!(clone.matches("Y"));

        let other = Regexp::new("(x)|(y)").unwrap();
        assert_ne!(re, other); // same pattern, different case flag
    }

    #[test]
    fn test_greedy_bounded_quantifier_prefix() {
        // Anchored prefix match takes 4, not 5 and not 2.
        let re = Regexp::new("a{2,4}").unwrap();
        let units: Vec<u16> = "aaaaa".encode_utf16().collect();
        let spans = re.match_at(&units, Span::new(0, 5)).unwrap();
        assert_eq!(spans[0], Some(Span::new(0, 4)));
    }

    #[test]
    fn test_formatter_style_use() {
        // Validate a phone-number shape, then pull the pieces out for
        // template substitution.
        let re = Regexp::new(r"\(?([0-9]{3})\)?[ -]?([0-9]{3})-?([0-9]{4})").unwrap();
        let candidate = "(415) 555-2368";
        assert!(re.matches(candidate));
        assert_eq!(re.subexpression_string(1, candidate).as_deref(), Some("415"));
        assert_eq!(re.subexpression_string(2, candidate).as_deref(), Some("555"));
        assert_eq!(re.subexpression_string(3, candidate).as_deref(), Some("2368"));
    }
}
