//! Backtracking executor for compiled programs.
//!
//! Matching is anchored: the program must match starting exactly at the
//! search range's first position. Precedence is depth-first backtracking
//! with the greedy arm of every `Split` tried first and alternation arms
//! tried in source order, so greedy quantifiers prefer the longest match
//! at each choice point and the first alternative wins ties.
//!
//! A step budget bounds pathological backtracking; running out of budget
//! reports no-match rather than hanging.

use smallvec::{smallvec, SmallVec};

use crate::chars;
use crate::compile::{Inst, Program, CAP_SLOTS};
use crate::{Span, MAX_SUBEXPRESSIONS};

/// Ceiling on executor steps for a single match attempt.
pub(crate) const STEP_LIMIT: usize = 1 << 20;

/// Subexpression spans for one successful match; index 0 is the whole
/// match, unused entries are `None`.
pub type SubexpSpans = [Option<Span>; MAX_SUBEXPRESSIONS];

/// What it takes for a match attempt to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Accept as soon as the program accepts; the match may cover only a
    /// leading part of the range.
    Prefix,
    /// Accept only when the match consumes the entire range; backtracking
    /// keeps exploring shorter/alternative paths until one does.
    WholeRange,
}

/// One pending backtracking alternative.
#[derive(Clone)]
struct Thread {
    pc: usize,
    sp: usize,
    slots: [Option<usize>; CAP_SLOTS],
    marks: SmallVec<[usize; 4]>,
}

/// Run `program` against `units`, anchored at `range.start`.
///
/// Returns the subexpression spans on success, `None` on no-match (which
/// includes a blown step budget). `range` must lie within `units`; out of
/// bounds is a caller error, asserted in debug builds and reported as
/// no-match in release builds.
pub(crate) fn match_at(
    program: &Program,
    units: &[u16],
    range: Span,
    mode: MatchMode,
) -> Option<SubexpSpans> {
    debug_assert!(
        range.end() <= units.len(),
        "search range {:?} out of bounds for {} code units",
        range,
        units.len()
    );
    if range.end() > units.len() || range.start > units.len() {
        return None;
    }

    let end = range.end();
    let insts = &program.insts;
    let mut stack: SmallVec<[Thread; 4]> = smallvec![Thread {
        pc: 0,
        sp: range.start,
        slots: [None; CAP_SLOTS],
        marks: smallvec![0; program.mark_count],
    }];
    let mut steps = 0usize;

    'threads: while let Some(mut t) = stack.pop() {
        loop {
            steps += 1;
            if steps > STEP_LIMIT {
                return None;
            }
            debug_assert!(t.pc < insts.len(), "pc {} out of program", t.pc);

            match insts[t.pc] {
                Inst::Unit(lit) => {
                    if t.sp < end && unit_eq(units[t.sp], lit, program.ignore_case) {
                        t.sp += 1;
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::Dot => {
                    if t.sp < end {
                        t.sp += 1;
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::Class(ref class) => {
                    if t.sp < end && class.matches(units[t.sp], program.ignore_case) {
                        t.sp += 1;
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::Begin => {
                    if t.sp == range.start {
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::End => {
                    if t.sp == end {
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::BeginWord => {
                    let here = t.sp < end && chars::is_word(units[t.sp]);
                    let before = t.sp > range.start && chars::is_word(units[t.sp - 1]);
                    if here && !before {
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::EndWord => {
                    let here = t.sp < end && chars::is_word(units[t.sp]);
                    let before = t.sp > range.start && chars::is_word(units[t.sp - 1]);
                    if before && !here {
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::WordBoundary { negated } => {
                    let here = t.sp < end && chars::is_word(units[t.sp]);
                    let before = t.sp > range.start && chars::is_word(units[t.sp - 1]);
                    if (here != before) != negated {
                        t.pc += 1;
                    } else {
                        continue 'threads;
                    }
                }
                Inst::Save(slot) => {
                    t.slots[slot] = Some(t.sp);
                    t.pc += 1;
                }
                Inst::Split { alt } => {
                    let mut fallback = t.clone();
                    fallback.pc = alt;
                    stack.push(fallback);
                    t.pc += 1;
                }
                Inst::Jump(target) => {
                    t.pc = target;
                }
                Inst::SetMark(mark) => {
                    t.marks[mark] = t.sp;
                    t.pc += 1;
                }
                Inst::ProgressJump { mark, target } => {
                    if t.sp > t.marks[mark] {
                        t.pc = target;
                    } else {
                        t.pc += 1;
                    }
                }
                Inst::Backref(group) => {
                    match (t.slots[2 * group], t.slots[2 * group + 1]) {
                        (Some(s), Some(e)) => {
                            let len = e - s;
                            let fits = t.sp + len <= end
                                && (0..len).all(|i| {
                                    unit_eq(units[s + i], units[t.sp + i], program.ignore_case)
                                });
                            if fits {
                                t.sp += len;
                                t.pc += 1;
                            } else {
                                continue 'threads;
                            }
                        }
                        // A group that never participated matches the
                        // empty string.
                        _ => {
                            t.pc += 1;
                        }
                    }
                }
                Inst::Accept => {
                    if mode == MatchMode::WholeRange && t.sp != end {
                        continue 'threads;
                    }
                    return Some(spans_from_slots(&t.slots));
                }
            }
        }
    }
    None
}

#[inline]
fn unit_eq(a: u16, b: u16, ignore_case: bool) -> bool {
    a == b || (ignore_case && chars::eq_ignore_case(a, b))
}

fn spans_from_slots(slots: &[Option<usize>; CAP_SLOTS]) -> SubexpSpans {
    std::array::from_fn(|i| match (slots[2 * i], slots[2 * i + 1]) {
        (Some(s), Some(e)) if e >= s => Some(Span::new(s, e - s)),
        _ => None,
    })
}
