//! Program building for pattern matching.
//!
//! This module compiles parsed pattern trees into a flat instruction
//! program executed by the backtracking matcher in `exec`. The shape is
//! the classic fork/jump bytecode: greedy choice points are `Split`
//! instructions whose fall-through arm is preferred, capture extents are
//! recorded by `Save` instructions writing code-unit positions into a
//! fixed slot array.
//!
//! Case-insensitivity is baked into the program as a flag consulted at
//! every `Unit`, `Class`, and `Backref` comparison; the candidate text is
//! never case-folded up front, so reported spans index the original text.

use crate::parser::{AtomKind, Branch, ParsedRegexp, QuantifiedAtom, Tree, QUANT_UNBOUNDED};
use crate::parser::CharClass;
use crate::MAX_SUBEXPRESSIONS;

/// Capture slots: two (start, end) per subexpression, index 0 is the whole
/// match.
pub const CAP_SLOTS: usize = 2 * MAX_SUBEXPRESSIONS;

/// One instruction of a compiled program.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Match a single literal code unit.
    Unit(u16),
    /// Match any single code unit.
    Dot,
    /// Match a code unit against a character class.
    Class(CharClass),
    /// Assert position == range start.
    Begin,
    /// Assert position == range end.
    End,
    /// Assert a word begins here.
    BeginWord,
    /// Assert a word ends here.
    EndWord,
    /// Assert a word boundary (or its absence).
    WordBoundary { negated: bool },
    /// Record the current position in a capture slot.
    Save(usize),
    /// Choice point: fall through now, retry at `alt` on failure.
    Split { alt: usize },
    /// Unconditional jump.
    Jump(usize),
    /// Remember the current position in a loop mark.
    SetMark(usize),
    /// Loop back-edge: jump to `target` only if the position advanced since
    /// the mark was set; otherwise fall through and leave the loop. Stops
    /// empty-bodied iterations (e.g. `(a*)*`) from spinning.
    ProgressJump { mark: usize, target: usize },
    /// Match the text captured by a subexpression.
    Backref(usize),
    /// The program matched.
    Accept,
}

/// A compiled, executable pattern. Immutable after construction and owned
/// by the expression object that compiled it.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) insts: Vec<Inst>,
    pub(crate) ignore_case: bool,
    /// Capturing groups appearing in the pattern (may exceed the number of
    /// retrievable slots).
    pub(crate) group_count: usize,
    /// Loop marks needed by the executor's per-thread state.
    pub(crate) mark_count: usize,
}

struct Compiler {
    insts: Vec<Inst>,
    mark_count: usize,
}

impl Compiler {
    fn emit(&mut self, inst: Inst) -> usize {
        let pc = self.insts.len();
        self.insts.push(inst);
        pc
    }

    fn next_pc(&self) -> usize {
        self.insts.len()
    }

    fn patch_split(&mut self, at: usize, alt: usize) {
        self.insts[at] = Inst::Split { alt };
    }
}

/// Compile a parsed pattern into an executable program.
pub fn compile(parsed: &ParsedRegexp, ignore_case: bool) -> Program {
    let mut c = Compiler {
        insts: Vec::new(),
        mark_count: 0,
    };

    c.emit(Inst::Save(0));
    compile_tree(&mut c, &parsed.tree);
    c.emit(Inst::Save(1));
    c.emit(Inst::Accept);

    Program {
        insts: c.insts,
        ignore_case,
        group_count: parsed.group_count,
        mark_count: c.mark_count,
    }
}

/// Compile alternation: `Split(arm2); arm1; Jump(end); arm2; ...` so the
/// first alternative is always tried first.
fn compile_tree(c: &mut Compiler, tree: &Tree) {
    match tree.len() {
        0 => {}
        1 => compile_branch(c, &tree[0]),
        _ => {
            let mut jumps = Vec::with_capacity(tree.len() - 1);
            for (i, branch) in tree.iter().enumerate() {
                let last = i == tree.len() - 1;
                if last {
                    compile_branch(c, branch);
                } else {
                    let split = c.emit(Inst::Split { alt: 0 });
                    compile_branch(c, branch);
                    jumps.push(c.emit(Inst::Jump(0)));
                    let alt = c.next_pc();
                    c.patch_split(split, alt);
                }
            }
            let end = c.next_pc();
            for j in jumps {
                c.insts[j] = Inst::Jump(end);
            }
        }
    }
}

fn compile_branch(c: &mut Compiler, branch: &Branch) {
    for qa in branch {
        compile_piece(c, qa);
    }
}

/// Compile one quantified atom: required copies first, then either a
/// greedy loop (unbounded upper limit) or a run of optional copies, each
/// skippable through a forward `Split`.
fn compile_piece(c: &mut Compiler, qa: &QuantifiedAtom) {
    if qa.is_singleton() {
        compile_atom(c, &qa.kind);
        return;
    }

    for _ in 0..qa.quant_min {
        compile_atom(c, &qa.kind);
    }

    if qa.quant_max == QUANT_UNBOUNDED {
        // loop: Split(after); SetMark(k); body; ProgressJump(k, loop); after:
        let mark = c.mark_count;
        c.mark_count += 1;

        let loop_start = c.emit(Inst::Split { alt: 0 });
        c.emit(Inst::SetMark(mark));
        compile_atom(c, &qa.kind);
        c.emit(Inst::ProgressJump {
            mark,
            target: loop_start,
        });
        let after = c.next_pc();
        c.patch_split(loop_start, after);
    } else {
        for _ in qa.quant_min..qa.quant_max {
            let split = c.emit(Inst::Split { alt: 0 });
            compile_atom(c, &qa.kind);
            let after = c.next_pc();
            c.patch_split(split, after);
        }
    }
}

fn compile_atom(c: &mut Compiler, kind: &AtomKind) {
    match kind {
        AtomKind::Literal(u) => {
            c.emit(Inst::Unit(*u));
        }
        AtomKind::Dot => {
            c.emit(Inst::Dot);
        }
        AtomKind::Class(class) => {
            c.emit(Inst::Class(class.clone()));
        }
        AtomKind::Group { capture, tree } => {
            if let Some(group) = capture {
                c.emit(Inst::Save(2 * group));
                compile_tree(c, tree);
                c.emit(Inst::Save(2 * group + 1));
            } else {
                compile_tree(c, tree);
            }
        }
        AtomKind::BeginText => {
            c.emit(Inst::Begin);
        }
        AtomKind::EndText => {
            c.emit(Inst::End);
        }
        AtomKind::BeginWord => {
            c.emit(Inst::BeginWord);
        }
        AtomKind::EndWord => {
            c.emit(Inst::EndWord);
        }
        AtomKind::WordBoundary => {
            c.emit(Inst::WordBoundary { negated: false });
        }
        AtomKind::NotWordBoundary => {
            c.emit(Inst::WordBoundary { negated: true });
        }
        AtomKind::Backref(group) => {
            c.emit(Inst::Backref(*group));
        }
    }
}
