//! A small byte-oriented regular expression engine: patterns are parsed
//! into a token tree, compiled into a Thompson-style nondeterministic
//! automaton held in a flat arena, and executed by a backtracking walk.
//!
//! [`compile`] runs the first two stages and returns a reusable
//! [`Regex`]; [`Regex::matches`] runs the third against an input.
//!
//! # Dialect
//!
//! The supported syntax is deliberately small:
//!
//! * `abc` matches bytes literally. There are no escapes, and `.` is an
//!   ordinary byte, not a wildcard.
//! * `[a-z0_]` matches one byte out of a set of ranges and singletons.
//!   There are no negated classes.
//! * `(ab)` groups a sequence.
//! * `|` alternates: everything already parsed in its scope against
//!   everything that follows, so the split is binary and `a|b|c` nests
//!   as `a|(b|c)`.
//! * `*`, `+`, `?`, `{n}`, `{n,}` and `{n,m}` repeat whatever token came
//!   just before them, and stack, so `a{2}{2}` repeats a pair of `a`s
//!   twice.
//!
//! Matching is whole-string. There are no anchors and no substring
//! search; the automaton starts before the first byte and accepts only
//! past the last.
//!
//! # Limits
//!
//! * Patterns and inputs are raw bytes; a multi-byte UTF-8 character is
//!   handled as its byte sequence.
//! * Byte `0x00` is reserved internally for moves that consume no input,
//!   so NUL in a pattern does not match correctly.
//! * The walk backtracks and is exponential in the worst case. A step
//!   budget and a recursion ceiling cut runaway searches off; tripping
//!   either reports the input as not matching.

pub mod matcher;
pub mod model;
pub mod nfa;
pub mod parser;

pub use model::Token;
pub use nfa::Nfa;
pub use parser::{parse, SyntaxError};

/// A compiled pattern. Compiling is the costly part; one value serves any
/// number of [`matches`](Regex::matches) calls, concurrent ones included.
#[derive(Debug, Clone)]
pub struct Regex {
    nfa: Nfa,
    pattern: String,
}

/// Parses and compiles a pattern.
pub fn compile(pattern: &str) -> Result<Regex, SyntaxError> {
    let tokens = parse(pattern)?;
    let nfa = Nfa::compile(&tokens);
    log::debug!("compiled {:?} into {} states", pattern, nfa.state_count());
    Ok(Regex {
        nfa,
        pattern: pattern.to_string(),
    })
}

impl Regex {
    /// True when the whole of `input` matches the pattern.
    pub fn matches(&self, input: &str) -> bool {
        matcher::matches(&self.nfa, input)
    }

    /// The pattern this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}
