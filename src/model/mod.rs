use std::collections::BTreeSet;

/// One node of a parsed pattern. The parser emits a flat sequence of these
/// for the top level; nesting happens through the group variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Matches exactly this byte. There is no wildcard; `.` lands here
    /// like any other byte.
    Literal(u8),
    /// Matches any byte in the set. `[]` produces an empty set, which
    /// matches nothing.
    Bracket(BTreeSet<u8>),
    /// Binary alternation. Both arms are `GroupUncaptured` sequences
    /// synthesized by the parser.
    Or(Box<Token>, Box<Token>),
    /// Parenthesized sequence.
    Group(Vec<Token>),
    /// Sequence with no source parentheses; matches exactly like `Group`.
    GroupUncaptured(Vec<Token>),
    /// `inner` repeated `min` through `max` times, `None` meaning no
    /// upper bound. Always wraps the token that came just before it.
    Repeat {
        min: usize,
        max: Option<usize>,
        inner: Box<Token>,
    },
}
