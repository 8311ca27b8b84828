use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::Token;

/// Ways a pattern can be malformed. Every variant aborts the parse; there
/// are no silent recoveries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("`(` without a matching `)`")]
    UnterminatedGroup,
    #[error("`[` without a matching `]`")]
    UnterminatedBracket,
    #[error("`{{` without a matching `}}`")]
    UnterminatedQuantifier,
    #[error("invalid quantifier bounds `{0}`")]
    InvalidQuantifierBounds(String),
    #[error("quantifier with nothing to repeat")]
    DanglingQuantifier,
    #[error("`-` with no range start before it")]
    DanglingRange,
    #[error("empty pattern")]
    EmptyPattern,
    #[error("empty group")]
    EmptyGroup,
    #[error("alternation with an empty arm")]
    EmptyAlternation,
}

/// Cursor and output of one syntactic scope. Group bodies and alternation
/// right arms run in a child context over the same byte slice, then hand
/// their final cursor back to the parent.
struct ParseContext {
    pos: usize,
    tokens: Vec<Token>,
}

/// Turns a pattern into its top-level token sequence.
///
/// The pattern is consumed byte-wise, one syntactic unit per step. Each
/// handler leaves the cursor on the last byte of the unit it consumed and
/// the loop advances past it.
pub fn parse(pattern: &str) -> Result<Vec<Token>, SyntaxError> {
    if pattern.is_empty() {
        return Err(SyntaxError::EmptyPattern);
    }
    let input = pattern.as_bytes();
    let mut ctx = ParseContext {
        pos: 0,
        tokens: Vec::new(),
    };
    while ctx.pos < input.len() {
        process(input, &mut ctx)?;
        ctx.pos += 1;
    }
    Ok(ctx.tokens)
}

fn process(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    match input[ctx.pos] {
        b'(' => parse_group(input, ctx),
        b'[' => parse_bracket(input, ctx),
        b'|' => parse_or(input, ctx),
        b'*' | b'?' | b'+' => parse_repeat(input, ctx),
        b'{' => parse_counted_repeat(input, ctx),
        // stray `)`, `]` and `}` included
        byte => {
            ctx.tokens.push(Token::Literal(byte));
            Ok(())
        }
    }
}

fn parse_group(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    let mut group_ctx = ParseContext {
        pos: ctx.pos + 1,
        tokens: Vec::new(),
    };
    while group_ctx.pos < input.len() && input[group_ctx.pos] != b')' {
        process(input, &mut group_ctx)?;
        group_ctx.pos += 1;
    }
    if group_ctx.pos >= input.len() {
        return Err(SyntaxError::UnterminatedGroup);
    }
    if group_ctx.tokens.is_empty() {
        return Err(SyntaxError::EmptyGroup);
    }
    // leave the cursor on the closing `)`
    ctx.pos = group_ctx.pos;
    ctx.tokens.push(Token::Group(group_ctx.tokens));
    Ok(())
}

fn parse_bracket(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    let mut pos = ctx.pos + 1;
    // inclusive (low, high) pairs; a bare byte is a one-byte range
    let mut elements: Vec<(u8, u8)> = Vec::new();
    while pos < input.len() && input[pos] != b']' {
        match input[pos] {
            b'-' => {
                pos += 1;
                if pos >= input.len() {
                    return Err(SyntaxError::UnterminatedBracket);
                }
                // re-extend the previous element; `[a-c-e]` ends up a..=e.
                // The byte after `-` is taken blindly, `]` included, so
                // `[a-]` swallows its closer and keeps scanning.
                let last = elements.last_mut().ok_or(SyntaxError::DanglingRange)?;
                last.1 = input[pos];
            }
            byte => elements.push((byte, byte)),
        }
        pos += 1;
    }
    if pos >= input.len() {
        return Err(SyntaxError::UnterminatedBracket);
    }
    let mut set = BTreeSet::new();
    for (low, high) in elements {
        // an inverted pair like `[z-a]` contributes nothing
        for byte in low..=high {
            set.insert(byte);
        }
    }
    ctx.pos = pos;
    ctx.tokens.push(Token::Bracket(set));
    Ok(())
}

fn parse_or(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    // everything already parsed in this scope becomes the left arm; the
    // rest of the scope, up to its `)` or the end of the pattern, becomes
    // the right arm. A second `|` in the same scope is swallowed by the
    // right-arm scan, so `a|b|c` nests as `a|(b|c)`.
    let mut rhs_ctx = ParseContext {
        pos: ctx.pos + 1,
        tokens: Vec::new(),
    };
    while rhs_ctx.pos < input.len() && input[rhs_ctx.pos] != b')' {
        process(input, &mut rhs_ctx)?;
        rhs_ctx.pos += 1;
    }
    if ctx.tokens.is_empty() || rhs_ctx.tokens.is_empty() {
        return Err(SyntaxError::EmptyAlternation);
    }
    let left = Token::GroupUncaptured(std::mem::take(&mut ctx.tokens));
    let right = Token::GroupUncaptured(rhs_ctx.tokens);
    // one short of where the scan stopped, so the byte that ended the
    // right arm is seen by the enclosing loop
    ctx.pos = rhs_ctx.pos - 1;
    ctx.tokens = vec![Token::Or(Box::new(left), Box::new(right))];
    Ok(())
}

fn parse_repeat(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    let (min, max) = match input[ctx.pos] {
        b'*' => (0, None),
        b'?' => (0, Some(1)),
        _ => (1, None),
    };
    let inner = ctx.tokens.pop().ok_or(SyntaxError::DanglingQuantifier)?;
    ctx.tokens.push(Token::Repeat {
        min,
        max,
        inner: Box::new(inner),
    });
    Ok(())
}

fn parse_counted_repeat(input: &[u8], ctx: &mut ParseContext) -> Result<(), SyntaxError> {
    let start = ctx.pos + 1;
    let mut end = start;
    while end < input.len() && input[end] != b'}' {
        end += 1;
    }
    if end >= input.len() {
        return Err(SyntaxError::UnterminatedQuantifier);
    }
    let interior = String::from_utf8_lossy(&input[start..end]).into_owned();
    let invalid = || SyntaxError::InvalidQuantifierBounds(interior.clone());
    let pieces: Vec<&str> = interior.split(',').collect();
    let (min, max) = match pieces.as_slice() {
        [exact] => {
            let exact = exact.parse().map_err(|_| invalid())?;
            (exact, Some(exact))
        }
        [low, ""] => (low.parse().map_err(|_| invalid())?, None),
        [low, high] => (
            low.parse().map_err(|_| invalid())?,
            Some(high.parse().map_err(|_| invalid())?),
        ),
        _ => return Err(invalid()),
    };
    // bounds are checked before the target, so `{x}` with nothing before
    // it still reports the bounds
    let inner = ctx.tokens.pop().ok_or(SyntaxError::DanglingQuantifier)?;
    ctx.pos = end;
    ctx.tokens.push(Token::Repeat {
        min,
        max,
        inner: Box::new(inner),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lit(byte: u8) -> Token {
        Token::Literal(byte)
    }

    fn bracket(bytes: &[u8]) -> Token {
        Token::Bracket(bytes.iter().copied().collect())
    }

    fn or(left: Vec<Token>, right: Vec<Token>) -> Token {
        Token::Or(
            Box::new(Token::GroupUncaptured(left)),
            Box::new(Token::GroupUncaptured(right)),
        )
    }

    fn repeat(min: usize, max: Option<usize>, inner: Token) -> Token {
        Token::Repeat {
            min,
            max,
            inner: Box::new(inner),
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("abc"), Ok(vec![lit(b'a'), lit(b'b'), lit(b'c')]));
        // no wildcard
        assert_eq!(parse("a.c"), Ok(vec![lit(b'a'), lit(b'.'), lit(b'c')]));
        // stray closers are literals
        assert_eq!(parse("a)b"), Ok(vec![lit(b'a'), lit(b')'), lit(b'b')]));
        assert_eq!(parse("a]b"), Ok(vec![lit(b'a'), lit(b']'), lit(b'b')]));
        assert_eq!(parse("a}b"), Ok(vec![lit(b'a'), lit(b'}'), lit(b'b')]));
    }

    #[test]
    fn test_multibyte_characters_split() {
        // byte-oriented: a two-byte scalar is two literals
        assert_eq!(parse("é"), Ok(vec![lit(0xC3), lit(0xA9)]));
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            parse("(ab)c"),
            Ok(vec![Token::Group(vec![lit(b'a'), lit(b'b')]), lit(b'c')])
        );
        assert_eq!(
            parse("((a)b)"),
            Ok(vec![Token::Group(vec![
                Token::Group(vec![lit(b'a')]),
                lit(b'b'),
            ])])
        );
    }

    #[test]
    fn test_brackets() {
        assert_eq!(parse("[abc]"), Ok(vec![bracket(b"abc")]));
        assert_eq!(parse("[a-c]"), Ok(vec![bracket(b"abc")]));
        assert_eq!(parse("[a-c0]"), Ok(vec![bracket(b"0abc")]));
        // a second `-` re-extends the same element
        assert_eq!(parse("[a-c-e]"), Ok(vec![bracket(b"abcde")]));
        // inverted ranges contribute nothing
        assert_eq!(parse("[c-a]"), Ok(vec![bracket(b"")]));
        assert_eq!(parse("[]"), Ok(vec![bracket(b"")]));
    }

    #[test]
    fn test_alternation_nests_right() {
        assert_eq!(parse("a|b"), Ok(vec![or(vec![lit(b'a')], vec![lit(b'b')])]));
        assert_eq!(
            parse("a|b|c"),
            Ok(vec![or(
                vec![lit(b'a')],
                vec![or(vec![lit(b'b')], vec![lit(b'c')])],
            )])
        );
        // the left arm takes everything parsed so far in its scope
        assert_eq!(
            parse("ab|c"),
            Ok(vec![or(vec![lit(b'a'), lit(b'b')], vec![lit(b'c')])])
        );
    }

    #[test]
    fn test_alternation_inside_group() {
        assert_eq!(
            parse("(a|b)c"),
            Ok(vec![
                Token::Group(vec![or(vec![lit(b'a')], vec![lit(b'b')])]),
                lit(b'c'),
            ])
        );
        assert_eq!(
            parse("(cat|dog)"),
            Ok(vec![Token::Group(vec![or(
                vec![lit(b'c'), lit(b'a'), lit(b't')],
                vec![lit(b'd'), lit(b'o'), lit(b'g')],
            )])])
        );
    }

    #[test]
    fn test_quantifiers() {
        assert_eq!(parse("a*"), Ok(vec![repeat(0, None, lit(b'a'))]));
        assert_eq!(parse("a+"), Ok(vec![repeat(1, None, lit(b'a'))]));
        assert_eq!(parse("a?"), Ok(vec![repeat(0, Some(1), lit(b'a'))]));
        // only the immediately preceding token is wrapped
        assert_eq!(
            parse("ab*"),
            Ok(vec![lit(b'a'), repeat(0, None, lit(b'b'))])
        );
        assert_eq!(
            parse("(ab)+"),
            Ok(vec![repeat(
                1,
                None,
                Token::Group(vec![lit(b'a'), lit(b'b')]),
            )])
        );
    }

    #[test]
    fn test_quantifiers_stack() {
        assert_eq!(
            parse("a*?"),
            Ok(vec![repeat(0, Some(1), repeat(0, None, lit(b'a')))])
        );
        assert_eq!(
            parse("a{2}{2}"),
            Ok(vec![repeat(2, Some(2), repeat(2, Some(2), lit(b'a')))])
        );
    }

    #[test]
    fn test_counted_quantifiers() {
        assert_eq!(parse("a{3}"), Ok(vec![repeat(3, Some(3), lit(b'a'))]));
        assert_eq!(parse("a{2,}"), Ok(vec![repeat(2, None, lit(b'a'))]));
        assert_eq!(parse("a{2,5}"), Ok(vec![repeat(2, Some(5), lit(b'a'))]));
        // bounds are taken as written, satisfiable or not
        assert_eq!(parse("a{3,2}"), Ok(vec![repeat(3, Some(2), lit(b'a'))]));
    }

    #[test]
    fn test_unterminated_constructs() {
        assert_eq!(parse("(abc"), Err(SyntaxError::UnterminatedGroup));
        assert_eq!(parse("("), Err(SyntaxError::UnterminatedGroup));
        assert_eq!(parse("[ab"), Err(SyntaxError::UnterminatedBracket));
        // the byte after `-` is consumed blindly, `]` included
        assert_eq!(parse("[a-]"), Err(SyntaxError::UnterminatedBracket));
        assert_eq!(parse("a{2"), Err(SyntaxError::UnterminatedQuantifier));
    }

    #[test]
    fn test_empty_constructs() {
        assert_eq!(parse(""), Err(SyntaxError::EmptyPattern));
        assert_eq!(parse("()"), Err(SyntaxError::EmptyGroup));
        assert_eq!(parse("a|"), Err(SyntaxError::EmptyAlternation));
        assert_eq!(parse("|a"), Err(SyntaxError::EmptyAlternation));
        assert_eq!(parse("(a|)"), Err(SyntaxError::EmptyAlternation));
        assert_eq!(parse("a||b"), Err(SyntaxError::EmptyAlternation));
    }

    #[test]
    fn test_bad_quantifiers_and_ranges() {
        assert_eq!(parse("*a"), Err(SyntaxError::DanglingQuantifier));
        assert_eq!(parse("[-a]"), Err(SyntaxError::DanglingRange));
        assert_eq!(
            parse("a{x}"),
            Err(SyntaxError::InvalidQuantifierBounds("x".to_string()))
        );
        assert_eq!(
            parse("a{1,2,3}"),
            Err(SyntaxError::InvalidQuantifierBounds("1,2,3".to_string()))
        );
        assert_eq!(
            parse("a{}"),
            Err(SyntaxError::InvalidQuantifierBounds(String::new()))
        );
        // malformed bounds win over the missing target
        assert_eq!(
            parse("{x}"),
            Err(SyntaxError::InvalidQuantifierBounds("x".to_string()))
        );
        assert_eq!(parse("{2}"), Err(SyntaxError::DanglingQuantifier));
    }
}
