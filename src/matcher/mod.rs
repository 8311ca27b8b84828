use std::collections::HashSet;

use crate::nfa::{Nfa, StateId, EPSILON};

/// Recursion steps allowed for one match call. Backtracking is worst-case
/// exponential; past this the walk gives up and reports no match.
const STEP_LIMIT: u64 = 1 << 20;

/// Recursion depth allowed for one match call. Depth grows with input
/// length, so inputs needing more frames than this report no match.
const MAX_DEPTH: usize = 4096;

/// What the walk sees at a position: a byte of the input, or one of the
/// two sentinels framing it. The sentinels are positions rather than byte
/// values, so no input byte can ever be mistaken for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peek {
    Start,
    Byte(u8),
    End,
}

fn peek(input: &[u8], pos: isize) -> Peek {
    if pos >= input.len() as isize {
        Peek::End
    } else if pos < 0 {
        Peek::Start
    } else {
        Peek::Byte(input[pos as usize])
    }
}

struct Walk<'a> {
    nfa: &'a Nfa,
    input: &'a [u8],
    /// `(state, position)` pairs on the current path. Entries are removed
    /// on backtrack, so this cuts epsilon cycles without caching verdicts
    /// across branches.
    seen: HashSet<(StateId, isize)>,
    steps: u64,
}

/// True when the whole of `input` is accepted by `nfa`.
///
/// The walk starts one position before the first byte and accepts only in
/// the terminal state one position past the last, so matching is
/// whole-string; there is no substring search.
pub fn matches(nfa: &Nfa, input: &str) -> bool {
    let mut walk = Walk {
        nfa,
        input: input.as_bytes(),
        seen: HashSet::new(),
        steps: 0,
    };
    walk.check(nfa.root(), -1, 0)
}

impl Walk<'_> {
    fn check(&mut self, state: StateId, pos: isize, depth: usize) -> bool {
        self.steps += 1;
        if self.steps > STEP_LIMIT {
            if self.steps == STEP_LIMIT + 1 {
                log::warn!("step budget exhausted, reporting no match");
            }
            return false;
        }
        if depth > MAX_DEPTH {
            return false;
        }

        let nfa = self.nfa;
        let here = peek(self.input, pos);
        if here == Peek::End && nfa.state(state).is_terminal {
            return true;
        }
        if !self.seen.insert((state, pos)) {
            return false;
        }

        // a consuming move goes to the first target only; byte keys hold
        // exactly one by construction
        if let Peek::Byte(byte) = here {
            let target = nfa
                .state(state)
                .transitions
                .get(&byte)
                .and_then(|targets| targets.first());
            if let Some(&target) = target {
                if self.check(target, pos + 1, depth + 1) {
                    return true;
                }
            }
        }

        if let Some(targets) = nfa.state(state).transitions.get(&EPSILON) {
            for &target in targets {
                if self.check(target, pos, depth + 1) {
                    return true;
                }
                // stepping off the leading sentinel onto the first byte;
                // the only advance that consumes nothing
                if here == Peek::Start && self.check(target, pos + 1, depth + 1) {
                    return true;
                }
            }
        }

        self.seen.remove(&(state, pos));
        false
    }
}
