use std::collections::HashMap;

use crate::model::Token;

/// Transition key for moves that consume no input. Byte `0x00` is
/// sacrificed for this, so a NUL literal in a pattern aliases an epsilon
/// edge and will not match correctly.
pub const EPSILON: u8 = 0;

pub type StateId = usize;

/// One automaton node. Non-epsilon keys always hold exactly one target;
/// only the epsilon list grows as fragments are spliced together.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub transitions: HashMap<u8, Vec<StateId>>,
    pub is_start: bool,
    pub is_terminal: bool,
}

/// A compiled automaton. States live in one arena and point at each other
/// by index, so the cycles produced by unbounded quantifiers need no
/// shared ownership. Immutable once built; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<State>,
    root: StateId,
}

/// Entry and exit of a partially built piece of the automaton. Nothing
/// outside the piece points into it except at `start`, and nothing inside
/// leads out except through `end`.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

impl Nfa {
    /// Compiles a token sequence: one fragment per token, spliced in
    /// order, wrapped in a fresh root and a unique accept state. Panics
    /// on an empty sequence, which the parser never produces.
    pub fn compile(tokens: &[Token]) -> Nfa {
        let mut nfa = Nfa {
            states: Vec::new(),
            root: 0,
        };
        let inner = nfa.compile_sequence(tokens);
        let root = nfa.add_state();
        nfa.states[root].is_start = true;
        nfa.link(root, EPSILON, inner.start);
        let accept = nfa.add_state();
        nfa.states[accept].is_terminal = true;
        nfa.link(inner.end, EPSILON, accept);
        nfa.root = root;
        nfa
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn link(&mut self, from: StateId, byte: u8, to: StateId) {
        self.states[from]
            .transitions
            .entry(byte)
            .or_default()
            .push(to);
    }

    fn compile_sequence(&mut self, tokens: &[Token]) -> Fragment {
        let mut fragment = match tokens.first() {
            Some(token) => self.compile_token(token),
            // the parser rejects every form that could produce one
            None => unreachable!("empty token sequence"),
        };
        for token in &tokens[1..] {
            let next = self.compile_token(token);
            self.link(fragment.end, EPSILON, next.start);
            fragment.end = next.end;
        }
        fragment
    }

    fn compile_token(&mut self, token: &Token) -> Fragment {
        match token {
            Token::Literal(byte) => {
                let start = self.add_state();
                let end = self.add_state();
                self.link(start, *byte, end);
                Fragment { start, end }
            }
            Token::Bracket(bytes) => {
                let start = self.add_state();
                let end = self.add_state();
                for &byte in bytes {
                    self.link(start, byte, end);
                }
                Fragment { start, end }
            }
            Token::Or(left, right) => {
                let left = self.compile_token(left);
                let right = self.compile_token(right);
                let start = self.add_state();
                let end = self.add_state();
                self.link(start, EPSILON, left.start);
                self.link(start, EPSILON, right.start);
                self.link(left.end, EPSILON, end);
                self.link(right.end, EPSILON, end);
                Fragment { start, end }
            }
            Token::Group(tokens) | Token::GroupUncaptured(tokens) => self.compile_sequence(tokens),
            Token::Repeat { min, max, inner } => self.compile_repeat(*min, *max, inner),
        }
    }

    fn compile_repeat(&mut self, min: usize, max: Option<usize>, inner: &Token) -> Fragment {
        let start = self.add_state();
        let end = self.add_state();
        // the zero-occurrence bypass comes first, so the walk tries to
        // leave before it tries the body
        if min == 0 {
            self.link(start, EPSILON, end);
        }
        let copy_count = match max {
            Some(max) => max,
            None => min.max(1),
        };
        if copy_count == 0 {
            // {0}: no body at all
            return Fragment { start, end };
        }
        let mut copy = self.compile_token(inner);
        self.link(start, EPSILON, copy.start);
        for i in 2..=copy_count {
            let next = self.compile_token(inner);
            self.link(copy.end, EPSILON, next.start);
            copy = next;
            // copies past the minimum may be skipped
            if i > min {
                self.link(copy.start, EPSILON, end);
            }
        }
        self.link(copy.end, EPSILON, end);
        if max.is_none() {
            // unbounded: cycle back through the final copy
            self.link(end, EPSILON, copy.start);
        }
        Fragment { start, end }
    }
}
