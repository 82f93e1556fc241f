//! Sorted token vocabulary.

use std::collections::{BTreeSet, HashMap};

use crate::corpus::Token;

/// Distinct tokens in sorted order, code = position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<Token>,
    codes: HashMap<Token, u32>,
}

impl Vocabulary {
    /// Build the vocabulary of `tokens`. Independent of input order.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> Self {
        let sorted: BTreeSet<&Token> = tokens.into_iter().collect();
        let tokens: Vec<Token> = sorted.into_iter().cloned().collect();
        let codes = tokens
            .iter()
            .enumerate()
            .map(|(code, token)| (token.clone(), code as u32))
            .collect();
        Self { tokens, codes }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn code(&self, token: &Token) -> Option<u32> {
        self.codes.get(token).copied()
    }

    pub fn token(&self, code: u32) -> Option<&Token> {
        self.tokens.get(code as usize)
    }

    /// Tokens in code order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
