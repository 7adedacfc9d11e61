use crate::compiler::lexer::location::Location;
use crate::compiler::lexer::SrcToken;

pub struct TokenStack {
    stack: Vec<SrcToken>,
    offset: usize,
}

impl TokenStack {
    pub fn new(tokens: Vec<SrcToken>) -> Self {
        TokenStack {
            stack: tokens,
            offset: 0,
        }
    }

    pub fn peek(&self) -> &SrcToken {
        self.stack
            .get(self.offset)
            .unwrap_or_else(|| &self.stack[self.stack.len() - 1])
    }

    // Second token of lookahead, used to tell `ident =` and `ident (`
    // statements apart.
    pub fn peek_next(&self) -> &SrcToken {
        self.stack
            .get(self.offset + 1)
            .unwrap_or_else(|| &self.stack[self.stack.len() - 1])
    }

    pub fn pop(&mut self) -> SrcToken {
        let token = self.peek().clone();
        if self.offset < self.stack.len() {
            self.offset += 1;
        }
        token
    }

    pub fn location(&self) -> &Location {
        &self.peek().location
    }
}
