pub mod lexer_error;
pub mod location;
pub mod token;
pub mod token_stack;

use crate::compiler::lexer::lexer_error::{LexResult, LocationError};
use crate::compiler::lexer::location::{Location, Src};
use crate::compiler::lexer::token::{Keyword, StaticToken, Token, STATIC_TOKEN_MAP};

pub type SrcToken = Src<Token>;

pub struct Lexer {
    input: Vec<char>,
    offset: usize,
    location: Location,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            input: source.chars().collect(),
            offset: 0,
            location: Location::start(),
        }
    }

    pub fn next_token(&mut self) -> LexResult<SrcToken> {
        self.skip_whitespace_and_comments();
        let location = self.location.clone();
        if self.offset >= self.input.len() {
            return Ok(SrcToken::new(Token::Eof, location));
        }

        let c = self.input[self.offset];
        let token = if c.is_ascii_alphabetic() || c == '_' {
            self.read_identifier()
        } else if c.is_ascii_digit() {
            self.read_number(&location)?
        } else if c == '"' {
            self.read_string(&location)?
        } else {
            self.read_static(&location)?
        };
        Ok(SrcToken::new(token, location))
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.input[self.offset] == '\n' {
                self.location.advance_line();
            } else {
                self.location.advance_column();
            }
            self.offset += 1;
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.offset < self.input.len() {
            let c = self.input[self.offset];
            if c.is_whitespace() {
                self.advance(1);
                continue;
            }
            if c == '/' && self.offset + 1 < self.input.len() {
                if self.input[self.offset + 1] == '/' {
                    while self.offset < self.input.len() && self.input[self.offset] != '\n' {
                        self.advance(1);
                    }
                    continue;
                }
                if self.input[self.offset + 1] == '*' {
                    self.advance(2);
                    // An unterminated block comment consumes the rest of the
                    // input.
                    while self.offset < self.input.len() {
                        if self.input[self.offset] == '*'
                            && self.offset + 1 < self.input.len()
                            && self.input[self.offset + 1] == '/'
                        {
                            self.advance(2);
                            break;
                        }
                        self.advance(1);
                    }
                    continue;
                }
            }
            return;
        }
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.offset;
        while self.offset < self.input.len() {
            let c = self.input[self.offset];
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            self.advance(1);
        }
        let text: String = self.input[start..self.offset].iter().collect();
        match Keyword::from_str(&text) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(text),
        }
    }

    fn read_number(&mut self, location: &Location) -> LexResult<Token> {
        let start = self.offset;
        while self.offset < self.input.len() && self.input[self.offset].is_ascii_digit() {
            self.advance(1);
        }
        let text: String = self.input[start..self.offset].iter().collect();
        let value = text.parse::<i32>().map_err(|_| {
            LocationError::new(
                format!("Number literal out of range: {}", text),
                location.clone(),
            )
        })?;
        Ok(Token::Number(value))
    }

    fn read_string(&mut self, location: &Location) -> LexResult<Token> {
        self.advance(1);
        let mut value = String::new();
        while self.offset < self.input.len() {
            let c = self.input[self.offset];
            if c == '"' {
                self.advance(1);
                return Ok(Token::String(value));
            }
            if c == '\\' {
                if self.offset + 1 >= self.input.len() {
                    break;
                }
                let next = self.input[self.offset + 1];
                match next {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    // Unknown escapes pass the escaped character through.
                    _ => value.push(next),
                }
                self.advance(2);
                continue;
            }
            if c == '\n' {
                break;
            }
            value.push(c);
            self.advance(1);
        }
        Err(LocationError::new(
            "Unterminated string literal".to_string(),
            location.clone(),
        ))
    }

    fn read_static(&mut self, location: &Location) -> LexResult<Token> {
        for len in (1..=StaticToken::MAX_LENGTH).rev() {
            if self.offset + len > self.input.len() {
                continue;
            }
            let substr: String = self.input[self.offset..self.offset + len].iter().collect();
            if let Some(token) = STATIC_TOKEN_MAP.get(substr.as_str()) {
                let token = token.clone();
                self.advance(len);
                return Ok(Token::Static(token));
            }
        }
        Err(LocationError::new(
            format!("Unexpected '{}'", self.input[self.offset]),
            location.clone(),
        ))
    }
}

pub fn lex(source: &str) -> LexResult<Vec<SrcToken>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.value == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
