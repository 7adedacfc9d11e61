use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticToken {
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Semicolon,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Assign,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl StaticToken {
    pub fn get_str(&self) -> &'static str {
        match self {
            StaticToken::OpenParen => "(",
            StaticToken::CloseParen => ")",
            StaticToken::OpenBrace => "{",
            StaticToken::CloseBrace => "}",
            StaticToken::Comma => ",",
            StaticToken::Semicolon => ";",
            StaticToken::Plus => "+",
            StaticToken::Minus => "-",
            StaticToken::Asterisk => "*",
            StaticToken::Slash => "/",
            StaticToken::Assign => "=",
            StaticToken::Equals => "==",
            StaticToken::NotEquals => "!=",
            StaticToken::LessThan => "<",
            StaticToken::LessThanOrEqual => "<=",
            StaticToken::GreaterThan => ">",
            StaticToken::GreaterThanOrEqual => ">=",
        }
    }

    pub const VALUES: [StaticToken; 17] = [
        StaticToken::OpenParen,
        StaticToken::CloseParen,
        StaticToken::OpenBrace,
        StaticToken::CloseBrace,
        StaticToken::Comma,
        StaticToken::Semicolon,
        StaticToken::Plus,
        StaticToken::Minus,
        StaticToken::Asterisk,
        StaticToken::Slash,
        StaticToken::Assign,
        StaticToken::Equals,
        StaticToken::NotEquals,
        StaticToken::LessThan,
        StaticToken::LessThanOrEqual,
        StaticToken::GreaterThan,
        StaticToken::GreaterThanOrEqual,
    ];

    pub const MAX_LENGTH: usize = 2;
}

impl Display for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.get_str())
    }
}

lazy_static! {
    pub static ref STATIC_TOKEN_MAP: HashMap<&'static str, StaticToken> = StaticToken::VALUES
        .iter()
        .map(|token| (token.get_str(), token.clone()))
        .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Int,
    Return,
    If,
    Else,
    While,
}

impl Keyword {
    pub fn from_str(str: &str) -> Option<Self> {
        match str {
            "int" => Some(Keyword::Int),
            "return" => Some(Keyword::Return),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            _ => None,
        }
    }

    pub fn get_str(&self) -> &'static str {
        match self {
            Keyword::Int => "int",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.get_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Static(StaticToken),
    Identifier(String),
    Number(i32),
    String(String),
    Keyword(Keyword),
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Static(token) => write!(f, "{}", token),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Number(value) => write!(f, "{}", value),
            Token::String(value) => write!(f, "\"{}\"", value),
            Token::Keyword(keyword) => write!(f, "{}", keyword),
            Token::Eof => write!(f, "end of input"),
        }
    }
}
