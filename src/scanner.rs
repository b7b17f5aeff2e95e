use crate::token::{Token, TokenType};
use phf::phf_map;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}] Error: unexpected character {character:?}")]
pub struct ScanError {
    pub character: char,
    pub line: usize,
}

/// Produces tokens one at a time. Indentation of the current line is tracked
/// on the side and read by the parser through [`Scanner::depth`].
pub struct Scanner {
    iter: Peekable<IntoIter<char>>,
    line: usize,
    depth: usize,
    line_start: bool,
}

/// Scans the whole source eagerly, stopping at EOF (included) or the first
/// unexpected character.
pub fn scan_tokens(source: &str) -> Result<Vec<(Token, usize)>, ScanError> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.tokentype == TokenType::EOF;
        tokens.push((token, scanner.depth()));
        if done {
            return Ok(tokens);
        }
    }
}

impl Scanner {
    pub fn new(source: &str) -> Scanner {
        Scanner {
            iter: source.chars().collect::<Vec<char>>().into_iter().peekable(),
            line: 1,
            depth: 0,
            line_start: true,
        }
    }

    /// Leading whitespace width of the line the last token came from.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        let token = self.scan_token()?;
        trace!(
            line = token.line,
            depth = self.depth,
            "{} {:?}",
            token.tokentype,
            token.lexeme
        );
        Ok(token)
    }

    fn scan_token(&mut self) -> Result<Token, ScanError> {
        loop {
            if self.line_start && !self.start_line() {
                continue;
            }
            let c = match self.iter.next() {
                None => return Ok(self.eof()),
                Some(c) => c,
            };
            let token = match c {
                ' ' | '\t' | '\r' => continue,
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\n' => {
                    let token = self.token(TokenType::Newline, "\n");
                    self.line += 1;
                    self.line_start = true;
                    token
                }
                '(' => self.token(TokenType::LeftParen, "("),
                ')' => self.token(TokenType::RightParen, ")"),
                '[' => self.token(TokenType::LeftBracket, "["),
                ']' => self.token(TokenType::RightBracket, "]"),
                '{' => self.token(TokenType::LeftBrace, "{"),
                '}' => self.token(TokenType::RightBrace, "}"),
                ',' => self.token(TokenType::Comma, ","),
                ':' => self.token(TokenType::Colon, ":"),
                '+' => self.either('=', TokenType::PlusEqual, TokenType::Plus),
                '-' => self.either('=', TokenType::MinusEqual, TokenType::Minus),
                '/' => self.either('=', TokenType::SlashEqual, TokenType::Slash),
                '!' => self.either('=', TokenType::BangEqual, TokenType::Bang),
                '=' => self.either('=', TokenType::EqualEqual, TokenType::Equal),
                '<' => self.either('=', TokenType::LessEqual, TokenType::Less),
                '>' => self.either('=', TokenType::GreaterEqual, TokenType::Greater),
                '*' => {
                    if self.next_if('*') {
                        self.token(TokenType::StarStar, "**")
                    } else {
                        self.either('=', TokenType::StarEqual, TokenType::Star)
                    }
                }
                '"' => self.string(),
                '0'..='9' => self.number(c),
                'a'..='z' | 'A'..='Z' | '_' => self.identifier(c),
                _ => {
                    return Err(ScanError {
                        character: c,
                        line: self.line,
                    })
                }
            };
            return Ok(token);
        }
    }

    /// Measures the indentation of a fresh line. Returns false when the line
    /// turned out blank (or comment only) and was consumed.
    fn start_line(&mut self) -> bool {
        let mut width = 0;
        while let Some(c) = self.iter.peek() {
            match c {
                ' ' | '\t' => width += 1,
                '\r' => (),
                _ => break,
            }
            self.iter.next();
        }
        match self.iter.peek() {
            Some('\n') => {
                self.iter.next();
                self.line += 1;
                false
            }
            Some('#') => {
                self.skip_comment();
                false
            }
            None => {
                self.line_start = false;
                true
            }
            Some(_) => {
                self.depth = width;
                self.line_start = false;
                true
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.iter.peek() {
            if *c == '\n' {
                break;
            }
            self.iter.next();
        }
    }

    fn eof(&mut self) -> Token {
        self.depth = 0;
        self.token(TokenType::EOF, "")
    }

    fn token(&self, tokentype: TokenType, lexeme: impl Into<String>) -> Token {
        Token::new(tokentype, lexeme, self.line)
    }

    fn either(&mut self, expected: char, matched: TokenType, single: TokenType) -> Token {
        if self.next_if(expected) {
            self.token(matched, matched.to_string())
        } else {
            self.token(single, single.to_string())
        }
    }

    fn next_if(&mut self, expected: char) -> bool {
        self.iter.next_if_eq(&expected).is_some()
    }

    // Ends at the closing quote, a newline (left for the next token) or end of
    // input; an unterminated string is cut short rather than rejected.
    fn string(&mut self) -> Token {
        let mut value = String::new();
        while let Some(c) = self.iter.peek() {
            match c {
                '"' => {
                    self.iter.next();
                    break;
                }
                '\n' => break,
                _ => {
                    value.push(*c);
                    self.iter.next();
                }
            }
        }
        self.token(TokenType::String, value)
    }

    // A second '.' ends the literal and is dropped.
    fn number(&mut self, first: char) -> Token {
        let mut lexeme = first.to_string();
        let mut seen_dot = false;
        while let Some(&c) = self.iter.peek() {
            match c {
                '0'..='9' => lexeme.push(c),
                '.' if !seen_dot => {
                    seen_dot = true;
                    lexeme.push(c);
                }
                '.' => {
                    self.iter.next();
                    break;
                }
                _ => break,
            }
            self.iter.next();
        }
        if seen_dot {
            self.token(TokenType::Float, lexeme)
        } else {
            self.token(TokenType::Int, lexeme)
        }
    }

    fn identifier(&mut self, first: char) -> Token {
        let mut lexeme = first.to_string();
        while let Some(&c) = self.iter.peek() {
            match c {
                '0'..='9' | 'a'..='z' | 'A'..='Z' | '_' => {
                    lexeme.push(c);
                    self.iter.next();
                }
                _ => break,
            }
        }
        match KEYWORDS.get(lexeme.as_str()) {
            None => self.token(TokenType::Name, lexeme),
            Some(keyword) => self.token(*keyword, lexeme),
        }
    }
}

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "def" => TokenType::Def,
    "if" => TokenType::If,
    "else" => TokenType::Else,
    "for" => TokenType::For,
    "return" => TokenType::Return,
    "true" => TokenType::True,
    "false" => TokenType::False,
};
