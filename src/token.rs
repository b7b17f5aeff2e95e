use strum_macros::{Display, EnumIter};

// The discriminant order indexes the parser's rule table; keep them in sync.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[repr(u8)]
pub enum TokenType {
    // Delimiters.
    #[strum(to_string = "(")] LeftParen,
    #[strum(to_string = ")")] RightParen,
    #[strum(to_string = "[")] LeftBracket,
    #[strum(to_string = "]")] RightBracket,
    #[strum(to_string = "{")] LeftBrace,
    #[strum(to_string = "}")] RightBrace,
    #[strum(to_string = ",")] Comma,
    #[strum(to_string = ":")] Colon,

    // Operators.
    #[strum(to_string = "+")] Plus,
    #[strum(to_string = "-")] Minus,
    #[strum(to_string = "*")] Star,
    #[strum(to_string = "/")] Slash,
    #[strum(to_string = "**")] StarStar,
    #[strum(to_string = "!")] Bang,
    #[strum(to_string = "!=")] BangEqual,
    #[strum(to_string = "=")] Equal,
    #[strum(to_string = "==")] EqualEqual,
    #[strum(to_string = "<")] Less,
    #[strum(to_string = "<=")] LessEqual,
    #[strum(to_string = ">")] Greater,
    #[strum(to_string = ">=")] GreaterEqual,
    #[strum(to_string = "+=")] PlusEqual,
    #[strum(to_string = "-=")] MinusEqual,
    #[strum(to_string = "*=")] StarEqual,
    #[strum(to_string = "/=")] SlashEqual,

    // Literals.
    #[strum(to_string = "NAME")] Name,
    #[strum(to_string = "INT")] Int,
    #[strum(to_string = "FLOAT")] Float,
    #[strum(to_string = "STRING")] String,

    // Keywords.
    #[strum(to_string = "def")] Def,
    #[strum(to_string = "if")] If,
    #[strum(to_string = "else")] Else,
    #[strum(to_string = "for")] For,
    #[strum(to_string = "return")] Return,
    #[strum(to_string = "true")] True,
    #[strum(to_string = "false")] False,

    #[strum(to_string = "NEWLINE")] Newline,
    #[strum(to_string = "EOF")] EOF,
}

impl TokenType {
    /// The plain operator behind a compound assignment (`+=` -> `+`).
    pub fn assign_operator(self) -> Option<TokenType> {
        match self {
            TokenType::PlusEqual => Some(TokenType::Plus),
            TokenType::MinusEqual => Some(TokenType::Minus),
            TokenType::StarEqual => Some(TokenType::Star),
            TokenType::SlashEqual => Some(TokenType::Slash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tokentype: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(tokentype: TokenType, lexeme: impl Into<String>, line: usize) -> Token {
        Token {
            tokentype,
            lexeme: lexeme.into(),
            line,
        }
    }
}
