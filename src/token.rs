use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
  If,
  Then,
  Else,
  Lambda,
  /// `λ`, same meaning as `lambda`.
  LambdaGlyph,
  True,
  False,
}

impl Keyword {
  pub fn from_identifier(identifier: &str) -> Option<Keyword> {
    match identifier {
      "if" => Some(Keyword::If),
      "then" => Some(Keyword::Then),
      "else" => Some(Keyword::Else),
      "lambda" => Some(Keyword::Lambda),
      "λ" => Some(Keyword::LambdaGlyph),
      "true" => Some(Keyword::True),
      "false" => Some(Keyword::False),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Keyword::If => "if",
      Keyword::Then => "then",
      Keyword::Else => "else",
      Keyword::Lambda => "lambda",
      Keyword::LambdaGlyph => "λ",
      Keyword::True => "true",
      Keyword::False => "false",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
  Comma,
  Semicolon,
  LeftParen,
  RightParen,
  LeftBrace,
  RightBrace,
  LeftBracket,
  RightBracket,
}

impl Punctuation {
  pub fn from_char(c: char) -> Option<Punctuation> {
    match c {
      ',' => Some(Punctuation::Comma),
      ';' => Some(Punctuation::Semicolon),
      '(' => Some(Punctuation::LeftParen),
      ')' => Some(Punctuation::RightParen),
      '{' => Some(Punctuation::LeftBrace),
      '}' => Some(Punctuation::RightBrace),
      '[' => Some(Punctuation::LeftBracket),
      ']' => Some(Punctuation::RightBracket),
      _ => None,
    }
  }

  pub fn as_char(&self) -> char {
    match self {
      Punctuation::Comma => ',',
      Punctuation::Semicolon => ';',
      Punctuation::LeftParen => '(',
      Punctuation::RightParen => ')',
      Punctuation::LeftBrace => '{',
      Punctuation::RightBrace => '}',
      Punctuation::LeftBracket => '[',
      Punctuation::RightBracket => ']',
    }
  }
}

/// Operator tokens keep their raw text: the lexer groups any run of operator
/// characters, and only the parser decides whether the run means anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
  String(String),
  Number(f64),
  Identifier(String),
  Keyword(Keyword),
  Punctuation(Punctuation),
  Operator(String),
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Token::String(s) => write!(f, "string {:?}", s),
      Token::Number(n) => write!(f, "number {}", n),
      Token::Identifier(name) => write!(f, "identifier {}", name),
      Token::Keyword(keyword) => write!(f, "keyword {}", keyword.as_str()),
      Token::Punctuation(p) => write!(f, "punctuation \"{}\"", p.as_char()),
      Token::Operator(op) => write!(f, "operator \"{}\"", op),
    }
  }
}
