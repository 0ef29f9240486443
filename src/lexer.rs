//! Converts source text into a token stream.
//!
//! Single-pass, one-character lookahead, mirroring the original `MakeTokens`
//! state machine: skip whitespace/comments, then dispatch on the current
//! character to a number/identifier/string/operator production.

use crate::diagnostic::Diagnostic;
use crate::position::Position;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

const DIGITS: &str = "0123456789";

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_letter_or_digit_or_underscore(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer {
    text: Rc<str>,
    source_name: Rc<str>,
    pos: Position,
    current: Option<char>,
    chars: Vec<char>,
}

impl Lexer {
    pub fn new(source_name: &str, text: &str) -> Self {
        let source_name: Rc<str> = Rc::from(source_name);
        let text: Rc<str> = Rc::from(text);
        let chars: Vec<char> = text.chars().collect();
        let pos = Position::start(source_name.clone(), text.clone());
        let mut lexer = Lexer {
            text,
            source_name,
            pos,
            current: None,
            chars,
        };
        lexer.advance();
        lexer
    }

    fn char_at(&self, index: isize) -> Option<char> {
        if index < 0 {
            return None;
        }
        self.chars.get(index as usize).copied()
    }

    fn advance(&mut self) {
        self.pos.advance(self.current);
        self.current = self.char_at(self.pos.index);
    }

    pub fn make_tokens(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();

        while let Some(c) = self.current {
            match c {
                ' ' | '\t' => self.advance(),
                '#' => self.skip_comment()?,
                '\n' | ';' => {
                    let start = self.pos.clone();
                    self.advance();
                    tokens.push(Token::new(TokenKind::Newline, start.clone(), start));
                }
                c if DIGITS.contains(c) => tokens.push(self.make_number()),
                c if is_letter(c) => tokens.push(self.make_identifier()),
                '"' => tokens.push(self.make_string()?),
                '+' => tokens.push(self.single(TokenKind::Plus)),
                '-' => tokens.push(self.single(TokenKind::Minus)),
                '*' => tokens.push(self.single(TokenKind::Star)),
                '/' => tokens.push(self.single(TokenKind::Slash)),
                '%' => tokens.push(self.single(TokenKind::Percent)),
                '^' => tokens.push(self.single(TokenKind::Pow)),
                '(' => tokens.push(self.single(TokenKind::LParen)),
                ')' => tokens.push(self.single(TokenKind::RParen)),
                '[' => tokens.push(self.single(TokenKind::LBracket)),
                ']' => tokens.push(self.single(TokenKind::RBracket)),
                ',' => tokens.push(self.single(TokenKind::Comma)),
                '!' => tokens.push(self.make_not_equals()),
                '=' => tokens.push(self.make_equals()),
                '<' => tokens.push(self.make_less_than()),
                '>' => tokens.push(self.make_greater_than()),
                '&' => tokens.push(self.make_and()?),
                '|' => tokens.push(self.make_or()?),
                other => {
                    let start = self.pos.clone();
                    self.advance();
                    return Err(Diagnostic::illegal_character(other, start.clone(), self.pos.clone()));
                }
            }
        }

        let end = self.pos.clone();
        tokens.push(Token::new(TokenKind::Eof, end.clone(), end));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos.clone();
        self.advance();
        Token::new(kind, start.clone(), start)
    }

    /// `#` starts a line comment terminated by `\n`/`;`/EOF. `#=` starts a
    /// block comment terminated by `=#` (or silently by EOF).
    fn skip_comment(&mut self) -> Result<(), Diagnostic> {
        self.advance();
        if self.current == Some('=') {
            self.advance();
            loop {
                match self.current {
                    None => break,
                    Some('=') => {
                        self.advance();
                        if self.current == Some('#') {
                            self.advance();
                            break;
                        }
                    }
                    Some(_) => self.advance(),
                }
            }
        } else {
            while !matches!(self.current, None | Some('\n') | Some(';')) {
                self.advance();
            }
        }
        Ok(())
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();
        let mut dot_count = 0;

        while let Some(c) = self.current {
            if DIGITS.contains(c) {
                text.push(c);
                self.advance();
            } else if c == '.' {
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
                text.push('.');
                self.advance();
            } else {
                break;
            }
        }

        let value: f64 = text.parse().unwrap_or(0.0);
        Token::new(TokenKind::Number(value), start, self.pos.clone())
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.clone();
        let mut text = String::new();

        while let Some(c) = self.current {
            if is_letter_or_digit_or_underscore(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let end = self.pos.clone();
        if Token::is_keyword(&text) {
            Token::new(TokenKind::Keyword(text), start, end)
        } else {
            Token::new(TokenKind::Identifier(text), start, end)
        }
    }

    fn make_string(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos.clone();
        self.advance();
        let mut text = String::new();
        let mut escape = false;

        while let Some(c) = self.current {
            if escape {
                text.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    other => other,
                });
                escape = false;
                self.advance();
                continue;
            }
            if c == '\\' {
                escape = true;
                self.advance();
                continue;
            }
            if c == '"' {
                break;
            }
            text.push(c);
            self.advance();
        }

        if self.current != Some('"') {
            return Err(Diagnostic::unterminated_string(start.clone(), self.pos.clone()));
        }
        self.advance();
        Ok(Token::new(TokenKind::String(text), start, self.pos.clone()))
    }

    fn make_not_equals(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            return Token::new(TokenKind::NotEquals, start, self.pos.clone());
        }
        Token::new(TokenKind::Not, start.clone(), start)
    }

    fn make_equals(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            return Token::new(TokenKind::EqualsEquals, start, self.pos.clone());
        }
        Token::new(TokenKind::Equals, start.clone(), start)
    }

    fn make_less_than(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            return Token::new(TokenKind::LessEquals, start, self.pos.clone());
        }
        Token::new(TokenKind::LessThan, start.clone(), start)
    }

    fn make_greater_than(&mut self) -> Token {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            return Token::new(TokenKind::GreaterEquals, start, self.pos.clone());
        }
        Token::new(TokenKind::GreaterThan, start.clone(), start)
    }

    fn make_and(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('&') {
            self.advance();
            return Ok(Token::new(TokenKind::And, start, self.pos.clone()));
        }
        Err(Diagnostic::expected_character('&', start, self.pos.clone()))
    }

    fn make_or(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos.clone();
        self.advance();
        if self.current == Some('|') {
            self.advance();
            return Ok(Token::new(TokenKind::Or, start, self.pos.clone()));
        }
        Err(Diagnostic::expected_character('|', start, self.pos.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("<test>", src)
            .make_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("1 + 2 * 3"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Number(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_keyword_vs_identifier() {
        assert_eq!(
            kinds("var x"),
            vec![
                TokenKind::Keyword("var".to_string()),
                TokenKind::Identifier("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::String("a\nb".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::new("<test>", "\"abc").make_tokens().is_err());
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(
            kinds("1 # comment\n2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Newline,
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_comment_is_skipped() {
        assert_eq!(
            kinds("1 #= block =# 2"),
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
        );
    }

    #[test]
    fn lone_ampersand_is_expected_character_error() {
        assert!(Lexer::new("<test>", "1 & 2").make_tokens().is_err());
    }

    #[test]
    fn illegal_character_is_rejected() {
        assert!(Lexer::new("<test>", "@").make_tokens().is_err());
    }
}
