use std::ops::Range;

use crate::parser::error::ParseError;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    // Trivia
    Whitespace,
    Comment,

    // Literals & names
    Ident,
    Int,
    Str,

    // Keywords
    Val,
    Var,
    Def,
    If,
    Else,
    True,
    False,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,       // =
    EqEq,     // ==
    BangEq,   // !=
    Gt,
    Lt,
    GtEq,
    LtEq,
    AmpAmp,   // &&
    PipePipe, // ||
    Bang,     // !
    Colon,
    Comma,
    Dot,
    Semi,

    // Grouping
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

impl TokenKind {
    pub(crate) fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// A token and the byte range it covers.
#[derive(Debug, Clone)]
pub(crate) struct Lexeme {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

// ---------------------------------------------------------------------------
// Text tokenizer: raw text string → Lexeme stream (trivia included)
// ---------------------------------------------------------------------------

pub(crate) fn tokenize(text: &str, file_id: usize) -> Result<Vec<Lexeme>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut lexemes = Vec::new();
    let mut i = 0;

    // Map character indices to byte offsets within the text
    let byte_pos: Vec<usize> = {
        let mut bp = Vec::with_capacity(len + 1);
        let mut offset = 0;
        for c in &chars {
            bp.push(offset);
            offset += c.len_utf8();
        }
        bp.push(offset);
        bp
    };

    while i < len {
        let start = i;
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                while i < len && chars[i].is_whitespace() {
                    i += 1;
                }
                TokenKind::Whitespace
            }

            '/' if i + 1 < len && chars[i + 1] == '/' => {
                while i < len && chars[i] != '\n' {
                    i += 1;
                }
                TokenKind::Comment
            }

            // String literal, backslash escapes
            '"' => {
                i += 1;
                while i < len && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= len {
                    return Err(ParseError::error(
                        "unterminated string literal",
                        byte_pos[start]..byte_pos[len],
                        file_id,
                    ));
                }
                i += 1; // skip closing quote
                TokenKind::Str
            }

            '0'..='9' => {
                while i < len && chars[i].is_ascii_digit() {
                    i += 1;
                }
                TokenKind::Int
            }

            // Identifiers and keywords; `$` is an identifier character
            c if is_ident_start(c) => {
                while i < len && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                keyword(&word).unwrap_or(TokenKind::Ident)
            }

            // Two-character operators
            '=' => two_char(&chars, &mut i, '=', TokenKind::EqEq, TokenKind::Eq),
            '>' => two_char(&chars, &mut i, '=', TokenKind::GtEq, TokenKind::Gt),
            '<' => two_char(&chars, &mut i, '=', TokenKind::LtEq, TokenKind::Lt),
            '!' => two_char(&chars, &mut i, '=', TokenKind::BangEq, TokenKind::Bang),
            '&' | '|' if i + 1 < len && chars[i + 1] == c => {
                i += 2;
                if c == '&' { TokenKind::AmpAmp } else { TokenKind::PipePipe }
            }

            // Single-character operators
            '+' => { i += 1; TokenKind::Plus }
            '-' => { i += 1; TokenKind::Minus }
            '*' => { i += 1; TokenKind::Star }
            '/' => { i += 1; TokenKind::Slash }
            '%' => { i += 1; TokenKind::Percent }
            ':' => { i += 1; TokenKind::Colon }
            ',' => { i += 1; TokenKind::Comma }
            '.' => { i += 1; TokenKind::Dot }
            ';' => { i += 1; TokenKind::Semi }
            '(' => { i += 1; TokenKind::LParen }
            ')' => { i += 1; TokenKind::RParen }
            '{' => { i += 1; TokenKind::LBrace }
            '}' => { i += 1; TokenKind::RBrace }
            '[' => { i += 1; TokenKind::LBracket }
            ']' => { i += 1; TokenKind::RBracket }

            other => {
                return Err(ParseError::error(
                    format!("unexpected character `{}`", other),
                    byte_pos[start]..byte_pos[start + 1],
                    file_id,
                ));
            }
        };
        lexemes.push(Lexeme {
            kind,
            span: byte_pos[start]..byte_pos[i],
        });
    }

    Ok(lexemes)
}

fn two_char(
    chars: &[char],
    i: &mut usize,
    next: char,
    long: TokenKind,
    short: TokenKind,
) -> TokenKind {
    *i += 1;
    if *i < chars.len() && chars[*i] == next {
        *i += 1;
        long
    } else {
        short
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn keyword(word: &str) -> Option<TokenKind> {
    match word {
        "val" => Some(TokenKind::Val),
        "var" => Some(TokenKind::Var),
        "def" => Some(TokenKind::Def),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text, 0)
            .unwrap()
            .into_iter()
            .map(|l| l.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn dollar_is_part_of_identifier() {
        assert_eq!(kinds("placeholder$0"), vec![TokenKind::Ident]);
        assert_eq!(kinds("a$b + 1"), vec![TokenKind::Ident, TokenKind::Plus, TokenKind::Int]);
    }

    #[test]
    fn keywords_and_operators() {
        assert_eq!(
            kinds("val x = a <= b && !c"),
            vec![
                TokenKind::Val,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::LtEq,
                TokenKind::Ident,
                TokenKind::AmpAmp,
                TokenKind::Bang,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn spans_cover_the_whole_input() {
        let text = "f(\"a\\\"b\") // done";
        let lexemes = tokenize(text, 0).unwrap();
        let rebuilt: String = lexemes.iter().map(|l| &text[l.span.clone()]).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(lexemes.last().map(|l| l.kind), Some(TokenKind::Comment));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("\"open", 0).unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!(err.span, 0..5);
    }

    #[test]
    fn lone_ampersand_is_an_error() {
        assert!(tokenize("a & b", 0).is_err());
    }
}
