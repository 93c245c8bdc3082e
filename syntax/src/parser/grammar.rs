use crate::parser::error::ParseError;
use crate::parser::lexer::{Lexeme, TokenKind};
use crate::tree::SyntaxKind;
use crate::tree::builder::{Checkpoint, TreeBuilder};

// Binding powers (precedence). Higher = tighter binding.
// Left bp, right bp. For left-assoc: right = left + 1.
const BP_OR: u8 = 4;              // ||
const BP_AND: u8 = 6;             // &&
const BP_EQUALITY: u8 = 8;        // == !=
const BP_COMPARISON: u8 = 10;     // < > <= >=
const BP_ADDITIVE: u8 = 12;       // + -
const BP_MULTIPLICATIVE: u8 = 14; // * / %
const BP_UNARY: u8 = 16;          // ! -

/// Recursive-descent parser over a lexeme stream. Trivia is attached to
/// whichever node is open when the next significant token is consumed.
pub(crate) struct SyntaxParser<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
    builder: TreeBuilder,
    file_id: usize,
}

impl<'a> SyntaxParser<'a> {
    pub(crate) fn new(source: &'a str, lexemes: Vec<Lexeme>, file_id: usize) -> Self {
        SyntaxParser {
            source,
            lexemes,
            pos: 0,
            builder: TreeBuilder::new(SyntaxKind::File),
            file_id,
        }
    }

    pub(crate) fn into_builder(self) -> TreeBuilder {
        self.builder
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn significant(&self, n: usize) -> Option<&Lexeme> {
        self.lexemes[self.pos..]
            .iter()
            .filter(|l| !l.kind.is_trivia())
            .nth(n)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.significant(n).map(|l| l.kind)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn skip_trivia(&mut self) {
        while let Some(lexeme) = self.lexemes.get(self.pos) {
            if !lexeme.kind.is_trivia() {
                break;
            }
            self.builder.leaf(SyntaxKind::Trivia, &self.source[lexeme.span.clone()]);
            self.pos += 1;
        }
    }

    fn bump(&mut self) {
        self.skip_trivia();
        if let Some(lexeme) = self.lexemes.get(self.pos) {
            self.builder.leaf(SyntaxKind::Token, &self.source[lexeme.span.clone()]);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.skip_trivia();
        self.builder.start_node(kind);
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        match self.significant(0) {
            Some(lexeme) => ParseError::error(msg, lexeme.span.clone(), self.file_id)
                .with_note(format!("found `{}`", &self.source[lexeme.span.clone()])),
            None => {
                let end = self.source.len();
                ParseError::error(msg, end..end, self.file_id).with_note("found end of input")
            }
        }
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub(crate) fn parse_file(&mut self) -> Result<(), ParseError> {
        self.parse_items(None)?;
        self.skip_trivia();
        Ok(())
    }

    /// Parse items until `end` (or end of input when `end` is `None`).
    fn parse_items(&mut self, end: Option<TokenKind>) -> Result<(), ParseError> {
        loop {
            while self.eat(TokenKind::Semi) {}
            match self.peek() {
                None => break,
                Some(kind) if Some(kind) == end => break,
                Some(_) => self.parse_item()?,
            }
        }
        Ok(())
    }

    fn parse_item(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(TokenKind::Val) | Some(TokenKind::Var) => self.parse_val_decl(),
            Some(TokenKind::Def) => self.parse_def_decl(),
            _ => self.parse_expr(0),
        }
    }

    fn parse_val_decl(&mut self) -> Result<(), ParseError> {
        self.start(SyntaxKind::ValDecl);
        self.bump(); // val | var
        self.parse_name()?;
        if self.eat(TokenKind::Colon) {
            self.parse_type()?;
        }
        if self.eat(TokenKind::Eq) {
            self.parse_expr(0)?;
        }
        self.finish();
        Ok(())
    }

    fn parse_def_decl(&mut self) -> Result<(), ParseError> {
        self.start(SyntaxKind::DefDecl);
        self.bump(); // def
        self.parse_name()?;
        self.parse_param_list()?;
        if self.eat(TokenKind::Colon) {
            self.parse_type()?;
        }
        self.expect(TokenKind::Eq, "`=` before function body")?;
        self.parse_expr(0)?;
        self.finish();
        Ok(())
    }

    fn parse_param_list(&mut self) -> Result<(), ParseError> {
        self.start(SyntaxKind::ParamList);
        self.expect(TokenKind::LParen, "`(` to open parameter list")?;
        self.parse_comma_separated(TokenKind::RParen, "`,` or `)` in parameter list", |p| {
            p.start(SyntaxKind::Param);
            p.parse_name()?;
            if p.eat(TokenKind::Colon) {
                p.parse_type()?;
            }
            p.finish();
            Ok(())
        })?;
        self.finish();
        Ok(())
    }

    /// Parse `elem (, elem)*` up to and including the closing token.
    fn parse_comma_separated(
        &mut self,
        close: TokenKind,
        what: &str,
        mut elem: impl FnMut(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        if self.eat(close) {
            return Ok(());
        }
        loop {
            elem(self)?;
            if self.eat(close) {
                return Ok(());
            }
            self.expect(TokenKind::Comma, what)?;
        }
    }

    fn parse_name(&mut self) -> Result<(), ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error("expected identifier"));
        }
        self.start(SyntaxKind::Name);
        self.bump();
        self.finish();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<(), ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error("expected type"));
        }
        self.start(SyntaxKind::Type);
        self.bump();
        if self.at(TokenKind::LBracket) {
            self.start(SyntaxKind::TypeArgs);
            self.bump();
            if self.at(TokenKind::RBracket) {
                return Err(self.error("expected type argument"));
            }
            self.parse_comma_separated(TokenKind::RBracket, "`,` or `]` in type arguments", |p| {
                p.parse_type()
            })?;
            self.finish();
        }
        self.finish();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pratt parser core
    // ------------------------------------------------------------------

    fn parse_expr(&mut self, min_bp: u8) -> Result<(), ParseError> {
        let checkpoint = self.checkpoint();
        self.parse_prefix()?;

        loop {
            let Some(kind) = self.peek() else { break };

            // Postfix forms bind tighter than any infix operator
            match kind {
                TokenKind::LParen => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::Call);
                    self.parse_arg_list()?;
                    self.finish();
                    continue;
                }
                TokenKind::Dot => {
                    self.builder.start_node_at(checkpoint, SyntaxKind::Member);
                    self.bump();
                    self.parse_name()?;
                    self.finish();
                    continue;
                }
                _ => {}
            }

            let Some((l_bp, r_bp)) = infix_bp(kind) else { break };
            if l_bp < min_bp {
                break;
            }

            self.builder.start_node_at(checkpoint, SyntaxKind::Binary);
            self.bump();
            self.parse_expr(r_bp)?;
            self.finish();
        }

        Ok(())
    }

    fn parse_prefix(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(TokenKind::Ident) => self.parse_name(),

            Some(TokenKind::Int | TokenKind::Str | TokenKind::True | TokenKind::False) => {
                self.start(SyntaxKind::Literal);
                self.bump();
                self.finish();
                Ok(())
            }

            Some(TokenKind::Bang | TokenKind::Minus) => {
                self.start(SyntaxKind::Unary);
                self.bump();
                self.parse_expr(BP_UNARY)?;
                self.finish();
                Ok(())
            }

            Some(TokenKind::LParen) => {
                self.start(SyntaxKind::Paren);
                self.bump();
                self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "`)`")?;
                self.finish();
                Ok(())
            }

            Some(TokenKind::LBrace) => {
                self.start(SyntaxKind::Block);
                self.bump();
                self.parse_items(Some(TokenKind::RBrace))?;
                self.expect(TokenKind::RBrace, "`}` to close block")?;
                self.finish();
                Ok(())
            }

            Some(TokenKind::If) => {
                self.start(SyntaxKind::If);
                self.bump();
                self.expect(TokenKind::LParen, "`(` after `if`")?;
                self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "`)` after condition")?;
                self.parse_expr(0)?;
                if self.eat(TokenKind::Else) {
                    self.parse_expr(0)?;
                }
                self.finish();
                Ok(())
            }

            _ => Err(self.error("expected expression")),
        }
    }

    fn parse_arg_list(&mut self) -> Result<(), ParseError> {
        self.start(SyntaxKind::ArgList);
        self.bump(); // (
        self.parse_comma_separated(TokenKind::RParen, "`,` or `)` in argument list", |p| {
            p.parse_expr(0)
        })?;
        self.finish();
        Ok(())
    }
}

/// Infix binding powers: returns (left_bp, right_bp) or None if not infix.
fn infix_bp(kind: TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::PipePipe => Some((BP_OR, BP_OR + 1)),
        TokenKind::AmpAmp => Some((BP_AND, BP_AND + 1)),
        TokenKind::EqEq | TokenKind::BangEq => Some((BP_EQUALITY, BP_EQUALITY + 1)),
        TokenKind::Gt | TokenKind::Lt | TokenKind::GtEq | TokenKind::LtEq => {
            Some((BP_COMPARISON, BP_COMPARISON + 1))
        }
        TokenKind::Plus | TokenKind::Minus => Some((BP_ADDITIVE, BP_ADDITIVE + 1)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
            Some((BP_MULTIPLICATIVE, BP_MULTIPLICATIVE + 1))
        }
        _ => None,
    }
}
