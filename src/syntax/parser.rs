//! Recursive-descent parser for recipe files.

use miette::NamedSource;

use crate::syntax::ast::{
    Assign, AssignOp, Atom, CmpOp, CondExpr, File, IfStmt, ListExpr, SettingStmt, Span, Stmt,
    TargetStmt, TemplateStmt, Word,
};
use crate::syntax::lexer::{Lexer, Token, TokenKind};
use crate::util::diagnostic::RecipeError;

/// Keywords that open a target declaration.
pub const TARGET_KEYWORDS: &[&str] = &["program", "library", "shared-library", "external", "action"];

/// Parse recipe text into an AST.
///
/// `src_name` is used for diagnostics only; it is usually the file path.
pub fn parse_str(src_name: &str, text: &str) -> Result<File, RecipeError> {
    let tokens = Lexer::new(src_name, text).tokenize()?;
    let mut parser = Parser {
        src_name: src_name.to_string(),
        text: text.to_string(),
        tokens,
        pos: 0,
    };
    parser.parse_file()
}

struct Parser {
    src_name: String,
    text: String,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>, span: Span) -> RecipeError {
        RecipeError::Syntax {
            message: message.into(),
            src: NamedSource::new(&self.src_name, self.text.clone()),
            span: span.into(),
            label: "here".to_string(),
        }
    }

    fn unexpected(&self, expected: &str) -> RecipeError {
        let token = self.peek();
        self.error(
            format!("expected {}, found {}", expected, token.kind.describe()),
            token.span,
        )
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, RecipeError> {
        if self.peek().kind == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Take a bare-word token, e.g. a name or keyword.
    fn expect_word(&mut self, expected: &str) -> Result<(String, Span), RecipeError> {
        match &self.peek().kind {
            TokenKind::Word(text) => {
                let text = text.clone();
                let span = self.peek().span;
                self.bump();
                Ok((text, span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_file(&mut self) -> Result<File, RecipeError> {
        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::Eof {
            statements.push(self.parse_stmt()?);
        }
        Ok(File { statements })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, RecipeError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Word(word) => {
                let next = &self.peek_ahead(1).kind;
                match word.as_str() {
                    "if" if *next == TokenKind::LParen => self.parse_if(),
                    "template" if matches!(next, TokenKind::Word(_)) => self.parse_template(),
                    "setting" if matches!(next, TokenKind::Word(_)) => self.parse_setting(),
                    "submodule" => self.parse_submodule(),
                    kw if TARGET_KEYWORDS.contains(&kw) && matches!(next, TokenKind::Word(_)) => {
                        self.parse_target()
                    }
                    _ => self.parse_assign_or_fileblock(),
                }
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_assign_or_fileblock(&mut self) -> Result<Stmt, RecipeError> {
        let (name, name_span) = self.expect_word("a property or variable name")?;

        match self.peek().kind {
            TokenKind::Assign | TokenKind::Append => {
                let op = if self.bump().kind == TokenKind::Assign {
                    AssignOp::Set
                } else {
                    AssignOp::Append
                };
                let value = self.parse_value()?;
                let semi = self.expect(TokenKind::Semi, "`;` after assignment")?;
                Ok(Stmt::Assign(Assign {
                    name,
                    name_span,
                    op,
                    value,
                    span: name_span.join(semi.span),
                }))
            }
            TokenKind::LBrace => {
                // File-list block: `sources { a.c b.c }`, an append.
                self.bump();
                let mut words = Vec::new();
                while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
                    words.push(self.parse_word("a file name or `}`")?);
                }
                let close = self.expect(TokenKind::RBrace, "`}` to close the block")?;
                let span = name_span.join(close.span);
                let value_span = words
                    .iter()
                    .map(|w: &Word| w.span)
                    .reduce(Span::join)
                    .unwrap_or(span);
                Ok(Stmt::Assign(Assign {
                    name,
                    name_span,
                    op: AssignOp::Append,
                    value: ListExpr {
                        words,
                        span: value_span,
                    },
                    span,
                }))
            }
            _ => Err(self.unexpected("`=`, `+=`, or `{`")),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, RecipeError> {
        let (_, if_span) = self.expect_word("`if`")?;
        self.expect(TokenKind::LParen, "`(` after `if`")?;
        let cond = self.parse_cond()?;
        self.expect(TokenKind::RParen, "`)` to close the condition")?;

        let mut body = Vec::new();
        let end_span;
        if self.peek().kind == TokenKind::LBrace {
            self.bump();
            while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
                body.push(self.parse_stmt()?);
            }
            end_span = self.expect(TokenKind::RBrace, "`}` to close the `if` body")?.span;
        } else {
            let stmt = self.parse_stmt()?;
            end_span = match &stmt {
                Stmt::Assign(a) => a.span,
                Stmt::If(i) => i.span,
                _ => if_span,
            };
            body.push(stmt);
        }

        Ok(Stmt::If(IfStmt {
            cond,
            body,
            span: if_span.join(end_span),
        }))
    }

    fn parse_target(&mut self) -> Result<Stmt, RecipeError> {
        let (kind, kind_span) = self.expect_word("a target kind")?;
        let (name, name_span) = self.expect_word("a target name")?;
        let bases = self.parse_bases()?;

        self.expect(TokenKind::LBrace, "`{` to open the target body")?;
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "`}` to close the target body")?;

        Ok(Stmt::Target(TargetStmt {
            kind,
            kind_span,
            name,
            name_span,
            bases,
            body,
            span: kind_span.join(close.span),
        }))
    }

    fn parse_template(&mut self) -> Result<Stmt, RecipeError> {
        let (_, kw_span) = self.expect_word("`template`")?;
        let (name, name_span) = self.expect_word("a template name")?;
        let bases = self.parse_bases()?;

        self.expect(TokenKind::LBrace, "`{` to open the template body")?;
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "`}` to close the template body")?;

        Ok(Stmt::Template(TemplateStmt {
            name,
            name_span,
            bases,
            body,
            span: kw_span.join(close.span),
        }))
    }

    fn parse_setting(&mut self) -> Result<Stmt, RecipeError> {
        let (_, kw_span) = self.expect_word("`setting`")?;
        let (name, name_span) = self.expect_word("a setting name")?;

        self.expect(TokenKind::LBrace, "`{` to open the setting body")?;
        let mut body = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        let close = self.expect(TokenKind::RBrace, "`}` to close the setting body")?;

        Ok(Stmt::Setting(SettingStmt {
            name,
            name_span,
            body,
            span: kw_span.join(close.span),
        }))
    }

    fn parse_submodule(&mut self) -> Result<Stmt, RecipeError> {
        let (_, kw_span) = self.expect_word("`submodule`")?;
        let word = self.parse_word("a recipe file path")?;
        let Some(path) = word.as_literal() else {
            return Err(self.error(
                "submodule path cannot contain variable references",
                word.span,
            ));
        };
        let path = path.to_string();
        let semi = self.expect(TokenKind::Semi, "`;` after submodule path")?;
        Ok(Stmt::Submodule {
            path,
            span: kw_span.join(semi.span),
        })
    }

    fn parse_bases(&mut self) -> Result<Vec<(String, Span)>, RecipeError> {
        let mut bases = Vec::new();
        if self.peek().kind == TokenKind::Colon {
            self.bump();
            loop {
                bases.push(self.expect_word("a template name")?);
                if self.peek().kind == TokenKind::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        Ok(bases)
    }

    /// Parse words until `;` (not consumed).
    fn parse_value(&mut self) -> Result<ListExpr, RecipeError> {
        let mut words = Vec::new();
        let start = self.peek().span;
        while matches!(
            self.peek().kind,
            TokenKind::Word(_) | TokenKind::Quoted(_) | TokenKind::Ref(_)
        ) {
            words.push(self.parse_word("a value")?);
        }
        let span = words
            .iter()
            .map(|w| w.span)
            .reduce(Span::join)
            .unwrap_or(Span::new(start.offset, 0));
        Ok(ListExpr { words, span })
    }

    /// Parse one word, merging adjacent atoms (`pre$(x).c` is one word).
    fn parse_word(&mut self, expected: &str) -> Result<Word, RecipeError> {
        let mut atoms = Vec::new();
        let mut span = match &self.peek().kind {
            TokenKind::Word(_) | TokenKind::Quoted(_) | TokenKind::Ref(_) => self.peek().span,
            _ => return Err(self.unexpected(expected)),
        };

        loop {
            let token = self.peek();
            let adjacent = atoms.is_empty() || token.span.offset == span.end();
            if !adjacent {
                break;
            }
            match &token.kind {
                TokenKind::Word(text) => atoms.push(Atom::Text(text.clone())),
                TokenKind::Quoted(text) => atoms.push(Atom::Text(text.clone())),
                TokenKind::Ref(name) => atoms.push(Atom::Ref(name.clone())),
                _ => break,
            }
            span = span.join(token.span);
            self.bump();
        }

        // Merge neighboring text atoms produced by quoting.
        let mut merged: Vec<Atom> = Vec::new();
        for atom in atoms {
            match (merged.last_mut(), atom) {
                (Some(Atom::Text(prev)), Atom::Text(next)) => prev.push_str(&next),
                (_, atom) => merged.push(atom),
            }
        }

        Ok(Word {
            atoms: merged,
            span,
        })
    }

    // Conditions: `!` binds tightest, then `&&`, then `||`.

    fn parse_cond(&mut self) -> Result<CondExpr, RecipeError> {
        let mut lhs = self.parse_cond_and()?;
        while self.peek().kind == TokenKind::OrOr {
            self.bump();
            let rhs = self.parse_cond_and()?;
            lhs = CondExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cond_and(&mut self) -> Result<CondExpr, RecipeError> {
        let mut lhs = self.parse_cond_unary()?;
        while self.peek().kind == TokenKind::AndAnd {
            self.bump();
            let rhs = self.parse_cond_unary()?;
            lhs = CondExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_cond_unary(&mut self) -> Result<CondExpr, RecipeError> {
        match self.peek().kind {
            TokenKind::Bang => {
                self.bump();
                Ok(CondExpr::Not(Box::new(self.parse_cond_unary()?)))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_cond()?;
                self.expect(TokenKind::RParen, "`)` to close the group")?;
                Ok(inner)
            }
            _ => {
                let lhs = self.parse_word("a condition operand")?;
                match self.peek().kind {
                    TokenKind::EqEq => {
                        self.bump();
                        let rhs = self.parse_word("a comparison operand")?;
                        Ok(CondExpr::Cmp {
                            lhs,
                            op: CmpOp::Eq,
                            rhs,
                        })
                    }
                    TokenKind::NotEq => {
                        self.bump();
                        let rhs = self.parse_word("a comparison operand")?;
                        Ok(CondExpr::Cmp {
                            lhs,
                            op: CmpOp::Ne,
                            rhs,
                        })
                    }
                    _ => Ok(CondExpr::Atom(lhs)),
                }
            }
        }
    }
}
