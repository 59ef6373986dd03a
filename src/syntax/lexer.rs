//! Lexer for recipe files.
//!
//! Produces a flat token stream with byte spans. Concatenation of
//! adjacent words/references (`BUILT_WITH_$(toolset)`) is resolved in
//! the parser by checking span adjacency, so the lexer stays simple.

use miette::NamedSource;

use crate::syntax::ast::Span;
use crate::util::diagnostic::RecipeError;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word: identifiers, file names, glob patterns, flags.
    Word(String),
    /// Quoted string contents, escapes already processed.
    Quoted(String),
    /// `$(name)` or `$name` variable reference.
    Ref(String),

    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
    Colon,
    Comma,
    Assign,
    Append,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,

    Eof,
}

impl TokenKind {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Word(w) => format!("`{}`", w),
            TokenKind::Quoted(_) => "string".to_string(),
            TokenKind::Ref(name) => format!("`$({})`", name),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::Semi => "`;`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Assign => "`=`".to_string(),
            TokenKind::Append => "`+=`".to_string(),
            TokenKind::EqEq => "`==`".to_string(),
            TokenKind::NotEq => "`!=`".to_string(),
            TokenKind::AndAnd => "`&&`".to_string(),
            TokenKind::OrOr => "`||`".to_string(),
            TokenKind::Bang => "`!`".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Characters allowed in bare words. Covers identifiers, relative
/// paths, glob patterns, and compiler flags like `-Wall`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '*' | '?' | '[' | ']' | '@')
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

pub struct Lexer<'a> {
    src_name: String,
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src_name: impl Into<String>, text: &'a str) -> Self {
        Lexer {
            src_name: src_name.into(),
            text,
            chars: text.char_indices().collect(),
            pos: 0,
        }
    }

    /// Tokenize the whole input, appending a final Eof token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, RecipeError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(off, _)| off)
            .unwrap_or(self.text.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, message: impl Into<String>, span: Span) -> RecipeError {
        RecipeError::Syntax {
            message: message.into(),
            src: NamedSource::new(&self.src_name, self.text.to_string()),
            span: span.into(),
            label: "here".to_string(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), RecipeError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek2() == Some('*') => {
                    let start = self.offset();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek() == Some('/') {
                            self.bump();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(
                            self.error("unterminated block comment", Span::new(start, 2))
                        );
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, RecipeError> {
        self.skip_trivia()?;

        let start = self.offset();
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, 0),
            });
        };

        let kind = match c {
            '{' => {
                self.bump();
                TokenKind::LBrace
            }
            '}' => {
                self.bump();
                TokenKind::RBrace
            }
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            ';' => {
                self.bump();
                TokenKind::Semi
            }
            ':' => {
                self.bump();
                TokenKind::Colon
            }
            ',' => {
                self.bump();
                TokenKind::Comma
            }
            '=' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '&' => {
                self.bump();
                if self.peek() == Some('&') {
                    self.bump();
                    TokenKind::AndAnd
                } else {
                    return Err(self.error("expected `&&`", Span::new(start, 1)));
                }
            }
            '|' => {
                self.bump();
                if self.peek() == Some('|') {
                    self.bump();
                    TokenKind::OrOr
                } else {
                    return Err(self.error("expected `||`", Span::new(start, 1)));
                }
            }
            '+' => {
                if self.peek2() == Some('=') {
                    self.bump();
                    self.bump();
                    TokenKind::Append
                } else {
                    self.lex_word()
                }
            }
            '"' => self.lex_quoted(start)?,
            '$' => self.lex_ref(start)?,
            c if is_word_char(c) => self.lex_word(),
            other => {
                return Err(self.error(
                    format!("unexpected character `{}`", other),
                    Span::new(start, other.len_utf8()),
                ));
            }
        };

        let end = self.offset();
        Ok(Token {
            kind,
            span: Span::new(start, end - start),
        })
    }

    fn lex_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            // `+` continues a word (`c++`), except when starting `+=`.
            let continues = is_word_char(c) || (c == '+' && self.peek2() != Some('='));
            if !continues {
                break;
            }
            word.push(c);
            self.bump();
        }
        TokenKind::Word(word)
    }

    fn lex_quoted(&mut self, start: usize) -> Result<TokenKind, RecipeError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::Quoted(value)),
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        return Err(self.error("unterminated string", Span::new(start, 1)));
                    }
                },
                Some('\n') | None => {
                    return Err(self.error("unterminated string", Span::new(start, 1)));
                }
                Some(other) => value.push(other),
            }
        }
    }

    fn lex_ref(&mut self, start: usize) -> Result<TokenKind, RecipeError> {
        self.bump(); // `$`
        match self.peek() {
            Some('(') => {
                self.bump();
                let mut name = String::new();
                while let Some(c) = self.peek() {
                    if c == ')' {
                        break;
                    }
                    if !is_ident_char(c) {
                        let off = self.offset();
                        return Err(self.error(
                            format!("invalid character `{}` in variable reference", c),
                            Span::new(off, c.len_utf8()),
                        ));
                    }
                    name.push(c);
                    self.bump();
                }
                if self.bump() != Some(')') {
                    return Err(
                        self.error("unterminated variable reference", Span::new(start, 2))
                    );
                }
                if name.is_empty() {
                    return Err(self.error("empty variable reference", Span::new(start, 3)));
                }
                Ok(TokenKind::Ref(name))
            }
            Some(c) if is_ident_char(c) => {
                let mut name = String::new();
                while let Some(c) = self.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    name.push(c);
                    self.bump();
                }
                Ok(TokenKind::Ref(name))
            }
            _ => Err(self.error("expected variable name after `$`", Span::new(start, 1))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<TokenKind> {
        Lexer::new("test.bkl", text)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lex_assignment() {
        assert_eq!(
            lex("toolsets = gnu vs2010;"),
            vec![
                TokenKind::Word("toolsets".into()),
                TokenKind::Assign,
                TokenKind::Word("gnu".into()),
                TokenKind::Word("vs2010".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_append_and_plus_word() {
        assert_eq!(
            lex("defines += USE_C++;"),
            vec![
                TokenKind::Word("defines".into()),
                TokenKind::Append,
                TokenKind::Word("USE_C++".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_refs() {
        assert_eq!(
            lex("$(toolset) $toolset"),
            vec![
                TokenKind::Ref("toolset".into()),
                TokenKind::Ref("toolset".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_condition_operators() {
        assert_eq!(
            lex("( $(a) == x && !b ) || c != d"),
            vec![
                TokenKind::LParen,
                TokenKind::Ref("a".into()),
                TokenKind::EqEq,
                TokenKind::Word("x".into()),
                TokenKind::AndAnd,
                TokenKind::Bang,
                TokenKind::Word("b".into()),
                TokenKind::RParen,
                TokenKind::OrOr,
                TokenKind::Word("c".into()),
                TokenKind::NotEq,
                TokenKind::Word("d".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_comments() {
        assert_eq!(
            lex("a = 1; // line comment\n/* block\ncomment */ b = 2;"),
            vec![
                TokenKind::Word("a".into()),
                TokenKind::Assign,
                TokenKind::Word("1".into()),
                TokenKind::Semi,
                TokenKind::Word("b".into()),
                TokenKind::Assign,
                TokenKind::Word("2".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_quoted_string_escapes() {
        assert_eq!(
            lex(r#"help = "say \"hi\"";"#),
            vec![
                TokenKind::Word("help".into()),
                TokenKind::Assign,
                TokenKind::Quoted(r#"say "hi""#.into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_glob_word() {
        assert_eq!(
            lex("src/*.c"),
            vec![TokenKind::Word("src/*.c".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string_errors() {
        let err = Lexer::new("t.bkl", "x = \"oops;").tokenize().unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment_errors() {
        let err = Lexer::new("t.bkl", "/* oops").tokenize().unwrap_err();
        assert!(err.to_string().contains("unterminated block comment"));
    }

    #[test]
    fn test_spans_are_byte_accurate() {
        let tokens = Lexer::new("t.bkl", "ab = cd;").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 1));
        assert_eq!(tokens[2].span, Span::new(5, 2));
        assert_eq!(tokens[3].span, Span::new(7, 1));
    }
}
