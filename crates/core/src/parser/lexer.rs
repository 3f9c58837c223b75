//! Tokenizer for pointcut expressions

use crate::error::{Error, Result};
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Primary pointcut keywords
    #[token("execution")]
    Execution,
    #[token("access")]
    Access,
    #[token("within")]
    Within,
    #[token("@execution")]
    AnnotatedExecution,
    #[token("@access")]
    AnnotatedAccess,
    #[token("@within")]
    AnnotatedWithin,
    #[token("dynamic")]
    Dynamic,
    #[token("cflowbelow")]
    CFlowBelow,
    #[token("initialization")]
    Initialization,
    #[token("staticinitialization")]
    StaticInitialization,
    #[token("matchInherited")]
    MatchInherited,

    // Modifiers
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,

    // Operators and punctuation
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Not,
    #[token("|")]
    Pipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("->")]
    Arrow,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("+")]
    Plus,
    #[token(",")]
    Comma,

    /// Name pattern: identifier characters, namespace separators and globs
    #[regex(r"[A-Za-z_\\*?][A-Za-z0-9_\\*?]*")]
    Pattern,
}

impl Token {
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Token::Public | Token::Protected | Token::Private | Token::Static | Token::Final | Token::Abstract
        )
    }

    /// Keywords that open a primary pointcut
    pub fn is_primary(self) -> bool {
        matches!(
            self,
            Token::Execution
                | Token::Access
                | Token::Within
                | Token::AnnotatedExecution
                | Token::AnnotatedAccess
                | Token::AnnotatedWithin
                | Token::Dynamic
                | Token::CFlowBelow
                | Token::Initialization
                | Token::StaticInitialization
                | Token::MatchInherited
        )
    }

    /// Tokens that may stand for a name inside a pattern; keywords are plain
    /// words there
    pub fn is_word(self) -> bool {
        !matches!(
            self,
            Token::And
                | Token::Or
                | Token::Not
                | Token::Pipe
                | Token::LParen
                | Token::RParen
                | Token::Arrow
                | Token::DoubleColon
                | Token::Colon
                | Token::Plus
                | Token::Comma
                | Token::AnnotatedExecution
                | Token::AnnotatedAccess
                | Token::AnnotatedWithin
        )
    }
}

/// A token with its byte range in the expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Range<usize>,
}

/// Split `expression` into tokens
pub fn tokenize(expression: &str) -> Result<Vec<Lexeme>> {
    let mut lexer = Token::lexer(expression);
    let mut lexemes = Vec::new();
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(token) => lexemes.push(Lexeme { token, span }),
            Err(()) => {
                return Err(Error::parse(
                    expression,
                    span.start,
                    format!("unexpected character `{}`", lexer.slice()),
                ));
            }
        }
    }
    Ok(lexemes)
}
