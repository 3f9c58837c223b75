//! Pointcut expression parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr      := and ('||' and)*
//! and       := unary ('&&' unary)*
//! unary     := '!' unary | primary
//! primary   := '(' expr ')'
//!            | 'execution' '(' Modifiers ClassFilter ('->' | '::') Name '(' Args ')' [':' Type] ')'
//!            | 'execution' '(' NamespacedFunction '(' Args ')' [':' Type] ')'
//!            | 'access' '(' Modifiers ClassFilter '->' Name ')'
//!            | 'within' '(' ClassFilter ')'
//!            | ('@execution' | '@access' | '@within') '(' AnnotationClass ')'
//!            | 'dynamic' '(' Modifiers ClassFilter ('->' | '::') Name '(' Args ')' ')'
//!            | 'cflowbelow' '(' expr ')'
//!            | ('initialization' | 'staticinitialization') '(' ClassFilter ')'
//!            | 'matchInherited' '(' ')'
//!            | Aspect '->' PointcutName
//! ClassFilter := Pattern ['+']
//! ```

pub mod cache;
pub mod lexer;

pub use cache::PatternCache;
pub use lexer::{Lexeme, Token, tokenize};

use crate::error::{Error, Result};
use crate::pointcut::glob::is_literal;
use crate::pointcut::{
    AndPointcut, AnnotationPointcut, CFlowBelowPointcut, ClassMemberPointcut, InheritancePointcut,
    MagicMethodPointcut, MatchInheritedPointcut, ModifierPointcut, NamePointcut, NamedPointcuts,
    NotPointcut, OrPointcut, Pointcut, PointcutKind, PointcutReference, ReturnTypePointcut, TRUE,
};
use crate::reflection::{AnnotationReader, AttributeReader, Modifiers, split_qualified};
use std::fmt;
use std::sync::Arc;

/// Turns pointcut expressions into matcher trees
pub trait PointcutCompiler: fmt::Debug + Send + Sync {
    fn compile(&self, expression: &str) -> Result<Arc<dyn Pointcut>>;
}

/// Parser for the pointcut expression language
///
/// Collaborators are injected: the annotation reader backs `@execution`,
/// `@access` and `@within`, and the named pointcut registry resolves
/// `Aspect->name` references.
#[derive(Debug)]
pub struct PointcutParser {
    reader: Arc<dyn AnnotationReader>,
    named: Arc<NamedPointcuts>,
    patterns: PatternCache,
}

impl PointcutParser {
    pub fn new(reader: Arc<dyn AnnotationReader>, named: Arc<NamedPointcuts>) -> Self {
        Self {
            reader,
            named,
            patterns: PatternCache::default(),
        }
    }

    pub fn named_pointcuts(&self) -> &Arc<NamedPointcuts> {
        &self.named
    }

    pub fn pattern_cache(&self) -> &PatternCache {
        &self.patterns
    }

    /// Parse `expression` into a pointcut tree
    ///
    /// An empty expression matches every join point.
    pub fn parse(&self, expression: &str) -> Result<Box<dyn Pointcut>> {
        let lexemes = tokenize(expression)?;
        if lexemes.is_empty() {
            return Ok(Box::new(TRUE));
        }

        let mut grammar = Grammar {
            parser: self,
            expression,
            lexemes,
            pos: 0,
        };
        let pointcut = grammar.expr()?;
        if grammar.peek().is_some() {
            return Err(grammar.error(format!("unexpected `{}`", grammar.current_text())));
        }
        Ok(pointcut)
    }
}

impl Default for PointcutParser {
    fn default() -> Self {
        Self::new(Arc::new(AttributeReader), Arc::new(NamedPointcuts::new()))
    }
}

impl PointcutCompiler for PointcutParser {
    fn compile(&self, expression: &str) -> Result<Arc<dyn Pointcut>> {
        let pointcut: Arc<dyn Pointcut> = Arc::from(self.parse(expression)?);
        tracing::debug!(expression, kind = ?pointcut.kind(), "Compiled pointcut");
        Ok(pointcut)
    }
}

/// Modifiers written in front of a class filter
#[derive(Debug)]
struct ModifierSpec {
    visibility: Modifiers,
    required: Modifiers,
    written: bool,
}

// `Modifiers::default()` is PUBLIC, which would pin every spec to public
impl Default for ModifierSpec {
    fn default() -> Self {
        Self {
            visibility: Modifiers::empty(),
            required: Modifiers::empty(),
            written: false,
        }
    }
}

impl ModifierSpec {
    fn to_pointcut(&self, kind: PointcutKind, is_static: bool) -> ModifierPointcut {
        let visibility = if self.visibility.is_empty() {
            Modifiers::PUBLIC | Modifiers::PROTECTED
        } else {
            self.visibility
        };
        let pointcut = ModifierPointcut::new(kind)
            .or_match(visibility)
            .and_match(self.required);
        if is_static {
            pointcut.and_match(Modifiers::STATIC)
        } else {
            pointcut.not_match(Modifiers::STATIC)
        }
    }
}

/// Recursive-descent state over one expression
struct Grammar<'p> {
    parser: &'p PointcutParser,
    expression: &'p str,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl Grammar<'_> {
    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.lexemes.get(self.pos + offset).map(|lexeme| lexeme.token)
    }

    /// Byte offset of the current token, or the end of the expression
    fn offset(&self) -> usize {
        self.lexemes
            .get(self.pos)
            .map_or(self.expression.len(), |lexeme| lexeme.span.start)
    }

    fn current_text(&self) -> &str {
        self.lexemes
            .get(self.pos)
            .map_or("", |lexeme| &self.expression[lexeme.span.clone()])
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.expression, self.offset(), message)
    }

    fn expr(&mut self) -> Result<Box<dyn Pointcut>> {
        let mut children = vec![self.and()?];
        while self.eat(Token::Or) {
            children.push(self.and()?);
        }
        Ok(match children.len() {
            1 => children.remove(0),
            _ => Box::new(OrPointcut::any(children)),
        })
    }

    fn and(&mut self) -> Result<Box<dyn Pointcut>> {
        let mut children = vec![self.unary()?];
        while self.eat(Token::And) {
            children.push(self.unary()?);
        }
        Ok(match children.len() {
            1 => children.remove(0),
            _ => Box::new(AndPointcut::all(children)),
        })
    }

    fn unary(&mut self) -> Result<Box<dyn Pointcut>> {
        if self.eat(Token::Not) {
            return Ok(Box::new(NotPointcut::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Box<dyn Pointcut>> {
        let Some(token) = self.peek() else {
            return Err(self.error("expected a pointcut"));
        };
        if token == Token::Pattern {
            return self.reference();
        }

        let start = self.offset();
        let text = self.current_text().to_string();
        self.advance();
        if token == Token::LParen {
            let inner = self.expr()?;
            self.expect(Token::RParen, "`)`")?;
            return Ok(inner);
        }
        if !token.is_primary() {
            return Err(Error::parse(self.expression, start, format!("unexpected `{text}`")));
        }

        self.expect(Token::LParen, "`(`")?;
        let pointcut: Box<dyn Pointcut> = match token {
            Token::Execution => self.execution()?,
            Token::Access => self.access()?,
            Token::Within => Box::new(ClassMemberPointcut::new(
                PointcutKind::ALL,
                self.class_filter()?,
                Box::new(TRUE),
            )),
            Token::AnnotatedExecution => self.annotation(PointcutKind::METHOD)?,
            Token::AnnotatedAccess => self.annotation(PointcutKind::PROPERTY)?,
            Token::AnnotatedWithin => Box::new(ClassMemberPointcut::new(
                PointcutKind::ALL,
                self.annotation(PointcutKind::CLASS)?,
                Box::new(TRUE),
            )),
            Token::Dynamic => self.dynamic()?,
            Token::CFlowBelow => Box::new(CFlowBelowPointcut::new(self.expr()?)?),
            Token::Initialization => Box::new(ClassMemberPointcut::new(
                PointcutKind::INIT,
                self.class_filter()?,
                Box::new(TRUE),
            )),
            Token::StaticInitialization => Box::new(ClassMemberPointcut::new(
                PointcutKind::STATIC_INIT,
                self.class_filter()?,
                Box::new(TRUE),
            )),
            Token::MatchInherited => Box::new(MatchInheritedPointcut),
            _ => return Err(Error::parse(self.expression, start, format!("unexpected `{text}`"))),
        };
        self.expect(Token::RParen, "`)`")?;
        Ok(pointcut)
    }

    /// `Aspect->name`, resolved against the named pointcut registry
    fn reference(&mut self) -> Result<Box<dyn Pointcut>> {
        let start = self.offset();
        let (aspect, _) = self.name_pattern()?;
        self.expect(Token::Arrow, "`->` in pointcut reference")?;
        let (member, _) = self.name_pattern()?;
        let name = format!("{}->{}", aspect.trim_start_matches('\\'), member);
        match self.parser.named.get(&name) {
            Some(target) => Ok(Box::new(PointcutReference::new(name, target))),
            None => Err(Error::parse(
                self.expression,
                start,
                format!("unknown pointcut reference `{name}`"),
            )),
        }
    }

    fn execution(&mut self) -> Result<Box<dyn Pointcut>> {
        let start = self.offset();
        let modifiers = self.modifiers()?;
        let (pattern, pattern_start) = self.name_pattern()?;
        let inheritance = self.eat(Token::Plus);

        match self.peek() {
            Some(separator @ (Token::Arrow | Token::DoubleColon)) => {
                self.advance();
                let is_static = separator == Token::DoubleColon;
                let class_filter = self.build_class_filter(&pattern, pattern_start, inheritance)?;
                let (method, _) = self.name_pattern()?;
                self.arguments()?;

                let mut member: Vec<Box<dyn Pointcut>> = vec![
                    Box::new(modifiers.to_pointcut(PointcutKind::METHOD, is_static)),
                    Box::new(NamePointcut::new(PointcutKind::METHOD, self.glob(&method)?)),
                ];
                if let Some(return_type) = self.return_type()? {
                    member.push(return_type);
                }
                Ok(Box::new(ClassMemberPointcut::new(
                    PointcutKind::METHOD,
                    class_filter,
                    Box::new(AndPointcut::all(member)),
                )))
            }
            Some(Token::LParen) => {
                if modifiers.written {
                    return Err(Error::parse(self.expression, start, "functions do not take modifiers"));
                }
                if inheritance {
                    return Err(Error::parse(self.expression, pattern_start, "functions cannot use `+`"));
                }
                let (namespace, function) = split_qualified(pattern.trim_start_matches('\\'));
                self.arguments()?;

                let namespace_filter: Box<dyn Pointcut> = if namespace == "**" {
                    Box::new(TRUE)
                } else {
                    Box::new(NamePointcut::new(PointcutKind::CLASS, self.glob(namespace)?))
                };
                let mut member: Vec<Box<dyn Pointcut>> = vec![Box::new(NamePointcut::new(
                    PointcutKind::FUNCTION,
                    self.glob(function)?,
                ))];
                if let Some(return_type) = self.return_type()? {
                    member.push(return_type);
                }
                Ok(Box::new(ClassMemberPointcut::new(
                    PointcutKind::FUNCTION,
                    namespace_filter,
                    Box::new(AndPointcut::all(member)),
                )))
            }
            _ => Err(self.error("expected `->`, `::` or `(`")),
        }
    }

    fn access(&mut self) -> Result<Box<dyn Pointcut>> {
        let modifiers = self.modifiers()?;
        let class_filter = self.class_filter()?;
        if self.peek() == Some(Token::DoubleColon) {
            return Err(self.error("static properties cannot be intercepted"));
        }
        self.expect(Token::Arrow, "`->`")?;
        let (property, _) = self.name_pattern()?;

        let member = AndPointcut::all(vec![
            Box::new(modifiers.to_pointcut(PointcutKind::PROPERTY, false)),
            Box::new(NamePointcut::new(PointcutKind::PROPERTY, self.glob(&property)?)),
        ]);
        Ok(Box::new(ClassMemberPointcut::new(
            PointcutKind::PROPERTY,
            class_filter,
            Box::new(member),
        )))
    }

    fn dynamic(&mut self) -> Result<Box<dyn Pointcut>> {
        let modifiers = self.modifiers()?;
        let class_filter = self.class_filter()?;
        let is_static = match self.peek() {
            Some(Token::Arrow) => false,
            Some(Token::DoubleColon) => true,
            _ => return Err(self.error("expected `->` or `::`")),
        };
        self.advance();
        let (method, _) = self.name_pattern()?;
        self.arguments()?;

        let magic = MagicMethodPointcut::new(
            self.glob(&method)?,
            modifiers.to_pointcut(PointcutKind::METHOD, is_static),
        );
        Ok(Box::new(ClassMemberPointcut::new(
            PointcutKind::METHOD | PointcutKind::DYNAMIC,
            class_filter,
            Box::new(magic),
        )))
    }

    fn annotation(&mut self, kind: PointcutKind) -> Result<Box<dyn Pointcut>> {
        let (name, start) = self.name_pattern()?;
        if !is_literal(&name) {
            return Err(Error::parse(
                self.expression,
                start,
                "annotation class name must not contain wildcards",
            ));
        }
        Ok(Box::new(AnnotationPointcut::new(
            kind,
            name.trim_start_matches('\\'),
            self.parser.reader.clone(),
        )))
    }

    fn modifiers(&mut self) -> Result<ModifierSpec> {
        let mut spec = ModifierSpec::default();
        loop {
            match self.peek() {
                Some(Token::Public) => spec.visibility |= Modifiers::PUBLIC,
                Some(Token::Protected) => spec.visibility |= Modifiers::PROTECTED,
                Some(Token::Private) => return Err(self.error("private members cannot be intercepted")),
                Some(Token::Static) => spec.required |= Modifiers::STATIC,
                Some(Token::Final) => spec.required |= Modifiers::FINAL,
                Some(Token::Abstract) => spec.required |= Modifiers::ABSTRACT,
                _ => break,
            }
            spec.written = true;
            self.advance();
            // `public|protected`
            if self.peek() == Some(Token::Pipe) && self.peek_at(1).is_some_and(Token::is_modifier) {
                self.advance();
            }
        }
        Ok(spec)
    }

    fn class_filter(&mut self) -> Result<Box<dyn Pointcut>> {
        let (pattern, start) = self.name_pattern()?;
        let inheritance = self.eat(Token::Plus);
        self.build_class_filter(&pattern, start, inheritance)
    }

    fn build_class_filter(&self, pattern: &str, start: usize, inheritance: bool) -> Result<Box<dyn Pointcut>> {
        let pattern = pattern.trim_start_matches('\\');
        if inheritance {
            if !is_literal(pattern) {
                return Err(Error::parse(
                    self.expression,
                    start,
                    "`+` requires a literal class name",
                ));
            }
            return Ok(Box::new(InheritancePointcut::new(pattern)));
        }
        if pattern == "**" {
            return Ok(Box::new(TRUE));
        }
        Ok(Box::new(NamePointcut::new(PointcutKind::CLASS, self.glob(pattern)?)))
    }

    /// Words joined by `|`, returned with the offset of the first word
    fn name_pattern(&mut self) -> Result<(String, usize)> {
        let start = self.offset();
        if !self.peek().is_some_and(Token::is_word) {
            return Err(self.error("expected a name pattern"));
        }
        let mut pattern = self.current_text().to_string();
        self.advance();
        while self.peek() == Some(Token::Pipe) && self.peek_at(1).is_some_and(Token::is_word) {
            self.advance();
            pattern.push('|');
            pattern.push_str(self.current_text());
            self.advance();
        }
        Ok((pattern, start))
    }

    /// `(*)` or `()`
    fn arguments(&mut self) -> Result<()> {
        self.expect(Token::LParen, "`(`")?;
        if self.peek() == Some(Token::Pattern) && self.current_text() == "*" {
            self.advance();
        }
        self.expect(Token::RParen, "`*` or `)` in argument list")
    }

    fn return_type(&mut self) -> Result<Option<Box<dyn Pointcut>>> {
        if !self.eat(Token::Colon) {
            return Ok(None);
        }
        let (pattern, _) = self.name_pattern()?;
        let pattern = self.glob(pattern.trim_start_matches('\\'))?;
        Ok(Some(Box::new(ReturnTypePointcut::new(pattern))))
    }

    fn glob(&self, pattern: &str) -> Result<crate::pointcut::GlobPattern> {
        self.parser.patterns.get_or_compile(pattern)
    }
}
