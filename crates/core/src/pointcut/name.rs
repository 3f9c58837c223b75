use super::{GlobPattern, MatchTarget, Pointcut, PointcutKind};
use crate::error::Result;

/// Matches the name of a join point against a glob
///
/// Member kinds (method, property, function) look at the member name.
/// Class-level kinds look at the qualified name of the context, which makes
/// this pointcut usable as a class or namespace filter.
#[derive(Debug, Clone)]
pub struct NamePointcut {
    kind: PointcutKind,
    pattern: GlobPattern,
}

impl NamePointcut {
    pub fn new(kind: PointcutKind, pattern: GlobPattern) -> Self {
        Self { kind, pattern }
    }

    pub fn pattern(&self) -> &GlobPattern {
        &self.pattern
    }
}

impl Pointcut for NamePointcut {
    fn kind(&self) -> PointcutKind {
        self.kind
    }

    fn point_matches(&self, target: &MatchTarget<'_>) -> Result<bool> {
        let member_kinds = PointcutKind::METHOD | PointcutKind::PROPERTY | PointcutKind::FUNCTION;
        let name = if member_kinds.contains(target.kind) {
            match target.member {
                Some(member) => member.name(),
                None => return Ok(false),
            }
        } else {
            target.context.name()
        };
        Ok(self.pattern.is_match(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{
        ClassReflection, FunctionReflection, MethodReflection, Modifiers, NamespaceReflection,
    };

    fn name(kind: PointcutKind, pattern: &str) -> NamePointcut {
        NamePointcut::new(kind, GlobPattern::new(pattern).unwrap())
    }

    #[test]
    fn test_method_name() {
        let class = ClassReflection::new("Demo\\Example")
            .with_method(MethodReflection::new("publicMethod", Modifiers::PUBLIC))
            .with_method(MethodReflection::new("methodPublic", Modifiers::PUBLIC));
        let pointcut = name(PointcutKind::METHOD, "*Method");

        assert!(pointcut.matches(&MatchTarget::method(&class, class.method("publicMethod").unwrap())).unwrap());
        assert!(!pointcut.matches(&MatchTarget::method(&class, class.method("methodPublic").unwrap())).unwrap());
    }

    #[test]
    fn test_class_name_as_filter() {
        let class = ClassReflection::new("Demo\\Example");
        assert!(name(PointcutKind::CLASS, "Demo\\*").matches(&MatchTarget::class(&class)).unwrap());
        assert!(!name(PointcutKind::CLASS, "Other\\*").matches(&MatchTarget::class(&class)).unwrap());
    }

    #[test]
    fn test_wrong_kind_never_matches() {
        let class = ClassReflection::new("Demo\\Example")
            .with_method(MethodReflection::new("title", Modifiers::PUBLIC));
        let pointcut = name(PointcutKind::PROPERTY, "title");
        assert!(!pointcut.matches(&MatchTarget::method(&class, class.method("title").unwrap())).unwrap());
    }

    #[test]
    fn test_function_name() {
        let namespace = NamespaceReflection::new("Demo\\Util")
            .with_function(FunctionReflection::new("file_get_contents"));
        let pointcut = name(PointcutKind::FUNCTION, "file_*");
        let function = namespace.function("file_get_contents").unwrap();
        assert!(pointcut.matches(&MatchTarget::function(&namespace, function)).unwrap());
    }
}
