use super::{Attribute, Modifiers, split_qualified};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A class, interface or trait of the woven program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassReflection {
    /// Fully-qualified name, e.g. `Demo\Example`
    pub name: String,
    /// Resolved parent chain, nearest ancestor first
    #[serde(default)]
    pub ancestors: Vec<String>,
    /// Every interface implemented, including inherited ones
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_trait: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Methods visible on the class, inherited ones included
    #[serde(default)]
    pub methods: Vec<MethodReflection>,
    /// Properties visible on the class, inherited ones included
    #[serde(default)]
    pub properties: Vec<PropertyReflection>,
}

impl ClassReflection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a class description from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let mut class: ClassReflection = serde_json::from_str(json)?;
        class.fill_declaring_class();
        Ok(class)
    }

    /// Derive from `parent`: its ancestors, interfaces and non-private members
    /// become part of this class
    pub fn extends(mut self, parent: &ClassReflection) -> Self {
        self.ancestors = std::iter::once(parent.name.clone())
            .chain(parent.ancestors.iter().cloned())
            .collect();
        for interface in &parent.interfaces {
            if !self.interfaces.contains(interface) {
                self.interfaces.push(interface.clone());
            }
        }
        for method in &parent.methods {
            if !method.modifiers.contains(Modifiers::PRIVATE) && self.method(&method.name).is_none() {
                self.methods.push(method.clone());
            }
        }
        for property in &parent.properties {
            if !property.modifiers.contains(Modifiers::PRIVATE)
                && self.property(&property.name).is_none()
            {
                self.properties.push(property.clone());
            }
        }
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Declare a method on this class
    ///
    /// A method declared here replaces an inherited one of the same name.
    pub fn with_method(mut self, mut method: MethodReflection) -> Self {
        if method.declaring_class.is_empty() {
            method.declaring_class = self.name.clone();
        }
        self.methods.retain(|existing| existing.name != method.name);
        self.methods.push(method);
        self
    }

    /// Declare a property on this class
    pub fn with_property(mut self, mut property: PropertyReflection) -> Self {
        if property.declaring_class.is_empty() {
            property.declaring_class = self.name.clone();
        }
        self.properties.retain(|existing| existing.name != property.name);
        self.properties.push(property);
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn short_name(&self) -> &str {
        split_qualified(&self.name).1
    }

    pub fn namespace(&self) -> &str {
        split_qualified(&self.name).0
    }

    pub fn parent(&self) -> Option<&str> {
        self.ancestors.first().map(String::as_str)
    }

    /// Whether `name` is a (transitive) parent class of this class
    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.ancestors.iter().any(|ancestor| ancestor == name)
    }

    pub fn implements_interface(&self, name: &str) -> bool {
        self.interfaces.iter().any(|interface| interface == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodReflection> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyReflection> {
        self.properties.iter().find(|property| property.name == name)
    }

    fn fill_declaring_class(&mut self) {
        for method in &mut self.methods {
            if method.declaring_class.is_empty() {
                method.declaring_class = self.name.clone();
            }
        }
        for property in &mut self.properties {
            if property.declaring_class.is_empty() {
                property.declaring_class = self.name.clone();
            }
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// A method of a class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodReflection {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// Filled with the owning class name when left empty
    #[serde(default)]
    pub declaring_class: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl MethodReflection {
    pub fn new(name: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            modifiers,
            ..Default::default()
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            type_name: None,
        });
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }
}

/// A property of a class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyReflection {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub declaring_class: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl PropertyReflection {
    pub fn new(name: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            modifiers,
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ClassReflection {
        ClassReflection::new("Demo\\Base")
            .implements("Demo\\Countable")
            .with_method(MethodReflection::new("count", Modifiers::PUBLIC))
            .with_method(MethodReflection::new("secret", Modifiers::PRIVATE))
    }

    #[test]
    fn test_extends_inherits_visible_members() {
        let child = ClassReflection::new("Demo\\Child")
            .extends(&base())
            .with_method(MethodReflection::new("own", Modifiers::PUBLIC));

        assert_eq!(child.parent(), Some("Demo\\Base"));
        assert!(child.is_subclass_of("Demo\\Base"));
        assert!(child.implements_interface("Demo\\Countable"));
        assert_eq!(child.method("count").unwrap().declaring_class, "Demo\\Base");
        assert_eq!(child.method("own").unwrap().declaring_class, "Demo\\Child");
        assert!(child.method("secret").is_none());
    }

    #[test]
    fn test_redeclared_method_replaces_inherited() {
        let child = ClassReflection::new("Demo\\Child")
            .extends(&base())
            .with_method(MethodReflection::new("count", Modifiers::PUBLIC));
        assert_eq!(child.methods.iter().filter(|m| m.name == "count").count(), 1);
        assert_eq!(child.method("count").unwrap().declaring_class, "Demo\\Child");
    }

    #[test]
    fn test_from_json_fills_declaring_class() {
        let class = ClassReflection::from_json(
            r#"{
                "name": "Demo\\Example",
                "methods": [
                    { "name": "hello", "modifiers": "PUBLIC", "return_type": "string" },
                    { "name": "make", "modifiers": "PUBLIC | STATIC" }
                ],
                "properties": [ { "name": "title" } ]
            }"#,
        )
        .unwrap();

        assert_eq!(class.short_name(), "Example");
        assert_eq!(class.namespace(), "Demo");
        assert_eq!(class.method("hello").unwrap().declaring_class, "Demo\\Example");
        assert!(class.method("make").unwrap().is_static());
        assert_eq!(class.property("title").unwrap().modifiers, Modifiers::PUBLIC);
    }
}
