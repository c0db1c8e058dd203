//! The builder contract and its default implementation.
//!
//! The parser materialises every declaration and reference through a
//! [`Builder`]. Types and packages are interned by qualified name, so a
//! reference built while parsing one file and the declaration parsed
//! later from another file resolve to the same node, whatever the order.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{Callable, CallableKind, Constant, Package, Parameter, Property, Type, TypeKind};

/// Factory the parser uses to materialise declarations and references.
///
/// `build_class`, `build_interface`, the reference builders, and
/// `build_package` are idempotent by qualified name: repeated calls
/// return the same logical node. The remaining builders create one node
/// per source occurrence.
pub trait Builder {
    fn build_class(&mut self, qualified_name: &str) -> Type;
    fn build_interface(&mut self, qualified_name: &str) -> Type;
    fn build_class_reference(&mut self, qualified_name: &str) -> Type;
    fn build_interface_reference(&mut self, qualified_name: &str) -> Type;
    fn build_class_or_interface_reference(&mut self, qualified_name: &str) -> Type;
    fn build_function(&mut self, name: &str) -> Callable;
    fn build_method(&mut self, name: &str) -> Callable;
    fn build_closure(&mut self) -> Callable;
    fn build_property(&mut self, name: &str) -> Property;
    fn build_parameter(&mut self, name: &str) -> Parameter;
    fn build_type_constant(&mut self, name: &str) -> Constant;
    fn build_package(&mut self, name: &str) -> Package;
}

/// The in-memory model builder.
#[derive(Default)]
pub struct ModelBuilder {
    types: IndexMap<String, Type>,
    packages: IndexMap<String, Package>,
    functions: Vec<Callable>,
    closures: Vec<Callable>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type handle under its qualified name.
    ///
    /// Two bridge rules keep legacy (`Pkg::Local`) and bare names
    /// unified: a bare reference matches a previously declared type by
    /// local name, and a packaged declaration adopts a node previously
    /// interned under its bare name, aliasing both keys to one handle.
    fn intern_type(&mut self, qualified_name: &str, kind: TypeKind, declaration: bool) -> Type {
        let name = qualified_name.trim_start_matches('\\');

        if let Some(existing) = self.types.get(name) {
            let existing = existing.clone();
            if declaration {
                existing.set_kind(kind);
            }
            return existing;
        }

        if !declaration && !name.contains('\\') && !name.contains("::") {
            if let Some(existing) = self.types.values().find(|t| t.local_name() == name) {
                return existing.clone();
            }
        }

        if declaration {
            if let Some((_, local)) = name.rsplit_once("::") {
                if let Some(existing) = self.types.get(local).cloned() {
                    existing.set_name(name);
                    existing.set_kind(kind);
                    self.types.insert(name.to_string(), existing.clone());
                    return existing;
                }
            }
        }

        let ty = Type::new(kind, name);
        self.types.insert(name.to_string(), ty.clone());
        ty
    }

    fn distinct_types(&self) -> Vec<Type> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for ty in self.types.values() {
            if seen.insert(ty.as_ptr()) {
                out.push(ty.clone());
            }
        }
        out
    }

    /// All interned types in first-seen order, aliases collapsed.
    pub fn types(&self) -> Vec<Type> {
        self.distinct_types()
    }

    pub fn classes(&self) -> Vec<Type> {
        self.distinct_types()
            .into_iter()
            .filter(|t| t.kind() == TypeKind::Class)
            .collect()
    }

    pub fn interfaces(&self) -> Vec<Type> {
        self.distinct_types()
            .into_iter()
            .filter(|t| t.kind() == TypeKind::Interface)
            .collect()
    }

    /// Exact lookup by qualified name.
    pub fn get_type(&self, qualified_name: &str) -> Option<Type> {
        self.types
            .get(qualified_name.trim_start_matches('\\'))
            .cloned()
    }

    pub fn packages(&self) -> Vec<Package> {
        self.packages.values().cloned().collect()
    }

    pub fn get_package(&self, name: &str) -> Option<Package> {
        self.packages.get(name).cloned()
    }

    pub fn functions(&self) -> Vec<Callable> {
        self.functions.clone()
    }

    pub fn closures(&self) -> Vec<Callable> {
        self.closures.clone()
    }
}

impl Builder for ModelBuilder {
    fn build_class(&mut self, qualified_name: &str) -> Type {
        self.intern_type(qualified_name, TypeKind::Class, true)
    }

    fn build_interface(&mut self, qualified_name: &str) -> Type {
        self.intern_type(qualified_name, TypeKind::Interface, true)
    }

    fn build_class_reference(&mut self, qualified_name: &str) -> Type {
        self.intern_type(qualified_name, TypeKind::Class, false)
    }

    fn build_interface_reference(&mut self, qualified_name: &str) -> Type {
        self.intern_type(qualified_name, TypeKind::Interface, false)
    }

    fn build_class_or_interface_reference(&mut self, qualified_name: &str) -> Type {
        self.intern_type(qualified_name, TypeKind::Class, false)
    }

    fn build_function(&mut self, name: &str) -> Callable {
        let function = Callable::new(CallableKind::Function, name);
        self.functions.push(function.clone());
        function
    }

    fn build_method(&mut self, name: &str) -> Callable {
        Callable::new(CallableKind::Method, name)
    }

    fn build_closure(&mut self) -> Callable {
        let closure = Callable::new(CallableKind::Closure, Callable::CLOSURE_NAME);
        self.closures.push(closure.clone());
        closure
    }

    fn build_property(&mut self, name: &str) -> Property {
        Property::new(name)
    }

    fn build_parameter(&mut self, name: &str) -> Parameter {
        Parameter::new(name)
    }

    fn build_type_constant(&mut self, name: &str) -> Constant {
        Constant::new(name)
    }

    fn build_package(&mut self, name: &str) -> Package {
        if let Some(package) = self.packages.get(name) {
            return package.clone();
        }
        let package = Package::new(name);
        self.packages.insert(name.to_string(), package.clone());
        package
    }
}
