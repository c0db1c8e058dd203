//! The semantic source model.
//!
//! Nodes are cheap shared handles (`Rc` + interior mutability): the
//! builder interns them by qualified name and hands the same handle to
//! every caller, so a reference created before the corresponding
//! declaration is the node the declaration later populates. The model
//! is single-threaded; handles are not `Send`.

mod modifiers;
mod value;

pub use modifiers::Modifiers;
pub use value::Value;

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::token::Token;

/// A parsed source file with its file-level doc comment.
#[derive(Clone)]
pub struct SourceFile {
    inner: Rc<RefCell<SourceFileInner>>,
}

struct SourceFileInner {
    path: PathBuf,
    doc_comment: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SourceFileInner {
                path: path.into(),
                doc_comment: None,
            })),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.inner.borrow().path.clone()
    }

    pub fn doc_comment(&self) -> Option<String> {
        self.inner.borrow().doc_comment.clone()
    }

    pub fn set_doc_comment(&self, comment: impl Into<String>) {
        self.inner.borrow_mut().doc_comment = Some(comment.into());
    }

    pub fn ptr_eq(&self, other: &SourceFile) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.inner.borrow().path)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A class or interface declaration, or a not-yet-declared reference to
/// one.
#[derive(Clone)]
pub struct Type {
    inner: Rc<RefCell<TypeInner>>,
}

struct TypeInner {
    kind: TypeKind,
    name: String,
    source_file: Option<SourceFile>,
    start_line: usize,
    end_line: usize,
    modifiers: Modifiers,
    doc_comment: Option<String>,
    parent_class: Option<Type>,
    interfaces: Vec<Type>,
    methods: Vec<Callable>,
    properties: Vec<Property>,
    constants: Vec<Constant>,
    tokens: Vec<Token>,
    user_defined: bool,
}

impl Type {
    pub fn new(kind: TypeKind, name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TypeInner {
                kind,
                name: name.into(),
                source_file: None,
                start_line: 0,
                end_line: 0,
                modifiers: Modifiers::empty(),
                doc_comment: None,
                parent_class: None,
                interfaces: Vec::new(),
                methods: Vec::new(),
                properties: Vec::new(),
                constants: Vec::new(),
                tokens: Vec::new(),
                user_defined: false,
            })),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.inner.borrow().kind
    }

    pub fn set_kind(&self, kind: TypeKind) {
        self.inner.borrow_mut().kind = kind;
    }

    /// The qualified name, e.g. `A\B\Thing` or `Pkg::Thing`.
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub(crate) fn set_name(&self, name: impl Into<String>) {
        self.inner.borrow_mut().name = name.into();
    }

    /// The unqualified trailing segment of the name.
    pub fn local_name(&self) -> String {
        let inner = self.inner.borrow();
        let after_ns = inner.name.rsplit('\\').next().unwrap_or(&inner.name);
        let local = after_ns.rsplit("::").next().unwrap_or(after_ns);
        local.to_string()
    }

    pub fn source_file(&self) -> Option<SourceFile> {
        self.inner.borrow().source_file.clone()
    }

    pub fn set_source_file(&self, file: SourceFile) {
        self.inner.borrow_mut().source_file = Some(file);
    }

    pub fn start_line(&self) -> usize {
        self.inner.borrow().start_line
    }

    pub fn set_start_line(&self, line: usize) {
        self.inner.borrow_mut().start_line = line;
    }

    pub fn end_line(&self) -> usize {
        self.inner.borrow().end_line
    }

    pub fn set_end_line(&self, line: usize) {
        self.inner.borrow_mut().end_line = line;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.inner.borrow().modifiers
    }

    pub fn set_modifiers(&self, modifiers: Modifiers) {
        self.inner.borrow_mut().modifiers = modifiers;
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers().is_abstract()
    }

    pub fn is_final(&self) -> bool {
        self.modifiers().is_final()
    }

    pub fn doc_comment(&self) -> Option<String> {
        self.inner.borrow().doc_comment.clone()
    }

    pub fn set_doc_comment(&self, comment: impl Into<String>) {
        self.inner.borrow_mut().doc_comment = Some(comment.into());
    }

    pub fn parent_class(&self) -> Option<Type> {
        self.inner.borrow().parent_class.clone()
    }

    pub fn set_parent_class(&self, parent: Type) {
        self.inner.borrow_mut().parent_class = Some(parent);
    }

    pub fn interfaces(&self) -> Vec<Type> {
        self.inner.borrow().interfaces.clone()
    }

    pub fn add_interface(&self, interface: Type) {
        self.inner.borrow_mut().interfaces.push(interface);
    }

    pub fn methods(&self) -> Vec<Callable> {
        self.inner.borrow().methods.clone()
    }

    pub fn add_method(&self, method: Callable) {
        self.inner.borrow_mut().methods.push(method);
    }

    pub fn properties(&self) -> Vec<Property> {
        self.inner.borrow().properties.clone()
    }

    pub fn add_property(&self, property: Property) {
        self.inner.borrow_mut().properties.push(property);
    }

    pub fn constants(&self) -> Vec<Constant> {
        self.inner.borrow().constants.clone()
    }

    pub fn add_constant(&self, constant: Constant) {
        self.inner.borrow_mut().constants.push(constant);
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.inner.borrow().tokens.clone()
    }

    pub fn set_tokens(&self, tokens: Vec<Token>) {
        self.inner.borrow_mut().tokens = tokens;
    }

    pub fn is_user_defined(&self) -> bool {
        self.inner.borrow().user_defined
    }

    pub fn set_user_defined(&self) {
        self.inner.borrow_mut().user_defined = true;
    }

    pub fn ptr_eq(&self, other: &Type) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Type")
            .field("kind", &inner.kind)
            .field("name", &inner.name)
            .field("start_line", &inner.start_line)
            .field("end_line", &inner.end_line)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
    Closure,
}

/// A function, method, or closure.
#[derive(Clone)]
pub struct Callable {
    inner: Rc<RefCell<CallableInner>>,
}

struct CallableInner {
    kind: CallableKind,
    name: String,
    doc_comment: Option<String>,
    source_file: Option<SourceFile>,
    start_line: usize,
    end_line: usize,
    modifiers: Modifiers,
    parameters: Vec<Parameter>,
    returns_reference: bool,
    dependencies: Vec<Type>,
    exceptions: Vec<Type>,
    return_type: Option<Type>,
    bound_variables: Vec<String>,
    tokens: Vec<Token>,
}

impl Callable {
    /// The name every closure carries, mirroring the runtime's own
    /// naming of anonymous functions.
    pub const CLOSURE_NAME: &'static str = "{closure}";

    pub fn new(kind: CallableKind, name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CallableInner {
                kind,
                name: name.into(),
                doc_comment: None,
                source_file: None,
                start_line: 0,
                end_line: 0,
                modifiers: Modifiers::empty(),
                parameters: Vec::new(),
                returns_reference: false,
                dependencies: Vec::new(),
                exceptions: Vec::new(),
                return_type: None,
                bound_variables: Vec::new(),
                tokens: Vec::new(),
            })),
        }
    }

    pub fn kind(&self) -> CallableKind {
        self.inner.borrow().kind
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn doc_comment(&self) -> Option<String> {
        self.inner.borrow().doc_comment.clone()
    }

    pub fn set_doc_comment(&self, comment: impl Into<String>) {
        self.inner.borrow_mut().doc_comment = Some(comment.into());
    }

    pub fn source_file(&self) -> Option<SourceFile> {
        self.inner.borrow().source_file.clone()
    }

    pub fn set_source_file(&self, file: SourceFile) {
        self.inner.borrow_mut().source_file = Some(file);
    }

    pub fn start_line(&self) -> usize {
        self.inner.borrow().start_line
    }

    pub fn set_start_line(&self, line: usize) {
        self.inner.borrow_mut().start_line = line;
    }

    pub fn end_line(&self) -> usize {
        self.inner.borrow().end_line
    }

    pub fn set_end_line(&self, line: usize) {
        self.inner.borrow_mut().end_line = line;
    }

    pub fn modifiers(&self) -> Modifiers {
        self.inner.borrow().modifiers
    }

    pub fn set_modifiers(&self, modifiers: Modifiers) {
        self.inner.borrow_mut().modifiers = modifiers;
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.inner.borrow().parameters.clone()
    }

    pub fn add_parameter(&self, parameter: Parameter) {
        self.inner.borrow_mut().parameters.push(parameter);
    }

    pub fn returns_reference(&self) -> bool {
        self.inner.borrow().returns_reference
    }

    pub fn set_returns_reference(&self) {
        self.inner.borrow_mut().returns_reference = true;
    }

    /// Types this callable's body refers to: instantiations, static
    /// accesses, `instanceof` and `catch` subjects, inline `@var` hints.
    pub fn dependencies(&self) -> Vec<Type> {
        self.inner.borrow().dependencies.clone()
    }

    pub fn add_dependency(&self, dependency: Type) {
        self.inner.borrow_mut().dependencies.push(dependency);
    }

    /// Exception types declared via `@throws`.
    pub fn exceptions(&self) -> Vec<Type> {
        self.inner.borrow().exceptions.clone()
    }

    pub fn add_exception(&self, exception: Type) {
        self.inner.borrow_mut().exceptions.push(exception);
    }

    pub fn return_type(&self) -> Option<Type> {
        self.inner.borrow().return_type.clone()
    }

    pub fn set_return_type(&self, return_type: Type) {
        self.inner.borrow_mut().return_type = Some(return_type);
    }

    /// Variables a closure binds with `use (...)`.
    pub fn bound_variables(&self) -> Vec<String> {
        self.inner.borrow().bound_variables.clone()
    }

    pub fn add_bound_variable(&self, name: impl Into<String>) {
        self.inner.borrow_mut().bound_variables.push(name.into());
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.inner.borrow().tokens.clone()
    }

    pub fn set_tokens(&self, tokens: Vec<Token>) {
        self.inner.borrow_mut().tokens = tokens;
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Callable")
            .field("kind", &inner.kind)
            .field("name", &inner.name)
            .field("start_line", &inner.start_line)
            .field("end_line", &inner.end_line)
            .finish_non_exhaustive()
    }
}

/// A formal parameter of a callable.
#[derive(Clone)]
pub struct Parameter {
    inner: Rc<RefCell<ParameterInner>>,
}

struct ParameterInner {
    name: String,
    position: usize,
    pass_by_reference: bool,
    array_hint: bool,
    type_hint: Option<Type>,
    default_value: Option<Value>,
    optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ParameterInner {
                name: name.into(),
                position: 0,
                pass_by_reference: false,
                array_hint: false,
                type_hint: None,
                default_value: None,
                optional: false,
            })),
        }
    }

    /// The parameter image as written, including the `$` sigil.
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn position(&self) -> usize {
        self.inner.borrow().position
    }

    pub fn set_position(&self, position: usize) {
        self.inner.borrow_mut().position = position;
    }

    pub fn is_passed_by_reference(&self) -> bool {
        self.inner.borrow().pass_by_reference
    }

    pub fn set_passed_by_reference(&self) {
        self.inner.borrow_mut().pass_by_reference = true;
    }

    pub fn has_array_hint(&self) -> bool {
        self.inner.borrow().array_hint
    }

    pub fn set_array_hint(&self) {
        self.inner.borrow_mut().array_hint = true;
    }

    pub fn type_hint(&self) -> Option<Type> {
        self.inner.borrow().type_hint.clone()
    }

    pub fn set_type_hint(&self, hint: Type) {
        self.inner.borrow_mut().type_hint = Some(hint);
    }

    pub fn default_value(&self) -> Option<Value> {
        self.inner.borrow().default_value.clone()
    }

    pub fn set_default_value(&self, value: Value) {
        self.inner.borrow_mut().default_value = Some(value);
    }

    /// True when this parameter and every parameter after it carry a
    /// default value. Computed once the whole list has been parsed.
    pub fn is_optional(&self) -> bool {
        self.inner.borrow().optional
    }

    pub fn set_optional(&self, optional: bool) {
        self.inner.borrow_mut().optional = optional;
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Parameter")
            .field("name", &inner.name)
            .field("position", &inner.position)
            .field("optional", &inner.optional)
            .finish_non_exhaustive()
    }
}

/// A property of a class.
#[derive(Clone)]
pub struct Property {
    inner: Rc<RefCell<PropertyInner>>,
}

struct PropertyInner {
    name: String,
    doc_comment: Option<String>,
    modifiers: Modifiers,
    start_line: usize,
    end_line: usize,
    source_file: Option<SourceFile>,
    type_hint: Option<Type>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PropertyInner {
                name: name.into(),
                doc_comment: None,
                modifiers: Modifiers::empty(),
                start_line: 0,
                end_line: 0,
                source_file: None,
                type_hint: None,
            })),
        }
    }

    /// The property image as written, including the `$` sigil.
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn doc_comment(&self) -> Option<String> {
        self.inner.borrow().doc_comment.clone()
    }

    pub fn set_doc_comment(&self, comment: impl Into<String>) {
        self.inner.borrow_mut().doc_comment = Some(comment.into());
    }

    pub fn modifiers(&self) -> Modifiers {
        self.inner.borrow().modifiers
    }

    pub fn set_modifiers(&self, modifiers: Modifiers) {
        self.inner.borrow_mut().modifiers = modifiers;
    }

    pub fn start_line(&self) -> usize {
        self.inner.borrow().start_line
    }

    pub fn set_start_line(&self, line: usize) {
        self.inner.borrow_mut().start_line = line;
    }

    pub fn end_line(&self) -> usize {
        self.inner.borrow().end_line
    }

    pub fn set_end_line(&self, line: usize) {
        self.inner.borrow_mut().end_line = line;
    }

    pub fn source_file(&self) -> Option<SourceFile> {
        self.inner.borrow().source_file.clone()
    }

    pub fn set_source_file(&self, file: SourceFile) {
        self.inner.borrow_mut().source_file = Some(file);
    }

    /// The type extracted from a non-scalar `@var` annotation.
    pub fn type_hint(&self) -> Option<Type> {
        self.inner.borrow().type_hint.clone()
    }

    pub fn set_type_hint(&self, hint: Type) {
        self.inner.borrow_mut().type_hint = Some(hint);
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Property")
            .field("name", &inner.name)
            .field("start_line", &inner.start_line)
            .finish_non_exhaustive()
    }
}

/// A class constant.
#[derive(Clone)]
pub struct Constant {
    inner: Rc<RefCell<ConstantInner>>,
}

struct ConstantInner {
    name: String,
    doc_comment: Option<String>,
    start_line: usize,
    end_line: usize,
    source_file: Option<SourceFile>,
}

impl Constant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ConstantInner {
                name: name.into(),
                doc_comment: None,
                start_line: 0,
                end_line: 0,
                source_file: None,
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn doc_comment(&self) -> Option<String> {
        self.inner.borrow().doc_comment.clone()
    }

    pub fn set_doc_comment(&self, comment: impl Into<String>) {
        self.inner.borrow_mut().doc_comment = Some(comment.into());
    }

    pub fn start_line(&self) -> usize {
        self.inner.borrow().start_line
    }

    pub fn set_start_line(&self, line: usize) {
        self.inner.borrow_mut().start_line = line;
    }

    pub fn end_line(&self) -> usize {
        self.inner.borrow().end_line
    }

    pub fn set_end_line(&self, line: usize) {
        self.inner.borrow_mut().end_line = line;
    }

    pub fn source_file(&self) -> Option<SourceFile> {
        self.inner.borrow().source_file.clone()
    }

    pub fn set_source_file(&self, file: SourceFile) {
        self.inner.borrow_mut().source_file = Some(file);
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Constant")
            .field("name", &inner.name)
            .field("start_line", &inner.start_line)
            .finish_non_exhaustive()
    }
}

/// A package (or namespace) grouping top-level types and functions.
#[derive(Clone)]
pub struct Package {
    inner: Rc<RefCell<PackageInner>>,
}

struct PackageInner {
    name: String,
    types: Vec<Type>,
    functions: Vec<Callable>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PackageInner {
                name: name.into(),
                types: Vec::new(),
                functions: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn types(&self) -> Vec<Type> {
        self.inner.borrow().types.clone()
    }

    pub fn add_type(&self, ty: Type) {
        let mut inner = self.inner.borrow_mut();
        if !inner.types.iter().any(|t| t.ptr_eq(&ty)) {
            inner.types.push(ty);
        }
    }

    pub fn functions(&self) -> Vec<Callable> {
        self.inner.borrow().functions.clone()
    }

    pub fn add_function(&self, function: Callable) {
        self.inner.borrow_mut().functions.push(function);
    }

    pub fn ptr_eq(&self, other: &Package) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Package")
            .field("name", &inner.name)
            .field("types", &inner.types.len())
            .field("functions", &inner.functions.len())
            .finish_non_exhaustive()
    }
}
