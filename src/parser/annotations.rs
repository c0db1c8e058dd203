use regex::Regex;

use crate::{DEFAULT_PACKAGE, PACKAGE_SEPARATOR};

/// Scalar annotation types that never produce a type reference.
const SCALAR_TYPES: &[&str] = &[
    "bool", "boolean", "int", "integer", "float", "double", "real",
    "string", "array", "resource", "object", "mixed", "void", "null",
    "number", "numeric", "callback", "unknown_type",
];

/// Extracts typed metadata from doc-comment text.
///
/// All patterns are compiled once at construction. A comment that does
/// not match simply yields an empty result, never an error.
pub struct AnnotationReader {
    package: Regex,
    subpackage: Regex,
    var_type: Regex,
    return_type: Regex,
    throws: Regex,
    inline_var: Regex,
}

impl AnnotationReader {
    pub fn new() -> Self {
        Self {
            package: Regex::new(r"@package\s+([\w\\.]+)").expect("package pattern"),
            subpackage: Regex::new(r"@subpackage\s+([\w\\.]+)").expect("subpackage pattern"),
            var_type: Regex::new(r"@var\s+(array\(\s*(?:\w+\s*=>\s*)?(\w+)\s*\)|[\w|\\]+)")
                .expect("var pattern"),
            return_type: Regex::new(r"@return\s+(array\(\s*(?:\w+\s*=>\s*)?(\w+)\s*\)|[\w|\\]+)")
                .expect("return pattern"),
            throws: Regex::new(r"@throws\s+([\w\\]+)").expect("throws pattern"),
            inline_var: Regex::new(r"^\s*/\*\s*@var\s+\$\w+\s+([\w\\]+)\s*\*/\s*$")
                .expect("inline var pattern"),
        }
    }

    /// The `@package` name, extended with `@subpackage` when present.
    /// Comments without a `@package` tag fall back to the default
    /// package.
    pub fn package_name(&self, comment: &str) -> String {
        match self.package.captures(comment) {
            Some(captures) => {
                let mut package = captures[1].to_string();
                if let Some(sub) = self.subpackage.captures(comment) {
                    package.push_str(PACKAGE_SEPARATOR);
                    package.push_str(&sub[1]);
                }
                package
            }
            None => DEFAULT_PACKAGE.to_string(),
        }
    }

    /// The first non-scalar type named by a `@var` annotation.
    pub fn var_type(&self, comment: &str) -> Option<String> {
        self.var_type
            .captures(comment)
            .and_then(|c| first_non_scalar(&c, 1, 2))
    }

    /// The first non-scalar type named by a `@return` annotation.
    pub fn return_type(&self, comment: &str) -> Option<String> {
        self.return_type
            .captures(comment)
            .and_then(|c| first_non_scalar(&c, 1, 2))
    }

    /// Every type named by a `@throws` annotation, in comment order.
    pub fn throws_types(&self, comment: &str) -> Vec<String> {
        self.throws
            .captures_iter(comment)
            .map(|c| c[1].to_string())
            .collect()
    }

    /// The type named by a whole-comment `/* @var $name Type */` hint.
    pub fn inline_var_type(&self, comment: &str) -> Option<String> {
        self.inline_var
            .captures(comment)
            .map(|c| c[1].to_string())
    }
}

impl Default for AnnotationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the first non-scalar member of a type expression: the inner
/// type of an `array(...)` form, or the first non-scalar member of a
/// `|`-separated union.
fn first_non_scalar(captures: &regex::Captures<'_>, full: usize, array_inner: usize) -> Option<String> {
    if let Some(inner) = captures.get(array_inner) {
        let name = inner.as_str();
        if is_scalar_type(name) {
            return None;
        }
        return Some(name.to_string());
    }
    captures
        .get(full)?
        .as_str()
        .split('|')
        .find(|part| !part.is_empty() && !is_scalar_type(part))
        .map(str::to_string)
}

fn is_scalar_type(name: &str) -> bool {
    let name = name.trim_start_matches('\\');
    SCALAR_TYPES.iter().any(|s| name.eq_ignore_ascii_case(s))
}

#[cfg(test)]
mod tests {
    use super::AnnotationReader;
    use crate::DEFAULT_PACKAGE;

    #[test]
    fn test_package_with_subpackage() {
        let reader = AnnotationReader::new();
        let comment = "/**\n * @package log\n * @subpackage appenders\n */";
        assert_eq!(reader.package_name(comment), "log::appenders");
    }

    #[test]
    fn test_package_without_subpackage() {
        let reader = AnnotationReader::new();
        assert_eq!(reader.package_name("/** @package core */"), "core");
    }

    #[test]
    fn test_missing_package_falls_back() {
        let reader = AnnotationReader::new();
        assert_eq!(reader.package_name("/** just text */"), DEFAULT_PACKAGE);
    }

    #[test]
    fn test_var_type_skips_scalars() {
        let reader = AnnotationReader::new();
        assert_eq!(reader.var_type("/** @var integer */"), None);
        assert_eq!(reader.var_type("/** @var STRING */"), None);
        assert_eq!(
            reader.var_type("/** @var SessionHandler */"),
            Some("SessionHandler".to_string())
        );
    }

    #[test]
    fn test_var_union_picks_first_non_scalar() {
        let reader = AnnotationReader::new();
        assert_eq!(
            reader.var_type("/** @var null|Queue\\Job|string */"),
            Some("Queue\\Job".to_string())
        );
    }

    #[test]
    fn test_var_array_form() {
        let reader = AnnotationReader::new();
        assert_eq!(
            reader.var_type("/** @var array(int=>Record) */"),
            Some("Record".to_string())
        );
        assert_eq!(reader.var_type("/** @var array(string) */"), None);
    }

    #[test]
    fn test_return_type() {
        let reader = AnnotationReader::new();
        assert_eq!(
            reader.return_type("/** @return Response|null */"),
            Some("Response".to_string())
        );
        assert_eq!(reader.return_type("/** @return void */"), None);
    }

    #[test]
    fn test_throws_collects_every_occurrence() {
        let reader = AnnotationReader::new();
        let comment = "/**\n * @throws IOException\n * @throws Net\\SocketException\n * @throws IOException\n */";
        assert_eq!(
            reader.throws_types(comment),
            vec!["IOException", "Net\\SocketException", "IOException"]
        );
    }

    #[test]
    fn test_inline_var() {
        let reader = AnnotationReader::new();
        assert_eq!(
            reader.inline_var_type("/* @var $session Http\\Session */"),
            Some("Http\\Session".to_string())
        );
        assert_eq!(reader.inline_var_type("/* not a hint */"), None);
        assert_eq!(
            reader.inline_var_type("/* @var $x Foo */ trailing"),
            None
        );
    }
}
