//! Binary and internal class name helpers.
//!
//! Binary names use dots (`com.acme.Foo$Inner`), internal names use slashes
//! (`com/acme/Foo$Inner`). Nested classes keep their `$` in both forms.

/// Convert a binary name to its internal form.
///
/// # Examples
/// ```
/// use interpose_core::names::internal_name;
/// assert_eq!(internal_name("java.lang.Object"), "java/lang/Object");
/// ```
pub fn internal_name(binary: &str) -> String {
    binary.replace('.', "/")
}

/// Convert an internal name to its binary form.
pub fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Package part of a binary name, empty for the unnamed package.
pub fn package_of(binary: &str) -> &str {
    binary.rfind('.').map_or("", |idx| &binary[..idx])
}

/// Last segment of a binary name (`Foo$Inner` for `com.acme.Foo$Inner`).
pub fn simple_name(binary: &str) -> &str {
    binary.rfind('.').map_or(binary, |idx| &binary[idx + 1..])
}

/// Join a package and a simple name, handling the unnamed package.
pub fn qualify(package: &str, simple: &str) -> String {
    if package.is_empty() {
        simple.to_owned()
    } else {
        format!("{package}.{simple}")
    }
}

/// Dot-separated Java identifiers, each non-empty.
pub fn is_valid_binary_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
