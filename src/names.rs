// Reserved words and literals; none of these can name a field in Java source.
const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

// Names are restricted to printable ASCII, where `_` and `$` are the only non-alphanumeric
// characters Java accepts in identifiers.
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_printable(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Checks that `name` can be printed verbatim as a Java identifier.
pub fn is_valid_and_printable(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_identifier_start(first)
        && chars.all(is_identifier_part)
        && name.chars().all(is_printable)
        && !RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_valid_and_printable("RED"));
        assert!(is_valid_and_printable("_x$1"));
        assert!(!is_valid_and_printable("Größe"));
        assert!(!is_valid_and_printable("ÀB"));
        assert!(!is_valid_and_printable(""));
        assert!(!is_valid_and_printable("1abc"));
        assert!(!is_valid_and_printable("two words"));
        assert!(!is_valid_and_printable("a-b"));
        assert!(!is_valid_and_printable("line\nbreak"));
        assert!(!is_valid_and_printable("class"));
        assert!(!is_valid_and_printable("null"));
    }
}
