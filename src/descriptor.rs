use crate::ir::MethodRef;
use noak::MStr;
use noak::descriptor::{BaseType, MethodDescriptor, TypeDescriptor};
use noak::error::DecodeError;

pub const ENUM_CLASS: &str = "java/lang/Enum";

/// Descriptors of the constructors javac synthesizes for enums. The ordinal parameter is sometimes
/// missing when the enum has a single constant.
pub const ENUM_CONSTRUCTOR_DESCRIPTORS: [&str; 2] =
    ["(Ljava/lang/String;I)V", "(Ljava/lang/String;)V"];

// Descriptors are stored as Rust strings. Everything we compare against is ASCII, which is valid
// MUTF-8 as-is.
fn mstr(descriptor: &str) -> Result<&MStr, DecodeError> {
    MStr::from_mutf8(descriptor.as_bytes())
}

/// Checks whether a field descriptor denotes an array, of any rank, of `class` instances.
pub fn is_array_of(descriptor: &str, class: &str) -> Result<bool, DecodeError> {
    let descriptor = TypeDescriptor::parse(mstr(descriptor)?)?;
    let class = mstr(class)?;
    Ok(descriptor.dimensions > 0
        && matches!(descriptor.base, BaseType::Object(name) if name == class))
}

pub fn parameter_count(descriptor: &str) -> Result<usize, DecodeError> {
    Ok(MethodDescriptor::parse(mstr(descriptor)?)?
        .parameters()
        .count())
}

/// The descriptor of the `values()` accessor of `class`.
pub fn values_descriptor(class: &str) -> String {
    format!("()[L{class};")
}

/// `Enum.valueOf(Class, String)`, which the synthesized `valueOf(String)` delegates to.
pub fn enum_value_of() -> MethodRef {
    MethodRef::new(
        ENUM_CLASS,
        "valueOf",
        "(Ljava/lang/Class;Ljava/lang/String;)Ljava/lang/Enum;",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_class() {
        assert_eq!(is_array_of("[La/E;", "a/E").ok(), Some(true));
        assert_eq!(is_array_of("[[La/E;", "a/E").ok(), Some(true));
        assert_eq!(is_array_of("La/E;", "a/E").ok(), Some(false));
        assert_eq!(is_array_of("[La/F;", "a/E").ok(), Some(false));
        assert_eq!(is_array_of("[I", "a/E").ok(), Some(false));
        assert!(is_array_of("[L", "a/E").is_err());
    }

    #[test]
    fn counts_parameters() {
        assert_eq!(parameter_count("(Ljava/lang/String;I)V").ok(), Some(2));
        assert_eq!(parameter_count("(Ljava/lang/String;)V").ok(), Some(1));
        assert_eq!(parameter_count("(Ljava/lang/String;IJ[D)V").ok(), Some(4));
        assert_eq!(parameter_count("()V").ok(), Some(0));
    }

    #[test]
    fn values_accessor() {
        assert_eq!(values_descriptor("a/E"), "()[La/E;");
    }
}
