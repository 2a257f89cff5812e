use super::EnumMismatch;
use super::classify;
use crate::annotations::Annotations;
use crate::descriptor;
use crate::ir::{ClassId, Insn, InsnId, Method, MethodBody, MethodId, Program};

/// What committing a constant's constructor call would change. Validation itself doesn't touch the
/// program, so a class that turns out not to be an enum later on is left as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorCandidate {
    /// The class being instantiated. Differs from the enum class for constants with a body.
    pub declaring_class: ClassId,
    pub constructor: MethodId,
    /// How many leading parameters (name, then ordinal) to hide from the signature.
    pub implicit_parameters: usize,
    /// Set if an argument past the implicit ones is a local variable, which means some
    /// initialization code was interleaved with the constructor call and will be lost.
    pub has_register_arguments: bool,
}

/// The name parameter is always hidden; the ordinal only if the constructor has one. javac omits it
/// for some single-constant enums.
pub fn implicit_parameter_count(method: &Method) -> usize {
    match descriptor::parameter_count(&method.info.descriptor) {
        Ok(count) if count > 1 => 2,
        _ => 1,
    }
}

pub fn hide_implicit_parameters(annotations: &mut Annotations, method: MethodId, count: usize) {
    for index in 0..count {
        annotations.skip_arg(method, index);
    }
}

pub fn validate_constructor(
    program: &Program,
    class: ClassId,
    body: &MethodBody,
    insn: InsnId,
) -> Result<ConstructorCandidate, EnumMismatch> {
    let Insn::Construct {
        method, arguments, ..
    } = &body[insn]
    else {
        return Err(EnumMismatch::NotAConstructorCall {
            insn: body.debug(&insn).to_string(),
        });
    };

    // Usually `<init>(Ljava/lang/String;I)V`, but the ordinal can be missing.
    if arguments.is_empty() {
        return Err(EnumMismatch::ConstructorWithoutArguments {
            method: method.to_string(),
        });
    }

    let declaring_class =
        program
            .resolve_class(&method.class)
            .ok_or_else(|| EnumMismatch::UnknownClass {
                class: method.class.clone(),
            })?;
    if declaring_class != class && !program[declaring_class].is_enum() {
        return Err(EnumMismatch::DeclaringClassNotEnum {
            class: method.class.clone(),
        });
    }

    let constructor =
        program
            .resolve_method(method)
            .ok_or_else(|| EnumMismatch::UnknownConstructor {
                method: method.to_string(),
            })?;
    let implicit_parameters = implicit_parameter_count(&program[constructor]);

    Ok(ConstructorCandidate {
        declaring_class,
        constructor,
        implicit_parameters,
        has_register_arguments: arguments
            .iter()
            .skip(implicit_parameters)
            .any(classify::is_register),
    })
}
