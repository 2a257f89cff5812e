use super::classify;
use super::constructor::{hide_implicit_parameters, implicit_parameter_count};
use crate::annotations::Entity;
use crate::descriptor::{self, ENUM_CONSTRUCTOR_DESCRIPTORS};
use crate::ir::{ClassId, FieldId, FieldRef, Insn, Method, MethodId, Operand, Program};
use tracing::trace;

/// Hides the methods javac generates for every enum: `values()`, `valueOf(String)`, and the
/// constructor when it does nothing but forward the name and ordinal. All constructors lose their
/// implicit parameters.
pub fn remove_scaffolding(program: &mut Program, class: ClassId, holder: FieldId) {
    let class_name = program[class].name.clone();
    let values_descriptor = descriptor::values_descriptor(&class_name);
    let holder_ref = program[holder].info.clone();

    let mut hidden = Vec::new();
    let mut constructors = Vec::new();
    for method_id in program[class].methods.iter().copied() {
        let method = &program[method_id];
        if method.is_class_init() {
            continue;
        }
        if method.is_constructor() {
            if is_default_constructor(method) {
                hidden.push(method_id);
            }
            constructors.push((method_id, implicit_parameter_count(method)));
        } else if (method.info.name == "values" && method.info.descriptor == values_descriptor)
            || reads_field(method, &holder_ref)
            || is_simple_value_of(method, &class_name)
        {
            hidden.push(method_id);
        }
    }

    for (method_id, count) in constructors {
        hide_implicit_parameters(&mut program.annotations, method_id, count);
    }
    for method_id in hidden {
        trace!(method = %program[method_id].info, "hiding generated enum method");
        program
            .annotations
            .mark_dont_generate(Entity::Method(method_id));
    }
}

fn is_default_constructor(method: &Method) -> bool {
    ENUM_CONSTRUCTOR_DESCRIPTORS.contains(&method.info.descriptor.as_str()) && method.has_empty_body()
}

fn reads_field(method: &Method, field: &FieldRef) -> bool {
    let Some(body) = &method.body else {
        return false;
    };
    body.walk()
        .any(|id| matches!(&body[id], Insn::StaticGet { field: read, .. } if read == field))
}

/// Matches `return (E) Enum.valueOf(E.class, name);`.
fn is_simple_value_of(method: &Method, class_name: &str) -> bool {
    let Some(body) = &method.body else {
        return false;
    };

    let mut returns = body.walk().filter_map(|id| match &body[id] {
        Insn::Return { value: Some(value) } => Some(value),
        _ => None,
    });
    let (Some(value), None) = (returns.next(), returns.next()) else {
        return false;
    };

    let Some(Insn::CheckCast { class, object, .. }) = classify::wrapped(value).map(|id| &body[id])
    else {
        return false;
    };
    if class != class_name {
        return false;
    }
    matches!(
        classify::wrapped(object).map(|id| &body[id]),
        Some(Insn::Invoke { method, .. }) if *method == descriptor::enum_value_of()
    )
}

/// Marks everything generated for an anonymous enum constant body: the class itself and its
/// constructors.
pub fn absorb_inner_class(program: &mut Program, inner: ClassId) {
    let constructors: Vec<MethodId> = program[inner]
        .methods
        .iter()
        .copied()
        .filter(|id| program[*id].is_constructor())
        .collect();
    for method_id in constructors {
        program
            .annotations
            .mark_dont_generate(Entity::Method(method_id));
    }
    program.annotations.mark_dont_generate(Entity::Class(inner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Literal, MethodBody, MethodBodyBuilder, MethodRef};
    use alloc::collections::BTreeSet;
    use noak::AccessFlags;

    fn value_of_body(cast_to: &str, callee: MethodRef, extra_return: bool) -> MethodBody {
        let mut builder = MethodBodyBuilder::new();
        let invoke = builder.wrap(Insn::Invoke {
            method: callee,
            arguments: vec![
                Operand::Literal(Literal::Null),
                Operand::Literal(Literal::String("x".into())),
            ],
            result: None,
        });
        let cast = builder.wrap(Insn::CheckCast {
            class: cast_to.into(),
            object: Operand::Wrapped(invoke),
            result: None,
        });
        builder.push(Insn::Return {
            value: Some(Operand::Wrapped(cast)),
        });
        if extra_return {
            builder.new_block();
            builder.push(Insn::Return {
                value: Some(Operand::Literal(Literal::Null)),
            });
        }
        builder.finish()
    }

    fn method(program: &mut Program, descriptor: &str, body: MethodBody) -> MethodId {
        let class = program
            .resolve_class("a/E")
            .unwrap_or_else(|| program.add_class("a/E", AccessFlags::ENUM));
        program.add_method(
            class,
            "valueOf",
            descriptor,
            AccessFlags::STATIC,
            Some(body),
        )
    }

    #[test]
    fn value_of_shape() {
        let mut program = Program::new();
        let signature = "(Ljava/lang/String;)La/E;";
        let good = method(
            &mut program,
            signature,
            value_of_body("a/E", descriptor::enum_value_of(), false),
        );
        let wrong_cast = method(
            &mut program,
            signature,
            value_of_body("a/F", descriptor::enum_value_of(), false),
        );
        let wrong_callee = method(
            &mut program,
            signature,
            value_of_body("a/E", MethodRef::new("a/E", "lookup", "()V"), false),
        );
        let two_returns = method(
            &mut program,
            signature,
            value_of_body("a/E", descriptor::enum_value_of(), true),
        );

        assert!(is_simple_value_of(&program[good], "a/E"));
        assert!(!is_simple_value_of(&program[wrong_cast], "a/E"));
        assert!(!is_simple_value_of(&program[wrong_callee], "a/E"));
        assert!(!is_simple_value_of(&program[two_returns], "a/E"));
    }

    #[test]
    fn default_constructor_needs_empty_body() {
        let mut program = Program::new();
        let class = program.add_class("a/E", AccessFlags::ENUM);
        let empty = program.add_method(
            class,
            "<init>",
            "(Ljava/lang/String;I)V",
            AccessFlags::PRIVATE,
            Some(MethodBody::default()),
        );
        let mut builder = MethodBodyBuilder::new();
        builder.push(Insn::Other {
            name: "log".into(),
            operands: Vec::new(),
            result: None,
        });
        let busy = program.add_method(
            class,
            "<init>",
            "(Ljava/lang/String;)V",
            AccessFlags::PRIVATE,
            Some(builder.finish()),
        );
        let custom = program.add_method(
            class,
            "<init>",
            "(Ljava/lang/String;II)V",
            AccessFlags::PRIVATE,
            Some(MethodBody::default()),
        );

        assert!(is_default_constructor(&program[empty]));
        assert!(!is_default_constructor(&program[busy]));
        assert!(!is_default_constructor(&program[custom]));
    }

    #[test]
    fn unparsable_constructor_keeps_ordinal_parameter() {
        let mut program = Program::new();
        let class = program.add_class("a/E", AccessFlags::ENUM);
        let holder = program.add_field(
            class,
            "$VALUES",
            "[La/E;",
            AccessFlags::STATIC | AccessFlags::SYNTHETIC,
        );
        let broken = program.add_method(
            class,
            "<init>",
            "(Ljava/lang/String",
            AccessFlags::PRIVATE,
            Some(MethodBody::default()),
        );
        let default = program.add_method(
            class,
            "<init>",
            "(Ljava/lang/String;I)V",
            AccessFlags::PRIVATE,
            Some(MethodBody::default()),
        );

        remove_scaffolding(&mut program, class, holder);
        assert_eq!(
            program.annotations.skipped_args(broken),
            Some(&BTreeSet::from([0]))
        );
        assert!(!program.annotations.is_dont_generate(Entity::Method(broken)));
        assert_eq!(
            program.annotations.skipped_args(default),
            Some(&BTreeSet::from([0, 1]))
        );
        assert!(program.annotations.is_dont_generate(Entity::Method(default)));
    }
}
