use crate::ir::{Insn, InsnId, Literal, MethodBody, Operand};

pub fn wrapped(operand: &Operand) -> Option<InsnId> {
    match operand {
        Operand::Wrapped(id) => Some(*id),
        Operand::Literal(_) | Operand::Register(_) => None,
    }
}

/// Finds the instruction producing the value of `operand`: the wrapped instruction itself, or the
/// definition of the register.
pub fn producer(body: &MethodBody, operand: &Operand) -> Option<InsnId> {
    match operand {
        Operand::Wrapped(id) => Some(*id),
        Operand::Register(var) => body[*var].def,
        Operand::Literal(_) => None,
    }
}

pub fn is_zero_literal(operand: &Operand) -> bool {
    matches!(operand, Operand::Literal(Literal::Int(0)))
}

pub fn is_construct(body: &MethodBody, id: InsnId) -> bool {
    matches!(body[id], Insn::Construct { .. })
}

/// Whether the operand reads a local, as opposed to a constant or an inlined expression.
pub fn is_register(operand: &Operand) -> bool {
    matches!(operand, Operand::Register(_))
}

/// Extracts a string constant, either written inline or as a wrapped `Const` instruction.
pub fn const_string<'a>(body: &'a MethodBody, operand: &'a Operand) -> Option<&'a str> {
    let literal = match operand {
        Operand::Literal(literal) => literal,
        Operand::Wrapped(id) => match &body[*id] {
            Insn::Const { value, .. } => value,
            _ => return None,
        },
        Operand::Register(_) => return None,
    };
    match literal {
        Literal::String(value) => Some(value.as_str()),
        Literal::Int(_) | Literal::Null => None,
    }
}
