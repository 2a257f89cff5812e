use super::{Insn, InsnId, Literal, MethodBody, Operand, VarId};
use core::fmt::{self, Display};

pub trait DebugIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>, body: &MethodBody) -> fmt::Result;
}

impl<T: DebugIr + ?Sized> DebugIr for &T {
    fn fmt(&self, f: &mut fmt::Formatter<'_>, body: &MethodBody) -> fmt::Result {
        T::fmt(self, f, body)
    }
}

impl DebugIr for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>, body: &MethodBody) -> fmt::Result {
        DebugIr::fmt(&body[*self], f, body)
    }
}

impl MethodBody {
    pub fn debug<'a, T: DebugIr + ?Sized>(&'a self, value: &'a T) -> impl Display + 'a {
        struct IrDisplay<'a, T: ?Sized> {
            value: &'a T,
            body: &'a MethodBody,
        }

        impl<T: DebugIr + ?Sized> Display for IrDisplay<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                T::fmt(self.value, f, self.body)
            }
        }

        IrDisplay { value, body: self }
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl DebugIr for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>, body: &MethodBody) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Register(var) => write!(f, "{var}"),
            Self::Wrapped(insn) => write!(f, "({})", body.debug(insn)),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, body: &MethodBody, operands: &[Operand]) -> fmt::Result {
    if let Some(first) = operands.first() {
        write!(f, "{}", body.debug(first))?;
        for operand in &operands[1..] {
            write!(f, ", {}", body.debug(operand))?;
        }
    }
    Ok(())
}

impl DebugIr for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>, body: &MethodBody) -> fmt::Result {
        if let Some(result) = self.result() {
            write!(f, "{result} = ")?;
        }
        match self {
            Self::StaticPut { field, value } => write!(f, "{field} = {}", body.debug(value)),
            Self::StaticGet { field, .. } => write!(f, "{field}"),
            Self::FilledNewArray {
                element_type,
                elements,
                ..
            } => {
                write!(f, "new {element_type}[] {{")?;
                write_list(f, body, elements)?;
                write!(f, "}}")
            }
            Self::NewArray {
                element_type,
                length,
                ..
            } => write!(f, "new {element_type}[{}]", body.debug(length)),
            Self::Construct {
                method, arguments, ..
            } => {
                write!(f, "new {method}(")?;
                write_list(f, body, arguments)?;
                write!(f, ")")
            }
            Self::CheckCast { class, object, .. } => {
                write!(f, "({class})({})", body.debug(object))
            }
            Self::Invoke {
                method, arguments, ..
            } => {
                write!(f, "{method}(")?;
                write_list(f, body, arguments)?;
                write!(f, ")")
            }
            Self::Const { value, .. } => write!(f, "{value}"),
            Self::Return { value: Some(value) } => write!(f, "return {}", body.debug(value)),
            Self::Return { value: None } => write!(f, "return"),
            Self::Other { name, operands, .. } => {
                write!(f, "{name} ")?;
                write_list(f, body, operands)
            }
        }
    }
}
