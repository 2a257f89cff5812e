use super::EnumMismatch;
use crate::descriptor;
use crate::ir::{ClassId, FieldId, FieldRef, Insn, InsnId, MethodBody, Operand, Program};
use noak::AccessFlags;

/// The name javac gives to the array backing `values()`.
pub const HOLDER_FIELD_NAME: &str = "$VALUES";

/// Finds the static field holding the array of all constants.
pub fn resolve_holder_field(program: &Program, class: ClassId) -> Result<FieldId, EnumMismatch> {
    let class_name = &program[class].name;

    let all_candidates: Vec<FieldId> = program[class]
        .fields
        .iter()
        .copied()
        .filter(|id| {
            let field = &program[*id];
            // A field with an unparsable descriptor can't hold the constants, so it's simply not
            // a candidate.
            field.access_flags.contains(AccessFlags::STATIC)
                && descriptor::is_array_of(&field.info.descriptor, class_name).unwrap_or(false)
        })
        .collect();

    let mut candidates = all_candidates.clone();
    if candidates.len() > 1 {
        candidates.retain(|id| program[*id].access_flags.contains(AccessFlags::SYNTHETIC));
    }
    if candidates.len() > 1
        && let Some(canonical) = candidates
            .iter()
            .copied()
            .find(|id| program[*id].info.name == HOLDER_FIELD_NAME)
    {
        candidates = vec![canonical];
    }

    match *candidates.as_slice() {
        [holder] => Ok(holder),
        _ if all_candidates.is_empty() => Err(EnumMismatch::NoHolderField),
        // Picking one at random could attach the constants to a user-defined array, so report
        // everything we've seen instead.
        _ => Err(EnumMismatch::AmbiguousHolderFields {
            candidates: all_candidates
                .iter()
                .map(|id| program[*id].info.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// The `StaticPut` initializing the holder field.
#[derive(Debug)]
pub struct HolderStore<'a> {
    pub insn: InsnId,
    pub block: usize,
    /// Index of the instruction within its block.
    pub position: usize,
    pub value: &'a Operand,
}

pub fn find_holder_store<'a>(body: &'a MethodBody, holder: &FieldRef) -> Option<HolderStore<'a>> {
    for (block, bb) in body.blocks().iter().enumerate() {
        for (position, id) in bb.insns.iter().copied().enumerate() {
            if let Insn::StaticPut { field, value } = &body[id]
                && field == holder
            {
                return Some(HolderStore {
                    insn: id,
                    block,
                    position,
                    value,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Literal, MethodBodyBuilder};

    fn class_with_arrays(fields: &[(&str, AccessFlags)]) -> (Program, ClassId, Vec<FieldId>) {
        let mut program = Program::new();
        let class = program.add_class("a/E", AccessFlags::PUBLIC | AccessFlags::ENUM);
        let ids = fields
            .iter()
            .map(|(name, flags)| program.add_field(class, *name, "[La/E;", *flags))
            .collect();
        (program, class, ids)
    }

    #[test]
    fn single_candidate() {
        let (mut program, class, ids) = class_with_arrays(&[("arr", AccessFlags::STATIC)]);
        program.add_field(class, "inst", "[La/E;", AccessFlags::PRIVATE);
        program.add_field(class, "other", "[La/F;", AccessFlags::STATIC);
        program.add_field(class, "RED", "La/E;", AccessFlags::STATIC);
        assert_eq!(resolve_holder_field(&program, class).ok(), Some(ids[0]));
    }

    #[test]
    fn no_candidates() {
        let (program, class, _) = class_with_arrays(&[]);
        assert!(matches!(
            resolve_holder_field(&program, class),
            Err(EnumMismatch::NoHolderField)
        ));
    }

    #[test]
    fn prefers_synthetic() {
        let synthetic = AccessFlags::STATIC | AccessFlags::SYNTHETIC;
        let (program, class, ids) =
            class_with_arrays(&[("mine", AccessFlags::STATIC), ("$x", synthetic)]);
        assert_eq!(resolve_holder_field(&program, class).ok(), Some(ids[1]));
    }

    #[test]
    fn prefers_canonical_name_among_synthetic() {
        let synthetic = AccessFlags::STATIC | AccessFlags::SYNTHETIC;
        let (program, class, ids) = class_with_arrays(&[
            ("$x", synthetic),
            ("$VALUES", synthetic),
            ("mine", AccessFlags::STATIC),
        ]);
        assert_eq!(resolve_holder_field(&program, class).ok(), Some(ids[1]));
    }

    #[test]
    fn ambiguous_user_fields() {
        let (program, class, _) =
            class_with_arrays(&[("A", AccessFlags::STATIC), ("B", AccessFlags::STATIC)]);
        match resolve_holder_field(&program, class) {
            Err(EnumMismatch::AmbiguousHolderFields { candidates }) => {
                assert_eq!(candidates, "A, B");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn ambiguous_synthetic_fields() {
        let synthetic = AccessFlags::STATIC | AccessFlags::SYNTHETIC;
        let (program, class, _) = class_with_arrays(&[("$a", synthetic), ("$b", synthetic)]);
        assert!(matches!(
            resolve_holder_field(&program, class),
            Err(EnumMismatch::AmbiguousHolderFields { .. })
        ));
    }

    #[test]
    fn store_search_spans_blocks() {
        let holder = FieldRef::new("a/E", "$VALUES", "[La/E;");
        let mut builder = MethodBodyBuilder::new();
        builder.push(Insn::Other {
            name: "nop".into(),
            operands: Vec::new(),
            result: None,
        });
        builder.new_block();
        builder.push(Insn::StaticPut {
            field: FieldRef::new("a/E", "other", "[La/E;"),
            value: Operand::Literal(Literal::Null),
        });
        let store = builder.push(Insn::StaticPut {
            field: holder.clone(),
            value: Operand::Literal(Literal::Null),
        });
        let body = builder.finish();

        let found = find_holder_store(&body, &holder).expect("store not found");
        assert_eq!((found.insn, found.block, found.position), (store, 1, 1));
        assert!(find_holder_store(&body, &FieldRef::new("a/E", "x", "[La/E;")).is_none());
    }
}
