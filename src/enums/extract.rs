use super::EnumMismatch;
use super::classify;
use super::constructor::{ConstructorCandidate, validate_constructor};
use super::holder::HolderStore;
use crate::ir::{ClassId, FieldId, FieldRef, Insn, InsnId, MethodBody, Operand, Program, VarId};
use tracing::trace;

#[derive(Debug)]
pub struct ExtractedConstant {
    pub field: FieldId,
    pub constructor: InsnId,
    pub candidate: ConstructorCandidate,
}

/// Matches the elements of the `$VALUES` array initializer against the shapes javac produces.
///
/// Depending on whether earlier passes managed to inline the constructor call into the store, each
/// constant is either read back from its field:
///
/// ```text
/// A = new E("A", 0);
/// B = new E("B", 1);
/// $VALUES = new E[] { A, B };
/// ```
///
/// ...or passed through a register that is used exactly twice:
///
/// ```text
/// r0 = new E("A", 0);
/// A = r0;
/// $VALUES = new E[] { r0 };
/// ```
pub struct Extractor<'a> {
    pub program: &'a Program,
    pub class: ClassId,
    pub body: &'a MethodBody,
    /// The `FilledNewArray` instruction.
    pub fill: InsnId,
    pub holder_store: &'a HolderStore<'a>,
}

impl<'a> Extractor<'a> {
    /// Extracts one constant per element, in array order. Instructions that become redundant are
    /// appended to `removals`; nothing is modified.
    pub fn extract_all(
        &self,
        elements: &[Operand],
        removals: &mut Vec<InsnId>,
    ) -> Result<Vec<ExtractedConstant>, EnumMismatch> {
        elements
            .iter()
            .enumerate()
            .map(|(ordinal, element)| {
                let constant = match element {
                    Operand::Wrapped(get) => self.by_field(ordinal, *get, removals)?,
                    Operand::Register(var) => self.by_register(ordinal, *var, removals)?,
                    Operand::Literal(_) => return Err(EnumMismatch::UnrecognizedElement { ordinal }),
                };
                trace!(
                    ordinal,
                    constructor = %self.body.debug(&constant.constructor),
                    "matched enum constant"
                );
                Ok(constant)
            })
            .collect()
    }

    fn by_field(
        &self,
        ordinal: usize,
        get: InsnId,
        removals: &mut Vec<InsnId>,
    ) -> Result<ExtractedConstant, EnumMismatch> {
        let Insn::StaticGet {
            field: field_ref, ..
        } = &self.body[get]
        else {
            return Err(EnumMismatch::UnrecognizedElement { ordinal });
        };
        let field = self.search_field(field_ref)?;

        let (store, value) =
            self.find_constant_store(field)
                .ok_or_else(|| EnumMismatch::ConstantStoreNotFound {
                    field: field_ref.name.clone(),
                })?;
        let constructor = classify::producer(self.body, value)
            .filter(|id| classify::is_construct(self.body, *id))
            .ok_or_else(|| EnumMismatch::NotAConstructorCall {
                insn: self.body.debug(&store).to_string(),
            })?;
        let candidate = validate_constructor(self.program, self.class, self.body, constructor)?;

        removals.extend([get, store]);
        Ok(ExtractedConstant {
            field,
            constructor,
            candidate,
        })
    }

    fn by_register(
        &self,
        ordinal: usize,
        var: VarId,
        removals: &mut Vec<InsnId>,
    ) -> Result<ExtractedConstant, EnumMismatch> {
        // One use is the array itself, the other one has to be the store to the constant field.
        let uses = &self.body[var].uses;
        if uses.len() != 2 {
            return Err(EnumMismatch::UnexpectedUseCount {
                ordinal,
                uses: uses.len(),
            });
        }
        let store = uses
            .iter()
            .copied()
            .find(|id| *id != self.fill)
            .ok_or(EnumMismatch::UnrecognizedElement { ordinal })?;
        let Insn::StaticPut {
            field: field_ref, ..
        } = &self.body[store]
        else {
            return Err(EnumMismatch::UnrecognizedElement { ordinal });
        };
        let field = self.search_field(field_ref)?;

        let constructor = self.body[var]
            .def
            .filter(|id| classify::is_construct(self.body, *id))
            .ok_or_else(|| EnumMismatch::NotAConstructorCall {
                insn: self.body.debug(&store).to_string(),
            })?;
        let candidate = validate_constructor(self.program, self.class, self.body, constructor)?;

        removals.push(store);
        Ok(ExtractedConstant {
            field,
            constructor,
            candidate,
        })
    }

    fn search_field(&self, field: &FieldRef) -> Result<FieldId, EnumMismatch> {
        self.program
            .search_field(self.class, field)
            .ok_or_else(|| EnumMismatch::MissingConstantField {
                field: field.to_string(),
            })
    }

    /// Looks for the store to a constant field among the instructions preceding the `$VALUES`
    /// store in the same block.
    fn find_constant_store(&self, field: FieldId) -> Option<(InsnId, &'a Operand)> {
        let body = self.body;
        let bb = &body.blocks()[self.holder_store.block];
        bb.insns[..self.holder_store.position]
            .iter()
            .copied()
            .find_map(|id| match &body[id] {
                Insn::StaticPut {
                    field: field_ref,
                    value,
                } if self.program.search_field(self.class, field_ref) == Some(field) => {
                    Some((id, value))
                }
                _ => None,
            })
    }
}
