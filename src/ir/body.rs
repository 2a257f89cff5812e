use super::{FieldRef, MethodRef};
use core::ops::Index;
use rustc_hash::FxHashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InsnId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Null,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Register(VarId),
    // An instruction inlined into its only use. Wrapped instructions are allocated in the method's
    // arena but not listed in any basic block.
    Wrapped(InsnId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Insn {
    StaticPut {
        field: FieldRef,
        value: Operand,
    },
    StaticGet {
        field: FieldRef,
        result: Option<VarId>,
    },
    FilledNewArray {
        element_type: String,
        elements: Vec<Operand>,
        result: Option<VarId>,
    },
    NewArray {
        element_type: String,
        length: Operand,
        result: Option<VarId>,
    },
    /// Allocation fused with the constructor call. `arguments` excludes the receiver.
    Construct {
        method: MethodRef,
        arguments: Vec<Operand>,
        result: Option<VarId>,
    },
    CheckCast {
        class: String,
        object: Operand,
        result: Option<VarId>,
    },
    // For instance calls, the receiver is the first argument.
    Invoke {
        method: MethodRef,
        arguments: Vec<Operand>,
        result: Option<VarId>,
    },
    Const {
        value: Literal,
        result: Option<VarId>,
    },
    Return {
        value: Option<Operand>,
    },
    // Anything this crate has no reason to look into.
    Other {
        name: String,
        operands: Vec<Operand>,
        result: Option<VarId>,
    },
}

impl Insn {
    /// Direct operands in evaluation order, not recursing into wrapped instructions.
    pub fn operands(&self) -> &[Operand] {
        match self {
            Self::StaticPut { value: operand, .. }
            | Self::NewArray {
                length: operand, ..
            }
            | Self::CheckCast {
                object: operand, ..
            } => core::slice::from_ref(operand),

            Self::FilledNewArray {
                elements: operands,
                ..
            }
            | Self::Construct {
                arguments: operands,
                ..
            }
            | Self::Invoke {
                arguments: operands,
                ..
            }
            | Self::Other { operands, .. } => operands,

            Self::Return { value } => value.as_slice(),

            Self::StaticGet { .. } | Self::Const { .. } => &[],
        }
    }

    pub fn result(&self) -> Option<VarId> {
        match self {
            Self::StaticGet { result, .. }
            | Self::FilledNewArray { result, .. }
            | Self::NewArray { result, .. }
            | Self::Construct { result, .. }
            | Self::CheckCast { result, .. }
            | Self::Invoke { result, .. }
            | Self::Const { result, .. }
            | Self::Other { result, .. } => *result,

            Self::StaticPut { .. } | Self::Return { .. } => None,
        }
    }
}

/// An SSA variable. Both the definition and the uses are handles into the owning method's
/// instruction arena.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SsaVar {
    pub def: Option<InsnId>,
    // One entry per operand slot, so an instruction mentioning the variable twice is listed twice.
    pub uses: Vec<InsnId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicBlock {
    pub insns: Vec<InsnId>,
}

#[derive(Clone, Debug, Default)]
pub struct MethodBody {
    insns: Vec<Insn>,
    vars: Vec<SsaVar>,
    blocks: Vec<BasicBlock>,
}

impl MethodBody {
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Counts instructions listed in basic blocks. Wrapped instructions are not counted.
    pub fn insn_count(&self) -> usize {
        self.blocks.iter().map(|bb| bb.insns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|bb| bb.insns.is_empty())
    }

    pub fn block_of(&self, id: InsnId) -> Option<usize> {
        self.blocks.iter().position(|bb| bb.insns.contains(&id))
    }

    /// Iterates over every instruction reachable from the basic blocks, wrapped instructions
    /// included. Each listed instruction is yielded before the instructions wrapped into it.
    pub fn walk(&self) -> impl Iterator<Item = InsnId> + '_ {
        let mut stack: Vec<InsnId> = self
            .blocks
            .iter()
            .rev()
            .flat_map(|bb| bb.insns.iter().rev().copied())
            .collect();
        core::iter::from_fn(move || {
            let id = stack.pop()?;
            for operand in self[id].operands().iter().rev() {
                if let Operand::Wrapped(inner) = operand {
                    stack.push(*inner);
                }
            }
            Some(id)
        })
    }

    /// Removes instructions from their basic blocks. The instructions stay in the arena, so
    /// existing handles remain valid, and their operands stay bound.
    pub fn unlink(&mut self, ids: &[InsnId]) {
        let ids: FxHashSet<InsnId> = ids.iter().copied().collect();
        for bb in &mut self.blocks {
            bb.insns.retain(|id| !ids.contains(id));
        }
    }

    /// Drops the uses recorded for the operands of `id`, recursing into wrapped instructions except
    /// those listed in `keep`.
    pub fn unbind(&mut self, id: InsnId, keep: &FxHashSet<InsnId>) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let operands = self[id].operands().to_vec();
            for operand in operands {
                match operand {
                    Operand::Register(var) => {
                        let uses = &mut self.vars[var.0 as usize].uses;
                        if let Some(pos) = uses.iter().position(|user| *user == id) {
                            uses.remove(pos);
                        }
                    }
                    Operand::Wrapped(inner) => {
                        if !keep.contains(&inner) {
                            stack.push(inner);
                        }
                    }
                    Operand::Literal(_) => {}
                }
            }
        }
    }
}

impl Index<InsnId> for MethodBody {
    type Output = Insn;

    fn index(&self, id: InsnId) -> &Self::Output {
        &self.insns[id.0 as usize]
    }
}

impl Index<VarId> for MethodBody {
    type Output = SsaVar;

    fn index(&self, id: VarId) -> &Self::Output {
        &self.vars[id.0 as usize]
    }
}

/// Allocates instructions and keeps def/use lists in sync. Instructions are appended to the
/// current basic block, which starts out as the first one.
#[derive(Debug)]
pub struct MethodBodyBuilder {
    body: MethodBody,
    current_block: usize,
}

impl MethodBodyBuilder {
    pub fn new() -> Self {
        Self {
            body: MethodBody {
                blocks: vec![BasicBlock::default()],
                ..MethodBody::default()
            },
            current_block: 0,
        }
    }

    /// Starts a new basic block and makes it current.
    pub fn new_block(&mut self) -> usize {
        self.body.blocks.push(BasicBlock::default());
        self.current_block = self.body.blocks.len() - 1;
        self.current_block
    }

    pub fn var(&mut self) -> VarId {
        let id = VarId(self.body.vars.len().try_into().expect("variable ID overflow"));
        self.body.vars.push(SsaVar::default());
        id
    }

    /// Allocates an instruction without listing it in a block, for use as `Operand::Wrapped`.
    pub fn wrap(&mut self, insn: Insn) -> InsnId {
        let id = InsnId(self.body.insns.len().try_into().expect("instruction ID overflow"));
        for operand in insn.operands() {
            if let Operand::Register(var) = operand {
                self.body.vars[var.0 as usize].uses.push(id);
            }
        }
        if let Some(var) = insn.result() {
            self.body.vars[var.0 as usize].def = Some(id);
        }
        self.body.insns.push(insn);
        id
    }

    pub fn push(&mut self, insn: Insn) -> InsnId {
        let id = self.wrap(insn);
        self.body.blocks[self.current_block].insns.push(id);
        id
    }

    pub fn finish(self) -> MethodBody {
        self.body
    }
}

impl Default for MethodBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
