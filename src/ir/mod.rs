mod body;
mod debug;

pub use self::body::{BasicBlock, Insn, InsnId, Literal, MethodBody, MethodBodyBuilder, Operand, SsaVar, VarId};
pub use self::debug::DebugIr;
use crate::annotations::Annotations;
use core::fmt;
use core::ops::{Index, IndexMut};
use noak::AccessFlags;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub u32);

/// A symbolic reference to a field, as it appears in instructions. Class names use the internal
/// form, e.g. `com/example/Color`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

impl FieldRef {
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}[{}]", self.class, self.name, self.descriptor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    pub descriptor: String,
}

impl MethodRef {
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_class_init(&self) -> bool {
        self.name == "<clinit>"
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}[{}]", self.class, self.name, self.descriptor)
    }
}

#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub access_flags: AccessFlags,
    // Declaration order. The holder resolver and the cleanup walk these in order.
    pub fields: Vec<FieldId>,
    pub methods: Vec<MethodId>,
    pub inner_classes: Vec<ClassId>,
}

impl Class {
    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(AccessFlags::ENUM)
    }
}

#[derive(Debug)]
pub struct Field {
    pub info: FieldRef,
    pub access_flags: AccessFlags,
    /// The name the field is displayed under. Starts out equal to `info.name` and may be replaced
    /// by renaming passes; `info` itself is never touched, since instructions refer to it.
    pub alias: String,
}

#[derive(Debug)]
pub struct Method {
    pub info: MethodRef,
    pub access_flags: AccessFlags,
    // `None` for abstract and native methods.
    pub body: Option<MethodBody>,
}

impl Method {
    pub fn is_constructor(&self) -> bool {
        self.info.is_constructor()
    }

    pub fn is_class_init(&self) -> bool {
        self.info.is_class_init()
    }

    pub fn has_empty_body(&self) -> bool {
        self.body.as_ref().is_none_or(MethodBody::is_empty)
    }
}

/// The whole-program index. Classes, fields and methods are stored in arenas and referred to by
/// ID; everything passes attach to them lives in `annotations`.
#[derive(Debug, Default)]
pub struct Program {
    classes: Vec<Class>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    class_index: FxHashMap<String, ClassId>,
    field_index: FxHashMap<FieldRef, FieldId>,
    method_index: FxHashMap<MethodRef, MethodId>,
    pub annotations: Annotations,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, name: impl Into<String>, access_flags: AccessFlags) -> ClassId {
        let name = name.into();
        let id = ClassId(self.classes.len().try_into().expect("class ID overflow"));
        self.class_index.insert(name.clone(), id);
        self.classes.push(Class {
            name,
            access_flags,
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
        });
        id
    }

    pub fn add_inner_class(&mut self, outer: ClassId, inner: ClassId) {
        self[outer].inner_classes.push(inner);
    }

    pub fn add_field(
        &mut self,
        class: ClassId,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        access_flags: AccessFlags,
    ) -> FieldId {
        let info = FieldRef::new(self[class].name.clone(), name, descriptor);
        let id = FieldId(self.fields.len().try_into().expect("field ID overflow"));
        self.field_index.insert(info.clone(), id);
        self.fields.push(Field {
            alias: info.name.clone(),
            info,
            access_flags,
        });
        self[class].fields.push(id);
        id
    }

    pub fn add_method(
        &mut self,
        class: ClassId,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        access_flags: AccessFlags,
        body: Option<MethodBody>,
    ) -> MethodId {
        let info = MethodRef::new(self[class].name.clone(), name, descriptor);
        let id = MethodId(self.methods.len().try_into().expect("method ID overflow"));
        self.method_index.insert(info.clone(), id);
        self.methods.push(Method {
            info,
            access_flags,
            body,
        });
        self[class].methods.push(id);
        id
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.classes.len() as u32).map(ClassId)
    }

    pub fn resolve_class(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    pub fn resolve_method(&self, method: &MethodRef) -> Option<MethodId> {
        self.method_index.get(method).copied()
    }

    /// Looks up a field referenced by an instruction among the fields declared by `class`.
    pub fn search_field(&self, class: ClassId, field: &FieldRef) -> Option<FieldId> {
        self.field_index
            .get(field)
            .copied()
            .filter(|id| self[class].fields.contains(id))
    }

    pub fn class_init(&self, class: ClassId) -> Option<MethodId> {
        self[class]
            .methods
            .iter()
            .copied()
            .find(|id| self[*id].is_class_init())
    }
}

impl Index<ClassId> for Program {
    type Output = Class;

    fn index(&self, id: ClassId) -> &Self::Output {
        &self.classes[id.0 as usize]
    }
}

impl IndexMut<ClassId> for Program {
    fn index_mut(&mut self, id: ClassId) -> &mut Self::Output {
        &mut self.classes[id.0 as usize]
    }
}

impl Index<FieldId> for Program {
    type Output = Field;

    fn index(&self, id: FieldId) -> &Self::Output {
        &self.fields[id.0 as usize]
    }
}

impl IndexMut<FieldId> for Program {
    fn index_mut(&mut self, id: FieldId) -> &mut Self::Output {
        &mut self.fields[id.0 as usize]
    }
}

impl Index<MethodId> for Program {
    type Output = Method;

    fn index(&self, id: MethodId) -> &Self::Output {
        &self.methods[id.0 as usize]
    }
}

impl IndexMut<MethodId> for Program {
    fn index_mut(&mut self, id: MethodId) -> &mut Self::Output {
        &mut self.methods[id.0 as usize]
    }
}
