// Everything passes attach to classes, fields and methods is kept here, keyed by entity ID, rather
// than in the IR types themselves. Code generation consults these maps to decide what to print.

use crate::ir::{ClassId, FieldId, InsnId, MethodId};
use alloc::collections::BTreeSet;
use displaydoc::Display;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Class(ClassId),
    Field(FieldId),
    Method(MethodId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum CommentLevel {
    /// INFO
    Info,
    /// WARNING
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Display)]
/// {level}: {text}
pub struct Comment {
    pub level: CommentLevel,
    pub text: String,
}

/// A single restored enum constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumConstant {
    pub field: FieldId,
    /// Position in the `values()` array.
    pub ordinal: usize,
    /// The `Construct` instruction in the static initializer's body. It is unlinked from its basic
    /// block but stays in the arena with its operands bound.
    pub constructor: InsnId,
    /// The anonymous inner class holding the constant's body, if it has one.
    pub owner: Option<ClassId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumClassInfo {
    pub constants: Vec<EnumConstant>,
    pub static_init: MethodId,
}

#[derive(Debug, Default)]
pub struct Annotations {
    dont_generate: FxHashSet<Entity>,
    skipped_args: FxHashMap<MethodId, BTreeSet<usize>>,
    comments: FxHashMap<Entity, Vec<Comment>>,
    enum_classes: FxHashMap<ClassId, EnumClassInfo>,
}

impl Annotations {
    pub fn mark_dont_generate(&mut self, entity: Entity) {
        self.dont_generate.insert(entity);
    }

    pub fn is_dont_generate(&self, entity: Entity) -> bool {
        self.dont_generate.contains(&entity)
    }

    /// Hides a parameter from the regenerated method signature.
    pub fn skip_arg(&mut self, method: MethodId, index: usize) {
        self.skipped_args.entry(method).or_default().insert(index);
    }

    pub fn skipped_args(&self, method: MethodId) -> Option<&BTreeSet<usize>> {
        self.skipped_args.get(&method)
    }

    pub fn add_comment(&mut self, entity: Entity, level: CommentLevel, text: impl Into<String>) {
        self.comments.entry(entity).or_default().push(Comment {
            level,
            text: text.into(),
        });
    }

    pub fn comments(&self, entity: Entity) -> &[Comment] {
        self.comments.get(&entity).map(Vec::as_slice).unwrap_or_default()
    }

    /// Attaches restored enum metadata. Returns `false` without overwriting if the class already
    /// has some.
    pub fn set_enum_info(&mut self, class: ClassId, info: EnumClassInfo) -> bool {
        match self.enum_classes.entry(class) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(info);
                true
            }
        }
    }

    pub fn enum_info(&self, class: ClassId) -> Option<&EnumClassInfo> {
        self.enum_classes.get(&class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_args_accumulate() {
        let mut annotations = Annotations::default();
        let method = MethodId(3);
        assert_eq!(annotations.skipped_args(method), None);
        annotations.skip_arg(method, 1);
        annotations.skip_arg(method, 0);
        annotations.skip_arg(method, 1);
        assert_eq!(
            annotations.skipped_args(method),
            Some(&BTreeSet::from([0, 1]))
        );
    }

    #[test]
    fn comments_render_with_level() {
        let mut annotations = Annotations::default();
        let class = Entity::Class(ClassId(0));
        assert!(annotations.comments(class).is_empty());
        annotations.add_comment(class, CommentLevel::Warning, "careful");
        assert_eq!(annotations.comments(class)[0].to_string(), "WARNING: careful");
    }

    #[test]
    fn enum_info_is_attached_once() {
        let mut annotations = Annotations::default();
        let info = EnumClassInfo {
            constants: Vec::new(),
            static_init: MethodId(0),
        };
        assert!(annotations.set_enum_info(ClassId(0), info.clone()));
        assert!(!annotations.set_enum_info(
            ClassId(0),
            EnumClassInfo {
                static_init: MethodId(1),
                ..info
            }
        ));
        assert_eq!(
            annotations.enum_info(ClassId(0)).map(|info| info.static_init),
            Some(MethodId(0))
        );
    }
}
