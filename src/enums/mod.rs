mod classify;
mod cleanup;
mod constructor;
mod extract;
mod holder;

pub use self::holder::HOLDER_FIELD_NAME;
use self::constructor::hide_implicit_parameters;
use self::extract::{ExtractedConstant, Extractor};
use crate::annotations::{CommentLevel, EnumClassInfo, EnumConstant, Entity};
use crate::ir::{ClassId, FieldId, Insn, InsnId, MethodId, Program};
use crate::names;
use noak::AccessFlags;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct EnumPassOptions {
    /// Whether fields may be renamed to the constant name passed to the constructor. Disabled when
    /// the user asked to keep names as they appear in the bytecode.
    pub rename_valid: bool,
}

impl Default for EnumPassOptions {
    fn default() -> Self {
        Self { rename_valid: true }
    }
}

/// Why a class marked as `enum` doesn't look like a javac enum. None of these are errors in the
/// input, just shapes we don't recognize; the class is decompiled as a normal class instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EnumMismatch {
    #[error("no static initializer")]
    MissingClassInit,

    #[error("static initializer has no code")]
    EmptyClassInit,

    #[error("no static array of constants")]
    NoHolderField,

    #[error("cannot tell which array holds the constants, candidates: {candidates}")]
    AmbiguousHolderFields { candidates: String },

    #[error("constant array `{field}` is not assigned in the static initializer")]
    HolderStoreNotFound { field: String },

    #[error("constant array is built in an unsupported way")]
    UnsupportedArrayInit,

    #[error("constant array is allocated without elements but with a non-zero or unknown size")]
    NonEmptyArrayAlloc,

    #[error("element {ordinal} of the constant array has an unrecognized shape")]
    UnrecognizedElement { ordinal: usize },

    #[error("value of element {ordinal} of the constant array has {uses} uses instead of 2")]
    UnexpectedUseCount { ordinal: usize, uses: usize },

    #[error("field {field} is not declared by the class")]
    MissingConstantField { field: String },

    #[error("field `{field}` is not assigned before the constant array")]
    ConstantStoreNotFound { field: String },

    #[error("expected a constructor call in `{insn}`")]
    NotAConstructorCall { insn: String },

    #[error("constructor {method} is called without arguments")]
    ConstructorWithoutArguments { method: String },

    #[error("class `{class}` of an enum constant is unknown")]
    UnknownClass { class: String },

    #[error("class `{class}` of an enum constant is not an enum")]
    DeclaringClassNotEnum { class: String },

    #[error("constructor {method} cannot be resolved")]
    UnknownConstructor { method: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnumOutcome {
    /// The class isn't marked as `enum`; nothing was done.
    NotEnum,
    /// The class already carries enum metadata; nothing was done.
    AlreadyRestored,
    Restored { constants: usize },
    /// The `enum` flag was removed and a comment explaining why was attached.
    Failed(EnumMismatch),
}

impl EnumOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }
}

struct RestorePlan {
    static_init: MethodId,
    holder: FieldId,
    constants: Vec<ExtractedConstant>,
    // Unlinked and unbound on commit. Constructor calls are unlinked separately since the
    // constants keep referring to them.
    removals: Vec<InsnId>,
}

/// Restores a single enum class.
///
/// Matching is done on an immutable view of the class, so if any part of the pattern is off, no
/// change is made besides stripping the `enum` flag and attaching a comment.
#[tracing::instrument(level = "debug", skip_all, fields(class = %program[class].name))]
pub fn restore_enum(
    program: &mut Program,
    class: ClassId,
    options: &EnumPassOptions,
) -> EnumOutcome {
    if !program[class].is_enum() {
        return EnumOutcome::NotEnum;
    }
    if program.annotations.enum_info(class).is_some() {
        debug!("enum metadata already attached");
        return EnumOutcome::AlreadyRestored;
    }

    match match_enum(program, class) {
        Ok(plan) => {
            let constants = plan.constants.len();
            commit(program, class, plan, options);
            debug!(constants, "restored enum class");
            EnumOutcome::Restored { constants }
        }
        Err(mismatch) => {
            debug!(%mismatch, "failed to restore enum class");
            program[class].access_flags.remove(AccessFlags::ENUM);
            program.annotations.add_comment(
                Entity::Class(class),
                CommentLevel::Info,
                format!("Enum class could not be restored, decompiled as a regular class: {mismatch}"),
            );
            EnumOutcome::Failed(mismatch)
        }
    }
}

/// Runs `restore_enum` on every class. Outer classes are visited before their inner classes, since
/// restoring an outer enum may absorb an inner one, which is then skipped.
pub fn restore_enums(program: &mut Program, options: &EnumPassOptions) -> Vec<(ClassId, EnumOutcome)> {
    let inner: FxHashSet<ClassId> = program
        .class_ids()
        .flat_map(|id| program[id].inner_classes.iter().copied())
        .collect();
    let mut stack: Vec<ClassId> = program
        .class_ids()
        .filter(|id| !inner.contains(id))
        .collect();
    stack.reverse();

    let mut visited = FxHashSet::default();
    let mut outcomes = Vec::new();
    while let Some(class) = stack.pop() {
        if !visited.insert(class) {
            continue;
        }
        if !program.annotations.is_dont_generate(Entity::Class(class)) {
            outcomes.push((class, restore_enum(program, class, options)));
        }
        stack.extend(program[class].inner_classes.iter().rev().copied());
    }
    outcomes
}

fn match_enum(program: &Program, class: ClassId) -> Result<RestorePlan, EnumMismatch> {
    let static_init = program
        .class_init(class)
        .ok_or(EnumMismatch::MissingClassInit)?;
    let body = program[static_init]
        .body
        .as_ref()
        .filter(|body| !body.blocks().is_empty())
        .ok_or(EnumMismatch::EmptyClassInit)?;

    let holder = holder::resolve_holder_field(program, class)?;
    let holder_store = holder::find_holder_store(body, &program[holder].info).ok_or_else(|| {
        EnumMismatch::HolderStoreNotFound {
            field: program[holder].info.name.clone(),
        }
    })?;

    let array = classify::wrapped(holder_store.value).ok_or(EnumMismatch::UnsupportedArrayInit)?;
    let mut removals = Vec::new();
    let constants = match &body[array] {
        Insn::FilledNewArray { elements, .. } => Extractor {
            program,
            class,
            body,
            fill: array,
            holder_store: &holder_store,
        }
        .extract_all(elements, &mut removals)?,
        // Enums without constants allocate an empty array.
        Insn::NewArray { length, .. } if classify::is_zero_literal(length) => Vec::new(),
        Insn::NewArray { .. } => return Err(EnumMismatch::NonEmptyArrayAlloc),
        _ => return Err(EnumMismatch::UnsupportedArrayInit),
    };
    removals.push(holder_store.insn);

    Ok(RestorePlan {
        static_init,
        holder,
        constants,
        removals,
    })
}

fn constant_name(program: &Program, static_init: MethodId, constructor: InsnId) -> Option<String> {
    let body = program[static_init].body.as_ref()?;
    let Insn::Construct { arguments, .. } = &body[constructor] else {
        return None;
    };
    classify::const_string(body, arguments.first()?).map(str::to_owned)
}

fn commit(program: &mut Program, class: ClassId, plan: RestorePlan, options: &EnumPassOptions) {
    let RestorePlan {
        static_init,
        holder,
        constants,
        removals,
    } = plan;

    let mut records = Vec::with_capacity(constants.len());
    for (ordinal, constant) in constants.into_iter().enumerate() {
        let ExtractedConstant {
            field,
            constructor,
            candidate,
        } = constant;

        // The string passed to the constructor is the name from the source, which survives even if
        // the field itself was renamed by an obfuscator.
        if options.rename_valid
            && let Some(name) = constant_name(program, static_init, constructor)
            && name != program[field].alias
            && names::is_valid_and_printable(&name)
        {
            trace!(from = %program[field].alias, to = %name, "renaming enum constant");
            program[field].alias = name;
        }

        hide_implicit_parameters(
            &mut program.annotations,
            candidate.constructor,
            candidate.implicit_parameters,
        );
        if candidate.has_register_arguments {
            let text = format!(
                "Constant {} may be constructed incorrectly",
                program[field].info.name
            );
            program
                .annotations
                .add_comment(Entity::Class(class), CommentLevel::Warning, text);
        }

        // A constant with a body is an instance of an anonymous subclass; its body gets printed as
        // part of the constant.
        let mut owner = None;
        if candidate.declaring_class != class
            && program[class]
                .inner_classes
                .contains(&candidate.declaring_class)
        {
            cleanup::absorb_inner_class(program, candidate.declaring_class);
            owner = Some(candidate.declaring_class);
        }

        program.annotations.mark_dont_generate(Entity::Field(field));
        records.push(EnumConstant {
            field,
            ordinal,
            constructor,
            owner,
        });
    }

    let constructors: FxHashSet<InsnId> = records.iter().map(|record| record.constructor).collect();
    program.annotations.set_enum_info(
        class,
        EnumClassInfo {
            constants: records,
            static_init,
        },
    );
    program.annotations.mark_dont_generate(Entity::Field(holder));

    let mut init_is_empty = false;
    if let Some(body) = program[static_init].body.as_mut() {
        let unlinked: Vec<InsnId> = removals
            .iter()
            .chain(&constructors)
            .copied()
            .collect();
        body.unlink(&unlinked);
        for id in removals {
            body.unbind(id, &constructors);
        }
        init_is_empty = body.is_empty();
    }
    if init_is_empty {
        program
            .annotations
            .mark_dont_generate(Entity::Method(static_init));
    }

    cleanup::remove_scaffolding(program, class, holder);
}
