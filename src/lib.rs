//! Restoration of Java `enum` classes from their javac lowering.
//!
//! javac compiles an enum into an ordinary class with a static field per constant, a synthetic
//! `$VALUES` array, `values()`/`valueOf()` accessors, and a constructor taking the constant name
//! and ordinal as two hidden leading parameters. Given a class lifted into SSA form, this crate
//! recognizes that scaffolding, records the constants in order, and marks the scaffolding so that
//! code generation can print an `enum` declaration instead.

extern crate alloc;

pub mod annotations;
pub mod descriptor;
pub mod enums;
pub mod ir;
pub mod names;

pub use self::enums::{EnumMismatch, EnumOutcome, EnumPassOptions, restore_enum, restore_enums};
