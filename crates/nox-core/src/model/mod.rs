//! Declaration model consumed by the analysis.
//!
//! A [`TranslationUnit`] is the read-only view of one parsed file that an
//! external front-end hands to nox: the aggregates (records) it defines,
//! the destructor declarations found in it, the byte ranges that came from
//! macro expansions, and the named constants a `noexcept(...)` operand may
//! refer to. Everything is addressed by dense ids so that the document can
//! be serialized as plain JSON.

mod expr;

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{NoxError, Result};
use crate::span::TextRange;

pub use expr::{BinaryOp, ConstValue, EvalError, SpecExpr, UnaryOp};

/// Identity of a destructor declaration (index into [`TranslationUnit::destructors`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

/// Identity of a record (index into [`TranslationUnit::records`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}", self.0)
    }
}

/// One parsed file as seen by the rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUnit {
    /// Path of the source file the ranges refer to.
    pub file: PathBuf,

    /// Byte ranges of the source text produced by macro invocations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macro_expansions: Vec<TextRange>,

    /// Named integral/boolean constants visible to `noexcept` operands.
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub constants: FxHashMap<String, ConstValue>,

    #[serde(default)]
    pub records: Vec<Record>,

    #[serde(default)]
    pub destructors: Vec<Declaration>,
}

impl TranslationUnit {
    /// Decode a unit from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let unit: TranslationUnit = serde_json::from_str(json)?;
        unit.validate()?;
        Ok(unit)
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.0 as usize)
    }

    pub fn destructor(&self, id: DeclId) -> Option<&Declaration> {
        self.destructors.get(id.0 as usize)
    }

    /// Check that every id stored in the unit matches its position and
    /// that every cross reference points inside the unit.
    pub fn validate(&self) -> Result<()> {
        for (index, record) in self.records.iter().enumerate() {
            if record.id.0 as usize != index {
                return Err(NoxError::UnknownRecord(record.id));
            }
            if let Some(dtor) = record.destructor {
                if self.destructor(dtor).is_none() {
                    return Err(NoxError::UnknownDeclaration(dtor));
                }
            }
        }

        for (index, decl) in self.destructors.iter().enumerate() {
            if decl.id.0 as usize != index {
                return Err(NoxError::UnknownDeclaration(decl.id));
            }
            if self.record(decl.owner).is_none() {
                return Err(NoxError::UnknownRecord(decl.owner));
            }
        }

        Ok(())
    }
}

/// A class, struct or union definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,

    /// Direct and virtual bases, in declaration order.
    #[serde(default)]
    pub bases: Vec<BaseSpecifier>,

    /// Non-static data members, in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,

    /// The user-declared destructor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructor: Option<DeclId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSpecifier {
    pub ty: TypeRef,
    #[serde(default)]
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    /// Unnamed bit-fields are padding and are never destroyed.
    #[serde(default)]
    pub unnamed_bit_field: bool,
}

/// The type of a base or member, reduced to what destruction cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    /// Builtins, pointers, references, enums: nothing to destroy.
    Scalar { name: String },
    Record { id: RecordId },
    Array { element: Box<TypeRef> },
    /// A typedef or alias template specialization.
    Alias { name: String, target: Box<TypeRef> },
    /// Depends on a template parameter.
    Dependent { name: String },
    /// A placeholder (`auto`, `decltype(auto)`) that has not been deduced yet.
    Undeduced,
    /// Incomplete or invalid type.
    Unresolved { name: String },
}

/// A destructor declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub id: DeclId,
    /// Spelled name, e.g. `~Widget`.
    pub name: String,
    pub owner: RecordId,
    /// Byte offset of the declarator name (the `~`).
    pub location: u32,
    /// Source range of the whole declaration.
    pub range: TextRange,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub defaulted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<FunctionBody>,
    #[serde(default)]
    pub explicit_spec: ExplicitSpec,
}

impl Declaration {
    /// True when the body has a `throw` that can escape it.
    pub fn body_has_throw_sites(&self) -> bool {
        self.body.as_ref().is_some_and(|body| !body.throw_sites.is_empty())
    }
}

/// The parts of a function body the rule may look at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBody {
    /// `throw` expressions that can escape the body.
    #[serde(default)]
    pub throw_sites: Vec<TextRange>,
}

/// An exception specifier as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExplicitSpec {
    #[default]
    Absent,
    /// `noexcept`, `noexcept(true)` or `noexcept(false)`.
    NoexceptLiteral { value: bool },
    /// `noexcept(expr)` where `expr` is anything but a bare boolean literal.
    NoexceptExpression { expr: SpecExpr, range: TextRange },
    /// Legacy `throw(T...)`.
    DynamicThrow {
        #[serde(default)]
        types: Vec<String>,
    },
}

impl ExplicitSpec {
    pub fn is_absent(&self) -> bool {
        matches!(self, ExplicitSpec::Absent)
    }
}
