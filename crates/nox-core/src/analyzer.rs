//! Exception-specification analysis for destructors.
//!
//! The analyzer classifies a destructor as throwing, non-throwing or
//! unknown. Explicit specifiers decide on their own; an absent specifier
//! falls back to the implicit one, derived from the destructors of every
//! base and member the destructor would run.
//!
//! One analyzer belongs to one analysis run over one translation unit and
//! memoizes every answer it computes, so a base shared by many derived
//! classes is resolved once.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{Declaration, DeclId, ExplicitSpec, RecordId, TranslationUnit, TypeRef};

/// Effective exception-throwing state of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExceptionState {
    Throwing,
    NotThrowing,
    /// Dependent on a template parameter, or missing information.
    Unknown,
}

impl ExceptionState {
    /// Merge the states of two sub-objects destroyed by the same destructor.
    ///
    /// Any unknown part makes the whole unknown; otherwise any throwing
    /// part makes it throwing.
    pub fn combine(self, other: ExceptionState) -> ExceptionState {
        use ExceptionState::*;
        match (self, other) {
            (Unknown, _) | (_, Unknown) => Unknown,
            (Throwing, _) | (_, Throwing) => Throwing,
            (NotThrowing, NotThrowing) => NotThrowing,
        }
    }

    fn from_noexcept(value: bool) -> ExceptionState {
        if value {
            ExceptionState::NotThrowing
        } else {
            ExceptionState::Throwing
        }
    }
}

impl fmt::Display for ExceptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExceptionState::Throwing => "throwing",
            ExceptionState::NotThrowing => "not throwing",
            ExceptionState::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Knobs for [`ExceptionSpecAnalyzer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerOptions {
    /// Treat a destructor without a specifier as throwing when its own
    /// body contains a `throw` that can escape.
    #[serde(default)]
    pub body_throws: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    Destructor(DeclId),
    /// Implicit specification of a record's destructor, from its
    /// bases and members.
    Implicit(RecordId),
}

/// Memoizing classifier of destructor exception specifications.
pub struct ExceptionSpecAnalyzer<'u> {
    unit: &'u TranslationUnit,
    options: AnalyzerOptions,
    cache: FxHashMap<CacheKey, ExceptionState>,
    in_progress: FxHashSet<CacheKey>,
}

impl<'u> ExceptionSpecAnalyzer<'u> {
    pub fn new(unit: &'u TranslationUnit) -> Self {
        Self::with_options(unit, AnalyzerOptions::default())
    }

    pub fn with_options(unit: &'u TranslationUnit, options: AnalyzerOptions) -> Self {
        Self {
            unit,
            options,
            cache: FxHashMap::default(),
            in_progress: FxHashSet::default(),
        }
    }

    pub fn unit(&self) -> &'u TranslationUnit {
        self.unit
    }

    /// Number of memoized answers.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Classify a destructor declaration.
    pub fn analyze(&mut self, decl: &Declaration) -> ExceptionState {
        self.memoized(CacheKey::Destructor(decl.id), |this| this.compute(decl))
    }

    /// Exception state of destroying an object of the given record.
    pub fn analyze_record(&mut self, id: RecordId) -> ExceptionState {
        let unit = self.unit;
        let Some(record) = unit.record(id) else {
            return ExceptionState::Unknown;
        };

        let Some(dtor_id) = record.destructor else {
            return self.implicit(id);
        };
        match unit.destructor(dtor_id) {
            Some(dtor) if !dtor.deleted => self.analyze(dtor),
            _ => ExceptionState::Unknown,
        }
    }

    /// Exception state of destroying an object of the given type.
    pub fn analyze_type(&mut self, ty: &TypeRef) -> ExceptionState {
        match ty {
            TypeRef::Scalar { .. } => ExceptionState::NotThrowing,
            TypeRef::Record { id } => self.analyze_record(*id),
            TypeRef::Array { element } => self.analyze_type(element),
            TypeRef::Alias { target, .. } => self.analyze_type(target),
            TypeRef::Dependent { .. } | TypeRef::Undeduced | TypeRef::Unresolved { .. } => {
                ExceptionState::Unknown
            }
        }
    }

    fn compute(&mut self, decl: &Declaration) -> ExceptionState {
        match &decl.explicit_spec {
            ExplicitSpec::Absent => {
                let members = self.implicit(decl.owner);
                let throws_in_body = self.options.body_throws && decl.body_has_throw_sites();
                if throws_in_body && members != ExceptionState::Unknown {
                    ExceptionState::Throwing
                } else {
                    members
                }
            }
            ExplicitSpec::NoexceptLiteral { value } => ExceptionState::from_noexcept(*value),
            ExplicitSpec::NoexceptExpression { expr, .. } => {
                match expr.evaluate(&self.unit.constants) {
                    Ok(value) => ExceptionState::from_noexcept(value.truthy()),
                    Err(reason) => {
                        trace!(decl = %decl.name, %reason, "noexcept operand is not constant");
                        ExceptionState::Unknown
                    }
                }
            }
            ExplicitSpec::DynamicThrow { types } => ExceptionState::from_noexcept(types.is_empty()),
        }
    }

    /// Implicit specification of `id`'s destructor: bases first, then
    /// members, in declaration order.
    fn implicit(&mut self, id: RecordId) -> ExceptionState {
        self.memoized(CacheKey::Implicit(id), |this| {
            let unit = this.unit;
            let Some(record) = unit.record(id) else {
                return ExceptionState::Unknown;
            };

            let bases = record.bases.iter().map(|base| &base.ty);
            let fields = record
                .fields
                .iter()
                .filter(|field| !field.unnamed_bit_field)
                .map(|field| &field.ty);

            let mut state = ExceptionState::NotThrowing;
            for ty in bases.chain(fields) {
                state = state.combine(this.analyze_type(ty));
                if state == ExceptionState::Unknown {
                    break;
                }
            }
            state
        })
    }

    fn memoized(
        &mut self,
        key: CacheKey,
        compute: impl FnOnce(&mut Self) -> ExceptionState,
    ) -> ExceptionState {
        if let Some(state) = self.cache.get(&key) {
            return *state;
        }
        if !self.in_progress.insert(key) {
            trace!(?key, "Cycle in record graph");
            return ExceptionState::Unknown;
        }

        let state = compute(self);
        self.in_progress.remove(&key);
        self.cache.insert(key, state);
        trace!(?key, %state, "Resolved exception state");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstValue, FunctionBody, SpecExpr};
    use crate::span::TextRange;
    use crate::tests::test_helpers::UnitBuilder;

    #[test]
    fn explicit_literals_decide_directly() {
        let mut builder = UnitBuilder::new();
        let a = builder.record("A");
        let yes = builder.destructor(a, ExplicitSpec::NoexceptLiteral { value: true });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze(&unit.destructors[yes.0 as usize]), ExceptionState::NotThrowing);

        let mut decl = unit.destructors[0].clone();
        decl.id = DeclId(99);
        decl.explicit_spec = ExplicitSpec::NoexceptLiteral { value: false };
        assert_eq!(analyzer.analyze(&decl), ExceptionState::Throwing);
    }

    #[test]
    fn absent_specifier_follows_bases_and_members() {
        let mut builder = UnitBuilder::new();
        let throwing_base = builder.record("Base");
        builder.destructor(throwing_base, ExplicitSpec::NoexceptLiteral { value: false });
        let quiet = builder.record("Quiet");
        let derived = builder.record("Derived");
        builder.base(derived, TypeRef::Record { id: quiet });
        builder.field(derived, "b", TypeRef::Record { id: throwing_base });
        let dtor = builder.destructor(derived, ExplicitSpec::Absent);
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze_record(quiet), ExceptionState::NotThrowing);
        assert_eq!(analyzer.analyze(&unit.destructors[dtor.0 as usize]), ExceptionState::Throwing);
    }

    #[test]
    fn unknown_dominates_throwing() {
        let mut builder = UnitBuilder::new();
        let throwing = builder.record("Throwing");
        builder.destructor(throwing, ExplicitSpec::NoexceptLiteral { value: false });
        let holder = builder.record("Holder");
        builder.field(holder, "t", TypeRef::Record { id: throwing });
        builder.field(holder, "u", TypeRef::Dependent { name: "T".into() });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze_record(holder), ExceptionState::Unknown);
    }

    #[test]
    fn types_resolve_through_aliases_and_arrays() {
        let mut builder = UnitBuilder::new();
        let throwing = builder.record("T");
        builder.destructor(throwing, ExplicitSpec::DynamicThrow { types: vec!["int".into()] });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        let aliased = TypeRef::Alias {
            name: "Ts".into(),
            target: Box::new(TypeRef::Array {
                element: Box::new(TypeRef::Record { id: throwing }),
            }),
        };
        assert_eq!(analyzer.analyze_type(&aliased), ExceptionState::Throwing);
        assert_eq!(analyzer.analyze_type(&TypeRef::Undeduced), ExceptionState::Unknown);
        assert_eq!(
            analyzer.analyze_type(&TypeRef::Scalar { name: "int*".into() }),
            ExceptionState::NotThrowing
        );
    }

    #[test]
    fn unnamed_bit_fields_are_ignored() {
        let mut builder = UnitBuilder::new();
        let holder = builder.record("Bits");
        builder.bit_field(holder, TypeRef::Unresolved { name: "broken".into() });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze_record(holder), ExceptionState::NotThrowing);
    }

    #[test]
    fn deleted_and_missing_sub_destructors_are_unknown() {
        let mut builder = UnitBuilder::new();
        let gone = builder.record("Gone");
        let dtor = builder.destructor(gone, ExplicitSpec::Absent);
        builder.delete(dtor);
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze_record(gone), ExceptionState::Unknown);
        assert_eq!(analyzer.analyze_record(RecordId(42)), ExceptionState::Unknown);
    }

    #[test]
    fn expressions_fold_through_constants() {
        let mut builder = UnitBuilder::new();
        builder.constant("kSafe", ConstValue::Bool(false));
        let a = builder.record("A");
        let folded = builder.destructor(
            a,
            ExplicitSpec::NoexceptExpression {
                expr: SpecExpr::name("kSafe"),
                range: TextRange::new(0, 5),
            },
        );
        let b = builder.record("B");
        let dependent = builder.destructor(
            b,
            ExplicitSpec::NoexceptExpression {
                expr: SpecExpr::dependent("T::value"),
                range: TextRange::new(0, 8),
            },
        );
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze(&unit.destructors[folded.0 as usize]), ExceptionState::Throwing);
        assert_eq!(analyzer.analyze(&unit.destructors[dependent.0 as usize]), ExceptionState::Unknown);
    }

    #[test]
    fn empty_dynamic_throw_is_not_throwing() {
        let mut builder = UnitBuilder::new();
        let a = builder.record("A");
        let dtor = builder.destructor(a, ExplicitSpec::DynamicThrow { types: vec![] });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze(&unit.destructors[dtor.0 as usize]), ExceptionState::NotThrowing);
    }

    #[test]
    fn body_throws_is_opt_in() {
        let mut builder = UnitBuilder::new();
        let a = builder.record("A");
        let dtor = builder.destructor(a, ExplicitSpec::Absent);
        builder.body(
            dtor,
            FunctionBody {
                throw_sites: vec![TextRange::new(3, 10)],
            },
        );
        let unit = builder.build();
        let decl = &unit.destructors[dtor.0 as usize];

        assert_eq!(ExceptionSpecAnalyzer::new(&unit).analyze(decl), ExceptionState::NotThrowing);
        let options = AnalyzerOptions { body_throws: true };
        assert_eq!(
            ExceptionSpecAnalyzer::with_options(&unit, options).analyze(decl),
            ExceptionState::Throwing
        );
    }

    #[test]
    fn cyclic_records_resolve_to_unknown() {
        let mut builder = UnitBuilder::new();
        let a = builder.record("A");
        let b = builder.record("B");
        builder.field(a, "b", TypeRef::Record { id: b });
        builder.field(b, "a", TypeRef::Record { id: a });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        assert_eq!(analyzer.analyze_record(a), ExceptionState::Unknown);
    }

    #[test]
    fn shared_bases_are_resolved_once() {
        let mut builder = UnitBuilder::new();
        let base = builder.record("Base");
        builder.destructor(base, ExplicitSpec::NoexceptLiteral { value: true });
        let left = builder.record("Left");
        builder.base(left, TypeRef::Record { id: base });
        let right = builder.record("Right");
        builder.base(right, TypeRef::Record { id: base });
        let unit = builder.build();

        let mut analyzer = ExceptionSpecAnalyzer::new(&unit);
        analyzer.analyze_record(left);
        let after_left = analyzer.cached();
        analyzer.analyze_record(right);
        // Only Right's implicit entry is new.
        assert_eq!(analyzer.cached(), after_left + 1);
    }

    #[test]
    fn combine_is_unknown_first() {
        use ExceptionState::*;
        assert_eq!(Throwing.combine(Unknown), Unknown);
        assert_eq!(NotThrowing.combine(Throwing), Throwing);
        assert_eq!(NotThrowing.combine(NotThrowing), NotThrowing);
    }
}
