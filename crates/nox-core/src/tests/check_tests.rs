//! Tests for the check's diagnostic dispatch.

use super::test_helpers::{UnitBuilder, decl_range, throwing_member};
use crate::analyzer::{AnalyzerOptions, ExceptionState};
use crate::check::{
    CHECK_NAME, FALSE_EXPRESSION_MESSAGE, MISSING_SPECIFIER_MESSAGE, NOEXCEPT_FIX,
    NoexceptDestructorCheck,
};
use crate::diagnostic::{Diagnostic, Severity};
use crate::fixes::apply_fixes;
use crate::model::{ConstValue, ExplicitSpec, FunctionBody, TranslationUnit, TypeRef};
use crate::run::{AnalysisRun, RunStats, UnitInput};
use crate::span::TextRange;

fn run(unit: TranslationUnit, text: &str) -> (Vec<Diagnostic>, RunStats) {
    run_with(unit, text, AnalyzerOptions::default())
}

fn run_with(unit: TranslationUnit, text: &str, options: AnalyzerOptions) -> (Vec<Diagnostic>, RunStats) {
    let input = UnitInput::prepare(unit, text);
    let mut diagnostics = Vec::new();
    let stats = AnalysisRun::new(&input.unit, &input.source)
        .options(options)
        .run(&mut diagnostics);
    (diagnostics, stats)
}

/// A unit with a `Holder` destructor spelled at the first `~` of `text`.
fn holder_unit(text: &str, throwing: bool) -> TranslationUnit {
    let mut builder = UnitBuilder::new();
    let holder = if throwing {
        throwing_member(&mut builder, "Holder")
    } else {
        builder.record("Holder")
    };
    builder.destructor_in(holder, decl_range(text, 0), ExplicitSpec::Absent);
    builder.build()
}

#[test]
fn test_noexcept_true_is_silent() {
    let text = "struct Holder { ~Holder() noexcept; Bad bad; };";
    let (diagnostics, stats) = run(holder_unit(text, true), text);
    assert!(diagnostics.is_empty());
    assert_eq!(stats.not_throwing, 1);
}

#[test]
fn test_literal_false_is_respected() {
    let text = "struct Holder { ~Holder() noexcept(false); };";
    let (diagnostics, stats) = run(holder_unit(text, false), text);
    assert!(diagnostics.is_empty());
    assert_eq!(stats.throwing, 1);
}

#[test]
fn test_false_expression_is_reported_at_the_operand() {
    let text = "struct Holder { ~Holder() noexcept(kSafe && kFast); };";
    let mut unit = holder_unit(text, false);
    unit.constants.insert("kSafe".into(), ConstValue::Bool(true));
    unit.constants.insert("kFast".into(), ConstValue::Int(0));

    let (diagnostics, _) = run(unit, text);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.message, FALSE_EXPRESSION_MESSAGE);
    assert_eq!(diagnostic.check, CHECK_NAME);
    assert!(diagnostic.fix.is_none());
    assert_eq!(&text[diagnostic.location.range().as_usize_range()], "kSafe && kFast");
}

#[test]
fn test_parenthesised_false_literal_is_an_expression() {
    let text = "struct Holder { ~Holder() noexcept((false)); };";
    let (diagnostics, _) = run(holder_unit(text, false), text);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, FALSE_EXPRESSION_MESSAGE);
}

#[test]
fn test_dependent_expression_is_unknown() {
    let text = "struct Holder { ~Holder() noexcept(std::is_nothrow_destructible_v<T>); };";
    let (diagnostics, stats) = run(holder_unit(text, false), text);
    assert!(diagnostics.is_empty());
    assert_eq!(stats.unknown, 1);
}

#[test]
fn test_missing_specifier_with_throwing_base() {
    let text = "struct Derived : Base { ~Derived() { release(); } };";
    let mut builder = UnitBuilder::new();
    let base = builder.record("Base");
    builder.destructor(base, ExplicitSpec::NoexceptLiteral { value: false });
    let derived = builder.record("Derived");
    builder.base(derived, TypeRef::Record { id: base });
    builder.destructor_in(derived, decl_range(text, 0), ExplicitSpec::Absent);

    let (diagnostics, _) = run(builder.build(), text);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.message, MISSING_SPECIFIER_MESSAGE);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(&text[diagnostic.location.range().as_usize_range()], "~Derived");

    let fix = diagnostic.fix.as_ref().unwrap();
    assert_eq!(fix.text, NOEXCEPT_FIX);
    let params_end = (text.find("~Derived()").unwrap() + "~Derived()".len()) as u32;
    let body_start = text.find("{ release").unwrap() as u32;
    assert!(fix.offset >= params_end && fix.offset < body_start);
}

#[test]
fn test_unknown_member_suppresses_the_diagnostic() {
    let text = "template <class T> struct Holder { ~Holder(); Bad bad; T t; };";
    let mut unit = holder_unit(text, true);
    let holder = unit.destructors[1].owner;
    unit.records[holder.0 as usize].fields.push(crate::model::Field {
        name: "t".into(),
        ty: TypeRef::Dependent { name: "T".into() },
        unnamed_bit_field: false,
    });

    let (diagnostics, stats) = run(unit, text);
    assert!(diagnostics.is_empty());
    assert_eq!(stats.unknown, 1);
}

#[test]
fn test_deleted_destructor_is_never_diagnosed() {
    let text = "struct Holder { ~Holder() = delete; };";
    let mut unit = holder_unit(text, true);
    unit.destructors[1].deleted = true;

    let (diagnostics, stats) = run(unit, text);
    assert!(diagnostics.is_empty());
    assert_eq!(stats.deleted_skipped, 1);
}

#[test]
fn test_dynamic_throw_is_reported_without_fix() {
    let text = "struct Holder { ~Holder() throw(int); };";
    let (diagnostics, _) = run(holder_unit(text, false), text);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, MISSING_SPECIFIER_MESSAGE);
    assert!(diagnostics[0].fix.is_none());
}

#[test]
fn test_macro_declarator_is_reported_without_fix() {
    let text = "struct Holder { ~Holder() {} };";
    let mut unit = holder_unit(text, true);
    let dtor = text.find('~').unwrap() as u32;
    unit.macro_expansions.push(TextRange::new(dtor, dtor + 10));

    let (diagnostics, _) = run(unit, text);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].fix.is_none());
}

#[test]
fn test_macro_spelled_destructor_gets_no_fix_in_its_body() {
    let text = "#define DTOR ~Holder()\nstruct Holder { Bad bad; DTOR { reset(); } };";
    let start = text.find("DTOR {").unwrap() as u32;
    let end = (text.find("} }").unwrap() + 1) as u32;

    let mut builder = UnitBuilder::new();
    let holder = throwing_member(&mut builder, "Holder");
    builder.destructor_in(holder, TextRange::new(start, end), ExplicitSpec::Absent);
    builder.macro_expansion(TextRange::new(start, start + 4));

    let (diagnostics, _) = run(builder.build(), text);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, MISSING_SPECIFIER_MESSAGE);
    assert!(diagnostics[0].fix.is_none());
    assert_eq!(apply_fixes(text, &diagnostics).unwrap(), text);
}

#[test]
fn test_fix_is_idempotent() {
    let text = "struct Holder { virtual ~Holder() = default; Bad bad; };";
    let (diagnostics, _) = run(holder_unit(text, true), text);
    assert_eq!(diagnostics.len(), 1);

    let fixed = apply_fixes(text, &diagnostics).unwrap();
    assert_eq!(fixed, "struct Holder { virtual ~Holder() noexcept  = default; Bad bad; };");

    let (again, stats) = run(holder_unit(&fixed, true), &fixed);
    assert!(again.is_empty());
    let input = UnitInput::prepare(holder_unit(&fixed, true), fixed.as_str());
    assert_eq!(
        input.unit.destructors[1].explicit_spec,
        ExplicitSpec::NoexceptLiteral { value: true }
    );
    assert_eq!(stats.not_throwing, 1);
}

#[test]
fn test_body_throws_refinement() {
    let text = "struct Holder { ~Holder() { throw 1; } };";
    let mut unit = holder_unit(text, false);
    let throw_at = text.find("throw").unwrap() as u32;
    unit.destructors[0].body = Some(FunctionBody {
        throw_sites: vec![TextRange::new(throw_at, throw_at + 7)],
    });

    let (quiet, _) = run(unit.clone(), text);
    assert!(quiet.is_empty());

    let (flagged, stats) = run_with(unit, text, AnalyzerOptions { body_throws: true });
    assert_eq!(flagged.len(), 1);
    assert_eq!(stats.throwing, 1);
}

#[test]
fn test_check_severity_is_configurable() {
    let text = "struct Holder { ~Holder(); };";
    let input = UnitInput::prepare(holder_unit(text, true), text);
    let mut diagnostics = Vec::new();
    AnalysisRun::new(&input.unit, &input.source)
        .check(NoexceptDestructorCheck::with_severity(Severity::Error))
        .run(&mut diagnostics);
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_analyzer_state_for_missing_specifier() {
    let text = "struct Holder { ~Holder(); };";
    let input = UnitInput::prepare(holder_unit(text, true), text);
    let mut analyzer = crate::ExceptionSpecAnalyzer::new(&input.unit);
    assert_eq!(analyzer.analyze(&input.unit.destructors[1]), ExceptionState::Throwing);
}
