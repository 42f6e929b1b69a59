//! Compiling backend: build pipeline, failure modes and agreement with the interpreter.

use proptest::prelude::*;

use innerc_codegen::UNBOUND;
use innerc_ir::test::fixtures::Nat;
use innerc_ir::{DataEquation, TermPool};
use innerc_schedule::{RuleSet, StrategyTable};

use crate::test::helpers::{nat_expr, rewriter};
use crate::{Backend, CompiledLibrary, CompilerConfig, Rewriter, RewriterConfig, Stage};

fn compiling_with(compiler: CompilerConfig) -> RewriterConfig {
    RewriterConfig::builder().backend(Backend::Compiling).compiler(compiler).build()
}

#[test]
fn test_missing_compiler_is_fatal() {
    let config = compiling_with(CompilerConfig::builder().cc("innerc-no-such-compiler").build());
    let err = Rewriter::with_config(&Nat::new().spec(), &config).err().expect("construction should fail");
    assert_eq!(err.stage(), Stage::Compilation, "{err}");
}

#[test]
fn test_failing_compiler_is_fatal() {
    let config = compiling_with(CompilerConfig::builder().cc("false").build());
    let err = Rewriter::with_config(&Nat::new().spec(), &config).err().expect("construction should fail");
    assert!(matches!(err, crate::Error::CompilationFailure { stage: Stage::Compilation, .. }), "{err}");
}

#[test]
fn test_invalid_source_is_fatal() {
    // Turns every `typedef` into nothing, so the generated prelude no longer compiles.
    let compiler = CompilerConfig::builder().cflags(vec!["-Dtypedef=".to_string()]).build();
    let err = Rewriter::with_config(&Nat::new().spec(), &compiling_with(compiler)).err().expect("construction should fail");
    assert_eq!(err.stage(), Stage::Compilation, "{err}");
}

#[test]
fn test_temporary_files_removed_on_drop() {
    let n = Nat::new();
    let mut pool = TermPool::new();
    let rules = RuleSet::from_specification(&mut pool, &n.spec()).unwrap();
    let table = StrategyTable::build(&pool, &rules);
    let module = innerc_codegen::c::render(&pool, &table, "cleanup").unwrap();

    let library = CompiledLibrary::compile(&module, &CompilerConfig::from_env()).unwrap();
    let dir = library.directory().to_path_buf();
    assert!(dir.join("cleanup.so").exists());
    assert_eq!(library.name(), "cleanup");
    drop(library);
    assert!(!dir.exists());
}

#[test]
fn test_rules_are_fixed() {
    let n = Nat::new();
    let mut r = rewriter(&n.spec(), Backend::Compiling);
    let eq = DataEquation::new(vec![n.x.clone()], n.fact(n.vx()), n.zero());
    assert!(!r.add_rewrite_rule(&eq).unwrap());
    assert!(!r.remove_rewrite_rule(&n.equations()[0]));
    assert_eq!(r.rewrite(&n.pred(n.zero())).unwrap(), n.zero());
}

#[test]
fn test_rewriters_coexist() {
    let n = Nat::new();
    let vars = vec![n.x.clone()];
    let spec = crate::test::helpers::with_equations(
        &n.signature(),
        vec![DataEquation::new(vars, n.pred(n.vx()), n.zero())],
    );
    let mut full = rewriter(&n.spec(), Backend::Compiling);
    let mut flat = rewriter(&spec, Backend::Compiling);
    assert_eq!(full.rewrite(&n.pred(n.num(2))).unwrap(), n.num(1));
    assert_eq!(flat.rewrite(&n.pred(n.num(2))).unwrap(), n.zero());
    drop(flat);
    assert_eq!(full.rewrite(&n.pred(n.num(3))).unwrap(), n.num(2));
}

#[test]
fn test_unstorable_substitution_is_reported() {
    let n = Nat::new();
    let mut pool = TermPool::new();
    let rules = RuleSet::from_specification(&mut pool, &n.spec()).unwrap();
    let table = StrategyTable::build(&pool, &rules);
    let module = innerc_codegen::c::render(&pool, &table, "substs").unwrap();
    let library = CompiledLibrary::compile(&module, &CompilerConfig::from_env()).unwrap();

    let var = u32::MAX - 1;
    let err = library.set_subst(var, 0).unwrap_err();
    assert!(matches!(err, crate::Error::SubstitutionTableFull { var: v } if v == var), "{err}");
    assert_eq!(err.stage(), Stage::Rewriting);
    assert_eq!(library.get_subst(var), UNBOUND);

    library.set_subst(40, 7).unwrap();
    assert_eq!(library.get_subst(40), 7);
    library.clear_substs();
    assert_eq!(library.get_subst(40), UNBOUND);
    unsafe { library.fini() };
}

proptest! {
    // Every case compiles a fresh module.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_backends_agree(expr in nat_expr()) {
        let spec = Nat::new().spec();
        let mut compiled = rewriter(&spec, Backend::Compiling);
        let mut interpreted = rewriter(&spec, Backend::Interpreter);

        let native = compiled.rewrite(&expr).unwrap();
        let walked = interpreted.rewrite(&expr).unwrap();
        prop_assert_eq!(&native, &walked, "{}", expr);
        let again = compiled.rewrite(&native).unwrap();
        prop_assert_eq!(again, native);
    }
}
