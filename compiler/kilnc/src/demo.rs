//! The calculator demo: a hard-coded calculator next to one generated as a
//! syntax tree, compiled, loaded and called through the same trait.

use std::io::Write;

use kiln_diagnostic::Diagnostic;
use kiln_eval::{
    load, Capability, InstantiateError, InvocationHandle, LoadError, LoadOptions, ModuleHandle, RuntimeError,
};
use kiln_ir::{
    Block, CompilationUnit, MethodDecl, Modifiers, NamespaceDecl, Param, QualifiedName, TypeDecl, TypeRef,
    UsingDirective,
};
use kiln_types::TypeMetadata;
use tracing::debug;

use crate::compile::{compile, CompilationResult, SourceUnit};
use crate::options::CompileOptions;
use crate::reference::{calculator_interface, default_references};

/// Host-side view of `Playground.ICalculator`.
pub trait Calculator: Send + Sync {
    fn add(&self, a: i32, b: i32) -> Result<i32, RuntimeError>;
}

/// The built-in calculator. Always answers 666.
#[derive(Copy, Clone, Debug, Default)]
pub struct StaticCalculator;

impl Calculator for StaticCalculator {
    fn add(&self, _a: i32, _b: i32) -> Result<i32, RuntimeError> {
        Ok(666)
    }
}

/// A compiled type bound through the `Playground.ICalculator` capability.
#[derive(Debug)]
pub struct DynamicCalculator(InvocationHandle);

impl Capability for DynamicCalculator {
    fn interface() -> TypeMetadata {
        calculator_interface()
    }

    fn bind(handle: InvocationHandle) -> Self {
        DynamicCalculator(handle)
    }
}

impl Calculator for DynamicCalculator {
    fn add(&self, a: i32, b: i32) -> Result<i32, RuntimeError> {
        self.0.invoke_int("Add", &[a.into(), b.into()])
    }
}

/// Full name of the generated type.
pub const GENERATED_TYPE: &str = "GeneratedCalculator.DynamicCalculator";

/// The generated unit, built node by node. `Add`'s body is parsed from a
/// fragment.
pub fn calculator_tree() -> Result<CompilationUnit, Vec<Diagnostic>> {
    let body = kiln_parse::parse_statement("return a + b;")?;
    let add = MethodDecl::new(kiln_parse::parse_type_name("int")?, "Add")
        .with_modifiers(Modifiers::PUBLIC)
        .with_param(Param::new(TypeRef::int(), "a"))
        .with_param(Param::new(TypeRef::int(), "b"))
        .with_body(Block::new(vec![body]));
    let class = TypeDecl::class("DynamicCalculator")
        .with_modifiers(Modifiers::PUBLIC)
        .with_base(kiln_parse::parse_type_name("ICalculator")?)
        .with_member(add);
    let namespace = NamespaceDecl::new(kiln_parse::parse_name("GeneratedCalculator")?).with_member(class);
    Ok(CompilationUnit::new()
        .with_using(UsingDirective::new(QualifiedName::from_dotted("Playground")))
        .with_member(namespace))
}

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("the generated unit did not compile")]
    Compile(Vec<Diagnostic>),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Instantiate(#[from] InstantiateError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("cannot write demo output: {0}")]
    Io(#[from] std::io::Error),
}

/// Compile the generated calculator and load it.
pub fn build_dynamic_calculator(options: LoadOptions) -> Result<(ModuleHandle, DynamicCalculator), DemoError> {
    let tree = calculator_tree().map_err(DemoError::Compile)?;
    let result = compile(&SourceUnit::Tree(tree), &default_references(), &CompileOptions::library());
    let unit = match result {
        CompilationResult::Success { unit, .. } => unit,
        CompilationResult::Failure { diagnostics } => return Err(DemoError::Compile(diagnostics)),
    };
    let module = load(&unit, options)?;
    let calculator = module.instantiate_as::<DynamicCalculator>(GENERATED_TYPE)?;
    debug!(bytes = unit.len(), "dynamic calculator ready");
    Ok((module, calculator))
}

/// Print the generated source and answers from both calculators.
///
/// Compile failures are written to `err` as `CODE: message` lines and
/// returned.
pub fn run_demo(out: &mut impl Write, err: &mut impl Write) -> Result<(), DemoError> {
    writeln!(out, "Hello World!")?;

    let calculators: Vec<(&str, Box<dyn Calculator>)> = vec![("static", Box::new(StaticCalculator))];
    writeln!(out, "{}", calculators[0].1.add(5, 10)?)?;

    let tree = calculator_tree().map_err(DemoError::Compile)?;
    writeln!(out, "{}", kiln_fmt::format_unit(&tree))?;

    let (_module, dynamic) = match build_dynamic_calculator(LoadOptions::default()) {
        Ok(built) => built,
        Err(DemoError::Compile(diagnostics)) => {
            for diag in diagnostics.iter().filter(|d| d.is_error()) {
                writeln!(err, "{}", diag.summary_line())?;
            }
            return Err(DemoError::Compile(diagnostics));
        }
        Err(e) => return Err(e),
    };

    let mut calculators = calculators;
    calculators.push(("dynamic", Box::new(dynamic)));
    for (name, calculator) in &calculators {
        writeln!(out, "{name}: Add(2, 3) = {}", calculator.add(2, 3)?)?;
    }
    Ok(())
}
