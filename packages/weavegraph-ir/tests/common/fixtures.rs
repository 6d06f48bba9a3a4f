//! Baseline fixtures and weaving helpers

use std::sync::Arc;
use weavegraph_ir::errors::Result;
use weavegraph_ir::features::advice::AdviceFactory;
use weavegraph_ir::features::compilation::{BaselineBuilder, CompilationModel};
use weavegraph_ir::features::declarations::{ArgumentValue, DeclarationData};
use weavegraph_ir::features::references::DeclRef;
use weavegraph_ir::pipeline::{AspectApplication, FnAspect, WeaveResult, Weaver};
use weavegraph_ir::shared::models::{DeclId, LayerId, TypeRef};
use weavegraph_ir::WeaverConfig;

/// `class C { public void Foo(); }` and `class D : C { }`
pub struct InheritedFoo {
    pub model: CompilationModel,
    pub c: DeclRef,
    pub d: DeclRef,
    pub foo: DeclRef,
}

pub fn fixture_inherited_foo(foo: DeclarationData) -> InheritedFoo {
    let mut b = BaselineBuilder::new();
    let c = b.add(DeclarationData::class("C"));
    let foo = b.add_in(c, foo);
    let d = b.add(DeclarationData::class("D").extends(TypeRef::named(c)));
    InheritedFoo {
        model: CompilationModel::new(b.build()),
        c: DeclRef::Original(c),
        d: DeclRef::Original(d),
        foo: DeclRef::Original(foo),
    }
}

/// Three-level hierarchy `A <- B <- C`, one explicit constructor each,
/// every derived constructor chaining to its base
pub struct ConstructorChain {
    pub model: CompilationModel,
    pub types: [DeclRef; 3],
    pub constructors: [DeclRef; 3],
}

pub fn fixture_constructor_chain() -> ConstructorChain {
    let mut b = BaselineBuilder::new();
    let a = b.add(DeclarationData::class("A"));
    let a_ctor = b.add_in(a, DeclarationData::constructor());

    let bt = b.add(DeclarationData::class("B").extends(TypeRef::named(a)));
    let b_ctor = b.add_in(
        bt,
        DeclarationData::constructor()
            .with_parameter("name", TypeRef::string())
            .delegating_to_base(DeclRef::Original(a_ctor), Vec::new()),
    );

    let c = b.add(DeclarationData::class("C").extends(TypeRef::named(bt)));
    let c_ctor = b.add_in(
        c,
        DeclarationData::constructor().delegating_to_base(
            DeclRef::Original(b_ctor),
            vec![ArgumentValue::Expression("\"c\"".to_string())],
        ),
    );

    ConstructorChain {
        model: CompilationModel::new(b.build()),
        types: [a, bt, c].map(DeclRef::Original),
        constructors: [a_ctor, b_ctor, c_ctor].map(DeclRef::Original),
    }
}

pub fn original(id: DeclId) -> DeclRef {
    DeclRef::Original(id)
}

/// Application of a closure-built aspect
pub fn aspect<F>(name: &str, layer: u32, build: F) -> AspectApplication
where
    F: Fn(&mut AdviceFactory<'_>) -> Result<()> + Send + Sync + 'static,
{
    AspectApplication::new(Arc::new(FnAspect::new(name, build)), LayerId(layer))
}

/// Weave with the default configuration and collaborators
pub fn weave(model: &CompilationModel, applications: Vec<AspectApplication>) -> WeaveResult {
    weave_with(WeaverConfig::default(), model, applications)
}

pub fn weave_with(
    config: WeaverConfig,
    model: &CompilationModel,
    applications: Vec<AspectApplication>,
) -> WeaveResult {
    Weaver::new(config)
        .weave(model, &applications)
        .expect("weave should not abort")
}
