use super::aspect::AspectApplication;
use crate::config::WeaverConfig;
use crate::errors::Result;
use crate::features::advice::{
    resolve_deferred_contracts, Advice, AdviceFactory, AdviceResult, Collaborators,
    ContractAccumulator, OrderAllocator, ResolveContext,
};
use crate::features::compilation::{CompilationModel, MutableCompilationModel};
use crate::features::declarations::BuilderArena;
use crate::shared::models::{AspectInstanceId, BuilderId, Diagnostic, DiagnosticBag, LayerId};
use tracing::{debug, info, warn};

/// Why an aspect was discarded
#[derive(Debug, Clone, PartialEq)]
pub enum RollbackReason {
    /// Hard error during construction or initialization
    Error(String),
    /// Blocking diagnostics from initialization
    Diagnostics(Vec<Diagnostic>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledBackAspect {
    pub aspect: String,
    pub layer: LayerId,
    pub reason: RollbackReason,
}

#[derive(Debug, Clone)]
pub struct WeaveResult {
    /// Frozen model after the last layer
    pub model: CompilationModel,
    /// Diagnostics of every advice, in processing order
    pub diagnostics: Vec<Diagnostic>,
    pub rolled_back: Vec<RolledBackAspect>,
    /// Advices whose resolution succeeded
    pub applied: usize,
}

impl WeaveResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// State carried across layers of one weave
struct WeaveState {
    arena: BuilderArena,
    orders: OrderAllocator,
    contracts: ContractAccumulator,
    next_advice: u32,
    next_instance: u32,
    diagnostics: Vec<Diagnostic>,
    rolled_back: Vec<RolledBackAspect>,
    applied: usize,
}

pub struct Weaver {
    config: WeaverConfig,
    collaborators: Collaborators,
}

impl Weaver {
    pub fn new(config: WeaverConfig) -> Self {
        Self {
            config,
            collaborators: Collaborators::default(),
        }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    /// Apply `applications` to `initial`, layer by layer
    ///
    /// Consecutive applications with the same layer form one layer; the list
    /// order is the processing order. Hard errors raised while resolving
    /// abort the weave.
    pub fn weave(
        &self,
        initial: &CompilationModel,
        applications: &[AspectApplication],
    ) -> Result<WeaveResult> {
        let mut state = WeaveState {
            arena: BuilderArena::reserving(initial.builder_watermark()),
            orders: OrderAllocator::starting_after(initial.last_order()),
            contracts: ContractAccumulator::new(),
            next_advice: 0,
            next_instance: 0,
            diagnostics: Vec::new(),
            rolled_back: Vec::new(),
            applied: 0,
        };
        let mut frozen = initial.clone();

        let mut start = 0;
        while start < applications.len() {
            let layer = applications[start].layer;
            let end = applications[start..]
                .iter()
                .position(|a| a.layer != layer)
                .map_or(applications.len(), |offset| start + offset);

            frozen = self.weave_layer(&frozen, layer, &applications[start..end], &mut state)?;
            start = end;
        }

        info!(
            transformations = frozen.log().len(),
            applied = state.applied,
            rolled_back = state.rolled_back.len(),
            "weave complete"
        );
        Ok(WeaveResult {
            model: frozen,
            diagnostics: state.diagnostics,
            rolled_back: state.rolled_back,
            applied: state.applied,
        })
    }

    fn weave_layer(
        &self,
        frozen: &CompilationModel,
        layer: LayerId,
        applications: &[AspectApplication],
        state: &mut WeaveState,
    ) -> Result<CompilationModel> {
        debug!(layer = %layer, aspects = applications.len(), "layer start");
        let mut current = frozen.create_mutable_clone();

        for application in applications {
            self.weave_aspect(&mut current, application, state)?;
        }

        if self.config.defer_contracts_to_layer_end {
            let results = {
                let mut ctx = ResolveContext {
                    arena: &mut state.arena,
                    orders: &mut state.orders,
                    collaborators: &self.collaborators,
                    config: &self.config,
                    contracts: &mut state.contracts,
                };
                resolve_deferred_contracts(current.model(), &mut ctx)?
            };
            for result in results {
                fold(&mut current, result, state);
            }
        }

        let frozen = current.into_immutable();
        debug!(layer = %layer, transformations = frozen.log().len(), "layer frozen");
        Ok(frozen)
    }

    fn weave_aspect(
        &self,
        current: &mut MutableCompilationModel,
        application: &AspectApplication,
        state: &mut WeaveState,
    ) -> Result<()> {
        let instance = AspectInstanceId(state.next_instance);
        state.next_instance += 1;
        let name = application.aspect.name().to_string();

        // 1. construction
        let (advices, allocated) = {
            let mut factory = AdviceFactory::new(
                current.model(),
                &mut state.arena,
                instance,
                name.clone(),
                application.layer,
                &mut state.next_advice,
            );
            let built = application.aspect.build(&mut factory);
            let parts = factory.into_parts();
            if let Err(e) = built {
                rollback(state, &parts.1, &name, application.layer, RollbackReason::Error(e.to_string()));
                return Ok(());
            }
            parts
        };

        // 2. initialize
        let mut diagnostics = DiagnosticBag::new();
        for advice in &advices {
            if let Err(e) = advice.initialize(current.model(), &mut state.arena, &mut diagnostics) {
                rollback(state, &allocated, &name, application.layer, RollbackReason::Error(e.to_string()));
                return Ok(());
            }
        }
        if diagnostics.has_blocking(self.config.warnings_as_errors) {
            let diagnostics = diagnostics.into_vec();
            state.diagnostics.extend(diagnostics.iter().cloned());
            rollback(
                state,
                &allocated,
                &name,
                application.layer,
                RollbackReason::Diagnostics(diagnostics),
            );
            return Ok(());
        }
        state.diagnostics.extend(diagnostics);

        // 3. resolve against the current model, folding as we go
        for advice in &advices {
            let result = self.resolve(current, advice, state)?;
            fold(current, result, state);
        }
        debug!(aspect = %name, instance = %instance, advices = advices.len(), "aspect applied");
        Ok(())
    }

    fn resolve(
        &self,
        current: &MutableCompilationModel,
        advice: &Advice,
        state: &mut WeaveState,
    ) -> Result<AdviceResult> {
        let mut ctx = ResolveContext {
            arena: &mut state.arena,
            orders: &mut state.orders,
            collaborators: &self.collaborators,
            config: &self.config,
            contracts: &mut state.contracts,
        };
        advice.resolve(current.model(), &mut ctx).map_err(|e| {
            warn!(advice = %advice.id, error = %e, "resolution aborted");
            e
        })
    }
}

fn fold(current: &mut MutableCompilationModel, result: AdviceResult, state: &mut WeaveState) {
    match result {
        Ok(output) => {
            state.applied += 1;
            state.diagnostics.extend(output.warnings);
            current.add_transformations(output.transformations);
        }
        Err(diagnostics) => state.diagnostics.extend(diagnostics),
    }
}

fn rollback(
    state: &mut WeaveState,
    allocated: &[BuilderId],
    aspect: &str,
    layer: LayerId,
    reason: RollbackReason,
) {
    for id in allocated {
        state.arena.release(*id);
    }
    warn!(
        aspect = %aspect,
        layer = %layer,
        builders = allocated.len(),
        "aspect rolled back"
    );
    state.rolled_back.push(RolledBackAspect {
        aspect: aspect.to_string(),
        layer,
        reason,
    });
}

