//! Batch runner for module trees.
//!
//! [`ModuleGroup`] owns every module of a pipeline in an id-handle arena:
//! modules are moved in with [`insert`](ModuleGroup::insert), wired as
//! top-level modules or submodules, and from then on addressed by
//! [`ModuleId`]. One [`run`](ModuleGroup::run) call is one analysis pass:
//! each registered top-level module executes in registration order, its
//! submodules depth-first in insertion order, every module over its own
//! window of the same spectrogram.
//!
//! All wiring errors surface synchronously at setup time and a failed call
//! leaves the group unchanged. The pass itself never fails: sources with no
//! frame yet are skipped and counted in the returned [`PassSummary`].

use std::any::Any;
use std::time::{Duration, Instant};

use crate::error::GroupError;
use crate::module::{AnalysisModule, Feature, FrameView};
use crate::range::AnalysisRange;
use crate::spectrogram::{Spectrogram, SpectrogramBank, SpectrogramId};

/// Handle to a module stored in a [`ModuleGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) usize);

struct ModuleNode {
    module: Box<dyn AnalysisModule>,
    range: AnalysisRange,
    parent: Option<ModuleId>,
    children: Vec<ModuleId>,
    source: Option<SpectrogramId>,
    registered: bool,
}

/// Outcome of one analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Modules whose `analyze` ran this pass.
    pub completed: usize,
    /// Modules skipped: empty or unresolvable source, or deadline cut-off.
    pub skipped: usize,
    /// True when the per-pass budget expired before the pass finished.
    pub deadline_exceeded: bool,
}

/// Orchestrates a collection of top-level module trees over shared
/// spectrograms.
#[derive(Default)]
pub struct ModuleGroup {
    nodes: Vec<ModuleNode>,
    roots: Vec<ModuleId>,
    default_source: Option<SpectrogramId>,
    frame_budget: Option<Duration>,
}

impl std::fmt::Debug for ModuleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleGroup")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("default_source", &self.default_source)
            .field("frame_budget", &self.frame_budget)
            .finish()
    }
}

impl ModuleGroup {
    /// Creates an empty group with no default spectrogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group whose modules read `default` unless overridden at
    /// registration.
    pub fn with_default_source(default: SpectrogramId) -> Self {
        Self {
            default_source: Some(default),
            ..Self::default()
        }
    }

    /// Sets the spectrogram used by modules registered without an override.
    pub fn set_default_source(&mut self, default: SpectrogramId) {
        self.default_source = Some(default);
    }

    /// Sets an optional time budget for each pass.
    ///
    /// When the budget expires mid-pass the remaining modules are skipped
    /// and the pass reports `deadline_exceeded`; nothing blocks.
    pub fn set_frame_budget(&mut self, budget: Option<Duration>) {
        self.frame_budget = budget;
    }

    /// Moves a module into the group's arena.
    ///
    /// The module is not analyzed until it is registered top-level with one
    /// of the `add_module*` methods or attached under a parent with
    /// [`attach_submodule`](Self::attach_submodule).
    pub fn insert(&mut self, module: Box<dyn AnalysisModule>) -> ModuleId {
        self.nodes.push(ModuleNode {
            module,
            range: AnalysisRange::Full,
            parent: None,
            children: Vec::new(),
            source: None,
            registered: false,
        });
        ModuleId(self.nodes.len() - 1)
    }

    /// Registers a module top-level, reading the group default spectrogram
    /// over its full frame.
    pub fn add_module(&mut self, id: ModuleId) -> Result<(), GroupError> {
        self.register(id, None, None)
    }

    /// Registers a module top-level with a frequency-range override in Hz.
    pub fn add_module_in_range(
        &mut self,
        id: ModuleId,
        low_hz: f32,
        high_hz: f32,
    ) -> Result<(), GroupError> {
        let range = AnalysisRange::by_freq(low_hz, high_hz)?;
        self.register(id, None, Some(range))
    }

    /// Registers a module top-level, bound to a dedicated spectrogram.
    pub fn add_module_with_source(
        &mut self,
        id: ModuleId,
        source: SpectrogramId,
    ) -> Result<(), GroupError> {
        self.register(id, Some(source), None)
    }

    /// Registers a module top-level with both a dedicated spectrogram and a
    /// frequency-range override in Hz.
    pub fn add_module_with_source_in_range(
        &mut self,
        id: ModuleId,
        source: SpectrogramId,
        low_hz: f32,
        high_hz: f32,
    ) -> Result<(), GroupError> {
        let range = AnalysisRange::by_freq(low_hz, high_hz)?;
        self.register(id, Some(source), Some(range))
    }

    fn node(&self, id: ModuleId) -> Result<&ModuleNode, GroupError> {
        self.nodes.get(id.0).ok_or(GroupError::UnknownModule(id))
    }

    fn register(
        &mut self,
        id: ModuleId,
        source: Option<SpectrogramId>,
        range: Option<AnalysisRange>,
    ) -> Result<(), GroupError> {
        let node = self.node(id)?;
        if node.registered {
            return Err(GroupError::DuplicateModule(id));
        }
        if let Some(parent) = node.parent {
            return Err(GroupError::AlreadyAttached { child: id, parent });
        }
        if source.or(self.default_source).is_none() {
            return Err(GroupError::NoSpectrogram(id));
        }
        let node = &mut self.nodes[id.0];
        node.registered = true;
        node.source = source;
        if let Some(range) = range {
            node.range = range;
        }
        self.roots.push(id);
        Ok(())
    }

    /// Attaches `child` as the last submodule of `parent`.
    ///
    /// Submodules run immediately after their parent, in insertion order,
    /// against the same spectrogram with their own independent range. A
    /// module has at most one parent and a top-level module cannot also be
    /// a submodule.
    pub fn attach_submodule(&mut self, parent: ModuleId, child: ModuleId) -> Result<(), GroupError> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if parent == child {
            return Err(GroupError::SelfAttachment(child));
        }
        if let Some(current) = child_node.parent {
            return Err(GroupError::AlreadyAttached {
                child,
                parent: current,
            });
        }
        if child_node.registered {
            return Err(GroupError::AlreadyRegistered(child));
        }
        // The parent must not sit below the child, or the tree would loop.
        let mut ancestor = self.nodes[parent.0].parent;
        while let Some(a) = ancestor {
            if a == child {
                return Err(GroupError::CycleDetected { parent, child });
            }
            ancestor = self.nodes[a.0].parent;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Sets a module's analysis window by frequency bounds in Hz.
    ///
    /// Inverted bounds are rejected and the previous window is kept.
    pub fn set_range_by_freq(
        &mut self,
        id: ModuleId,
        low_hz: f32,
        high_hz: f32,
    ) -> Result<(), GroupError> {
        let range = AnalysisRange::by_freq(low_hz, high_hz)?;
        self.node(id)?;
        self.nodes[id.0].range = range;
        Ok(())
    }

    /// Sets a module's analysis window by inclusive bin bounds.
    pub fn set_range_by_bin(
        &mut self,
        id: ModuleId,
        low_bin: usize,
        high_bin: usize,
    ) -> Result<(), GroupError> {
        let range = AnalysisRange::by_bin(low_bin, high_bin)?;
        self.node(id)?;
        self.nodes[id.0].range = range;
        Ok(())
    }

    /// The window currently configured for a module.
    pub fn range_of(&self, id: ModuleId) -> Option<AnalysisRange> {
        self.nodes.get(id.0).map(|n| n.range)
    }

    /// Diagnostic name of a module.
    pub fn name_of(&self, id: ModuleId) -> Option<&'static str> {
        self.nodes.get(id.0).map(|n| n.module.name())
    }

    /// Number of modules held in the arena (registered or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the arena holds no modules.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level modules in registration order.
    pub fn registered(&self) -> &[ModuleId] {
        &self.roots
    }

    /// Shared access to a module as its trait object.
    pub fn module(&self, id: ModuleId) -> Option<&dyn AnalysisModule> {
        self.nodes.get(id.0).map(|n| n.module.as_ref())
    }

    /// Shared access to a module as its concrete type.
    pub fn get<M: AnalysisModule>(&self, id: ModuleId) -> Option<&M> {
        let module: &dyn AnalysisModule = self.nodes.get(id.0)?.module.as_ref();
        (module as &dyn Any).downcast_ref::<M>()
    }

    /// Exclusive access to a module as its concrete type, e.g. to retune
    /// parameters between passes.
    pub fn get_mut<M: AnalysisModule>(&mut self, id: ModuleId) -> Option<&mut M> {
        let module: &mut dyn AnalysisModule = self.nodes.get_mut(id.0)?.module.as_mut();
        (module as &mut dyn Any).downcast_mut::<M>()
    }

    /// The last computed result of a typed module, or `None` when the id
    /// does not refer to an `M` or no frame has been analyzed yet.
    pub fn output<M: Feature>(&self, id: ModuleId) -> Option<&M::Output> {
        self.get::<M>(id)?.output()
    }

    /// Runs one analysis pass over every registered module tree.
    ///
    /// Top-level modules execute in registration order; each module's
    /// submodules follow depth-first in insertion order, against the same
    /// spectrogram. A pass never fails: unresolvable or empty sources are
    /// skipped and counted.
    pub fn run(&mut self, bank: &SpectrogramBank) -> PassSummary {
        let mut summary = PassSummary::default();
        let deadline = self.frame_budget.map(|budget| Instant::now() + budget);
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            let source = self.nodes[root.0].source.or(self.default_source);
            match source.and_then(|id| bank.get(id)) {
                Some(spectrogram) => self.run_node(root, spectrogram, deadline, &mut summary),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        module = self.nodes[root.0].module.name(),
                        "skipping module tree: bound spectrogram not in bank"
                    );
                    self.skip_subtree(root, &mut summary);
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            completed = summary.completed,
            skipped = summary.skipped,
            deadline_exceeded = summary.deadline_exceeded,
            "analysis pass finished"
        );
        summary
    }

    fn run_node(
        &mut self,
        id: ModuleId,
        spectrogram: &Spectrogram,
        deadline: Option<Instant>,
        summary: &mut PassSummary,
    ) {
        if !summary.deadline_exceeded
            && deadline.is_some_and(|limit| Instant::now() >= limit)
        {
            summary.deadline_exceeded = true;
        }
        if summary.deadline_exceeded {
            summary.skipped += 1;
        } else {
            let node = &mut self.nodes[id.0];
            let (low, high) = node.range.resolve(spectrogram);
            match FrameView::new(spectrogram, low, high) {
                Some(view) => {
                    node.module.analyze(&view);
                    summary.completed += 1;
                }
                None => summary.skipped += 1,
            }
        }
        for i in 0..self.nodes[id.0].children.len() {
            let child = self.nodes[id.0].children[i];
            self.run_node(child, spectrogram, deadline, summary);
        }
    }

    fn skip_subtree(&self, id: ModuleId, summary: &mut PassSummary) {
        summary.skipped += 1;
        for &child in &self.nodes[id.0].children {
            self.skip_subtree(child, summary);
        }
    }
}
