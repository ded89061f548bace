//! The resolution engine.
//!
//! A [`Namespace`] is the handle build functions receive. Every `get` on it
//! resolves aliases, consults the scope's memo, detects cycles, escalates
//! node kinds the scope does not build to its parent and otherwise runs the
//! definition's build function exactly once.
//!
//! Scopes live in an arena owned by a single resolver that exists for the
//! duration of one `build_ir` call, so no state is shared between calls.
//!
//! ```text
//! unseen --get--> building --ok--> built
//!                          \--err--> failed
//! ```

mod scope;

use std::collections::VecDeque;
use std::{iter, mem};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use scope::NamespaceKind;
use scope::{BuildState, Scope, ScopeId};

use crate::builder::ResolveOptions;
use crate::ir::{Dependency, IrNode, NodeRef, ScopeContents, downcast};
use crate::wiring::{WiringDef, WiringError, WiringSpec};

type DeferredAction<'s> =
    Box<dyn FnOnce(&mut Namespace<'_, 's>) -> Result<(), WiringError> + 's>;

/// A definition currently being built.
#[derive(Debug)]
struct Frame {
    scope: ScopeId,
    name: String,
    /// Proxies are transparent: requests they make are attributed to the
    /// nearest enclosing non-proxy frame.
    proxy: bool,
}

/// Owner of every scope and of the in-progress stack for one resolution.
pub(crate) struct Resolver<'s> {
    spec: &'s WiringSpec,
    options: ResolveOptions,
    scopes: Vec<Scope>,
    stack: Vec<Frame>,
    dependencies: IndexSet<Dependency>,
    /// Names each proxy forwarded to, replayed when a proxy is memoized.
    forwarded: IndexMap<String, IndexSet<String>>,
    deferred: VecDeque<(ScopeId, DeferredAction<'s>)>,
}

impl<'s> Resolver<'s> {
    pub(crate) fn new(spec: &'s WiringSpec, options: ResolveOptions) -> Self {
        Self {
            spec,
            options,
            scopes: Vec::new(),
            stack: Vec::new(),
            dependencies: IndexSet::new(),
            forwarded: IndexMap::new(),
            deferred: VecDeque::new(),
        }
    }

    pub(crate) fn push_scope(
        &mut self,
        name: String,
        kind: NamespaceKind,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        debug!(namespace = %name, %kind, "opened namespace");
        self.scopes.push(Scope::new(name, kind, parent));
        id
    }

    pub(crate) const fn namespace(&mut self, scope: ScopeId) -> Namespace<'_, 's> {
        Namespace {
            resolver: self,
            scope,
        }
    }

    /// Run deferred actions in the order they were registered, including
    /// any registered while running.
    pub(crate) fn run_deferred(&mut self) -> Result<(), WiringError> {
        while let Some((scope, action)) = self.deferred.pop_front() {
            action(&mut self.namespace(scope))?;
        }
        Ok(())
    }

    /// Take the contents of `scope` and the recorded dependency edges.
    pub(crate) fn finish(mut self, scope: ScopeId) -> (ScopeContents, Vec<Dependency>) {
        let contents = mem::take(&mut self.scope_mut(scope).contents);
        (contents, self.dependencies.into_iter().collect())
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "scope ids are only issued by push_scope and scopes are never removed"
    )]
    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "scope ids are only issued by push_scope and scopes are never removed"
    )]
    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    fn get(&mut self, scope: ScopeId, name: &str) -> Result<NodeRef, WiringError> {
        let spec = self.spec;
        let resolved = spec.resolve_alias(name)?;
        let proxy = spec
            .definition(&resolved)
            .is_some_and(|def| def.options().proxy);
        if let Some(BuildState::Built(node)) = self.scope(scope).state(&resolved) {
            let hit = Arc::clone(node);
            if proxy {
                self.replay_forwarded(&resolved);
            } else {
                self.record_dependency(&resolved);
            }
            return Ok(hit);
        }
        let def = spec
            .definition(&resolved)
            .filter(|def| def.is_defined())
            .ok_or_else(|| WiringError::NotFound {
                requested: name.to_owned(),
                resolved: resolved.clone(),
            })?;
        if !proxy {
            self.record_dependency(def.name());
        }
        self.resolve(scope, def)
    }

    fn record_dependency(&mut self, to: &str) {
        for frame in self.stack.iter().rev() {
            if !frame.proxy {
                if frame.name != to {
                    self.dependencies
                        .insert(Dependency::new(frame.name.clone(), to));
                }
                return;
            }
            self.forwarded
                .entry(frame.name.clone())
                .or_default()
                .insert(to.to_owned());
        }
    }

    fn replay_forwarded(&mut self, proxy: &str) {
        let targets: Vec<String> = self
            .forwarded
            .get(proxy)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default();
        for target in &targets {
            self.record_dependency(target);
        }
    }

    fn resolve(&mut self, scope: ScopeId, def: &'s WiringDef) -> Result<NodeRef, WiringError> {
        let name = def.name();
        match self.scope(scope).state(name) {
            Some(BuildState::Built(node)) => {
                debug!(namespace = %self.scope(scope).name, node = name, "memoized");
                return Ok(Arc::clone(node));
            }
            Some(BuildState::Building) => return Err(self.cycle(scope, name)),
            Some(BuildState::Failed) => {
                return Err(WiringError::PreviouslyFailed {
                    name: name.to_owned(),
                });
            }
            None => {}
        }
        if self.stack.len() >= self.options.max_depth {
            return Err(WiringError::DepthExceeded {
                name: name.to_owned(),
                limit: self.options.max_depth,
            });
        }
        match self.scope(scope).escalation_target(def.node_kind()) {
            Some(parent) => self.escalate(scope, parent, def),
            None => self.build(scope, def),
        }
    }

    fn escalate(
        &mut self,
        scope: ScopeId,
        parent: ScopeId,
        def: &'s WiringDef,
    ) -> Result<NodeRef, WiringError> {
        let name = def.name();
        debug!(
            from = %self.scope(scope).name,
            to = %self.scope(parent).name,
            node = name,
            "escalating to parent namespace"
        );
        let node = self.resolve(parent, def)?;
        let child = self.scope_mut(scope);
        if !def.options().proxy {
            child.contents.edges.push(Arc::clone(&node));
        }
        child
            .states
            .insert(name.to_owned(), BuildState::Built(Arc::clone(&node)));
        Ok(node)
    }

    fn build(&mut self, scope: ScopeId, def: &'s WiringDef) -> Result<NodeRef, WiringError> {
        let name = def.name();
        let Some(build) = def.build_fn() else {
            return Err(WiringError::NotFound {
                requested: name.to_owned(),
                resolved: name.to_owned(),
            });
        };
        debug!(namespace = %self.scope(scope).name, node = name, "building");
        self.scope_mut(scope)
            .states
            .insert(name.to_owned(), BuildState::Building);
        self.stack.push(Frame {
            scope,
            name: name.to_owned(),
            proxy: def.options().proxy,
        });
        let built = build(&mut self.namespace(scope));
        self.stack.pop();

        let result = built.and_then(|node| check_kind(self.options, def, node));
        let target = self.scope_mut(scope);
        let state = match &result {
            Ok(node) => {
                if !def.options().proxy {
                    target.contents.nodes.push(Arc::clone(node));
                }
                BuildState::Built(Arc::clone(node))
            }
            Err(err) => {
                debug!(namespace = %target.name, node = name, error = %err, "build failed");
                BuildState::Failed
            }
        };
        target.states.insert(name.to_owned(), state);
        result
    }

    fn cycle(&self, scope: ScopeId, name: &str) -> WiringError {
        let cycle = self
            .stack
            .iter()
            .position(|frame| frame.scope == scope && frame.name == name)
            .map_or_else(
                || vec![name.to_owned(), name.to_owned()],
                |start| {
                    self.stack
                        .iter()
                        .skip(start)
                        .map(|frame| frame.name.clone())
                        .chain(iter::once(name.to_owned()))
                        .collect()
                },
            );
        WiringError::CyclicDependency { cycle }
    }
}

fn check_kind(options: ResolveOptions, def: &WiringDef, node: NodeRef) -> Result<NodeRef, WiringError> {
    match def.options().return_kind {
        Some(declared) if options.check_node_kinds && node.kind() != declared => {
            Err(WiringError::NodeKindMismatch {
                name: def.name().to_owned(),
                declared,
                actual: node.kind(),
            })
        }
        _ => Ok(node),
    }
}

/// A resolution scope as seen by a build function.
///
/// `'s` is the lifetime of the wiring spec being resolved.
pub struct Namespace<'r, 's> {
    resolver: &'r mut Resolver<'s>,
    scope: ScopeId,
}

impl<'s> Namespace<'_, 's> {
    /// Name of this namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.resolver.scope(self.scope).name
    }

    /// Flavour of this namespace.
    #[must_use]
    pub fn kind(&self) -> NamespaceKind {
        self.resolver.scope(self.scope).kind
    }

    /// The wiring spec being resolved.
    #[must_use]
    pub const fn spec(&self) -> &'s WiringSpec {
        self.resolver.spec
    }

    /// Resolve `name` to a built node, building it on first use.
    ///
    /// Repeated calls for the same name return the same node.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::NotFound`] for unknown names,
    /// [`WiringError::CyclicDependency`] when `name` is already being built in
    /// this namespace, [`WiringError::PreviouslyFailed`] for names whose build
    /// already failed, and any error the build function returns.
    pub fn get(&mut self, name: &str) -> Result<NodeRef, WiringError> {
        self.resolver.get(self.scope, name)
    }

    /// Resolve `name` and downcast the node to `T`.
    ///
    /// # Errors
    ///
    /// As for [`Namespace::get`], plus [`WiringError::NodeTypeMismatch`]
    /// when the node is not a `T`.
    pub fn get_as<T: IrNode>(&mut self, name: &str) -> Result<Arc<T>, WiringError> {
        let node = self.get(name)?;
        downcast::<T>(node).map_err(|_| WiringError::NodeTypeMismatch {
            name: name.to_owned(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Build `name` for its side effects on this namespace.
    ///
    /// # Errors
    ///
    /// As for [`Namespace::get`].
    pub fn instantiate(&mut self, name: &str) -> Result<(), WiringError> {
        self.get(name).map(drop)
    }

    /// Register a node built outside the wiring spec under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::AlreadyBuilt`] if this namespace has already
    /// seen `name`.
    pub fn put(&mut self, name: &str, node: NodeRef) -> Result<(), WiringError> {
        let scope = self.resolver.scope_mut(self.scope);
        if scope.states.contains_key(name) {
            return Err(WiringError::AlreadyBuilt {
                name: name.to_owned(),
                namespace: scope.name.clone(),
            });
        }
        debug!(namespace = %scope.name, node = name, "registered external node");
        scope.contents.nodes.push(Arc::clone(&node));
        scope.states.insert(name.to_owned(), BuildState::Built(node));
        Ok(())
    }

    /// Run `action` in this namespace once every root has been built.
    ///
    /// Actions run in registration order; the first error aborts the build.
    pub fn defer<F>(&mut self, action: F)
    where
        F: FnOnce(&mut Namespace<'_, 's>) -> Result<(), WiringError> + 's,
    {
        self.resolver.deferred.push_back((self.scope, Box::new(action)));
    }

    /// Read the single value of `key` on `name` without registering `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Property`] when the value is not a `T`.
    pub fn property<T>(&self, name: &str, key: &str, dst: &mut T) -> Result<(), WiringError>
    where
        T: DeserializeOwned + Default,
    {
        let spec = self.spec();
        let resolved = spec.resolve_alias(name)?;
        match spec.definition(&resolved) {
            Some(def) => def
                .properties
                .get(key, dst)
                .map_err(|source| WiringError::property(&resolved, key, source)),
            None => {
                *dst = T::default();
                Ok(())
            }
        }
    }

    /// Read every value of `key` on `name` without registering `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::Property`] when a value is not a `T`.
    pub fn properties<T>(&self, name: &str, key: &str, dst: &mut Vec<T>) -> Result<(), WiringError>
    where
        T: DeserializeOwned,
    {
        let spec = self.spec();
        let resolved = spec.resolve_alias(name)?;
        match spec.definition(&resolved) {
            Some(def) => def
                .properties
                .get_all(key, dst)
                .map_err(|source| WiringError::property(&resolved, key, source)),
            None => {
                dst.clear();
                Ok(())
            }
        }
    }

    /// Open a nested namespace whose rejected node kinds escalate here.
    pub fn child(&mut self, name: &str, kind: NamespaceKind) -> Namespace<'_, 's> {
        let id = self
            .resolver
            .push_scope(name.to_owned(), kind, Some(self.scope));
        self.resolver.namespace(id)
    }

    /// Take the nodes this namespace built and the edges it borrowed.
    #[must_use]
    pub fn into_contents(self) -> ScopeContents {
        mem::take(&mut self.resolver.scope_mut(self.scope).contents)
    }
}
