//! Constructor dependency resolution.
//!
//! # Responsibilities
//! - Fill in the constructor arguments of a registered type that were not
//!   supplied manually
//! - Recursively construct object dependencies
//! - Detect dependency cycles
//!
//! # Design Decisions
//! - Manual (preset) values always win over injected ones
//! - Optional, untyped, nullable and union-typed parameters are never forced
//! - Builtin scalars receive their zero value
//! - Unresolvable branches are skipped; only a cycle is an error
//! - The resolution path lives on the stack of one `resolve` call, nothing persists

use crate::error::{RouterError, RouterResult};
use crate::inject::{Arguments, CallableRef, Container, Instance, TypeHint};
use crate::observability::metrics;

/// Resolves constructor arguments against a [`Container`].
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'c> {
    container: &'c Container,
}

impl<'c> DependencyResolver<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// Complete `presets` with injected constructor arguments for `type_name`.
    ///
    /// Unknown or non-instantiable types return `presets` unchanged.
    pub fn resolve(&self, type_name: &str, presets: Arguments) -> RouterResult<Arguments> {
        let mut path = Vec::new();
        self.resolve_in(type_name, presets, &mut path)
    }

    /// Resolve and construct `type_name`.
    ///
    /// Returns `Ok(None)` for unknown or non-instantiable types; a failing
    /// constructor surfaces as an application error.
    pub fn build(&self, type_name: &str, presets: Arguments) -> RouterResult<Option<Instance>> {
        let args = self.resolve(type_name, presets)?;
        self.container
            .instantiate(type_name, &args)
            .map_err(RouterError::Application)
    }

    fn resolve_in(
        &self,
        type_name: &str,
        mut args: Arguments,
        path: &mut Vec<String>,
    ) -> RouterResult<Arguments> {
        let Some(descriptor) = self.container.type_descriptor(type_name) else {
            return Ok(args);
        };
        if !descriptor.is_instantiable() {
            return Ok(args);
        }

        if path.iter().any(|visited| visited == type_name) {
            let mut cycle = path.clone();
            cycle.push(type_name.to_string());
            tracing::error!(cycle = %cycle.join(" -> "), "Cyclic constructor dependency");
            return Err(RouterError::CyclicDependency { path: cycle });
        }
        path.push(type_name.to_string());

        let signature = self.container.signature_of(CallableRef::Constructor(type_name));
        for param in signature.params() {
            if args.contains(&param.name) || param.has_default {
                continue;
            }

            let dependency = match &param.hint {
                TypeHint::Untyped | TypeHint::Mixed => continue,
                _ if param.nullable => continue,
                hint if hint.is_builtin() => {
                    if let Some(zero) = hint.zero_value() {
                        args.insert(param.name.clone(), zero);
                    }
                    continue;
                }
                TypeHint::Named(dependency) => dependency,
            };

            let instantiable = self
                .container
                .type_descriptor(dependency)
                .is_some_and(|d| d.is_instantiable());
            if !instantiable {
                tracing::debug!(
                    owner = %type_name,
                    param = %param.name,
                    dependency = %dependency,
                    "Dependency is not instantiable, skipping"
                );
                continue;
            }

            let nested = self.resolve_in(dependency, Arguments::new(), path)?;
            match self.container.instantiate(dependency, &nested) {
                Ok(Some(instance)) => {
                    tracing::debug!(
                        owner = %type_name,
                        param = %param.name,
                        dependency = %dependency,
                        "Injected dependency"
                    );
                    metrics::record_injection(dependency);
                    args.insert(param.name.clone(), instance);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        owner = %type_name,
                        dependency = %dependency,
                        error = %err,
                        "Dependency constructor failed, leaving argument unset"
                    );
                }
            }
        }

        path.pop();
        Ok(args)
    }
}
