//! # Mode registry
//!
//! Process-wide mapping from mode id to factory. The embedding runtime
//! builds a registry, registers every mode it wants exactly once, then
//! installs it; after installation the registry is read-only for the life
//! of the process and lookups hand out fresh instances.
use crate::mode::builtin::{ChalkMode, ChaosMode, MascotMode, MomentumMode, StatisticalMode};
use crate::mode::{ModeError, SimulationMode};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::sync::OnceLock;

type ModeFactory = Box<dyn Fn() -> Box<dyn SimulationMode> + Send + Sync>;

/// Id -> factory map. Ordered so that error listings and iteration are
/// deterministic.
#[derive(Default)]
pub struct ModeRegistry {
    factories: BTreeMap<String, ModeFactory>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode factory under the id of the mode it produces.
    ///
    /// # Errors
    ///
    /// A second registration of the same id fails; ids are permanent.
    pub fn register<F>(&mut self, factory: F) -> Result<(), ModeError>
    where
        F: Fn() -> Box<dyn SimulationMode> + Send + Sync + 'static,
    {
        let id = factory().id().to_string();
        if self.factories.contains_key(&id) {
            return Err(ModeError::DuplicateRegistration(id));
        }
        self.factories.insert(id, Box::new(factory));
        Ok(())
    }

    /// A fresh instance of the mode registered under `id`.
    ///
    /// # Errors
    ///
    /// Unknown ids fail with the available ids listed.
    pub fn create(&self, id: &str) -> Result<Box<dyn SimulationMode>, ModeError> {
        match self.factories.get(id) {
            Some(factory) => Ok(factory()),
            None => Err(ModeError::UnknownMode {
                id: id.to_string(),
                available: self.available_ids().join(", "),
            }),
        }
    }

    /// Registered ids in sorted order.
    pub fn available_ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect_vec()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Register the modes that ship with the engine.
pub fn register_builtin_modes(registry: &mut ModeRegistry) -> Result<(), ModeError> {
    registry.register(|| Box::new(StatisticalMode) as Box<dyn SimulationMode>)?;
    registry.register(|| Box::new(ChalkMode) as Box<dyn SimulationMode>)?;
    registry.register(|| Box::new(ChaosMode) as Box<dyn SimulationMode>)?;
    registry.register(|| Box::new(MascotMode) as Box<dyn SimulationMode>)?;
    registry.register(|| Box::new(MomentumMode) as Box<dyn SimulationMode>)?;
    Ok(())
}

static GLOBAL_REGISTRY: OnceLock<ModeRegistry> = OnceLock::new();

/// Install the process-wide registry. One shot: a second install fails and
/// leaves the first registry in place.
pub fn install_global(registry: ModeRegistry) -> Result<(), ModeError> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| ModeError::RegistryAlreadyInstalled)
}

/// The installed process-wide registry.
pub fn global() -> Result<&'static ModeRegistry, ModeError> {
    GLOBAL_REGISTRY.get().ok_or(ModeError::RegistryNotInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster_registers_once() {
        let mut registry = ModeRegistry::new();
        register_builtin_modes(&mut registry).unwrap();
        assert_eq!(
            registry.available_ids(),
            vec!["chalk", "chaos", "mascot", "momentum", "statistical"]
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = ModeRegistry::new();
        registry
            .register(|| Box::new(StatisticalMode) as Box<dyn SimulationMode>)
            .unwrap();
        let err = registry
            .register(|| Box::new(StatisticalMode) as Box<dyn SimulationMode>)
            .unwrap_err();
        assert!(matches!(err, ModeError::DuplicateRegistration(id) if id == "statistical"));
    }

    #[test]
    fn unknown_mode_lists_available() {
        let mut registry = ModeRegistry::new();
        register_builtin_modes(&mut registry).unwrap();
        let err = registry.create("crystal-ball").unwrap_err();
        match err {
            ModeError::UnknownMode { id, available } => {
                assert_eq!(id, "crystal-ball");
                assert!(available.contains("statistical"));
                assert!(available.contains("chalk"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn create_returns_fresh_instances() {
        let mut registry = ModeRegistry::new();
        register_builtin_modes(&mut registry).unwrap();
        let a = registry.create("chaos").unwrap();
        let b = registry.create("chaos").unwrap();
        assert_eq!(a.id(), b.id());
        // Both instances expose identical configuration.
        assert_eq!(a.variance_config(), b.variance_config());
    }
}
