use crate::error::RegistryError;
use crate::panels::{providers, PanelDescriptor, PanelKind, PanelRegistry};

pub const FLAMEGRAPH: &str = "Flamegraph";
pub const DETAILS: &str = "Details";
pub const CPU_LOAD: &str = "CPU Load";
pub const DIE_TEMPERATURE: &str = "Die temperature";
pub const OPERATOR_EXECUTION: &str = "Operator Execution Time";
pub const OPERATOR_TYPE_EXECUTION: &str = "Operator Type Execution Time";
pub const OPERATOR_SIZE: &str = "OP Size";
pub const MEMORY_USAGE: &str = "Memory usage";

/// Registers every panel the viewer ships with, in button order.
pub fn register_builtin_panels(registry: &mut PanelRegistry) -> Result<(), RegistryError> {
    registry.register(
        PanelDescriptor::new(FLAMEGRAPH, PanelKind::Flamegraph)
            .min_size(400.0, 200.0)
            .not_closable(),
    )?;
    registry.register(PanelDescriptor::new(DETAILS, PanelKind::Details).min_size(250.0, 150.0))?;
    registry.register(
        PanelDescriptor::new(CPU_LOAD, PanelKind::CpuLoad)
            .with_provider(providers::cpu_load)
            .multiple_plots()
            .max_instances(2),
    )?;
    registry.register(
        PanelDescriptor::new(DIE_TEMPERATURE, PanelKind::DieTemperature)
            .with_provider(providers::die_temperature)
            .max_instances(2),
    )?;
    registry.register(
        PanelDescriptor::new(OPERATOR_EXECUTION, PanelKind::OperatorExecution)
            .with_provider(providers::operator_execution)
            .max_instances(2),
    )?;
    registry.register(
        PanelDescriptor::new(OPERATOR_TYPE_EXECUTION, PanelKind::OperatorTypeExecution)
            .with_provider(providers::operator_type_execution),
    )?;
    registry.register(
        PanelDescriptor::new(OPERATOR_SIZE, PanelKind::OperatorSize)
            .with_provider(providers::operator_size),
    )?;
    registry.register(
        PanelDescriptor::new(MEMORY_USAGE, PanelKind::MemoryUsage)
            .with_provider(providers::memory_usage)
            .multiple_plots()
            .max_instances(2),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::ButtonState;
    use crate::trace::{GroupRegistry, VirtualTraceGenerator};

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = PanelRegistry::new();
        register_builtin_panels(&mut registry).unwrap();
        assert_eq!(registry.len(), 8);
        assert!(register_builtin_panels(&mut registry).is_err());
    }

    #[test]
    fn test_synthetic_group_makes_everything_available() {
        let mut registry = PanelRegistry::new();
        register_builtin_panels(&mut registry).unwrap();
        let mut groups = GroupRegistry::new();
        registry.refresh_availability(&groups);
        assert!(registry
            .list()
            .iter()
            .all(|d| d.button_state() == ButtonState::Hidden));

        groups.insert(VirtualTraceGenerator::new().generate("g1"));
        registry.refresh_availability(&groups);
        assert!(registry
            .list()
            .iter()
            .all(|d| d.button_state() == ButtonState::Enabled));
        assert!(!registry.get(FLAMEGRAPH).unwrap().is_closable());
    }
}
