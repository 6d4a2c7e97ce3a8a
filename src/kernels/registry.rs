use crate::error::RegistrationError;
use crate::kernels::op_kind::OpKind;

/// Maximum number of kernel slots in a registry.
pub const REGISTRY_CAPACITY: usize = 2;

/// Fixed-capacity set of kernels an interpreter may use.
///
/// Models that reference a kernel missing from the registry fail during
/// tensor allocation.
#[derive(Debug, Clone)]
pub struct OpRegistry {
    slots: [Option<OpKind>; REGISTRY_CAPACITY],
    capacity: usize,
}

impl Default for OpRegistry {
    fn default() -> Self {
        OpRegistry::with_capacity(REGISTRY_CAPACITY)
    }
}

impl OpRegistry {
    pub fn new() -> OpRegistry {
        OpRegistry::default()
    }

    /// Registry with fewer usable slots; `capacity` is capped at
    /// [`REGISTRY_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> OpRegistry {
        OpRegistry { slots: [None; REGISTRY_CAPACITY], capacity: capacity.min(REGISTRY_CAPACITY) }
    }

    /// Registry holding exactly the dense and logistic kernels.
    pub fn for_gates() -> Result<OpRegistry, RegistrationError> {
        let mut registry = OpRegistry::new();
        registry.register(OpKind::FullyConnected)?;
        registry.register(OpKind::Logistic)?;
        Ok(registry)
    }

    pub fn register(&mut self, kind: OpKind) -> Result<(), RegistrationError> {
        if self.contains(kind) {
            return Err(RegistrationError::AlreadyRegistered(kind));
        }
        let capacity = self.capacity;
        let slot = self.slots[..capacity]
            .iter_mut()
            .find(|s| s.is_none())
            .ok_or(RegistrationError::RegistryFull { kind, capacity })?;
        *slot = Some(kind);
        Ok(())
    }

    pub fn contains(&self, kind: OpKind) -> bool {
        self.slots.iter().any(|s| *s == Some(kind))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
