use crate::monitor::module::Module;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate module key: {0}")]
    DuplicateKey(&'static str),
}

/// The fixed, ordered set of modules for one session.
///
/// Registration order is the order modules tick in and the order their
/// fragments appear in the report.
pub struct Registry {
    modules: Vec<Box<dyn Module>>,
}

impl Registry {
    pub fn new(modules: Vec<Box<dyn Module>>) -> Result<Self, RegistryError> {
        for (i, module) in modules.iter().enumerate() {
            if modules[..i].iter().any(|m| m.key() == module.key()) {
                return Err(RegistryError::DuplicateKey(module.key()));
            }
        }
        Ok(Self { modules })
    }

    /// Battery, network and unlock, in that order.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(crate::modules::builtin())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Module + 'static)> {
        self.modules.iter().map(|m| m.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Module + 'static)> {
        self.modules.iter_mut().map(|m| m.as_mut())
    }

    pub fn get(&self, key: &str) -> Option<&(dyn Module + 'static)> {
        self.iter().find(|m| m.key() == key)
    }

    pub fn alive_count(&self) -> usize {
        self.iter().filter(|m| m.alive()).count()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::testing::FakeModule;

    #[test]
    fn test_builtin_order() {
        let registry = Registry::builtin().unwrap();
        let keys: Vec<_> = registry.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec!["battery", "network", "unlock"]);
        assert_eq!(registry.alive_count(), 0);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = Registry::new(vec![
            Box::new(FakeModule::new("a", 1000)),
            Box::new(FakeModule::new("b", 1000)),
            Box::new(FakeModule::new("a", 2000)),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicateKey("a"))));
    }

    #[test]
    fn test_get_by_key() {
        let registry = Registry::new(vec![
            Box::new(FakeModule::new("a", 1000)),
            Box::new(FakeModule::new("b", 2000)),
        ])
        .unwrap();
        assert_eq!(registry.get("b").map(|m| m.tick_interval_ms()), Some(2000));
        assert!(registry.get("c").is_none());
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
