use crate::error::{BootcastError, Result};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Thread-safe, type-keyed registry of the services an application context
/// holds.
///
/// Registration goes through `&self` so that context initializers and
/// context-aware listeners can contribute beans to a shared context.
#[derive(Clone, Default)]
pub struct BeanRegistry {
    beans: DashMap<TypeId, BeanEntry>,
}

#[derive(Clone)]
struct BeanEntry {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl BeanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bean, replacing any previous bean of the same type
    pub fn register<T: 'static + Send + Sync>(&self, instance: T) -> &Self {
        self.register_arc(Arc::new(instance))
    }

    /// Register an already shared bean
    pub fn register_arc<T: 'static + Send + Sync>(&self, instance: Arc<T>) -> &Self {
        let entry = BeanEntry {
            instance,
            type_name: std::any::type_name::<T>(),
        };
        if self.beans.insert(TypeId::of::<T>(), entry).is_some() {
            tracing::debug!("Replaced bean {}", std::any::type_name::<T>());
        }
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let entry = self
            .beans
            .get(&TypeId::of::<T>())
            .ok_or_else(BootcastError::bean_not_found::<T>)?;
        entry
            .instance
            .clone()
            .downcast::<T>()
            .map_err(|_| BootcastError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.beans.contains_key(&TypeId::of::<T>())
    }

    /// Type names of the registered beans, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.beans.iter().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}
