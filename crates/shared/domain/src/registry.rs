//! Type-erased registry entries for pre-initialized feature slices.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Feature state that can be shared across request handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// A feature slice ready to be registered in the API state.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    /// Rust type name of the slice, for startup diagnostics.
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), state: Box::new(state) }
    }

    /// Borrows the concrete slice if this entry holds a `T`.
    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}
