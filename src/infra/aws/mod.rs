pub mod parameter_store;

pub use parameter_store::{ParameterStore, ParameterStoreError, DEFAULT_REGION};
