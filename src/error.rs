use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootcastError>;

#[derive(Debug, Error)]
pub enum BootcastError {
    #[error("Bean not found: {type_name}")]
    BeanNotFound { type_name: String },

    #[error("Failed to downcast bean: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Failed to bind properties under '{prefix}': {message}")]
    BindingFailed { prefix: String, message: String },

    #[error("Invalid JSON property source in {source_name}: {message}")]
    InvalidPropertySource {
        source_name: String,
        message: String,
    },
}

impl BootcastError {
    pub(crate) fn bean_not_found<T: ?Sized>() -> Self {
        Self::BeanNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub(crate) fn binding_failed(prefix: impl Into<String>, message: impl ToString) -> Self {
        Self::BindingFailed {
            prefix: prefix.into(),
            message: message.to_string(),
        }
    }
}
