//! Errors raised by concrete renderers.
//!
//! The resolver itself never fails. These variants exist so components have a
//! shared vocabulary for signalling bad input; the resolver returns them to the
//! caller exactly as the component produced them.

/// Failure reported by a [`Component`](crate::Component).
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A required property was not supplied.
    #[error("component `{component}` requires prop `{prop}`")]
    MissingProp {
        /// Component name.
        component: String,
        /// Missing property key.
        prop: String,
    },
    /// The component expects a non-empty children payload.
    #[error("component `{component}` expects children")]
    MissingChildren {
        /// Component name.
        component: String,
    },
    /// A property was present but unusable.
    #[error("component `{component}`: invalid value for prop `{prop}`: {reason}")]
    InvalidProp {
        /// Component name.
        component: String,
        /// Property key.
        prop: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Any other component-specific failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ComponentError {
    /// Shorthand for [`ComponentError::MissingProp`].
    pub fn missing_prop(component: impl Into<String>, prop: impl Into<String>) -> Self {
        Self::MissingProp {
            component: component.into(),
            prop: prop.into(),
        }
    }

    /// Shorthand for [`ComponentError::InvalidProp`].
    pub fn invalid_prop(
        component: impl Into<String>,
        prop: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidProp {
            component: component.into(),
            prop: prop.into(),
            reason: reason.into(),
        }
    }
}
