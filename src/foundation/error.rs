/// Convenience result type used across animir.
pub type AnimirResult<T> = Result<T, AnimirError>;

/// Top-level error taxonomy.
///
/// Everything here is fatal for the call that produced it. Per-frame emission never returns an
/// error; anomalies found while rendering are reported as [`crate::RenderIssue`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum AnimirError {
    /// Invalid user-provided scene data or an invalid command stream.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when deserializing the scene description.
    #[error("serialization error: {0}")]
    Serde(String),

    /// No layer in any reachable composition carries the binding key.
    #[error("binding layer not found: \"{binding_key}\"")]
    BindingLayerNotFound {
        /// Binding key that was searched for.
        binding_key: String,
    },

    /// A track matte consumer references a target that does not exist.
    #[error("matte target not found (tp={tp:?}) for layer \"{layer}\" in composition \"{comp}\"")]
    MatteTargetNotFound {
        /// Explicit `tp` of the consumer, if any.
        tp: Option<i64>,
        /// Consumer layer name.
        layer: String,
        /// Composition containing the consumer.
        comp: String,
    },

    /// A track matte target resolved to a layer that is not strictly before its consumer.
    #[error(
        "matte target (tp={tp:?}) for layer \"{layer}\" in composition \"{comp}\" is not positioned before it"
    )]
    MatteTargetInvalidOrder {
        /// Explicit `tp` of the consumer, if any.
        tp: Option<i64>,
        /// Consumer layer name.
        layer: String,
        /// Composition containing the consumer.
        comp: String,
    },

    /// Keyframes of an animated path disagree in vertex count or closed flag.
    #[error("animated path topology mismatch in {context}")]
    PathTopologyMismatch {
        /// Human readable location of the offending path.
        context: String,
    },

    /// A precomposition layer references an asset that is not a known precomposition.
    #[error("precomposition not found: \"{ref_id}\"")]
    PrecompNotFound {
        /// Referenced asset id.
        ref_id: String,
    },

    /// Precompositions reference each other in a cycle.
    #[error("precomposition cycle through \"{ref_id}\"")]
    PrecompCycle {
        /// Asset id at which the cycle was detected.
        ref_id: String,
    },

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimirError {
    /// Build an [`AnimirError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AnimirError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build an [`AnimirError::PathTopologyMismatch`] value.
    pub fn topology(context: impl Into<String>) -> Self {
        Self::PathTopologyMismatch {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for AnimirError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
