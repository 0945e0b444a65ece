//! Cost model handed to the proving backend

use thiserror::Error;

/// Opaque cost model, either the built-in initial one or a serialized override
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CostModel {
    /// The backend's built-in initial cost model
    #[default]
    Initial,
    /// A serialized cost model, interpreted by the backend
    Serialized(Vec<u8>),
}

/// A serialized cost model was rejected
#[derive(Debug, Error, PartialEq, Eq)]
#[error("serialized cost model is empty")]
pub struct EmptyCostModel;

impl CostModel {
    /// The fixed default used for every demo proof.
    pub fn initial() -> Self {
        Self::Initial
    }

    /// Wraps a serialized cost model.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EmptyCostModel> {
        if bytes.is_empty() {
            return Err(EmptyCostModel);
        }
        Ok(Self::Serialized(bytes.to_vec()))
    }

    /// Serialized form; empty for [`CostModel::Initial`].
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Initial => Vec::new(),
            Self::Serialized(bytes) => bytes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_default_and_serializes_empty() {
        assert_eq!(CostModel::default(), CostModel::initial());
        assert!(CostModel::initial().to_bytes().is_empty());
    }

    #[test]
    fn serialized_keeps_bytes() {
        let model = CostModel::from_bytes(&[1, 2]).expect("non-empty");
        assert_eq!(model.to_bytes(), vec![1, 2]);
        assert_eq!(CostModel::from_bytes(&[]), Err(EmptyCostModel));
    }
}
