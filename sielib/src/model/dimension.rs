use serde::{Deserialize, Serialize};

/// What an object dimension id stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    CostCenter,
    CostBearer,
    Project,
    Other(u32),
}

impl From<u32> for ObjectKind {
    fn from(dimension: u32) -> Self {
        match dimension {
            1 => ObjectKind::CostCenter,
            2 => ObjectKind::CostBearer,
            3 => ObjectKind::Project,
            other => ObjectKind::Other(other),
        }
    }
}

/// A `(dimension, object number)` pair as found in `{1 "100"}` lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub dimension: u32,
    pub number: String,
}

impl ObjectReference {
    pub fn new(dimension: u32, number: impl Into<String>) -> Self {
        Self {
            dimension,
            number: number.into(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.dimension.into()
    }
}

/// `#DIM` / `#UNDERDIM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingDimension {
    pub id: u32,
    pub label: String,
    pub parent: Option<u32>,
}

/// `#OBJEKT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingObject {
    pub dimension: u32,
    pub number: String,
    pub label: String,
}

impl AccountingObject {
    pub fn reference(&self) -> ObjectReference {
        ObjectReference::new(self.dimension, self.number.clone())
    }
}
