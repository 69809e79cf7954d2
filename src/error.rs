#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("duplicate category: {name}")]
    DuplicateCategory { name: String },

    #[error("unknown parent category {parent} for {name}")]
    UnknownParent { name: String, parent: String },

    #[error("default cause kind already set for {category} (is {current}, attempted {attempted})")]
    AlreadySet {
        category: String,
        current: crate::types::CauseKind,
        attempted: crate::types::CauseKind,
    },

    #[error("invalid wrap argument: {type_id:?} is neither a cause nor a failure value")]
    InvalidWrapArgument { type_id: std::any::TypeId },

    #[error("registry is sealed, cannot define {name}")]
    Sealed { name: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
