use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot in slot {slot} is malformed: {source}")]
    MalformedSnapshot {
        slot: u8,
        source: serde_json::Error,
    },

    #[error(
        "Menial counters do not reconcile: snapshot has {expected_idle} idle of {expected_total}, \
         roster has {live_idle} idle of {live_total}"
    )]
    CounterMismatch {
        expected_total: u32,
        expected_idle: u32,
        live_total: u32,
        live_idle: u32,
    },

    #[error("Unknown {kind} '{id}'")]
    UnknownCatalogEntry { kind: &'static str, id: String },

    #[error("Not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },

    #[error("Mutator '{first}' cannot be combined with '{second}'")]
    IncompatibleMutators { first: String, second: String },

    #[error("Hiring is disabled by mutator '{mutator}'")]
    HiringForbidden { mutator: String },

    #[error("Provider '{name}' is not initialized")]
    ProviderUnavailable { name: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
