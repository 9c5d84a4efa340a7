use thiserror::Error;

/// Inbound payload rejected before either sink is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid 'products' JSON format: {0}")]
    MalformedProducts(String),

    #[error("'products' must be an array")]
    ProductsNotAList,

    #[error("Product line {index} must be an object")]
    InvalidProductLine { index: usize },

    #[error("Product line {index} has an invalid Quantity: {value}")]
    InvalidQuantity { index: usize, value: String },

    #[error("Submission expands to {count} records, limit is {limit}")]
    TooManyRecords { count: u64, limit: usize },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Request body is not valid JSON: {0}")]
    InvalidBody(String),
}

/// Failure of a single sink call.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Sink rejected the write with status {status}")]
    Rejected {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Invalid sink response: {message}")]
    InvalidResponse { message: String },
}

impl SinkError {
    /// JSON payload forwarded to the requester as `details`.
    pub fn details(&self) -> serde_json::Value {
        match self {
            SinkError::Rejected { status, body } => serde_json::json!({
                "status": status,
                "body": body,
            }),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Primary store write failed: {0}")]
    PrimaryStoreFailed(#[source] SinkError),

    /// The store rows are already committed when this is returned.
    #[error("Spreadsheet mirror failed after {stored} stored records: {source}")]
    MirrorFailed {
        stored: usize,
        #[source]
        source: SinkError,
    },
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Service account credentials are not configured")]
    Missing,

    #[error("Credentials are neither JSON nor base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Credentials are not a valid service account key: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Service account key is missing '{field}'")]
    IncompleteKey { field: String },

    #[error("Could not build authenticator: {0}")]
    Authenticator(#[from] std::io::Error),

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Token request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
