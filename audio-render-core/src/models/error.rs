use thiserror::Error;

/// Failure reported by a single backend call.
///
/// `code` carries the backend's native status (an HRESULT on Windows,
/// an arbitrary negative number in fakes).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (code {code:#010x})")]
pub struct BackendError {
    pub code: i32,
    pub message: String,
}

impl BackendError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The backend does not offer an optional capability.
    pub fn unsupported(what: &str) -> Self {
        Self::new(-1, format!("{} not supported", what))
    }
}

/// Why the default render endpoint could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("device enumerator unavailable: {0}")]
    Enumerator(BackendError),

    #[error("no default render endpoint: {0}")]
    NoDefault(BackendError),
}

/// Open-time failures. Every variant is terminal for that `open()` call.
///
/// Each stage maps to a stable negative status code (see [`OpenError::code`])
/// used by the C ABI.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("invalid stream configuration: {0}")]
    InvalidConfig(String),

    #[error("backend enumeration failed: {0}")]
    Enumeration(BackendError),

    #[error("default render endpoint unavailable: {0}")]
    NoDefaultEndpoint(BackendError),

    #[error("device activation failed: {0}")]
    Activation(BackendError),

    #[error("stream initialization failed: {0}")]
    Initialize(BackendError),

    #[error("buffer size query failed: {0}")]
    BufferSize(BackendError),

    #[error("render service acquisition failed: {0}")]
    RenderService(BackendError),

    #[error("notification handle creation failed: {0}")]
    Notification(BackendError),

    #[error("failed to spawn render thread: {0}")]
    RenderThread(String),
}

impl OpenError {
    /// Wire status code: 0 is success, each failure stage is negative.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => -1,
            Self::Enumeration(_) => -2,
            Self::NoDefaultEndpoint(_) => -3,
            Self::Activation(_) => -4,
            Self::Initialize(_) => -5,
            Self::BufferSize(_) => -6,
            Self::RenderService(_) => -7,
            Self::Notification(_) => -8,
            Self::RenderThread(_) => -9,
        }
    }
}

impl From<EndpointError> for OpenError {
    fn from(e: EndpointError) -> Self {
        match e {
            EndpointError::Enumerator(inner) => Self::Enumeration(inner),
            EndpointError::NoDefault(inner) => Self::NoDefaultEndpoint(inner),
        }
    }
}
