//! Error types shared by the Dataverse client, the node runner and the form nodes

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DataverseError>;

/// Everything that can go wrong while talking to Dataverse or building a request
#[derive(Debug, Clone, PartialEq)]
pub enum DataverseError {
    /// Token request failed or the token endpoint answered with something unusable
    Auth { message: String },
    /// No entity name or request path could be derived from the supplied query
    Query { message: String, query: String },
    /// Dataverse answered with a non-2xx status
    Api {
        status: u16,
        status_text: String,
        body: String,
    },
    /// Malformed parameters supplied by the caller (columns, bodies, names)
    Validation { message: String },
    /// The request never produced a response (connection refused, timeout, ...)
    Transport { message: String },
    /// A 2xx response whose body is not the JSON we expected
    Decode { message: String, body: String },
    /// An HTML template could not be rendered
    Render { message: String },
}

impl DataverseError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            query: query.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            body: body.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// HTTP status carried by an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short category name, used when errors are attached to output items
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "AuthError",
            Self::Query { .. } => "QueryError",
            Self::Api { .. } => "ApiError",
            Self::Validation { .. } => "ValidationError",
            Self::Transport { .. } => "TransportError",
            Self::Decode { .. } => "DecodeError",
            Self::Render { .. } => "RenderError",
        }
    }
}

impl std::fmt::Display for DataverseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataverseError::Auth { message } => {
                write!(f, "Authentication failed: {}", message)
            }
            DataverseError::Query { message, query } => {
                write!(f, "Invalid query: {} (query: {})", message, query)
            }
            DataverseError::Api {
                status,
                status_text,
                body,
            } => {
                write!(
                    f,
                    "Dataverse API error: {} - {}. Details: {}",
                    status, status_text, body
                )
            }
            DataverseError::Validation { message } => {
                write!(f, "Invalid parameters: {}", message)
            }
            DataverseError::Transport { message } => {
                write!(f, "HTTP request failed: {}", message)
            }
            DataverseError::Decode { message, body } => {
                write!(f, "Unexpected response: {}. Body: {}", message, body)
            }
            DataverseError::Render { message } => {
                write!(f, "Rendering failed: {}", message)
            }
        }
    }
}

impl std::error::Error for DataverseError {}

/// Failure of a single item in a node batch, tagged with its position
#[derive(Debug, Clone, PartialEq)]
pub struct ItemError {
    pub item_index: usize,
    pub source: DataverseError,
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item {}: {}", self.item_index, self.source)
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
