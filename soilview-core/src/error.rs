use thiserror::Error;

/// Which external collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Geocoding,
    Weather,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding service",
            Service::Weather => "weather service",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure classes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotFound,
    Unavailable,
    Malformed,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No match found for place '{place}'")]
    NotFound { place: String },

    #[error("Request to {service} could not complete")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with status {status}: {body}")]
    HttpStatus {
        service: Service,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Unexpected {service} response: {detail}")]
    MalformedResponse { service: Service, detail: String },
}

impl QueryError {
    pub fn malformed(service: Service, detail: impl Into<String>) -> Self {
        QueryError::MalformedResponse {
            service,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            QueryError::NotFound { .. } => FailureKind::NotFound,
            QueryError::Network { .. } | QueryError::HttpStatus { .. } => FailureKind::Unavailable,
            QueryError::MalformedResponse { .. } => FailureKind::Malformed,
        }
    }

    /// Short message suitable for showing next to the search box.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::NotFound { place } => format!("No place called '{place}' could be found."),
            QueryError::Network { service, .. } | QueryError::HttpStatus { service, .. } => {
                format!("The {service} is unavailable right now. Try again later.")
            }
            QueryError::MalformedResponse { service, .. } => {
                format!("The {service} sent data that could not be read.")
            }
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
