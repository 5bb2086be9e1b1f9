#[derive(Debug, thiserror::Error)]
pub enum DevOpsError {
    #[error("devops request returned error ({method} {url}) status={status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("devops request could not be sent ({method} {url}): {message}")]
    Transport {
        method: &'static str,
        url: String,
        message: String,
    },
    #[error("devops response could not be decoded ({context}): {source}")]
    Decode {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("devops request body could not be encoded ({context}): {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("personal access token variable {var} is not set")]
    MissingToken { var: String },
    #[error("devops contract violation: {message}")]
    ContractViolation { message: String },
}

impl DevOpsError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DevOpsError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}
