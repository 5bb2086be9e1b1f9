#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier failed: {message}")]
    NotifierFailed { message: String },
    #[error("failed to launch link opener '{program}'")]
    OpenerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("link opener '{program}' exited with status {status:?}")]
    OpenerExit { program: String, status: Option<i32> },
}
