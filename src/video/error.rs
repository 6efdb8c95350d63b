#[derive(Debug)]
pub enum VideoError {
    InvalidRequest(&'static str),
    Config(String),
    Transport(reqwest::Error),
    Upstream { code: i64, msg: String },
    MalformedResponse(String),
}

impl VideoError {
    pub fn decode(err: serde_json::Error) -> Self {
        VideoError::MalformedResponse(err.to_string())
    }
}

impl From<reqwest::Error> for VideoError {
    fn from(err: reqwest::Error) -> Self {
        VideoError::Transport(err)
    }
}

impl std::fmt::Display for VideoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoError::InvalidRequest(why) => write!(f, "invalid request: {why}"),
            VideoError::Config(why) => write!(f, "configuration error: {why}"),
            VideoError::Transport(err) => write!(f, "http error: {err}"),
            VideoError::Upstream { code, msg } => {
                write!(f, "Got error code {code} while fetching: {msg}")
            }
            VideoError::MalformedResponse(why) => write!(f, "malformed upstream response: {why}"),
        }
    }
}

impl std::error::Error for VideoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VideoError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
