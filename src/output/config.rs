use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = match env::var("WXFEED_OUTPUT_FORMAT").ok().as_deref() {
            Some("text") => OutputFormat::Text,
            _ => OutputFormat::Json,
        };
        let pretty = env::var("WXFEED_OUTPUT_PRETTY").ok().as_deref().is_some_and(is_truthy);
        OutputConfig { format, pretty }
    }
}

fn is_truthy(v: &str) -> bool {
    v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}
