use serde::Serialize;

/// Platform-agnostic feed handed to the aggregation host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: String,
    pub logo: String,
    pub icon: String,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub guid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub description: String,
    pub pub_date: String,
    pub link: String,
    pub author: String,
    // reserved; never populated
    pub comments: Vec<String>,
}

/// One page of an author's videos plus the cursor for the following page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePage {
    pub feed: NormalizedFeed,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub username: String,
    pub cursor: String,
}

impl FeedRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), cursor: String::new() }
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }
}
