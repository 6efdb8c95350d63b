use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Media type the upstream uses for livestream replays.
pub const MEDIA_TYPE_LIVESTREAM: i64 = 9;

// Outer wrapper of /api/media/list. `data` stays raw until `code` says success.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamEnvelope {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamProfile {
    pub contact: Contact,
    #[serde(default, deserialize_with = "entries_or_empty")]
    pub object: Vec<VideoEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub continue_flag: i64,
    #[serde(default)]
    pub last_buffer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub object_nonce_id: String,
    pub createtime: i64,
    pub object_desc: ObjectDesc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDesc {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<MediaSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_type: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_url: String,
}

impl VideoEntry {
    pub fn first_media(&self) -> Option<&MediaSpec> {
        self.object_desc.media.first()
    }
}

// `object` is null or missing (or some other scalar) for authors without videos.
fn entries_or_empty<'de, D>(deserializer: D) -> Result<Vec<VideoEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

// Upstream sends `null` as freely as it omits fields; both mean "use the default".
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}
