use chrono::{DateTime, Utc};
use url::form_urlencoded;

use super::error::VideoError;
use super::feed::{NormalizedFeed, NormalizedItem, ProfilePage};
use super::types::{Contact, UpstreamEnvelope, UpstreamProfile, VideoEntry, MEDIA_TYPE_LIVESTREAM};

pub fn parse_envelope(body: &[u8]) -> Result<UpstreamEnvelope, VideoError> {
    serde_json::from_slice(body).map_err(VideoError::decode)
}

/// Fails with the upstream code/msg unless `code == 0`, then decodes `data`.
pub fn into_profile(envelope: UpstreamEnvelope) -> Result<UpstreamProfile, VideoError> {
    if envelope.code != 0 {
        return Err(VideoError::Upstream { code: envelope.code, msg: envelope.msg });
    }
    serde_json::from_value(envelope.data).map_err(VideoError::decode)
}

pub fn build_page(base_url: &str, username: &str, profile: &UpstreamProfile) -> Result<ProfilePage, VideoError> {
    let feed = build_feed(base_url, username, profile)?;
    let next_marker = match (&profile.last_buffer, profile.continue_flag) {
        (Some(buf), flag) if flag != 0 && !buf.is_empty() => Some(buf.clone()),
        _ => None,
    };
    Ok(ProfilePage { feed, next_marker })
}

pub fn build_feed(base_url: &str, username: &str, profile: &UpstreamProfile) -> Result<NormalizedFeed, VideoError> {
    let contact = &profile.contact;
    let items = profile
        .object
        .iter()
        .filter(|entry| !is_livestream_entry(entry))
        .map(|entry| build_item(base_url, contact, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedFeed {
        title: format!("{} 的视频号", contact.nickname),
        link: profile_link(base_url, username),
        description: format!("{} 的视频号主页", contact.nickname),
        image: contact.head_url.clone(),
        logo: contact.head_url.clone(),
        icon: contact.head_url.clone(),
        items,
    })
}

/// Livestream replays carry media type 9 on their first media element.
/// Entries without media are regular posts.
pub fn is_livestream_entry(entry: &VideoEntry) -> bool {
    entry
        .first_media()
        .is_some_and(|media| media.media_type == MEDIA_TYPE_LIVESTREAM)
}

pub fn build_item(base_url: &str, contact: &Contact, entry: &VideoEntry) -> Result<NormalizedItem, VideoError> {
    let text = &entry.object_desc.description;
    let media = entry.first_media();

    let description = match media {
        Some(m) => format!(
            r#"<img src="{}" alt="{}" /><br />{}"#,
            escape_html(&m.cover_url),
            escape_html(text),
            escape_html(text)
        ),
        None => format!("{} - {}", escape_html(&contact.nickname), escape_html(text)),
    };

    Ok(NormalizedItem {
        guid: entry.id.clone(),
        title: text.clone(),
        image: media.map(|m| m.cover_url.clone()),
        description,
        pub_date: http_date(entry.createtime)?,
        link: player_link(base_url, &entry.id, nonce_prefix(&entry.object_nonce_id)),
        author: contact.nickname.clone(),
        comments: Vec::new(),
    })
}

/// Secondary id: everything before the first `_` (whole string if none).
pub fn nonce_prefix(object_nonce_id: &str) -> &str {
    object_nonce_id.split('_').next().unwrap_or_default()
}

/// RFC 1123 date in GMT, e.g. `Tue, 14 Nov 2023 22:13:20 GMT`.
pub fn http_date(unix_secs: i64) -> Result<String, VideoError> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(unix_secs, 0)
        .ok_or_else(|| VideoError::MalformedResponse(format!("createtime out of range: {unix_secs}")))?;
    Ok(dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

pub fn profile_link(base_url: &str, username: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("{base_url}/author/?username={encoded}")
}

pub fn player_link(base_url: &str, oid: &str, nid: &str) -> String {
    format!("{base_url}/player/?oid={oid}&nid={nid}&embed=1")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
