use bytes::Bytes;
use reqwest::Client;
use tracing::Instrument;
use url::Url;

use crate::config::WechatConfig;
use crate::telemetry::{self};
use crate::telemetry::ops::video::Phase as VideoPhase;

use super::error::VideoError;
use super::feed::{FeedRequest, NormalizedFeed, ProfilePage};
use super::transform;

/// Turns one page of an author's channel listing into a normalized feed.
///
/// Owns only configuration; the HTTP client (and with it timeout and
/// connection reuse) is lent by the caller on every call.
#[derive(Clone, Debug)]
pub struct ProfileVideoAdapter {
    config: WechatConfig,
}

impl ProfileVideoAdapter {
    pub fn new(config: WechatConfig) -> Self {
        Self { config }
    }

    pub async fn fetch_profile_videos(&self, http: &Client, req: &FeedRequest) -> Result<NormalizedFeed, VideoError> {
        Ok(self.fetch_profile_page(http, req).await?.feed)
    }

    pub async fn fetch_profile_page(&self, http: &Client, req: &FeedRequest) -> Result<ProfilePage, VideoError> {
        if req.username.trim().is_empty() {
            return Err(VideoError::InvalidRequest("username must not be empty"));
        }
        let base = self.config.endpoint_base()?;
        let url = self.list_url(base, req)?;

        let log = telemetry::video();
        let request_span = log.span_kv(&VideoPhase::Request, [
            ("username", req.username.clone()),
            ("next_marker", req.cursor.clone()),
        ]);
        let body = fetch_list(http, url).instrument(request_span).await?;

        let profile = {
            let _s = log.span(&VideoPhase::Validate).entered();
            let envelope = transform::parse_envelope(&body)?;
            if envelope.code != 0 {
                log.upstream_failure(envelope.code, &envelope.msg, &envelope.data);
            }
            transform::into_profile(envelope)?
        };

        let _s = log.span(&VideoPhase::Transform).entered();
        let page = transform::build_page(base, &req.username, &profile)?;
        let skipped = profile.object.len() - page.feed.items.len();
        log.feed_summary(&page.feed.title, page.feed.items.len(), skipped);
        Ok(page)
    }

    fn list_url(&self, base: &str, req: &FeedRequest) -> Result<Url, VideoError> {
        let token = self.config.resolve_token()?;
        Url::parse_with_params(
            &format!("{base}/api/media/list"),
            [
                ("username", req.username.as_str()),
                ("next_marker", req.cursor.as_str()),
                ("token", token),
            ],
        )
        .map_err(|e| VideoError::Config(format!("cannot build listing url: {e}")))
    }
}

// Non-2xx statuses surface as transport errors, same as connection failures.
async fn fetch_list(http: &Client, url: Url) -> Result<Bytes, VideoError> {
    let bytes = http.get(url).send().await?.error_for_status()?.bytes().await?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn adapter_for(server: &Server) -> ProfileVideoAdapter {
        ProfileVideoAdapter::new(
            WechatConfig::default()
                .with_base_url(server.url())
                .with_token("t0ken"),
        )
    }

    fn listing_body() -> String {
        json!({
            "code": 0,
            "msg": "ok",
            "data": {
                "contact": { "nickname": "Alice", "headUrl": "http://x/a.jpg" },
                "object": [
                    {
                        "id": "1",
                        "objectNonceId": "nid1_x",
                        "createtime": 1700000000,
                        "objectDesc": {
                            "description": "hi",
                            "media": [{ "mediaType": 2, "coverUrl": "http://x/c.jpg" }]
                        }
                    },
                    {
                        "id": "2",
                        "objectNonceId": "nid2_x",
                        "createtime": 1700000100,
                        "objectDesc": {
                            "description": "live replay",
                            "media": [{ "mediaType": 9, "coverUrl": "http://x/live.jpg" }]
                        }
                    }
                ],
                "continueFlag": 1,
                "lastBuffer": "page-2"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn fetches_listing_with_expected_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "v2_abc@finder".into()),
                Matcher::UrlEncoded("next_marker".into(), "".into()),
                Matcher::UrlEncoded("token".into(), "t0ken".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(listing_body())
            .expect(1)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let feed = adapter
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("v2_abc@finder"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(feed.title, "Alice 的视频号");
        assert_eq!(feed.link, format!("{}/author/?username=v2_abc%40finder", server.url()));
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].guid, "1");
        assert_eq!(feed.items[0].pub_date, "Tue, 14 Nov 2023 22:13:20 GMT");
        assert_eq!(
            feed.items[0].link,
            format!("{}/player/?oid=1&nid=nid1&embed=1", server.url())
        );
    }

    #[tokio::test]
    async fn cursor_is_forwarded_and_next_marker_surfaced() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::UrlEncoded("next_marker".into(), "page-1".into()))
            .with_status(200)
            .with_body(listing_body())
            .create_async()
            .await;

        let page = adapter_for(&server)
            .fetch_profile_page(&Client::new(), &FeedRequest::new("alice").with_cursor("page-1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.next_marker.as_deref(), Some("page-2"));
    }

    #[tokio::test]
    async fn upstream_error_code_is_surfaced() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code": 1001, "msg": "token invalid", "data": {"BaseResponse": {"Ret": -1}}}"#)
            .create_async()
            .await;

        let err = adapter_for(&server)
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("alice"))
            .await
            .unwrap_err();

        match err {
            VideoError::Upstream { code, msg } => {
                assert_eq!(code, 1001);
                assert_eq!(msg, "token invalid");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn upstream_failure_payload_is_logged_before_returning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code": 1001, "msg": "token invalid", "data": {"reason": "expired-token"}}"#)
            .create_async()
            .await;

        let err = adapter_for(&server)
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::Upstream { code: 1001, .. }));

        let out = logs.contents();
        let line = out
            .lines()
            .find(|l| l.contains("upstream returned error"))
            .unwrap_or_else(|| panic!("no upstream error line in: {out}"));
        assert!(line.contains("ERROR"));
        assert!(line.contains("code=1001"));
        assert!(line.contains("msg=token invalid"));
        assert!(line.contains("expired-token"));
    }

    #[tokio::test]
    async fn http_failure_status_is_transport_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = adapter_for(&server)
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::Transport(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = adapter_for(&server)
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn author_without_videos_yields_empty_feed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/media/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code": 0, "data": {"contact": {"nickname": "Bob", "headUrl": "h"}, "object": null}}"#)
            .create_async()
            .await;

        let page = adapter_for(&server)
            .fetch_profile_page(&Client::new(), &FeedRequest::new("bob"))
            .await
            .unwrap();
        assert!(page.feed.items.is_empty());
        assert_eq!(page.feed.description, "Bob 的视频号主页");
        assert!(page.next_marker.is_none());
    }

    #[tokio::test]
    async fn rejects_bad_input_before_any_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let adapter = adapter_for(&server);
        let err = adapter
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::InvalidRequest(_)));

        let no_token = ProfileVideoAdapter::new(WechatConfig::default().with_base_url(server.url()));
        let err = no_token
            .fetch_profile_videos(&Client::new(), &FeedRequest::new("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::Config(_)));

        mock.assert_async().await;
    }
}
