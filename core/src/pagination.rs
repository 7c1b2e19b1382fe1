//! Cursor pagination over Canvas `Link` headers.
//!
//! Canvas announces further pages with an RFC 8288 style header:
//!
//! ```text
//! Link: <https://canvas/api/v1/courses?page=2>; rel="next", <https://canvas/api/v1/courses?page=1>; rel="first"
//! ```
//!
//! Only the `next` relation is consumed.

use std::collections::HashSet;

use crate::client::RestClient;
use crate::config::Timeouts;
use crate::error::ApiError;
use crate::http::Response;
use crate::oauth::OauthToken;

/// Extract the `rel="next"` target from one or more `Link` header values.
///
/// Returns `None` when no header was sent, no segment is `next`, or the
/// `next` segment is not of the form `<url>; params`.
pub fn parse_next_link<'a, I>(header_values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    header_values
        .into_iter()
        .flat_map(|value| value.split(','))
        .find(|segment| is_next(segment))
        .and_then(link_target)
}

fn is_next(segment: &str) -> bool {
    segment
        .split(';')
        .skip(1)
        .any(|param| param.trim() == r#"rel="next""#)
}

fn link_target(segment: &str) -> Option<String> {
    let (target, _) = segment.split_once(';')?;
    let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
    if url.is_empty() {
        tracing::debug!(segment, "ignoring empty pagination link");
        return None;
    }
    Some(url.to_string())
}

/// Iterator over every page of a list endpoint.
///
/// Issues a GET for the first URL, then follows `next_link` until the
/// server stops sending one. Iteration ends after the first error and
/// never fetches the same URL twice.
pub struct PageIterator<'a, C: RestClient + ?Sized> {
    client: &'a C,
    token: &'a dyn OauthToken,
    timeouts: Timeouts,
    next: Option<String>,
    visited: HashSet<String>,
}

impl<'a, C: RestClient + ?Sized> PageIterator<'a, C> {
    pub fn new(client: &'a C, token: &'a dyn OauthToken, url: &str, timeouts: Timeouts) -> Self {
        Self {
            client,
            token,
            timeouts,
            next: Some(url.to_string()),
            visited: HashSet::new(),
        }
    }
}

impl<C: RestClient + ?Sized> Iterator for PageIterator<'_, C> {
    type Item = Result<Response, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next.take()?;
        if !self.visited.insert(url.clone()) {
            tracing::warn!(%url, "pagination link points at a page already fetched");
            return None;
        }
        match self.client.api_get(self.token, &url, self.timeouts) {
            Ok(response) => {
                self.next = response.next_link().map(str::to_string);
                Some(Ok(response))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Fetch the first page at `url` and every page after it.
pub fn fetch_all_pages<C: RestClient + ?Sized>(
    client: &C,
    token: &dyn OauthToken,
    url: &str,
    timeouts: Timeouts,
) -> Result<Vec<Response>, ApiError> {
    PageIterator::new(client, token, url, timeouts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedClient;
    use crate::oauth::NonRefreshableOauthToken;

    #[test]
    fn next_link_is_extracted_and_prev_ignored() {
        let header = r#"<https://x/api?page=2>; rel="next", <https://x/api?page=1>; rel="prev""#;
        assert_eq!(
            parse_next_link([header]),
            Some("https://x/api?page=2".to_string())
        );
    }

    #[test]
    fn next_segment_need_not_come_first() {
        let header = r#"<https://x/api?page=1>; rel="current",<https://x/api?page=3>; rel="next",<https://x/api?page=9>; rel="last""#;
        assert_eq!(
            parse_next_link([header]),
            Some("https://x/api?page=3".to_string())
        );
    }

    #[test]
    fn missing_header_means_no_pagination() {
        assert_eq!(parse_next_link(std::iter::empty::<&str>()), None);
    }

    #[test]
    fn header_without_next_yields_none() {
        let header = r#"<https://x/api?page=1>; rel="first", <https://x/api?page=4>; rel="last""#;
        assert_eq!(parse_next_link([header]), None);
    }

    #[test]
    fn split_headers_are_searched_together() {
        let values = [
            r#"<https://x/api?page=1>; rel="current""#,
            r#"<https://x/api?page=2>; rel="next""#,
        ];
        assert_eq!(
            parse_next_link(values),
            Some("https://x/api?page=2".to_string())
        );
    }

    #[test]
    fn malformed_next_segment_is_ignored() {
        assert_eq!(parse_next_link([r#"https://x/api?page=2; rel="next""#]), None);
        assert_eq!(parse_next_link([r#"<>; rel="next""#]), None);
        assert_eq!(parse_next_link([r#"<https://x/api?page=2> rel="next""#]), None);
    }

    #[test]
    fn iterator_follows_next_links_until_absent() {
        let client = ScriptedClient::default()
            .page("https://x/items", "[1]", Some("https://x/items?page=2"))
            .page("https://x/items?page=2", "[2]", Some("https://x/items?page=3"))
            .page("https://x/items?page=3", "[3]", None);
        let token = NonRefreshableOauthToken::new("t");
        let pages = fetch_all_pages(&client, &token, "https://x/items", Timeouts::default()).unwrap();
        let bodies: Vec<&str> = pages.iter().map(Response::body).collect();
        assert_eq!(bodies, ["[1]", "[2]", "[3]"]);
    }

    #[test]
    fn iterator_stops_on_a_repeated_link() {
        let client = ScriptedClient::default()
            .page("https://x/items", "[1]", Some("https://x/items?page=2"))
            .page("https://x/items?page=2", "[2]", Some("https://x/items"));
        let token = NonRefreshableOauthToken::new("t");
        let pages = fetch_all_pages(&client, &token, "https://x/items", Timeouts::default()).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn iterator_surfaces_errors_and_stops() {
        let client = ScriptedClient::default()
            .page("https://x/items", "[1]", Some("https://x/items?page=2"));
        let token = NonRefreshableOauthToken::new("t");
        let mut pages = PageIterator::new(&client, &token, "https://x/items", Timeouts::default());
        assert!(pages.next().unwrap().is_ok());
        assert!(matches!(pages.next(), Some(Err(ApiError::Unauthorized))));
        assert!(pages.next().is_none());
    }
}
