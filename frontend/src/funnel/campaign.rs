use std::fmt;

use serde::Serialize;

/// The campaign-tagged part of a query string, in the order it arrived.
///
/// Only keys starting with the campaign prefix survive; everything else in
/// the incoming query is dropped before the next navigation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CampaignParameters {
    pairs: Vec<(String, String)>,
}

impl CampaignParameters {
    /// Parse `search` (with or without the leading `?`) the way
    /// `URLSearchParams` does: `+` is a space, pairs without `=` have an
    /// empty value, stray `%` stays literal and invalid UTF-8 becomes U+FFFD.
    pub fn from_query(search: &str, prefix: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        let pairs = search
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode_component(key), decode_component(value))
            })
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `path` with the parameters appended, or `path` alone when there are none.
    pub fn append_to(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{self}")
        }
    }
}

impl fmt::Display for CampaignParameters {
    /// `application/x-www-form-urlencoded`, matching `URLSearchParams::toString`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_component(key), encode_component(value))?;
        }
        Ok(())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_prefixed_keys_are_forwarded_in_order() {
        let params = CampaignParameters::from_query("?utm_source=fb&utm_campaign=x&foo=bar", "utm_");
        assert_eq!(params.to_string(), "utm_source=fb&utm_campaign=x");
        assert_eq!(params.append_to("/quiz/1"), "/quiz/1?utm_source=fb&utm_campaign=x");
    }

    #[test]
    fn test_empty_query_leaves_path_alone() {
        let params = CampaignParameters::from_query("", "utm_");
        assert!(params.is_empty());
        assert_eq!(params.append_to("/quiz/1"), "/quiz/1");

        let params = CampaignParameters::from_query("?foo=bar&gclid=1", "utm_");
        assert_eq!(params.append_to("/quiz/1"), "/quiz/1");
    }

    #[test]
    fn test_values_are_decoded_and_reencoded() {
        let params = CampaignParameters::from_query(
            "utm_content=summer+sale&utm_term=caf%C3%A9%26bar&utm_medium",
            "utm_",
        );
        assert_eq!(params.get("utm_content"), Some("summer sale"));
        assert_eq!(params.get("utm_term"), Some("café&bar"));
        assert_eq!(params.get("utm_medium"), Some(""));
        assert_eq!(
            params.to_string(),
            "utm_content=summer+sale&utm_term=caf%C3%A9%26bar&utm_medium="
        );
    }

    #[test]
    fn test_malformed_escapes_are_not_double_encoded() {
        let params = CampaignParameters::from_query("utm_x=%FF&utm_y=50%", "utm_");
        assert_eq!(params.get("utm_x"), Some("\u{FFFD}"));
        assert_eq!(params.get("utm_y"), Some("50%"));
        assert_eq!(params.to_string(), "utm_x=%EF%BF%BD&utm_y=50%25");
    }

    #[test]
    fn test_repeated_keys_are_kept() {
        let params = CampaignParameters::from_query("utm_source=a&utm_source=b", "utm_");
        assert_eq!(params.get("utm_source"), Some("a"));
        assert_eq!(params.to_string(), "utm_source=a&utm_source=b");
    }
}
