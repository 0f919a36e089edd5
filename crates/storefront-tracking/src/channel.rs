//! URL, UTM and referrer parsing for incoming hits

use std::collections::HashMap;

use url::Url;

/// UTM parameters extracted from a URL query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

impl UtmParams {
    pub fn has_any(&self) -> bool {
        self.utm_source.is_some()
            || self.utm_medium.is_some()
            || self.utm_campaign.is_some()
            || self.utm_content.is_some()
            || self.utm_term.is_some()
    }
}

/// Parse UTM parameters from a query string (with or without leading `?`)
///
/// ```
/// use storefront_tracking::channel::parse_utm_params;
///
/// let params = parse_utm_params("utm_source=facebook&utm_campaign=t%E1%BA%BFt");
/// assert_eq!(params.utm_source.as_deref(), Some("facebook"));
/// assert_eq!(params.utm_campaign.as_deref(), Some("tết"));
/// ```
pub fn parse_utm_params(query_string: &str) -> UtmParams {
    let query = query_string.trim_start_matches('?');

    let params: HashMap<String, String> = query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?.to_lowercase();
            if !key.starts_with("utm_") {
                return None;
            }
            let value = parts.next().unwrap_or("").replace('+', " ");
            let decoded = urlencoding::decode(&value).ok()?.trim().to_string();
            if decoded.is_empty() {
                None
            } else {
                Some((key, decoded))
            }
        })
        .collect();

    UtmParams {
        utm_source: params.get("utm_source").cloned(),
        utm_medium: params.get("utm_medium").cloned(),
        utm_campaign: params.get("utm_campaign").cloned(),
        utm_content: params.get("utm_content").cloned(),
        utm_term: params.get("utm_term").cloned(),
    }
}

/// Page location split into the columns stored on a page view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    /// `None` when the tracker sent a path-only URL
    pub host: Option<String>,
    pub path: String,
    pub query: Option<String>,
}

impl PageUrl {
    /// Accepts absolute URLs and site-relative paths (`/cart?step=2`)
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let raw = raw.trim();
        let (url, host_known) = match Url::parse(raw) {
            Ok(url) => (url, true),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://relative.invalid/")?;
                (base.join(raw)?, false)
            }
            Err(e) => return Err(e),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(url::ParseError::RelativeUrlWithoutBase);
        }

        Ok(Self {
            host: if host_known {
                url.host_str().map(|h| h.to_lowercase())
            } else {
                None
            },
            path: url.path().to_string(),
            query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
        })
    }

    pub fn utm(&self) -> UtmParams {
        self.query
            .as_deref()
            .map(parse_utm_params)
            .unwrap_or_default()
    }
}

/// Referrer split into domain, path and query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferrerParts {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
}

/// Split a referrer URL. A referrer on `page_host` is a self-referral: its
/// path is kept but the domain is cleared so internal navigation does not
/// show up as a traffic source. Unparseable referrers yield empty parts.
pub fn parse_referrer(referrer: Option<&str>, page_host: Option<&str>) -> ReferrerParts {
    let Some(raw) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
        return ReferrerParts::default();
    };

    let Ok(url) = Url::parse(raw) else {
        return ReferrerParts::default();
    };

    let domain = url.host_str().map(|h| h.to_lowercase());
    let is_self = match (domain.as_deref(), page_host) {
        (Some(referrer_host), Some(page_host)) => same_site(referrer_host, page_host),
        _ => false,
    };

    ReferrerParts {
        domain: if is_self { None } else { domain },
        path: Some(url.path().to_string()),
        query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
    }
}

fn same_site(a: &str, b: &str) -> bool {
    let strip = |h: &str| h.trim_start_matches("www.").to_lowercase();
    strip(a) == strip(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utm_params_full() {
        let params = parse_utm_params(
            "?utm_source=google&utm_medium=cpc&utm_campaign=spring+sale&utm_content=banner&utm_term=ao%20dai",
        );
        assert_eq!(params.utm_source.as_deref(), Some("google"));
        assert_eq!(params.utm_medium.as_deref(), Some("cpc"));
        assert_eq!(params.utm_campaign.as_deref(), Some("spring sale"));
        assert_eq!(params.utm_content.as_deref(), Some("banner"));
        assert_eq!(params.utm_term.as_deref(), Some("ao dai"));
        assert!(params.has_any());
    }

    #[test]
    fn test_parse_utm_params_drops_empty_and_unrelated() {
        let params = parse_utm_params("utm_source=&page=2&UTM_MEDIUM=email");
        assert_eq!(params.utm_source, None);
        assert_eq!(params.utm_medium.as_deref(), Some("email"));
        assert_eq!(params.utm_campaign, None);
    }

    #[test]
    fn test_parse_utm_params_empty_query() {
        assert!(!parse_utm_params("").has_any());
    }

    #[test]
    fn test_page_url_absolute() {
        let url = PageUrl::parse("https://Shop.Example.com/products/42?color=red&utm_source=zalo")
            .unwrap();
        assert_eq!(url.host.as_deref(), Some("shop.example.com"));
        assert_eq!(url.path, "/products/42");
        assert_eq!(url.query.as_deref(), Some("color=red&utm_source=zalo"));
        assert_eq!(url.utm().utm_source.as_deref(), Some("zalo"));
    }

    #[test]
    fn test_page_url_relative() {
        let url = PageUrl::parse("/cart?step=2").unwrap();
        assert_eq!(url.host, None);
        assert_eq!(url.path, "/cart");
        assert_eq!(url.query.as_deref(), Some("step=2"));
    }

    #[test]
    fn test_page_url_rejects_other_schemes() {
        assert!(PageUrl::parse("javascript:alert(1)").is_err());
        assert!(PageUrl::parse("http://").is_err());
    }

    #[test]
    fn test_parse_referrer_external() {
        let parts = parse_referrer(
            Some("https://www.google.com/search?q=giay+the+thao"),
            Some("shop.example.com"),
        );
        assert_eq!(parts.domain.as_deref(), Some("www.google.com"));
        assert_eq!(parts.path.as_deref(), Some("/search"));
        assert_eq!(parts.query.as_deref(), Some("q=giay+the+thao"));
    }

    #[test]
    fn test_parse_referrer_self_referral_clears_domain() {
        let parts = parse_referrer(
            Some("https://www.shop.example.com/category/shoes"),
            Some("shop.example.com"),
        );
        assert_eq!(parts.domain, None);
        assert_eq!(parts.path.as_deref(), Some("/category/shoes"));
    }

    #[test]
    fn test_parse_referrer_missing_or_invalid() {
        assert_eq!(parse_referrer(None, None), ReferrerParts::default());
        assert_eq!(parse_referrer(Some("  "), None), ReferrerParts::default());
        assert_eq!(parse_referrer(Some("not a url"), None), ReferrerParts::default());
    }
}
