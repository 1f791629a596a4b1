//! Host-based dispatch to the per-marketplace extractors.

/// Which extraction chain handles a given URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Alibaba/1688 and any unrecognized host: meta tags, structured data,
    /// and visible text.
    Generic,
    Lazada,
    Shopee,
}

/// Match the URL host against the fixed priority table, case-insensitively.
///
/// Pure and synchronous; performs no I/O. Unparseable URLs fall back to a
/// substring match over the whole string so routing never fails — URL
/// validation proper happens before any fetch.
#[must_use]
pub fn route(url: &str) -> ExtractorKind {
    let host = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
        .to_lowercase();

    if host.contains("alibaba") || host.contains("1688") {
        ExtractorKind::Generic
    } else if host.contains("shopee") {
        ExtractorKind::Shopee
    } else if host.contains("lazada") {
        ExtractorKind::Lazada
    } else {
        ExtractorKind::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alibaba_routes_to_generic() {
        assert_eq!(
            route("https://www.alibaba.com/product/123"),
            ExtractorKind::Generic
        );
    }

    #[test]
    fn sixteen_eighty_eight_routes_to_generic() {
        assert_eq!(
            route("https://detail.1688.com/offer/123.html"),
            ExtractorKind::Generic
        );
    }

    #[test]
    fn shopee_routes_to_shopee() {
        assert_eq!(
            route("https://shopee.co.th/product/1/2"),
            ExtractorKind::Shopee
        );
        assert_eq!(
            route("https://shopee.co.th/some-title-i.99.100"),
            ExtractorKind::Shopee
        );
    }

    #[test]
    fn lazada_routes_to_lazada() {
        assert_eq!(
            route("https://www.lazada.co.th/products/widget-i123.html"),
            ExtractorKind::Lazada
        );
    }

    #[test]
    fn unknown_host_falls_back_to_generic() {
        assert_eq!(route("https://example.com/x"), ExtractorKind::Generic);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            route("https://WWW.LAZADA.CO.TH/products/x.html"),
            ExtractorKind::Lazada
        );
    }
}
