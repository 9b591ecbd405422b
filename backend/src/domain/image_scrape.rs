//! Image candidate filtering and normalisation rules.
//!
//! The HTML walking itself lives in the outbound scrape adapter; this module
//! owns the pure rules: which candidate URLs survive, and how surviving URLs
//! are normalised. The keyword blocklist is a best-effort classifier for
//! page furniture (avatars, logos, social icons), not a correctness
//! guarantee.

use std::collections::HashSet;

use url::Url;

/// File extensions never worth offering as a product photo.
pub const REJECTED_EXTENSIONS: [&str; 3] = [".svg", ".gif", ".ico"];

/// Substrings that mark a candidate as page furniture in strict mode.
pub const BLOCKLIST_KEYWORDS: [&str; 11] = [
    "avatar", "logo", "icon", "social", "profile", "banner", "header", "footer", "thumb", "small",
    "tiny",
];

/// Declared dimensions below this are rejected in strict mode.
pub const MIN_DECLARED_DIMENSION: u32 = 200;

/// How aggressively candidates are filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Reject only by file extension.
    #[default]
    Extension,
    /// Additionally reject by keyword blocklist and declared size.
    Strict,
}

/// One candidate lifted from the page, before filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    /// The URL exactly as written in the document.
    pub url: String,
    /// `alt` text of the image element, when present.
    pub alt: Option<String>,
    /// `class` of the image element, when present.
    pub class: Option<String>,
    /// `class` of the parent element, when present.
    pub parent_class: Option<String>,
    /// Declared width in pixels, when parseable.
    pub width: Option<u32>,
    /// Declared height in pixels, when parseable.
    pub height: Option<u32>,
}

impl RawCandidate {
    /// Candidate carrying only a URL.
    pub fn bare(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Resolve a raw candidate URL against the page and strip query/fragment.
///
/// Protocol-relative URLs are pinned to `https`. Returns `None` for values
/// that cannot be parsed; a malformed candidate is skipped, never fatal.
pub fn normalize_candidate(page: &Url, raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut resolved = if let Some(rest) = trimmed.strip_prefix("//") {
        Url::parse(&format!("https://{rest}")).ok()?
    } else {
        page.join(trimmed).ok()?
    };
    resolved.set_query(None);
    resolved.set_fragment(None);
    Some(resolved)
}

/// True when the URL path ends in a rejected extension.
pub fn has_rejected_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    REJECTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// True when any inspected attribute carries a blocklisted keyword.
pub fn matches_blocklist(candidate: &RawCandidate) -> bool {
    let fields = [
        Some(candidate.url.as_str()),
        candidate.alt.as_deref(),
        candidate.class.as_deref(),
        candidate.parent_class.as_deref(),
    ];
    fields.into_iter().flatten().any(|field| {
        let lowered = field.to_ascii_lowercase();
        BLOCKLIST_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
    })
}

/// True when a declared dimension falls below the strict-mode minimum.
pub fn below_minimum_size(candidate: &RawCandidate) -> bool {
    [candidate.width, candidate.height]
        .into_iter()
        .flatten()
        .any(|dimension| dimension < MIN_DECLARED_DIMENSION)
}

/// Pick the widest entry of a `srcset` attribute value.
///
/// Entries without a descriptor rank lowest; width (`w`) and density (`x`)
/// descriptors are compared by their numeric value within their own unit, a
/// simplification that holds for well-formed srcsets which never mix units.
pub fn widest_srcset_entry(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?;
            let weight = parts
                .next()
                .and_then(|descriptor| {
                    descriptor
                        .strip_suffix('w')
                        .or_else(|| descriptor.strip_suffix('x'))
                        .and_then(|value| value.parse::<f64>().ok())
                })
                .unwrap_or(0.0);
            Some((url.to_owned(), weight))
        })
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(url, _)| url)
}

/// Extract the URL from an inline `background-image: url(...)` declaration.
pub fn background_image_url(style: &str) -> Option<&str> {
    let lowered = style.to_ascii_lowercase();
    let property = lowered.find("background-image").or_else(|| lowered.find("background"))?;
    let open = lowered.get(property..)?.find("url(")? + property + "url(".len();
    let close = lowered.get(open..)?.find(')')? + open;
    let raw = style.get(open..close)?.trim();
    Some(raw.trim_matches(|ch| ch == '"' || ch == '\''))
}

/// Accumulates surviving candidates, deduplicated in first-seen order.
#[derive(Debug)]
pub struct CandidateCollector {
    page: Url,
    mode: FilterMode,
    seen: HashSet<String>,
    results: Vec<Url>,
}

impl CandidateCollector {
    /// Start collecting for one page.
    pub fn new(page: Url, mode: FilterMode) -> Self {
        Self {
            page,
            mode,
            seen: HashSet::new(),
            results: Vec::new(),
        }
    }

    /// Offer one raw candidate; silently drops filtered or malformed URLs.
    pub fn offer(&mut self, candidate: &RawCandidate) {
        let Some(normalized) = normalize_candidate(&self.page, &candidate.url) else {
            return;
        };
        if has_rejected_extension(&normalized) {
            return;
        }
        if self.mode == FilterMode::Strict
            && (matches_blocklist(candidate) || below_minimum_size(candidate))
        {
            return;
        }
        if self.seen.insert(normalized.as_str().to_owned()) {
            self.results.push(normalized);
        }
    }

    /// Finish, yielding unique candidates in first-seen order.
    pub fn into_candidates(self) -> Vec<Url> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page() -> Url {
        Url::parse("https://shop.example.com/catalogue/boots").expect("valid page url")
    }

    #[rstest]
    #[case("//cdn.example.com/a.jpg", "https://cdn.example.com/a.jpg")]
    #[case("/img/b.png", "https://shop.example.com/img/b.png")]
    #[case("c.webp", "https://shop.example.com/catalogue/c.webp")]
    #[case(
        "https://cdn.example.com/d.jpg?w=1200#zoomed",
        "https://cdn.example.com/d.jpg"
    )]
    fn normalisation_resolves_and_strips(#[case] raw: &str, #[case] expected: &str) {
        let normalized = normalize_candidate(&page(), raw).expect("normalisable");
        assert_eq!(normalized.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("https://exa mple.com/x.jpg")]
    fn malformed_candidates_are_skipped(#[case] raw: &str) {
        assert!(normalize_candidate(&page(), raw).is_none());
    }

    #[rstest]
    #[case("https://cdn.example.com/pic.SVG", true)]
    #[case("https://cdn.example.com/anim.gif", true)]
    #[case("https://cdn.example.com/favicon.ico", true)]
    #[case("https://cdn.example.com/photo.jpg", false)]
    fn extension_filter(#[case] raw: &str, #[case] rejected: bool) {
        let url = Url::parse(raw).expect("valid url");
        assert_eq!(has_rejected_extension(&url), rejected);
    }

    #[rstest]
    #[case::in_src(RawCandidate::bare("https://cdn.example.com/user-avatar.jpg"), true)]
    #[case::in_alt(
        RawCandidate { alt: Some("Site Logo".into()), ..RawCandidate::bare("https://cdn.example.com/x.jpg") },
        true
    )]
    #[case::in_class(
        RawCandidate { class: Some("social-share".into()), ..RawCandidate::bare("https://cdn.example.com/x.jpg") },
        true
    )]
    #[case::in_parent(
        RawCandidate { parent_class: Some("page-footer".into()), ..RawCandidate::bare("https://cdn.example.com/x.jpg") },
        true
    )]
    #[case::clean(RawCandidate::bare("https://cdn.example.com/boots-front.jpg"), false)]
    fn blocklist_covers_all_inspected_fields(#[case] candidate: RawCandidate, #[case] hit: bool) {
        assert_eq!(matches_blocklist(&candidate), hit);
    }

    #[rstest]
    #[case(Some(199), None, true)]
    #[case(None, Some(120), true)]
    #[case(Some(200), Some(200), false)]
    #[case(None, None, false)]
    fn size_filter_uses_declared_dimensions(
        #[case] width: Option<u32>,
        #[case] height: Option<u32>,
        #[case] rejected: bool,
    ) {
        let candidate = RawCandidate {
            width,
            height,
            ..RawCandidate::bare("https://cdn.example.com/x.jpg")
        };
        assert_eq!(below_minimum_size(&candidate), rejected);
    }

    #[rstest]
    #[case("small.jpg 320w, large.jpg 1280w, mid.jpg 640w", "large.jpg")]
    #[case("one.jpg 1x, two.jpg 2x", "two.jpg")]
    #[case("only.jpg", "only.jpg")]
    fn widest_srcset_entry_wins(#[case] srcset: &str, #[case] expected: &str) {
        assert_eq!(widest_srcset_entry(srcset).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("background-image:url(https://cdn.example.com/hero.jpg)")]
    #[case("background-image: url('https://cdn.example.com/hero.jpg');")]
    #[case("color: red; background-image:url(\"https://cdn.example.com/hero.jpg\")")]
    fn background_image_is_extracted(#[case] style: &str) {
        assert_eq!(
            background_image_url(style),
            Some("https://cdn.example.com/hero.jpg")
        );
    }

    #[rstest]
    fn unrelated_styles_yield_nothing() {
        assert!(background_image_url("color: red").is_none());
    }

    #[rstest]
    fn collector_dedupes_preserving_first_seen_order() {
        let mut collector = CandidateCollector::new(page(), FilterMode::Extension);
        collector.offer(&RawCandidate::bare("/img/a.jpg?x=1"));
        collector.offer(&RawCandidate::bare("/img/b.jpg"));
        collector.offer(&RawCandidate::bare("https://shop.example.com/img/a.jpg"));
        let urls: Vec<String> = collector
            .into_candidates()
            .into_iter()
            .map(Into::into)
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://shop.example.com/img/a.jpg".to_owned(),
                "https://shop.example.com/img/b.jpg".to_owned(),
            ]
        );
    }

    #[rstest]
    fn strict_mode_applies_blocklist_and_size() {
        let mut collector = CandidateCollector::new(page(), FilterMode::Strict);
        collector.offer(&RawCandidate::bare("/img/banner-wide.jpg"));
        collector.offer(&RawCandidate {
            width: Some(64),
            ..RawCandidate::bare("/img/closeup.jpg")
        });
        collector.offer(&RawCandidate::bare("/img/product.jpg"));
        let urls: Vec<String> = collector.into_candidates().into_iter().map(Into::into).collect();
        assert_eq!(urls, vec!["https://shop.example.com/img/product.jpg".to_owned()]);
    }

    #[rstest]
    fn extension_rejections_hold_in_both_modes() {
        for mode in [FilterMode::Extension, FilterMode::Strict] {
            let mut collector = CandidateCollector::new(page(), mode);
            collector.offer(&RawCandidate::bare("/img/vector.svg"));
            collector.offer(&RawCandidate::bare("/img/anim.gif"));
            collector.offer(&RawCandidate::bare("/favicon.ico"));
            assert!(collector.into_candidates().is_empty());
        }
    }
}
