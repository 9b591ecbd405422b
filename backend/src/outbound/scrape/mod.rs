//! HTML image-candidate extraction over the page fetcher.
//!
//! This adapter owns document parsing only: it walks the fetched DOM for
//! `<img>` elements (including common lazy-loading attributes and `srcset`)
//! and inline `background-image` styles, and hands raw candidates to the
//! domain collector for filtering, normalisation, and deduplication.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::image_scrape::{
    CandidateCollector, FilterMode, RawCandidate, background_image_url, widest_srcset_entry,
};
use crate::domain::ports::{ImageCandidateSource, PageSource, PageSourceError};

/// Source attributes tried on each `<img>`, direct first, then the
/// lazy-loading conventions.
const IMG_URL_ATTRIBUTES: [&str; 4] = ["src", "data-src", "data-large-src", "data-medium-src"];

/// Candidate extractor parsing fetched documents with `scraper`.
pub struct HtmlCandidateExtractor {
    pages: Arc<dyn PageSource>,
    img_selector: Selector,
    styled_selector: Selector,
}

impl HtmlCandidateExtractor {
    /// Build the extractor over a page fetcher.
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        // Both selectors are literals; parsing them cannot fail.
        let img_selector = Selector::parse("img").expect("static selector");
        let styled_selector = Selector::parse("[style]").expect("static selector");
        Self {
            pages,
            img_selector,
            styled_selector,
        }
    }

    fn collect_from_document(&self, document: &Html, collector: &mut CandidateCollector) {
        for element in document.select(&self.img_selector) {
            for candidate in img_candidates(element) {
                collector.offer(&candidate);
            }
        }
        for element in document.select(&self.styled_selector) {
            if let Some(candidate) = style_candidate(element) {
                collector.offer(&candidate);
            }
        }
    }
}

/// Raw candidates for one `<img>`: each source attribute plus the widest
/// `srcset` entry, all sharing the element's metadata.
fn img_candidates(element: ElementRef<'_>) -> Vec<RawCandidate> {
    let alt = element.value().attr("alt").map(str::to_owned);
    let class = element.value().attr("class").map(str::to_owned);
    let parent_class = element
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|parent| parent.value().attr("class"))
        .map(str::to_owned);
    let width = dimension(element, "width");
    let height = dimension(element, "height");

    let with_metadata = |url: String| RawCandidate {
        url,
        alt: alt.clone(),
        class: class.clone(),
        parent_class: parent_class.clone(),
        width,
        height,
    };

    let mut candidates = Vec::new();
    for attribute in IMG_URL_ATTRIBUTES {
        if let Some(value) = element.value().attr(attribute) {
            candidates.push(with_metadata(value.to_owned()));
        }
    }
    for attribute in ["srcset", "data-srcset"] {
        if let Some(widest) = element
            .value()
            .attr(attribute)
            .and_then(|srcset| widest_srcset_entry(srcset))
        {
            candidates.push(with_metadata(widest));
        }
    }
    candidates
}

/// Declared pixel dimension from an attribute such as `width="480"`;
/// non-numeric values (percentages, `auto`) are ignored.
fn dimension(element: ElementRef<'_>, attribute: &str) -> Option<u32> {
    element
        .value()
        .attr(attribute)
        .and_then(|value| value.trim().parse().ok())
}

/// Raw candidate from an inline `background-image` style, when present.
fn style_candidate(element: ElementRef<'_>) -> Option<RawCandidate> {
    let style = element.value().attr("style")?;
    let url = background_image_url(style)?;
    Some(RawCandidate {
        url: url.to_owned(),
        class: element.value().attr("class").map(str::to_owned),
        ..RawCandidate::default()
    })
}

#[async_trait]
impl ImageCandidateSource for HtmlCandidateExtractor {
    async fn fetch_candidates(
        &self,
        page_url: &Url,
        mode: FilterMode,
    ) -> Result<Vec<Url>, PageSourceError> {
        let fetched = self.pages.fetch_page(page_url).await?;
        let document = Html::parse_document(&fetched.body);
        // Relative URLs resolve against where the page ended up, not where
        // the chain started.
        let mut collector = CandidateCollector::new(fetched.final_url, mode);
        self.collect_from_document(&document, &mut collector);
        let candidates = collector.into_candidates();
        tracing::debug!(page = %page_url, count = candidates.len(), "extracted image candidates");
        Ok(candidates)
    }
}
