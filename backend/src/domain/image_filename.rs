//! Bucket filename construction for stored shoe images.
//!
//! Filenames are slugs of lowercase ASCII letters, digits, and hyphens,
//! timestamped so re-uploads for the same shoe never collide.

use chrono::{DateTime, Utc};

/// Reduce arbitrary text to a slug fragment; empty input yields `unknown`.
fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "unknown".to_owned()
    } else {
        slug
    }
}

/// Guess a file extension from a content type, defaulting to `jpg`.
fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type.map(|value| value.split(';').next().unwrap_or(value).trim()) {
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        Some("image/avif") => "avif",
        _ => "jpg",
    }
}

/// Build `{brand}-{label}-{timestamp}.{ext}` from free-form inputs.
pub fn image_filename(
    brand: Option<&str>,
    label: &str,
    content_type: Option<&str>,
    at: DateTime<Utc>,
) -> String {
    let brand = slugify(brand.unwrap_or("unbranded"));
    let label = slugify(label);
    let stamp = at.format("%Y%m%d%H%M%S");
    let ext = extension_for(content_type);
    format!("{brand}-{label}-{stamp}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 30, 5).single().expect("valid timestamp")
    }

    #[rstest]
    #[case(Some("John Fluevog"), "Adrian Lace-Up", "john-fluevog-adrian-lace-up-20260820123005.jpg")]
    #[case(None, "Strappy Sandal", "unbranded-strappy-sandal-20260820123005.jpg")]
    #[case(Some("  !!  "), "???", "unknown-unknown-20260820123005.jpg")]
    fn builds_slugged_filenames(
        #[case] brand: Option<&str>,
        #[case] label: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(image_filename(brand, label, None, at()), expected);
    }

    #[rstest]
    #[case(Some("image/png"), "png")]
    #[case(Some("image/webp; charset=binary"), "webp")]
    #[case(Some("text/html"), "jpg")]
    #[case(None, "jpg")]
    fn extension_follows_content_type(#[case] content_type: Option<&str>, #[case] ext: &str) {
        let name = image_filename(Some("b"), "l", content_type, at());
        assert!(name.ends_with(&format!(".{ext}")), "{name}");
    }
}
