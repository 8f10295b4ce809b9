//! DOM queries over a rendered HTML snapshot

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::error::{ExtractError, Result};

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Collect `src` values from every element matching `selector` and from all
/// of their descendants.
///
/// Values are trimmed, resolved against `base` when given, and returned in
/// document order with duplicates removed.
pub fn collect_sources(html: &str, selector: &str, base: Option<&Url>) -> Result<Vec<String>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for matched in document.select(&selector) {
        for element in matched.descendants().filter_map(ElementRef::wrap) {
            let Some(raw) = element.value().attr("src") else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let resolved = resolve(raw, base);
            if seen.insert(resolved.clone()) {
                sources.push(resolved);
            }
        }
    }

    Ok(sources)
}

fn resolve(raw: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => base
            .join(raw)
            .map(String::from)
            .unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <article class="post">
            <img src="https://cdn.example.com/a.jpg">
            <div class="carousel">
              <img src="/media/b.jpg">
              <video src="clip.mp4"><source src="clip-hd.mp4"></video>
            </div>
          </article>
          <article class="post">
            <img src="https://cdn.example.com/a.jpg">
            <img src="   ">
          </article>
          <aside><img src="https://ads.example.com/banner.png"></aside>
        </body></html>
    "#;

    #[test]
    fn test_collects_nested_sources_in_order() {
        let base = Url::parse("https://site.example.com/p/123/").unwrap();
        let sources = collect_sources(PAGE, "article.post", Some(&base)).unwrap();

        assert_eq!(
            sources,
            vec![
                "https://cdn.example.com/a.jpg",
                "https://site.example.com/media/b.jpg",
                "https://site.example.com/p/123/clip.mp4",
                "https://site.example.com/p/123/clip-hd.mp4",
            ]
        );
    }

    #[test]
    fn test_matched_element_own_src_counts() {
        let sources = collect_sources(PAGE, "aside img", None).unwrap();
        assert_eq!(sources, vec!["https://ads.example.com/banner.png"]);
    }

    #[test]
    fn test_overlapping_matches_deduplicated() {
        // Both the article and its images match
        let sources = collect_sources(PAGE, "article.post, article.post img", None).unwrap();
        assert_eq!(sources.iter().filter(|s| s.ends_with("a.jpg")).count(), 1);
        assert!(sources.contains(&"/media/b.jpg".to_string()));
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert!(collect_sources(PAGE, "section.gallery", None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let err = collect_sources(PAGE, "div[[", None).unwrap_err();
        match err {
            ExtractError::InvalidSelector { selector, .. } => assert_eq!(selector, "div[["),
            other => panic!("Expected InvalidSelector, got {:?}", other),
        }
    }
}
