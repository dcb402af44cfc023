// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Text search across the top-level document and every accessible frame

use std::collections::HashSet;

use tracing::debug;

use crate::browser::{BrowserSession, By, FrameDriver};
use crate::dom::xpath::FALLBACK_LOCATOR;
use crate::error::{Error, Result};

use super::events::EventSink;
use super::matcher::TextMatcher;
use super::preview::truncate_chars;
use super::record::{display_path, FrameRecord, MatchRecord, SearchResults, ROOT_LABEL};
use super::ScanOptions;

/// Run every strategy against the current context
///
/// Matches are deduplicated by element locator within this call only.
/// Failing strategies and elements are skipped; only fatal errors are
/// returned.
pub async fn search_context<D: FrameDriver>(
    driver: &mut D,
    matchers: &[Box<dyn TextMatcher>],
    query: &str,
    location_path: &[String],
    options: &ScanOptions,
) -> Result<Vec<MatchRecord>> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for matcher in matchers {
        let elements = match driver.find_matching(matcher.as_ref(), query).await {
            Ok(elements) => elements,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!(strategy = matcher.label(), error = %e, "strategy skipped");
                continue;
            }
        };

        for element in &elements {
            let (tag, text) = match describe_match(driver, element).await {
                Ok(details) => details,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(strategy = matcher.label(), error = %e, "element skipped");
                    continue;
                }
            };
            let locator = match driver.locator(element).await {
                Ok(locator) => locator,
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => FALLBACK_LOCATOR.to_string(),
            };

            if !seen.insert(locator.clone()) {
                continue;
            }
            found.push(MatchRecord {
                location_path: location_path.to_vec(),
                strategy: matcher.label().to_string(),
                xpath_used: matcher.xpath(query),
                element_locator: locator,
                tag,
                text_snippet: truncate_chars(&text, options.snippet_chars),
                query: query.to_string(),
            });
        }
    }

    Ok(found)
}

async fn describe_match<D: FrameDriver>(
    driver: &mut D,
    element: &D::Element,
) -> Result<(String, String)> {
    let tag = driver.tag_name(element).await?;
    let text = driver.visible_text(element).await?;
    Ok((tag, text))
}

/// How to find a recorded frame again
pub fn lookup_for(record: &FrameRecord) -> By {
    if !record.id.is_empty() {
        By::Id(record.id.clone())
    } else if !record.name.is_empty() {
        By::Name(record.name.clone())
    } else {
        By::Locator(record.locator.clone())
    }
}

/// Re-enter a recorded frame from the top-level document
///
/// Each ancestor is resolved again, outermost first.
pub async fn navigate_to<D: FrameDriver>(
    session: &mut BrowserSession<D>,
    records: &[FrameRecord],
    slot: usize,
) -> Result<()> {
    let mut chain = Vec::new();
    let mut current = Some(slot);
    while let Some(i) = current {
        let record = records
            .get(i)
            .ok_or_else(|| Error::frame(format!("no frame record at {}", i)))?;
        chain.push(record);
        current = record.parent;
    }

    session.return_to_top().await;
    for record in chain.into_iter().rev() {
        let by = lookup_for(record);
        let element = session.driver().find_element(&by).await.map_err(|e| {
            if e.is_fatal() {
                e
            } else {
                Error::frame_with_label(format!("Cannot navigate to iframe: {}", e), record.path_display())
            }
        })?;
        session.enter_frame(&element).await?;
    }
    Ok(())
}

/// Search the top-level document, then every accessible frame
///
/// Matches are attached to the frame records they were found in.
/// The session is back at the top-level document afterwards.
pub async fn search_everywhere<D: FrameDriver>(
    session: &mut BrowserSession<D>,
    records: &mut [FrameRecord],
    matchers: &[Box<dyn TextMatcher>],
    query: &str,
    options: &ScanOptions,
    events: &EventSink,
) -> Result<SearchResults> {
    let mut results = SearchResults::new(query);

    session.return_to_top().await;
    events.info("Searching in main page...");
    let root = vec![ROOT_LABEL.to_string()];
    let main = match search_context(session.driver(), matchers, query, &root, options).await {
        Ok(main) => main,
        Err(e) => {
            session.return_to_top().await;
            return Err(e);
        }
    };
    results.extend(&main);

    for slot in 0..records.len() {
        if !records[slot].accessible {
            continue;
        }
        let path = records[slot].hierarchy_path.clone();
        events.info(format!("Searching in iframe: {}", display_path(&path)));

        let outcome = match navigate_to(session, records, slot).await {
            Ok(()) => search_context(session.driver(), matchers, query, &path, options).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(matches) => {
                results.extend(&matches);
                records[slot].matches = matches;
            }
            Err(e) if e.is_fatal() => {
                session.return_to_top().await;
                return Err(e);
            }
            Err(e) => {
                events.warn(format!("Error searching in iframe {}: {}", display_path(&path), e));
            }
        }
        session.return_to_top().await;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserConfig, NativeDriver, ScanInput};
    use crate::scanner::matcher::default_matchers;
    use crate::scanner::walker::discover;

    async fn loaded(html: &str) -> BrowserSession<NativeDriver> {
        let config = BrowserConfig::for_testing();
        let mut session = BrowserSession::new(NativeDriver::new(config.clone()).unwrap(), config);
        session.load(&ScanInput::Html(html.into())).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_dedup_within_one_context() {
        let mut session = loaded("<body><p>Hello</p></body>").await;
        let matches = search_context(
            session.driver(),
            &default_matchers(),
            "Hello",
            &[ROOT_LABEL.to_string()],
            &ScanOptions::default(),
        )
        .await
        .unwrap();

        let locators: Vec<_> = matches.iter().map(|m| m.element_locator.as_str()).collect();
        let unique: HashSet<_> = locators.iter().collect();
        assert_eq!(locators.len(), unique.len());

        let p = matches.iter().find(|m| m.tag == "p").unwrap();
        assert_eq!(p.strategy, "Strategy 1");
        assert_eq!(p.element_locator, "/html/body/p[1]");
        assert_eq!(p.xpath_used, "//*[text()='Hello']");
        // html and body only qualify through their descendant text
        assert!(matches
            .iter()
            .filter(|m| m.tag != "p")
            .all(|m| m.strategy == "Strategy 6"));
    }

    #[tokio::test]
    async fn test_attribute_only_match() {
        let mut session = loaded("<body><img alt=\"WMS report\"></body>").await;
        let matches = search_context(
            session.driver(),
            &default_matchers(),
            "WMS",
            &[ROOT_LABEL.to_string()],
            &ScanOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].strategy, "Strategy 5");
        assert_eq!(matches[0].tag, "img");
    }

    #[tokio::test]
    async fn test_snippet_truncated() {
        let long = "x".repeat(150);
        let mut session = loaded(&format!("<body><p>Hello {}</p></body>", long)).await;
        let matches = search_context(
            session.driver(),
            &default_matchers(),
            "Hello",
            &[ROOT_LABEL.to_string()],
            &ScanOptions::default(),
        )
        .await
        .unwrap();
        assert!(matches.iter().all(|m| m.text_snippet.chars().count() <= 100));
    }

    #[tokio::test]
    async fn test_search_reaches_nested_frames() {
        let html = r#"<iframe id="outer" srcdoc="<iframe srcdoc='<p>Needle</p>'></iframe>"></iframe>"#;
        let mut session = loaded(html).await;
        let options = ScanOptions::default();
        let events = EventSink::none();
        let mut records = discover(&mut session, &options, &events).await.unwrap();
        assert_eq!(records.len(), 2);

        let results = search_everywhere(
            &mut session,
            &mut records,
            &default_matchers(),
            "Needle",
            &options,
            &events,
        )
        .await
        .unwrap();

        assert!(records[0].matches.is_empty());
        assert!(!records[1].matches.is_empty());
        assert!(records[1].matches.iter().all(|m| m.location_path == records[1].hierarchy_path));
        assert_eq!(results.total_locations_found, records[1].matches.len());
        assert_eq!(session.driver().depth(), 0);
    }

    #[tokio::test]
    async fn test_repeated_search_is_stable() {
        let html = r#"<iframe name="content" srcdoc="<p>Hello</p><span>Hello again</span>"></iframe>"#;
        let mut session = loaded(html).await;
        let options = ScanOptions::default();
        let events = EventSink::none();
        let mut records = discover(&mut session, &options, &events).await.unwrap();
        let matchers = default_matchers();

        let mut runs = Vec::new();
        for _ in 0..2 {
            navigate_to(&mut session, &records, 0).await.unwrap();
            runs.push(
                search_context(session.driver(), &matchers, "Hello", &records[0].hierarchy_path, &options)
                    .await
                    .unwrap(),
            );
            session.return_to_top().await;
        }
        assert!(!runs[0].is_empty());
        assert_eq!(runs[0], runs[1]);

        let results = search_everywhere(&mut session, &mut records, &matchers, "Hello", &options, &events)
            .await
            .unwrap();
        assert_eq!(results.locations, runs[0]);
    }
}
