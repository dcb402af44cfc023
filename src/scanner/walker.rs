// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Iframe hierarchy walker

use futures::future::BoxFuture;
use tracing::debug;

use crate::browser::{BrowserSession, FrameDriver};
use crate::dom::xpath::FALLBACK_LOCATOR;
use crate::error::Result;

use super::events::EventSink;
use super::preview::{content_preview, truncate_chars};
use super::record::{display_path, FrameRecord, ROOT_LABEL};
use super::ScanOptions;

/// Human-readable label of a frame
pub fn frame_label(id: &str, name: &str, src: &str, index: usize) -> String {
    if !id.is_empty() {
        return format!("id='{}'", id);
    }
    if !name.is_empty() {
        return format!("name='{}'", name);
    }
    if !src.is_empty() {
        let tail = src.rsplit('/').next().unwrap_or(src);
        return format!("src='{}'", truncate_chars(tail, 20));
    }
    format!("iframe_{}", index)
}

struct Walk<'a, D: FrameDriver> {
    session: &'a mut BrowserSession<D>,
    options: &'a ScanOptions,
    events: &'a EventSink,
    inventory: Vec<FrameRecord>,
}

/// Discover every reachable frame below the top-level document
///
/// Records are in discovery order: each frame is followed by its
/// descendants. The session is back at the top-level document afterwards.
pub async fn discover<D: FrameDriver>(
    session: &mut BrowserSession<D>,
    options: &ScanOptions,
    events: &EventSink,
) -> Result<Vec<FrameRecord>> {
    session.return_to_top().await;

    let mut walk = Walk {
        session,
        options,
        events,
        inventory: Vec::new(),
    };
    let outcome = walk.context(vec![ROOT_LABEL.to_string()], None).await;

    walk.session.return_to_top().await;
    outcome.map(|()| walk.inventory)
}

impl<'a, D: FrameDriver + 'a> Walk<'a, D> {
    fn context(&mut self, path: Vec<String>, parent: Option<usize>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let depth = path.len() - 1;
            if depth >= self.options.max_depth {
                self.events.warn(format!(
                    "Maximum iframe depth reached: {} ({})",
                    depth,
                    display_path(&path)
                ));
                return Ok(());
            }

            let frames = match self.session.driver().find_frames().await {
                Ok(frames) => frames,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.events
                        .error(format!("Error discovering iframes at depth {}: {}", depth, e));
                    return Ok(());
                }
            };
            self.events
                .info(format!("Found {} iframe(s) at depth {}", frames.len(), depth));

            for (index, frame) in frames.iter().enumerate() {
                let record = self.describe(frame, index, &path, parent).await?;
                let accessible = record.accessible;
                let label = record.label().to_string();
                self.inventory.push(record);
                let slot = self.inventory.len() - 1;

                if !accessible {
                    continue;
                }

                let nested_path = self.inventory[slot].hierarchy_path.clone();
                self.events
                    .info(format!("Accessing iframe: {}", display_path(&nested_path)));

                match self.session.enter_frame(frame).await {
                    Ok(()) => {
                        let preview = content_preview(self.session.driver(), self.options).await;
                        self.inventory[slot].content_preview = Some(preview);

                        let nested = self.context(nested_path, Some(slot)).await;

                        if let Err(e) = self.session.return_to_parent().await {
                            self.events.warn(format!("Could not leave iframe {}: {}", label, e));
                        }
                        nested?;
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        self.events
                            .warn(format!("Cannot access iframe {}: {}", label, e));
                        self.inventory[slot].mark_inaccessible(e.to_string());
                    }
                }
            }
            Ok(())
        })
    }

    /// Build the record of one frame element
    ///
    /// Only fatal errors are returned; anything else marks the record
    /// inaccessible.
    async fn describe(
        &mut self,
        frame: &D::Element,
        index: usize,
        path: &[String],
        parent: Option<usize>,
    ) -> Result<FrameRecord> {
        let driver = self.session.driver();
        let mut hierarchy_path = path.to_vec();

        let identity = match Identity::read(driver, frame).await {
            Ok(identity) => identity,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.events
                    .warn(format!("Error extracting iframe info: {}", e));
                hierarchy_path.push(format!("iframe_{}", index));
                return Ok(FrameRecord {
                    index,
                    id: String::new(),
                    name: String::new(),
                    src: String::new(),
                    title: String::new(),
                    class_name: String::new(),
                    locator: String::new(),
                    hierarchy_path,
                    accessible: false,
                    error_message: Some(e.to_string()),
                    content_preview: None,
                    matches: Vec::new(),
                    parent,
                });
            }
        };

        let locator = match driver.locator(frame).await {
            Ok(locator) => locator,
            Err(e) if e.is_fatal() => return Err(e),
            Err(_) => FALLBACK_LOCATOR.to_string(),
        };
        hierarchy_path.push(frame_label(&identity.id, &identity.name, &identity.src, index));

        // Reading a property is the accessibility probe
        let probe = match driver.tag_name(frame).await {
            Err(e) if e.is_fatal() => return Err(e),
            probe => probe,
        };
        debug!(locator = %locator, accessible = probe.is_ok(), "frame described");

        Ok(FrameRecord {
            index,
            id: identity.id,
            name: identity.name,
            src: identity.src,
            title: identity.title,
            class_name: identity.class_name,
            locator,
            hierarchy_path,
            accessible: probe.is_ok(),
            error_message: probe.err().map(|e| e.to_string()),
            content_preview: None,
            matches: Vec::new(),
            parent,
        })
    }
}

/// Identity attributes of a frame element
struct Identity {
    id: String,
    name: String,
    src: String,
    title: String,
    class_name: String,
}

impl Identity {
    async fn read<D: FrameDriver>(driver: &mut D, frame: &D::Element) -> Result<Self> {
        Ok(Self {
            id: driver.attribute(frame, "id").await?.unwrap_or_default(),
            name: driver.attribute(frame, "name").await?.unwrap_or_default(),
            src: driver.attribute(frame, "src").await?.unwrap_or_default(),
            title: driver.attribute(frame, "title").await?.unwrap_or_default(),
            class_name: driver.attribute(frame, "class").await?.unwrap_or_default(),
        })
    }
}
