//! The "up next" card layered over the player when playback ends.

use tracing::debug;

use super::{ClickCallback, ElementSpec, ListenerId, NodeId, RenderPort};
use crate::content::RelatedCandidate;
use crate::error::{RelatedVideoError, RelatedVideoResult};

pub const CONTAINER_ID: &str = "next-video-container";
pub const TIMER_ID: &str = "timer";
pub const THUMBNAIL_ID: &str = "next-video";

const CONTAINER_STYLE: &str = "flex: 1; background-color: rgba(10, 10, 10, 0.7); width: 100%; \
    height: 100%; position: absolute; top: 0; align-content: center;";

/// Strip any query from `raw` and ask the image service for `width` pixels.
///
/// `"https://x/img.jpg?foo=bar"` becomes `"https://x/img.jpg?w=800"` for a width of 800.
pub fn sized_thumbnail_url(raw: &str, width: u32) -> String {
    let base = raw.split_once('?').map_or(raw, |(base, _)| base);
    format!("{}?w={}", base, width)
}

/// The live overlay subtree and its click listener.
#[derive(Debug)]
pub struct OverlayHandle {
    pub container: NodeId,
    pub timer_display: NodeId,
    pub thumbnail: NodeId,
    pub listener: Option<ListenerId>,
}

impl OverlayHandle {
    /// Build the card for `candidate` and mount it in the player container.
    ///
    /// Nothing is left in the document if this fails.
    pub fn render(
        port: &dyn RenderPort,
        candidate: &RelatedCandidate,
        countdown_seconds: u32,
        thumbnail_width: u32,
    ) -> RelatedVideoResult<Self> {
        let player = port
            .player_container()
            .ok_or_else(|| RelatedVideoError::MissingElement("player container".to_string()))?;

        let container = port.create_element(
            ElementSpec::new("div")
                .id(CONTAINER_ID)
                .class("vjs-related-container")
                .attr("style", CONTAINER_STYLE),
        )?;

        let overlay = match Self::build_content(
            port,
            container,
            candidate,
            countdown_seconds,
            thumbnail_width,
        )
        .and_then(|overlay| port.append(player, container).map(|_| overlay))
        {
            Ok(overlay) => overlay,
            Err(e) => {
                port.remove(container);
                return Err(e);
            }
        };

        debug!("Rendered overlay for {} in {}", candidate.video_id, player);
        Ok(overlay)
    }

    fn build_content(
        port: &dyn RenderPort,
        container: NodeId,
        candidate: &RelatedCandidate,
        countdown_seconds: u32,
        thumbnail_width: u32,
    ) -> RelatedVideoResult<Self> {
        let content = port.create_element(
            ElementSpec::new("div")
                .class("vjs-related-content")
                .attr("style", "margin: 0 auto; max-width: 40em;"),
        )?;
        port.append(container, content)?;

        let heading = port.create_element(ElementSpec::new("h2").text("Up next in "))?;
        port.append(content, heading)?;

        let timer_display = port.create_element(
            ElementSpec::new("span")
                .id(TIMER_ID)
                .text(countdown_seconds.to_string()),
        )?;
        port.append(heading, timer_display)?;

        let thumbnail = port.create_element(
            ElementSpec::new("img")
                .id(THUMBNAIL_ID)
                .attr(
                    "src",
                    sized_thumbnail_url(&candidate.thumbnail_url, thumbnail_width),
                )
                .attr("alt", "Next video thumbnail")
                .attr("style", "width: 100%; cursor: pointer;"),
        )?;
        port.append(content, thumbnail)?;

        let title = port.create_element(ElementSpec::new("p").text(candidate.title.clone()))?;
        port.append(content, title)?;

        Ok(Self {
            container,
            timer_display,
            thumbnail,
            listener: None,
        })
    }

    /// Attach `on_click` to the thumbnail.
    pub fn listen(&mut self, port: &dyn RenderPort, on_click: ClickCallback) -> RelatedVideoResult<()> {
        if let Some(previous) = self.listener.take() {
            port.unlisten(previous);
        }
        self.listener = Some(port.listen_click(self.thumbnail, on_click)?);
        Ok(())
    }

    /// Detach the click listener, if any. Safe to call repeatedly.
    pub fn unlisten(&mut self, port: &dyn RenderPort) {
        if let Some(listener) = self.listener.take() {
            port.unlisten(listener);
        }
    }

    /// Both the card and its countdown display are still in the document.
    pub fn is_intact(&self, port: &dyn RenderPort) -> bool {
        port.is_attached(self.container) && port.is_attached(self.timer_display)
    }

    pub fn show_remaining(&self, port: &dyn RenderPort, remaining: u32) -> RelatedVideoResult<()> {
        port.set_text(self.timer_display, &remaining.to_string())
    }

    /// Detach the listener and drop the subtree.
    pub fn remove(mut self, port: &dyn RenderPort) {
        self.unlisten(port);
        port.remove(self.container);
    }
}
