use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::catalog::{EpisodeDescriptor, EpisodeId};
use crate::notify::{ChatId, Notifier, NotifyError};
use crate::store::ShowsManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendMode {
    Deliver,
    /// Record episodes as sent and log the caption instead of messaging anyone.
    Skip,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchReport {
    pub(crate) due: usize,
    pub(crate) marked_sent: Vec<EpisodeId>,
    pub(crate) suppressed_captions: Vec<String>,
}

pub(crate) fn notification_caption(episode: &EpisodeDescriptor) -> String {
    format!(
        "New episode of {} was released\nSeason: {}, Episode: {}",
        episode.show_title, episode.season, episode.episode
    )
}

/// Episode artwork first, then the show poster.
pub(crate) fn image_source(episode: &EpisodeDescriptor) -> Option<&str> {
    episode
        .episode_image
        .as_deref()
        .or(episode.show_image.as_deref())
}

/// Notifies every recipient about each watched, not yet sent episode.
///
/// An episode is marked sent only after all recipients got it; the first
/// failed send aborts the whole pass.
pub(crate) fn dispatch_due_episodes(
    store: &ShowsManager,
    notifier: &dyn Notifier,
    episodes: &[EpisodeDescriptor],
    recipients: &[ChatId],
    mode: SendMode,
) -> Result<DispatchReport> {
    let mut report = DispatchReport {
        due: episodes.len(),
        ..DispatchReport::default()
    };

    for episode in episodes {
        if !store.is_watched(episode.show_id) || store.is_sent(episode.episode_id) {
            continue;
        }

        let caption = notification_caption(episode);
        debug!("found unhandled episode, caption:\n{caption}");

        match mode {
            SendMode::Skip => {
                warn!("{caption}");
                report.suppressed_captions.push(caption);
            }
            SendMode::Deliver => {
                let image = image_source(episode);
                if image.is_none() {
                    warn!("episode {} has no image url, sending text", episode.episode_id);
                }
                for &chat_id in recipients {
                    send_one(notifier, chat_id, image, &caption).with_context(|| {
                        format!(
                            "failed to deliver episode {} of {}",
                            episode.episode_id, episode.show_title
                        )
                    })?;
                    debug!("sent notification to chat {chat_id}");
                }
            }
        }

        store.mark_sent(episode.episode_id);
        debug!("marked episode {} as sent", episode.episode_id);
        report.marked_sent.push(episode.episode_id);
    }

    if report.marked_sent.is_empty() {
        debug!("no new episodes to proceed");
    }
    Ok(report)
}

fn send_one(
    notifier: &dyn Notifier,
    chat_id: ChatId,
    image: Option<&str>,
    caption: &str,
) -> Result<(), NotifyError> {
    match image {
        Some(url) => notifier.send_photo(chat_id, url, caption),
        None => notifier.send_text(chat_id, caption),
    }
}
