use crate::catalog::{Show, ShowWithStatus};
use crate::store::ShowsManager;

const TITLE_WIDTH: usize = 33;

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

/// Profile shows sorted by id; `*` marks watchlisted ones. Shows not in
/// "watching" state carry their status.
pub(crate) fn format_profile_shows(shows: &[ShowWithStatus], store: &ShowsManager) -> Vec<String> {
    let mut sorted = shows.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|entry| entry.show.id);
    sorted.dedup_by_key(|entry| entry.show.id);

    sorted
        .into_iter()
        .map(|entry| {
            let show = &entry.show;
            let prefix = if store.is_watched(show.id) { '*' } else { ' ' };
            let line = format!("{} {prefix}{}", show.id, show.display_title());
            match entry.watch_status.as_str() {
                "" | "watching" => line,
                status => format!("{line} ({status})"),
            }
        })
        .collect()
}

pub(crate) fn format_search_results(shows: &[Show]) -> Vec<String> {
    let mut sorted = shows.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|show| show.id);

    sorted
        .into_iter()
        .map(|show| {
            format!(
                "{:<7} {:<width$} {:.2}",
                show.id,
                truncate(show.display_title(), TITLE_WIDTH),
                show.rating,
                width = TITLE_WIDTH
            )
        })
        .collect()
}

pub(crate) fn format_top_shows(shows: &[Show]) -> Vec<String> {
    shows
        .iter()
        .enumerate()
        .map(|(idx, show)| {
            format!(
                "{:>3} {:<width$} {:.2}   (id: {})",
                idx + 1,
                truncate(show.display_title(), TITLE_WIDTH),
                show.rating,
                show.id,
                width = TITLE_WIDTH
            )
        })
        .collect()
}
