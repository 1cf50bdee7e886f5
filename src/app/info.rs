use tracing::debug;

use crate::catalog::Show;
use crate::http;

const IMDB_TITLE_URL: &str = "https://www.imdb.com/title/tt";
const STORYLINE_HEADING: &str = "<h2>Storyline</h2>";
const SPAN_OPEN: &str = "<span>";
const SPAN_CLOSE: &str = "</span>";
pub(crate) const DESCRIPTION_NOT_FOUND: &str = "Description Not Found";

pub(crate) fn imdb_url(imdb_id: u64) -> String {
    format!("{IMDB_TITLE_URL}{imdb_id:07}/")
}

/// Text of the first `<span>` following the storyline heading.
pub(crate) fn extract_storyline(page: &str) -> Option<&str> {
    let block = &page[page.find(STORYLINE_HEADING)?..];
    let start = block.find(SPAN_OPEN)? + SPAN_OPEN.len();
    let len = block[start..].find(SPAN_CLOSE)?;
    Some(block[start..start + len].trim())
}

/// Best effort: any fetch or parse problem yields the placeholder text.
pub(crate) fn fetch_storyline(show: &Show) -> String {
    let Some(imdb_id) = show.imdb_id else {
        return DESCRIPTION_NOT_FOUND.to_string();
    };
    let agent = http::build_agent();
    match http::get_text(&agent, &imdb_url(imdb_id)) {
        Ok(page) => extract_storyline(&page)
            .filter(|story| !story.is_empty())
            .unwrap_or(DESCRIPTION_NOT_FOUND)
            .to_string(),
        Err(err) => {
            debug!("imdb page for show {} unavailable: {err}", show.id);
            DESCRIPTION_NOT_FOUND.to_string()
        }
    }
}

pub(crate) fn format_show_info(show: &Show, storyline: &str) -> String {
    let unknown = || "-".to_string();
    format!(
        "Name:     {}\nYear:     {}\nSeasons:  {}\nRating:   {:.2}\nStatus:   {}\nCountry:  {}\nDesc: {}",
        show.display_title(),
        show.year.map(|year| year.to_string()).unwrap_or_else(unknown),
        show.total_seasons
            .map(|seasons| seasons.to_string())
            .unwrap_or_else(unknown),
        show.rating,
        show.status.clone().unwrap_or_else(unknown),
        show.country.clone().unwrap_or_else(unknown),
        storyline
    )
}
