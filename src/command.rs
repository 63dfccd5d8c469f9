use crate::arr::MediaKind;

const REQUEST_PREFIX: &str = "request";
const MOVIE_SELECTOR: &str = "movies:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Request { kind: MediaKind, title: String },
}

// The `movies:` selector only picks the library; it stays in the title.
pub fn parse_command(message: &str) -> Command {
    let message = message.trim();
    let has_prefix = message
        .get(..REQUEST_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(REQUEST_PREFIX));
    if !has_prefix {
        return Command::Help;
    }

    let title = message[REQUEST_PREFIX.len()..].trim().to_string();
    let kind = if message.to_lowercase().contains(MOVIE_SELECTOR) {
        MediaKind::Movie
    } else {
        MediaKind::Series
    };
    Command::Request { kind, title }
}
