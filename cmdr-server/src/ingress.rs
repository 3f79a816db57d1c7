//! Classification of raw stdin lines into server input events.

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputEvent {
    /// `@name text`: `text` typed by the player matching `name`.
    Player {
        /// Player name as typed by the operator.
        name: String,
        /// Chat line or client command.
        line: String,
    },
    /// `!choose name n`: pick option `n` (1-based) of the player's open menu.
    Choose {
        /// Player name as typed by the operator.
        name: String,
        /// Zero-based option index.
        option: usize,
    },
    /// `!cancel name`: dismiss the player's open menu.
    Cancel {
        /// Player name as typed by the operator.
        name: String,
    },
    /// Anything else is a console command line.
    Console(String),
    /// A recognized form with bad arguments; carries the complaint.
    Malformed(String),
}

/// Classifies one input line.
pub(crate) fn parse_input_line(line: &str) -> InputEvent {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('@') {
        let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if name.is_empty() {
            return InputEvent::Malformed("Usage: @<player> <text>".to_owned());
        }
        return InputEvent::Player {
            name: name.to_owned(),
            line: text.trim().to_owned(),
        };
    }
    if let Some(rest) = keyword_rest(line, "!choose") {
        let words = rest.split_whitespace().collect::<Vec<_>>();
        let [name, number] = words.as_slice() else {
            return InputEvent::Malformed("Usage: !choose <player> <number>".to_owned());
        };
        return match number.parse::<usize>() {
            Ok(number) if number >= 1 => InputEvent::Choose {
                name: (*name).to_owned(),
                option: number - 1,
            },
            _ => InputEvent::Malformed(format!("Invalid option number \"{number}\"")),
        };
    }
    if let Some(rest) = keyword_rest(line, "!cancel") {
        let words = rest.split_whitespace().collect::<Vec<_>>();
        let [name] = words.as_slice() else {
            return InputEvent::Malformed("Usage: !cancel <player>".to_owned());
        };
        return InputEvent::Cancel {
            name: (*name).to_owned(),
        };
    }
    InputEvent::Console(line.to_owned())
}

/// Text after `keyword` when the line starts with it as a whole word.
fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    line.strip_prefix(keyword)
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}
