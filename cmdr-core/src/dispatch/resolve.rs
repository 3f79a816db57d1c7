use std::collections::VecDeque;

use cmdr_common::error::{CmdrError, CmdrResult};

use crate::command::{ArgKind, ArgValue, ArgumentDescriptor, ResolvedArgs};
use crate::player::PlayerDirectory;

const TRUTHY_WORDS: [&str; 6] = ["true", "yes", "yeah", "ya", "t", "y"];
const FALSY_WORDS: [&str; 7] = ["false", "no", "nah", "nay", "nope", "f", "n"];

/// Output of the argument resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Values resolved from text, plus `Absent` entries for omitted optional arguments.
    pub args: ResolvedArgs,
    /// Arguments that still need a menu selection, in declaration order.
    pub unresolved: VecDeque<ArgumentDescriptor>,
}

/// Resolves raw tokens against the declared descriptors, left to right.
///
/// Tokens match descriptors by position and an empty token counts as omitted. Only an omitted
/// `player` argument with `interactive` set is deferred to the resolution chain; every other
/// omitted required argument is an error. Resolution stops at the first error.
///
/// # Errors
///
/// Returns `CmdrError::Validation` with a user-facing message for missing required arguments,
/// unknown or ambiguous player names, invalid numbers, and unrecognized boolean words.
pub fn resolve_args(
    raw_args: &[String],
    descriptors: &[ArgumentDescriptor],
    players: &dyn PlayerDirectory,
    interactive: bool,
) -> CmdrResult<Resolution> {
    let mut resolution = Resolution::default();
    for (index, descriptor) in descriptors.iter().enumerate() {
        let Some(token) = raw_args.get(index).filter(|token| !token.is_empty()) else {
            if descriptor.is_optional {
                resolution
                    .args
                    .insert(descriptor.name.clone(), ArgValue::Absent);
            } else if descriptor.kind.is_menu_resolvable() && interactive {
                resolution.unresolved.push_back(descriptor.clone());
            } else if descriptor.kind.is_menu_resolvable() {
                return Err(CmdrError::Validation(format!(
                    "Missing required argument \"{}\". Player menus are not available here, specify a name.",
                    descriptor.name
                )));
            } else {
                return Err(CmdrError::Validation(format!(
                    "Missing required argument \"{}\".",
                    descriptor.name
                )));
            }
            continue;
        };
        let value = coerce_token(token, descriptor.kind, players)?;
        resolution.args.insert(descriptor.name.clone(), value);
    }
    Ok(resolution)
}

fn coerce_token(token: &str, kind: ArgKind, players: &dyn PlayerDirectory) -> CmdrResult<ArgValue> {
    match kind {
        ArgKind::Player | ArgKind::NamedPlayer => players
            .lookup_by_name(token)
            .map(ArgValue::Player)
            .ok_or_else(|| CmdrError::Validation(format!("Player \"{token}\" not found."))),
        ArgKind::ExactPlayer => {
            let mut matches = players.lookup_all_by_name_exact(token);
            match matches.len() {
                0 => Err(CmdrError::Validation(format!(
                    "Player \"{token}\" not found. You must specify the name exactly without colors."
                ))),
                1 => Ok(ArgValue::Player(matches.remove(0))),
                _ => Err(CmdrError::Validation(format!(
                    "Name \"{token}\" could refer to more than one player."
                ))),
            }
        }
        ArgKind::Number => token
            .parse::<i64>()
            .map(ArgValue::Number)
            .map_err(|_| CmdrError::Validation(format!("Invalid number \"{token}\""))),
        ArgKind::String => Ok(ArgValue::Text(token.to_owned())),
        ArgKind::Boolean => parse_boolean(token).map(ArgValue::Boolean).ok_or_else(|| {
            CmdrError::Validation(format!(
                "Argument {token} is not a boolean. Try \"true\" or \"false\"."
            ))
        }),
    }
}

/// Interprets a yes/no word, ignoring case.
#[must_use]
pub fn parse_boolean(token: &str) -> Option<bool> {
    let lowered = token.to_lowercase();
    if TRUTHY_WORDS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSY_WORDS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
