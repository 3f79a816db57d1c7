use crate::command::{ArgKind, ArgumentDescriptor};

/// Builds the usage pattern shown in help listings and handed to the substrate.
///
/// Required non-player arguments render as `<name>`. Optional arguments and every `player`
/// argument render as `[name]`, since an omitted player may still be picked from a menu. A
/// trailing `string` argument carries `rest_marker` inside its brackets because it consumes the
/// remainder of the line.
#[must_use]
pub fn usage_pattern(descriptors: &[ArgumentDescriptor], rest_marker: &str) -> String {
    let last_index = descriptors.len().saturating_sub(1);
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let (open, close) = if descriptor.is_optional || descriptor.kind == ArgKind::Player {
                ('[', ']')
            } else {
                ('<', '>')
            };
            let marker = if index == last_index && descriptor.kind == ArgKind::String {
                rest_marker
            } else {
                ""
            };
            format!("{open}{}{marker}{close}", descriptor.name)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
