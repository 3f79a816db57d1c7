use cmdr_common::error::{CmdrError, CmdrResult};

use crate::command::{ArgKind, ArgumentDescriptor};

/// Parses one `name:type` or `name:type?` argument spec.
///
/// Both parts must be non-empty runs of word characters; the type must be one of the six
/// argument kinds.
///
/// # Errors
///
/// Returns `CmdrError::MalformedSpec` when the shape or the type name is invalid.
pub fn parse_arg_spec(spec: &str) -> CmdrResult<ArgumentDescriptor> {
    let (body, is_optional) = match spec.strip_suffix('?') {
        Some(body) => (body, true),
        None => (spec, false),
    };
    let Some((name, kind)) = body.split_once(':') else {
        return Err(malformed(spec, "does not match pattern word:word(?)".to_owned()));
    };
    if !is_word(name) || !is_word(kind) {
        return Err(malformed(spec, "does not match pattern word:word(?)".to_owned()));
    }
    let Some(kind) = ArgKind::from_name(kind) else {
        return Err(malformed(spec, format!("invalid type {kind}")));
    };
    Ok(ArgumentDescriptor {
        name: name.to_owned(),
        kind,
        is_optional,
    })
}

/// Parses every spec of one command, failing on the first malformed one.
///
/// # Errors
///
/// Returns `CmdrError::MalformedSpec` for the first invalid spec, or when two specs share a
/// name.
pub fn parse_arg_specs(specs: &[&str]) -> CmdrResult<Vec<ArgumentDescriptor>> {
    let mut descriptors = Vec::with_capacity(specs.len());
    for spec in specs {
        let descriptor = parse_arg_spec(spec)?;
        if descriptors
            .iter()
            .any(|existing: &ArgumentDescriptor| existing.name == descriptor.name)
        {
            return Err(malformed(spec, format!("duplicate name {}", descriptor.name)));
        }
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn malformed(spec: &str, reason: String) -> CmdrError {
    CmdrError::MalformedSpec {
        spec: spec.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_arg_spec, parse_arg_specs};
    use crate::command::ArgKind;
    use cmdr_common::error::CmdrError;
    use googletest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("target:player", "target", ArgKind::Player, false)]
    #[case("target:player?", "target", ArgKind::Player, true)]
    #[case("reason:string", "reason", ArgKind::String, false)]
    #[case("amount:number?", "amount", ArgKind::Number, true)]
    #[case("force:boolean", "force", ArgKind::Boolean, false)]
    #[case("who:exactPlayer", "who", ArgKind::ExactPlayer, false)]
    #[case("who_2:namedPlayer?", "who_2", ArgKind::NamedPlayer, true)]
    fn parse_keeps_name_kind_and_optionality(
        #[case] spec: &str,
        #[case] name: &str,
        #[case] kind: ArgKind,
        #[case] optional: bool,
    ) {
        let descriptor = parse_arg_spec(spec).expect("spec must parse");
        assert_that!(descriptor.name.as_str(), eq(name));
        assert_that!(descriptor.kind, eq(kind));
        assert_that!(descriptor.is_optional, eq(optional));
    }

    #[rstest]
    #[case("target:team")]
    #[case("target:Player")]
    #[case("target:string!")]
    #[case("target")]
    #[case(":string")]
    #[case("target:")]
    #[case("two words:string")]
    #[case("target:string??")]
    #[case("")]
    fn parse_rejects_malformed_specs(#[case] spec: &str) {
        let result = parse_arg_spec(spec);
        assert_that!(
            matches!(result, Err(CmdrError::MalformedSpec { .. })),
            eq(true)
        );
    }

    #[rstest]
    fn unknown_type_is_named_in_the_error() {
        let Err(error) = parse_arg_spec("target:team") else {
            panic!("unknown type must be rejected");
        };
        assert_that!(
            error.to_string().as_str(),
            eq("bad arg string target:team: invalid type team")
        );
    }

    #[rstest]
    fn parse_specs_rejects_duplicate_names() {
        let result = parse_arg_specs(&["target:player", "target:string"]);
        assert_that!(result.is_err(), eq(true));
    }

    #[rstest]
    fn parse_specs_keeps_declaration_order() {
        let descriptors =
            parse_arg_specs(&["target:player", "reason:string"]).expect("specs must parse");
        let names = descriptors
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect::<Vec<_>>();
        assert_that!(&names, eq(&vec!["target", "reason"]));
    }
}
