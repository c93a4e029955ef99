//! The inclusion filter.
//!
//! One decision function is shared by attributes and associations:
//!
//! 1. A grouped field whose group is in `excluding` is hidden. Nothing below
//!    can bring it back.
//! 2. A grouped field is hidden by default. It becomes visible when its group
//!    is named in `including`, or when `excluding` is non-empty (the caller
//!    opted into exclusion mode, so every group it did not exclude shows).
//! 3. `include` naming the field, or containing `all`, makes it visible.
//! 4. `exclude` naming the field hides it again.
//! 5. A per-field predicate declared on the schema is ANDed with the result.
//!    It is only evaluated when the field is still visible and can never turn
//!    a hidden field visible.

use crate::options::Options;

/// Decides whether `field` appears in the output.
///
/// `predicate` is the schema's `include_if` hook for this field, if any.
///
/// # Examples
///
/// ```
/// use vista_serializer::Options;
/// use vista_serializer::filter::visible;
///
/// // excluding a group is terminal, even against an explicit include
/// let options = Options::new().excluding(["secret"]).include(["ssn"]);
/// assert!(!visible("ssn", Some("secret"), &options, None));
///
/// // ungrouped fields are visible unless excluded
/// assert!(visible("name", None, &Options::new(), None));
/// assert!(!visible("name", None, &Options::new().exclude(["name"]), None));
/// ```
pub fn visible(
    field: &str,
    group: Option<&str>,
    options: &Options,
    predicate: Option<&dyn Fn() -> bool>,
) -> bool {
    let mut ret = true;

    if let Some(group) = group {
        if options.excludes_group(group) {
            return false;
        }
        ret = !options.excluding.is_empty() || options.includes_group(group);
    }

    if options.includes_field(field) {
        ret = true;
    }
    if options.excludes_field(field) {
        ret = false;
    }

    match predicate {
        Some(predicate) => ret && predicate(),
        None => ret,
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::visible;
    use crate::options::Options;

    #[test]
    fn grouped_fields_are_hidden_by_default() {
        assert!(!visible("ssn", Some("secret"), &Options::new(), None));
    }

    #[test]
    fn excluding_group_beats_include_by_name() {
        let options = Options::new()
            .including(Vec::<&str>::new())
            .excluding(["secret"])
            .include(["ssn"]);
        assert!(!visible("ssn", Some("secret"), &options, None));
    }

    #[test]
    fn including_only_opens_the_named_group() {
        let options = Options::new().including(["public"]);
        assert!(visible("bio", Some("public"), &options, None));
        assert!(!visible("ssn", Some("secret"), &options, None));
    }

    #[test]
    fn non_empty_excluding_opens_other_groups() {
        let options = Options::new().excluding(["secret"]);
        assert!(visible("bio", Some("public"), &options, None));
        assert!(!visible("ssn", Some("secret"), &options, None));
    }

    #[test]
    fn include_opens_a_grouped_field_and_exclude_wins_over_it() {
        let options = Options::new().include(["bio"]);
        assert!(visible("bio", Some("public"), &options, None));

        let options = Options::new().include(["bio"]).exclude(["bio"]);
        assert!(!visible("bio", Some("public"), &options, None));
    }

    #[test]
    fn predicate_only_vetoes() {
        let options = Options::new().include(["email"]);
        assert!(!visible("email", None, &options, Some(&|| false)));
        assert!(visible("email", None, &options, Some(&|| true)));

        let calls = Cell::new(0);
        let counting = || {
            calls.set(calls.get() + 1);
            true
        };
        let options = Options::new().exclude(["email"]);
        assert!(!visible("email", None, &options, Some(&counting)));
        assert_eq!(calls.get(), 0);
    }
}
