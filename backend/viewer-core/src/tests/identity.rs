use crate::identity::{StaticIdentity, identity_text};

use uuid::Uuid;

/// **VALUE**: Verifies the token is rendered in canonical dashed lowercase form.
///
/// **BUG THIS CATCHES**: Would catch a switch to the simple or braced UUID format, which web
/// clients compare as plain strings.
#[test]
fn given_identity_when_formatted_then_uses_dashed_lowercase() {
    // GIVEN: A fixed identity
    let id = Uuid::parse_str("6F9619FF-8B86-D011-B42D-00C04FC964FF").expect("valid uuid");
    let provider = StaticIdentity(Some(id));

    // WHEN: Formatting it
    let text = identity_text(&provider);

    // THEN: Dashed lowercase
    assert_eq!(text, "6f9619ff-8b86-d011-b42d-00c04fc964ff");
}

/// **VALUE**: Verifies "no identity" and the nil UUID both produce an empty body.
///
/// **BUG THIS CATCHES**: Would catch `00000000-0000-...` leaking out as if it were a token.
#[test]
fn given_missing_or_nil_identity_when_formatted_then_returns_empty() {
    assert_eq!(identity_text(&StaticIdentity(None)), "");
    assert_eq!(identity_text(&StaticIdentity(Some(Uuid::nil()))), "");
}
