//! Ownership policy shared by every resource handler.
//!
//! Handlers fetch the record, then call [`authorize_or_conceal`] with the action they are
//! about to perform. A forbidden record and a missing record produce the same 404, so a
//! caller cannot learn whether another identity's record exists.

use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Forbidden,
}

/// A record that carries an owning identity.
pub trait Owned {
    /// Resource name used in client-facing messages.
    const KIND: &'static str;

    /// Unowned records are readable by any authenticated identity when this is set.
    const PUBLIC_WHEN_UNOWNED: bool = false;

    /// `None` means the record has no owner.
    fn owner_id(&self) -> Option<i64>;
}

pub fn authorize<R: Owned>(identity: &AuthUser, resource: &R, action: Action) -> Decision {
    match (resource.owner_id(), action) {
        (Some(owner), _) if owner == identity.user_id => Decision::Allowed,
        (None, Action::Read) if R::PUBLIC_WHEN_UNOWNED => Decision::Allowed,
        _ => Decision::Forbidden,
    }
}

/// Resolve a fetched record into either the record or the uniform not-found error.
pub fn authorize_or_conceal<R: Owned>(
    identity: &AuthUser,
    resource: Option<R>,
    action: Action,
) -> Result<R, ApiError> {
    let concealed = || ApiError::not_found(format!("{} not found", R::KIND));

    let resource = resource.ok_or_else(concealed)?;
    match authorize(identity, &resource, action) {
        Decision::Allowed => Ok(resource),
        Decision::Forbidden => {
            tracing::warn!(
                user_id = identity.user_id,
                kind = R::KIND,
                ?action,
                "ownership check rejected request"
            );
            Err(concealed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Private(i64);
    #[derive(Debug)]
    struct Shared(Option<i64>);

    impl Owned for Private {
        const KIND: &'static str = "Widget";
        fn owner_id(&self) -> Option<i64> {
            Some(self.0)
        }
    }

    impl Owned for Shared {
        const KIND: &'static str = "Shelf";
        const PUBLIC_WHEN_UNOWNED: bool = true;
        fn owner_id(&self) -> Option<i64> {
            self.0
        }
    }

    const ALICE: AuthUser = AuthUser { user_id: 1 };
    const BOB: AuthUser = AuthUser { user_id: 2 };
    const ALL: [Action; 3] = [Action::Read, Action::Update, Action::Delete];

    #[test]
    fn owner_may_do_everything() {
        for action in ALL {
            assert_eq!(authorize(&ALICE, &Private(1), action), Decision::Allowed);
            assert_eq!(authorize(&ALICE, &Shared(Some(1)), action), Decision::Allowed);
        }
    }

    #[test]
    fn other_identities_may_do_nothing() {
        for action in ALL {
            assert_eq!(authorize(&BOB, &Private(1), action), Decision::Forbidden);
            assert_eq!(authorize(&BOB, &Shared(Some(1)), action), Decision::Forbidden);
        }
    }

    #[test]
    fn unowned_public_records_are_read_only() {
        assert_eq!(authorize(&BOB, &Shared(None), Action::Read), Decision::Allowed);
        assert_eq!(authorize(&BOB, &Shared(None), Action::Update), Decision::Forbidden);
        assert_eq!(authorize(&BOB, &Shared(None), Action::Delete), Decision::Forbidden);
    }

    #[test]
    fn forbidden_and_missing_look_the_same() {
        let forbidden = authorize_or_conceal(&BOB, Some(Private(1)), Action::Read).unwrap_err();
        let missing = authorize_or_conceal::<Private>(&BOB, None, Action::Read).unwrap_err();
        assert_eq!(forbidden.status_code(), missing.status_code());
        assert_eq!(forbidden.to_json(), missing.to_json());
        assert_eq!(forbidden.message(), "Widget not found");
    }

    #[test]
    fn allowed_record_is_returned() {
        let shelf = authorize_or_conceal(&ALICE, Some(Shared(None)), Action::Read).unwrap();
        assert_eq!(shelf.owner_id(), None);
    }
}
