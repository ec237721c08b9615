//! Per-endpoint authorization rules. Each predicate is a pure function of the
//! caller's claims and the target's ownership fields.

use uuid::Uuid;

use super::claims::Claims;
use crate::error::ApiError;

fn is_privileged(caller: &Claims) -> bool {
    caller.is_business || caller.is_admin
}

pub fn can_create_card(caller: &Claims) -> bool {
    is_privileged(caller)
}

pub fn can_list_own_cards(caller: &Claims) -> bool {
    is_privileged(caller)
}

pub fn can_modify_card(caller: &Claims, owner_id: Uuid) -> bool {
    caller.is_self(owner_id) || caller.is_admin
}

pub fn can_change_biz_number(caller: &Claims) -> bool {
    is_privileged(caller)
}

pub fn can_list_users(caller: &Claims) -> bool {
    caller.is_admin
}

pub fn can_read_user(caller: &Claims, target: Uuid) -> bool {
    caller.is_self(target) || caller.is_admin
}

pub fn can_update_user(caller: &Claims, target: Uuid) -> bool {
    caller.is_self(target)
}

pub fn can_delete_user(caller: &Claims, target: Uuid) -> bool {
    caller.is_self(target) || caller.is_admin
}

/// Turns a failed predicate into a 403.
pub fn require(allowed: bool, message: &str) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(is_business: bool, is_admin: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            is_business,
            is_admin,
            iat: 0,
            iss: "test".into(),
            aud: "test".into(),
        }
    }

    #[test]
    fn card_creation_needs_business_or_admin() {
        assert!(!can_create_card(&caller(false, false)));
        assert!(can_create_card(&caller(true, false)));
        assert!(can_create_card(&caller(false, true)));
        assert!(can_create_card(&caller(true, true)));
    }

    #[test]
    fn card_changes_are_for_owner_or_admin() {
        let owner = caller(true, false);
        let stranger = caller(true, false);
        let admin = caller(false, true);
        assert!(can_modify_card(&owner, owner.sub));
        assert!(!can_modify_card(&stranger, owner.sub));
        assert!(can_modify_card(&admin, owner.sub));
    }

    #[test]
    fn user_update_is_self_only() {
        let me = caller(false, false);
        let admin = caller(false, true);
        assert!(can_update_user(&me, me.sub));
        assert!(!can_update_user(&admin, me.sub));
        assert!(can_read_user(&admin, me.sub));
        assert!(can_delete_user(&admin, me.sub));
        assert!(!can_delete_user(&caller(true, false), me.sub));
    }

    #[test]
    fn listing_users_is_admin_only() {
        assert!(can_list_users(&caller(false, true)));
        assert!(!can_list_users(&caller(true, false)));
    }

    #[test]
    fn require_maps_to_forbidden() {
        assert!(require(true, "nope").is_ok());
        let err = require(false, "nope").unwrap_err();
        assert_eq!(err.to_string(), "nope");
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }
}
