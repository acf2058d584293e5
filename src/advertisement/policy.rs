use crate::auth::{Caller, Operation};
use crate::error::Error;
use crate::user::{User, UserId};

use super::Advertisement;

/// Which advertisements a caller may see. Published advertisements are
/// visible to everyone; drafts only to the caller that created them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub viewer: Option<UserId>,
}

impl Visibility {
    pub fn for_caller(caller: &Caller) -> Visibility {
        Visibility {
            viewer: caller.user_id(),
        }
    }

    pub fn anonymous() -> Visibility {
        Visibility { viewer: None }
    }

    pub fn permits(&self, advertisement: &Advertisement) -> bool {
        if advertisement.status.is_published() {
            return true;
        }

        match self.viewer {
            Some(viewer) => advertisement.is_created_by(viewer),
            None => false,
        }
    }
}

/// Admins bypass the ownership check.
pub fn can_mutate(user: &User, advertisement: &Advertisement) -> bool {
    user.is_admin || advertisement.is_created_by(user.id)
}

pub fn ensure_can_mutate(
    user: &User,
    advertisement: &Advertisement,
    operation: Operation,
) -> Result<(), Error> {
    if operation.requires_ownership() && !can_mutate(user, advertisement) {
        tracing::debug!(
            user_id = %user.id,
            advertisement_id = %advertisement.id,
            ?operation,
            "caller does not own advertisement"
        );
        return Err(Error::NotAdvertisementCreator {
            advertisement_id: advertisement.id,
            user_id: user.id,
        });
    }

    Ok(())
}
