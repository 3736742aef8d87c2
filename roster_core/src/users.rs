use log::info;
use snafu::prelude::*;

use crate::config::{Role, User};
use crate::store::VoterStore;
use crate::*;

/// Creates the main user unless a main user already exists.
///
/// Returns true if a user was created. Running it again is a no-op.
pub fn ensure_main_user<S: VoterStore>(store: &mut S, username: &str) -> RosterResult<bool> {
    let users = store.users()?;
    if users.iter().any(|u| u.role == Role::Main) {
        return Ok(false);
    }
    ensure!(
        !users.iter().any(|u| u.username == username),
        DuplicateUserSnafu { username }
    );
    store.put_user(User::new(username, Role::Main))?;
    info!("ensure_main_user: created main user {}", username);
    Ok(true)
}

/// Resolves the acting user. Unknown and inactive users are refused, and
/// so are sub users when `need_main` is set.
pub fn authorize<S: VoterStore>(store: &S, actor: &str, need_main: bool) -> RosterResult<User> {
    let user = store
        .find_user(actor)?
        .context(UnknownUserSnafu { username: actor })?;
    ensure!(user.is_active, InactiveUserSnafu { username: actor });
    ensure!(
        !need_main || user.role == Role::Main,
        PermissionDeniedSnafu { username: actor }
    );
    Ok(user)
}

pub fn add_user<S: VoterStore>(
    store: &mut S,
    actor: &str,
    username: &str,
    role: Role,
) -> RosterResult<User> {
    authorize(store, actor, true)?;
    let username = username.trim();
    ensure!(!username.is_empty(), EmptyUsernameSnafu {});
    ensure!(
        store.find_user(username)?.is_none(),
        DuplicateUserSnafu { username }
    );
    let user = User::new(username, role);
    store.put_user(user.clone())?;
    info!("add_user: {} added {} ({})", actor, username, role);
    Ok(user)
}

/// Activates or deactivates a sub user.
pub fn set_user_active<S: VoterStore>(
    store: &mut S,
    actor: &str,
    username: &str,
    active: bool,
) -> RosterResult<User> {
    authorize(store, actor, true)?;
    let mut user = store
        .find_user(username)?
        .context(UnknownUserSnafu { username })?;
    ensure!(
        user.role != Role::Main,
        MainUserChangeSnafu {
            username,
            reason: "main users cannot be deactivated"
        }
    );
    user.is_active = active;
    store.put_user(user.clone())?;
    Ok(user)
}

pub fn remove_user<S: VoterStore>(store: &mut S, actor: &str, username: &str) -> RosterResult<()> {
    authorize(store, actor, true)?;
    let user = store
        .find_user(username)?
        .context(UnknownUserSnafu { username })?;
    ensure!(
        user.username != actor,
        MainUserChangeSnafu {
            username,
            reason: "users cannot remove themselves"
        }
    );
    if user.role == Role::Main {
        let mains = store
            .users()?
            .iter()
            .filter(|u| u.role == Role::Main)
            .count();
        ensure!(
            mains > 1,
            MainUserChangeSnafu {
                username,
                reason: "the only main user cannot be removed"
            }
        );
    }
    store.remove_user(username)?;
    info!("remove_user: {} removed {}", actor, username);
    Ok(())
}
