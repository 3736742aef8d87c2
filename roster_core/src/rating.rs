use chrono::Utc;
use log::info;
use snafu::prelude::*;

use crate::config::{RatingAction, RatingChange, StarRating, VoterRecord};
use crate::store::VoterStore;
use crate::users::authorize;
use crate::*;

/// Sets the rating of a record to a value between 1 and 5.
///
/// Returns the audit entry for the change: ADD when the record was not
/// rated yet, EDIT otherwise.
pub fn set_rating(record: &mut VoterRecord, rating: u8, actor: &str) -> RosterResult<RatingChange> {
    let new_rating = StarRating::new(rating)
        .filter(|r| r.is_rated())
        .context(RatingOutOfRangeSnafu { rating })?;
    let old_rating = record.star_rating;
    record.star_rating = new_rating;
    let action = if old_rating.is_rated() {
        RatingAction::Edit
    } else {
        RatingAction::Add
    };
    Ok(RatingChange {
        voter_id: record.voter_id.clone(),
        actor: actor.to_string(),
        action,
        old_rating,
        new_rating,
        timestamp: Utc::now(),
    })
}

/// Resets the rating of a record to 0.
///
/// A DELETE entry is produced even if the record was not rated.
pub fn clear_rating(record: &mut VoterRecord, actor: &str) -> RatingChange {
    let old_rating = record.star_rating;
    record.star_rating = StarRating::NONE;
    RatingChange {
        voter_id: record.voter_id.clone(),
        actor: actor.to_string(),
        action: RatingAction::Delete,
        old_rating,
        new_rating: StarRating::NONE,
        timestamp: Utc::now(),
    }
}

/// Rates a stored voter and records the change in the audit log.
pub fn rate_voter<S: VoterStore>(
    store: &mut S,
    voter_id: &str,
    rating: u8,
    actor: &str,
) -> RosterResult<RatingChange> {
    authorize(store, actor, false)?;
    let mut record = store
        .find_voter(voter_id)?
        .context(UnknownVoterSnafu { voter_id })?;
    let change = set_rating(&mut record, rating, actor)?;
    store.update_rating(voter_id, record.star_rating)?;
    store.append_rating_change(change.clone())?;
    info!(
        "rate_voter: {} {} -> {} by {} ({})",
        voter_id, change.old_rating, change.new_rating, actor, change.action
    );
    Ok(change)
}

/// Clears the rating of a stored voter. Only main users may do this.
pub fn unrate_voter<S: VoterStore>(
    store: &mut S,
    voter_id: &str,
    actor: &str,
) -> RosterResult<RatingChange> {
    authorize(store, actor, true)?;
    let mut record = store
        .find_voter(voter_id)?
        .context(UnknownVoterSnafu { voter_id })?;
    let change = clear_rating(&mut record, actor);
    store.update_rating(voter_id, record.star_rating)?;
    store.append_rating_change(change.clone())?;
    info!(
        "unrate_voter: {} {} -> 0 by {}",
        voter_id, change.old_rating, actor
    );
    Ok(change)
}
