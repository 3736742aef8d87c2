use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::collections::{BTreeMap, HashSet};

use crate::config::{RatingChange, StarRating, User, VoterRecord};
use crate::search::SearchQuery;
use crate::*;

/// The persistence operations the roster needs.
///
/// Voter ids are unique: the store refuses to hold two records with the same
/// id. The rating log is append-only.
pub trait VoterStore {
    /// Exact lookup by voter id.
    fn find_voter(&self, voter_id: &str) -> RosterResult<Option<VoterRecord>>;

    /// Inserts all the records or none of them. Fails if any id is already
    /// present, in the store or twice in the batch.
    fn insert_batch(&mut self, records: Vec<VoterRecord>) -> RosterResult<usize>;

    fn search(&self, query: &SearchQuery) -> RosterResult<Vec<VoterRecord>>;

    fn update_rating(&mut self, voter_id: &str, rating: StarRating) -> RosterResult<()>;

    /// Removes every voter record and returns how many were removed.
    fn delete_all_voters(&mut self) -> RosterResult<usize>;

    fn append_rating_change(&mut self, change: RatingChange) -> RosterResult<()>;

    /// The rating log, oldest first, optionally restricted to one voter.
    fn rating_changes(&self, voter_id: Option<&str>) -> RosterResult<Vec<RatingChange>>;

    fn find_user(&self, username: &str) -> RosterResult<Option<User>>;

    fn users(&self) -> RosterResult<Vec<User>>;

    /// Inserts or replaces a user.
    fn put_user(&mut self, user: User) -> RosterResult<()>;

    fn remove_user(&mut self, username: &str) -> RosterResult<bool>;
}

/// A store kept entirely in memory. It can be serialized as a whole, which
/// is how the command line keeps it on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    voters: BTreeMap<String, VoterRecord>,
    #[serde(default)]
    rating_log: Vec<RatingChange>,
    #[serde(default)]
    users: Vec<User>,
}

impl MemoryStore {
    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }
}

impl VoterStore for MemoryStore {
    fn find_voter(&self, voter_id: &str) -> RosterResult<Option<VoterRecord>> {
        Ok(self.voters.get(voter_id).cloned())
    }

    fn insert_batch(&mut self, records: Vec<VoterRecord>) -> RosterResult<usize> {
        let mut seen: HashSet<&str> = HashSet::new();
        for r in records.iter() {
            ensure!(
                !self.voters.contains_key(&r.voter_id) && seen.insert(r.voter_id.as_str()),
                DuplicateVoterSnafu {
                    voter_id: r.voter_id.clone()
                }
            );
        }
        let count = records.len();
        for r in records {
            self.voters.insert(r.voter_id.clone(), r);
        }
        debug!("insert_batch: inserted {} records", count);
        Ok(count)
    }

    fn search(&self, query: &SearchQuery) -> RosterResult<Vec<VoterRecord>> {
        let hits: Vec<VoterRecord> = self
            .voters
            .values()
            .filter(|v| query.matches(v))
            .cloned()
            .collect();
        Ok(query.finish(hits))
    }

    fn update_rating(&mut self, voter_id: &str, rating: StarRating) -> RosterResult<()> {
        let record = self
            .voters
            .get_mut(voter_id)
            .context(UnknownVoterSnafu { voter_id })?;
        record.star_rating = rating;
        Ok(())
    }

    fn delete_all_voters(&mut self) -> RosterResult<usize> {
        let count = self.voters.len();
        self.voters.clear();
        Ok(count)
    }

    fn append_rating_change(&mut self, change: RatingChange) -> RosterResult<()> {
        self.rating_log.push(change);
        Ok(())
    }

    fn rating_changes(&self, voter_id: Option<&str>) -> RosterResult<Vec<RatingChange>> {
        Ok(self
            .rating_log
            .iter()
            .filter(|c| voter_id.map_or(true, |id| c.voter_id == id))
            .cloned()
            .collect())
    }

    fn find_user(&self, username: &str) -> RosterResult<Option<User>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    fn users(&self) -> RosterResult<Vec<User>> {
        Ok(self.users.clone())
    }

    fn put_user(&mut self, user: User) -> RosterResult<()> {
        match self.users.iter_mut().find(|u| u.username == user.username) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
        Ok(())
    }

    fn remove_user(&mut self, username: &str) -> RosterResult<bool> {
        let before = self.users.len();
        self.users.retain(|u| u.username != username);
        Ok(self.users.len() < before)
    }
}
