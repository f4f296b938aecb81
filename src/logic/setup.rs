//! Setup and administration: creating, editing and deleting tournaments and participants.

use super::TournamentEngine;
use crate::auth::AuthorizedContext;
use crate::error::TournamentError;
use crate::events::TournamentEvent;
use crate::models::{
    normalize_tag, Participant, ParticipantId, Tournament, TournamentId, TournamentStatus,
};
use crate::store::{ParticipantPatch, TournamentPatch};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;

#[derive(Clone, Debug, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    /// Inserted in order; seed positions are 1..N.
    #[serde(default)]
    pub participants: Vec<NewParticipant>,
}

/// Full replacement of the editable tournament fields.
#[derive(Clone, Debug, Deserialize)]
pub struct TournamentDetails {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Full replacement of a participant's name and tag.
#[derive(Clone, Debug, Deserialize)]
pub struct ParticipantUpdate {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
}

fn clean_name(name: &str) -> Result<String, TournamentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// Comparison key for participant names: two names clash when their keys are equal.
fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Check a batch of new names against each other and against `taken` (case-insensitive).
fn check_new_names(
    taken: &[Participant],
    new: &[NewParticipant],
) -> Result<Vec<(String, Option<String>)>, TournamentError> {
    let mut seen: HashSet<String> = taken.iter().map(|p| name_key(&p.name)).collect();
    new.iter()
        .map(|n| {
            let name = clean_name(&n.name)?;
            if !seen.insert(name_key(&name)) {
                return Err(TournamentError::DuplicateParticipantName);
            }
            Ok((name, n.tag.clone()))
        })
        .collect()
}

/// Parse `name[,tag]` rows. Blank rows are skipped; there is no header row.
fn parse_participant_csv<R: Read>(reader: R) -> Result<Vec<NewParticipant>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record
            .map_err(|e| TournamentError::InvalidImport(format!("row {}: {}", line + 1, e)))?;
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        rows.push(NewParticipant {
            name: name.to_string(),
            tag: record.get(1).map(str::to_string),
        });
    }
    Ok(rows)
}

impl TournamentEngine {
    /// Create a tournament in Setup with its initial participants.
    pub fn create_tournament(
        &self,
        _ctx: &AuthorizedContext,
        new: NewTournament,
    ) -> Result<Tournament, TournamentError> {
        let name = clean_name(&new.name)?;
        let max = self.settings.max_participants;
        if new.participants.len() > max {
            return Err(TournamentError::InvalidParticipantCount {
                min: 0,
                max,
                actual: new.participants.len(),
            });
        }
        let names = check_new_names(&[], &new.participants)?;

        let tournament = Tournament::new(name)
            .with_description(new.description)
            .with_rules(new.rules);
        let participants: Vec<Participant> = names
            .into_iter()
            .zip(1u32..)
            .map(|((name, tag), seed)| Participant::new(tournament.id, name, tag, Some(seed)))
            .collect();

        self.store.insert_tournament(tournament.clone())?;
        self.store.insert_participants(participants)?;
        log::info!("Created tournament {} ({})", tournament.name, tournament.id);
        self.publish(TournamentEvent::TournamentCreated {
            tournament_id: tournament.id,
        });
        Ok(tournament)
    }

    pub fn update_tournament_details(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        details: TournamentDetails,
    ) -> Result<Tournament, TournamentError> {
        let name = clean_name(&details.name)?;
        let cleaned = Tournament::new(name.clone())
            .with_description(details.description)
            .with_rules(details.rules);
        let patch = TournamentPatch {
            name: Some(name),
            description: Some(cleaned.description),
            rules: Some(cleaned.rules),
        };
        let updated = self
            .store
            .update_tournament(tournament_id, &patch)?
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        self.publish(TournamentEvent::TournamentUpdated { tournament_id });
        Ok(updated)
    }

    /// Delete a tournament and everything it owns.
    pub fn delete_tournament(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
    ) -> Result<(), TournamentError> {
        if !self.store.delete_tournament(tournament_id)? {
            return Err(TournamentError::TournamentNotFound(tournament_id));
        }
        log::info!("Deleted tournament {}", tournament_id);
        self.publish(TournamentEvent::TournamentDeleted { tournament_id });
        Ok(())
    }

    /// Add one participant (Setup only), seeded after the current last seed.
    pub fn add_participant(
        &self,
        ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        participant: NewParticipant,
    ) -> Result<Participant, TournamentError> {
        let mut added = self.add_participants(ctx, tournament_id, vec![participant])?;
        added.pop().ok_or(TournamentError::InvalidState)
    }

    /// Bulk-add participants from CSV rows of `name[,tag]` (Setup only). All or nothing.
    pub fn import_participants_csv<R: Read>(
        &self,
        ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        reader: R,
    ) -> Result<Vec<Participant>, TournamentError> {
        let rows = parse_participant_csv(reader)?;
        if rows.is_empty() {
            return Err(TournamentError::InvalidImport("no participants found".into()));
        }
        self.add_participants(ctx, tournament_id, rows)
    }

    fn add_participants(
        &self,
        _ctx: &AuthorizedContext,
        tournament_id: TournamentId,
        new: Vec<NewParticipant>,
    ) -> Result<Vec<Participant>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        if tournament.status != TournamentStatus::Setup {
            return Err(TournamentError::InvalidState);
        }
        let existing = self.store.participants(tournament_id)?;
        let max = self.settings.max_participants;
        if existing.len() + new.len() > max {
            return Err(TournamentError::InvalidParticipantCount {
                min: 0,
                max,
                actual: existing.len() + new.len(),
            });
        }
        let names = check_new_names(&existing, &new)?;
        let next_seed = existing
            .iter()
            .filter_map(|p| p.seed_position)
            .max()
            .unwrap_or(0)
            + 1;
        let added: Vec<Participant> = names
            .into_iter()
            .zip(next_seed..)
            .map(|((name, tag), seed)| Participant::new(tournament_id, name, tag, Some(seed)))
            .collect();

        self.store.insert_participants(added.clone())?;
        self.publish(TournamentEvent::ParticipantsChanged { tournament_id });
        Ok(added)
    }

    /// Rename or re-tag a participant. Allowed in any phase.
    pub fn update_participant(
        &self,
        _ctx: &AuthorizedContext,
        participant_id: ParticipantId,
        update: ParticipantUpdate,
    ) -> Result<Participant, TournamentError> {
        let current = self
            .store
            .participant(participant_id)?
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        let name = clean_name(&update.name)?;
        let key = name_key(&name);
        let clash = self
            .store
            .participants(current.tournament_id)?
            .iter()
            .any(|p| p.id != participant_id && name_key(&p.name) == key);
        if clash {
            return Err(TournamentError::DuplicateParticipantName);
        }
        let patch = ParticipantPatch {
            name: Some(name),
            tag: Some(normalize_tag(update.tag)),
        };
        let updated = self
            .store
            .update_participant(participant_id, &patch)?
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        self.publish(TournamentEvent::ParticipantsChanged {
            tournament_id: current.tournament_id,
        });
        Ok(updated)
    }

    /// Remove a participant. Refused with `ParticipantLocked` once fixtures exist.
    pub fn remove_participant(
        &self,
        _ctx: &AuthorizedContext,
        participant_id: ParticipantId,
    ) -> Result<(), TournamentError> {
        let participant = self
            .store
            .participant(participant_id)?
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        let tournament = self.tournament(participant.tournament_id)?;
        let has_fixtures = !self
            .store
            .league_matches(participant.tournament_id)?
            .is_empty();
        if tournament.status != TournamentStatus::Setup || has_fixtures {
            return Err(TournamentError::ParticipantLocked(participant_id));
        }
        self.store.delete_participant(participant_id)?;
        self.publish(TournamentEvent::ParticipantsChanged {
            tournament_id: participant.tournament_id,
        });
        Ok(())
    }
}
