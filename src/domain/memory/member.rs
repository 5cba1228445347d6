//! Per-member health memory.
//!
//! The only state shared across sessions. Keyed by member id.

use serde::{Deserialize, Serialize};

use super::candidate::MemoryCandidate;
use super::errors::MemoryError;
use super::facts::{
    ConversationSummary, FactKind, FactSource, HealthFact, RecentEvent, SymptomPattern,
};
use crate::domain::foundation::{CandidateId, FactId, MemberId, Percentage, SessionId, Timestamp};
use crate::domain::triage::{HealthContext, UrgencyLevel};

/// Retention limits for history lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLimits {
    pub max_recent_events: usize,
    pub summary_window_days: i64,
    pub max_summaries: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            max_recent_events: 50,
            summary_window_days: 30,
            max_summaries: 100,
        }
    }
}

/// Confidence given to facts read from answers to direct questions.
const EXTRACTED_CONFIDENCE: u32 = 70;

/// What a finished session contributes to memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDigest {
    pub episode_id: SessionId,
    pub chief_complaint: String,
    pub context: HealthContext,
    pub urgency_level: Option<UrgencyLevel>,
    pub triggered_emergency: bool,
}

/// Seed for a new session drawn from memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSeed {
    pub context: HealthContext,
    pub recurring_symptoms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberHealthMemory {
    member_id: MemberId,
    conditions: Vec<HealthFact>,
    medications: Vec<HealthFact>,
    allergies: Vec<HealthFact>,
    recent_events: Vec<RecentEvent>,
    patterns: Vec<SymptomPattern>,
    conversation_summaries: Vec<ConversationSummary>,
    candidates: Vec<MemoryCandidate>,
    updated_at: Timestamp,
}

impl MemberHealthMemory {
    pub fn new(member_id: MemberId, now: Timestamp) -> Self {
        Self {
            member_id,
            conditions: Vec::new(),
            medications: Vec::new(),
            allergies: Vec::new(),
            recent_events: Vec::new(),
            patterns: Vec::new(),
            conversation_summaries: Vec::new(),
            candidates: Vec::new(),
            updated_at: now,
        }
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn facts(&self, kind: FactKind) -> &[HealthFact] {
        match kind {
            FactKind::Condition => &self.conditions,
            FactKind::Medication => &self.medications,
            FactKind::Allergy => &self.allergies,
        }
    }

    fn facts_mut(&mut self, kind: FactKind) -> &mut Vec<HealthFact> {
        match kind {
            FactKind::Condition => &mut self.conditions,
            FactKind::Medication => &mut self.medications,
            FactKind::Allergy => &mut self.allergies,
        }
    }

    pub fn recent_events(&self) -> &[RecentEvent] {
        &self.recent_events
    }

    pub fn patterns(&self) -> &[SymptomPattern] {
        &self.patterns
    }

    pub fn conversation_summaries(&self) -> &[ConversationSummary] {
        &self.conversation_summaries
    }

    pub fn candidates(&self) -> &[MemoryCandidate] {
        &self.candidates
    }

    pub fn pending_candidates(&self) -> Vec<&MemoryCandidate> {
        self.candidates.iter().filter(|c| c.is_pending()).collect()
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn knows(&self, kind: FactKind, content: &str) -> bool {
        self.facts(kind).iter().any(|f| f.matches(content))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Facts
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a fact, or refreshes `last_mentioned` if it is already known.
    pub fn record_fact(
        &mut self,
        kind: FactKind,
        content: &str,
        source: FactSource,
        source_episode: Option<SessionId>,
        now: Timestamp,
    ) -> FactId {
        self.updated_at = now;
        let facts = self.facts_mut(kind);
        if let Some(existing) = facts.iter_mut().find(|f| f.matches(content)) {
            existing.touch(source, now);
            return existing.id;
        }
        let fact = HealthFact::new(content, source, source_episode, now);
        let id = fact.id;
        facts.push(fact);
        id
    }

    /// Explicitly removes a fact. Nothing else ever deletes one.
    pub fn remove_fact(
        &mut self,
        kind: FactKind,
        id: FactId,
        now: Timestamp,
    ) -> Result<HealthFact, MemoryError> {
        let facts = self.facts_mut(kind);
        let pos = facts
            .iter()
            .position(|f| f.id == id)
            .ok_or(MemoryError::FactNotFound(id))?;
        let removed = facts.remove(pos);
        self.updated_at = now;
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Newest first, capped.
    pub fn add_recent_event(
        &mut self,
        description: &str,
        source_episode: Option<SessionId>,
        now: Timestamp,
        limits: &MemoryLimits,
    ) {
        let description = description.trim();
        if description.is_empty() {
            return;
        }
        self.recent_events.insert(
            0,
            RecentEvent {
                description: description.to_string(),
                recorded_at: now,
                source_episode,
            },
        );
        self.recent_events.truncate(limits.max_recent_events);
        self.updated_at = now;
    }

    pub fn record_symptom(&mut self, symptom: &str, episode: SessionId, now: Timestamp) {
        let symptom = symptom.trim().to_lowercase();
        if symptom.is_empty() {
            return;
        }
        match self.patterns.iter_mut().find(|p| p.symptom == symptom) {
            Some(pattern) => {
                if !pattern.episodes.contains(&episode) {
                    pattern.occurrences += 1;
                    pattern.episodes.push(episode);
                }
                pattern.last_seen = now;
            }
            None => self.patterns.push(SymptomPattern {
                symptom,
                occurrences: 1,
                first_seen: now,
                last_seen: now,
                episodes: vec![episode],
            }),
        }
        self.updated_at = now;
    }

    /// Newest first. Drops summaries outside the window, then caps the count.
    pub fn add_conversation_summary(
        &mut self,
        summary: ConversationSummary,
        now: Timestamp,
        limits: &MemoryLimits,
    ) {
        self.conversation_summaries.insert(0, summary);
        let cutoff = now.minus_days(limits.summary_window_days);
        self.conversation_summaries
            .retain(|s| !s.date.is_before(&cutoff));
        self.conversation_summaries.truncate(limits.max_summaries);
        self.updated_at = now;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Candidates
    // ─────────────────────────────────────────────────────────────────────────

    /// Proposes a fact unless it is already known or already pending.
    pub fn propose_candidate(
        &mut self,
        kind: FactKind,
        content: &str,
        confidence: Percentage,
        source_episode: SessionId,
        now: Timestamp,
    ) -> Option<CandidateId> {
        let content = content.trim();
        if content.is_empty() || self.knows(kind, content) {
            return None;
        }
        let pending = self
            .candidates
            .iter()
            .any(|c| c.is_pending() && c.kind == kind && c.content.eq_ignore_ascii_case(content));
        if pending {
            return None;
        }
        let candidate = MemoryCandidate::new(kind, content, confidence, source_episode, now);
        let id = candidate.id;
        self.candidates.push(candidate);
        self.updated_at = now;
        Some(id)
    }

    /// Drops settled candidates processed before the summary window.
    /// Pending and accepted-but-unpromoted candidates always stay.
    pub fn prune_candidates(&mut self, now: Timestamp, limits: &MemoryLimits) -> usize {
        let cutoff = now.minus_days(limits.summary_window_days);
        let before = self.candidates.len();
        self.candidates.retain(|c| {
            !c.is_settled() || c.processed_at.map_or(true, |at| !at.is_before(&cutoff))
        });
        before - self.candidates.len()
    }

    fn candidate_mut(&mut self, id: CandidateId) -> Result<&mut MemoryCandidate, MemoryError> {
        self.candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(MemoryError::CandidateNotFound(id))
    }

    /// First step: record whether the user accepted the candidate.
    pub fn process_candidate(
        &mut self,
        id: CandidateId,
        accepted: bool,
        now: Timestamp,
    ) -> Result<(), MemoryError> {
        self.candidate_mut(id)?.process(accepted, now)?;
        self.updated_at = now;
        Ok(())
    }

    /// Second step: merge an accepted candidate into its fact list.
    pub fn promote_candidate(&mut self, id: CandidateId, now: Timestamp) -> Result<FactId, MemoryError> {
        let candidate = self.candidate_mut(id)?;
        candidate.mark_promoted()?;
        let (kind, content, episode) = (
            candidate.kind,
            candidate.content.clone(),
            candidate.source_episode,
        );
        Ok(self.record_fact(
            kind,
            &content,
            FactSource::ConversationExtracted,
            Some(episode),
            now,
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session boundaries
    // ─────────────────────────────────────────────────────────────────────────

    /// Folds a finished session into memory.
    ///
    /// Returns the ids of the candidates proposed.
    pub fn ingest_episode(
        &mut self,
        episode: &EpisodeDigest,
        now: Timestamp,
        limits: &MemoryLimits,
    ) -> Vec<CandidateId> {
        self.add_conversation_summary(
            ConversationSummary {
                episode_id: episode.episode_id,
                date: now,
                chief_complaint: episode.chief_complaint.clone(),
                urgency_level: episode.urgency_level,
                triggered_emergency: episode.triggered_emergency,
            },
            now,
            limits,
        );

        self.prune_candidates(now, limits);

        let ctx = &episode.context;
        if ctx.has_primary_symptom() {
            self.record_symptom(&ctx.primary_symptom, episode.episode_id, now);
        }
        for symptom in &ctx.associated_symptoms {
            self.record_symptom(symptom, episode.episode_id, now);
        }
        for event in &ctx.recent_events {
            self.add_recent_event(event, Some(episode.episode_id), now, limits);
        }

        let confidence = Percentage::new(EXTRACTED_CONFIDENCE);
        let mut proposed = Vec::new();
        let lists = [
            (FactKind::Condition, &ctx.chronic_conditions),
            (FactKind::Medication, &ctx.medications),
            (FactKind::Allergy, &ctx.allergies),
        ];
        for (kind, items) in lists {
            for item in items {
                if self.knows(kind, item) {
                    self.record_fact(kind, item, FactSource::ConversationExtracted, None, now);
                } else if let Some(id) =
                    self.propose_candidate(kind, item, confidence, episode.episode_id, now)
                {
                    proposed.push(id);
                }
            }
        }
        proposed
    }

    /// Pre-fills a new session with what is already known.
    pub fn context_for_new_session(&self) -> SessionSeed {
        let mut context = HealthContext::new();
        context.chronic_conditions = self.conditions.iter().map(|f| f.content.clone()).collect();
        context.medications = self.medications.iter().map(|f| f.content.clone()).collect();
        context.allergies = self.allergies.iter().map(|f| f.content.clone()).collect();
        SessionSeed {
            context,
            recurring_symptoms: self
                .patterns
                .iter()
                .filter(|p| p.is_recurring())
                .map(|p| p.symptom.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> MemberId {
        MemberId::new("mom").unwrap()
    }

    fn memory() -> MemberHealthMemory {
        MemberHealthMemory::new(member(), Timestamp::now())
    }

    fn digest(primary: &str, meds: &[&str]) -> EpisodeDigest {
        let mut context = HealthContext::new();
        context.primary_symptom = primary.into();
        context.medications = meds.iter().map(|m| m.to_string()).collect();
        EpisodeDigest {
            episode_id: SessionId::new(),
            chief_complaint: primary.into(),
            context,
            urgency_level: Some(UrgencyLevel::Monitor),
            triggered_emergency: false,
        }
    }

    mod facts {
        use super::*;

        #[test]
        fn recording_a_known_fact_only_touches_it() {
            let t0 = Timestamp::now();
            let mut mem = memory();
            let first = mem.record_fact(FactKind::Medication, "Metformin", FactSource::UserReported, None, t0);
            let again = mem.record_fact(
                FactKind::Medication,
                "metformin",
                FactSource::ConversationExtracted,
                None,
                t0.plus_secs(30),
            );
            assert_eq!(first, again);
            assert_eq!(mem.facts(FactKind::Medication).len(), 1);
            assert_eq!(mem.facts(FactKind::Medication)[0].last_mentioned, t0.plus_secs(30));
        }

        #[test]
        fn remove_fact_is_explicit() {
            let now = Timestamp::now();
            let mut mem = memory();
            let id = mem.record_fact(FactKind::Allergy, "penicillin", FactSource::UserReported, None, now);
            assert!(mem.remove_fact(FactKind::Allergy, id, now).is_ok());
            assert_eq!(
                mem.remove_fact(FactKind::Allergy, id, now),
                Err(MemoryError::FactNotFound(id))
            );
        }
    }

    mod history {
        use super::*;

        #[test]
        fn recent_events_are_newest_first_and_capped() {
            let now = Timestamp::now();
            let limits = MemoryLimits::default();
            let mut mem = memory();
            for i in 0..60 {
                mem.add_recent_event(&format!("event {}", i), None, now.plus_secs(i), &limits);
            }
            assert_eq!(mem.recent_events().len(), 50);
            assert_eq!(mem.recent_events()[0].description, "event 59");
        }

        #[test]
        fn summaries_outside_window_are_dropped() {
            let now = Timestamp::now();
            let limits = MemoryLimits::default();
            let mut mem = memory();
            let old = ConversationSummary {
                episode_id: SessionId::new(),
                date: now.minus_days(45),
                chief_complaint: "old".into(),
                urgency_level: None,
                triggered_emergency: false,
            };
            mem.add_conversation_summary(old, now.minus_days(45), &limits);
            let fresh = ConversationSummary {
                date: now,
                chief_complaint: "fresh".into(),
                ..mem.conversation_summaries()[0].clone()
            };
            mem.add_conversation_summary(fresh, now, &limits);
            assert_eq!(mem.conversation_summaries().len(), 1);
            assert_eq!(mem.conversation_summaries()[0].chief_complaint, "fresh");
        }

        #[test]
        fn summaries_are_capped() {
            let now = Timestamp::now();
            let limits = MemoryLimits {
                max_summaries: 3,
                ..MemoryLimits::default()
            };
            let mut mem = memory();
            for _ in 0..5 {
                mem.ingest_episode(&digest("cough", &[]), now, &limits);
            }
            assert_eq!(mem.conversation_summaries().len(), 3);
        }

        #[test]
        fn same_symptom_in_two_sessions_is_a_recurring_pattern() {
            let now = Timestamp::now();
            let limits = MemoryLimits::default();
            let mut mem = memory();
            mem.ingest_episode(&digest("Headache", &[]), now, &limits);
            assert!(mem.context_for_new_session().recurring_symptoms.is_empty());
            mem.ingest_episode(&digest("headache", &[]), now, &limits);
            assert_eq!(mem.context_for_new_session().recurring_symptoms, vec!["headache"]);
        }
    }

    mod candidates {
        use super::*;

        #[test]
        fn new_medications_become_candidates_not_facts() {
            let now = Timestamp::now();
            let mut mem = memory();
            let ids = mem.ingest_episode(&digest("cough", &["aspirin"]), now, &MemoryLimits::default());
            assert_eq!(ids.len(), 1);
            assert!(mem.facts(FactKind::Medication).is_empty());
            assert_eq!(mem.pending_candidates().len(), 1);
        }

        #[test]
        fn known_medications_are_touched_instead_of_proposed() {
            let t0 = Timestamp::now();
            let mut mem = memory();
            mem.record_fact(FactKind::Medication, "aspirin", FactSource::UserReported, None, t0);
            let later = t0.plus_secs(3600);
            let ids = mem.ingest_episode(&digest("cough", &["Aspirin"]), later, &MemoryLimits::default());
            assert!(ids.is_empty());
            assert_eq!(mem.facts(FactKind::Medication)[0].last_mentioned, later);
        }

        #[test]
        fn duplicate_pending_candidate_is_not_proposed() {
            let now = Timestamp::now();
            let mut mem = memory();
            let limits = MemoryLimits::default();
            mem.ingest_episode(&digest("cough", &["aspirin"]), now, &limits);
            let ids = mem.ingest_episode(&digest("cough", &["aspirin"]), now, &limits);
            assert!(ids.is_empty());
        }

        #[test]
        fn flag_then_promote_merges_with_provenance() {
            let now = Timestamp::now();
            let mut mem = memory();
            let ids = mem.ingest_episode(&digest("cough", &["aspirin"]), now, &MemoryLimits::default());
            let id = ids[0];
            assert_eq!(
                mem.promote_candidate(id, now),
                Err(MemoryError::CandidateNotAccepted(id))
            );
            mem.process_candidate(id, true, now).unwrap();
            assert!(mem.facts(FactKind::Medication).is_empty());
            mem.promote_candidate(id, now).unwrap();
            let fact = &mem.facts(FactKind::Medication)[0];
            assert_eq!(fact.content, "aspirin");
            assert_eq!(fact.source, FactSource::ConversationExtracted);
        }

        #[test]
        fn settled_candidates_leave_after_the_window() {
            let t0 = Timestamp::now();
            let limits = MemoryLimits::default();
            let mut mem = memory();
            let ids = mem.ingest_episode(
                &digest("cough", &["aspirin", "ibuprofen", "paracetamol", "metformin"]),
                t0,
                &limits,
            );
            let (rejected, promoted, accepted, pending) = (ids[0], ids[1], ids[2], ids[3]);
            mem.process_candidate(rejected, false, t0).unwrap();
            mem.process_candidate(promoted, true, t0).unwrap();
            mem.promote_candidate(promoted, t0).unwrap();
            mem.process_candidate(accepted, true, t0).unwrap();

            assert_eq!(mem.prune_candidates(t0.add_days(1), &limits), 0);

            let later = t0.add_days(limits.summary_window_days + 1);
            mem.ingest_episode(&digest("cough", &[]), later, &limits);
            let left: Vec<_> = mem.candidates().iter().map(|c| c.id).collect();
            assert_eq!(left, vec![accepted, pending]);
        }

        #[test]
        fn unknown_candidate_is_reported() {
            let mut mem = memory();
            let id = CandidateId::new();
            assert_eq!(
                mem.process_candidate(id, true, Timestamp::now()),
                Err(MemoryError::CandidateNotFound(id))
            );
        }
    }

    #[test]
    fn seed_carries_known_facts() {
        let now = Timestamp::now();
        let mut mem = memory();
        mem.record_fact(FactKind::Condition, "diabetes", FactSource::DoctorConfirmed, None, now);
        mem.record_fact(FactKind::Allergy, "penicillin", FactSource::UserReported, None, now);
        let seed = mem.context_for_new_session();
        assert_eq!(seed.context.chronic_conditions, vec!["diabetes"]);
        assert_eq!(seed.context.allergies, vec!["penicillin"]);
        assert!(!seed.context.has_primary_symptom());
    }
}
