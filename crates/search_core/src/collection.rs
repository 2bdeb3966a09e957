use std::collections::BTreeMap;

use crate::BlobRef;

/// Title given to every set created from the checked items.
pub const NEW_SET_TITLE: &str = "My new set";
pub const TITLE_ATTRIBUTE: &str = "title";
pub const MEMBER_ATTRIBUTE: &str = "camliMember";

/// One `add-attribute` claim to sign and upload against a permanode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeClaim {
    pub attribute: String,
    pub value: String,
}

impl AttributeClaim {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// How a single claim ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    Attached,
    Failed(String),
}

/// Final report of a set-creation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetCreationOutcome {
    /// Title and every member were attached.
    Created { permanode: BlobRef, members: usize },
    /// At least one operation failed or timed out.
    Incomplete {
        permanode: Option<BlobRef>,
        title_attached: bool,
        unattached: Vec<BlobRef>,
        reason: String,
    },
}

impl SetCreationOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SetCreationOutcome::Created { .. })
    }
}

/// Tracks one "create a set and attach N members" operation.
///
/// Claim 0 is always the title; claim `i > 0` attaches `members[i - 1]`.
/// Each claim index settles at most once, and the job yields its outcome
/// exactly once, when all `N + 1` claims have settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCreationJob {
    members: Vec<BlobRef>,
    permanode: Option<BlobRef>,
    settled: BTreeMap<usize, ClaimResult>,
    finalized: bool,
}

impl SetCreationJob {
    pub fn new(members: Vec<BlobRef>) -> Self {
        Self {
            members,
            permanode: None,
            settled: BTreeMap::new(),
            finalized: false,
        }
    }

    pub fn members(&self) -> &[BlobRef] {
        &self.members
    }

    pub fn permanode(&self) -> Option<&BlobRef> {
        self.permanode.as_ref()
    }

    pub fn expected_claims(&self) -> usize {
        self.members.len() + 1
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Records the new permanode and returns the claims to issue, title first
    /// and then members in selection order. Returns `None` if a permanode was
    /// already recorded or the job is over.
    pub fn attach_permanode(&mut self, permanode: BlobRef) -> Option<Vec<AttributeClaim>> {
        if self.finalized || self.permanode.is_some() {
            return None;
        }
        self.permanode = Some(permanode);

        let mut claims = Vec::with_capacity(self.expected_claims());
        claims.push(AttributeClaim::new(TITLE_ATTRIBUTE, NEW_SET_TITLE));
        claims.extend(
            self.members
                .iter()
                .map(|member| AttributeClaim::new(MEMBER_ATTRIBUTE, member.as_str())),
        );
        Some(claims)
    }

    /// Ends the job because the permanode itself could not be created.
    pub fn fail_permanode(&mut self, reason: impl Into<String>) -> Option<SetCreationOutcome> {
        if self.finalized || self.permanode.is_some() {
            return None;
        }
        self.finalized = true;
        Some(SetCreationOutcome::Incomplete {
            permanode: None,
            title_attached: false,
            unattached: self.members.clone(),
            reason: reason.into(),
        })
    }

    /// Records the result of claim `claim_index`.
    ///
    /// Repeated or out-of-range settlements are ignored. Returns the outcome
    /// on the settlement that completes the job and `None` otherwise.
    pub fn settle(&mut self, claim_index: usize, result: ClaimResult) -> Option<SetCreationOutcome> {
        if self.finalized || claim_index >= self.expected_claims() {
            return None;
        }
        let permanode = self.permanode.clone()?;
        if self.settled.contains_key(&claim_index) {
            return None;
        }
        self.settled.insert(claim_index, result);
        if self.settled.len() < self.expected_claims() {
            return None;
        }
        self.finalized = true;
        Some(self.outcome(permanode))
    }

    fn outcome(&self, permanode: BlobRef) -> SetCreationOutcome {
        let failures: Vec<(usize, &String)> = self
            .settled
            .iter()
            .filter_map(|(index, result)| match result {
                ClaimResult::Failed(reason) => Some((*index, reason)),
                ClaimResult::Attached => None,
            })
            .collect();

        let Some((_, first_reason)) = failures.first() else {
            return SetCreationOutcome::Created {
                permanode,
                members: self.members.len(),
            };
        };

        let title_attached = !failures.iter().any(|(index, _)| *index == 0);
        let unattached = failures
            .iter()
            .filter(|(index, _)| *index > 0)
            .map(|(index, _)| self.members[index - 1].clone())
            .collect();

        SetCreationOutcome::Incomplete {
            permanode: Some(permanode),
            title_attached,
            unattached,
            reason: format!(
                "{} of {} claims failed: {}",
                failures.len(),
                self.expected_claims(),
                first_reason
            ),
        }
    }
}
