//! # License Classification
//!
//! Derives the workspace's commercial state from a snapshot of license records and hands it to
//! an [`UpgradeTabPolicy`].
//!
//! ## Rules
//!
//! Only `valid` records take part. Over those:
//!
//! * **gold**: any record is tagged `gold`.
//! * **trial**: no record carries an explicit `trial: false`. A record without a trial flag
//!   does not break the trial, and an empty set counts as a trial.
//! * **trial end date**: the expiry of the first record (in input order) whose trial flag is
//!   `true`, as a UTC calendar date.
//! * **valid license**: at least one record is valid.
//!
//! Everything here is a pure function of its arguments; callers pass explicit snapshots.

use crate::record::LicenseRecord;
use crate::tab::{LicenseFacts, UpgradeTabPolicy, UpgradeTabType};
use chrono::NaiveDate;

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub tab_type: UpgradeTabType,
    pub trial_end_date: Option<NaiveDate>,
    /// The facts the tab was derived from.
    pub facts: LicenseFacts,
}

impl Classification {
    /// `trial_end_date` as `YYYY-MM-DD`.
    #[must_use]
    pub fn trial_end_date_string(&self) -> Option<String> {
        self.trial_end_date.map(|date| date.format("%Y-%m-%d").to_string())
    }
}

/// Computes the decision-table facts and the trial end date for `licenses`.
#[must_use]
pub fn license_facts(
    licenses: &[LicenseRecord],
    registered: bool,
    had_expired_trials: bool,
) -> (LicenseFacts, Option<NaiveDate>) {
    let valid: Vec<&LicenseRecord> = licenses.iter().filter(|license| license.valid).collect();

    let trial_end_date = valid
        .iter()
        .find(|license| license.trial_flag() == Some(true))
        .map(|license| license.expiry.date_naive());

    let facts = LicenseFacts {
        registered,
        has_valid_license: !valid.is_empty(),
        had_expired_trials,
        is_trial: !valid.iter().any(|license| license.trial_flag() == Some(false)),
        has_gold_license: valid.iter().any(|license| license.is_gold()),
    };

    (facts, trial_end_date)
}

/// Classifies a license snapshot into an upgrade tab.
#[must_use]
pub fn classify(
    licenses: &[LicenseRecord],
    registered: bool,
    had_expired_trials: bool,
    policy: &dyn UpgradeTabPolicy,
) -> Classification {
    let (facts, trial_end_date) = license_facts(licenses, registered, had_expired_trials);
    Classification { tab_type: policy.tab_type(&facts), trial_end_date, facts }
}
