use stratus_licensing::{DefaultUpgradeTabPolicy, LicenseFacts, UpgradeTabPolicy, UpgradeTabType};

fn expected(facts: LicenseFacts) -> UpgradeTabType {
    use UpgradeTabType::*;

    match facts {
        LicenseFacts { has_valid_license: false, had_expired_trials: true, .. } => UpgradeYourPlan,
        LicenseFacts { has_valid_license: false, registered: true, .. } => GoFullyFeaturedRegistered,
        LicenseFacts { has_valid_license: false, .. } => GoFullyFeatured,
        LicenseFacts { is_trial: true, has_gold_license: true, .. } => TrialGold,
        LicenseFacts { is_trial: true, .. } => TrialEnterprise,
        LicenseFacts { .. } => None,
    }
}

#[test]
fn every_fact_combination_maps_to_one_tab() {
    let mut seen = std::collections::HashSet::new();

    for bits in 0u8..32 {
        let facts = LicenseFacts {
            registered: bits & 1 != 0,
            has_valid_license: bits & 2 != 0,
            had_expired_trials: bits & 4 != 0,
            is_trial: bits & 8 != 0,
            has_gold_license: bits & 16 != 0,
        };

        let tab = DefaultUpgradeTabPolicy.tab_type(&facts);
        assert_eq!(tab, expected(facts), "{facts:?}");
        seen.insert(tab);
    }

    assert_eq!(seen.len(), UpgradeTabType::ALL.len(), "every tab is reachable");
}

#[test]
fn expired_trials_outrank_registration() {
    let facts = LicenseFacts {
        registered: true,
        has_valid_license: false,
        had_expired_trials: true,
        is_trial: true,
        has_gold_license: false,
    };

    assert_eq!(DefaultUpgradeTabPolicy.tab_type(&facts), UpgradeTabType::UpgradeYourPlan);
}

#[test]
fn valid_license_ignores_registration_and_history() {
    for (registered, had_expired_trials) in [(false, false), (true, false), (false, true), (true, true)] {
        let facts = LicenseFacts {
            registered,
            has_valid_license: true,
            had_expired_trials,
            is_trial: false,
            has_gold_license: true,
        };

        assert_eq!(DefaultUpgradeTabPolicy.tab_type(&facts), UpgradeTabType::None);
    }
}
