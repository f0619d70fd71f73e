use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Which upgrade call-to-action the admin UI shows.
///
/// On the wire every variant is its kebab-case name, except [`UpgradeTabType::None`], which is
/// the JSON literal `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeTabType {
    GoFullyFeatured,
    GoFullyFeaturedRegistered,
    UpgradeYourPlan,
    TrialGold,
    TrialEnterprise,
    /// A paid, non-trial license is active: no upgrade tab.
    None,
}

impl UpgradeTabType {
    pub const ALL: [Self; 6] = [
        Self::GoFullyFeatured,
        Self::GoFullyFeaturedRegistered,
        Self::UpgradeYourPlan,
        Self::TrialGold,
        Self::TrialEnterprise,
        Self::None,
    ];

    /// Wire name, or `None` for the "no tab" variant.
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::GoFullyFeatured => Some("go-fully-featured"),
            Self::GoFullyFeaturedRegistered => Some("go-fully-featured-registered"),
            Self::UpgradeYourPlan => Some("upgrade-your-plan"),
            Self::TrialGold => Some("trial-gold"),
            Self::TrialEnterprise => Some("trial-enterprise"),
            Self::None => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == Some(name))
    }
}

impl fmt::Display for UpgradeTabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("false"))
    }
}

impl Serialize for UpgradeTabType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for UpgradeTabType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TabVisitor;

        impl Visitor<'_> for TabVisitor {
            type Value = UpgradeTabType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an upgrade tab name or `false`")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                if value {
                    Err(E::invalid_value(Unexpected::Bool(true), &self))
                } else {
                    Ok(UpgradeTabType::None)
                }
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                UpgradeTabType::from_name(value)
                    .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(TabVisitor)
    }
}

#[cfg(feature = "server")]
impl utoipa::PartialSchema for UpgradeTabType {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        use utoipa::openapi::schema::{ObjectBuilder, OneOfBuilder, Type};

        OneOfBuilder::new()
            .item(
                ObjectBuilder::new()
                    .schema_type(Type::String)
                    .enum_values(Some(Self::ALL.into_iter().filter_map(Self::as_str))),
            )
            .item(ObjectBuilder::new().schema_type(Type::Boolean).enum_values(Some([false])))
            .description(Some("Upgrade tab to show, or `false` for none"))
            .into()
    }
}

#[cfg(feature = "server")]
impl utoipa::ToSchema for UpgradeTabType {}

/// Facts the upgrade-tab decision is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LicenseFacts {
    pub registered: bool,
    pub has_valid_license: bool,
    pub had_expired_trials: bool,
    pub is_trial: bool,
    pub has_gold_license: bool,
}

/// Maps [`LicenseFacts`] to a tab. Implementations must be pure.
pub trait UpgradeTabPolicy: fmt::Debug + Send + Sync {
    fn tab_type(&self, facts: &LicenseFacts) -> UpgradeTabType;
}

/// The stock decision table.
///
/// | valid license | expired trials | registered | trial | gold | tab |
/// |---|---|---|---|---|---|
/// | no | yes | * | * | * | `upgrade-your-plan` |
/// | no | no | yes | * | * | `go-fully-featured-registered` |
/// | no | no | no | * | * | `go-fully-featured` |
/// | yes | * | * | yes | yes | `trial-gold` |
/// | yes | * | * | yes | no | `trial-enterprise` |
/// | yes | * | * | no | * | `false` |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUpgradeTabPolicy;

impl UpgradeTabPolicy for DefaultUpgradeTabPolicy {
    fn tab_type(&self, facts: &LicenseFacts) -> UpgradeTabType {
        if !facts.has_valid_license {
            return if facts.had_expired_trials {
                UpgradeTabType::UpgradeYourPlan
            } else if facts.registered {
                UpgradeTabType::GoFullyFeaturedRegistered
            } else {
                UpgradeTabType::GoFullyFeatured
            };
        }

        match (facts.is_trial, facts.has_gold_license) {
            (true, true) => UpgradeTabType::TrialGold,
            (true, false) => UpgradeTabType::TrialEnterprise,
            (false, _) => UpgradeTabType::None,
        }
    }
}
