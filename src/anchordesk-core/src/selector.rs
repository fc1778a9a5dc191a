//! Anchor selection: domain scoring plus duo pairing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AssemblyConfig;
use crate::domain::{Domain, mentions};
use crate::persona::{Desk, FatigueLevel, PersonaDirectory};
use crate::timeline::ToneShift;

/// Panel pairings per domain, in preference order.
pub fn duo_candidates(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Defi => &["ledger", "cash"],
        Domain::Onchain => &["reef", "bond"],
        Domain::Markets => &["cash", "bond"],
        Domain::Macro => &["bond", "lawson"],
        Domain::Regulation => &["lawson", "bond"],
        Domain::Ai => &["neura", "cap"],
        Domain::Funding => &["cap", "neura"],
        Domain::Meme => &["penny", "ivy"],
        Domain::Retail => &["penny", "cash"],
        Domain::Volatility => &["rex", "reef", "cash"],
        Domain::Security => &["ledger", "lawson"],
        Domain::General => &["bond", "ivy"],
    }
}

/// Anchors chosen for a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSelection {
    pub domain: Domain,
    pub primary: String,
    pub duo: Option<String>,
}

impl AnchorSelection {
    /// Ordered list: primary, then duo partner if any.
    pub fn anchors(&self) -> Vec<String> {
        let mut anchors = vec![self.primary.clone()];
        if let Some(duo) = &self.duo {
            anchors.push(duo.clone());
        }
        anchors
    }
}

/// Scores the panel against a headline.
pub struct AnchorSelector<'a> {
    directory: &'a PersonaDirectory,
    config: &'a AssemblyConfig,
}

impl<'a> AnchorSelector<'a> {
    pub fn new(directory: &'a PersonaDirectory, config: &'a AssemblyConfig) -> Self {
        Self { directory, config }
    }

    /// Pick a primary and optional duo partner.
    ///
    /// `recent_usage` reports how often each anchor appeared recently. Heavy
    /// use lowers the score but never excludes an anchor.
    pub fn select(
        &self,
        headline: &str,
        domain_hint: Option<Domain>,
        tone_shift: Option<ToneShift>,
        recent_usage: impl Fn(&str) -> u32,
    ) -> AnchorSelection {
        let domain = Domain::resolve(domain_hint, headline);

        let mut best: Option<(&str, i32)> = None;
        for profile in self.directory.panel() {
            let mut score = 0;

            if profile.domains.contains(&domain) {
                score += 20;
            }
            for owned in &profile.domains {
                score += 5 * owned
                    .keywords()
                    .iter()
                    .filter(|term| mentions(headline, term))
                    .count() as i32;
            }
            score += profile
                .roles
                .iter()
                .map(|role| role.priority_bonus())
                .sum::<i32>();
            if tone_shift.is_some_and(|tone| profile.tone_bias.contains(&tone)) {
                score += 3;
            }

            let usage = recent_usage(&profile.id);
            let usage_penalty = (usage as i32 * self.config.fatigue_penalty_per_use)
                .min(self.config.fatigue_penalty_cap);
            let level = profile.fatigue_level.max(FatigueLevel::from_usage(usage));
            score -= usage_penalty + level.penalty();

            // Strictly greater keeps the earliest declaration on ties.
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((profile.id.as_str(), score));
            }
        }

        let primary = best
            .map(|(id, _)| id.to_string())
            .unwrap_or_else(|| self.config.lead_anchor.clone());
        let duo = self.duo_for(&primary, domain);

        debug!(%domain, %primary, duo = ?duo, "anchors selected");
        AnchorSelection {
            domain,
            primary,
            duo,
        }
    }

    fn duo_for(&self, primary: &str, domain: Domain) -> Option<String> {
        let is_panelist = |id: &str| {
            self.directory
                .get(id)
                .is_some_and(|p| p.desk == Desk::Panel)
        };

        duo_candidates(domain)
            .iter()
            .copied()
            .find(|candidate| *candidate != primary && is_panelist(candidate))
            .map(str::to_string)
            .or_else(|| {
                self.directory
                    .get(primary)
                    .and_then(|p| p.duo_partner.as_deref())
                    .filter(|partner| *partner != primary && is_panelist(partner))
                    .map(str::to_string)
            })
    }
}

/// Selection with no fatigue history and no active tone shift.
pub fn select_anchors(
    headline: &str,
    domain_hint: Option<Domain>,
    directory: &PersonaDirectory,
) -> Vec<String> {
    let config = AssemblyConfig::default();
    AnchorSelector::new(directory, &config)
        .select(headline, domain_hint, None, |_| 0)
        .anchors()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{AnchorProfile, PersonaRole, default_roster};

    fn directory() -> PersonaDirectory {
        PersonaDirectory::new(default_roster())
    }

    #[test]
    fn test_domain_specialist_wins() {
        let anchors = select_anchors("DeFi liquidity crunch hits lenders", None, &directory());
        assert_eq!(anchors, vec!["reef".to_string(), "ledger".to_string()]);
    }

    #[test]
    fn test_regulation_story_pairs_with_bond() {
        let anchors = select_anchors("SEC lawsuit targets exchange", None, &directory());
        assert_eq!(anchors, vec!["lawson".to_string(), "bond".to_string()]);
    }

    #[test]
    fn test_general_story_falls_back_to_primary_role() {
        let anchors = select_anchors("Studio tour this weekend", None, &directory());
        assert_eq!(anchors[0], "bond");
        assert_eq!(anchors.get(1).map(String::as_str), Some("ivy"));
    }

    #[test]
    fn test_ties_break_by_declaration_order() {
        let roster = vec![
            AnchorProfile::new("first", Desk::Panel).with_domains(&[Domain::Macro]),
            AnchorProfile::new("second", Desk::Panel).with_domains(&[Domain::Macro]),
        ];
        let directory = PersonaDirectory::new(roster);
        let anchors = select_anchors("Inflation cools", None, &directory);
        assert_eq!(anchors[0], "first");
    }

    #[test]
    fn test_duo_partner_is_distinct_from_primary() {
        let roster = vec![
            AnchorProfile::new("bond", Desk::Panel)
                .with_domains(&[Domain::Macro])
                .with_roles(&[PersonaRole::PrimaryAnchor]),
        ];
        let directory = PersonaDirectory::new(roster);
        let anchors = select_anchors("Inflation cools", None, &directory);
        assert_eq!(anchors, vec!["bond".to_string()]);
    }

    #[test]
    fn test_fatigue_lowers_but_never_excludes() {
        let directory = directory();
        let config = AssemblyConfig::default();
        let selector = AnchorSelector::new(&directory, &config);

        let fresh = selector.select("Inflation cools", None, None, |_| 0);
        assert_eq!(fresh.primary, "bond");

        let tired = selector.select("Inflation cools", None, None, |id| {
            if id == "bond" { 10 } else { 0 }
        });
        assert_eq!(tired.primary, "lawson");

        let everyone_tired = selector.select("Inflation cools", None, None, |_| 40);
        assert_eq!(everyone_tired.primary, "bond");
    }

    #[test]
    fn test_tone_bias_breaks_close_calls() {
        let roster = vec![
            AnchorProfile::new("steady", Desk::Panel).with_domains(&[Domain::Macro]),
            AnchorProfile::new("loud", Desk::Panel)
                .with_domains(&[Domain::Macro])
                .with_tone_bias(&[ToneShift::Hype]),
        ];
        let directory = PersonaDirectory::new(roster);
        let config = AssemblyConfig::default();
        let selection = AnchorSelector::new(&directory, &config).select(
            "Inflation cools",
            None,
            Some(ToneShift::Hype),
            |_| 0,
        );
        assert_eq!(selection.primary, "loud");
    }

    #[test]
    fn test_empty_panel_falls_back_to_lead() {
        let directory = PersonaDirectory::new(vec![AnchorProfile::new("chip", Desk::Lead)]);
        let anchors = select_anchors("Anything", None, &directory);
        assert_eq!(anchors, vec!["chip".to_string()]);
    }
}
