//! Story domains and headline keyword matching.

use serde::{Deserialize, Serialize};

/// Coverage area of a story. Anchors declare the domains they specialise in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Security,
    Regulation,
    Defi,
    Onchain,
    Ai,
    Macro,
    Funding,
    Meme,
    Retail,
    Volatility,
    Markets,
    #[serde(other)]
    General,
}

impl Domain {
    /// Every domain in declaration order. Detection ties resolve to the
    /// earlier entry.
    pub const ALL: [Domain; 12] = [
        Domain::Security,
        Domain::Regulation,
        Domain::Defi,
        Domain::Onchain,
        Domain::Ai,
        Domain::Macro,
        Domain::Funding,
        Domain::Meme,
        Domain::Retail,
        Domain::Volatility,
        Domain::Markets,
        Domain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Security => "security",
            Domain::Regulation => "regulation",
            Domain::Defi => "defi",
            Domain::Onchain => "onchain",
            Domain::Ai => "ai",
            Domain::Macro => "macro",
            Domain::Funding => "funding",
            Domain::Meme => "meme",
            Domain::Retail => "retail",
            Domain::Volatility => "volatility",
            Domain::Markets => "markets",
            Domain::General => "general",
        }
    }

    /// Headline vocabulary that signals this domain.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Domain::Security => &["hack", "exploit", "breach", "phishing", "attack", "drain"],
            Domain::Regulation => &[
                "sec",
                "cftc",
                "lawsuit",
                "regulator",
                "regulation",
                "regulatory",
                "congress",
                "hearing",
                "legal",
                "policy",
            ],
            Domain::Defi => &["defi", "liquidity", "amm", "yield", "staking", "lending"],
            Domain::Onchain => &["onchain", "on-chain", "wallet", "address", "flow"],
            Domain::Ai => &["ai", "gpu", "compute", "language model"],
            Domain::Macro => &["macro", "inflation", "cpi", "fomc", "treasury", "dollar", "jobs report"],
            Domain::Funding => &["funding", "venture", "seed round", "raise"],
            Domain::Meme => &["meme", "memecoin", "doge", "viral", "culture", "community"],
            Domain::Retail => &["retail", "users", "customer", "consumer"],
            Domain::Volatility => &["volatility", "liquidation", "chaos", "swing"],
            Domain::Markets => &["market", "price", "etf", "volume", "rally", "selloff"],
            Domain::General => &[],
        }
    }

    /// Resolve a domain from headline text.
    pub fn detect(headline: &str) -> Domain {
        let mut best = Domain::General;
        let mut best_hits = 0;
        for domain in Domain::ALL {
            let hits = domain
                .keywords()
                .iter()
                .filter(|term| mentions(headline, term))
                .count();
            if hits > best_hits {
                best = domain;
                best_hits = hits;
            }
        }
        best
    }

    /// The story's own domain, unless it is `general`, in which case the
    /// headline decides.
    pub fn resolve(hint: Option<Domain>, headline: &str) -> Domain {
        match hint {
            Some(domain) if domain != Domain::General => domain,
            _ => Domain::detect(headline),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `term` occurs in `text` starting at a word boundary and ending at
/// one, optionally followed by a plural `s`. Case-insensitive.
///
/// `"ai"` matches "AI chips" but not "said"; `"liquidation"` matches
/// "liquidations".
pub fn mentions(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    let needle = term.to_lowercase();
    let bytes = haystack.as_bytes();

    let is_word = |b: u8| b.is_ascii_alphanumeric();

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(&needle) {
        let start = from + offset;
        let end = start + needle.len();

        let starts_clean = start == 0 || !is_word(bytes[start - 1]);
        let ends_clean = match bytes.get(end) {
            None => true,
            Some(&b's') => bytes.get(end + 1).is_none_or(|&b| !is_word(b)),
            Some(&b) => !is_word(b),
        };
        if starts_clean && ends_clean {
            return true;
        }
        from = start + 1;
        while !haystack.is_char_boundary(from) {
            from += 1;
        }
    }
    false
}
