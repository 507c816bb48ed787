// Reference tables standing in for a real registry/reputation backend.
// Injected read-only: scorers hold an Arc<ReferenceData> and never mutate it,
// so a live data source can replace the seed tables without touching them.

use std::collections::{HashMap, HashSet};

/// A curated journalist-registry entry.
#[derive(Debug, Clone)]
pub struct JournalistRecord {
    pub outlets: Vec<String>,
    pub score: f64,
    pub verified: bool,
}

/// WHOIS-like registration facts for a domain.
#[derive(Debug, Clone)]
pub struct WhoisRecord {
    pub age_years: Option<f64>,
    pub country: Option<String>,
    pub registered: bool,
}

/// Score returned for a domain with no authority entry.
const DEFAULT_DOMAIN_AUTHORITY: f64 = 50.0;

pub struct ReferenceData {
    journalists: HashMap<String, JournalistRecord>,
    domain_authority: HashMap<String, f64>,
    blacklist: HashSet<String>,
    publisher_scores: HashMap<String, f64>,
    whois: HashMap<String, WhoisRecord>,
}

impl ReferenceData {
    pub fn new(
        journalists: HashMap<String, JournalistRecord>,
        domain_authority: HashMap<String, f64>,
        blacklist: HashSet<String>,
        publisher_scores: HashMap<String, f64>,
        whois: HashMap<String, WhoisRecord>,
    ) -> Self {
        Self {
            journalists: journalists
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
            domain_authority: domain_authority
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
            blacklist: blacklist.iter().map(|k| normalize_key(k)).collect(),
            publisher_scores: publisher_scores
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
            whois: whois
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
        }
    }

    /// Exact lookup in the journalist registry (case/whitespace-normalized).
    pub fn find_journalist(&self, name: &str) -> Option<&JournalistRecord> {
        self.journalists.get(&normalize_key(name))
    }

    /// Domain-authority score; 50 when the domain is absent or unknown.
    pub fn domain_authority(&self, domain: Option<&str>) -> f64 {
        domain
            .and_then(|d| self.domain_authority.get(&normalize_key(d)))
            .copied()
            .unwrap_or(DEFAULT_DOMAIN_AUTHORITY)
    }

    pub fn is_blacklisted(&self, domain: Option<&str>) -> bool {
        domain
            .map(|d| self.blacklist.contains(&normalize_key(d)))
            .unwrap_or(false)
    }

    /// Reputation-table base score, when one exists for the domain.
    pub fn publisher_base_score(&self, domain: Option<&str>) -> Option<f64> {
        domain.and_then(|d| self.publisher_scores.get(&normalize_key(d)).copied())
    }

    /// WHOIS facts. A known domain returns its record; an unknown domain is
    /// assumed registered with no age data; no domain at all means no
    /// registration record.
    pub fn whois(&self, domain: Option<&str>) -> WhoisRecord {
        let Some(domain) = domain else {
            return WhoisRecord {
                age_years: None,
                country: None,
                registered: false,
            };
        };
        self.whois
            .get(&normalize_key(domain))
            .cloned()
            .unwrap_or(WhoisRecord {
                age_years: None,
                country: Some("Unknown".to_string()),
                registered: true,
            })
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl Default for ReferenceData {
    /// Seed tables. A production deployment replaces these with a registry
    /// service, a NewsGuard/MBFC-style reputation feed, and live WHOIS.
    fn default() -> Self {
        let journalists = [
            ("john smith", &["Reuters", "AP"][..], 82.0, true),
            ("jane doe", &["BBC", "Guardian"][..], 88.0, true),
            ("carlos mendez", &["El País", "NYT"][..], 79.0, true),
            ("priya sharma", &["NDTV", "The Hindu"][..], 77.0, true),
            ("michael chen", &["WSJ", "Bloomberg"][..], 85.0, true),
            ("sarah johnson", &["Washington Post"][..], 81.0, true),
            ("freedom patriot", &["InfoWars"][..], 12.0, false),
            ("truth seeker 99", &["NaturalNews"][..], 8.0, false),
            ("real news daily", &["Unknown"][..], 15.0, false),
        ]
        .into_iter()
        .map(|(name, outlets, score, verified)| {
            (
                name.to_string(),
                JournalistRecord {
                    outlets: outlets.iter().map(|o| o.to_string()).collect(),
                    score,
                    verified,
                },
            )
        })
        .collect();

        let domain_authority = [
            ("reuters.com", 95.0),
            ("apnews.com", 94.0),
            ("bbc.com", 92.0),
            ("theguardian.com", 88.0),
            ("nytimes.com", 90.0),
            ("washingtonpost.com", 89.0),
            ("wsj.com", 88.0),
            ("bloomberg.com", 87.0),
            ("cnn.com", 82.0),
            ("foxnews.com", 75.0),
            ("ndtv.com", 72.0),
            ("thehindu.com", 74.0),
            ("infowars.com", 5.0),
            ("naturalnews.com", 3.0),
            ("beforeitsnews.com", 2.0),
            ("breitbart.com", 38.0),
            ("dailycaller.com", 42.0),
        ]
        .into_iter()
        .map(|(domain, score)| (domain.to_string(), score))
        .collect();

        let blacklist = [
            "infowars.com",
            "naturalnews.com",
            "beforeitsnews.com",
            "yournewswire.com",
            "worldnewsdailyreport.com",
            "thelastlineofdefense.org",
            "empirenews.net",
            "abcnews.com.co",
            "huzlers.com",
            "nationalreport.net",
            // satire, still flagged
            "theonion.com",
            "clickhole.com",
            "thebeaverton.com",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let publisher_scores = [
            ("reuters.com", 96.0),
            ("apnews.com", 95.0),
            ("bbc.com", 91.0),
            ("theguardian.com", 87.0),
            ("nytimes.com", 89.0),
            ("washingtonpost.com", 88.0),
            ("wsj.com", 87.0),
            ("bloomberg.com", 86.0),
            ("cnn.com", 79.0),
            ("ndtv.com", 71.0),
            ("thehindu.com", 74.0),
            ("foxnews.com", 62.0),
            ("infowars.com", 3.0),
            ("naturalnews.com", 2.0),
            ("beforeitsnews.com", 4.0),
        ]
        .into_iter()
        .map(|(domain, score)| (domain.to_string(), score))
        .collect();

        let whois = [
            ("reuters.com", Some(29.0), "US", true),
            ("apnews.com", Some(28.0), "US", true),
            ("bbc.com", Some(28.0), "GB", true),
            ("theguardian.com", Some(27.0), "GB", true),
            ("nytimes.com", Some(30.0), "US", true),
            ("washingtonpost.com", Some(28.0), "US", true),
            ("wsj.com", Some(28.0), "US", true),
            ("bloomberg.com", Some(27.0), "US", true),
            ("cnn.com", Some(28.0), "US", true),
            ("ndtv.com", Some(23.0), "IN", true),
            ("thehindu.com", Some(25.0), "IN", true),
            ("infowars.com", Some(12.0), "US", true),
            ("naturalnews.com", Some(15.0), "US", true),
            ("beforeitsnews.com", Some(8.0), "Unknown", true),
            ("yournewswire.com", Some(3.0), "Unknown", false),
        ]
        .into_iter()
        .map(|(domain, age_years, country, registered)| {
            (
                domain.to_string(),
                WhoisRecord {
                    age_years,
                    country: Some(country.to_string()),
                    registered,
                },
            )
        })
        .collect();

        Self::new(
            journalists,
            domain_authority,
            blacklist,
            publisher_scores,
            whois,
        )
    }
}
