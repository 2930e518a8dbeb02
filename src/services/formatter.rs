//! Markdown answers assembled locally from search results.
//!
//! Pure text templating: a coarse keyword classifier picks the intent, then
//! the answer is stitched from an intent-specific introduction, facts pulled
//! out of the snippets, the cleaned snippets themselves and a source list.

use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::OnceLock;

use crate::models::SearchResult;

const MAX_FACTS_PER_KIND: usize = 5;
const MAX_POINT_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Definition,
    HowTo,
    Explanation,
    Comparison,
    Review,
    Historical,
    News,
    Benefits,
    Drawbacks,
    General,
}

/// Checked top to bottom; the first intent with a matching keyword wins.
const RULES: &[(QueryIntent, &[&str])] = &[
    (
        QueryIntent::Comparison,
        &[
            "vs",
            "versus",
            "compare",
            "compared to",
            "comparison",
            "difference between",
            "differences between",
            "better than",
        ],
    ),
    (
        QueryIntent::Explanation,
        &[
            "why",
            "explain",
            "explanation",
            "how does",
            "what causes",
            "reason for",
            "reasons for",
        ],
    ),
    (
        QueryIntent::HowTo,
        &[
            "how to",
            "how do i",
            "how can i",
            "how can",
            "steps to",
            "guide",
            "tutorial",
            "instructions",
        ],
    ),
    (
        QueryIntent::Definition,
        &[
            "what is",
            "what are",
            "whats",
            "define",
            "definition",
            "meaning of",
            "who is",
            "who was",
        ],
    ),
    (
        QueryIntent::Review,
        &["review", "reviews", "rating", "worth it", "opinion", "recommend"],
    ),
    (
        QueryIntent::Historical,
        &[
            "history",
            "historical",
            "origin",
            "origins",
            "when was",
            "when did",
            "invented",
            "founded",
        ],
    ),
    (
        QueryIntent::News,
        &[
            "news",
            "latest",
            "recent",
            "today",
            "this week",
            "update",
            "updates",
            "announced",
        ],
    ),
    (
        QueryIntent::Benefits,
        &["benefit", "benefits", "advantage", "advantages", "pros", "good for"],
    ),
    (
        QueryIntent::Drawbacks,
        &[
            "drawback",
            "drawbacks",
            "disadvantage",
            "disadvantages",
            "cons",
            "risk",
            "risks",
            "downside",
            "downsides",
            "side effects",
        ],
    ),
];

impl QueryIntent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::HowTo => "howto",
            Self::Explanation => "explanation",
            Self::Comparison => "comparison",
            Self::Review => "review",
            Self::Historical => "historical",
            Self::News => "news",
            Self::Benefits => "benefits",
            Self::Drawbacks => "drawbacks",
            Self::General => "general",
        }
    }

    const fn title(&self) -> &'static str {
        match self {
            Self::Definition => "Definition",
            Self::HowTo => "Guide",
            Self::Explanation => "Explanation",
            Self::Comparison => "Comparison",
            Self::Review => "Review",
            Self::Historical => "History",
            Self::News => "News",
            Self::Benefits => "Benefits",
            Self::Drawbacks => "Drawbacks",
            Self::General => "Overview",
        }
    }

    fn introduction(&self, subject: &str) -> String {
        match self {
            Self::Definition => format!("Here is what **{subject}** means, in brief."),
            Self::HowTo => format!("Below is a practical walkthrough for **{subject}**."),
            Self::Explanation => format!("This section explains the reasoning behind **{subject}**."),
            Self::Comparison => format!("The key differences for **{subject}** are summarised below."),
            Self::Review => format!("Here is a summary of opinions and assessments of **{subject}**."),
            Self::Historical => format!("A short look at the background and history of **{subject}**."),
            Self::News => format!("Recent coverage of **{subject}** is summarised below."),
            Self::Benefits => format!("These are the main advantages associated with **{subject}**."),
            Self::Drawbacks => format!("These are the main drawbacks and risks of **{subject}**."),
            Self::General => format!("Here is an overview of **{subject}**."),
        }
    }

    const fn closing(&self) -> &'static str {
        match self {
            Self::Definition => {
                "In short, the definition above captures the core idea; the sources below go into more depth."
            }
            Self::HowTo => {
                "Follow the steps in order and check the linked sources for details specific to your setup."
            }
            Self::Explanation => {
                "Understanding these underlying causes makes the topic much easier to reason about."
            }
            Self::Comparison => {
                "The better choice depends on your priorities; weigh the points above against your own needs."
            }
            Self::Review => {
                "Opinions vary, so consider several reviews before drawing a conclusion."
            }
            Self::Historical => {
                "Its history continues to shape how the subject is understood today."
            }
            Self::News => {
                "News moves quickly; check the sources for the most up-to-date information."
            }
            Self::Benefits => {
                "The benefits are real but depend on context; consider them alongside any drawbacks."
            }
            Self::Drawbacks => {
                "Being aware of these drawbacks helps in making a balanced decision."
            }
            Self::General => "The sources below provide further detail on this topic.",
        }
    }
}

fn normalize(query: &str) -> String {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '’')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Classifies a free-text query into one of the fixed answer intents.
#[must_use]
pub fn classify(query: &str) -> QueryIntent {
    let haystack = normalize(query);

    RULES
        .iter()
        .find(|(intent, keywords)| {
            keywords
                .iter()
                .any(|kw| haystack.contains(&format!(" {kw} ")))
                || (*intent == QueryIntent::Explanation && asks_how_something_works(&haystack))
        })
        .map_or(QueryIntent::General, |(intent, _)| *intent)
}

/// "how do magnets work", but not "how do i ..." which is a how-to.
fn asks_how_something_works(haystack: &str) -> bool {
    haystack.starts_with(" how do ") && !haystack.starts_with(" how do i ") && haystack.ends_with(" work ")
}

/// Strips the leading question phrase and trailing punctuation.
#[must_use]
pub fn extract_subject(query: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:what(?:'s|\s+is|\s+are|\s+was|\s+were)|who(?:'s|\s+is|\s+was|\s+are)|how\s+(?:to|do\s+i|do\s+you|can\s+i|can\s+you|does|do)|define|explain|tell\s+me\s+about|why\s+(?:is|are|do|does|did))\s+(?:(?:a|an|the)\s+)?",
        )
        .expect("Invalid regex")
    });

    let trimmed = query.trim();
    let stripped = re.replace(trimmed, "");
    let subject = stripped
        .trim()
        .trim_end_matches(['?', '.', '!'])
        .trim();

    let subject = if subject.is_empty() {
        trimmed.trim_end_matches(['?', '.', '!']).trim()
    } else {
        subject
    };

    capitalize(subject)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct KeyFacts {
    pub dates: Vec<String>,
    pub statistics: Vec<String>,
    pub measurements: Vec<String>,
}

impl KeyFacts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.statistics.is_empty() && self.measurements.is_empty()
    }
}

struct FactPatterns {
    year: Regex,
    percent: Regex,
    unit: Regex,
}

impl FactPatterns {
    fn get() -> &'static Self {
        static INSTANCE: OnceLock<FactPatterns> = OnceLock::new();
        INSTANCE.get_or_init(|| Self {
            year: Regex::new(r"\b(1[5-9]\d{2}|20\d{2})\b").expect("Invalid regex"),
            percent: Regex::new(r"\b\d+(?:\.\d+)?\s?%").expect("Invalid regex"),
            unit: Regex::new(
                r"\b\d+(?:[.,]\d+)?\s?(?:km/h|mph|km|kg|mg|cm|mm|m|miles|meters|metres|kilometers|kilograms|grams|pounds|lbs|GB|MB|TB|hours|minutes|seconds|days|years)\b",
            )
            .expect("Invalid regex"),
        })
    }
}

fn push_unique(target: &mut Vec<String>, value: &str) {
    let value = value.trim().to_string();
    if target.len() < MAX_FACTS_PER_KIND && !target.contains(&value) {
        target.push(value);
    }
}

/// Pulls years, percentages and measurements out of result snippets.
#[must_use]
pub fn extract_facts(results: &[SearchResult]) -> KeyFacts {
    let patterns = FactPatterns::get();
    let mut facts = KeyFacts::default();

    for result in results {
        let text = &result.snippet;
        for m in patterns.year.find_iter(text) {
            push_unique(&mut facts.dates, m.as_str());
        }
        for m in patterns.percent.find_iter(text) {
            push_unique(&mut facts.statistics, m.as_str());
        }
        for m in patterns.unit.find_iter(text) {
            push_unique(&mut facts.measurements, m.as_str());
        }
    }

    facts
}

/// Removes dates, navigation phrases and ellipses that search engines add.
#[must_use]
pub fn clean_snippet(snippet: &str) -> String {
    static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
    static BOILERPLATE: OnceLock<Regex> = OnceLock::new();

    let date_prefix = DATE_PREFIX.get_or_init(|| {
        Regex::new(
            r"^\s*(?:[A-Z][a-z]{2,8}\.?\s+\d{1,2},\s+\d{4}|\d{1,2}\s+[A-Z][a-z]{2,8}\s+\d{4}|\d+\s+(?:minutes?|hours?|days?|weeks?)\s+ago)\s*[—–·-]+\s*",
        )
        .expect("Invalid regex")
    });
    let boilerplate = BOILERPLATE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:read more|click here|learn more|see more|continue reading|full article)\b\.?|\.\.\.|…",
        )
        .expect("Invalid regex")
    });

    let text = date_prefix.replace(snippet, "");
    let text = boilerplate.replace_all(&text, " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = text.trim_matches(|c: char| c == '-' || c == '·' || c.is_whitespace());

    truncate_chars(text, MAX_POINT_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let cut = cut.rfind(' ').map_or(cut.as_str(), |i| &cut[..i]);
    format!("{}…", cut.trim_end())
}

/// Builds the full Markdown answer for `query`.
#[must_use]
pub fn format_response(query: &str, results: &[SearchResult], main_points: usize) -> String {
    let intent = classify(query);
    let subject = extract_subject(query);
    let mut out = String::new();

    let _ = writeln!(out, "## {}: {}\n", intent.title(), subject);
    out.push_str(&intent.introduction(&subject));
    if results.is_empty() {
        out.push_str(
            " No live search results were available, so this answer is based on general guidance only.",
        );
    }
    out.push_str("\n\n");

    let facts = extract_facts(results);
    if !facts.is_empty() {
        out.push_str("### Key Information\n\n");
        for (label, values) in [
            ("Dates", &facts.dates),
            ("Statistics", &facts.statistics),
            ("Measurements", &facts.measurements),
        ] {
            if !values.is_empty() {
                let _ = writeln!(out, "- **{label}:** {}", values.join(", "));
            }
        }
        out.push('\n');
    }

    let points: Vec<String> = results
        .iter()
        .take(main_points)
        .map(|r| clean_snippet(&r.snippet))
        .filter(|p| !p.is_empty())
        .collect();

    if !points.is_empty() {
        out.push_str("### Main Points\n\n");
        for point in &points {
            let _ = writeln!(out, "- {point}");
        }
        out.push('\n');
    }

    out.push_str(intent.closing());
    out.push_str("\n\n### Sources\n\n");

    if results.is_empty() {
        out.push_str("_No external sources were used for this answer._\n");
    } else {
        for (i, result) in results.iter().enumerate() {
            let title = if result.title.trim().is_empty() {
                result.url.as_str()
            } else {
                result.title.trim()
            };
            let _ = writeln!(out, "{}. [{}]({})", i + 1, title, result.url);
        }
    }

    out
}
