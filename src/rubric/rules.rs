//! Scoring rules: declarative rule tables and the single evaluator that runs them.
//!
//! A rule is described as data (`RuleSpec`, read from config) and compiled once
//! into a `ScoringRule` when the rubric is built. Matching is case-insensitive
//! substring containment for keywords, which can over-match (a keyword that is
//! part of a longer word still counts).

use crate::error::{GradeError, Result};
use crate::Finding;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// A term and the keywords expected in its definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSpec {
    pub term: String,
    pub keywords: Vec<String>,
}

/// Points per keyword-coverage tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tiers {
    /// Three or more keywords matched
    pub full: u32,
    /// Exactly two keywords matched
    pub good: u32,
    /// Exactly one keyword matched
    pub partial: u32,
    /// Term present, no keyword matched
    pub mentioned: u32,
}

impl Default for Tiers {
    fn default() -> Self {
        Self {
            full: 4,
            good: 3,
            partial: 2,
            mentioned: 1,
        }
    }
}

/// A regular expression and the declaration it represents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub pattern: String,
    pub description: String,
}

/// An expected literal (e.g. a numeric result) and what produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralSpec {
    pub expected: String,
    #[serde(default)]
    pub label: String,
}

/// A concept identified by any of its keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub label: String,
    pub keywords: Vec<String>,
    /// Keywords that must appear before the group counts
    #[serde(default = "default_min_hits")]
    pub min_hits: usize,
}

fn default_min_hits() -> usize {
    1
}

/// Bonus for answers of substantial length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthBonus {
    pub min_words: usize,
    pub points: u32,
}

/// Rule table as written in config, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RuleSpec {
    #[serde(rename_all = "camelCase")]
    KeywordCoverage {
        terms: Vec<TermSpec>,
        #[serde(default)]
        tiers: Tiers,
    },
    #[serde(rename_all = "camelCase")]
    PatternMatch {
        patterns: Vec<PatternSpec>,
        points_each: u32,
    },
    #[serde(rename_all = "camelCase")]
    LiteralPresence {
        literals: Vec<LiteralSpec>,
        points_each: u32,
    },
    #[serde(rename_all = "camelCase")]
    ConceptGroups {
        groups: Vec<GroupSpec>,
        points_each: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length_bonus: Option<LengthBonus>,
    },
}

/// Rule kind, for listings and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    KeywordCoverage,
    PatternMatch,
    LiteralPresence,
    ConceptGroups,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::KeywordCoverage => write!(f, "keyword-coverage"),
            RuleKind::PatternMatch => write!(f, "pattern-match"),
            RuleKind::LiteralPresence => write!(f, "literal-presence"),
            RuleKind::ConceptGroups => write!(f, "concept-groups"),
        }
    }
}

/// A regex compiled case-insensitively
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub description: String,
}

/// A compiled scoring rule, ready to evaluate answers
#[derive(Debug, Clone)]
pub enum ScoringRule {
    KeywordCoverage {
        terms: Vec<TermSpec>,
        tiers: Tiers,
    },
    PatternMatch {
        patterns: Vec<CompiledPattern>,
        points_each: u32,
    },
    LiteralPresence {
        literals: Vec<LiteralSpec>,
        points_each: u32,
    },
    ConceptGroups {
        groups: Vec<GroupSpec>,
        points_each: u32,
        length_bonus: Option<LengthBonus>,
    },
}

/// Points and findings produced by one rule for one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub points: u32,
    pub findings: Vec<Finding>,
}

impl ScoringRule {
    /// Compile a rule table. Keywords are lowercased here so evaluation only
    /// lowercases the answer; patterns are compiled case-insensitively.
    pub fn compile(question_id: &str, spec: &RuleSpec) -> Result<Self> {
        let invalid = |what: &str| {
            GradeError::InvalidConfig(format!("question `{}`: {}", question_id, what))
        };

        match spec {
            RuleSpec::KeywordCoverage { terms, tiers } => {
                if terms.is_empty() {
                    return Err(invalid("keyword-coverage rule has no terms"));
                }
                let mut compiled = Vec::with_capacity(terms.len());
                for t in terms {
                    let term = t.term.trim().to_lowercase();
                    if term.is_empty() {
                        return Err(invalid("empty term"));
                    }
                    compiled.push(TermSpec {
                        term,
                        keywords: lowercase_keywords(&t.keywords)
                            .ok_or_else(|| invalid("empty keyword"))?,
                    });
                }
                Ok(ScoringRule::KeywordCoverage {
                    terms: compiled,
                    tiers: *tiers,
                })
            }
            RuleSpec::PatternMatch {
                patterns,
                points_each,
            } => {
                if patterns.is_empty() {
                    return Err(invalid("pattern-match rule has no patterns"));
                }
                let mut compiled = Vec::with_capacity(patterns.len());
                for p in patterns {
                    if p.pattern.is_empty() {
                        return Err(invalid("empty pattern"));
                    }
                    let regex = RegexBuilder::new(&p.pattern)
                        .case_insensitive(true)
                        .build()
                        .map_err(|source| GradeError::InvalidPattern {
                            question: question_id.to_string(),
                            pattern: p.pattern.clone(),
                            source,
                        })?;
                    compiled.push(CompiledPattern {
                        regex,
                        description: p.description.clone(),
                    });
                }
                Ok(ScoringRule::PatternMatch {
                    patterns: compiled,
                    points_each: *points_each,
                })
            }
            RuleSpec::LiteralPresence {
                literals,
                points_each,
            } => {
                if literals.is_empty() {
                    return Err(invalid("literal-presence rule has no literals"));
                }
                if literals.iter().any(|l| l.expected.is_empty()) {
                    return Err(invalid("empty expected literal"));
                }
                Ok(ScoringRule::LiteralPresence {
                    literals: literals.clone(),
                    points_each: *points_each,
                })
            }
            RuleSpec::ConceptGroups {
                groups,
                points_each,
                length_bonus,
            } => {
                if groups.is_empty() {
                    return Err(invalid("concept-groups rule has no groups"));
                }
                let mut compiled = Vec::with_capacity(groups.len());
                for g in groups {
                    if g.keywords.is_empty() {
                        return Err(invalid(&format!("group `{}` has no keywords", g.label)));
                    }
                    compiled.push(GroupSpec {
                        label: g.label.clone(),
                        keywords: lowercase_keywords(&g.keywords)
                            .ok_or_else(|| invalid("empty keyword"))?,
                        min_hits: g.min_hits.clamp(1, g.keywords.len()),
                    });
                }
                Ok(ScoringRule::ConceptGroups {
                    groups: compiled,
                    points_each: *points_each,
                    length_bonus: *length_bonus,
                })
            }
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            ScoringRule::KeywordCoverage { .. } => RuleKind::KeywordCoverage,
            ScoringRule::PatternMatch { .. } => RuleKind::PatternMatch,
            ScoringRule::LiteralPresence { .. } => RuleKind::LiteralPresence,
            ScoringRule::ConceptGroups { .. } => RuleKind::ConceptGroups,
        }
    }

    /// Score an answer. The result is capped at `max_points`.
    pub fn evaluate(&self, answer: &str, max_points: u32) -> RuleOutcome {
        let (points, findings) = match self {
            ScoringRule::KeywordCoverage { terms, tiers } => keyword_coverage(answer, terms, tiers),
            ScoringRule::PatternMatch {
                patterns,
                points_each,
            } => pattern_match(answer, patterns, *points_each),
            ScoringRule::LiteralPresence {
                literals,
                points_each,
            } => literal_presence(answer, literals, *points_each),
            ScoringRule::ConceptGroups {
                groups,
                points_each,
                length_bonus,
            } => concept_groups(answer, groups, *points_each, length_bonus.as_ref()),
        };

        if points > max_points {
            tracing::debug!(raw = points, cap = max_points, "capping rule score");
        }
        RuleOutcome {
            points: points.min(max_points),
            findings,
        }
    }
}

fn lowercase_keywords(keywords: &[String]) -> Option<Vec<String>> {
    keywords
        .iter()
        .map(|k| {
            let k = k.to_lowercase();
            if k.is_empty() {
                None
            } else {
                Some(k)
            }
        })
        .collect()
}

fn keyword_coverage(answer: &str, terms: &[TermSpec], tiers: &Tiers) -> (u32, Vec<Finding>) {
    let text = answer.to_lowercase();
    let mut points: u32 = 0;
    let mut findings = Vec::with_capacity(terms.len());

    for t in terms {
        let name = t.term.to_uppercase();
        if !text.contains(t.term.as_str()) {
            findings.push(Finding::missing(format!("{}: not found", name)));
            continue;
        }

        let matched = t
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();
        tracing::debug!(term = %t.term, matched, "keyword coverage");

        let finding = match matched {
            0 => {
                points = points.saturating_add(tiers.mentioned);
                Finding::partial(format!("{}: mentioned, needs a definition", name))
            }
            1 => {
                points = points.saturating_add(tiers.partial);
                Finding::partial(format!("{}: partially defined", name))
            }
            2 => {
                points = points.saturating_add(tiers.good);
                Finding::partial(format!("{}: good definition", name))
            }
            _ => {
                points = points.saturating_add(tiers.full);
                Finding::met(format!("{}: well defined", name))
            }
        };
        findings.push(finding);
    }

    (points, findings)
}

fn pattern_match(answer: &str, patterns: &[CompiledPattern], points_each: u32) -> (u32, Vec<Finding>) {
    let mut points: u32 = 0;
    let findings = patterns
        .iter()
        .map(|p| {
            if p.regex.is_match(answer) {
                points = points.saturating_add(points_each);
                Finding::met(p.description.clone())
            } else {
                Finding::missing(format!("missing or incorrect: {}", p.description))
            }
        })
        .collect();
    (points, findings)
}

fn literal_presence(answer: &str, literals: &[LiteralSpec], points_each: u32) -> (u32, Vec<Finding>) {
    let mut points: u32 = 0;
    let findings = literals
        .iter()
        .map(|l| {
            let subject = if l.label.is_empty() {
                "expected".to_string()
            } else {
                l.label.clone()
            };
            if answer.contains(l.expected.as_str()) {
                points = points.saturating_add(points_each);
                Finding::met(format!("{} = {}", subject, l.expected))
            } else {
                Finding::missing(format!("{} ≠ {}", subject, l.expected))
            }
        })
        .collect();
    (points, findings)
}

fn concept_groups(
    answer: &str,
    groups: &[GroupSpec],
    points_each: u32,
    length_bonus: Option<&LengthBonus>,
) -> (u32, Vec<Finding>) {
    let text = answer.to_lowercase();
    let mut points: u32 = 0;
    let mut findings = Vec::with_capacity(groups.len() + 1);

    for g in groups {
        let hits = g
            .keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();
        if hits >= g.min_hits {
            points = points.saturating_add(points_each);
            findings.push(Finding::met(g.label.clone()));
        } else if hits > 0 {
            findings.push(Finding::partial(format!(
                "{}: {} of {} expected keywords",
                g.label, hits, g.min_hits
            )));
        } else {
            findings.push(Finding::missing(format!("{}: not identified", g.label)));
        }
    }

    if let Some(bonus) = length_bonus {
        let words = answer.split_whitespace().count();
        if words >= bonus.min_words {
            points = points.saturating_add(bonus.points);
            findings.push(Finding::met(format!(
                "substantial answer ({} words, +{})",
                words, bonus.points
            )));
        } else {
            findings.push(Finding::missing(format!(
                "answer shorter than {} words",
                bonus.min_words
            )));
        }
    }

    (points, findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FindingStatus;

    fn term(term: &str, keywords: &[&str]) -> TermSpec {
        TermSpec {
            term: term.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn keyword_rule() -> ScoringRule {
        ScoringRule::compile(
            "q1",
            &RuleSpec::KeywordCoverage {
                terms: vec![
                    term("REPL", &["read", "eval", "loop", "interactive"]),
                    term("constant", &["fixed", "final", "unchanging"]),
                ],
                tiers: Tiers::default(),
            },
        )
        .unwrap()
    }

    fn declarations_rule() -> ScoringRule {
        let p = |pattern: &str, description: &str| PatternSpec {
            pattern: pattern.to_string(),
            description: description.to_string(),
        };
        ScoringRule::compile(
            "q3",
            &RuleSpec::PatternMatch {
                patterns: vec![
                    p(r"double\s+length\s*=\s*23\.6", "double length = 23.6"),
                    p(r"float\s+width\s*=\s*14\.7[fF]?", "float width = 14.7f"),
                    p(r"long\s+distance\s*=\s*3172900000[lL]?", "long distance = 3172900000L"),
                    p(r"final\s+int\s+speedOfSound\s*=\s*343", "final int speedOfSound = 343"),
                ],
                points_each: 3,
            },
        )
        .unwrap()
    }

    fn modulo_rule() -> ScoringRule {
        let l = |expected: &str, label: &str| LiteralSpec {
            expected: expected.to_string(),
            label: label.to_string(),
        };
        ScoringRule::compile(
            "q4",
            &RuleSpec::LiteralPresence {
                literals: vec![
                    l("6", "40 % 17"),
                    l("0", "120 % 60"),
                    l("23", "(65 + 8) % 25"),
                    l("6", "(97 * 3 + 6) % 25"),
                ],
                points_each: 3,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_keyword_tiers() {
        let rule = keyword_rule();
        // REPL with read+eval+loop (3) and constant with final (1)
        let out = rule.evaluate("A REPL will read, eval and loop. A constant is final.", 40);
        assert_eq!(out.points, 4 + 2);
        assert_eq!(out.findings[0].status, FindingStatus::Met);
        assert_eq!(out.findings[1].status, FindingStatus::Partial);
    }

    #[test]
    fn test_keyword_term_mentioned_without_keywords() {
        let out = keyword_rule().evaluate("repl", 40);
        assert_eq!(out.points, 1);
        assert!(out.findings[0].message.contains("REPL"));
        assert_eq!(out.findings[1].status, FindingStatus::Missing);
    }

    #[test]
    fn test_keyword_two_matches_is_good_tier() {
        let out = keyword_rule().evaluate("constant: fixed and final", 40);
        assert_eq!(out.points, 3);
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        // "interactive" contains no other keyword; "REPLs" contains the term
        let out = keyword_rule().evaluate("REPLs are INTERACTIVE", 40);
        assert_eq!(out.points, 2);
    }

    #[test]
    fn test_keyword_score_capped() {
        let out = keyword_rule().evaluate("repl read eval loop; constant fixed final unchanging", 5);
        assert_eq!(out.points, 5);
    }

    #[test]
    fn test_huge_points_each_saturates() {
        let p = |pattern: &str| PatternSpec {
            pattern: pattern.to_string(),
            description: pattern.to_string(),
        };
        let rule = ScoringRule::compile(
            "big",
            &RuleSpec::PatternMatch {
                patterns: vec![p("a"), p("b")],
                points_each: u32::MAX / 2 + 1,
            },
        )
        .unwrap();
        assert_eq!(rule.evaluate("ab", u32::MAX).points, u32::MAX);
        assert_eq!(rule.evaluate("ab", 12).points, 12);
        assert!(rule.evaluate("ab", u32::MAX).points >= rule.evaluate("a", u32::MAX).points);
    }

    #[test]
    fn test_huge_tiers_saturate() {
        let rule = ScoringRule::compile(
            "big",
            &RuleSpec::KeywordCoverage {
                terms: vec![term("alpha", &[]), term("beta", &[])],
                tiers: Tiers {
                    full: u32::MAX,
                    good: u32::MAX,
                    partial: u32::MAX,
                    mentioned: u32::MAX,
                },
            },
        )
        .unwrap();
        assert_eq!(rule.evaluate("alpha beta", u32::MAX).points, u32::MAX);
    }

    #[test]
    fn test_declarations_example_scores_half() {
        let out = declarations_rule()
            .evaluate("double length = 23.6;\nfinal int speedOfSound = 343;", 12);
        assert_eq!(out.points, 6);
        let met: Vec<_> = out
            .findings
            .iter()
            .filter(|f| f.status == FindingStatus::Met)
            .collect();
        assert_eq!(met.len(), 2);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let out = declarations_rule().evaluate("DOUBLE LENGTH=23.6 FLOAT width = 14.7F", 12);
        assert_eq!(out.points, 6);
    }

    #[test]
    fn test_literal_entries_checked_independently() {
        let out = modulo_rule().evaluate("40%17=6, 120%60=0", 12);
        // "6" satisfies both entries expecting 6; "23" absent
        assert_eq!(out.points, 9);
        assert_eq!(out.findings[2].status, FindingStatus::Missing);
        assert_eq!(out.findings[2].message, "(65 + 8) % 25 ≠ 23");
    }

    #[test]
    fn test_empty_answer_scores_zero_everywhere() {
        for rule in [keyword_rule(), declarations_rule(), modulo_rule()] {
            let out = rule.evaluate("", 40);
            assert_eq!(out.points, 0);
            assert!(out.findings.iter().all(|f| f.status == FindingStatus::Missing));
        }
    }

    #[test]
    fn test_concept_groups_min_hits_and_bonus() {
        let rule = ScoringRule::compile(
            "q6",
            &RuleSpec::ConceptGroups {
                groups: vec![
                    GroupSpec {
                        label: "division by zero".to_string(),
                        keywords: vec!["divide".into(), "zero".into()],
                        min_hits: 2,
                    },
                    GroupSpec {
                        label: "overflow".to_string(),
                        keywords: vec!["overflow".into()],
                        min_hits: 1,
                    },
                ],
                points_each: 4,
                length_bonus: Some(LengthBonus {
                    min_words: 5,
                    points: 2,
                }),
            },
        )
        .unwrap();

        let out = rule.evaluate("zero overflow", 12);
        assert_eq!(out.points, 4);
        assert_eq!(out.findings[0].status, FindingStatus::Partial);
        assert_eq!(out.findings[2].status, FindingStatus::Missing);

        let out = rule.evaluate("you divide by zero and then overflow happens", 12);
        assert_eq!(out.points, 10);
    }

    #[test]
    fn test_min_hits_clamped_to_keyword_count() {
        let rule = ScoringRule::compile(
            "q",
            &RuleSpec::ConceptGroups {
                groups: vec![GroupSpec {
                    label: "x".to_string(),
                    keywords: vec!["abc".into()],
                    min_hits: 5,
                }],
                points_each: 1,
                length_bonus: None,
            },
        )
        .unwrap();
        assert_eq!(rule.evaluate("abc", 1).points, 1);
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = ScoringRule::compile(
            "q3",
            &RuleSpec::PatternMatch {
                patterns: vec![PatternSpec {
                    pattern: "double(".to_string(),
                    description: "broken".to_string(),
                }],
                points_each: 3,
            },
        )
        .unwrap_err();
        assert!(matches!(err, GradeError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_tables_rejected() {
        let err = ScoringRule::compile(
            "q1",
            &RuleSpec::KeywordCoverage {
                terms: vec![],
                tiers: Tiers::default(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("q1"));

        assert!(ScoringRule::compile(
            "q4",
            &RuleSpec::LiteralPresence {
                literals: vec![LiteralSpec {
                    expected: String::new(),
                    label: String::new(),
                }],
                points_each: 3,
            },
        )
        .is_err());
    }

    #[test]
    fn test_rule_spec_json_shape() {
        let spec: RuleSpec = serde_json::from_str(
            r#"{"kind": "pattern-match", "pointsEach": 3,
                "patterns": [{"pattern": "int\\s+x", "description": "int x"}]}"#,
        )
        .unwrap();
        let rule = ScoringRule::compile("q", &spec).unwrap();
        assert_eq!(rule.kind(), RuleKind::PatternMatch);
        assert_eq!(rule.kind().to_string(), "pattern-match");

        let json = serde_json::to_string(&RuleSpec::ConceptGroups {
            groups: vec![],
            points_each: 2,
            length_bonus: Some(LengthBonus {
                min_words: 20,
                points: 2,
            }),
        })
        .unwrap();
        assert!(json.contains("\"kind\":\"concept-groups\""));
        assert!(json.contains("\"lengthBonus\":{\"minWords\":20"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn earned_never_exceeds_max(text in ".{0,200}", max in 0u32..50) {
                for rule in [keyword_rule(), declarations_rule(), modulo_rule()] {
                    let out = rule.evaluate(&text, max);
                    prop_assert!(out.points <= max);
                }
            }

            #[test]
            fn keyword_coverage_is_monotonic(
                text in "[a-z ]{0,80}",
                idx in 0usize..4,
            ) {
                let keywords = ["read", "eval", "loop", "interactive"];
                let rule = keyword_rule();
                let before = rule.evaluate(&text, 40).points;
                let after = rule.evaluate(&format!("{} {}", text, keywords[idx]), 40).points;
                prop_assert!(after >= before);
            }

            #[test]
            fn pattern_score_is_sum_of_present(mask in proptest::collection::vec(any::<bool>(), 4)) {
                let lines = [
                    "double length = 23.6",
                    "float width = 14.7f",
                    "long distance = 3172900000L",
                    "final int speedOfSound = 343",
                ];
                let mut chosen: Vec<&str> = lines
                    .iter()
                    .zip(&mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(l, _)| *l)
                    .collect();
                let expected = chosen.len() as u32 * 3;
                let forward = declarations_rule().evaluate(&chosen.join("\n"), 12).points;
                chosen.reverse();
                let reversed = declarations_rule().evaluate(&chosen.join("\n"), 12).points;
                prop_assert_eq!(forward, expected);
                prop_assert_eq!(reversed, expected);
            }
        }
    }
}
