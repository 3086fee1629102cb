//! Built-in rubric for CSCI 1436 Programming Fundamentals I, Assignment #1

use super::rules::{GroupSpec, LengthBonus, LiteralSpec, PatternSpec, RuleSpec, TermSpec, Tiers};
use super::QuestionSpec;

pub const COURSE: &str = "CSCI 1436";
pub const ASSIGNMENT: &str = "Assignment #1";

const DEFINITION_TERMS: &[(&str, &[&str])] = &[
    ("repl", &["read", "eval", "print", "loop", "interactive", "command"]),
    ("java api", &["application", "programming", "interface", "library", "classes", "methods"]),
    ("jdk", &["development", "kit", "tools", "compiler", "runtime", "java"]),
    ("variable", &["storage", "container", "value", "memory", "data", "holds"]),
    ("data type", &["type", "kind", "category", "int", "string", "boolean", "specifies"]),
    ("variable declaration", &["create", "define", "specify", "type", "name", "declares"]),
    ("assignment statement", &["assign", "value", "variable", "=", "store", "gives"]),
    ("expression", &["combination", "evaluate", "value", "operation", "calculate", "produces"]),
    ("constant", &["unchanging", "fixed", "final", "immutable", "same", "cannot change"]),
    ("literal", &["value", "directly", "written", "code", "constant", "actual"]),
];

const LANGUAGE_CONCEPTS: &[(&str, &[&str])] = &[
    ("abstraction", &["abstract", "hide", "complexity", "simple"]),
    ("portability", &["portable", "platform", "independent", "cross"]),
    ("readability", &["readable", "understand", "clear", "human"]),
    ("productivity", &["faster", "efficient", "quick", "productive"]),
    ("maintenance", &["maintain", "modify", "update", "change"]),
    ("syntax", &["syntax", "english", "natural", "easier"]),
];

const DECLARATIONS: &[(&str, &str)] = &[
    (r"double\s+length\s*=\s*23\.6", "double length = 23.6"),
    (r"float\s+width\s*=\s*14\.7[fF]?", "float width = 14.7f"),
    (r"long\s+distance\s*=\s*3172900000[lL]?", "long distance = 3172900000L"),
    (r"final\s+int\s+speedOfSound\s*=\s*343", "final int speedOfSound = 343"),
];

const MODULO_RESULTS: &[(&str, &str)] = &[
    ("6", "40 % 17"),
    ("0", "120 % 60"),
    ("23", "(65 + 8) % 25"),
    ("6", "(97 * 3 + 6) % 25"),
];

const PROGRAM_ELEMENTS: &[(&str, &[&str])] = &[
    ("input", &["input", "scanner", "readline", "nextdouble"]),
    ("radius", &["radius", "r"]),
    ("volume", &["volume", "vol"]),
    ("formula", &["4/3", "4.0/3", "math.pi", "pi"]),
    ("power", &["math.pow", "pow", "r*r*r", "^3", "**3"]),
    ("output", &["print", "system.out", "println"]),
];

const DEBUGGING_ISSUES: &[(&str, &[&str])] = &[
    ("division by zero", &["division by zero", "divide by zero", "/0", "zero division"]),
    ("integer overflow", &["overflow", "integer overflow", "exceed", "too large", "maximum"]),
    ("type mismatch", &["type mismatch", "long to int", "conversion", "cast", "incompatible"]),
];

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn groups(table: &[(&str, &[&str])]) -> Vec<GroupSpec> {
    table
        .iter()
        .map(|(label, keywords)| GroupSpec {
            label: label.to_string(),
            keywords: strings(keywords),
            min_hits: 1,
        })
        .collect()
}

/// The six questions of Assignment #1 (100 points)
pub fn assignment_one() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec {
            id: "q1_definitions".to_string(),
            number: 1,
            prompt: "Briefly define (one to two sentences) each of the following ten terms:\n\
                     - REPL\n- Java API\n- JDK\n- Variable\n- Data type\n- Variable declaration\n\
                     - Assignment statement\n- Expression\n- Constant\n- Literal"
                .to_string(),
            points: 40,
            rule: RuleSpec::KeywordCoverage {
                terms: DEFINITION_TERMS
                    .iter()
                    .map(|(term, keywords)| TermSpec {
                        term: term.to_string(),
                        keywords: strings(keywords),
                    })
                    .collect(),
                tiers: Tiers::default(),
            },
        },
        QuestionSpec {
            id: "q2_languages".to_string(),
            number: 2,
            prompt: "Why is it ideal to write programs in a high-level language instead of a \
                     low-level language?"
                .to_string(),
            points: 12,
            rule: RuleSpec::ConceptGroups {
                groups: groups(LANGUAGE_CONCEPTS),
                points_each: 2,
                length_bonus: Some(LengthBonus {
                    min_words: 20,
                    points: 2,
                }),
            },
        },
        QuestionSpec {
            id: "q3_declarations".to_string(),
            number: 3,
            prompt: "Provide variable or constant declarations and initializations for:\n\
                     - double length = 23.6\n- float width = 14.7\n\
                     - long distance = 3172900000\n- final int speedOfSound = 343"
                .to_string(),
            points: 12,
            rule: RuleSpec::PatternMatch {
                patterns: DECLARATIONS
                    .iter()
                    .map(|(pattern, description)| PatternSpec {
                        pattern: pattern.to_string(),
                        description: description.to_string(),
                    })
                    .collect(),
                points_each: 3,
            },
        },
        QuestionSpec {
            id: "q4_modulo".to_string(),
            number: 4,
            prompt: "Indicate the result of performing the remainder operation:\n\
                     - 40 % 17\n- 120 % 60\n- (65 + 8) % 25\n- (97 * 3 + 6) % 25"
                .to_string(),
            points: 12,
            rule: RuleSpec::LiteralPresence {
                literals: MODULO_RESULTS
                    .iter()
                    .map(|(expected, label)| LiteralSpec {
                        expected: expected.to_string(),
                        label: label.to_string(),
                    })
                    .collect(),
                points_each: 3,
            },
        },
        QuestionSpec {
            id: "q5_programming".to_string(),
            number: 5,
            prompt: "Write a short program that requests a radius and calculates the volume of \
                     a sphere using: (4/3) * π * r^3"
                .to_string(),
            points: 12,
            rule: RuleSpec::ConceptGroups {
                groups: groups(PROGRAM_ELEMENTS),
                points_each: 2,
                length_bonus: None,
            },
        },
        QuestionSpec {
            id: "q6_debugging".to_string(),
            number: 6,
            prompt: "Identify the problem in each code snippet:\n\
                     - int userInput = 20;\n- double calculation = 50 / (userInput – 20);\n\
                     - int total = 2000000000;\n- int withdrawal = 1000000000;\n\
                     - total += withdrawal;\n- long toPluto = 3315000000L;\n\
                     - int toTheSun = 92955807;\n- int totalDistance = toPluto + toTheSun;"
                .to_string(),
            points: 12,
            rule: RuleSpec::ConceptGroups {
                groups: groups(DEBUGGING_ISSUES),
                points_each: 4,
                length_bonus: None,
            },
        },
    ]
}
