//! STEM subject detection and topic suggestions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// High school STEM subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    Math,
}

impl Subject {
    /// Detection order. Earlier subjects win ties.
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::Math,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::Math => "math",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s.trim().to_lowercase())
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Subject::Physics => &[
                "force", "motion", "energy", "newton", "gravity", "mass", "velocity",
                "acceleration", "momentum", "friction", "wave", "light", "electricity",
                "magnetism", "pressure", "work", "power", "thermodynamics",
            ],
            Subject::Chemistry => &[
                "atom", "molecule", "chemical", "reaction", "bond", "element", "compound", "acid",
                "base", "periodic", "ion", "electron", "proton", "neutron", "covalent", "ionic",
                "oxidation", "reduction", "mole", "stoichiometry", "ph", "catalyst",
            ],
            Subject::Biology => &[
                "cell", "dna", "gene", "evolution", "organism", "photosynthesis", "respiration",
                "protein", "mitosis", "meiosis", "enzyme", "ecosystem", "species", "bacteria",
                "virus", "tissue", "organ", "genetics",
            ],
            Subject::Math => &[
                "equation", "algebra", "geometry", "calculus", "derivative", "integral",
                "function", "graph", "polynomial", "trigonometry", "sine", "cosine",
                "pythagorean", "quadratic", "linear", "slope", "angle", "triangle",
            ],
        }
    }

    /// The MMLU configuration holding this subject's questions.
    pub fn mmlu_subject(&self) -> &'static str {
        match self {
            Subject::Physics => "high_school_physics",
            Subject::Chemistry => "high_school_chemistry",
            Subject::Biology => "high_school_biology",
            Subject::Math => "high_school_mathematics",
        }
    }

    fn suggestions(&self) -> &'static str {
        match self {
            Subject::Physics => {
                "• Newton's laws of motion\n\
                 • Kinetic and potential energy\n\
                 • Gravity and weight\n\
                 • Force, mass, and acceleration\n\
                 • Work and power"
            }
            Subject::Chemistry => {
                "• Atomic structure\n\
                 • Chemical bonding (ionic, covalent)\n\
                 • pH and acids/bases\n\
                 • Chemical reactions\n\
                 • The periodic table"
            }
            Subject::Biology => {
                "• Photosynthesis\n\
                 • Cellular respiration\n\
                 • DNA structure\n\
                 • Mitosis and meiosis\n\
                 • Cell structure"
            }
            Subject::Math => {
                "• Quadratic equations\n\
                 • Pythagorean theorem\n\
                 • Linear functions\n\
                 • Trigonometry basics\n\
                 • Algebra fundamentals"
            }
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the subject by counting keyword occurrences (substring match).
///
/// Returns `None` when no keyword appears.
pub fn detect_subject(question: &str) -> Option<Subject> {
    let lower = question.to_lowercase();
    let mut best: Option<(Subject, usize)> = None;

    for subject in Subject::ALL {
        let hits = subject
            .keywords()
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count();
        if hits > 0 && best.map_or(true, |(_, best_hits)| hits > best_hits) {
            best = Some((subject, hits));
        }
    }

    best.map(|(subject, _)| subject)
}

const NUMBER_WORDS: &[(&str, u8)] = &[
    ("first", 1),
    ("1st", 1),
    ("one", 1),
    ("second", 2),
    ("2nd", 2),
    ("two", 2),
    ("third", 3),
    ("3rd", 3),
    ("three", 3),
];

/// Detect which numbered law (1 to 3) a question refers to.
///
/// Number words are matched as substrings in a fixed order, then standalone
/// digits are considered.
pub fn detect_law_number(question: &str) -> Option<u8> {
    let lower = question.to_lowercase();

    if let Some((_, n)) = NUMBER_WORDS.iter().find(|(word, _)| lower.contains(word)) {
        return Some(*n);
    }

    lower
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .find_map(|token| match token {
            "1" => Some(1),
            "2" => Some(2),
            "3" => Some(3),
            _ => None,
        })
}

/// Bulleted topic suggestions for the no-match reply.
pub fn suggestions(subject: Option<Subject>) -> &'static str {
    match subject {
        Some(subject) => subject.suggestions(),
        None => {
            "• Physics: motion, energy, forces\n\
             • Chemistry: atoms, bonding, reactions\n\
             • Biology: cells, DNA, photosynthesis\n\
             • Math: algebra, geometry, calculus"
        }
    }
}
