use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::util::slug_to_title;

pub const PROBLEM_BASE_URL: &str = "https://leetcode.com/problems/";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// One entry of the pool. Extra fields in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub slug: String,
    pub difficulty: Difficulty,
}

impl Problem {
    pub fn new(slug: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            slug: slug.into(),
            difficulty,
        }
    }

    pub fn title(&self) -> String {
        slug_to_title(&self.slug)
    }

    pub fn url(&self) -> String {
        format!("{PROBLEM_BASE_URL}{}/", self.slug)
    }

    pub fn formatted(&self) -> FormattedProblem {
        FormattedProblem {
            title: self.title(),
            url: self.url(),
            difficulty: self.difficulty,
        }
    }
}

/// Display shape of a drawn problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedProblem {
    pub title: String,
    pub url: String,
    pub difficulty: Difficulty,
}

/// Requested number of problems per difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mix {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl Default for Mix {
    fn default() -> Self {
        Self {
            easy: 1,
            medium: 2,
            hard: 1,
        }
    }
}

impl Mix {
    pub fn new(easy: usize, medium: usize, hard: usize) -> Self {
        Self { easy, medium, hard }
    }

    pub fn count(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    pub fn total(&self) -> usize {
        self.easy
            .saturating_add(self.medium)
            .saturating_add(self.hard)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestDefaults {
    pub duration_minutes: Option<u64>,
    pub mix: Option<Mix>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PoolMeta {
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolDocument {
    List(Vec<Problem>),
    Object {
        #[serde(default)]
        problems: Vec<Problem>,
        #[serde(default, rename = "defaultContest")]
        default_contest: Option<ContestDefaults>,
        #[serde(default)]
        meta: Option<PoolMeta>,
    },
}

/// A resolved pool: the problem list plus whatever contest defaults the
/// document carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    pub problems: Vec<Problem>,
    pub defaults: ContestDefaults,
    pub name: Option<String>,
}

impl Pool {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self {
            problems,
            ..Default::default()
        }
    }

    /// Accepts either a bare array of problems or an object with a
    /// `problems` field.
    pub fn from_json(json: &str) -> Result<Self, PoolError> {
        let doc: PoolDocument = serde_json::from_str(json)?;
        Ok(match doc {
            PoolDocument::List(problems) => Pool::new(problems),
            PoolDocument::Object {
                problems,
                default_contest,
                meta,
            } => Pool {
                problems,
                defaults: default_contest.unwrap_or_default(),
                name: meta.and_then(|m| m.name),
            },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn stratum(&self, difficulty: Difficulty) -> impl Iterator<Item = &Problem> {
        self.problems
            .iter()
            .filter(move |p| p.difficulty == difficulty)
    }
}
