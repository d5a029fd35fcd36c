//! Assessment catalogue records and the test-type vocabulary.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Path segment that the catalogue sometimes inserts in front of `/products/`.
/// URLs that differ only by it point at the same assessment.
const SOLUTIONS_SEGMENT: &str = "/solutions/products/";
const PRODUCTS_SEGMENT: &str = "/products/";

/// Catalogue test-type category, identified by a one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TestType {
    Ability,
    Biodata,
    Competencies,
    Development,
    Exercises,
    Knowledge,
    Personality,
    Simulations,
}

impl TestType {
    pub const ALL: [TestType; 8] = [
        TestType::Ability,
        TestType::Biodata,
        TestType::Competencies,
        TestType::Development,
        TestType::Exercises,
        TestType::Knowledge,
        TestType::Personality,
        TestType::Simulations,
    ];

    pub fn code(self) -> char {
        match self {
            TestType::Ability => 'A',
            TestType::Biodata => 'B',
            TestType::Competencies => 'C',
            TestType::Development => 'D',
            TestType::Exercises => 'E',
            TestType::Knowledge => 'K',
            TestType::Personality => 'P',
            TestType::Simulations => 'S',
        }
    }

    /// Human-readable category name as shown in the catalogue
    pub fn label(self) -> &'static str {
        match self {
            TestType::Ability => "Ability & Aptitude",
            TestType::Biodata => "Biodata & Situational Judgment",
            TestType::Competencies => "Competencies",
            TestType::Development => "Development & 360",
            TestType::Exercises => "Assessment Exercises",
            TestType::Knowledge => "Knowledge & Skills",
            TestType::Personality => "Personality & Behavior",
            TestType::Simulations => "Simulations",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl FromStr for TestType {
    type Err = Error;

    /// Accepts a one-letter code (any case) or a full category label.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(t) = Self::from_code(c) {
                return Ok(t);
            }
        }
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Serialization(format!("unknown test type: {s:?}")))
    }
}

impl TryFrom<String> for TestType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TestType> for String {
    fn from(value: TestType) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The categories of one assessment, in catalogue order, without repeats.
///
/// Deserializes from either a list of codes (`["K", "P"]`) or the
/// space-separated form the catalogue scrape produces (`"K P"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTestTypes", into = "Vec<TestType>")]
pub struct TestTypes(SmallVec<[TestType; 4]>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTestTypes {
    Codes(String),
    List(Vec<String>),
}

impl TryFrom<RawTestTypes> for TestTypes {
    type Error = Error;

    fn try_from(raw: RawTestTypes) -> Result<Self> {
        let parsed = match raw {
            RawTestTypes::Codes(s) => s
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<TestType>>>()?,
            RawTestTypes::List(items) => items
                .iter()
                .map(|s| s.parse())
                .collect::<Result<Vec<TestType>>>()?,
        };
        Ok(parsed.into_iter().collect())
    }
}

impl From<TestTypes> for Vec<TestType> {
    fn from(value: TestTypes) -> Self {
        value.0.into_vec()
    }
}

impl FromIterator<TestType> for TestTypes {
    fn from_iter<I: IntoIterator<Item = TestType>>(iter: I) -> Self {
        let mut types = SmallVec::new();
        for t in iter {
            if !types.contains(&t) {
                types.push(t);
            }
        }
        TestTypes(types)
    }
}

impl TestTypes {
    pub fn iter(&self) -> impl Iterator<Item = TestType> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, t: TestType) -> bool {
        self.0.contains(&t)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TestTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

/// One catalogued assessment. Row `i` of the corpus index holds its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub test_type: TestTypes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_type_full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AssessmentRecord {
    pub fn new(id: u64, name: impl Into<String>, url: impl Into<String>, test_type: TestTypes) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            test_type,
            test_type_full: None,
            description: None,
        }
    }

    /// The deduplication key for this record
    pub fn canonical_url(&self) -> Cow<'_, str> {
        canonical_url(&self.url)
    }
}

/// Folds the `/solutions/products/` spelling of a catalogue URL onto `/products/`.
pub fn canonical_url(url: &str) -> Cow<'_, str> {
    if url.contains(SOLUTIONS_SEGMENT) {
        Cow::Owned(url.replace(SOLUTIONS_SEGMENT, PRODUCTS_SEGMENT))
    } else {
        Cow::Borrowed(url)
    }
}
