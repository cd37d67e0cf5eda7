//! NYC Council introductions: `{year}-{number:04}` (displayed `Int 0123-2022`).

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

use super::{host_is, segments, IdError, IdGrammar};
use crate::legislation::{LegislationId, LegislationType};

const GRAMMAR: &str = "nyc-council";

#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:19|20)\d{2})-(\d{4})$").expect("council id pattern is valid")
});

#[allow(clippy::expect_used)]
static INTRO_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})-((?:19|20)\d{2})$").expect("intro slug pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CouncilIntro {
    pub year: i32,
    pub number: u32,
}

impl CouncilIntro {
    #[must_use]
    pub fn display_id(&self) -> String {
        format!("Int {:04}-{}", self.number, self.year)
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("https://intro.nyc/{:04}-{}", self.number, self.year)
    }

    #[must_use]
    pub fn id(&self) -> LegislationId {
        LegislationId::new(self.to_string())
    }

    /// Parse an intro.nyc link. Legistar detail pages carry opaque GUIDs and
    /// are not recognised.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        if !host_is(url, "intro.nyc") {
            return None;
        }
        let segs = segments(url);
        let [slug] = segs.as_slice() else {
            return None;
        };
        let caps = INTRO_SLUG.captures(slug)?;
        let number: u32 = caps.get(1)?.as_str().parse().ok().filter(|n| *n > 0)?;
        let year: i32 = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { year, number })
    }
}

impl fmt::Display for CouncilIntro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04}", self.year, self.number)
    }
}

impl FromStr for CouncilIntro {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ID_PATTERN
            .captures(s)
            .ok_or_else(|| IdError::new(GRAMMAR, s, "expected YEAR-NNNN"))?;
        let year = caps[1]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "bad year"))?;
        let number: u32 = caps[2]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "bad number"))?;
        if number == 0 {
            return Err(IdError::new(GRAMMAR, s, "intro numbers start at 1"));
        }
        Ok(Self { year, number })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CouncilGrammar;

impl IdGrammar for CouncilGrammar {
    fn name(&self) -> &'static str {
        GRAMMAR
    }

    fn validate(&self, id: &LegislationId) -> Result<(), IdError> {
        id.as_str().parse::<CouncilIntro>().map(|_| ())
    }

    fn from_url(&self, url: &Url) -> Option<LegislationId> {
        CouncilIntro::from_url(url).map(|intro| intro.id())
    }

    fn display_id(&self, id: &LegislationId) -> Result<String, IdError> {
        id.as_str()
            .parse::<CouncilIntro>()
            .map(|intro| intro.display_id())
    }

    fn url_for(&self, id: &LegislationId) -> Result<String, IdError> {
        id.as_str().parse::<CouncilIntro>().map(|intro| intro.url())
    }

    fn session_year(&self, id: &LegislationId) -> Result<i32, IdError> {
        id.as_str().parse::<CouncilIntro>().map(|intro| intro.year)
    }

    fn kind(&self, id: &LegislationId) -> Result<LegislationType, IdError> {
        self.validate(id).map(|()| LegislationType::Bill)
    }
}
