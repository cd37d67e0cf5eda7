//! New York State Legislature print numbers: `{session year}-{S|A}{number}[amendment]`.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

use super::{host_is, segments, IdError, IdGrammar};
use crate::legislation::{LegislationId, LegislationType};

const GRAMMAR: &str = "ny-state";

#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-([SA])([1-9]\d{0,5})([A-Z])?$").expect("ny id pattern is valid")
});

#[allow(clippy::expect_used)]
static PRINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)([SA])0*([1-9]\d{0,5})([A-Z])?$").expect("ny print pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NyChamber {
    Senate,
    Assembly,
}

impl NyChamber {
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Senate => 'S',
            Self::Assembly => 'A',
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "S" | "s" => Some(Self::Senate),
            "A" | "a" => Some(Self::Assembly),
            _ => None,
        }
    }
}

/// A parsed NY print number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NyBill {
    /// First (odd) year of the two-year session.
    pub session_year: i32,
    pub chamber: NyChamber,
    pub number: u32,
    pub amendment: Option<char>,
}

impl NyBill {
    /// Sessions start in odd years; an even year belongs to the session that
    /// began the year before.
    #[must_use]
    pub const fn session_start(year: i32) -> i32 {
        if year % 2 == 0 {
            year - 1
        } else {
            year
        }
    }

    /// Print number without the session (`"S5130A"`).
    #[must_use]
    pub fn print_no(&self) -> String {
        let mut out = format!("{}{}", self.chamber.letter(), self.number);
        if let Some(amendment) = self.amendment {
            out.push(amendment);
        }
        out
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://www.nysenate.gov/legislation/bills/{}/{}",
            self.session_year,
            self.print_no()
        )
    }

    #[must_use]
    pub fn id(&self) -> LegislationId {
        LegislationId::new(self.to_string())
    }

    /// Parse a nysenate.gov bill page or a nyassembly.gov `?bn=&term=` link.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        if host_is(url, "nysenate.gov") {
            let segs = segments(url);
            let ["legislation", "bills", year, print, ..] = segs.as_slice() else {
                return None;
            };
            return Self::from_parts(year, print);
        }
        if host_is(url, "nyassembly.gov") || host_is(url, "assembly.state.ny.us") {
            let mut print = None;
            let mut term = None;
            for (key, value) in url.query_pairs() {
                match key.as_ref() {
                    "bn" => print = Some(value.into_owned()),
                    "term" => term = Some(value.into_owned()),
                    _ => {}
                }
            }
            return Self::from_parts(&term?, &print?);
        }
        None
    }

    fn from_parts(year: &str, print: &str) -> Option<Self> {
        let year: i32 = year.parse().ok().filter(|y| (1000..=9999).contains(y))?;
        let caps = PRINT_PATTERN.captures(print)?;
        Some(Self {
            session_year: Self::session_start(year),
            chamber: NyChamber::from_letter(caps.get(1)?.as_str())?,
            number: caps.get(2)?.as_str().parse().ok()?,
            amendment: caps
                .get(3)
                .and_then(|m| m.as_str().chars().next())
                .map(|c| c.to_ascii_uppercase()),
        })
    }
}

impl fmt::Display for NyBill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.session_year, self.print_no())
    }
}

impl FromStr for NyBill {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ID_PATTERN
            .captures(s)
            .ok_or_else(|| IdError::new(GRAMMAR, s, "expected YEAR-{S|A}NUMBER"))?;
        let session_year: i32 = caps[1]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "bad year"))?;
        if session_year % 2 == 0 {
            return Err(IdError::new(GRAMMAR, s, "session year must be odd"));
        }
        let chamber = NyChamber::from_letter(&caps[2])
            .ok_or_else(|| IdError::new(GRAMMAR, s, "unknown chamber"))?;
        let number = caps[3]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "number out of range"))?;
        let amendment = caps.get(4).and_then(|m| m.as_str().chars().next());
        Ok(Self {
            session_year,
            chamber,
            number,
            amendment,
        })
    }
}

/// Grammar for one NY chamber.
#[derive(Debug, Clone, Copy)]
pub struct NyStateGrammar {
    chamber: NyChamber,
}

impl NyStateGrammar {
    #[must_use]
    pub const fn senate() -> Self {
        Self {
            chamber: NyChamber::Senate,
        }
    }

    #[must_use]
    pub const fn assembly() -> Self {
        Self {
            chamber: NyChamber::Assembly,
        }
    }

    fn parse(&self, id: &LegislationId) -> Result<NyBill, IdError> {
        let bill: NyBill = id.as_str().parse()?;
        if bill.chamber != self.chamber {
            return Err(IdError::new(GRAMMAR, id.as_str(), "bill belongs to the other chamber"));
        }
        Ok(bill)
    }
}

impl IdGrammar for NyStateGrammar {
    fn name(&self) -> &'static str {
        GRAMMAR
    }

    fn validate(&self, id: &LegislationId) -> Result<(), IdError> {
        self.parse(id).map(|_| ())
    }

    fn from_url(&self, url: &Url) -> Option<LegislationId> {
        NyBill::from_url(url)
            .filter(|bill| bill.chamber == self.chamber)
            .map(|bill| bill.id())
    }

    fn display_id(&self, id: &LegislationId) -> Result<String, IdError> {
        self.parse(id).map(|bill| bill.print_no())
    }

    fn url_for(&self, id: &LegislationId) -> Result<String, IdError> {
        self.parse(id).map(|bill| bill.url())
    }

    fn session_year(&self, id: &LegislationId) -> Result<i32, IdError> {
        self.parse(id).map(|bill| bill.session_year)
    }

    fn kind(&self, id: &LegislationId) -> Result<LegislationType, IdError> {
        self.parse(id).map(|_| LegislationType::Bill)
    }
}
