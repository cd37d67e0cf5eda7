//! U.S. Congress bill numbers: `{congress}-{kind}{number}`.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

use super::{host_is, segments, IdError, IdGrammar};
use crate::legislation::{LegislationId, LegislationType};

const GRAMMAR: &str = "congress";

#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9]\d{0,2})-(hr|hres|hjres|hconres|s|sres|sjres|sconres)([1-9]\d{0,4})$")
        .expect("congress id pattern is valid")
});

#[allow(clippy::expect_used)]
static CONGRESS_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9]\d{0,2})(st|nd|rd|th)-congress$").expect("congress segment pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CongressChamber {
    House,
    Senate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CongressBillKind {
    HouseBill,
    HouseResolution,
    HouseJointResolution,
    HouseConcurrentResolution,
    SenateBill,
    SenateResolution,
    SenateJointResolution,
    SenateConcurrentResolution,
}

impl CongressBillKind {
    const ALL: [Self; 8] = [
        Self::HouseBill,
        Self::HouseResolution,
        Self::HouseJointResolution,
        Self::HouseConcurrentResolution,
        Self::SenateBill,
        Self::SenateResolution,
        Self::SenateJointResolution,
        Self::SenateConcurrentResolution,
    ];

    /// Code used in canonical ids (`hr`, `sjres`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::HouseBill => "hr",
            Self::HouseResolution => "hres",
            Self::HouseJointResolution => "hjres",
            Self::HouseConcurrentResolution => "hconres",
            Self::SenateBill => "s",
            Self::SenateResolution => "sres",
            Self::SenateJointResolution => "sjres",
            Self::SenateConcurrentResolution => "sconres",
        }
    }

    /// Path segment on congress.gov.
    #[must_use]
    pub const fn url_segment(self) -> &'static str {
        match self {
            Self::HouseBill => "house-bill",
            Self::HouseResolution => "house-resolution",
            Self::HouseJointResolution => "house-joint-resolution",
            Self::HouseConcurrentResolution => "house-concurrent-resolution",
            Self::SenateBill => "senate-bill",
            Self::SenateResolution => "senate-resolution",
            Self::SenateJointResolution => "senate-joint-resolution",
            Self::SenateConcurrentResolution => "senate-concurrent-resolution",
        }
    }

    #[must_use]
    pub const fn display_prefix(self) -> &'static str {
        match self {
            Self::HouseBill => "H.R.",
            Self::HouseResolution => "H.Res.",
            Self::HouseJointResolution => "H.J.Res.",
            Self::HouseConcurrentResolution => "H.Con.Res.",
            Self::SenateBill => "S.",
            Self::SenateResolution => "S.Res.",
            Self::SenateJointResolution => "S.J.Res.",
            Self::SenateConcurrentResolution => "S.Con.Res.",
        }
    }

    #[must_use]
    pub const fn chamber(self) -> CongressChamber {
        match self {
            Self::HouseBill
            | Self::HouseResolution
            | Self::HouseJointResolution
            | Self::HouseConcurrentResolution => CongressChamber::House,
            _ => CongressChamber::Senate,
        }
    }

    #[must_use]
    pub const fn legislation_type(self) -> LegislationType {
        match self {
            Self::HouseBill | Self::SenateBill => LegislationType::Bill,
            _ => LegislationType::Resolution,
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    fn from_url_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.url_segment() == segment)
    }
}

/// A parsed congressional bill number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CongressBill {
    pub congress: u16,
    pub kind: CongressBillKind,
    pub number: u32,
}

impl CongressBill {
    /// First calendar year of a congress (the 118th began in 2023).
    #[must_use]
    pub fn first_year(congress: u16) -> i32 {
        1789 + 2 * (i32::from(congress) - 1)
    }

    #[must_use]
    pub fn display_id(&self) -> String {
        format!("{} {}", self.kind.display_prefix(), self.number)
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://www.congress.gov/bill/{}-congress/{}/{}",
            ordinal(self.congress),
            self.kind.url_segment(),
            self.number
        )
    }

    #[must_use]
    pub fn id(&self) -> LegislationId {
        LegislationId::new(self.to_string())
    }

    /// Parse a congress.gov bill URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Option<Self> {
        if !host_is(url, "congress.gov") {
            return None;
        }
        let segs = segments(url);
        let [first, congress, kind, number, ..] = segs.as_slice() else {
            return None;
        };
        if *first != "bill" {
            return None;
        }
        let congress: u16 = CONGRESS_SEGMENT.captures(congress)?.get(1)?.as_str().parse().ok()?;
        let kind = CongressBillKind::from_url_segment(kind)?;
        let number: u32 = number.parse().ok().filter(|n| *n > 0)?;
        Some(Self {
            congress,
            kind,
            number,
        })
    }
}

impl fmt::Display for CongressBill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}{}", self.congress, self.kind.code(), self.number)
    }
}

impl FromStr for CongressBill {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ID_PATTERN
            .captures(s)
            .ok_or_else(|| IdError::new(GRAMMAR, s, "expected CONGRESS-KINDNUMBER"))?;
        let congress = caps[1]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "congress out of range"))?;
        let kind = CongressBillKind::from_code(&caps[2])
            .ok_or_else(|| IdError::new(GRAMMAR, s, "unknown bill kind"))?;
        let number = caps[3]
            .parse()
            .map_err(|_| IdError::new(GRAMMAR, s, "number out of range"))?;
        Ok(Self {
            congress,
            kind,
            number,
        })
    }
}

fn ordinal(n: u16) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Grammar for one chamber of Congress. Ids of the other chamber are rejected.
#[derive(Debug, Clone, Copy)]
pub struct CongressGrammar {
    chamber: CongressChamber,
}

impl CongressGrammar {
    #[must_use]
    pub const fn house() -> Self {
        Self {
            chamber: CongressChamber::House,
        }
    }

    #[must_use]
    pub const fn senate() -> Self {
        Self {
            chamber: CongressChamber::Senate,
        }
    }

    fn parse(&self, id: &LegislationId) -> Result<CongressBill, IdError> {
        let bill: CongressBill = id.as_str().parse()?;
        if bill.kind.chamber() != self.chamber {
            return Err(IdError::new(GRAMMAR, id.as_str(), "bill belongs to the other chamber"));
        }
        Ok(bill)
    }
}

impl IdGrammar for CongressGrammar {
    fn name(&self) -> &'static str {
        GRAMMAR
    }

    fn validate(&self, id: &LegislationId) -> Result<(), IdError> {
        self.parse(id).map(|_| ())
    }

    fn from_url(&self, url: &Url) -> Option<LegislationId> {
        CongressBill::from_url(url)
            .filter(|bill| bill.kind.chamber() == self.chamber)
            .map(|bill| bill.id())
    }

    fn display_id(&self, id: &LegislationId) -> Result<String, IdError> {
        self.parse(id).map(|bill| bill.display_id())
    }

    fn url_for(&self, id: &LegislationId) -> Result<String, IdError> {
        self.parse(id).map(|bill| bill.url())
    }

    fn session_year(&self, id: &LegislationId) -> Result<i32, IdError> {
        self.parse(id).map(|bill| CongressBill::first_year(bill.congress))
    }

    fn kind(&self, id: &LegislationId) -> Result<LegislationType, IdError> {
        self.parse(id).map(|bill| bill.kind.legislation_type())
    }
}
