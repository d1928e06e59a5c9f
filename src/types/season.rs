use crate::types::year_month::YearMonth;
use std::fmt;
use std::str::FromStr;

/// Overlapping three-month season used by the Oceanic Niño Index.
///
/// A season's value is published in the month after the season ends, so
/// `DJF 2021` becomes available in March 2021 and `NDJ 2020` in February 2021.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OniSeason {
    Djf,
    Jfm,
    Fma,
    Mam,
    Amj,
    Mjj,
    Jja,
    Jas,
    Aso,
    Son,
    Ond,
    Ndj,
}

impl OniSeason {
    pub const ALL: [OniSeason; 12] = [
        OniSeason::Djf,
        OniSeason::Jfm,
        OniSeason::Fma,
        OniSeason::Mam,
        OniSeason::Amj,
        OniSeason::Mjj,
        OniSeason::Jja,
        OniSeason::Jas,
        OniSeason::Aso,
        OniSeason::Son,
        OniSeason::Ond,
        OniSeason::Ndj,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OniSeason::Djf => "DJF",
            OniSeason::Jfm => "JFM",
            OniSeason::Fma => "FMA",
            OniSeason::Mam => "MAM",
            OniSeason::Amj => "AMJ",
            OniSeason::Mjj => "MJJ",
            OniSeason::Jja => "JJA",
            OniSeason::Jas => "JAS",
            OniSeason::Aso => "ASO",
            OniSeason::Son => "SON",
            OniSeason::Ond => "OND",
            OniSeason::Ndj => "NDJ",
        }
    }

    /// Position within the season year, 0 for DJF.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Month (1-12) in which the season's value is first available.
    pub fn available_month(self) -> u32 {
        (self.index() as u32 + 2) % 12 + 1
    }

    /// Years to add to the season's `YR` to get the year it becomes available.
    pub fn available_year_offset(self) -> i32 {
        match self {
            OniSeason::Ond | OniSeason::Ndj => 1,
            _ => 0,
        }
    }

    pub fn available_in(self, season_year: i32) -> YearMonth {
        YearMonth::new(
            season_year + self.available_year_offset(),
            self.available_month(),
        )
    }
}

impl FromStr for OniSeason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        OniSeason::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown ONI season '{trimmed}'"))
    }
}

impl fmt::Display for OniSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_months() {
        let expected = [3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 2];
        for (season, month) in OniSeason::ALL.into_iter().zip(expected) {
            assert_eq!(season.available_month(), month, "season {season}");
        }
    }

    #[test]
    fn test_available_in() {
        assert_eq!(OniSeason::Djf.available_in(2021), YearMonth::new(2021, 3));
        assert_eq!(OniSeason::Son.available_in(2020), YearMonth::new(2020, 12));
        assert_eq!(OniSeason::Ond.available_in(2020), YearMonth::new(2021, 1));
        assert_eq!(OniSeason::Ndj.available_in(2020), YearMonth::new(2021, 2));
    }

    #[test]
    fn test_parse() {
        assert_eq!("djf".parse::<OniSeason>(), Ok(OniSeason::Djf));
        assert_eq!(" NDJ".parse::<OniSeason>(), Ok(OniSeason::Ndj));
        assert!("XYZ".parse::<OniSeason>().is_err());
    }
}
