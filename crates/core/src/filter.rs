use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::types::{MediaKind, SortMode};

/// Entries strictly before this year fall into the `year=Older` bucket.
/// Fixed cutoff, not derived from the current date.
pub const OLDER_CUTOFF: i64 = 2016;

/// Default page size when the request omits or mangles `limit`.
pub const DEFAULT_LIMIT: i64 = 20;

/// Type dimension of a listing request. `All` imposes no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Movie,
    Tv,
}

impl TypeFilter {
    /// Unknown values fall back to `All`, never an error.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "movie" => Self::Movie,
            "tv" => Self::Tv,
            _ => Self::All,
        }
    }

    pub fn matches(self, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::Movie => kind == MediaKind::Movie,
            Self::Tv => kind == MediaKind::Tv,
        }
    }
}

/// Year dimension: an exact 4-digit year or the `"Older"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearFilter {
    Exact(i64),
    Older,
}

impl YearFilter {
    /// Strict boundary parse: anything that is neither a 4-digit numeral nor
    /// the literal `Older` is a validation error.
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        if s == "Older" {
            return Ok(Self::Older);
        }
        match s.parse::<i64>() {
            Ok(y) if (1000..=9999).contains(&y) => Ok(Self::Exact(y)),
            _ => Err(ApiError::Validation(vec![FieldError::new(
                "year",
                "must be a 4-digit year or \"Older\"",
            )])),
        }
    }

    pub fn matches(self, year: i64) -> bool {
        match self {
            Self::Exact(y) => year == y,
            Self::Older => year < OLDER_CUTOFF,
        }
    }
}

/// The immutable set of query parameters for one catalog listing request.
///
/// Absent dimensions impose no constraint; present dimensions compose
/// conjunctively.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub search: Option<String>,
    pub kind: TypeFilter,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub year: Option<YearFilter>,
    pub sort: SortMode,
    pub page: i64,
    pub limit: i64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            search: None,
            kind: TypeFilter::All,
            genre: None,
            country: None,
            year: None,
            sort: SortMode::Latest,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FilterSpec {
    /// Build a well-formed spec from raw query parameters.
    ///
    /// Unknown `type`/`sort` values fall back to their defaults; out-of-range
    /// `page`/`limit` clamp; a malformed `year` is rejected here so the query
    /// engine can assume a valid spec.
    pub fn from_raw(raw: RawFilters) -> Result<Self, ApiError> {
        let search = raw
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let kind = raw
            .r#type
            .as_deref()
            .map(TypeFilter::parse_lenient)
            .unwrap_or_default();

        let genre = raw
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        let country = raw
            .country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let year = match raw.year.as_deref().filter(|y| !y.is_empty()) {
            Some(y) => Some(YearFilter::parse(y)?),
            None => None,
        };

        let sort = raw
            .sort
            .as_deref()
            .map(SortMode::parse_lenient)
            .unwrap_or_default();

        let page = raw.page.filter(|&p| p >= 1).unwrap_or(1);
        let limit = raw.limit.filter(|&l| l >= 1).unwrap_or(DEFAULT_LIMIT);

        Ok(Self {
            search,
            kind,
            genre,
            country,
            year,
            sort,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Raw query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilters {
    pub search: Option<String>,
    pub r#type: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_raw_filters_yield_defaults() {
        let spec = FilterSpec::from_raw(RawFilters::default()).unwrap();
        assert_eq!(spec, FilterSpec::default());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn unknown_type_and_sort_fall_back() {
        let spec = FilterSpec::from_raw(RawFilters {
            r#type: Some("documentary".into()),
            sort: Some("newest".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(spec.kind, TypeFilter::All);
        assert_eq!(spec.sort, SortMode::Latest);
    }

    #[test]
    fn older_sentinel_parses() {
        assert_eq!(YearFilter::parse("Older").unwrap(), YearFilter::Older);
        assert!(YearFilter::Older.matches(2015));
        assert!(!YearFilter::Older.matches(2016));
    }

    #[test]
    fn malformed_year_is_rejected() {
        assert!(YearFilter::parse("20x4").is_err());
        assert!(YearFilter::parse("123").is_err());
        assert!(YearFilter::parse("older").is_err());
    }

    #[test]
    fn page_and_limit_clamp_to_defaults() {
        let spec = FilterSpec::from_raw(RawFilters {
            page: Some(0),
            limit: Some(-5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn genre_and_country_are_trimmed_like_search() {
        let spec = FilterSpec::from_raw(RawFilters {
            genre: Some(" Drama ".into()),
            country: Some("  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(spec.genre.as_deref(), Some("Drama"));
        assert_eq!(spec.country, None);
    }

    #[test]
    fn blank_search_imposes_no_constraint() {
        let spec = FilterSpec::from_raw(RawFilters {
            search: Some("   ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(spec.search, None);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let spec = FilterSpec {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(spec.offset(), 20);
    }
}
