//! Public listing search filters.
//!
//! Filters arrive as URL query pairs. Every filter is optional and
//! independent; the search always restricts results to active listings.

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::{ListingType, PropertyType};

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Room-count filter: `"3"` means exactly three, `"4+"` means four or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFilter {
    Exactly(i32),
    AtLeast(i32),
}

impl FromStr for CountFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, at_least) = match s.strip_suffix('+') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let n: i32 = digits
            .parse()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| AppError::validation(format!("Invalid room count: {s}")))?;
        Ok(if at_least {
            CountFilter::AtLeast(n)
        } else {
            CountFilter::Exactly(n)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySearch {
    /// Case-insensitive substring matched against city, title and location.
    pub text: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub bedrooms: Option<CountFilter>,
    pub bathrooms: Option<CountFilter>,
    /// A listing must carry every amenity named here.
    pub amenities: Vec<String>,
    pub limit: usize,
}

impl Default for PropertySearch {
    fn default() -> Self {
        Self {
            text: None,
            min_price: None,
            max_price: None,
            property_type: None,
            listing_type: None,
            bedrooms: None,
            bathrooms: None,
            amenities: Vec::new(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl PropertySearch {
    /// Parse a raw query string such as `city=austin&bedrooms=4%2B&amenities=Gym`.
    pub fn from_query(query: Option<&str>) -> Result<Self, AppError> {
        match query {
            Some(q) => Self::from_pairs(url::form_urlencoded::parse(q.as_bytes())),
            None => Ok(Self::default()),
        }
    }

    /// Build filters from decoded key/value pairs. Unknown keys are ignored,
    /// empty values mean "no filter".
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, AppError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut search = Self::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "city" | "q" => search.text = Some(value.to_string()),
                "minPrice" => search.min_price = Some(parse_price("minPrice", value)?),
                "maxPrice" => search.max_price = Some(parse_price("maxPrice", value)?),
                "type" => search.property_type = Some(value.parse()?),
                "listingType" => search.listing_type = Some(value.parse()?),
                "bedrooms" => search.bedrooms = Some(value.parse()?),
                "bathrooms" => search.bathrooms = Some(value.parse()?),
                "amenities" | "amenities[]" => search.amenities.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string),
                ),
                "limit" => {
                    let limit: usize = value
                        .parse()
                        .map_err(|_| AppError::validation(format!("Invalid limit: {value}")))?;
                    search.limit = limit.clamp(1, MAX_SEARCH_LIMIT);
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        search.amenities.retain(|a| seen.insert(a.clone()));

        if let (Some(min), Some(max)) = (search.min_price, search.max_price)
            && min > max
        {
            return Err(AppError::validation(format!(
                "minPrice ({min}) must not exceed maxPrice ({max})"
            )));
        }

        Ok(search)
    }

    /// `%text%` pattern for `ILIKE`, with wildcard characters escaped.
    pub fn text_pattern(&self) -> Option<String> {
        self.text.as_ref().map(|t| {
            let escaped = t
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }
}

fn parse_price(field: &str, value: &str) -> Result<f64, AppError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| AppError::validation(format!("Invalid {field}: {value}")))
}
