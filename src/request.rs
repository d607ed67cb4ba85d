use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

static RE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{2})$").expect("valid date pattern"));
static RE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2})$").expect("valid time pattern"));
static RE_POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9]{1,2}[0-9][A-Z]{2}$").expect("valid postcode pattern")
});
static RE_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid count pattern"));

/// Two-digit years below this land in the 2000s, the rest in the 1900s.
const YEAR_PIVOT: i32 = 69;

/// A validated delivery slot: where the catalogue is, when and where the
/// meals are wanted, and for how many people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    catalogue_path: PathBuf,
    delivery_at: NaiveDateTime,
    destination_postcode: String,
    cover_count: u32,
}

impl DeliveryRequest {
    /// Validates the five raw parameters `path, dd/mm/yy, hh:mm, postcode,
    /// covers`. Checks run in that order and the first failure is returned.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let [path, date, time, postcode, covers] = args else {
            return Err(Error::InvalidArgumentCount { found: args.len() });
        };

        let catalogue_path = PathBuf::from(path.as_ref());
        if !is_file(&catalogue_path) {
            return Err(Error::CatalogueFileNotFound {
                path: catalogue_path,
            });
        }

        let delivery_at = parse_timestamp(date.as_ref(), time.as_ref())?;

        let postcode = postcode.as_ref();
        if !is_uk_postcode(postcode) {
            return Err(Error::InvalidPostcode {
                value: postcode.to_string(),
            });
        }

        let covers = covers.as_ref();
        let cover_count = parse_count(covers).ok_or_else(|| Error::InvalidCoverCount {
            value: covers.to_string(),
        })?;

        debug!(
            catalogue = %catalogue_path.display(),
            %delivery_at,
            postcode,
            cover_count,
            "validated delivery request"
        );

        Ok(DeliveryRequest {
            catalogue_path,
            delivery_at,
            destination_postcode: postcode.to_string(),
            cover_count,
        })
    }

    pub fn catalogue_path(&self) -> &Path {
        &self.catalogue_path
    }

    pub fn delivery_at(&self) -> NaiveDateTime {
        self.delivery_at
    }

    pub fn destination_postcode(&self) -> &str {
        &self.destination_postcode
    }

    pub fn cover_count(&self) -> u32 {
        self.cover_count
    }
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Parses a `dd/mm/yy` date and a 24-hour `hh:mm` time into one timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let date = parse_date(date).ok_or_else(|| Error::InvalidDeliveryDate {
        value: date.to_string(),
    })?;
    let time = parse_time(time).ok_or_else(|| Error::InvalidDeliveryTime {
        value: time.to_string(),
    })?;
    Ok(date.and_time(time))
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let (_, [day, month, year]) = RE_DATE.captures(input)?.extract();
    let year: i32 = year.parse().ok()?;
    let year = if year < YEAR_PIVOT { 2000 + year } else { 1900 + year };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    let (_, [hour, minute]) = RE_TIME.captures(input)?.extract();
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Outward code `[A-Z]{1,2}[0-9]{1,2}` followed by inward code `[0-9][A-Z]{2}`,
/// with no separating space.
pub fn is_uk_postcode(input: &str) -> bool {
    RE_POSTCODE.is_match(input)
}

/// Strips whitespace and uppercases, so `da16 3rh` becomes `DA163RH`.
pub fn normalize_postcode(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Digits only, at least one, fitting in a `u32`.
pub(crate) fn parse_count(input: &str) -> Option<u32> {
    if !RE_COUNT.is_match(input) {
        return None;
    }
    input.parse().ok()
}
