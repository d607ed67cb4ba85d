use std::fmt::Display;
use std::path::Path;

use chrono::{Local, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use prettytable::{row, Cell, Row, Table};
use regex::Regex;
use tracing::{debug, warn};

mod error;
pub mod request;

pub use error::{Error, Result};
pub use request::DeliveryRequest;

static RE_VENDOR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z ]*$").expect("valid vendor name pattern"));
static RE_MAX_COVERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]*$").expect("valid max covers pattern"));

const LINE_TERMINATOR: &str = "\r\n";
const FIELD_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    name: String,
    allergens: String,
    lead_time: String,
    lead_hours: Option<u32>,
}

impl Meal {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allergens(&self) -> &str {
        &self.allergens
    }

    /// The lead time as written in the catalogue, e.g. `24h`.
    pub fn lead_time(&self) -> &str {
        &self.lead_time
    }

    /// Hours of notice the vendor needs, or `None` if the lead time is not
    /// of the form `<integer>h`.
    pub fn lead_time_hours(&self) -> Option<u32> {
        self.lead_hours
    }

    fn is_ready_within(&self, hours: f64) -> bool {
        self.lead_hours.is_some_and(|lead| f64::from(lead) <= hours)
    }
}

impl Display for Meal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{};{};{}", self.name, self.allergens, self.lead_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
    name: String,
    postcode: String,
    max_covers: Option<u32>,
    meals: Vec<Meal>,
}

impl Vendor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    /// `None` when the catalogue leaves the field empty.
    pub fn max_covers(&self) -> Option<u32> {
        self.max_covers
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }
}

/// Every vendor in a catalogue file, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalogue {
    vendors: Vec<Vendor>,
}

impl Catalogue {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read catalogue");
        Self::parse(&text)
    }

    /// Parses catalogue text. Lines end in `\r\n`; a blank line separates
    /// vendor blocks. The first line of a block is `name;postcode;max_covers`,
    /// the rest are `name;allergens;lead_time` meals of that vendor.
    pub fn parse(text: &str) -> Result<Self> {
        let mut vendors = Vec::new();
        let mut current_vendor: Option<Vendor> = None;

        for (index, line) in text.split(LINE_TERMINATOR).enumerate() {
            let line_number = index + 1;

            if line.is_empty() {
                if let Some(vendor) = current_vendor.take() {
                    vendors.push(vendor);
                }
                continue;
            }

            match &mut current_vendor {
                Some(vendor) => vendor.meals.push(parse_meal(line_number, line)?),
                None => current_vendor = Some(parse_vendor(line_number, line)?),
            }
        }

        if let Some(vendor) = current_vendor {
            vendors.push(vendor);
        }

        debug!(
            vendors = vendors.len(),
            meals = vendors.iter().map(|v| v.meals.len()).sum::<usize>(),
            "parsed catalogue"
        );

        Ok(Catalogue { vendors })
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    /// Meals whose lead time fits in the time left between `now` and
    /// `delivery_at`, in vendor order and then meal order.
    pub fn available_meals(&self, delivery_at: NaiveDateTime, now: NaiveDateTime) -> Vec<&Meal> {
        let hours = hours_until(delivery_at, now);
        debug!(hours_until_delivery = hours, "filtering meals by lead time");

        self.vendors
            .iter()
            .flat_map(|vendor| vendor.meals.iter())
            .filter(|meal| meal.is_ready_within(hours))
            .collect()
    }
}

/// Hours from `now` until `delivery_at`, negative if it is already past.
/// Both are local wall times; a clock change between them counts.
pub fn hours_until(delivery_at: NaiveDateTime, now: NaiveDateTime) -> f64 {
    hours_until_in(&Local, delivery_at, now)
}

/// [`hours_until`] for wall times read in `tz`.
pub fn hours_until_in<Tz: TimeZone>(
    tz: &Tz,
    delivery_at: NaiveDateTime,
    now: NaiveDateTime,
) -> f64 {
    let elapsed = match (
        tz.from_local_datetime(&delivery_at).earliest(),
        tz.from_local_datetime(&now).earliest(),
    ) {
        (Some(delivery), Some(current)) => delivery.signed_duration_since(current),
        // wall time skipped by a clock change
        _ => delivery_at - now,
    };
    elapsed.num_milliseconds() as f64 / 3_600_000.0
}

/// Loads the requested catalogue and returns the meals that can make the
/// delivery slot. `now` defaults to the local wall clock.
pub fn find_meals(request: &DeliveryRequest, now: Option<NaiveDateTime>) -> Result<Vec<Meal>> {
    let catalogue = Catalogue::load(request.catalogue_path())?;
    let now = now.unwrap_or_else(|| Local::now().naive_local());

    Ok(catalogue
        .available_meals(request.delivery_at(), now)
        .into_iter()
        .cloned()
        .collect())
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_SEPARATOR).collect()
}

fn parse_vendor(line_number: usize, line: &str) -> Result<Vendor> {
    let fields = split_fields(line);
    let [name, postcode, max_covers] = fields[..] else {
        return Err(Error::MalformedVendorLine {
            line: line_number,
            fields: fields.len(),
        });
    };

    if !RE_VENDOR_NAME.is_match(name) {
        return Err(Error::InvalidVendorName {
            line: line_number,
            value: name.to_string(),
        });
    }
    if !request::is_uk_postcode(postcode) {
        return Err(Error::InvalidVendorPostcode {
            line: line_number,
            value: postcode.to_string(),
        });
    }
    let max_covers = parse_max_covers(max_covers).ok_or_else(|| Error::InvalidVendorMaxCovers {
        line: line_number,
        value: max_covers.to_string(),
    })?;

    Ok(Vendor {
        name: name.to_string(),
        postcode: postcode.to_string(),
        max_covers,
        meals: Vec::new(),
    })
}

/// `Some(None)` for an empty field, `None` if the field is not a number.
fn parse_max_covers(input: &str) -> Option<Option<u32>> {
    if !RE_MAX_COVERS.is_match(input) {
        return None;
    }
    if input.is_empty() {
        return Some(None);
    }
    input.parse().ok().map(Some)
}

fn parse_meal(line_number: usize, line: &str) -> Result<Meal> {
    let fields = split_fields(line);
    let [name, allergens, lead_time] = fields[..] else {
        return Err(Error::MalformedMealLine {
            line: line_number,
            fields: fields.len(),
        });
    };

    let lead_hours = parse_lead_time(lead_time);
    if lead_hours.is_none() {
        warn!(
            line = line_number,
            meal = name,
            lead_time,
            "unreadable lead time, meal will never be offered"
        );
    }

    Ok(Meal {
        name: name.to_string(),
        allergens: allergens.to_string(),
        lead_time: lead_time.to_string(),
        lead_hours,
    })
}

fn parse_lead_time(input: &str) -> Option<u32> {
    input.strip_suffix('h')?.parse().ok()
}

/// One `name;allergens;lead_time` line per meal.
pub fn render_lines<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> String {
    meals
        .into_iter()
        .map(|meal| format!("{meal}\n"))
        .collect()
}

pub fn render_table<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> String {
    let mut table = Table::new();
    table.add_row(row!["Meal", "Allergens", "Lead time"]);
    for meal in meals {
        table.add_row(Row::new(vec![
            Cell::new(&meal.name),
            Cell::new(&meal.allergens),
            Cell::new(&meal.lead_time),
        ]));
    }

    table.to_string()
}
