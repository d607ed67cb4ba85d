use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use find_meals::request::normalize_postcode;

/// find-meals reads a vendor catalogue and lists the meals that can be prepared in time
/// for a delivery at the given date and time.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CATALOGUE DATE TIME POSTCODE COVERS: the catalogue file (`\r\n` line endings),
    /// delivery date as dd/mm/yy, delivery time as hh:mm, delivery postcode such as
    /// NW43QB, and the number of people to feed.
    #[arg(value_name = "PARAMETERS", num_args = 0.., allow_negative_numbers = true)]
    pub parameters: Vec<String>,

    /// Pretend the current time is "dd/mm/yy hh:mm" instead of reading the clock.
    #[arg(long, env = "FIND_MEALS_NOW", value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// How to print the meals.
    #[arg(short, long, value_enum, default_value_t = Format::Lines)]
    pub format: Format,

    /// Log level for diagnostics written to stderr. RUST_LOG takes precedence.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

impl Args {
    /// The positional parameters with the postcode in its compact form, so
    /// `da16 3rh` is validated as `DA163RH`.
    pub fn request_parameters(&self) -> Vec<String> {
        let mut parameters = self.parameters.clone();
        if let Some(postcode) = parameters.get_mut(3) {
            *postcode = normalize_postcode(postcode);
        }
        parameters
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// One `name;allergens;lead_time` line per meal.
    Lines,
    Table,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn parse_now(input: &str) -> Result<NaiveDateTime, String> {
    let (date, time) = input
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected \"dd/mm/yy hh:mm\", got {input:?}"))?;
    find_meals::request::parse_timestamp(date, time.trim()).map_err(|err| err.to_string())
}
