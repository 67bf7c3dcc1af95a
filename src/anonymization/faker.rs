//! Fake-value generation
//!
//! Substitutes produced here look like the values they replace (a name for a
//! name, a valid IBAN for an IBAN) so downstream language models keep working
//! on natural-looking text. A fixed seed makes every generated value
//! reproducible.

use crate::anonymization::models::labels;
use crate::domain::GenerationError;
use chrono::{NaiveDate, NaiveTime};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::internet::en::{DomainSuffix, SafeEmail, IPv4, IPv6};
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt::Write;

/// Random number generator shared by the faker and custom operators
pub type FakerRng = StdRng;

/// Strftime format used for generated `TIME` values
pub const DEFAULT_TIME_FORMAT: &str = "%I:%M %p";

const DATE_FORMAT: &str = "%B %d, %Y";

/// Labels with a built-in generator
pub const SUPPORTED_LABELS: &[&str] = &[
    labels::PERSON,
    labels::PHONE_NUMBER,
    labels::EMAIL_ADDRESS,
    labels::ORGANIZATION,
    labels::LOCATION,
    labels::CREDIT_CARD,
    labels::DATE_TIME,
    labels::NRP,
    labels::IP_ADDRESS,
    labels::IPV4,
    labels::IPV6,
    labels::IBAN_CODE,
    labels::US_DRIVER_LICENSE,
    labels::US_SSN,
    labels::URL,
    labels::AWS_ACCESS_KEY,
    labels::LEGAL_TERM,
    labels::TIME,
    labels::POLISH_ID,
];

const NRP_VALUES: &[&str] = &[
    "Canadian",
    "Brazilian",
    "Norwegian",
    "Kenyan",
    "Portuguese",
    "Vietnamese",
    "Chilean",
    "Austrian",
    "Moroccan",
    "Finnish",
];

const LEGAL_TERMS: &[&str] = &[
    "Master Services Agreement",
    "Data Processing Agreement",
    "Memorandum of Understanding",
    "Letter of Intent",
    "Service Level Agreement",
    "Framework Agreement",
    "Licensing Agreement",
    "Settlement Agreement",
];

/// Source of synthetic values for entity labels
///
/// Generators must answer [`GenerationError::UnsupportedLabel`] for labels
/// they cannot produce; any other error is treated as a hard failure.
pub trait FakeValueGenerator: Send {
    /// Whether a generator exists for the label
    fn supports(&self, label: &str) -> bool;

    /// Produce a synthetic value for the label
    ///
    /// `original` is passed for generators that keep its shape; it must never
    /// be echoed back verbatim.
    fn generate(&mut self, label: &str, original: &str) -> Result<String, GenerationError>;

    /// Random source for custom operators
    fn rng(&mut self) -> &mut FakerRng;
}

/// Default generator built on the `fake` crate
///
/// # Examples
///
/// ```
/// use shroud::anonymization::faker::{FakeValueGenerator, SeededFaker};
///
/// let mut a = SeededFaker::seeded(42);
/// let mut b = SeededFaker::seeded(42);
/// assert_eq!(
///     a.generate("POLISH_ID", "ABC123456").unwrap(),
///     b.generate("POLISH_ID", "ABC123456").unwrap()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SeededFaker {
    rng: FakerRng,
    seed: Option<u64>,
}

impl SeededFaker {
    /// Seeded when `seed` is set, otherwise from OS entropy
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: FakerRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-deterministic generator
    pub fn from_entropy() -> Self {
        Self {
            rng: FakerRng::from_entropy(),
            seed: None,
        }
    }

    /// The configured seed, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for SeededFaker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl FakeValueGenerator for SeededFaker {
    fn supports(&self, label: &str) -> bool {
        SUPPORTED_LABELS.contains(&label)
    }

    fn generate(&mut self, label: &str, _original: &str) -> Result<String, GenerationError> {
        let rng = &mut self.rng;
        let value = match label {
            labels::PERSON => Name().fake_with_rng(rng),
            labels::PHONE_NUMBER => PhoneNumber().fake_with_rng(rng),
            labels::EMAIL_ADDRESS => SafeEmail().fake_with_rng(rng),
            labels::ORGANIZATION => CompanyName().fake_with_rng(rng),
            labels::LOCATION => CityName().fake_with_rng(rng),
            labels::CREDIT_CARD => CreditCardNumber().fake_with_rng(rng),
            labels::DATE_TIME => random_date(rng),
            labels::NRP => pick(rng, NRP_VALUES),
            labels::IP_ADDRESS | labels::IPV4 => IPv4().fake_with_rng(rng),
            labels::IPV6 => IPv6().fake_with_rng(rng),
            labels::IBAN_CODE => random_iban(rng),
            labels::US_DRIVER_LICENSE => bothify(rng, "?#######"),
            labels::US_SSN => random_ssn(rng),
            labels::URL => random_url(rng),
            labels::AWS_ACCESS_KEY => random_aws_key(rng),
            labels::LEGAL_TERM => pick(rng, LEGAL_TERMS),
            labels::TIME => random_time(rng, DEFAULT_TIME_FORMAT)?,
            labels::POLISH_ID => bothify(rng, "???######"),
            other => return Err(GenerationError::UnsupportedLabel(other.to_string())),
        };
        Ok(value)
    }

    fn rng(&mut self) -> &mut FakerRng {
        &mut self.rng
    }
}

/// Fill a pattern: `?` becomes a random upper-case letter, `#` a random digit
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use shroud::anonymization::faker::{bothify, FakerRng};
///
/// let mut rng = FakerRng::seed_from_u64(1);
/// let id = bothify(&mut rng, "???######");
/// assert_eq!(id.len(), 9);
/// assert!(id[..3].chars().all(|c| c.is_ascii_uppercase()));
/// ```
pub fn bothify<R: Rng + ?Sized>(rng: &mut R, pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '?' => char::from(rng.gen_range(b'A'..=b'Z')),
            '#' => char::from(rng.gen_range(b'0'..=b'9')),
            other => other,
        })
        .collect()
}

/// Random time of day rendered with a strftime format
pub fn random_time<R: Rng + ?Sized>(rng: &mut R, format: &str) -> Result<String, GenerationError> {
    let time = NaiveTime::from_hms_opt(rng.gen_range(0..24), rng.gen_range(0..60), 0).ok_or_else(
        || GenerationError::Failed {
            generator: "time".to_string(),
            message: "generated an invalid time of day".to_string(),
        },
    )?;

    let mut out = String::new();
    write!(out, "{}", time.format(format)).map_err(|_| GenerationError::Failed {
        generator: "time".to_string(),
        message: format!("invalid time format '{format}'"),
    })?;
    Ok(out)
}

fn random_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    NaiveDate::from_ymd_opt(
        rng.gen_range(1970..=2030),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
    )
    .map(|date| date.format(DATE_FORMAT).to_string())
    .unwrap_or_default()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, values: &[&str]) -> String {
    values.choose(rng).map(|v| v.to_string()).unwrap_or_default()
}

fn random_ssn<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Area 000, 666 and 900+ are never issued
    let mut area = rng.gen_range(1..900);
    if area == 666 {
        area = 665;
    }
    format!(
        "{area:03}-{:02}-{:04}",
        rng.gen_range(1..100),
        rng.gen_range(1..10000)
    )
}

/// Polish IBAN with valid mod-97 check digits
fn random_iban<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bban = bothify(rng, "########################");
    // "PL00" moved to the end, letters as numbers: P=25, L=21
    let numeric = format!("{bban}252100");
    let remainder = numeric
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u32, |acc, d| (acc * 10 + d) % 97);
    format!("PL{:02}{bban}", 98 - remainder)
}

fn random_url<R: Rng + ?Sized>(rng: &mut R) -> String {
    let host: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    let path: String = Word().fake_with_rng(rng);
    format!("https://www.{host}.{suffix}/{path}")
}

fn random_aws_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
    let tail: String = (0..16)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect();
    format!("AKIA{tail}")
}
