use std::str::FromStr;

use rust_decimal::Decimal;

use super::{
    Provider, RawIntentRequest,
    error::{FieldViolation, ValidationError},
};

pub const NOTE_MAX_CHARS: usize = 140;
const MAX_DECIMAL_PLACES: u32 = 2;

/// ISO-4217 currency with its minor unit exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    code: &'static str,
    exponent: u32,
}

impl Currency {
    pub const INR: Currency = Currency::new("INR", 2);
    pub const USD: Currency = Currency::new("USD", 2);

    const fn new(code: &'static str, exponent: u32) -> Self {
        Self { code, exponent }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    fn max_decimal_places(&self) -> u32 {
        self.exponent.min(MAX_DECIMAL_PLACES)
    }
}

/// Currencies accepted by the PayPal orders API
pub const PAYPAL_CURRENCIES: &[Currency] = &[
    Currency::new("AUD", 2),
    Currency::new("BRL", 2),
    Currency::new("CAD", 2),
    Currency::new("CHF", 2),
    Currency::new("CNY", 2),
    Currency::new("CZK", 2),
    Currency::new("DKK", 2),
    Currency::new("EUR", 2),
    Currency::new("GBP", 2),
    Currency::new("HKD", 2),
    Currency::new("HUF", 0),
    Currency::new("ILS", 2),
    Currency::INR,
    Currency::new("JPY", 0),
    Currency::new("MXN", 2),
    Currency::new("MYR", 2),
    Currency::new("NOK", 2),
    Currency::new("NZD", 2),
    Currency::new("PHP", 2),
    Currency::new("PLN", 2),
    Currency::new("SEK", 2),
    Currency::new("SGD", 2),
    Currency::new("THB", 2),
    Currency::new("TWD", 0),
    Currency::USD,
];

pub const UPI_CURRENCIES: &[Currency] = &[Currency::INR];

/// Request that passed [RequestValidator::validate].
///
/// `amount` is always expressed in major units, whichever form the caller used.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    amount: Decimal,
    currency: Currency,
    note: Option<String>,
}

impl ValidatedRequest {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Note stripped of control characters and surrounding whitespace
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RequestValidator {
    currencies: &'static [Currency],
}

impl RequestValidator {
    pub fn new(currencies: &'static [Currency]) -> Self {
        Self { currencies }
    }

    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Paypal => Self::new(PAYPAL_CURRENCIES),
            Provider::Upi => Self::new(UPI_CURRENCIES),
        }
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(
        &self,
        request: &RawIntentRequest,
    ) -> Result<ValidatedRequest, ValidationError> {
        let mut violations = Vec::new();

        // amount precision depends on the currency
        let currency = self.currency(request.currency.as_deref());
        let amount = match amount(request.amount.as_ref(), currency.as_ref().ok().copied()) {
            Ok(amount) => Some(amount),
            Err(message) => {
                violations.push(FieldViolation::new("amount", message));
                None
            }
        };
        let currency = match currency {
            Ok(currency) => Some(currency),
            Err(message) => {
                violations.push(FieldViolation::new("currency", message));
                None
            }
        };

        let note = match request.note.as_deref() {
            Some(note) if note.chars().count() > NOTE_MAX_CHARS => {
                violations.push(FieldViolation::new(
                    "note",
                    format!("must be at most {NOTE_MAX_CHARS} characters"),
                ));
                None
            }
            Some(note) => sanitize_note(note),
            None => None,
        };

        match (amount, currency) {
            (Some(amount), Some(currency)) if violations.is_empty() => Ok(ValidatedRequest {
                amount,
                currency,
                note,
            }),
            _ => Err(ValidationError { violations }),
        }
    }

    fn currency(&self, code: Option<&str>) -> Result<Currency, String> {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Err("is required".into());
        };
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err("must be a 3-letter uppercase ISO-4217 code".into());
        }
        self.currencies
            .iter()
            .find(|c| c.code == code)
            .copied()
            .ok_or_else(|| format!("{code} is not supported"))
    }
}

fn amount(value: Option<&serde_json::Value>, currency: Option<Currency>) -> Result<Decimal, String> {
    use serde_json::Value;

    let exponent = currency.map_or(MAX_DECIMAL_PLACES, |c| c.exponent());
    let max_places = currency.map_or(MAX_DECIMAL_PLACES, |c| c.max_decimal_places());
    match value {
        None | Some(Value::Null) => Err("is required".into()),
        Some(Value::String(text)) => decimal_amount(text, max_places),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(minor) if minor > 0 => Ok(Decimal::new(minor, exponent)),
            Some(_) => Err("must be greater than zero".into()),
            None if number.is_u64() => Err("is too large".into()),
            None => Err("must be a decimal string or an integer amount in minor units".into()),
        },
        Some(_) => Err("must be a decimal string or an integer amount in minor units".into()),
    }
}

fn decimal_amount(text: &str, max_places: u32) -> Result<Decimal, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("is required".into());
    }
    // Decimal::from_str also takes digit separators
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'));
    let amount = match Decimal::from_str(text) {
        Ok(amount) if numeric => amount,
        _ => return Err("must be a number".into()),
    };
    if amount <= Decimal::ZERO {
        return Err("must be greater than zero".into());
    }
    if amount.scale() > max_places {
        return Err(match max_places {
            0 => "must be a whole number in this currency".into(),
            n => format!("must have at most {n} decimal places"),
        });
    }
    Ok(amount)
}

fn sanitize_note(note: &str) -> Option<String> {
    let sanitized: String = note.chars().filter(|c| !c.is_control()).collect();
    let sanitized = sanitized.trim();
    (!sanitized.is_empty()).then(|| sanitized.to_string())
}
