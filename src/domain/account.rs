use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A non-negative monetary balance.
///
/// Wrapper around `rust_decimal::Decimal` so that the "balance never goes
/// negative" invariant lives in one place instead of being re-checked at
/// every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Balance(Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a balance, rejecting negative values.
    pub fn new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Subtracts `amount`, returning `None` if the balance would go negative.
    pub fn debit(&self, amount: Amount) -> Option<Self> {
        Self::new(self.0 - amount.value())
    }

    /// Whether this balance can cover `amount`.
    pub fn covers(&self, amount: Amount) -> bool {
        self.0 >= amount.value()
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A strictly positive monetary amount, used for fund subscription minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, String> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(format!("amount must be positive, got {value}"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery channel for workflow notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPreference {
    Email,
    Sms,
}

impl fmt::Display for NotificationPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Sms => f.write_str("sms"),
        }
    }
}

/// An account holding a spendable balance and a notification preference.
///
/// The workflow engine is the only mutator of `balance`; mutation goes
/// through the store's conditional update, never a blind overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub balance: Balance,
    pub notification_preference: NotificationPreference,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        balance: Balance,
        notification_preference: NotificationPreference,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
            notification_preference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_rejects_negative() {
        assert!(Balance::new(dec!(-1)).is_none());
        assert_eq!(Balance::new(dec!(0)), Some(Balance::ZERO));
    }

    #[test]
    fn debit_never_goes_negative() {
        let balance = Balance::new(dec!(100)).unwrap();
        let amount = Amount::new(dec!(75)).unwrap();
        assert_eq!(balance.debit(amount), Balance::new(dec!(25)));

        let too_much = Amount::new(dec!(101)).unwrap();
        assert!(balance.debit(too_much).is_none());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(dec!(0)).is_err());
        assert!(Amount::new(dec!(-5)).is_err());
        assert!(Amount::new(dec!(0.01)).is_ok());
    }

    #[test]
    fn preference_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationPreference::Email).unwrap();
        assert_eq!(json, "\"email\"");
        let back: NotificationPreference = serde_json::from_str("\"sms\"").unwrap();
        assert_eq!(back, NotificationPreference::Sms);
    }
}
