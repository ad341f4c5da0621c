//! Payout model

use chrono::{DateTime, NaiveDate, Utc};
use rtr_common::{Error, Money};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutStatus {
    Pending,
    Paid,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Paid => "paid",
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PayoutStatus::Pending),
            "paid" => Ok(PayoutStatus::Paid),
            _ => Err(Error::Validation(format!("Unknown payout status: {:?}", s))),
        }
    }
}

/// How the money leaves the distributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Paypal,
    Check,
    Other,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutMethod::BankTransfer => "bank_transfer",
            PayoutMethod::Paypal => "paypal",
            PayoutMethod::Check => "check",
            PayoutMethod::Other => "other",
        }
    }
}

impl fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "bank_transfer" | "bank" => Ok(PayoutMethod::BankTransfer),
            "paypal" => Ok(PayoutMethod::Paypal),
            "check" | "cheque" => Ok(PayoutMethod::Check),
            "other" => Ok(PayoutMethod::Other),
            _ => Err(Error::Validation(format!("Unknown payout method: {:?}", s))),
        }
    }
}

/// Scheduled transfer of a statement's net amount to the artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: Uuid,
    pub artist_id: String,
    /// Statement this payout settles; one payout per statement
    pub statement_id: Uuid,
    /// Copied from the statement's net-to-artist at creation
    pub amount: Money,
    pub scheduled_for: NaiveDate,
    pub method: PayoutMethod,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_aliases() {
        assert_eq!("bank_transfer".parse::<PayoutMethod>().unwrap(), PayoutMethod::BankTransfer);
        assert_eq!("Bank-Transfer".parse::<PayoutMethod>().unwrap(), PayoutMethod::BankTransfer);
        assert_eq!("PayPal".parse::<PayoutMethod>().unwrap(), PayoutMethod::Paypal);
        assert_eq!("cheque".parse::<PayoutMethod>().unwrap(), PayoutMethod::Check);
        assert!(matches!("crypto".parse::<PayoutMethod>(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&PayoutMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }
}
