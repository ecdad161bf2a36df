//! Ledger account identifiers.
//!
//! An account is addressed as `shard.realm.num`. Accounts that were created
//! implicitly by sending to a public key can also be addressed by that key
//! (the alias), which takes the place of `num`:
//!
//! ```text
//! 0.0.1001
//! 0.0.0x302a300506032b6570032100...   (alias, hex)
//! ```
//!
//! The `0x` prefix keeps an alias whose hex happens to be all digits from
//! reading back as an account number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{parse_u64, ParseError};
use crate::proto;

/// A ledger account id.
///
/// Immutable. Two ids are equal when their normalized components are equal;
/// `0.0.7` and `00.0.007` parse to the same value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
    /// Alias bytes (a serialized public key). When present, `num` is zero
    /// and the alias is the account's address.
    pub alias: Option<Vec<u8>>,
}

impl AccountId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self {
            shard,
            realm,
            num,
            alias: None,
        }
    }

    /// An account addressed by its alias rather than its number.
    pub fn from_alias(shard: u64, realm: u64, alias: Vec<u8>) -> Self {
        Self {
            shard,
            realm,
            num: 0,
            alias: Some(alias),
        }
    }

    pub fn is_alias(&self) -> bool {
        self.alias.is_some()
    }

    /// The wire carries shard, realm and num as signed 64-bit integers.
    /// Ids that don't fit are refused rather than wrapped.
    pub fn check_wire_range(&self) -> Result<(), ParseError> {
        let fits = |value: u64, what: &'static str| {
            i64::try_from(value)
                .map(|_| ())
                .map_err(|_| ParseError::OutOfRange(what))
        };
        fits(self.shard, "shard")?;
        fits(self.realm, "realm")?;
        fits(self.num, "num")
    }

    pub fn to_proto(&self) -> proto::AccountId {
        let account = match &self.alias {
            Some(alias) => proto::account_id::Account::Alias(alias.clone()),
            None => proto::account_id::Account::AccountNum(self.num as i64),
        };
        proto::AccountId {
            shard_num: self.shard as i64,
            realm_num: self.realm as i64,
            account: Some(account),
        }
    }

    pub fn from_proto(pb: &proto::AccountId) -> Result<Self, ParseError> {
        let shard = non_negative(pb.shard_num, "shard")?;
        let realm = non_negative(pb.realm_num, "realm")?;
        match &pb.account {
            Some(proto::account_id::Account::AccountNum(num)) => {
                Ok(Self::new(shard, realm, non_negative(*num, "num")?))
            }
            Some(proto::account_id::Account::Alias(alias)) => {
                Ok(Self::from_alias(shard, realm, alias.clone()))
            }
            None => Err(ParseError::MissingField("account")),
        }
    }
}

fn non_negative(value: i64, what: &'static str) -> Result<u64, ParseError> {
    u64::try_from(value).map_err(|_| ParseError::OutOfRange(what))
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}.{}.0x{}", self.shard, self.realm, hex::encode(alias)),
            None => write!(f, "{}.{}.{}", self.shard, self.realm, self.num),
        }
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

impl FromStr for AccountId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidFormat {
            kind: "account id",
            input: s.to_string(),
        };

        let mut parts = s.split('.');
        let (Some(shard), Some(realm), Some(last), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let shard = parse_u64(shard)?;
        let realm = parse_u64(realm)?;

        let id = match last.strip_prefix("0x") {
            Some(alias) => match hex::decode(alias) {
                Ok(alias) if !alias.is_empty() => Self::from_alias(shard, realm, alias),
                _ => return Err(invalid()),
            },
            None => Self::new(shard, realm, parse_u64(last)?),
        };
        id.check_wire_range()?;
        Ok(id)
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
