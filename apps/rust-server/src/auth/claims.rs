// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim set returned by the identity provider for a verified token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims asserted by Google about an ID token.
///
/// Google's `tokeninfo` answer is a flat JSON object (`aud`, `email`, `name`,
/// `sub`, ...). Values are kept as raw JSON since handlers only read the few
/// they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Audience (`aud`) the token was issued for, if it is a string.
    pub fn audience(&self) -> Option<&str> {
        self.get("aud").and_then(Value::as_str)
    }
}

impl FromIterator<(String, Value)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Claims(iter.into_iter().collect())
    }
}
