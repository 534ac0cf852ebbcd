use serde::{Deserialize, Serialize};
use std::fmt;

/// Contributors credited for one role.
///
/// Starts `Unset`, becomes `Single` with the first name and `Many` once a
/// second name shows up. Page order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Staff {
    #[default]
    Unset,
    Single(String),
    Many(Vec<String>),
}

impl Staff {
    /// Adds a contributor, promoting `Single` to `Many` on the second name.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }

        *self = match std::mem::take(self) {
            Self::Unset => Self::Single(name),
            Self::Single(first) if first.is_empty() => Self::Single(name),
            Self::Single(first) => Self::Many(vec![first, name]),
            Self::Many(mut names) => {
                names.push(name);
                Self::Many(names)
            }
        };
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Single(name) => name.is_empty(),
            Self::Many(names) => names.is_empty(),
        }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Unset => Vec::new(),
            Self::Single(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Staff {
    fn from(name: &str) -> Self {
        let mut staff = Self::Unset;
        staff.push(name);
        staff
    }
}

impl From<Vec<String>> for Staff {
    fn from(names: Vec<String>) -> Self {
        let mut staff = Self::Unset;
        for name in names {
            staff.push(name);
        }
        staff
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

impl Serialize for Staff {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Single(name) => serializer.serialize_str(name),
            Self::Many(names) => names.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StaffRepr {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for Staff {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<StaffRepr>::deserialize(deserializer)? {
            None => Self::Unset,
            Some(StaffRepr::One(name)) => Self::from(name.as_str()),
            Some(StaffRepr::Many(names)) => Self::from(names),
        })
    }
}
