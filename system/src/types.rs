use serde::{Deserialize, Serialize};

pub type ConnectionId = u32;
pub type RoomName = String;

/// Whether a connection may be a member of several rooms at once.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipPolicy {
    /// Joining a room keeps every earlier membership.
    Multi,
    /// Joining a room leaves every other room first.
    Single,
}

impl std::default::Default for MembershipPolicy {
    fn default() -> Self {
        Self::Multi
    }
}

impl std::str::FromStr for MembershipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi" => Ok(Self::Multi),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown membership policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_membership_policy() {
        assert_eq!(
            "single".parse::<MembershipPolicy>(),
            Ok(MembershipPolicy::Single)
        );
        assert_eq!(
            " Multi ".parse::<MembershipPolicy>(),
            Ok(MembershipPolicy::Multi)
        );
        assert!("both".parse::<MembershipPolicy>().is_err());
    }
}
