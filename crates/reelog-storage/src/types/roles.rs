//! Role and membership-transition types for group administration.

use std::str::FromStr;

/// Role of a user within a group.
///
/// Every non-deleted group has exactly one `Creator`, and it is the user
/// recorded as `created_by` on the group row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupRole {
    Member,
    Admin,
    Creator,
}

/// Error type for parsing GroupRole from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGroupRoleError(pub String);

impl std::fmt::Display for ParseGroupRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid group role: {}", self.0)
    }
}

impl std::error::Error for ParseGroupRoleError {}

impl FromStr for GroupRole {
    type Err = ParseGroupRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(GroupRole::Member),
            "admin" => Ok(GroupRole::Admin),
            "creator" => Ok(GroupRole::Creator),
            _ => Err(ParseGroupRoleError(s.to_string())),
        }
    }
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Member => "member",
            GroupRole::Admin => "admin",
            GroupRole::Creator => "creator",
        }
    }

    /// Whether this role may add members, remove members, or change roles.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Admin | GroupRole::Creator)
    }
}

/// Kind of membership transition recorded in the audit history.
///
/// `Left` is a self-removal; `Removed` is a removal by someone else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    Added,
    Removed,
    RoleChanged,
    Left,
}

/// Error type for parsing MembershipAction from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMembershipActionError(pub String);

impl std::fmt::Display for ParseMembershipActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid membership action: {}", self.0)
    }
}

impl std::error::Error for ParseMembershipActionError {}

impl FromStr for MembershipAction {
    type Err = ParseMembershipActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(MembershipAction::Added),
            "removed" => Ok(MembershipAction::Removed),
            "role_changed" => Ok(MembershipAction::RoleChanged),
            "left" => Ok(MembershipAction::Left),
            _ => Err(ParseMembershipActionError(s.to_string())),
        }
    }
}

impl MembershipAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipAction::Added => "added",
            MembershipAction::Removed => "removed",
            MembershipAction::RoleChanged => "role_changed",
            MembershipAction::Left => "left",
        }
    }
}

impl std::fmt::Display for MembershipAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_can_manage_members() {
        assert!(GroupRole::Creator.can_manage_members());
        assert!(GroupRole::Admin.can_manage_members());
        assert!(!GroupRole::Member.can_manage_members());
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(GroupRole::Member.as_str(), "member");
        assert_eq!(GroupRole::Admin.as_str(), "admin");
        assert_eq!(GroupRole::Creator.as_str(), "creator");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("member".parse::<GroupRole>().unwrap(), GroupRole::Member);
        assert_eq!("admin".parse::<GroupRole>().unwrap(), GroupRole::Admin);
        assert_eq!("creator".parse::<GroupRole>().unwrap(), GroupRole::Creator);
    }

    #[test]
    fn test_role_parse_invalid() {
        assert!("invalid".parse::<GroupRole>().is_err());
        assert!("Creator".parse::<GroupRole>().is_err()); // Case sensitive
        assert!("".parse::<GroupRole>().is_err());
    }

    #[test]
    fn test_role_roundtrip() {
        for role in [GroupRole::Member, GroupRole::Admin, GroupRole::Creator] {
            let s = role.as_str();
            let parsed: GroupRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_membership_action_roundtrip() {
        for action in [
            MembershipAction::Added,
            MembershipAction::Removed,
            MembershipAction::RoleChanged,
            MembershipAction::Left,
        ] {
            let s = action.to_string();
            let parsed: MembershipAction = s.parse().unwrap();
            assert_eq!(action, parsed);
        }
    }

    #[test]
    fn test_membership_action_parse_invalid() {
        let err = "kicked".parse::<MembershipAction>().unwrap_err();
        assert!(err.to_string().contains("kicked"));
    }
}
