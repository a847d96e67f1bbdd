use std::fmt::{Display, Formatter, Result};

pub const ALL_USERS_TOPIC: &str = "all_users";
pub const OTHER_USERS_TOPIC: &str = "other_users";

const ROLE_TOPICS: [(&str, &str); 7] = [
    ("admin", "admin_users"),
    ("makoKor", "mako_kor_users"),
    ("pasPelopor", "pas_pelopor_users"),
    ("pasGegana", "pas_gegana_users"),
    ("pasbrimobI", "pasbrimob_i_users"),
    ("pasbrimobII", "pasbrimob_ii_users"),
    ("pasbrimobIII", "pasbrimob_iii_users"),
];

pub fn topic_for_role(role: &str) -> &'static str {
    ROLE_TOPICS
        .iter()
        .find(|(id, _)| *id == role)
        .map(|(_, topic)| *topic)
        .unwrap_or(OTHER_USERS_TOPIC)
}

pub fn known_topics() -> impl Iterator<Item = &'static str> {
    std::iter::once(ALL_USERS_TOPIC).chain(ROLE_TOPICS.iter().map(|(_, topic)| *topic))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Broadcast,
    Role(String),
}

impl Audience {
    pub fn from_target_role(target_role: Option<&str>) -> Self {
        match target_role {
            Some(role) => Audience::Role(role.to_string()),
            None => Audience::Broadcast,
        }
    }

    pub fn topic(&self) -> &'static str {
        match self {
            Audience::Broadcast => ALL_USERS_TOPIC,
            Audience::Role(role) => topic_for_role(role),
        }
    }

    pub fn role(&self) -> Option<&str> {
        match self {
            Audience::Broadcast => None,
            Audience::Role(role) => Some(role),
        }
    }
}

impl Display for Audience {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Audience::Broadcast => write!(f, "broadcast"),
            Audience::Role(role) => write!(f, "role:{}", role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_roles_resolve_to_fixed_topics() {
        assert_eq!(topic_for_role("admin"), "admin_users");
        assert_eq!(topic_for_role("makoKor"), "mako_kor_users");
        assert_eq!(topic_for_role("pasPelopor"), "pas_pelopor_users");
        assert_eq!(topic_for_role("pasGegana"), "pas_gegana_users");
        assert_eq!(topic_for_role("pasbrimobI"), "pasbrimob_i_users");
        assert_eq!(topic_for_role("pasbrimobII"), "pasbrimob_ii_users");
        assert_eq!(topic_for_role("pasbrimobIII"), "pasbrimob_iii_users");
    }

    #[test]
    fn unknown_roles_fall_back_to_other_users() {
        assert_eq!(topic_for_role("pasbrimobIV"), OTHER_USERS_TOPIC);
        assert_eq!(topic_for_role(""), OTHER_USERS_TOPIC);
        assert_eq!(topic_for_role("PASGEGANA"), OTHER_USERS_TOPIC);
    }

    #[test]
    fn audience_without_role_is_broadcast() {
        assert_eq!(Audience::from_target_role(None).topic(), ALL_USERS_TOPIC);
        assert_eq!(
            Audience::from_target_role(Some("pasbrimobII")).topic(),
            "pasbrimob_ii_users"
        );
    }

    #[test]
    fn known_topics_include_broadcast_and_every_role() {
        let topics: Vec<_> = known_topics().collect();
        assert_eq!(topics.len(), 8);
        assert_eq!(topics[0], ALL_USERS_TOPIC);
        assert!(!topics.contains(&OTHER_USERS_TOPIC));
    }
}
