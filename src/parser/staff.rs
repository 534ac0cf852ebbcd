use crate::models::record::Record;
use crate::models::staff::Staff;

/// Record fields that hold contributor credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Director,
    Writer,
    Music,
    CharacterDesigner,
    Original,
    Studio,
}

impl Role {
    pub fn staff_mut(self, record: &mut Record) -> &mut Staff {
        match self {
            Self::Director => &mut record.director,
            Self::Writer => &mut record.writer,
            Self::Music => &mut record.music,
            Self::CharacterDesigner => &mut record.character_designer,
            Self::Original => &mut record.original,
            Self::Studio => &mut record.studio,
        }
    }
}

/// Label synonyms per role, as a site prints them.
pub type RoleTable = &'static [(Role, &'static [&'static str])];

/// Credits `name` to every role whose synonyms intersect `labels`.
/// Returns the roles that were credited.
pub fn credit(record: &mut Record, table: RoleTable, name: &str, labels: &[&str]) -> Vec<Role> {
    let name = name.trim();
    if name.is_empty() {
        return Vec::new();
    }

    let mut credited = Vec::new();
    for (role, synonyms) in table {
        let hit = labels.iter().any(|label| {
            let label = label.trim();
            synonyms.iter().any(|s| s.eq_ignore_ascii_case(label))
        });
        if hit {
            role.staff_mut(record).push(name);
            credited.push(*role);
        }
    }
    credited
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: RoleTable = &[
        (Role::Director, &["Director"]),
        (Role::Original, &["Creator", "Original Creator"]),
        (Role::Writer, &["Script"]),
    ];

    #[test]
    fn test_two_directors_in_order() {
        let mut record = Record::new("x");
        credit(&mut record, TABLE, "A", &["Director"]);
        credit(&mut record, TABLE, "B", &["Director"]);
        assert_eq!(
            record.director,
            Staff::Many(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_multiple_labels_credit_multiple_roles() {
        let mut record = Record::new("x");
        let roles = credit(&mut record, TABLE, "C", &["Original Creator", "Script"]);
        assert_eq!(roles, vec![Role::Original, Role::Writer]);
        assert_eq!(record.original, Staff::Single("C".to_string()));
        assert_eq!(record.writer, Staff::Single("C".to_string()));
    }

    #[test]
    fn test_unmatched_labels_are_ignored() {
        let mut record = Record::new("x");
        let roles = credit(&mut record, TABLE, "D", &["Key Animation"]);
        assert!(roles.is_empty());
        assert!(record.director.is_empty());
    }

    #[test]
    fn test_label_matching_ignores_case_and_padding() {
        let mut record = Record::new("x");
        credit(&mut record, TABLE, "E", &[" director "]);
        assert_eq!(record.director, Staff::Single("E".to_string()));
    }
}
