use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Birthday {
    year: u16,
    month: u8,
    day: u8,
}

impl Birthday {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl Display for Birthday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}.{:02}.{:04}", self.day, self.month, self.year)
    }
}

/// Id component of the walkthrough: equal users share guid, name and birthday.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    guid: u128,
    full_name: String,
    birthday: Birthday,
}

impl User {
    pub fn new(full_name: impl Into<String>, birthday: Birthday) -> Self {
        Self {
            guid: rand::random(),
            full_name: full_name.into(),
            birthday,
        }
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User {} with birthday {}.",
            self.full_name, self.birthday
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let user = User::new("Ivanov Petr Nikolaevich", Birthday::new(2000, 1, 1));
        assert_eq!(
            user.to_string(),
            "User Ivanov Petr Nikolaevich with birthday 01.01.2000."
        );
    }

    #[test]
    fn same_name_different_guid() {
        let a = User::new("A", Birthday::new(1990, 5, 17));
        let mut b = a.clone();
        assert_eq!(a, b);

        b.guid = a.guid.wrapping_add(1);
        assert_ne!(a, b);
    }
}
