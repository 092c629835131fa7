//! Records shared by the integration tests.

#![allow(dead_code)]

use sift::{Record, SiftEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Junior,
    Senior,
    Lead,
}

impl SiftEnum for Level {
    fn sift_discriminant(&self) -> u32 {
        *self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Office {
    pub city: String,
    pub floor: u8,
}

#[derive(Debug, Clone, PartialEq, Record)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    #[sift(Enum)]
    pub level: Level,
    #[sift(Record)]
    pub office: Office,
    #[sift(Record)]
    pub previous_office: Option<Office>,
    pub nickname: Option<String>,
    pub skills: Vec<String>,
    #[sift(Timestamp)]
    pub hired_at: i64,
    pub salary: f64,
    pub remote: bool,
}

impl Employee {
    /// `level` cycles with `id`, `floor` and `hired_at` grow with it, and
    /// even ids work remotely.
    pub fn new(id: u32, name: &str, city: &str) -> Self {
        let level = match id % 3 {
            0 => Level::Junior,
            1 => Level::Senior,
            _ => Level::Lead,
        };
        Employee {
            id,
            name: name.to_string(),
            level,
            office: Office {
                city: city.to_string(),
                floor: id as u8,
            },
            previous_office: None,
            nickname: None,
            skills: Vec::new(),
            hired_at: i64::from(id) * 1000,
            salary: 1000.0 * f64::from(id),
            remote: id % 2 == 0,
        }
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    pub fn with_previous_office(mut self, city: &str) -> Self {
        self.previous_office = Some(Office {
            city: city.to_string(),
            floor: 0,
        });
        self
    }
}

/// `(2,Alice,Paris) (5,Bob,Berlin) (8,Alice,Rome) (1,Bob,Paris) (3,Alice,Oslo)`
pub fn staff() -> Vec<Employee> {
    vec![
        Employee::new(2, "Alice", "Paris").with_skills(&["rust", "sql"]),
        Employee::new(5, "Bob", "Berlin").with_skills(&["go"]),
        Employee::new(8, "Alice", "Rome").with_nickname("Al"),
        Employee::new(1, "Bob", "Paris").with_previous_office("Lyon"),
        Employee::new(3, "Alice", "Oslo").with_skills(&["rust"]),
    ]
}

pub fn ids<'a>(items: impl IntoIterator<Item = &'a Employee>) -> Vec<u32> {
    items.into_iter().map(|e| e.id).collect()
}
