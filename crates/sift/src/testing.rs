//! Hand-written records shared by unit tests.

use std::any::Any;

use crate::descriptor::{FieldKind, Member, Record, TypeDescriptor};
use crate::value::{Number, Timestamp, ToValue, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub city: String,
    pub zip: u32,
}

impl Address {
    pub fn new(city: &str, zip: u32) -> Self {
        Address {
            city: city.to_string(),
            zip,
        }
    }
}

fn read_city(record: &dyn Any) -> Value<'_> {
    match record.downcast_ref::<Address>() {
        Some(address) => Value::String(&address.city),
        None => Value::None,
    }
}

fn read_zip(record: &dyn Any) -> Value<'_> {
    match record.downcast_ref::<Address>() {
        Some(address) => Value::Number(Number::from(address.zip)),
        None => Value::None,
    }
}

impl Record for Address {
    fn descriptor() -> &'static TypeDescriptor {
        static DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(
            "Address",
            &[
                Member::new("city", FieldKind::String, read_city),
                Member::new("zip", FieldKind::Number, read_zip),
            ],
        );
        &DESCRIPTOR
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub address: Address,
    pub previous_address: Option<Address>,
    pub nickname: Option<String>,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub active: bool,
}

impl Person {
    pub fn new(id: u32, name: &str, city: &str) -> Self {
        Person {
            id,
            name: name.to_string(),
            address: Address::new(city, 10000 + id),
            previous_address: None,
            nickname: None,
            tags: Vec::new(),
            created_at: i64::from(id) * 1000,
            active: id % 2 == 1,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

fn person(record: &dyn Any) -> Option<&Person> {
    record.downcast_ref::<Person>()
}

fn read_id(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| Value::Number(Number::from(p.id)))
}

fn read_name(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| Value::String(&p.name))
}

fn read_address(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| Value::Record(&p.address))
}

fn read_previous_address(record: &dyn Any) -> Value<'_> {
    match person(record).and_then(|p| p.previous_address.as_ref()) {
        Some(address) => Value::Record(address),
        None => Value::None,
    }
}

fn read_nickname(record: &dyn Any) -> Value<'_> {
    match person(record).and_then(|p| p.nickname.as_deref()) {
        Some(nickname) => Value::String(nickname),
        None => Value::None,
    }
}

fn read_tags(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| {
        Value::List(p.tags.iter().map(|t| t.to_value()).collect())
    })
}

fn read_created_at(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| Value::Timestamp(Timestamp(p.created_at)))
}

fn read_active(record: &dyn Any) -> Value<'_> {
    person(record).map_or(Value::None, |p| Value::Bool(p.active))
}

impl Record for Person {
    fn descriptor() -> &'static TypeDescriptor {
        static DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(
            "Person",
            &[
                Member::new("id", FieldKind::Number, read_id),
                Member::new("name", FieldKind::String, read_name),
                Member::new(
                    "address",
                    FieldKind::Record(<Address as Record>::descriptor),
                    read_address,
                ),
                Member::new(
                    "previous_address",
                    FieldKind::Record(<Address as Record>::descriptor),
                    read_previous_address,
                ),
                Member::new("nickname", FieldKind::String, read_nickname),
                Member::new("tags", FieldKind::List, read_tags),
                Member::new("created_at", FieldKind::Timestamp, read_created_at),
                Member::new("active", FieldKind::Bool, read_active),
            ],
        );
        &DESCRIPTOR
    }
}

pub fn people() -> Vec<Person> {
    vec![
        Person::new(2, "Alice", "Paris"),
        Person::new(5, "Bob", "Berlin"),
        Person::new(8, "Alice", "Rome"),
        Person::new(1, "Bob", "Paris"),
        Person::new(3, "Alice", "Oslo"),
    ]
}

pub fn ids<'a>(items: impl IntoIterator<Item = &'a Person>) -> Vec<u32> {
    items.into_iter().map(|p| p.id).collect()
}
