use clap::ValueEnum;
use std::fmt::{Display, Formatter};

/// The demo tables rows can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Users,
    Restaurants,
    Reservations,
    /// denormalised user + restaurant + reservation rows for document stores
    Documents,
}

const USER_COLUMNS: &[&str] = &["username", "email"];

const RESTAURANT_COLUMNS: &[&str] = &[
    "restaurant_name",
    "cuisine",
    "phone_number",
    "address",
    "website",
    "dining_style",
];

const RESERVATION_COLUMNS: &[&str] = &[
    "user_id",
    "restaurant_id",
    "party_size",
    "party_size_max",
    "date",
    "time",
];

const DOCUMENT_COLUMNS: &[&str] = &[
    "username",
    "email",
    "restaurant_name",
    "cuisine",
    "phone_number",
    "address",
    "website",
    "dining_style",
    "party_size",
    "party_size_max",
    "date",
    "time",
];

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Restaurants => "restaurants",
            Table::Reservations => "reservations",
            Table::Documents => "documents",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => USER_COLUMNS,
            Table::Restaurants => RESTAURANT_COLUMNS,
            Table::Reservations => RESERVATION_COLUMNS,
            Table::Documents => DOCUMENT_COLUMNS,
        }
    }

    /// e.g. `INSERT INTO users (username, email) VALUES`
    pub fn insert_prefix(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES",
            self.name(),
            self.columns().join(", ")
        )
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
