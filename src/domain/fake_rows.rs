use crate::domain::record::{FieldValue, Record};
use chrono::{Duration, Utc};
use fake::faker::address::en::{BuildingNumber, CityName, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, SafeEmail, Username};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::Rng;

pub const CUISINES: &[&str] = &[
    "Burgers", "Sushi", "Pasta", "Burritos", "Tacos", "Ramen", "Noodles", "American", "Mexican",
    "French", "Italian", "Japanese", "Chinese", "Korean",
];

pub const DINING_STYLES: &[&str] = &["Fine dining", "Casual", "Fast food", "Cafe", "Buffet"];

/// Confirmed party size is drawn from 1..=17 and the maximum adds up to 4 seats on top.
pub const PARTY_SIZE_MAX: i64 = 17;
pub const PARTY_SIZE_HEADROOM: i64 = 4;
pub const RECENT_DAYS: i64 = 90;

/// Upper bounds for the foreign keys of generated reservations.
#[derive(Debug, Clone, Copy)]
pub struct ReservationLimits {
    pub max_users: u32,
    pub max_restaurants: u32,
}

impl Default for ReservationLimits {
    fn default() -> Self {
        ReservationLimits {
            max_users: 50_000,
            max_restaurants: 20_000,
        }
    }
}

/// `(username, email)`
pub fn fake_user<R: Rng>(rng: &mut R) -> Record {
    let username: String = Username().fake_with_rng(rng);
    let email: String = SafeEmail().fake_with_rng(rng);
    Record::new(vec![username.into(), email.into()])
}

/// `(restaurant_name, cuisine, phone_number, address, website, dining_style)`
pub fn fake_restaurant<R: Rng>(rng: &mut R) -> Record {
    let name: String = CompanyName().fake_with_rng(rng);
    let cuisine = CUISINES[rng.gen_range(0..CUISINES.len())];
    let phone: String = PhoneNumber().fake_with_rng(rng);

    let building: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    let city: String = CityName().fake_with_rng(rng);
    let zip: String = ZipCode().fake_with_rng(rng);
    let address = format!("{} {}, {}, {}", building, street, city, zip);

    let website = fake_url(rng);
    let dining_style = DINING_STYLES[rng.gen_range(0..DINING_STYLES.len())];

    Record::new(vec![
        name.into(),
        cuisine.into(),
        phone.into(),
        address.into(),
        website.into(),
        dining_style.into(),
    ])
}

/// `(user_id, restaurant_id, party_size, party_size_max, date, time)`
pub fn fake_reservation<R: Rng>(rng: &mut R, limits: &ReservationLimits) -> Record {
    let user_id = rng.gen_range(1..=limits.max_users);
    let restaurant_id = rng.gen_range(1..=limits.max_restaurants);
    let party_size = rng.gen_range(1..=PARTY_SIZE_MAX);
    let party_size_max = party_size + rng.gen_range(0..=PARTY_SIZE_HEADROOM);

    let date = (Utc::now().date_naive() - Duration::days(rng.gen_range(0..RECENT_DAYS)))
        .format("%Y-%m-%d")
        .to_string();

    Record::new(vec![
        user_id.into(),
        restaurant_id.into(),
        FieldValue::Int(party_size),
        FieldValue::Int(party_size_max),
        date.into(),
        fake_time(rng).into(),
    ])
}

/// user ++ restaurant ++ reservation, without the reservation's two id columns
pub fn fake_document<R: Rng>(rng: &mut R, limits: &ReservationLimits) -> Record {
    let mut document = fake_user(rng);
    document.extend_from(fake_restaurant(rng), 0);
    document.extend_from(fake_reservation(rng, limits), 2);
    document
}

/// `hh:mm AM|PM`, always zero padded to two digits
fn fake_time<R: Rng>(rng: &mut R) -> String {
    let hour = rng.gen_range(0..=12);
    let minute = rng.gen_range(0..60);
    let period = if rng.gen_bool(0.5) { "AM" } else { "PM" };
    format!("{:02}:{:02} {}", hour, minute, period)
}

fn fake_url<R: Rng>(rng: &mut R) -> String {
    let host: String = Username().fake_with_rng(rng);
    let host: String = host
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("http://{}.{}", host, suffix)
}
