//! Sample payloads for exercising the JSON queue during development.

use std::io;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;

const NAMES: [&str; 4] = ["John Doe", "Jane Smith", "Bob Johnson", "Alice Williams"];
const PRODUCTS: [&str; 4] = ["Laptop", "Phone", "Tablet", "Monitor"];
const ORDER_STATUSES: [&str; 3] = ["pending", "completed", "cancelled"];
const EVENTS: [&str; 4] = ["user_login", "user_logout", "purchase", "view_product"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Order {
    pub order_id: String,
    pub product: String,
    pub amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EventRecord {
    pub event: String,
    pub user_id: u32,
    pub ip_address: String,
    pub session_id: String,
}

/// One of the three fixed payload shapes.
///
/// Untagged so the wire form is the bare record, exactly as consumers see it.
/// Parsing goes through `Value` so exact-number JSON stays readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged, try_from = "Value")]
pub enum SampleRecord {
    UserProfile(UserProfile),
    Order(Order),
    Event(EventRecord),
}

impl SampleRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserProfile(_) => "user_profile",
            Self::Order(_) => "order",
            Self::Event(_) => "event",
        }
    }
}

impl TryFrom<Value> for SampleRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Ok(user) = serde_json::from_value(value.clone()) {
            return Ok(Self::UserProfile(user));
        }
        if let Ok(order) = serde_json::from_value(value.clone()) {
            return Ok(Self::Order(order));
        }
        serde_json::from_value(value)
            .map(Self::Event)
            .map_err(|_| "data did not match any sample record shape".to_string())
    }
}

/// Pick one shape uniformly and fill it with random values.
pub fn generate_record<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> SampleRecord {
    match rng.gen_range(0..3) {
        0 => SampleRecord::UserProfile(UserProfile {
            id: rng.gen_range(1000..=9999),
            name: pick(rng, &NAMES).to_string(),
            email: format!("user{}@example.com", rng.gen_range(1..=100)),
            timestamp: now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        }),
        1 => SampleRecord::Order(Order {
            order_id: format!("ORD-{}", rng.gen_range(10000..=99999)),
            product: pick(rng, &PRODUCTS).to_string(),
            amount: round_cents(rng.gen_range(10.0..1000.0)),
            status: pick(rng, &ORDER_STATUSES).to_string(),
        }),
        _ => SampleRecord::Event(EventRecord {
            event: pick(rng, &EVENTS).to_string(),
            user_id: rng.gen_range(1..=1000),
            ip_address: format!(
                "192.168.{}.{}",
                rng.gen_range(1..=255),
                rng.gen_range(1..=255)
            ),
            session_id: format!("sess_{}", rng.gen_range(100000..=999999)),
        }),
    }
}

/// Two-space indented JSON with non-ASCII characters written as `\uXXXX`
/// escapes, the form messages are sent in.
pub fn pretty_json(value: impl Serialize) -> String {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, AsciiPrettyFormatter::default());
    value
        .serialize(&mut serializer)
        .expect("serialization of message value should not fail");
    String::from_utf8(buffer).expect("escaped JSON is ASCII")
}

#[derive(Default)]
struct AsciiPrettyFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.pretty.end_object_value(writer)
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options[rng.gen_range(0..options.len())]
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
