use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const GUEST_ROWS: usize = 35;
pub const ROOM_ROWS: usize = 35;
pub const DATE_ROWS: usize = 90;
pub const OTHER_ROWS: usize = 90;

const GUEST_NAMES: [&str; GUEST_ROWS] = [
    "Juan García",
    "Ana López",
    "Pedro Ruiz",
    "María Fernández",
    "Luis Gómez",
    "Carmen Díaz",
    "José Martínez",
    "Laura Sánchez",
    "Miguel Torres",
    "Paula Romero",
    "Javier Navarro",
    "Lucía Moreno",
    "Carlos Jiménez",
    "Elena Álvarez",
    "Antonio Muñoz",
    "Isabel Castro",
    "Francisco Ortiz",
    "Marta Rubio",
    "David Molina",
    "Sara Delgado",
    "Manuel Serrano",
    "Cristina Morales",
    "Alberto Ramos",
    "Raquel Gil",
    "Sergio Vázquez",
    "Patricia Blanco",
    "Jorge Suárez",
    "Beatriz Méndez",
    "Rubén Iglesias",
    "Silvia Cortés",
    "Óscar Herrera",
    "Nuria Prieto",
    "Andrés Medina",
    "Rosa Vidal",
    "Pablo Campos",
];

const ROOM_TYPES: [&str; 10] = [
    "Doble",
    "Individual",
    "Suite",
    "Triple",
    "Deluxe",
    "Familiar",
    "Economy",
    "Superior",
    "Premium",
    "Estándar",
];
const GUESTS_PER_ROOM_TYPE: [u32; 10] = [2, 1, 2, 3, 2, 4, 1, 2, 2, 2];
const ROOMS_PER_FLOOR: usize = 7;

const FIRST_CHECK_IN: (i32, u32, u32) = (2026, 2, 15);

const NIGHTS: [u32; 10] = [1, 2, 3, 4, 5, 2, 3, 1, 4, 2];
const BASE_RATES: [f64; 10] = [
    100.0, 120.0, 150.0, 200.0, 180.0, 130.0, 160.0, 140.0, 170.0, 190.0,
];
const PAYMENT_METHODS: [&str; 10] = [
    "credit_card",
    "cash",
    "paypal",
    "bank_transfer",
    "credit_card",
    "cash",
    "paypal",
    "credit_card",
    "cash",
    "paypal",
];
const PAID: [bool; 10] = [true, false, true, true, false, true, false, true, true, false];
const STATUSES: [ReservationStatus; 10] = [
    ReservationStatus::Confirmed,
    ReservationStatus::Pending,
    ReservationStatus::Cancelled,
    ReservationStatus::Confirmed,
    ReservationStatus::Pending,
    ReservationStatus::Confirmed,
    ReservationStatus::Cancelled,
    ReservationStatus::Confirmed,
    ReservationStatus::Pending,
    ReservationStatus::Confirmed,
];
const SPECIAL_REQUESTS: [&str; 10] = [
    "Late check-in",
    "Early check-out",
    "Extra bed",
    "Sea view",
    "Breakfast included",
    "No smoking",
    "High floor",
    "Quiet room",
    "Pet friendly",
    "Airport transfer",
];
const FIRST_TIMESTAMP: i64 = 1_707_427_200;
const TIMESTAMP_STEP: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// One reservation as POSTed to the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub room_number: u32,
    pub room_type: String,
    pub number_of_guests: u32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub number_of_nights: u32,
    pub price_per_night: f64,
    pub total_price: f64,
    pub payment_method: String,
    pub paid: bool,
    pub reservation_status: ReservationStatus,
    pub special_requests: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct GuestRow {
    pub name: &'static str,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct RoomRow {
    pub number: u32,
    pub room_type: &'static str,
    pub guests: u32,
}

#[derive(Debug, Clone)]
pub struct DateRow {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct OtherRow {
    pub nights: u32,
    pub price_per_night: f64,
    pub total_price: f64,
    pub payment_method: &'static str,
    pub paid: bool,
    pub status: ReservationStatus,
    pub special_request: &'static str,
    pub timestamp: i64,
}

/// Fixed sample data, built once and shared read-only between workers.
///
/// The four groups are indexed independently, so a payload may pair any
/// guest with any room, date and pricing row.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub guests: Vec<GuestRow>,
    pub rooms: Vec<RoomRow>,
    pub dates: Vec<DateRow>,
    pub others: Vec<OtherRow>,
}

impl ReferenceTables {
    pub fn standard() -> Self {
        let guests = GUEST_NAMES
            .iter()
            .enumerate()
            .map(|(i, &name)| GuestRow {
                name,
                email: format!("user{i}@example.com"),
                phone: format!("+346123456{i:02}"),
            })
            .collect();

        let rooms = (0..ROOM_ROWS)
            .map(|i| {
                let floor = (i / ROOMS_PER_FLOOR) as u32 + 1;
                let kind = i % ROOM_TYPES.len();
                RoomRow {
                    number: floor * 100 + (i % ROOMS_PER_FLOOR) as u32 + 1,
                    room_type: ROOM_TYPES[kind],
                    guests: GUESTS_PER_ROOM_TYPE[kind],
                }
            })
            .collect();

        let (y, m, d) = FIRST_CHECK_IN;
        let first = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let dates = first
            .iter_days()
            .take(DATE_ROWS)
            .map(|check_in| DateRow {
                check_in,
                check_out: check_in + Days::new(1),
            })
            .collect();

        let others = (0..OTHER_ROWS)
            .map(|i| {
                let k = i % 10;
                let nights = NIGHTS[k];
                let price_per_night = BASE_RATES[k] + (i / 10) as f64 * 5.0;
                OtherRow {
                    nights,
                    price_per_night,
                    total_price: price_per_night * f64::from(nights),
                    payment_method: PAYMENT_METHODS[k],
                    paid: PAID[k],
                    status: STATUSES[k],
                    special_request: SPECIAL_REQUESTS[k],
                    timestamp: FIRST_TIMESTAMP + i as i64 * TIMESTAMP_STEP,
                }
            })
            .collect();

        Self {
            guests,
            rooms,
            dates,
            others,
        }
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::standard()
    }
}

/// Draws reservations from the reference tables.
#[derive(Debug, Clone)]
pub struct PayloadGenerator {
    tables: Arc<ReferenceTables>,
    seed: Option<u64>,
}

impl PayloadGenerator {
    pub fn new(tables: Arc<ReferenceTables>, seed: Option<u64>) -> Self {
        Self { tables, seed }
    }

    /// Compose one reservation from four independently drawn row indices.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Reservation {
        let t = &self.tables;
        let guest = &t.guests[rng.gen_range(0..t.guests.len())];
        let room = &t.rooms[rng.gen_range(0..t.rooms.len())];
        let dates = &t.dates[rng.gen_range(0..t.dates.len())];
        let other = &t.others[rng.gen_range(0..t.others.len())];

        Reservation {
            guest_name: guest.name.to_string(),
            guest_email: guest.email.clone(),
            guest_phone: guest.phone.clone(),
            room_number: room.number,
            room_type: room.room_type.to_string(),
            number_of_guests: room.guests,
            check_in_date: dates.check_in,
            check_out_date: dates.check_out,
            number_of_nights: other.nights,
            price_per_night: other.price_per_night,
            total_price: other.total_price,
            payment_method: other.payment_method.to_string(),
            paid: other.paid,
            reservation_status: other.status,
            special_requests: other.special_request.to_string(),
            created_at: other.timestamp,
            updated_at: other.timestamp,
        }
    }

    /// Payload for one request id. Seeded generators derive a fresh rng from
    /// the id so the result does not depend on which worker handles it;
    /// otherwise `worker_rng` is consumed.
    pub fn generate_for(&self, request_id: u64, worker_rng: &mut StdRng) -> Reservation {
        match self.seed {
            Some(seed) => {
                // splitmix64 increment
                let mixed = seed ^ request_id.wrapping_mul(0x9E37_79B9_7F4A_7C15);
                self.generate(&mut StdRng::seed_from_u64(mixed))
            }
            None => self.generate(worker_rng),
        }
    }
}

impl Default for PayloadGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ReferenceTables::standard()), None)
    }
}
