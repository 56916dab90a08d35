// Seeds appointment types, doctors, and a 30-day time-slot grid.
// Usage: cargo run --bin seed

use chrono::{Datelike, Duration, NaiveTime, Utc, Weekday};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const SLOT_MINUTES: i64 = 40;
const SEED_DAYS: i64 = 30;
// Matches the historical seed data: roughly one in five slots starts booked.
const PRE_BOOKED_PROBABILITY: f64 = 0.2;

struct TypeSpec {
    name: &'static str,
    description: &'static str,
    duration_min: i32,
    price_cents: i32,
}

const APPOINTMENT_TYPES: &[TypeSpec] = &[
    TypeSpec { name: "General Checkup", description: "Routine dental examination", duration_min: 30, price_cents: 8000 },
    TypeSpec { name: "Teeth Cleaning", description: "Professional teeth cleaning", duration_min: 45, price_cents: 12000 },
    TypeSpec { name: "Filling", description: "Dental filling procedure", duration_min: 60, price_cents: 15000 },
    TypeSpec { name: "Root Canal", description: "Root canal treatment", duration_min: 90, price_cents: 40000 },
    TypeSpec { name: "Extraction", description: "Tooth extraction", duration_min: 45, price_cents: 18000 },
    TypeSpec { name: "Crown", description: "Dental crown placement", duration_min: 120, price_cents: 50000 },
    TypeSpec { name: "Emergency", description: "Emergency dental care", duration_min: 30, price_cents: 20000 },
];

struct DoctorSpec {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone: &'static str,
    specialties: &'static [&'static str],
}

const DOCTORS: &[DoctorSpec] = &[
    DoctorSpec {
        first_name: "Sarah",
        last_name: "Johnson",
        email: "sarah.johnson@dentalcarecentreuk.co.uk",
        phone: "0207 639 3323",
        specialties: &["General Dentistry", "Preventive Care"],
    },
    DoctorSpec {
        first_name: "Michael",
        last_name: "Chen",
        email: "michael.chen@dentalcarecentreuk.co.uk",
        phone: "0207 639 3324",
        specialties: &["Orthodontics", "Cosmetic Dentistry"],
    },
    DoctorSpec {
        first_name: "Emily",
        last_name: "Davis",
        email: "emily.davis@dentalcarecentreuk.co.uk",
        phone: "0207 639 3325",
        specialties: &["Oral Surgery", "Implantology"],
    },
    DoctorSpec {
        first_name: "James",
        last_name: "Wilson",
        email: "james.wilson@dentalcarecentreuk.co.uk",
        phone: "0207 639 3326",
        specialties: &["Periodontics", "Gum Treatment"],
    },
];

/// One working day: 09:00 to 17:00 in 40-minute steps. The last slot starts
/// at 16:00 so nothing runs past closing.
fn day_slot_grid() -> Vec<(NaiveTime, NaiveTime)> {
    let mut slots = Vec::new();
    for hour in 9..17u32 {
        for minutes in (0..60u32).step_by(SLOT_MINUTES as usize) {
            if hour == 16 && minutes > 0 {
                break;
            }
            let start = NaiveTime::from_hms_opt(hour, minutes, 0).unwrap();
            let end = start.overflowing_add_signed(Duration::minutes(SLOT_MINUTES)).0;
            slots.push((start, end));
        }
    }
    slots
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    for t in APPOINTMENT_TYPES {
        sqlx::query(
            r#"
            INSERT INTO appointment_type (name, description, duration_min, price_cents)
            VALUES ($1,$2,$3,$4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(t.name)
        .bind(t.description)
        .bind(t.duration_min)
        .bind(t.price_cents)
        .execute(&pool)
        .await?;
    }

    let mut doctor_ids: Vec<Uuid> = Vec::new();
    for d in DOCTORS {
        sqlx::query(
            r#"
            INSERT INTO doctor (first_name, last_name, email, phone, specialties)
            VALUES ($1,$2,$3,$4,$5)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(d.first_name)
        .bind(d.last_name)
        .bind(d.email)
        .bind(d.phone)
        .bind(d.specialties.iter().map(|s| s.to_string()).collect::<Vec<_>>())
        .execute(&pool)
        .await?;

        let doctor_id: Uuid =
            sqlx::query_scalar(r#"SELECT doctor_id FROM doctor WHERE email = $1"#)
                .bind(d.email)
                .fetch_one(&pool)
                .await?;
        doctor_ids.push(doctor_id);
    }

    let grid = day_slot_grid();
    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();
    let mut slot_count: u64 = 0;

    for day in 0..SEED_DAYS {
        let date = today + Duration::days(day);
        if is_weekend(date.weekday()) {
            continue;
        }

        for doctor_id in &doctor_ids {
            for (start, end) in &grid {
                let res = sqlx::query(
                    r#"
                    INSERT INTO time_slot (doctor_id, slot_date, start_time, end_time, is_booked)
                    VALUES ($1,$2,$3,$4,$5)
                    ON CONFLICT (doctor_id, slot_date, start_time) DO NOTHING
                    "#,
                )
                .bind(doctor_id)
                .bind(date)
                .bind(start)
                .bind(end)
                .bind(rng.gen_bool(PRE_BOOKED_PROBABILITY))
                .execute(&pool)
                .await?;
                slot_count += res.rows_affected();
            }
        }
    }

    println!("Database seeded successfully!");
    println!("{} appointment types", APPOINTMENT_TYPES.len());
    println!("{} doctors", DOCTORS.len());
    println!("{slot_count} new time slots");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn grid_has_fifteen_slots_per_day() {
        let grid = day_slot_grid();
        assert_eq!(grid.len(), 15);
        assert_eq!(grid[0].0, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(grid[0].1, NaiveTime::from_hms_opt(9, 40, 0).unwrap());
        assert_eq!(grid[14].0, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        assert_eq!(grid[14].1, NaiveTime::from_hms_opt(16, 40, 0).unwrap());
    }

    #[test]
    fn grid_slots_are_forty_minutes_and_ordered() {
        let grid = day_slot_grid();
        for window in grid.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
        for (start, end) in grid {
            assert_eq!(end - start, Duration::minutes(40));
        }
    }

    #[test]
    fn weekends_are_skipped() {
        // 2026-08-29 is a Saturday.
        let saturday = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert!(is_weekend(saturday.weekday()));
        assert!(is_weekend(saturday.succ_opt().unwrap().weekday()));
        assert!(!is_weekend(saturday.pred_opt().unwrap().weekday()));
    }
}
