use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use stayscope::BookingRecord;

const ROWS: usize = 1000;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick a value from weighted options.
    fn weighted<'a>(&mut self, options: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = options.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (value, weight) in options {
            if roll < *weight {
                return value;
            }
            roll -= weight;
        }
        options.last().expect("options must not be empty").0
    }
}

fn synth_booking(rng: &mut SimpleRng) -> BookingRecord {
    let hotel = rng.weighted(&[
        ("City Hotel", 0.5),
        ("Resort Hotel", 0.4),
        ("Conference Hotel", 0.1),
    ]);
    let country = rng.weighted(&[
        ("PRT", 0.40),
        ("GBR", 0.15),
        ("FRA", 0.12),
        ("ESP", 0.10),
        ("DEU", 0.08),
        ("ITA", 0.05),
        ("NLD", 0.04),
        ("USA", 0.03),
        ("", 0.03), // origin not recorded
    ]);
    let distribution_channel = rng.weighted(&[
        ("TA/TO", 0.70),
        ("Direct", 0.20),
        ("Corporate", 0.08),
        ("GDS", 0.02),
    ]);
    let deposit_type = rng.weighted(&[
        ("No Deposit", 0.87),
        ("Non Refund", 0.12),
        ("Refundable", 0.01),
    ]);

    let lead_time = rng.gauss(80.0, 70.0).abs().min(600.0) as u32;
    let base_adr = match hotel {
        "Resort Hotel" => rng.gauss(95.0, 45.0),
        "Conference Hotel" => rng.gauss(70.0, 25.0),
        _ => rng.gauss(105.0, 35.0),
    };

    let children = if rng.next_f64() < 0.08 {
        1 + (rng.next_f64() * 2.0) as u32
    } else {
        0
    };
    let babies = u32::from(rng.next_f64() < 0.02);

    // Long-lead bookings cancel more often; non-refundable deposits show
    // the same inverted pattern the raw dataset does.
    let cancel_p = if deposit_type == "Non Refund" {
        0.95
    } else {
        0.20 + f64::from(lead_time) / 1200.0
    };

    BookingRecord {
        hotel: hotel.to_string(),
        country: country.to_string(),
        market_segment: rng
            .weighted(&[
                ("Online TA", 0.50),
                ("Offline TA/TO", 0.20),
                ("Direct", 0.15),
                ("Corporate", 0.10),
                ("Groups", 0.05),
            ])
            .to_string(),
        distribution_channel: distribution_channel.to_string(),
        customer_type: rng
            .weighted(&[
                ("Transient", 0.75),
                ("Transient-Party", 0.15),
                ("Contract", 0.06),
                ("Group", 0.04),
            ])
            .to_string(),
        deposit_type: deposit_type.to_string(),
        meal: rng
            .weighted(&[("BB", 0.77), ("HB", 0.12), ("SC", 0.08), ("FB", 0.03)])
            .to_string(),
        arrival_date_month: MONTHS[(rng.next_f64() * 12.0) as usize % 12].to_string(),
        lead_time,
        adr: base_adr.max(0.0),
        stays_in_weekend_nights: (rng.next_f64() * 3.0) as u32,
        stays_in_week_nights: (rng.next_f64() * 5.0) as u32,
        adults: 1 + (rng.next_f64() * 3.0) as u32,
        children,
        babies,
        previous_cancellations: u32::from(rng.next_f64() < 0.05),
        total_of_special_requests: (rng.next_f64() * 4.0) as u32,
        is_canceled: rng.next_f64() < cancel_p,
        is_repeated_guest: rng.next_f64() < 0.04,
    }
}

fn write_csv(records: &[BookingRecord], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(records: &[BookingRecord], path: &Path) -> anyhow::Result<()> {
    let strings = |get: fn(&BookingRecord) -> &str| {
        StringArray::from(records.iter().map(get).collect::<Vec<_>>())
    };
    let counts = |get: fn(&BookingRecord) -> u32| {
        Int64Array::from(records.iter().map(|r| i64::from(get(r))).collect::<Vec<_>>())
    };
    let flags = |get: fn(&BookingRecord) -> bool| {
        BooleanArray::from(records.iter().map(get).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("hotel", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("market_segment", DataType::Utf8, false),
        Field::new("distribution_channel", DataType::Utf8, false),
        Field::new("customer_type", DataType::Utf8, false),
        Field::new("deposit_type", DataType::Utf8, false),
        Field::new("meal", DataType::Utf8, false),
        Field::new("arrival_date_month", DataType::Utf8, false),
        Field::new("lead_time", DataType::Int64, false),
        Field::new("adr", DataType::Float64, false),
        Field::new("stays_in_weekend_nights", DataType::Int64, false),
        Field::new("stays_in_week_nights", DataType::Int64, false),
        Field::new("adults", DataType::Int64, false),
        Field::new("children", DataType::Int64, false),
        Field::new("babies", DataType::Int64, false),
        Field::new("previous_cancellations", DataType::Int64, false),
        Field::new("total_of_special_requests", DataType::Int64, false),
        Field::new("is_canceled", DataType::Boolean, false),
        Field::new("is_repeated_guest", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(strings(|r| &r.hotel)),
            Arc::new(strings(|r| &r.country)),
            Arc::new(strings(|r| &r.market_segment)),
            Arc::new(strings(|r| &r.distribution_channel)),
            Arc::new(strings(|r| &r.customer_type)),
            Arc::new(strings(|r| &r.deposit_type)),
            Arc::new(strings(|r| &r.meal)),
            Arc::new(strings(|r| &r.arrival_date_month)),
            Arc::new(counts(|r| r.lead_time)),
            Arc::new(Float64Array::from(
                records.iter().map(|r| r.adr).collect::<Vec<_>>(),
            )),
            Arc::new(counts(|r| r.stays_in_weekend_nights)),
            Arc::new(counts(|r| r.stays_in_week_nights)),
            Arc::new(counts(|r| r.adults)),
            Arc::new(counts(|r| r.children)),
            Arc::new(counts(|r| r.babies)),
            Arc::new(counts(|r| r.previous_cancellations)),
            Arc::new(counts(|r| r.total_of_special_requests)),
            Arc::new(flags(|r| r.is_canceled)),
            Arc::new(flags(|r| r.is_repeated_guest)),
        ],
    )
    .context("assembling record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let records: Vec<BookingRecord> = (0..ROWS).map(|_| synth_booking(&mut rng)).collect();

    write_csv(&records, Path::new("sample_bookings.csv"))?;
    write_parquet(&records, Path::new("sample_bookings.parquet"))?;

    println!("Wrote {ROWS} bookings to sample_bookings.csv and sample_bookings.parquet");
    Ok(())
}
