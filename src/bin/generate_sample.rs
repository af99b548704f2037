use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use covid_cases::data::model::column_label_for;

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
}

/// Cumulative counts: each day adds a random share of `daily_growth`. About
/// three days in ten add nothing.
fn cumulative_series(days: usize, start: u64, daily_growth: f64, rng: &mut SimpleRng) -> Vec<u64> {
    let mut total = start;
    (0..days)
        .map(|_| {
            if rng.next_f64() > 0.3 {
                total += (rng.next_f64() * daily_growth) as u64;
            }
            total
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let first_day = NaiveDate::from_ymd_opt(2020, 1, 22).context("invalid start date")?;
    let days = 60;
    let labels: Vec<String> = (0..days)
        .map(|i| column_label_for(first_day + Duration::days(i as i64)))
        .collect();

    // (province, country, lat, long, initial count, daily growth)
    let regions: &[(&str, &str, f64, f64, u64, f64)] = &[
        ("Hubei", "China", 30.9756, 112.2707, 444, 2500.0),
        ("Guangdong", "China", 23.3417, 113.4244, 26, 60.0),
        ("Beijing", "China", 40.1824, 116.4142, 14, 20.0),
        ("", "Korea, South", 36.0, 128.0, 1, 150.0),
        ("Diamond Princess", "Cruise Ship", 35.4437, 139.638, 0, 20.0),
        ("", "Italy", 43.0, 12.0, 0, 300.0),
        ("", "Iran", 32.0, 53.0, 0, 200.0),
        ("", "Poland", 51.9194, 19.1451, 0, 5.0),
        ("", "Germany", 51.0, 9.0, 0, 40.0),
        ("", "France", 47.0, 2.0, 0, 50.0),
        ("New South Wales", "Australia", -33.8688, 151.2093, 0, 3.0),
        ("Victoria", "Australia", -37.8136, 144.9631, 0, 2.0),
        ("", "Japan", 36.0, 138.0, 2, 15.0),
    ];

    let output_path = "sample_confirmed.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec![
        "Province/State".to_string(),
        "Country/Region".to_string(),
        "Lat".to_string(),
        "Long".to_string(),
    ];
    header.extend(labels.iter().cloned());
    writer.write_record(&header).context("writing header")?;

    for &(province, country, lat, long, start, growth) in regions {
        let counts = cumulative_series(days, start, growth, &mut rng);
        log::debug!(
            "{country} {province}: {} cases on the last day",
            counts.last().copied().unwrap_or(0)
        );
        let mut record = vec![
            province.to_string(),
            country.to_string(),
            lat.to_string(),
            long.to_string(),
        ];
        record.extend(counts.iter().map(u64::to_string));
        writer
            .write_record(&record)
            .with_context(|| format!("writing row for {country}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!(
        "Wrote {} regions ({} date columns each) to {output_path}",
        regions.len(),
        labels.len()
    );
    Ok(())
}
