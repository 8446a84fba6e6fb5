//! # Seed Data Generator
//!
//! Populates the database with demo drugs and suppliers for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 drugs (default)
//! cargo run -p pharmacy-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p pharmacy-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p pharmacy-db --bin seed -- --db ./data/pharmacy.db
//! ```
//!
//! ## Generated Data
//! - One supplier per entry in [`SUPPLIERS`]
//! - Drugs named `{base} {strength}`, keyed `{PREFIX}-{INDEX:04}`
//! - Price $0.50 - $24.50, stock 0 - 120
//! - Each drug linked to one supplier, on both sides

use clap::Parser;
use pharmacy_core::{Drug, Supplier, SupplierRef};
use pharmacy_db::{Database, DbConfig, DbResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// `(key, name, contact)` for each demo supplier.
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("SUP-ERN", "Ernest Chemists", "orders@ernest.example"),
    ("SUP-KIN", "Kinapharma", "sales@kinapharma.example"),
    ("SUP-TOB", "Tobinco Pharmaceuticals", "+233 30 000 0001"),
    ("SUP-M&G", "M&G Pharmaceuticals", "+233 30 000 0002"),
];

/// `(key prefix, base name)` for each demo drug family.
const DRUGS: &[(&str, &str)] = &[
    ("AMX", "Amoxicillin"),
    ("PCM", "Paracetamol"),
    ("IBU", "Ibuprofen"),
    ("CIP", "Ciprofloxacin"),
    ("MET", "Metformin"),
    ("AML", "Amlodipine"),
    ("OMP", "Omeprazole"),
    ("AZM", "Azithromycin"),
    ("LOR", "Loratadine"),
    ("ART", "Artemether-Lumefantrine"),
];

const STRENGTHS: &[&str] = &["100mg", "250mg", "500mg", "1g", "5ml Syrup"];

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Pharmacy catalog seed data generator")]
struct Args {
    /// Number of drugs to generate
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Database file path
    #[arg(short, long, default_value = "./pharmacy_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    info!(db = %args.db, count = args.count, "Seeding pharmacy catalog");

    let db = Database::new(DbConfig::new(&args.db)).await?;

    let existing = db.drugs().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has drugs, skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let (generated, suppliers) = seed_catalog(&db, args.count).await?;

    let elapsed = start.elapsed();
    info!(
        generated,
        suppliers,
        elapsed_ms = elapsed.as_millis() as u64,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}

/// Inserts `count` generated drugs and the demo suppliers.
///
/// A supplier lists a drug only once that drug is stored. Returns the
/// number of drugs stored and the number of suppliers saved.
async fn seed_catalog(db: &Database, count: usize) -> DbResult<(usize, usize)> {
    let mut suppliers: Vec<Supplier> = SUPPLIERS
        .iter()
        .map(|(id, name, contact)| Supplier::new(*id, *name, *contact))
        .collect();

    let mut generated = 0;
    for index in 0..count {
        let supplier = &mut suppliers[index % SUPPLIERS.len()];
        let mut drug = generate_drug(index);
        drug.add_supplier(SupplierRef::from(&*supplier));

        if let Err(e) = db.drugs().upsert(&drug).await {
            warn!(id = %drug.id, error = %e, "Failed to insert drug");
            continue;
        }
        supplier.add_supplied_drug(&drug.id);

        generated += 1;
        if generated % 100 == 0 {
            info!(generated, "Progress");
        }
    }

    for supplier in &suppliers {
        db.suppliers().upsert(supplier).await?;
    }

    Ok((generated, suppliers.len()))
}

/// Builds the drug at `index` with deterministic name, price and stock.
fn generate_drug(index: usize) -> Drug {
    let (prefix, base) = DRUGS[index % DRUGS.len()];
    let strength = STRENGTHS[(index / DRUGS.len()) % STRENGTHS.len()];

    let id = format!("{prefix}-{index:04}");
    let name = format!("{base} {strength}");
    let price_cents = 50 + (index * 37) % 2_400;
    let stock = (index * 13) % 121;

    Drug::new(id, name, stock as u32, price_cents as f64 / 100.0)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pharmacy_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_links_both_sides() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (generated, suppliers) = seed_catalog(&db, 12).await.unwrap();
        assert_eq!(generated, 12);
        assert_eq!(suppliers, SUPPLIERS.len());

        let drugs = db.drugs().load_all().await.unwrap();
        for supplier in db.suppliers().load_all().await.unwrap() {
            for drug_id in &supplier.supplied_drug_ids {
                let drug = drugs.iter().find(|d| &d.id == drug_id).unwrap();
                assert!(drug.has_supplier(&supplier.id));
            }
        }
    }

    #[tokio::test]
    async fn test_failed_insert_is_not_listed_by_supplier() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_first_drug BEFORE INSERT ON drugs \
             WHEN NEW.id = 'AMX-0000' BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let (generated, _) = seed_catalog(&db, 8).await.unwrap();
        assert_eq!(generated, 7);

        let first = db.suppliers().get_by_id(SUPPLIERS[0].0).await.unwrap().unwrap();
        assert!(!first.supplies("AMX-0000"));
        assert!(first.supplies("MET-0004"));
    }
}
