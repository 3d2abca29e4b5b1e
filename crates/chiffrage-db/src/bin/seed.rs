//! # Seed Data Generator
//!
//! Populates a database with the standard reference data: categories,
//! disciplines, and a starter catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p chiffrage-db --bin seed
//!
//! # Specify a database path
//! cargo run -p chiffrage-db --bin seed -- --db ./data/chiffrage.db
//! ```

use std::env;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use chiffrage_core::{CatalogItem, Category, CategoryKind, Discipline, UnitKind};
use chiffrage_db::{Database, DbConfig};

/// Standard categories: (code, name, kind).
const CATEGORIES: &[(&str, &str, CategoryKind)] = &[
    ("MAT-PIP", "Piping materials", CategoryKind::Material),
    ("MAT-STL", "Structural steel", CategoryKind::Material),
    ("MAT-ELE", "Electrical materials", CategoryKind::Material),
    ("LAB-FAB", "Fabrication labor", CategoryKind::Labor),
    ("LAB-ERE", "Erection labor", CategoryKind::Labor),
    ("LAB-SAB", "Surface preparation", CategoryKind::Labor),
    ("TRA-SIT", "Site transport", CategoryKind::Transport),
    ("TRA-LOG", "Logistics", CategoryKind::Transport),
    ("STU-ENG", "Engineering studies", CategoryKind::Study),
    ("STU-INS", "Inspection and QA", CategoryKind::Study),
];

/// Standard disciplines: (code, name, color).
const DISCIPLINES: &[(&str, &str, &str)] = &[
    ("PIP", "Piping", "#007bff"),
    ("STR", "Structural", "#6c757d"),
    ("ELE", "Electrical", "#ffc107"),
    ("INS", "Instrumentation", "#17a2b8"),
    ("CIV", "Civil", "#28a745"),
];

/// Starter catalog: (number, designation, unit, price cents, category
/// code, discipline code).
const CATALOG: &[(&str, &str, UnitKind, i64, &str, &str)] = &[
    ("1.1.1", "Carbon steel pipe DN 50 sch 40", UnitKind::LinearMeter, 850_000, "MAT-PIP", "PIP"),
    ("1.1.2", "Carbon steel pipe DN 100 sch 40", UnitKind::LinearMeter, 1_450_000, "MAT-PIP", "PIP"),
    ("1.1.3", "Carbon steel pipe DN 200 sch 40", UnitKind::LinearMeter, 3_250_000, "MAT-PIP", "PIP"),
    ("1.2.1", "90 deg elbow DN 100", UnitKind::Each, 950_000, "MAT-PIP", "PIP"),
    ("1.2.2", "Weld neck flange DN 100 PN16", UnitKind::Each, 1_250_000, "MAT-PIP", "PIP"),
    ("2.1.1", "HEA 200 beam", UnitKind::Kilogram, 2_500, "MAT-STL", "STR"),
    ("2.1.2", "Checkered plate 5mm", UnitKind::SquareMeter, 185_000, "MAT-STL", "STR"),
    ("3.1.1", "Power cable 3x95mm2", UnitKind::LinearMeter, 125_000, "MAT-ELE", "ELE"),
    ("4.1.1", "Pipe welder", UnitKind::Hour, 75_000, "LAB-FAB", "PIP"),
    ("4.1.2", "Pipe fitter", UnitKind::Hour, 60_000, "LAB-FAB", "PIP"),
    ("4.2.1", "Erection crew", UnitKind::Day, 1_800_000, "LAB-ERE", "STR"),
    ("5.1.1", "Flatbed truck, site round trip", UnitKind::Each, 450_000, "TRA-SIT", "CIV"),
    ("5.2.1", "Crane mobilization", UnitKind::LumpSum, 7_500_000, "TRA-LOG", "STR"),
    ("6.1.1", "Isometric drawing package", UnitKind::Set, 3_500_000, "STU-ENG", "PIP"),
    ("6.2.1", "Weld radiographic testing", UnitKind::Each, 250_000, "STU-INS", "INS"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./chiffrage_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("chiffrage seed data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./chiffrage_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("chiffrage seed data generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("Connected, migrations applied");

    // Skip if reference data already exists
    let existing = db.reference().count_categories().await?;
    if existing > 0 {
        println!("Database already has {} categories", existing);
        println!("Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Seeding reference data...");

    let reference = db.reference();
    let mut category_ids = std::collections::HashMap::new();
    for (code, name, kind) in CATEGORIES {
        let cat = Category {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            kind: *kind,
            code: (*code).to_string(),
            description: None,
        };
        reference.insert_category(&cat).await?;
        category_ids.insert(*code, cat.id);
    }
    println!("  {} categories", CATEGORIES.len());

    let mut discipline_ids = std::collections::HashMap::new();
    for (code, name, color) in DISCIPLINES {
        let discipline = Discipline {
            id: Uuid::new_v4().to_string(),
            name: (*name).to_string(),
            code: (*code).to_string(),
            color: (*color).to_string(),
        };
        reference.insert_discipline(&discipline).await?;
        discipline_ids.insert(*code, discipline.id);
    }
    println!("  {} disciplines", DISCIPLINES.len());

    let catalog = db.catalog();
    let now = Utc::now();
    let mut inserted = 0;
    for (number, designation, unit, price_cents, category_code, discipline_code) in CATALOG {
        let item = CatalogItem {
            id: Uuid::new_v4().to_string(),
            number: Some((*number).to_string()),
            designation: (*designation).to_string(),
            characteristics: None,
            unit_price_cents: *price_cents,
            unit: *unit,
            category_id: category_ids[category_code].clone(),
            discipline_id: discipline_ids[discipline_code].clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = catalog.insert(&item).await {
            eprintln!("Failed to insert {}: {}", item.designation, e);
            continue;
        }
        inserted += 1;
    }
    println!("  {} catalog items", inserted);

    println!();
    println!("Seed complete.");

    Ok(())
}
