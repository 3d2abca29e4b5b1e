//! Shared fixtures for db-layer tests.
//!
//! Every test runs against its own in-memory database with migrations
//! applied, seeded with one category per bucket kind and one discipline.

use chrono::Utc;
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use chiffrage_core::{
    CatalogItem, Category, CategoryKind, CustomRequest, Discipline, Project, RequestStatus,
    Summary, UnitKind,
};

/// Reference data present in every test database.
pub(crate) struct RefData {
    pub material: Category,
    pub labor: Category,
    pub transport: Category,
    pub study: Category,
    pub discipline: Discipline,
}

impl RefData {
    pub(crate) fn category(&self, kind: CategoryKind) -> &Category {
        match kind {
            CategoryKind::Material => &self.material,
            CategoryKind::Labor => &self.labor,
            CategoryKind::Transport => &self.transport,
            CategoryKind::Study => &self.study,
        }
    }
}

/// Fresh in-memory database with migrations applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

fn category(kind: CategoryKind, code: &str) -> Category {
    Category {
        id: Uuid::new_v4().to_string(),
        name: code.to_string(),
        kind,
        code: code.to_string(),
        description: None,
    }
}

/// Seeds one category per kind plus a discipline.
pub(crate) async fn seed_reference(db: &Database) -> RefData {
    let refs = RefData {
        material: category(CategoryKind::Material, "MAT"),
        labor: category(CategoryKind::Labor, "LAB"),
        transport: category(CategoryKind::Transport, "TRA"),
        study: category(CategoryKind::Study, "STU"),
        discipline: Discipline {
            id: Uuid::new_v4().to_string(),
            name: "Piping".to_string(),
            code: "PIP".to_string(),
            color: "#007bff".to_string(),
        },
    };

    let reference = db.reference();
    for cat in [&refs.material, &refs.labor, &refs.transport, &refs.study] {
        reference.insert_category(cat).await.expect("seed category");
    }
    reference
        .insert_discipline(&refs.discipline)
        .await
        .expect("seed discipline");

    refs
}

/// Creates a project.
pub(crate) async fn create_project(db: &Database, name: &str) -> Project {
    db.projects()
        .create(name, Some("ACME Industries"))
        .await
        .expect("create project")
}

/// Creates an active catalog item priced in cents under the given kind.
pub(crate) async fn create_item(
    db: &Database,
    refs: &RefData,
    kind: CategoryKind,
    price_cents: i64,
) -> CatalogItem {
    let now = Utc::now();
    let item = CatalogItem {
        id: Uuid::new_v4().to_string(),
        number: None,
        designation: format!("test item {kind:?}"),
        characteristics: None,
        unit_price_cents: price_cents,
        unit: UnitKind::Each,
        category_id: refs.category(kind).id.clone(),
        discipline_id: refs.discipline.id.clone(),
        active: true,
        created_at: now,
        updated_at: now,
    };
    db.catalog().insert(&item).await.expect("insert item");
    item
}

/// Creates a pending custom request for a project.
pub(crate) async fn create_request(
    db: &Database,
    refs: &RefData,
    project_id: &str,
    kind: CategoryKind,
    quantity_hundredths: i64,
) -> CustomRequest {
    let request = CustomRequest {
        id: Uuid::new_v4().to_string(),
        project_id: project_id.to_string(),
        category_id: refs.category(kind).id.clone(),
        discipline_id: refs.discipline.id.clone(),
        designation: "custom line".to_string(),
        characteristics: None,
        unit: UnitKind::Each,
        quantity_hundredths,
        status: RequestStatus::Pending,
        admin_price_cents: None,
        admin_comment: None,
        requested_at: Utc::now(),
        decided_at: None,
    };
    db.requests().insert(&request).await.expect("insert request");
    request
}

/// Asserts two summaries carry identical derived values; the write
/// timestamp is allowed to differ.
pub(crate) fn assert_same_totals(a: &Summary, b: &Summary) {
    assert_eq!(a.project_id, b.project_id);
    assert_eq!(a.bucket_material_cents, b.bucket_material_cents);
    assert_eq!(a.bucket_labor_cents, b.bucket_labor_cents);
    assert_eq!(a.bucket_transport_cents, b.bucket_transport_cents);
    assert_eq!(a.bucket_study_cents, b.bucket_study_cents);
    assert_eq!(a.total_ht_cents, b.total_ht_cents);
    assert_eq!(a.tax_rate_bps, b.tax_rate_bps);
    assert_eq!(a.tax_amount_cents, b.tax_amount_cents);
    assert_eq!(a.total_ttc_cents, b.total_ttc_cents);
}
