//! Typed views over tenant, category, and group rows.
//!
//! Resource fetchers keep every vendor field in a [`Table`]; these structs pick
//! out the handful of fields the orchestrator needs to drive further requests.

use serde::{Deserialize, Serialize};

use crate::table::{Row, Table};

/// Column names the vendor API and the extractor agree on.
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const CATEGORY_ID: &str = "categoryId";
    pub const CATEGORY_NAME: &str = "categoryName";
    /// Added to groups by the groups-with-category join.
    pub const JOINED_CATEGORY_NAME: &str = "category_name";
    pub const GROUP_ID: &str = "groupId";
    pub const GROUP_NAME: &str = "groupName";
    pub const PROFILE_ID: &str = "profileId";
    pub const GIVEN_NAME: &str = "givenName";
    pub const FAMILY_NAME: &str = "familyName";
    pub const DATE_OF_BIRTH: &str = "dateOfBirth";
    /// Added by the extractor to every record; never sent by the API.
    pub const TENANT_ID: &str = "tenant_id";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A group, optionally carrying the name of its joined category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub category_name: Option<String>,
}

impl Tenant {
    /// Read a tenant from a row. Rows without an id are skipped.
    #[must_use]
    pub fn from_row(row: Row<'_>) -> Option<Self> {
        Some(Self {
            id: row.text(columns::ID)?,
            name: row.text(columns::NAME).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().filter_map(Self::from_row).collect()
    }
}

impl Category {
    #[must_use]
    pub fn from_row(row: Row<'_>) -> Option<Self> {
        Some(Self {
            id: row.text(columns::ID)?,
            name: row.text(columns::NAME).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().filter_map(Self::from_row).collect()
    }
}

impl Group {
    #[must_use]
    pub fn from_row(row: Row<'_>) -> Option<Self> {
        Some(Self {
            id: row.text(columns::ID)?,
            name: row.text(columns::NAME).unwrap_or_default(),
            category_id: row.text(columns::CATEGORY_ID).unwrap_or_default(),
            category_name: row.text(columns::JOINED_CATEGORY_NAME),
        })
    }

    #[must_use]
    pub fn all(table: &Table) -> Vec<Self> {
        table.rows().filter_map(Self::from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;
    use serde_json::json;

    #[test]
    fn reads_entities_and_skips_rows_without_id() {
        let rows: Vec<Record> = [
            json!({"id": "g1", "name": "U18", "categoryId": "c1", "category_name": "Academy"}),
            json!({"name": "orphan"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        let table = Table::from_records(&rows);

        let groups = Group::all(&table);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category_id, "c1");
        assert_eq!(groups[0].category_name.as_deref(), Some("Academy"));
    }

    #[test]
    fn numeric_ids_render_as_text() {
        let rows: Vec<Record> = [json!({"id": 17, "name": "Club"})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        let tenants = Tenant::all(&Table::from_records(&rows));
        assert_eq!(tenants[0].id, "17");
    }
}
