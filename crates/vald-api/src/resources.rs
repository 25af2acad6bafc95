//! Single-page resource fetchers: tenants, categories, groups, profiles.

use vald_core::entities::columns;
use vald_core::{Cell, Group, Table};

use crate::decode::records_under;
use crate::error::ApiError;
use crate::http::check_response;
use crate::{ValdClient, table_or_log};

impl ValdClient {
    /// Every tenant the credentials can see. Empty on any failure.
    pub async fn tenants(&self, token: &str) -> Table {
        table_or_log(self.try_tenants(token).await, "tenants", "")
    }

    /// Categories of one tenant, tagged with `tenant_id`. Empty on any failure.
    pub async fn categories(&self, token: &str, tenant_id: &str) -> Table {
        let result = self
            .try_tenant_resource(&self.config.categories_url, "categories", token, tenant_id)
            .await;
        table_or_log(result, "categories", tenant_id)
    }

    /// Groups of one tenant, tagged with `tenant_id`. Empty on any failure.
    pub async fn groups(&self, token: &str, tenant_id: &str) -> Table {
        let result = self
            .try_tenant_resource(&self.config.groups_url, "groups", token, tenant_id)
            .await;
        table_or_log(result, "groups", tenant_id)
    }

    /// Append the profiles of `group` to `into`.
    ///
    /// Each profile row is tagged with the tenant and with the group's id,
    /// name, category id, and category name. A failed fetch appends nothing.
    /// Profiles in several groups appear once per group.
    pub async fn profiles(&self, token: &str, tenant_id: &str, group: &Group, into: &mut Table) {
        let result = self.try_profiles(token, tenant_id, group).await;
        let mut fetched = table_or_log(result, "profiles", tenant_id);
        if fetched.is_empty() {
            tracing::debug!(tenant_id, group_id = %group.id, "no profiles in group");
            return;
        }
        fetched.set_constant(columns::TENANT_ID, &Cell::from(tenant_id));
        fetched.set_constant(columns::GROUP_ID, &Cell::from(group.id.as_str()));
        fetched.set_constant(columns::GROUP_NAME, &Cell::from(group.name.as_str()));
        fetched.set_constant(columns::CATEGORY_ID, &Cell::from(group.category_id.as_str()));
        fetched.set_constant(
            columns::CATEGORY_NAME,
            &Cell::from(group.category_name.clone()),
        );
        tracing::debug!(tenant_id, group_id = %group.id, rows = fetched.len(), "fetched profiles");
        into.append(fetched);
    }

    async fn try_tenants(&self, token: &str) -> Result<Table, ApiError> {
        let resp = self.get(&self.config.tenants_url, token, &[]).await?;
        let body = check_response(resp).await?.text().await?;
        Ok(Table::from_records(&records_under(&body, "tenants")?))
    }

    async fn try_tenant_resource(
        &self,
        url: &str,
        key: &str,
        token: &str,
        tenant_id: &str,
    ) -> Result<Table, ApiError> {
        let resp = self.get(url, token, &[("TenantId", tenant_id)]).await?;
        let body = check_response(resp).await?.text().await?;
        let mut table = Table::from_records(&records_under(&body, key)?);
        if !table.is_empty() {
            table.set_constant(columns::TENANT_ID, &Cell::from(tenant_id));
        }
        Ok(table)
    }

    async fn try_profiles(
        &self,
        token: &str,
        tenant_id: &str,
        group: &Group,
    ) -> Result<Table, ApiError> {
        let resp = self
            .get(
                &self.config.profiles_url,
                token,
                &[("TenantId", tenant_id), ("groupId", &group.id)],
            )
            .await?;
        let body = check_response(resp).await?.text().await?;
        Ok(Table::from_records(&records_under(&body, "profiles")?))
    }
}
