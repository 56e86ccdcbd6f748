use stockpack_core::{TenantId, UserId};

/// Session handle for one request: which tenant's data is touched and who acts.
///
/// Passed explicitly to every store and service call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockContext {
    tenant_id: TenantId,
    user_id: UserId,
}

impl StockContext {
    pub fn new(tenant_id: TenantId, user_id: UserId) -> Self {
        Self { tenant_id, user_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
