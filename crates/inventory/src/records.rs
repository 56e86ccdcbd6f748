//! Inventory master records referenced by pickings.
//!
//! These are plain entities (not event-sourced): they are configured up front
//! (locations, operation types, products, partners) or created as side records
//! of a picking (lots, packages). Quants track stock per location.

use serde::{Deserialize, Serialize};

use stockpack_core::{Entity, uuid_newtype};

use crate::quantity::Quantity;

uuid_newtype!(
    /// Stock location identifier.
    pub struct LocationId, "LocationId"
);

uuid_newtype!(
    /// Operation type (picking type) identifier.
    pub struct PickingTypeId, "PickingTypeId"
);

uuid_newtype!(
    /// Product identifier.
    pub struct ProductId, "ProductId"
);

uuid_newtype!(
    /// Partner identifier (picking owner).
    pub struct PartnerId, "PartnerId"
);

uuid_newtype!(
    /// Lot/serial number identifier.
    pub struct LotId, "LotId"
);

uuid_newtype!(
    /// Package identifier.
    pub struct PackageId, "PackageId"
);

/// What a location is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationUsage {
    Internal,
    Supplier,
    Customer,
    Inventory,
    Transit,
    View,
}

impl LocationUsage {
    /// Stock leaving a location of this usage is never counted, so moves from it
    /// are always fully available.
    pub fn bypasses_reservation(self) -> bool {
        !matches!(self, LocationUsage::Internal | LocationUsage::View)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub usage: LocationUsage,
}

impl Location {
    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            usage: LocationUsage::Internal,
        }
    }

    pub fn with_usage(name: impl Into<String>, usage: LocationUsage) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            usage,
        }
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &LocationId {
        &self.id
    }
}

/// Kind of transfer an operation type performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingTypeCode {
    Incoming,
    Outgoing,
    Internal,
}

/// Operation type: configuration used when creating pickings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingType {
    pub id: PickingTypeId,
    pub name: String,
    pub code: PickingTypeCode,
    /// Prefix of generated picking names (e.g. `WH/OUT`).
    pub sequence_code: String,
    #[serde(default)]
    pub default_location_src_id: Option<LocationId>,
    #[serde(default)]
    pub default_location_dest_id: Option<LocationId>,
}

impl PickingType {
    pub fn new(
        name: impl Into<String>,
        code: PickingTypeCode,
        sequence_code: impl Into<String>,
        default_location_src_id: Option<LocationId>,
        default_location_dest_id: Option<LocationId>,
    ) -> Self {
        Self {
            id: PickingTypeId::new(),
            name: name.into(),
            code,
            sequence_code: sequence_code.into(),
            default_location_src_id,
            default_location_dest_id,
        }
    }

    /// Format the picking name for the `number`-th picking of this type.
    pub fn picking_name(&self, number: u64, padding: usize) -> String {
        format!("{}/{:0width$}", self.sequence_code, number, width = padding)
    }
}

impl Entity for PickingType {
    type Id = PickingTypeId;

    fn id(&self) -> &PickingTypeId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit of measure name (e.g. "Units", "kg").
    #[serde(default = "default_uom")]
    pub uom: String,
}

fn default_uom() -> String {
    "Units".to_string()
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            uom: default_uom(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
}

impl Partner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PartnerId::new(),
            name: name.into(),
        }
    }
}

impl Entity for Partner {
    type Id = PartnerId;

    fn id(&self) -> &PartnerId {
        &self.id
    }
}

/// Lot/serial number of a product. Names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub product_id: ProductId,
    pub name: String,
}

impl Entity for Lot {
    type Id = LotId;

    fn id(&self) -> &LotId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
}

impl Entity for Package {
    type Id = PackageId;

    fn id(&self) -> &PackageId {
        &self.id
    }
}

/// Stock of one product at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quant {
    pub location_id: LocationId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub reserved_quantity: Quantity,
}

impl Quant {
    pub fn empty(location_id: LocationId, product_id: ProductId) -> Self {
        Self {
            location_id,
            product_id,
            quantity: Quantity::ZERO,
            reserved_quantity: Quantity::ZERO,
        }
    }

    /// Quantity on hand that is not reserved yet.
    pub fn available(&self) -> Quantity {
        self.quantity.saturating_sub(self.reserved_quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picking_name_is_zero_padded() {
        let ty = PickingType::new("Delivery", PickingTypeCode::Outgoing, "WH/OUT", None, None);
        assert_eq!(ty.picking_name(7, 5), "WH/OUT/00007");
        assert_eq!(ty.picking_name(123456, 5), "WH/OUT/123456");
    }

    #[test]
    fn only_counted_usages_need_reservation() {
        assert!(!LocationUsage::Internal.bypasses_reservation());
        assert!(!LocationUsage::View.bypasses_reservation());
        assert!(LocationUsage::Supplier.bypasses_reservation());
        assert!(LocationUsage::Customer.bypasses_reservation());
    }

    #[test]
    fn quant_available_excludes_reserved() {
        let mut quant = Quant::empty(LocationId::new(), ProductId::new());
        quant.quantity = Quantity::new(10.0);
        quant.reserved_quantity = Quantity::new(4.0);
        assert_eq!(quant.available(), Quantity::new(6.0));
    }
}
