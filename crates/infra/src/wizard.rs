//! "Pack products" entry wizard.
//!
//! A transient form: it is deserialized from the submitted data, mapped onto a
//! packed-picking call and dropped afterwards.

use serde::{Deserialize, Serialize};

use stockpack_core::DomainError;
use stockpack_inventory::{LocationId, PartnerId, Picking, PickingTypeId, ProductId, Quantity};

use crate::context::StockContext;
use crate::error::PackingError;
use crate::event_store::EventStore;
use crate::packed_picking::{MoveRequest, PackedPickingOptions, PackedPickingService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackProductsWizardLine {
    pub product_id: ProductId,
    pub qty_done: Quantity,
    #[serde(default)]
    pub serial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackProductsWizard {
    pub picking_type_id: PickingTypeId,
    #[serde(default)]
    pub owner_id: Option<PartnerId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub location_dest_id: Option<LocationId>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub set_ready: bool,
    #[serde(default)]
    pub create_lots: bool,
    #[serde(default)]
    pub stock_move_data: Vec<PackProductsWizardLine>,
}

impl PackProductsWizard {
    pub fn new(picking_type_id: PickingTypeId) -> Self {
        Self {
            picking_type_id,
            owner_id: None,
            location_id: None,
            location_dest_id: None,
            package_name: None,
            set_ready: false,
            create_lots: false,
            stock_move_data: Vec::new(),
        }
    }

    pub fn add_line(&mut self, product_id: ProductId, qty_done: f64, serial: Option<&str>) -> &mut Self {
        self.stock_move_data.push(PackProductsWizardLine {
            product_id,
            qty_done: Quantity::new(qty_done),
            serial: serial.map(str::to_string),
        });
        self
    }

    pub fn move_requests(&self) -> Vec<MoveRequest> {
        self.stock_move_data
            .iter()
            .map(|line| MoveRequest {
                product_id: line.product_id,
                quantity: line.qty_done,
                serial: line.serial.clone(),
            })
            .collect()
    }

    pub fn options(&self) -> PackedPickingOptions {
        PackedPickingOptions {
            owner: self.owner_id,
            location: self.location_id,
            location_dest: self.location_dest_id,
            package_name: self.package_name.clone(),
            create_lots: self.create_lots,
            set_ready: self.set_ready,
        }
    }

    /// Create the packed picking described by the form.
    pub fn submit<S>(&self, service: &PackedPickingService<S>, ctx: &StockContext) -> Result<Picking, PackingError>
    where
        S: EventStore,
    {
        let operation_type = service
            .records()
            .picking_type(ctx, self.picking_type_id)
            .ok_or_else(|| DomainError::not_found(format!("operation type {}", self.picking_type_id)))?;

        service.create_packed_picking(ctx, &operation_type, &self.move_requests(), self.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_form_with_defaults() {
        let picking_type_id = PickingTypeId::new();
        let product_id = ProductId::new();

        let wizard: PackProductsWizard = serde_json::from_value(json!({
            "picking_type_id": picking_type_id,
            "stock_move_data": [{ "product_id": product_id, "qty_done": 16.0 }]
        }))
        .unwrap();

        assert_eq!(wizard.picking_type_id, picking_type_id);
        assert!(!wizard.set_ready && !wizard.create_lots);
        assert_eq!(wizard.stock_move_data[0].serial, None);
        assert_eq!(wizard.options(), PackedPickingOptions::default());
    }

    #[test]
    fn lines_map_to_move_requests_in_order() {
        let mut wizard = PackProductsWizard::new(PickingTypeId::new());
        let first = ProductId::new();
        let second = ProductId::new();
        wizard
            .add_line(first, 10.0, Some("TEST_SERIAL_001"))
            .add_line(second, 5.0, None);

        let requests = wizard.move_requests();
        assert_eq!(
            requests,
            vec![
                MoveRequest::new(first, 10.0, Some("TEST_SERIAL_001")),
                MoveRequest::new(second, 5.0, None),
            ]
        );
    }

    #[test]
    fn options_forward_every_field() {
        let mut wizard = PackProductsWizard::new(PickingTypeId::new());
        wizard.owner_id = Some(PartnerId::new());
        wizard.location_id = Some(LocationId::new());
        wizard.location_dest_id = Some(LocationId::new());
        wizard.package_name = Some("TEST_PACKAGE_001".to_string());
        wizard.create_lots = true;
        wizard.set_ready = true;

        let options = wizard.options();
        assert_eq!(options.owner, wizard.owner_id);
        assert_eq!(options.location, wizard.location_id);
        assert_eq!(options.location_dest, wizard.location_dest_id);
        assert_eq!(options.package_name.as_deref(), Some("TEST_PACKAGE_001"));
        assert!(options.create_lots && options.set_ready);
    }
}
