use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpack_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId, uuid_newtype};
use stockpack_events::Event;

use crate::quantity::Quantity;
use crate::records::{LocationId, PackageId, PartnerId, PickingTypeId, ProductId};

/// Picking identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickingId(pub AggregateId);

impl PickingId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for PickingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

uuid_newtype!(
    /// Stock move identifier (unique within its picking).
    pub struct MoveId, "MoveId"
);

uuid_newtype!(
    /// Move line identifier.
    pub struct MoveLineId, "MoveLineId"
);

/// Picking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingState {
    Draft,
    Confirmed,
    /// Every move is fully reserved ("ready").
    Assigned,
}

impl PickingState {
    pub fn as_str(self) -> &'static str {
        match self {
            PickingState::Draft => "draft",
            PickingState::Confirmed => "confirmed",
            PickingState::Assigned => "assigned",
        }
    }
}

/// One product transfer within a picking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: MoveId,
    pub product_id: ProductId,
    pub name: String,
    pub uom: String,
    /// Demanded quantity.
    pub product_uom_qty: Quantity,
    pub quantity_done: Quantity,
    pub reserved_availability: Quantity,
    pub location_id: LocationId,
    pub location_dest_id: LocationId,
}

impl StockMove {
    /// Demand not covered by reservations yet.
    pub fn remaining_to_reserve(&self) -> Quantity {
        self.product_uom_qty.saturating_sub(self.reserved_availability)
    }

    pub fn is_fully_reserved(&self) -> bool {
        self.reserved_availability.covers(self.product_uom_qty)
    }
}

/// Done-quantity record of a move; carries the result package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveLine {
    pub id: MoveLineId,
    pub move_id: MoveId,
    pub product_id: ProductId,
    pub qty_done: Quantity,
    pub location_id: LocationId,
    pub location_dest_id: LocationId,
    pub result_package_id: Option<PackageId>,
}

/// Aggregate root: Picking (a transfer document between two locations).
#[derive(Debug, Clone, PartialEq)]
pub struct Picking {
    id: PickingId,
    tenant_id: Option<TenantId>,
    name: String,
    picking_type_id: Option<PickingTypeId>,
    location_id: Option<LocationId>,
    location_dest_id: Option<LocationId>,
    partner_id: Option<PartnerId>,
    state: PickingState,
    moves: Vec<StockMove>,
    move_lines: Vec<MoveLine>,
    version: u64,
    created: bool,
}

impl Picking {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PickingId) -> Self {
        Self {
            id,
            tenant_id: None,
            name: String::new(),
            picking_type_id: None,
            location_id: None,
            location_dest_id: None,
            partner_id: None,
            state: PickingState::Draft,
            moves: Vec::new(),
            move_lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PickingId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn picking_type_id(&self) -> Option<PickingTypeId> {
        self.picking_type_id
    }

    pub fn location_id(&self) -> Option<LocationId> {
        self.location_id
    }

    pub fn location_dest_id(&self) -> Option<LocationId> {
        self.location_dest_id
    }

    /// Owner of the transferred goods.
    pub fn partner_id(&self) -> Option<PartnerId> {
        self.partner_id
    }

    pub fn state(&self) -> PickingState {
        self.state
    }

    pub fn moves(&self) -> &[StockMove] {
        &self.moves
    }

    pub fn move_lines(&self) -> &[MoveLine] {
        &self.move_lines
    }

    pub fn find_move(&self, move_id: MoveId) -> Option<&StockMove> {
        self.moves.iter().find(|m| m.id == move_id)
    }
}

impl AggregateRoot for Picking {
    type Id = PickingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePicking.
///
/// Locations are the already-resolved effective values (override or operation
/// type default); `None` means neither was available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePicking {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub name: String,
    pub picking_type_id: PickingTypeId,
    pub location_id: Option<LocationId>,
    pub location_dest_id: Option<LocationId>,
    pub partner_id: Option<PartnerId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddMove. The move takes the picking's locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMove {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub move_id: MoveId,
    pub product_id: ProductId,
    pub name: String,
    pub uom: String,
    pub quantity: Quantity,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordQuantityDone.
///
/// Creates the move's line, or updates it when the move already has one
/// (`move_line_id` is then ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordQuantityDone {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub move_id: MoveId,
    pub move_line_id: MoveLineId,
    pub quantity: Quantity,
    pub occurred_at: DateTime<Utc>,
}

/// Command: PackMoveLines. Puts every current move line into one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMoveLines {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub package_id: PackageId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmPicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPicking {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

/// Quantity that may be reserved for one move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAvailability {
    pub move_id: MoveId,
    pub available: Quantity,
}

/// Command: ReservePicking.
///
/// Availability is computed by the caller from stock quants; moves missing from
/// the list have nothing available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservePicking {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub availability: Vec<MoveAvailability>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickingCommand {
    CreatePicking(CreatePicking),
    AddMove(AddMove),
    RecordQuantityDone(RecordQuantityDone),
    PackMoveLines(PackMoveLines),
    ConfirmPicking(ConfirmPicking),
    ReservePicking(ReservePicking),
}

/// Event: PickingCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingCreated {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub name: String,
    pub picking_type_id: PickingTypeId,
    pub location_id: LocationId,
    pub location_dest_id: LocationId,
    pub partner_id: Option<PartnerId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MoveAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAdded {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub move_id: MoveId,
    pub product_id: ProductId,
    pub name: String,
    pub uom: String,
    pub product_uom_qty: Quantity,
    pub location_id: LocationId,
    pub location_dest_id: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityDoneRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityDoneRecorded {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub move_id: MoveId,
    pub move_line_id: MoveLineId,
    pub quantity: Quantity,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MoveLinesPacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLinesPacked {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub package_id: PackageId,
    pub move_line_ids: Vec<MoveLineId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PickingConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingConfirmed {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReservation {
    pub move_id: MoveId,
    pub quantity: Quantity,
}

/// Event: PickingReserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickingReserved {
    pub tenant_id: TenantId,
    pub picking_id: PickingId,
    pub reservations: Vec<MoveReservation>,
    /// Every move is fully reserved after this event; the picking is ready.
    pub fully_reserved: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickingEvent {
    PickingCreated(PickingCreated),
    MoveAdded(MoveAdded),
    QuantityDoneRecorded(QuantityDoneRecorded),
    MoveLinesPacked(MoveLinesPacked),
    PickingConfirmed(PickingConfirmed),
    PickingReserved(PickingReserved),
}

impl PickingEvent {
    pub fn tenant_id(&self) -> TenantId {
        match self {
            PickingEvent::PickingCreated(e) => e.tenant_id,
            PickingEvent::MoveAdded(e) => e.tenant_id,
            PickingEvent::QuantityDoneRecorded(e) => e.tenant_id,
            PickingEvent::MoveLinesPacked(e) => e.tenant_id,
            PickingEvent::PickingConfirmed(e) => e.tenant_id,
            PickingEvent::PickingReserved(e) => e.tenant_id,
        }
    }
}

impl Event for PickingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PickingEvent::PickingCreated(_) => "stock.picking.created",
            PickingEvent::MoveAdded(_) => "stock.picking.move_added",
            PickingEvent::QuantityDoneRecorded(_) => "stock.picking.quantity_done_recorded",
            PickingEvent::MoveLinesPacked(_) => "stock.picking.lines_packed",
            PickingEvent::PickingConfirmed(_) => "stock.picking.confirmed",
            PickingEvent::PickingReserved(_) => "stock.picking.reserved",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PickingEvent::PickingCreated(e) => e.occurred_at,
            PickingEvent::MoveAdded(e) => e.occurred_at,
            PickingEvent::QuantityDoneRecorded(e) => e.occurred_at,
            PickingEvent::MoveLinesPacked(e) => e.occurred_at,
            PickingEvent::PickingConfirmed(e) => e.occurred_at,
            PickingEvent::PickingReserved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Picking {
    type Command = PickingCommand;
    type Event = PickingEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PickingEvent::PickingCreated(e) => {
                self.id = e.picking_id;
                self.tenant_id = Some(e.tenant_id);
                self.name = e.name.clone();
                self.picking_type_id = Some(e.picking_type_id);
                self.location_id = Some(e.location_id);
                self.location_dest_id = Some(e.location_dest_id);
                self.partner_id = e.partner_id;
                self.state = PickingState::Draft;
                self.created = true;
            }
            PickingEvent::MoveAdded(e) => {
                self.moves.push(StockMove {
                    id: e.move_id,
                    product_id: e.product_id,
                    name: e.name.clone(),
                    uom: e.uom.clone(),
                    product_uom_qty: e.product_uom_qty,
                    quantity_done: Quantity::ZERO,
                    reserved_availability: Quantity::ZERO,
                    location_id: e.location_id,
                    location_dest_id: e.location_dest_id,
                });
            }
            PickingEvent::QuantityDoneRecorded(e) => {
                if let Some(mv) = self.moves.iter_mut().find(|m| m.id == e.move_id) {
                    mv.quantity_done = e.quantity;
                    let line = MoveLine {
                        id: e.move_line_id,
                        move_id: e.move_id,
                        product_id: mv.product_id,
                        qty_done: e.quantity,
                        location_id: mv.location_id,
                        location_dest_id: mv.location_dest_id,
                        result_package_id: None,
                    };

                    match self.move_lines.iter_mut().find(|l| l.id == e.move_line_id) {
                        Some(existing) => existing.qty_done = e.quantity,
                        None => self.move_lines.push(line),
                    }
                }
            }
            PickingEvent::MoveLinesPacked(e) => {
                for line in self
                    .move_lines
                    .iter_mut()
                    .filter(|l| e.move_line_ids.contains(&l.id))
                {
                    line.result_package_id = Some(e.package_id);
                }
            }
            PickingEvent::PickingConfirmed(_) => {
                self.state = PickingState::Confirmed;
            }
            PickingEvent::PickingReserved(e) => {
                for r in &e.reservations {
                    if let Some(mv) = self.moves.iter_mut().find(|m| m.id == r.move_id) {
                        mv.reserved_availability += r.quantity;
                    }
                }
                if e.fully_reserved {
                    self.state = PickingState::Assigned;
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PickingCommand::CreatePicking(cmd) => self.handle_create(cmd),
            PickingCommand::AddMove(cmd) => self.handle_add_move(cmd),
            PickingCommand::RecordQuantityDone(cmd) => self.handle_quantity_done(cmd),
            PickingCommand::PackMoveLines(cmd) => self.handle_pack(cmd),
            PickingCommand::ConfirmPicking(cmd) => self.handle_confirm(cmd),
            PickingCommand::ReservePicking(cmd) => self.handle_reserve(cmd),
        }
    }
}

impl Picking {
    fn ensure_existing(&self, tenant_id: TenantId, picking_id: PickingId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("picking {picking_id}")));
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != picking_id {
            return Err(DomainError::invariant("picking_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreatePicking) -> Result<Vec<PickingEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("picking already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("picking name cannot be empty"));
        }
        let location_id = cmd
            .location_id
            .ok_or_else(|| DomainError::invariant("picking requires a source location"))?;
        let location_dest_id = cmd
            .location_dest_id
            .ok_or_else(|| DomainError::invariant("picking requires a destination location"))?;

        Ok(vec![PickingEvent::PickingCreated(PickingCreated {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            name: cmd.name.clone(),
            picking_type_id: cmd.picking_type_id,
            location_id,
            location_dest_id,
            partner_id: cmd.partner_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_move(&self, cmd: &AddMove) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.picking_id)?;

        if self.state != PickingState::Draft {
            return Err(DomainError::invariant("moves can only be added to a draft picking"));
        }
        if self.find_move(cmd.move_id).is_some() {
            return Err(DomainError::conflict(format!("move {} already exists", cmd.move_id)));
        }

        // Both are set once the picking exists.
        let (Some(location_id), Some(location_dest_id)) = (self.location_id, self.location_dest_id)
        else {
            return Err(DomainError::invariant("picking has no locations"));
        };

        Ok(vec![PickingEvent::MoveAdded(MoveAdded {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            move_id: cmd.move_id,
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            uom: cmd.uom.clone(),
            product_uom_qty: cmd.quantity,
            location_id,
            location_dest_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_quantity_done(&self, cmd: &RecordQuantityDone) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.picking_id)?;

        if self.find_move(cmd.move_id).is_none() {
            return Err(DomainError::not_found(format!("move {}", cmd.move_id)));
        }

        let move_line_id = self
            .move_lines
            .iter()
            .find(|l| l.move_id == cmd.move_id)
            .map(|l| l.id)
            .unwrap_or(cmd.move_line_id);

        Ok(vec![PickingEvent::QuantityDoneRecorded(QuantityDoneRecorded {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            move_id: cmd.move_id,
            move_line_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_pack(&self, cmd: &PackMoveLines) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.picking_id)?;

        if self.move_lines.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![PickingEvent::MoveLinesPacked(MoveLinesPacked {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            package_id: cmd.package_id,
            move_line_ids: self.move_lines.iter().map(|l| l.id).collect(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmPicking) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.picking_id)?;

        // Already confirmed, or nothing to confirm: stays as is.
        if self.state != PickingState::Draft || self.moves.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![PickingEvent::PickingConfirmed(PickingConfirmed {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reserve(&self, cmd: &ReservePicking) -> Result<Vec<PickingEvent>, DomainError> {
        self.ensure_existing(cmd.tenant_id, cmd.picking_id)?;

        match self.state {
            PickingState::Draft => {
                return Err(DomainError::invariant("picking must be confirmed before reservation"));
            }
            PickingState::Assigned => return Ok(vec![]),
            PickingState::Confirmed => {}
        }

        let mut reservations = Vec::new();
        let mut fully_reserved = true;

        for mv in &self.moves {
            let wanted = mv.remaining_to_reserve();
            let available = cmd
                .availability
                .iter()
                .find(|a| a.move_id == mv.id)
                .map(|a| a.available)
                .unwrap_or(Quantity::ZERO);
            let reserved = wanted.min(available);

            if !reserved.is_zero() {
                reservations.push(MoveReservation {
                    move_id: mv.id,
                    quantity: reserved,
                });
            }
            if !(mv.reserved_availability + reserved).covers(mv.product_uom_qty) {
                fully_reserved = false;
            }
        }

        if reservations.is_empty() && !fully_reserved {
            return Ok(vec![]);
        }

        Ok(vec![PickingEvent::PickingReserved(PickingReserved {
            tenant_id: cmd.tenant_id,
            picking_id: cmd.picking_id,
            reservations,
            fully_reserved,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpack_events::execute;

    struct Fixture {
        tenant_id: TenantId,
        picking_id: PickingId,
        src: LocationId,
        dest: LocationId,
        picking_type_id: PickingTypeId,
    }

    fn fixture() -> Fixture {
        Fixture {
            tenant_id: TenantId::new(),
            picking_id: PickingId::generate(),
            src: LocationId::new(),
            dest: LocationId::new(),
            picking_type_id: PickingTypeId::new(),
        }
    }

    fn create_cmd(f: &Fixture) -> CreatePicking {
        CreatePicking {
            tenant_id: f.tenant_id,
            picking_id: f.picking_id,
            name: "WH/OUT/00001".to_string(),
            picking_type_id: f.picking_type_id,
            location_id: Some(f.src),
            location_dest_id: Some(f.dest),
            partner_id: None,
            occurred_at: Utc::now(),
        }
    }

    fn created(f: &Fixture) -> Picking {
        let mut picking = Picking::empty(f.picking_id);
        execute(&mut picking, &PickingCommand::CreatePicking(create_cmd(f))).unwrap();
        picking
    }

    fn add_move(picking: &mut Picking, f: &Fixture, qty: f64) -> MoveId {
        let move_id = MoveId::new();
        execute(
            picking,
            &PickingCommand::AddMove(AddMove {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                move_id,
                product_id: ProductId::new(),
                name: "TEST Product 1".to_string(),
                uom: "Units".to_string(),
                quantity: Quantity::new(qty),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        move_id
    }

    fn record_done(picking: &mut Picking, f: &Fixture, move_id: MoveId, qty: f64) {
        execute(
            picking,
            &PickingCommand::RecordQuantityDone(RecordQuantityDone {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                move_id,
                move_line_id: MoveLineId::new(),
                quantity: Quantity::new(qty),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
    }

    fn confirm(picking: &mut Picking, f: &Fixture) -> Vec<PickingEvent> {
        execute(
            picking,
            &PickingCommand::ConfirmPicking(ConfirmPicking {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap()
    }

    fn reserve(
        picking: &mut Picking,
        f: &Fixture,
        availability: Vec<MoveAvailability>,
    ) -> Result<Vec<PickingEvent>, DomainError> {
        execute(
            picking,
            &PickingCommand::ReservePicking(ReservePicking {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                availability,
                occurred_at: Utc::now(),
            }),
        )
    }

    #[test]
    fn create_picking_starts_in_draft_with_resolved_locations() {
        let f = fixture();
        let picking = created(&f);

        assert!(picking.is_created());
        assert_eq!(picking.state(), PickingState::Draft);
        assert_eq!(picking.location_id(), Some(f.src));
        assert_eq!(picking.location_dest_id(), Some(f.dest));
        assert_eq!(picking.picking_type_id(), Some(f.picking_type_id));
        assert_eq!(picking.partner_id(), None);
        assert_eq!(picking.version(), 1);
    }

    #[test]
    fn create_picking_without_source_location_is_rejected() {
        let f = fixture();
        let picking = Picking::empty(f.picking_id);
        let mut cmd = create_cmd(&f);
        cmd.location_id = None;

        let err = picking.handle(&PickingCommand::CreatePicking(cmd)).unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("source location")),
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn create_picking_twice_conflicts() {
        let f = fixture();
        let picking = created(&f);
        let err = picking
            .handle(&PickingCommand::CreatePicking(create_cmd(&f)))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn add_move_to_missing_picking_is_not_found() {
        let f = fixture();
        let picking = Picking::empty(f.picking_id);
        let err = picking
            .handle(&PickingCommand::AddMove(AddMove {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                move_id: MoveId::new(),
                product_id: ProductId::new(),
                name: "x".to_string(),
                uom: "Units".to_string(),
                quantity: Quantity::new(1.0),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn moves_inherit_picking_locations() {
        let f = fixture();
        let mut picking = created(&f);
        let move_id = add_move(&mut picking, &f, 16.0);

        let mv = picking.find_move(move_id).unwrap();
        assert_eq!(mv.location_id, f.src);
        assert_eq!(mv.location_dest_id, f.dest);
        assert_eq!(mv.product_uom_qty, Quantity::new(16.0));
        assert_eq!(mv.quantity_done, Quantity::ZERO);
    }

    #[test]
    fn recording_done_quantity_creates_one_line_per_move() {
        let f = fixture();
        let mut picking = created(&f);
        let move_id = add_move(&mut picking, &f, 16.0);

        record_done(&mut picking, &f, move_id, 16.0);
        record_done(&mut picking, &f, move_id, 12.0);

        assert_eq!(picking.move_lines().len(), 1);
        assert_eq!(picking.move_lines()[0].qty_done, Quantity::new(12.0));
        assert_eq!(picking.find_move(move_id).unwrap().quantity_done, Quantity::new(12.0));
    }

    #[test]
    fn packing_assigns_package_to_every_line() {
        let f = fixture();
        let mut picking = created(&f);
        for qty in [10.0, 5.0] {
            let move_id = add_move(&mut picking, &f, qty);
            record_done(&mut picking, &f, move_id, qty);
        }
        let package_id = PackageId::new();

        execute(
            &mut picking,
            &PickingCommand::PackMoveLines(PackMoveLines {
                tenant_id: f.tenant_id,
                picking_id: f.picking_id,
                package_id,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();

        assert!(
            picking
                .move_lines()
                .iter()
                .all(|l| l.result_package_id == Some(package_id))
        );
    }

    #[test]
    fn confirm_without_moves_keeps_draft() {
        let f = fixture();
        let mut picking = created(&f);
        assert!(confirm(&mut picking, &f).is_empty());
        assert_eq!(picking.state(), PickingState::Draft);
    }

    #[test]
    fn reserve_requires_confirmation() {
        let f = fixture();
        let mut picking = created(&f);
        add_move(&mut picking, &f, 1.0);

        let err = reserve(&mut picking, &f, vec![]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn reserve_without_stock_stays_confirmed() {
        let f = fixture();
        let mut picking = created(&f);
        add_move(&mut picking, &f, 16.0);
        confirm(&mut picking, &f);

        let events = reserve(&mut picking, &f, vec![]).unwrap();
        assert!(events.is_empty());
        assert_eq!(picking.state(), PickingState::Confirmed);
    }

    #[test]
    fn partial_reservation_stays_confirmed_then_completes() {
        let f = fixture();
        let mut picking = created(&f);
        let move_id = add_move(&mut picking, &f, 10.0);
        confirm(&mut picking, &f);

        reserve(
            &mut picking,
            &f,
            vec![MoveAvailability { move_id, available: Quantity::new(4.0) }],
        )
        .unwrap();
        assert_eq!(picking.state(), PickingState::Confirmed);
        assert_eq!(
            picking.find_move(move_id).unwrap().reserved_availability,
            Quantity::new(4.0)
        );

        reserve(
            &mut picking,
            &f,
            vec![MoveAvailability { move_id, available: Quantity::new(100.0) }],
        )
        .unwrap();
        assert_eq!(picking.state(), PickingState::Assigned);
        assert_eq!(
            picking.find_move(move_id).unwrap().reserved_availability,
            Quantity::new(10.0)
        );
    }

    #[test]
    fn event_types_are_stable() {
        let f = fixture();
        let picking = Picking::empty(f.picking_id);
        let events = picking
            .handle(&PickingCommand::CreatePicking(create_cmd(&f)))
            .unwrap();
        assert_eq!(events[0].event_type(), "stock.picking.created");
        assert_eq!(events[0].tenant_id(), f.tenant_id);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            #[test]
            fn move_and_line_counts_follow_inputs(quantities in prop::collection::vec(0.0f64..1000.0, 0..20)) {
                let f = fixture();
                let mut picking = created(&f);
                for qty in &quantities {
                    let move_id = add_move(&mut picking, &f, *qty);
                    record_done(&mut picking, &f, move_id, *qty);
                }

                prop_assert_eq!(picking.moves().len(), quantities.len());
                prop_assert_eq!(picking.move_lines().len(), quantities.len());
                prop_assert_eq!(picking.version(), 1 + 2 * quantities.len() as u64);
            }
        }
    }
}
