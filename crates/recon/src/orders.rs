//! Open service-order join against the master registry.

use caltrack_core::{normalize_id, Dataset};
use serde::Serialize;

use crate::index::Indices;

/// One open order joined to the registry. Flags come from the matched
/// equipment's own serial, not the order's copy of it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub order_id: String,
    pub asset_tag: String,
    pub serial_number: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    /// Registry sector; the "Não Cadastrado" marker when the order matches
    /// no registered equipment.
    pub sector: String,
    pub registered: bool,
    pub calibrated: bool,
    pub in_external_maintenance: bool,
}

/// Sector shown for orders that match nothing in the registry.
pub const UNREGISTERED_SECTOR: &str = "Não Cadastrado";

/// Join each open order to the registry: normalized serial first, normalized
/// asset tag second (serial wins when both resolve). Order of the input is
/// preserved.
pub fn join_orders(dataset: &Dataset, indices: &Indices) -> Vec<OrderRow> {
    dataset
        .service_orders
        .iter()
        .map(|order| {
            let by_serial = indices.equipment.by_serial(&normalize_id(&order.serial_number));
            let by_asset = indices.equipment.by_asset_tag(&normalize_id(&order.asset_tag));
            let matched = by_serial.or(by_asset).and_then(|pos| dataset.equipment.get(pos));

            let (sector, registered, calibrated, in_maintenance) = match matched {
                Some(eq) => {
                    let serial = normalize_id(&eq.serial_number);
                    (
                        eq.sector.clone(),
                        true,
                        indices.calibrations.get(&serial).is_some(),
                        indices.maintenance.contains(&serial),
                    )
                }
                None => (UNREGISTERED_SECTOR.to_string(), false, false, false),
            };

            OrderRow {
                order_id: order.order_id.clone(),
                asset_tag: order.asset_tag.clone(),
                serial_number: order.serial_number.clone(),
                name: order.name.clone(),
                model: order.model.clone(),
                manufacturer: order.manufacturer.clone(),
                sector,
                registered,
                calibrated,
                in_external_maintenance: in_maintenance,
            }
        })
        .collect()
}
