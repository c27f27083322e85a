use serde::{Deserialize, Serialize};

use crate::models::stock::Stock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// A warehouse with its stocks embedded, as served by
/// `GET /warehouses/stocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseWithStocks {
    pub id: i64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

/// `{data: {warehouse: [..]}}` payload of `GET /warehouses`.
/// The field really is singular on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehousesPayload {
    pub warehouse: Vec<Warehouse>,
}

/// `{data: {warehouse, stocks}}` payload of `GET /warehouses/:id/stocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseStocksPayload {
    pub warehouse: Warehouse,
    #[serde(default)]
    pub stocks: Vec<Stock>,
}

/// `{data: {warehouses: [..]}}` payload of `GET /warehouses/stocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllStocksPayload {
    pub warehouses: Vec<WarehouseWithStocks>,
}

/// Body of `POST /warehouses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewWarehouse {
    pub name: String,
    pub address: String,
}
