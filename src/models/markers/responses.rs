use serde::Serialize;

use super::entities::Marker;

#[derive(Debug, Serialize)]
pub struct MarkerListResponse {
    pub items: Vec<Marker>,
}
