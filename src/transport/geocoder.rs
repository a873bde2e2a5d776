//! Reverse geocoding for location shares.

use crate::model::GeoPoint;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geocoded {
    Address(String),
    /// No address for this point. Not an error: the rider still gets an order with coordinates.
    Unresolved,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve_address(&self, point: GeoPoint) -> Geocoded;
}

/// Geocoder that never resolves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn resolve_address(&self, _point: GeoPoint) -> Geocoded {
        Geocoded::Unresolved
    }
}
