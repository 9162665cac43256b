use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(VenueId);

/// Geographic position in map order: longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Venue {
    /// A venue gets a marker only when both coordinates are present and
    /// truthy. Zero and NaN count as missing, so a venue sitting exactly on
    /// the equator or the prime meridian is not rendered.
    pub fn is_placeable(&self) -> bool {
        fn truthy(value: Option<f64>) -> bool {
            matches!(value, Some(v) if v != 0.0 && !v.is_nan())
        }

        truthy(self.lat) && truthy(self.lng)
    }

    /// Stored coordinates, zero included, when both are present.
    pub fn location(&self) -> Option<LngLat> {
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => Some(LngLat::new(lng, lat)),
            _ => None,
        }
    }
}

/// Writable part of a venue. `location` is sent on create and never on
/// update; an edit keeps the original placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueFields {
    pub name: String,
    pub address: String,
    pub hours: String,
    pub location: Option<LngLat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
}

impl Viewport {
    pub fn readout(&self) -> String {
        format!(
            "Longitude: {:.4} | Latitude: {:.4} | Zoom: {:.2}",
            self.center.lng, self.center.lat, self.zoom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(lat: Option<f64>, lng: Option<f64>) -> Venue {
        Venue {
            id: VenueId::new("v1"),
            name: "Pub X".to_string(),
            address: String::new(),
            hours: String::new(),
            lat,
            lng,
        }
    }

    #[test]
    fn placeability_treats_zero_and_missing_coordinates_as_unplaceable() {
        assert!(venue(Some(47.5), Some(21.6)).is_placeable());
        assert!(!venue(Some(0.0), Some(0.0)).is_placeable());
        assert!(!venue(Some(47.5), Some(0.0)).is_placeable());
        assert!(!venue(None, Some(21.6)).is_placeable());
        assert!(!venue(Some(f64::NAN), Some(21.6)).is_placeable());
    }

    #[test]
    fn location_keeps_zero_coordinates() {
        assert_eq!(
            venue(Some(0.0), Some(0.0)).location(),
            Some(LngLat::new(0.0, 0.0))
        );
        assert_eq!(venue(None, Some(1.0)).location(), None);
    }

    #[test]
    fn readout_uses_fixed_precision() {
        let viewport = Viewport {
            center: LngLat::new(21.62601, 47.53184),
            zoom: 14.01,
        };
        assert_eq!(
            viewport.readout(),
            "Longitude: 21.6260 | Latitude: 47.5318 | Zoom: 14.01"
        );
    }
}
