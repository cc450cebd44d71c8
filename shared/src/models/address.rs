//! Address Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lagos State Local Government Areas
pub const LAGOS_LGAS: &[&str] = &[
    "Agege",
    "Ajeromi-Ifelodun",
    "Alimosho",
    "Amuwo-Odofin",
    "Apapa",
    "Badagry",
    "Epe",
    "Eti-Osa",
    "Ibeju-Lekki",
    "Ifako-Ijaiye",
    "Ikeja",
    "Ikorodu",
    "Kosofe",
    "Lagos Island",
    "Lagos Mainland",
    "Mushin",
    "Ojo",
    "Oshodi-Isolo",
    "Shomolu",
    "Surulere",
];

/// Pickup / delivery address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub area: String,
    pub lga: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
}

fn default_city() -> String {
    "Lagos".to_string()
}

fn default_state() -> String {
    "Lagos".to_string()
}

impl Address {
    /// Canonical LGA name, matched case-insensitively
    pub fn canonical_lga(&self) -> Option<&'static str> {
        let lga = self.lga.trim();
        LAGOS_LGAS
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(lga))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}, {}", self.street, self.area, self.lga, self.city, self.state)?;
        if let Some(landmark) = &self.landmark {
            write!(f, " (near {})", landmark)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(lga: &str) -> Address {
        Address {
            street: "12 Admiralty Way".into(),
            area: "Lekki Phase 1".into(),
            lga: lga.into(),
            city: "Lagos".into(),
            state: "Lagos".into(),
            landmark: None,
        }
    }

    #[test]
    fn test_lga_count() {
        assert_eq!(LAGOS_LGAS.len(), 20);
    }

    #[test]
    fn test_canonical_lga_case_insensitive() {
        assert_eq!(addr("eti-osa").canonical_lga(), Some("Eti-Osa"));
        assert_eq!(addr(" IKEJA ").canonical_lga(), Some("Ikeja"));
        assert_eq!(addr("Abuja Municipal").canonical_lga(), None);
    }

    #[test]
    fn test_display_contains_area() {
        let text = addr("Eti-Osa").to_string();
        assert!(text.contains("Lekki Phase 1"));
        assert!(text.contains("Eti-Osa"));
    }

    #[test]
    fn test_city_state_default() {
        let json = r#"{"street":"3 Allen Ave","area":"Allen","lga":"Ikeja"}"#;
        let a: Address = serde_json::from_str(json).unwrap();
        assert_eq!(a.city, "Lagos");
        assert_eq!(a.state, "Lagos");
    }
}
