//! Seller catalog
//!
//! Sellers are immutable reference data. The catalog is loaded once per
//! session, from a JSON file or the built-in sample, and never written to.

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Bottle size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// 6 kg household bottles
    #[serde(alias = "6kg")]
    Small,
    /// 12 kg and 50 kg bottles
    #[serde(alias = "12kg", alias = "50kg")]
    Large,
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "6kg" | "6" => Ok(Self::Small),
            "large" | "12kg" | "12" | "50kg" | "50" => Ok(Self::Large),
            _ => Err(format!("Unknown bottle size: {}", s)),
        }
    }
}

/// A gas bottle seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Unique, stable identifier
    pub id: String,
    pub display_name: String,
    pub coordinate: Coordinate,
    pub brand: String,
    pub size_class: SizeClass,
    /// Price in CFA francs
    pub price: u32,
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    pub phone: String,
}

/// Live filter criteria; the default matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive brand substring, possibly empty; whitespace is significant
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub size_class: Option<SizeClass>,
}

impl FilterCriteria {
    pub fn new(brand: impl Into<String>, size_class: Option<SizeClass>) -> Self {
        Self {
            brand: brand.into(),
            size_class,
        }
    }

    /// Whether no criterion is set
    pub fn is_empty(&self) -> bool {
        self.brand.is_empty() && self.size_class.is_none()
    }

    /// Whether a seller satisfies every set criterion
    pub fn matches(&self, seller: &Seller) -> bool {
        let brand_ok = self.brand.is_empty()
            || seller
                .brand
                .to_lowercase()
                .contains(&self.brand.to_lowercase());
        let size_ok = self.size_class.map_or(true, |size| seller.size_class == size);
        brand_ok && size_ok
    }
}

/// Enumerable seller collection, static for the session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sellers: Vec<Seller>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and invalid coordinates
    pub fn from_sellers(sellers: Vec<Seller>) -> Result<Self> {
        let mut ids = HashSet::new();
        for seller in &sellers {
            if !ids.insert(seller.id.as_str()) {
                return Err(Error::Config(format!("Duplicate seller id: {}", seller.id)));
            }
            seller.coordinate.validate().map_err(|e| {
                Error::Config(format!("Seller {} has invalid coordinate: {}", seller.id, e))
            })?;
        }
        Ok(Self { sellers })
    }

    /// Load a catalog from a JSON array file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        let sellers: Vec<Seller> = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse catalog {}: {}", path.display(), e))
        })?;
        Self::from_sellers(sellers)
    }

    /// Load from a configured path, or the built-in sample when the path is empty
    pub fn load(path: &str) -> Result<Self> {
        if path.is_empty() {
            Ok(Self::builtin())
        } else {
            Self::load_from(Path::new(path))
        }
    }

    /// Built-in sample catalog
    pub fn builtin() -> Self {
        let seller = |id: &str,
                      name: &str,
                      lat: f64,
                      lng: f64,
                      brand: &str,
                      size_class: SizeClass,
                      price: u32,
                      rating: f32,
                      review_count: u32| Seller {
            id: id.to_string(),
            display_name: name.to_string(),
            coordinate: Coordinate::new(lat, lng),
            brand: brand.to_string(),
            size_class,
            price,
            rating,
            review_count,
            phone: "+237656421799".to_string(),
        };

        Self {
            sellers: vec![
                seller("1", "GazPlus Yaoundé", 3.848, 11.502, "TOTAL", SizeClass::Small, 2500, 4.8, 124),
                seller("2", "SafeGaz Douala", 4.051, 9.768, "SCTM", SizeClass::Small, 2700, 4.6, 89),
                seller("3", "QuickGaz Bonapriso", 4.09, 9.714, "TRADEX", SizeClass::Large, 5000, 4.9, 67),
                seller("4", "EcoGaz Ngoa-Ekelle", 3.885, 11.477, "CAMGAZ", SizeClass::Small, 2400, 4.5, 41),
            ],
        }
    }

    /// All sellers in catalog order
    pub fn sellers(&self) -> &[Seller] {
        &self.sellers
    }

    /// Look up a seller by id
    pub fn get(&self, id: &str) -> Option<&Seller> {
        self.sellers.iter().find(|s| s.id == id)
    }

    /// Distinct brands in first-seen order
    pub fn known_brands(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.sellers
            .iter()
            .filter(|s| seen.insert(s.brand.to_lowercase()))
            .map(|s| s.brand.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sellers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seller(brand: &str, size_class: SizeClass) -> Seller {
        Seller {
            id: "x".to_string(),
            display_name: "Test".to_string(),
            coordinate: Coordinate::new(0.0, 0.0),
            brand: brand.to_string(),
            size_class,
            price: 1000,
            rating: 4.0,
            review_count: 1,
            phone: String::new(),
        }
    }

    #[test]
    fn test_size_class_parsing() {
        assert_eq!("small".parse::<SizeClass>(), Ok(SizeClass::Small));
        assert_eq!("6KG".parse::<SizeClass>(), Ok(SizeClass::Small));
        assert_eq!("50kg".parse::<SizeClass>(), Ok(SizeClass::Large));
        assert!("huge".parse::<SizeClass>().is_err());
    }

    #[test]
    fn test_size_class_serde_aliases() {
        let size: SizeClass = serde_json::from_str("\"12kg\"").unwrap();
        assert_eq!(size, SizeClass::Large);
        assert_eq!(serde_json::to_string(&SizeClass::Small).unwrap(), "\"small\"");
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_empty());
        assert!(criteria.matches(&seller("TOTAL", SizeClass::Small)));
        assert!(criteria.matches(&seller("", SizeClass::Large)));
    }

    #[test]
    fn test_brand_is_case_insensitive_substring() {
        let criteria = FilterCriteria::new("tot", None);
        assert!(criteria.matches(&seller("TOTAL", SizeClass::Small)));
        assert!(criteria.matches(&seller("TotalEnergies", SizeClass::Large)));
        assert!(!criteria.matches(&seller("SCTM", SizeClass::Small)));
    }

    #[test]
    fn test_size_and_brand_combined() {
        let criteria = FilterCriteria::new("sctm", Some(SizeClass::Large));
        assert!(criteria.matches(&seller("SCTM", SizeClass::Large)));
        assert!(!criteria.matches(&seller("SCTM", SizeClass::Small)));
    }

    #[test]
    fn test_brand_substring_is_literal_on_every_path() {
        let built = FilterCriteria::new(" sctm ", None);
        let parsed: FilterCriteria =
            serde_json::from_str(r#"{"brand": " sctm ", "size_class": null}"#).unwrap();

        assert_eq!(built, parsed);
        for criteria in [&built, &parsed] {
            assert!(!criteria.matches(&seller("SCTM", SizeClass::Large)));
            assert!(criteria.matches(&seller("Depot SCTM Plus", SizeClass::Large)));
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get("2").unwrap().display_name, "SafeGaz Douala");
        assert!(catalog.get("99").is_none());
        assert_eq!(
            catalog.known_brands(),
            vec!["TOTAL", "SCTM", "TRADEX", "CAMGAZ"]
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_sellers(vec![
            seller("TOTAL", SizeClass::Small),
            seller("SCTM", SizeClass::Small),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sellers.json");
        let json = serde_json::json!([{
            "id": "a",
            "display_name": "Depot A",
            "coordinate": { "lat": 3.85, "lng": 11.5 },
            "brand": "BOCOM",
            "size_class": "12kg",
            "price": 5200,
            "rating": 4.1,
            "phone": "+237600000000"
        }]);
        fs::write(&path, json.to_string()).unwrap();

        let catalog = Catalog::load(path.to_str().unwrap()).unwrap();
        let seller = catalog.get("a").unwrap();
        assert_eq!(seller.size_class, SizeClass::Large);
        assert_eq!(seller.review_count, 0);
    }

    #[test]
    fn test_load_rejects_invalid_coordinate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sellers.json");
        let mut bad = seller("TOTAL", SizeClass::Small);
        bad.coordinate = Coordinate::new(95.0, 0.0);
        fs::write(&path, serde_json::to_string(&vec![bad]).unwrap()).unwrap();

        assert!(Catalog::load_from(&path).is_err());
    }

    #[test]
    fn test_empty_path_loads_builtin() {
        assert_eq!(Catalog::load("").unwrap().len(), 4);
    }
}
