//! Variant Catalog
//!
//! Immutable registry of signature families and their ordered parameter sets.
//! Built once at startup and handed to the planner and the strategy table;
//! nothing mutates it afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Signature-algorithm family under benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Lattice-based (ML-DSA)
    #[serde(rename = "ML-DSA")]
    MlDsa,
    /// Hash-based stateful (XMSS)
    #[serde(rename = "XMSS")]
    Xmss,
    /// Hash-based stateless (SLH-DSA)
    #[serde(rename = "SLH-DSA")]
    SlhDsa,
}

impl Family {
    /// All families in menu order
    pub const ALL: [Family; 3] = [Family::MlDsa, Family::Xmss, Family::SlhDsa];

    /// Stable identifier, also the default executable and file-name stem
    pub fn id(self) -> &'static str {
        match self {
            Family::MlDsa => "ML-DSA",
            Family::Xmss => "XMSS",
            Family::SlhDsa => "SLH-DSA",
        }
    }

    /// Short description of the scheme category
    pub fn category(self) -> &'static str {
        match self {
            Family::MlDsa => "lattice-based",
            Family::Xmss => "hash-based stateful",
            Family::SlhDsa => "hash-based stateless",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Family {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownFamily(s.to_string()))
    }
}

/// Hash-function family a variant is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFamily {
    /// SHA-2 instantiation
    Sha2,
    /// SHAKE instantiation
    Shake,
}

/// A concrete parameter set of a family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    /// Owning family
    pub family: Family,
    /// Parameter-set identifier as the executable expects it
    pub name: String,
    /// Whether the family offers a prehash execution mode
    pub supports_prehash: bool,
}

impl VariantSpec {
    /// Hash family and security level encoded in an SLH-DSA style name
    /// (`SLH-DSA-SHA2-128s` → `(Sha2, 128)`).
    pub fn hash_parameters(&self) -> Option<(HashFamily, u16)> {
        let mut parts = self.name.rsplit('-');
        let level_part = parts.next()?;
        let hash_part = parts.next()?;

        let hash = match hash_part {
            "SHA2" => HashFamily::Sha2,
            "SHAKE" => HashFamily::Shake,
            _ => return None,
        };
        let digits: String = level_part.chars().take_while(|c| c.is_ascii_digit()).collect();
        let level = digits.parse().ok()?;
        Some((hash, level))
    }
}

const ML_DSA_SETS: &[&str] = &["ML-DSA-4x4", "ML-DSA-6x5", "ML-DSA-8x7"];

const XMSS_SETS: &[&str] = &[
    "XMSS-SHA2_10_256",
    "XMSS-SHA2_16_256",
    "XMSS-SHA2_20_256",
    "XMSS-SHA2_10_512",
    "XMSS-SHA2_16_512",
    "XMSS-SHA2_20_512",
    "XMSS-SHAKE_10_256",
    "XMSS-SHAKE_16_256",
    "XMSS-SHAKE_20_256",
    "XMSS-SHAKE_10_512",
    "XMSS-SHAKE_16_512",
    "XMSS-SHAKE_20_512",
    "XMSS-SHA2_10_192",
    "XMSS-SHA2_16_192",
    "XMSS-SHA2_20_192",
    "XMSS-SHAKE256_10_256",
    "XMSS-SHAKE256_16_256",
    "XMSS-SHAKE256_20_256",
    "XMSS-SHAKE256_10_192",
    "XMSS-SHAKE256_16_192",
    "XMSS-SHAKE256_20_192",
];

const SLH_DSA_SETS: &[&str] = &[
    "SLH-DSA-SHA2-128s",
    "SLH-DSA-SHA2-128f",
    "SLH-DSA-SHA2-192s",
    "SLH-DSA-SHA2-192f",
    "SLH-DSA-SHA2-256s",
    "SLH-DSA-SHA2-256f",
    "SLH-DSA-SHAKE-128s",
    "SLH-DSA-SHAKE-128f",
    "SLH-DSA-SHAKE-192s",
    "SLH-DSA-SHAKE-192f",
    "SLH-DSA-SHAKE-256s",
    "SLH-DSA-SHAKE-256f",
];

#[derive(Debug, Clone)]
struct FamilyEntry {
    family: Family,
    supports_prehash: bool,
    variants: Vec<VariantSpec>,
}

/// Registry of families and their ordered variants
#[derive(Debug, Clone)]
pub struct VariantCatalog {
    entries: Vec<FamilyEntry>,
}

impl VariantCatalog {
    /// The parameter sets shipped by the ML-DSA, XMSS and SLH-DSA executables
    pub fn builtin() -> Self {
        let mut builder = CatalogBuilder::default();
        builder.family(Family::MlDsa, false, ML_DSA_SETS.iter().copied());
        builder.family(Family::Xmss, false, XMSS_SETS.iter().copied());
        builder.family(Family::SlhDsa, true, SLH_DSA_SETS.iter().copied());
        builder.build()
    }

    /// Start an empty catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Ordered variants of `family` (empty if the family is not registered)
    pub fn variants(&self, family: Family) -> &[VariantSpec] {
        self.entry(family)
            .map(|entry| entry.variants.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `family` has a prehash execution mode
    pub fn supports_prehash(&self, family: Family) -> bool {
        self.entry(family).is_some_and(|entry| entry.supports_prehash)
    }

    /// Registered families in catalog order
    pub fn families(&self) -> impl Iterator<Item = Family> + '_ {
        self.entries.iter().map(|entry| entry.family)
    }

    fn entry(&self, family: Family) -> Option<&FamilyEntry> {
        self.entries.iter().find(|entry| entry.family == family)
    }
}

/// Builder for custom catalogs
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<FamilyEntry>,
}

impl CatalogBuilder {
    /// Register a family; registering it twice replaces the earlier entry in place.
    pub fn family<'a>(
        &mut self,
        family: Family,
        supports_prehash: bool,
        names: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        let variants = names
            .into_iter()
            .map(|name| VariantSpec {
                family,
                name: name.to_string(),
                supports_prehash,
            })
            .collect();
        let entry = FamilyEntry {
            family,
            supports_prehash,
            variants,
        };

        match self.entries.iter_mut().find(|e| e.family == family) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Freeze the catalog
    pub fn build(&mut self) -> VariantCatalog {
        VariantCatalog {
            entries: std::mem::take(&mut self.entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = VariantCatalog::builtin();
        assert_eq!(catalog.variants(Family::MlDsa).len(), 3);
        assert_eq!(catalog.variants(Family::Xmss).len(), 21);
        assert_eq!(catalog.variants(Family::SlhDsa).len(), 12);
    }

    #[test]
    fn test_only_slh_dsa_supports_prehash() {
        let catalog = VariantCatalog::builtin();
        assert!(!catalog.supports_prehash(Family::MlDsa));
        assert!(!catalog.supports_prehash(Family::Xmss));
        assert!(catalog.supports_prehash(Family::SlhDsa));
        assert!(
            catalog
                .variants(Family::SlhDsa)
                .iter()
                .all(|v| v.supports_prehash && v.family == Family::SlhDsa)
        );
    }

    #[test]
    fn test_catalog_order_is_preserved() {
        let catalog = VariantCatalog::builtin();
        let names: Vec<_> = catalog
            .variants(Family::SlhDsa)
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names.first(), Some(&"SLH-DSA-SHA2-128s"));
        assert_eq!(names.last(), Some(&"SLH-DSA-SHAKE-256f"));
        assert_eq!(
            catalog.families().collect::<Vec<_>>(),
            Family::ALL.to_vec()
        );
    }

    #[test]
    fn test_family_from_str_is_case_insensitive() {
        assert_eq!("slh-dsa".parse::<Family>().unwrap(), Family::SlhDsa);
        assert_eq!("XMSS".parse::<Family>().unwrap(), Family::Xmss);
        assert!("falcon".parse::<Family>().is_err());
    }

    #[test]
    fn test_hash_parameters_from_name() {
        let catalog = VariantCatalog::builtin();
        let slh = catalog.variants(Family::SlhDsa);
        assert_eq!(slh[0].hash_parameters(), Some((HashFamily::Sha2, 128)));
        assert_eq!(slh[9].hash_parameters(), Some((HashFamily::Shake, 192)));
        assert_eq!(catalog.variants(Family::MlDsa)[0].hash_parameters(), None);
    }

    #[test]
    fn test_unknown_family_has_no_variants() {
        let catalog = VariantCatalog::builder()
            .family(Family::MlDsa, false, ["ML-DSA-4x4"])
            .build();
        assert!(catalog.variants(Family::Xmss).is_empty());
        assert!(!catalog.supports_prehash(Family::Xmss));
    }
}
