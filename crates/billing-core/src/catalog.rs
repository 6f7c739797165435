//! Static growth-pack catalog and base feature set.
//!
//! Built once at startup and shared as `Arc<Catalog>`; nothing here mutates.

use std::collections::BTreeMap;

use serde::Serialize;

/// Feature category -> feature names.
pub type FeatureMap = BTreeMap<String, Vec<String>>;

/// Catalog entry for a purchasable growth pack (prices in AUD).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPackInfo {
    pub pack_id: String,
    pub pack_name: String,
    pub description: String,
    pub category: String,
    pub price_monthly: f64,
    /// Marketing feature list.
    pub features: Vec<String>,
    /// Entitlements unlocked by the pack.
    #[serde(skip)]
    pub feature_map: FeatureMap,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    packs: Vec<GrowthPackInfo>,
    base_features: FeatureMap,
}

impl Catalog {
    pub fn new(packs: Vec<GrowthPackInfo>, base_features: FeatureMap) -> Self {
        Self {
            packs,
            base_features,
        }
    }

    pub fn packs(&self) -> &[GrowthPackInfo] {
        &self.packs
    }

    pub fn pack(&self, pack_name: &str) -> Option<&GrowthPackInfo> {
        self.packs.iter().find(|p| p.pack_name == pack_name)
    }

    pub fn is_known_pack(&self, pack_name: &str) -> bool {
        self.pack(pack_name).is_some()
    }

    /// Catalog price for a pack, 0 when the name is unknown.
    pub fn pack_price(&self, pack_name: &str) -> f64 {
        self.pack(pack_name).map(|p| p.price_monthly).unwrap_or(0.0)
    }

    pub fn base_features(&self) -> &FeatureMap {
        &self.base_features
    }

    pub fn is_base_feature(&self, category: &str, feature: &str) -> bool {
        contains_feature(&self.base_features, category, feature)
    }

    pub fn pack_grants(&self, pack_name: &str, category: &str, feature: &str) -> bool {
        self.pack(pack_name)
            .map(|p| contains_feature(&p.feature_map, category, feature))
            .unwrap_or(false)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_packs(), default_base_features())
    }
}

fn contains_feature(map: &FeatureMap, category: &str, feature: &str) -> bool {
    map.get(category)
        .map(|features| features.iter().any(|f| f == feature))
        .unwrap_or(false)
}

fn feature_map(entries: &[(&str, &[&str])]) -> FeatureMap {
    entries
        .iter()
        .map(|(category, features)| {
            (
                category.to_string(),
                features.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect()
}

fn pack(
    pack_id: &str,
    pack_name: &str,
    description: &str,
    category: &str,
    price_monthly: f64,
    features: &[&str],
    grants: &[(&str, &[&str])],
) -> GrowthPackInfo {
    GrowthPackInfo {
        pack_id: pack_id.to_string(),
        pack_name: pack_name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price_monthly,
        features: features.iter().map(|f| f.to_string()).collect(),
        feature_map: feature_map(grants),
    }
}

pub fn default_base_features() -> FeatureMap {
    feature_map(&[
        (
            "cv_models",
            &["person", "car", "van", "truck", "bus", "motorcycle"],
        ),
        (
            "analytics",
            &[
                "detection",
                "tracking",
                "counting",
                "dwell",
                "heatmap",
                "direction",
                "speed",
                "privacy_mask",
            ],
        ),
        (
            "outputs",
            &["edge_io", "dashboard", "email", "webhook", "api"],
        ),
    ])
}

pub fn default_packs() -> Vec<GrowthPackInfo> {
    vec![
        pack(
            "pack-advanced-analytics",
            "Advanced Analytics",
            "Advanced analytics and reporting features",
            "analytics",
            29.00,
            &[
                "Near-miss detection",
                "Interaction time tracking",
                "Queue counting",
                "Object size estimation",
            ],
            &[(
                "analytics",
                &["near_miss", "interaction_time", "queue_counter", "object_size"],
            )],
        ),
        pack(
            "pack-active-transport",
            "Active Transport",
            "Active transport mode detection and analytics",
            "intelligence",
            45.00,
            &[
                "Bicycle detection",
                "Scooter detection",
                "Pram/stroller detection",
                "Wheelchair detection",
            ],
            &[("cv_models", &["bike", "scooter", "pram", "wheelchair"])],
        ),
        pack(
            "pack-cloud-storage",
            "Cloud Storage",
            "Extended cloud storage for video and analytics data",
            "data",
            149.00,
            &[
                "1TB cloud storage",
                "30-day retention",
                "Encrypted backups",
                "High-availability storage",
            ],
            &[(
                "outputs",
                &["cloud_backup", "extended_retention", "encrypted_storage"],
            )],
        ),
        pack(
            "pack-api-integration",
            "API Integration",
            "Advanced API access and integration capabilities",
            "integration",
            109.00,
            &[
                "Unlimited API calls",
                "Webhook support",
                "Custom integrations",
                "Priority support",
            ],
            &[(
                "outputs",
                &[
                    "unlimited_api",
                    "webhooks",
                    "custom_integrations",
                    "priority_support",
                ],
            )],
        ),
        pack(
            "pack-intelligence",
            "Intelligence",
            "AI-powered insights and LLM-based analytics",
            "intelligence",
            599.00,
            &[
                "Full analyst seat",
                "Premium connectors",
                "Automated reports",
                "Natural language queries",
            ],
            &[(
                "llm",
                &["analyst_seat_full", "premium_connectors", "automated_reports"],
            )],
        ),
        pack(
            "pack-emergency-vehicles",
            "Emergency Vehicles",
            "Emergency vehicle detection for traffic management",
            "industry",
            39.00,
            &[
                "Police vehicle detection",
                "Ambulance detection",
                "Fire truck detection",
            ],
            &[("cv_models", &["police", "ambulance", "fire_fighter"])],
        ),
        pack(
            "pack-retail",
            "Retail",
            "Retail-specific detection and analytics",
            "industry",
            49.00,
            &[
                "Shopping trolley detection",
                "Staff detection",
                "Customer flow analysis",
            ],
            &[("cv_models", &["trolley", "staff", "customer"])],
        ),
    ]
}
