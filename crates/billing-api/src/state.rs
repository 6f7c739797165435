use std::sync::Arc;
use std::time::Instant;

use billing_core::repositories::BillingRepository;
use billing_core::services::{
    AdminService, DeviceService, EntitlementService, LicenseService, PricingCalculator,
    RevocationService, SubscriptionService, UsageService,
};
use billing_core::Catalog;
use billing_shared::config::AppConfig;

type Repo = dyn BillingRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repo>,
    pub config: Arc<AppConfig>,
    pub catalog: Arc<Catalog>,
    pub pricing: Arc<PricingCalculator>,
    pub licenses: Arc<LicenseService<Repo>>,
    pub revocations: Arc<RevocationService<Repo>>,
    pub entitlements: Arc<EntitlementService<Repo>>,
    pub subscriptions: Arc<SubscriptionService<Repo>>,
    pub usage: Arc<UsageService<Repo>>,
    pub devices: Arc<DeviceService<Repo>>,
    pub admin: Arc<AdminService<Repo>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(repo: Arc<Repo>, config: AppConfig) -> Self {
        let catalog = Arc::new(Catalog::default());
        let policy = config.licensing.clone();

        Self {
            pricing: Arc::new(PricingCalculator::new(catalog.clone(), &policy)),
            licenses: Arc::new(LicenseService::new(repo.clone(), catalog.clone(), policy.clone())),
            revocations: Arc::new(RevocationService::new(repo.clone(), policy.clone())),
            entitlements: Arc::new(EntitlementService::new(repo.clone(), catalog.clone())),
            subscriptions: Arc::new(SubscriptionService::new(repo.clone(), catalog.clone(), &policy)),
            usage: Arc::new(UsageService::new(repo.clone())),
            devices: Arc::new(DeviceService::new(repo.clone(), &policy)),
            admin: Arc::new(AdminService::new(repo.clone(), catalog.clone(), policy)),
            repo,
            catalog,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
