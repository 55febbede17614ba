use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use jdigital::application::admin::{
    AdminContentService, AdminLeadService, AdminMediaService, AdminSettingsService,
    AdminUserService, AuthService,
};
use jdigital::application::content::ContentRecord;
use jdigital::application::leads::LeadIntakeService;
use jdigital::application::notify::LeadNotifier;
use jdigital::application::pagination::PageRequest;
use jdigital::application::public::PublicSiteService;
use jdigital::application::rate_limit::{InMemoryRateLimiter, RateLimitPolicy, SubmissionPolicies};
use jdigital::application::repos::{
    ContentFilter, ContentRepo, LeadQueryFilter, LeadsRepo, MediaRepo, NewMediaAsset, NewUser,
    PublicContent, PublicContentQuery, PublicContentRepo, RepoError, SiteSettingsRepo,
    SitemapProject, UsersRepo,
};
use jdigital::application::sitemap::SitemapService;
use jdigital::application::validation::{NewLead, SiteSettingsPayload};
use jdigital::cache::{CacheConfig, CacheInvalidator, CacheState};
use jdigital::domain::entities::{
    FaqRecord, LeadRecord, MediaAssetRecord, PortfolioProjectRecord, PricingPackageRecord,
    ProcessStepRecord, ProjectCategoryRecord, ServiceRecord, SiteSettingsRecord,
    TestimonialRecord, UserRecord,
};
use jdigital::domain::site::{FALLBACK_BRAND_NAME, fallback_site_settings};
use jdigital::domain::types::LeadStatus;
use jdigital::infra::http::{AdminState, PublicState, build_admin_router, build_public_router};
use jdigital::infra::storage::UnconfiguredStorage;

const ADMIN_EMAIL: &str = "admin@jdigital.local";
const ADMIN_PASSWORD: &str = "correct horse battery";

#[derive(Default)]
struct MemoryLeads {
    rows: Mutex<Vec<LeadRecord>>,
}

#[async_trait]
impl LeadsRepo for MemoryLeads {
    async fn create_lead(&self, lead: &NewLead) -> Result<LeadRecord, RepoError> {
        let record = LeadRecord {
            id: Uuid::new_v4(),
            full_name: lead.full_name.clone(),
            email: lead.email.clone(),
            mobile_number: lead.mobile_number.clone(),
            business_name: lead.business_name.clone(),
            website_or_facebook_link: lead.website_or_facebook_link.clone(),
            industry: lead.industry.clone(),
            package_interest: lead.package_interest.clone(),
            budget_range: lead.budget_range.clone(),
            preferred_contact_method: lead.preferred_contact_method.clone(),
            preferred_contact_value: lead.preferred_contact_value.clone(),
            message_goals: lead.message_goals.clone(),
            status: LeadStatus::New,
            lead_type: lead.lead_type,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_leads(
        &self,
        _filter: &LeadQueryFilter,
        _page: PageRequest,
    ) -> Result<Vec<LeadRecord>, RepoError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn count_leads(&self, _filter: &LeadQueryFilter) -> Result<u64, RepoError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, RepoError> {
        Ok(self.rows.lock().unwrap().iter().find(|row| row.id == id).cloned())
    }

    async fn update_lead_status(&self, id: Uuid, status: LeadStatus) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_all_leads(&self) -> Result<Vec<LeadRecord>, RepoError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

/// Empty store for everything the routers touch but these tests do not inspect.
#[derive(Default)]
struct EmptyStore {
    users: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl<R: ContentRecord> ContentRepo<R> for EmptyStore {
    async fn list(&self, _filter: &ContentFilter, _page: PageRequest) -> Result<Vec<R>, RepoError> {
        Ok(Vec::new())
    }

    async fn count(&self, _filter: &ContentFilter) -> Result<u64, RepoError> {
        Ok(0)
    }

    async fn find(&self, _id: Uuid) -> Result<Option<R>, RepoError> {
        Ok(None)
    }

    async fn save(&self, _id: Option<Uuid>, _payload: R::Payload) -> Result<R, RepoError> {
        Err(RepoError::NotFound)
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(false)
    }
}

#[async_trait]
impl PublicContentRepo for EmptyStore {
    async fn load_public_content(
        &self,
        _query: PublicContentQuery,
    ) -> Result<PublicContent, RepoError> {
        Ok(PublicContent {
            settings: None,
            services: Vec::new(),
            portfolio: Vec::new(),
            process_steps: Vec::new(),
            pricing_packages: Vec::new(),
            faqs: Vec::new(),
            testimonials: Vec::new(),
        })
    }

    async fn find_portfolio_by_slug(
        &self,
        _slug: &str,
    ) -> Result<Option<PortfolioProjectRecord>, RepoError> {
        Ok(None)
    }

    async fn list_sitemap_projects(&self) -> Result<Vec<SitemapProject>, RepoError> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl SiteSettingsRepo for EmptyStore {
    async fn load_site_settings(&self) -> Result<Option<SiteSettingsRecord>, RepoError> {
        Ok(None)
    }

    async fn upsert_site_settings(
        &self,
        _settings: &SiteSettingsPayload,
    ) -> Result<SiteSettingsRecord, RepoError> {
        Err(RepoError::Persistence("read-only store".into()))
    }
}

#[async_trait]
impl MediaRepo for EmptyStore {
    async fn create_media(&self, _asset: NewMediaAsset) -> Result<MediaAssetRecord, RepoError> {
        Err(RepoError::Persistence("read-only store".into()))
    }

    async fn list_media(&self, _page: PageRequest) -> Result<Vec<MediaAssetRecord>, RepoError> {
        Ok(Vec::new())
    }

    async fn count_media(&self) -> Result<u64, RepoError> {
        Ok(0)
    }

    async fn find_media(&self, _id: Uuid) -> Result<Option<MediaAssetRecord>, RepoError> {
        Ok(None)
    }

    async fn delete_media(&self, _id: Uuid) -> Result<bool, RepoError> {
        Ok(false)
    }
}

#[async_trait]
impl UsersRepo for EmptyStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepoError> {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_password_hash(&self, _id: Uuid, _hash: &str) -> Result<bool, RepoError> {
        Ok(false)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|user| user.id != id);
        Ok(users.len() != before)
    }
}

/// Public content store whose reads fail until it is marked healthy.
#[derive(Default)]
struct FlakyContent {
    healthy: AtomicBool,
}

#[async_trait]
impl PublicContentRepo for FlakyContent {
    async fn load_public_content(
        &self,
        _query: PublicContentQuery,
    ) -> Result<PublicContent, RepoError> {
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        let mut settings = fallback_site_settings();
        settings.brand_name = "Stored Brand".into();
        Ok(PublicContent {
            settings: Some(settings),
            services: Vec::new(),
            portfolio: Vec::new(),
            process_steps: Vec::new(),
            pricing_packages: Vec::new(),
            faqs: Vec::new(),
            testimonials: Vec::new(),
        })
    }

    async fn find_portfolio_by_slug(
        &self,
        _slug: &str,
    ) -> Result<Option<PortfolioProjectRecord>, RepoError> {
        Ok(None)
    }

    async fn list_sitemap_projects(&self) -> Result<Vec<SitemapProject>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

struct SilentNotifier;

#[async_trait]
impl LeadNotifier for SilentNotifier {
    async fn notify(&self, _lead: &LeadRecord) {}
}

fn public_router(leads: Arc<MemoryLeads>, policies: SubmissionPolicies) -> Router {
    public_router_over(Arc::new(EmptyStore::default()), leads, policies, None)
}

fn public_router_over(
    repo: Arc<dyn PublicContentRepo>,
    leads: Arc<MemoryLeads>,
    policies: SubmissionPolicies,
    cache: Option<CacheState>,
) -> Router {
    let state = PublicState {
        site: Arc::new(PublicSiteService::new(repo.clone())),
        sitemap: Arc::new(SitemapService::new(repo.clone(), "https://jdigital.test")),
        leads: Arc::new(LeadIntakeService::new(
            leads,
            Arc::new(InMemoryRateLimiter::new()),
            Arc::new(SilentNotifier),
            policies,
        )),
        repo,
        trust_forwarded_for: true,
        cache,
    };
    build_public_router(state)
}

async fn admin_router() -> (Router, Arc<EmptyStore>, Uuid) {
    let store = Arc::new(EmptyStore::default());
    let hash = bcrypt::hash(ADMIN_PASSWORD, 4).unwrap();
    let admin = UsersRepo::create_user(
        store.as_ref(),
        NewUser {
            email: ADMIN_EMAIL.into(),
            password_hash: hash,
            name: Some("Admin".into()),
        },
    )
    .await
    .unwrap();

    let cache = CacheInvalidator::detached();
    let state = AdminState {
        auth: Arc::new(AuthService::new(store.clone(), Some("test-secret".into()), 24)),
        services: Arc::new(AdminContentService::<ServiceRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        portfolio: Arc::new(AdminContentService::<PortfolioProjectRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        categories: Arc::new(AdminContentService::<ProjectCategoryRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        process: Arc::new(AdminContentService::<ProcessStepRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        pricing: Arc::new(AdminContentService::<PricingPackageRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        faqs: Arc::new(AdminContentService::<FaqRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        testimonials: Arc::new(AdminContentService::<TestimonialRecord>::new(
            store.clone(),
            cache.clone(),
        )),
        settings: Arc::new(AdminSettingsService::new(store.clone(), cache.clone())),
        leads: Arc::new(AdminLeadService::new(
            Arc::new(MemoryLeads::default()),
            cache.clone(),
        )),
        media: Arc::new(AdminMediaService::new(
            store.clone(),
            Arc::new(UnconfiguredStorage::new(vec!["JDIGITAL__STORAGE__BUCKET"])),
            cache.clone(),
            1024,
        )),
        users: Arc::new(AdminUserService::new(store.clone(), cache, 4)),
        secure_cookies: false,
    };
    (build_admin_router(state, 4096), store, admin.id)
}

async fn login_cookie(router: &Router) -> String {
    let login = router
        .clone()
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "email=admin%40jdigital.local&password=correct+horse+battery",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    login.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn consultation_body() -> String {
    serde_json::json!({
        "fullName": "Juan Dela Cruz",
        "email": "juan@example.com",
        "mobileNumber": "09171234567",
        "businessName": "Juan's Cafe",
        "industry": "Retail",
        "packageInterest": "Startup",
        "budgetRange": "PHP 15,000 - 30,000",
        "preferredContactMethod": "Email",
        "messageGoals": "Need a new site"
    })
    .to_string()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn consultation_submission_is_stored() {
    let leads = Arc::new(MemoryLeads::default());
    let router = public_router(leads.clone(), SubmissionPolicies::default());

    let response = router
        .oneshot(post_json("/api/leads", consultation_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let rows = leads.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(body["leadId"], rows[0].id.to_string());
}

#[tokio::test]
async fn invalid_audit_reports_field_errors_without_storing() {
    let leads = Arc::new(MemoryLeads::default());
    let router = public_router(leads.clone(), SubmissionPolicies::default());
    let body = serde_json::json!({
        "fullName": "Ana Reyes",
        "email": "ana@example.com",
        "businessName": "Reyes Realty",
        "websiteOrFacebookLink": "not a link"
    })
    .to_string();

    let response = router
        .oneshot(post_json("/api/leads/audit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["errors"]["websiteOrFacebookLink"].is_string());
    assert!(leads.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn repeated_submissions_are_rate_limited() {
    let leads = Arc::new(MemoryLeads::default());
    let policies = SubmissionPolicies {
        consultation: RateLimitPolicy::new(1, Duration::from_secs(60)),
        ..SubmissionPolicies::default()
    };
    let router = public_router(leads.clone(), policies);

    let first = router
        .clone()
        .oneshot(post_json("/api/leads", consultation_body()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(post_json("/api/leads", consultation_body()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(second).await["success"], false);
    assert_eq!(leads.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn health_and_missing_project() {
    let router = public_router(Arc::new(MemoryLeads::default()), SubmissionPolicies::default());

    let health = router
        .clone()
        .oneshot(Request::get("/_health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await["status"], "ok");

    let missing = router
        .oneshot(
            Request::get("/api/portfolio/no-such-project")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sitemap_is_served_as_xml() {
    let router = public_router(Arc::new(MemoryLeads::default()), SubmissionPolicies::default());
    let response = router
        .oneshot(Request::get("/sitemap.xml").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/xml")
    );
}

#[tokio::test]
async fn admin_routes_reject_missing_sessions() {
    let (router, _, _) = admin_router().await;

    let api = router
        .clone()
        .oneshot(
            Request::get("/admin/leads")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(api).await["error"], "Unauthorized");

    let page = router
        .oneshot(
            Request::get("/admin/leads")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        page.headers()[header::LOCATION],
        "/admin/login?callbackUrl=%2Fadmin%2Fleads"
    );
}

#[tokio::test]
async fn login_cookie_opens_admin_routes() {
    let (router, _, _) = admin_router().await;

    let login = router
        .clone()
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "email=admin%40jdigital.local&password=correct+horse+battery&callbackUrl=%2Fadmin%2Fleads",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let set_cookie = login.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("jd_session="));
    assert_eq!(json_body(login).await["url"], "/admin/leads");

    let session = router
        .clone()
        .oneshot(
            Request::get("/admin/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(session.status(), StatusCode::OK);
    assert_eq!(json_body(session).await["user"]["email"], ADMIN_EMAIL);

    let delete = router
        .oneshot(
            Request::post("/admin/faqs/delete")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(""))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(delete).await["error"], "Missing FAQ ID.");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (router, _, _) = admin_router().await;
    let response = router
        .oneshot(
            Request::post("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "email=admin%40jdigital.local&password=not-the-password",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await["error"],
        "Invalid email or password."
    );
}

#[tokio::test]
async fn deleted_admin_cannot_reuse_session() {
    let (router, store, admin_id) = admin_router().await;
    let cookie = login_cookie(&router).await;

    let session_request = || {
        Request::get("/admin/session")
            .header(header::COOKIE, &cookie)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap()
    };
    let before = router.clone().oneshot(session_request()).await.unwrap();
    assert_eq!(before.status(), StatusCode::OK);

    assert!(UsersRepo::delete_user(store.as_ref(), admin_id).await.unwrap());
    let after = router.oneshot(session_request()).await.unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(after).await["error"], "Unauthorized");
}

#[tokio::test]
async fn malformed_lead_bodies_get_the_submission_envelope() {
    let leads = Arc::new(MemoryLeads::default());
    let router = public_router(leads.clone(), SubmissionPolicies::default());

    let wrong_type = router
        .clone()
        .oneshot(post_json("/api/leads", r#"{"fullName": 5}"#.into()))
        .await
        .unwrap();
    assert_eq!(wrong_type.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(wrong_type).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    let not_json = router
        .oneshot(post_json("/api/leads/audit", "fullName=Ana".into()))
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(not_json).await["success"], false);
    assert!(leads.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn outage_fallback_is_not_cached() {
    let content = Arc::new(FlakyContent::default());
    let router = public_router_over(
        content.clone(),
        Arc::new(MemoryLeads::default()),
        SubmissionPolicies::default(),
        Some(CacheState::new(CacheConfig::default())),
    );
    let site = || Request::get("/api/site").body(Body::empty()).unwrap();

    let during_outage = router.clone().oneshot(site()).await.unwrap();
    assert_eq!(during_outage.status(), StatusCode::OK);
    assert_eq!(during_outage.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(
        json_body(during_outage).await["settings"]["brand_name"],
        FALLBACK_BRAND_NAME
    );

    content.healthy.store(true, Ordering::SeqCst);
    let recovered = router.clone().oneshot(site()).await.unwrap();
    assert!(recovered.headers().get("x-cache").is_none());
    assert_eq!(
        json_body(recovered).await["settings"]["brand_name"],
        "Stored Brand"
    );

    let repeated = router.oneshot(site()).await.unwrap();
    assert_eq!(repeated.headers()["x-cache"], "hit");
}
