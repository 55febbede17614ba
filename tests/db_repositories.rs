use std::time::Duration;

use sqlx::PgPool;
use time::OffsetDateTime;

use jdigital::application::pagination::PageRequest;
use jdigital::application::rate_limit::RateLimitStore;
use jdigital::application::repos::{ContentFilter, ContentRepo, LeadQueryFilter, LeadsRepo};
use jdigital::application::validation::{
    GalleryImage, NewLead, PortfolioPayload, PricingPackagePayload,
};
use jdigital::domain::entities::{PortfolioProjectRecord, PricingPackageRecord};
use jdigital::domain::types::{LeadStatus, LeadType, ProjectStatus};
use jdigital::infra::db::PostgresRepositories;

fn package(name: &str, slug: &str, position: i32) -> PricingPackagePayload {
    PricingPackagePayload {
        name: name.into(),
        slug: slug.into(),
        price: 15_000,
        delivery: "2 weeks".into(),
        includes: vec!["Landing page".into(), "Contact form".into()],
        freebies: vec!["Domain for 1 year".into()],
        note: None,
        is_popular: true,
        position,
    }
}

fn project(gallery: Option<Vec<GalleryImage>>) -> PortfolioPayload {
    PortfolioPayload {
        title: "Santos Dental".into(),
        slug: "santos-dental".into(),
        industry: "Healthcare".into(),
        short_summary: "Booking site for a family dental clinic.".into(),
        tags: vec!["booking".into()],
        cover_image: "https://cdn.example.com/santos/cover.png".into(),
        services_provided: vec!["Web design".into()],
        live_link: None,
        status: ProjectStatus::Client,
        position: 0,
        gallery,
    }
}

fn image(url: &str) -> GalleryImage {
    GalleryImage {
        url: url.into(),
        alt: None,
    }
}

fn lead(name: &str, email: &str) -> NewLead {
    NewLead {
        full_name: name.into(),
        email: email.into(),
        mobile_number: "09171234567".into(),
        business_name: format!("{name} Trading"),
        website_or_facebook_link: None,
        industry: "Retail".into(),
        package_interest: "Startup".into(),
        budget_range: "PHP 15,000 - 30,000".into(),
        preferred_contact_method: "Email".into(),
        preferred_contact_value: Some(email.into()),
        message_goals: "Need a new site".into(),
        lead_type: LeadType::Consultation,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn only_one_pricing_package_is_popular(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let packages: &dyn ContentRepo<PricingPackageRecord> = &repos;

    let first = packages.save(None, package("Startup", "startup", 0))
        .await
        .unwrap();
    let second = packages.save(None, package("Growth", "growth", 1))
        .await
        .unwrap();
    assert!(first.is_popular);
    assert!(second.is_popular);

    let listed = packages
        .list(&ContentFilter::default(), PageRequest::new(None, 20))
        .await
        .unwrap();
    let popular: Vec<_> = listed
        .iter()
        .filter(|package| package.is_popular)
        .map(|package| package.slug.as_str())
        .collect();
    assert_eq!(popular, vec!["growth"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn gallery_is_replaced_in_submitted_order(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let projects: &dyn ContentRepo<PortfolioProjectRecord> = &repos;

    let created = projects
        .save(
            None,
            project(Some(vec![image("https://cdn.example.com/a.png")])),
        )
        .await
        .unwrap();
    assert_eq!(created.gallery.len(), 1);

    let updated = projects
        .save(
            Some(created.id),
            project(Some(vec![
                image("https://cdn.example.com/c.png"),
                image("https://cdn.example.com/b.png"),
            ])),
        )
        .await
        .unwrap();
    let urls: Vec<_> = updated
        .gallery
        .iter()
        .map(|image| (image.url.as_str(), image.position))
        .collect();
    assert_eq!(
        urls,
        vec![
            ("https://cdn.example.com/c.png", 1),
            ("https://cdn.example.com/b.png", 2),
        ]
    );

    let untouched = projects.save(Some(created.id), project(None)).await.unwrap();
    assert_eq!(untouched.gallery.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn leads_start_new_and_list_newest_first(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);

    let older = repos.create_lead(&lead("Juan", "juan@example.com")).await.unwrap();
    let newer = repos.create_lead(&lead("Ana", "ana@example.com")).await.unwrap();
    assert_eq!(older.status, LeadStatus::New);

    let all = repos.list_all_leads().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, newer.id);

    assert!(
        repos
            .update_lead_status(older.id, LeadStatus::Contacted)
            .await
            .unwrap()
    );
    let contacted = repos
        .list_leads(
            &LeadQueryFilter {
                search: None,
                status: Some(LeadStatus::Contacted),
            },
            PageRequest::new(None, 12),
        )
        .await
        .unwrap();
    assert_eq!(contacted.len(), 1);
    assert_eq!(contacted[0].id, older.id);

    let searched = repos
        .count_leads(&LeadQueryFilter {
            search: Some("ana@".into()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(searched, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn rate_limit_attempts_accumulate_and_expire(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let window = Duration::from_secs(60);

    let first = repos.record_attempt("203.0.113.9", window).await.unwrap();
    let second = repos.record_attempt("203.0.113.9", window).await.unwrap();
    let other = repos.record_attempt("audit:203.0.113.9", window).await.unwrap();
    assert_eq!(first.attempt_count, 1);
    assert_eq!(second.attempt_count, 2);
    assert_eq!(other.attempt_count, 1);

    let kept = repos
        .cleanup_expired(OffsetDateTime::now_utc() - time::Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(kept, 0);

    let removed = repos
        .cleanup_expired(OffsetDateTime::now_utc() + time::Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(removed, 2);
}
