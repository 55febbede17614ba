//! Schemas for the admin-managed content collections.

use crate::domain::slug::slug_or_derive;
use crate::domain::types::ProjectStatus;

use super::{FieldErrors, Fields, FormData, parse_list};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePayload {
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub icon_key: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

pub fn validate_service(form: &FormData) -> Result<ServicePayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let title = fields.text("title", "Title", 3);
    let slug = fields.text("slug", "Slug", 3);
    let short_description = fields.text("shortDescription", "Short description", 10);
    let description = fields.text("description", "Description", 20);
    let icon_key = fields.optional_text("iconKey");
    let position = fields.position("position");
    let is_active = fields.checkbox("isActive");

    fields.finish(ServicePayload {
        title,
        slug,
        short_description,
        description,
        icon_key,
        position,
        is_active,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioPayload {
    pub title: String,
    pub slug: String,
    pub industry: String,
    pub short_summary: String,
    pub tags: Vec<String>,
    pub cover_image: String,
    pub services_provided: Vec<String>,
    pub live_link: Option<String>,
    pub status: ProjectStatus,
    pub position: i32,
    /// `None` leaves the stored gallery untouched; `Some` replaces it wholesale.
    pub gallery: Option<Vec<GalleryImage>>,
}

pub fn validate_portfolio(form: &FormData) -> Result<PortfolioPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let title = fields.text("title", "Title", 2);
    let slug = if fields.has_error("title") {
        String::new()
    } else {
        match slug_or_derive(form.non_blank("slug"), &title) {
            Ok(slug) => slug,
            Err(_) => {
                fields.fail("slug", "Slug must contain letters or numbers.");
                String::new()
            }
        }
    };
    let industry = fields.text("industry", "Industry", 2);
    let short_summary = fields
        .optional_text("shortSummary")
        .unwrap_or_else(|| format!("Homepage preview of {title} for {industry}."));

    let mut tags = fields.list("tags");
    if tags.is_empty() {
        tags = vec![industry.clone(), "Website Homepage".to_string()];
    }

    let cover_image = fields.text("coverImage", "Cover image", 1);

    let mut services_provided = fields.list("servicesProvided");
    if services_provided.is_empty() {
        services_provided = vec!["Website Design".to_string()];
    }

    let live_link = fields.optional_url("liveLink", "Live link");
    let status = match ProjectStatus::try_from(form.get("status").unwrap_or("DEMO")) {
        Ok(status) => status,
        Err(_) => {
            fields.fail("status", "Status must be DEMO or CLIENT.");
            ProjectStatus::Demo
        }
    };
    let position = fields.position("position");

    let gallery = fields
        .present("galleryImages")
        .then(|| parse_gallery(form.get("galleryImages").unwrap_or_default()));

    fields.finish(PortfolioPayload {
        title,
        slug,
        industry,
        short_summary,
        tags,
        cover_image,
        services_provided,
        live_link,
        status,
        position,
        gallery,
    })
}

/// One image per line, optionally `url | alt text`.
pub fn parse_gallery(raw: &str) -> Vec<GalleryImage> {
    parse_list(raw)
        .into_iter()
        .map(|line| match line.split_once(" | ") {
            Some((url, alt)) => GalleryImage {
                url: url.trim().to_string(),
                alt: Some(alt.trim().to_string()).filter(|alt| !alt.is_empty()),
            },
            None => GalleryImage {
                url: line,
                alt: None,
            },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCategoryPayload {
    pub name: String,
    pub slug: String,
    pub position: i32,
    pub is_active: bool,
}

pub fn validate_project_category(form: &FormData) -> Result<ProjectCategoryPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let name = fields.text("name", "Name", 2);
    let slug = if fields.has_error("name") {
        String::new()
    } else {
        match slug_or_derive(form.non_blank("slug"), &name) {
            Ok(slug) => slug,
            Err(_) => {
                fields.fail("slug", "Slug must contain letters or numbers.");
                String::new()
            }
        }
    };
    let position = fields.position("position");
    let is_active = fields.checkbox("isActive");

    fields.finish(ProjectCategoryPayload {
        name,
        slug,
        position,
        is_active,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStepPayload {
    pub title: String,
    pub description: String,
    pub deliverables: Vec<String>,
    pub timeline: String,
    pub position: i32,
}

pub fn validate_process_step(form: &FormData) -> Result<ProcessStepPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let title = fields.text("title", "Title", 3);
    let description = fields.text("description", "Description", 10);
    let deliverables = fields.list_min("deliverables", "Deliverables", 1);
    let timeline = fields.text("timeline", "Timeline", 2);
    let position = fields.position("position");

    fields.finish(ProcessStepPayload {
        title,
        description,
        deliverables,
        timeline,
        position,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPackagePayload {
    pub name: String,
    pub slug: String,
    pub price: i32,
    pub delivery: String,
    pub includes: Vec<String>,
    pub freebies: Vec<String>,
    pub note: Option<String>,
    pub is_popular: bool,
    pub position: i32,
}

pub fn validate_pricing_package(form: &FormData) -> Result<PricingPackagePayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let name = fields.text("name", "Name", 2);
    let slug = fields.text("slug", "Slug", 2);
    let price = fields.non_negative("price", "Price");
    let delivery = fields.text("delivery", "Delivery", 2);
    let includes = fields.list_min("includes", "Includes", 1);
    let freebies = fields.list_min("freebies", "Freebies", 1);
    let note = fields.optional_text("note");
    let is_popular = fields.checkbox("isPopular");
    let position = fields.position("position");

    fields.finish(PricingPackagePayload {
        name,
        slug,
        price,
        delivery,
        includes,
        freebies,
        note,
        is_popular,
        position,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqPayload {
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub is_published: bool,
}

pub fn validate_faq(form: &FormData) -> Result<FaqPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let question = fields.text("question", "Question", 5);
    let answer = fields.text("answer", "Answer", 10);
    let position = fields.position("position");
    let is_published = fields.checkbox("isPublished");

    fields.finish(FaqPayload {
        question,
        answer,
        position,
        is_published,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialPayload {
    pub name: String,
    pub role: String,
    pub company: String,
    pub quote: String,
    pub avatar_url: Option<String>,
    pub position: i32,
    pub is_published: bool,
}

pub fn validate_testimonial(form: &FormData) -> Result<TestimonialPayload, FieldErrors> {
    let mut fields = Fields::new(form);
    let name = fields.text("name", "Name", 2);
    let role = fields.text("role", "Role", 2);
    let company = fields.text("company", "Company", 2);
    let quote = fields.text("quote", "Quote", 10);
    let avatar_url = fields.optional_url("avatarUrl", "Avatar URL");
    let position = fields.position("position");
    let is_published = fields.checkbox("isPublished");

    fields.finish(TestimonialPayload {
        name,
        role,
        company,
        quote,
        avatar_url,
        position,
        is_published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio_form() -> FormData {
        FormData::new()
            .with("title", "MetroBuild Prime!!")
            .with("industry", "Construction")
            .with("coverImage", "https://cdn.example.com/metro.png")
            .with("status", "CLIENT")
            .with("position", "2")
    }

    #[test]
    fn portfolio_defaults_fill_blank_fields() {
        let payload = validate_portfolio(&portfolio_form()).expect("valid");
        assert_eq!(payload.slug, "metrobuild-prime");
        assert_eq!(
            payload.short_summary,
            "Homepage preview of MetroBuild Prime!! for Construction."
        );
        assert_eq!(payload.tags, vec!["Construction", "Website Homepage"]);
        assert_eq!(payload.services_provided, vec!["Website Design"]);
        assert_eq!(payload.status, ProjectStatus::Client);
        assert!(payload.gallery.is_none());
    }

    #[test]
    fn portfolio_gallery_present_but_blank_clears_gallery() {
        let form = portfolio_form().with("galleryImages", "  \n ");
        let payload = validate_portfolio(&form).expect("valid");
        assert_eq!(payload.gallery, Some(Vec::new()));
    }

    #[test]
    fn portfolio_gallery_keeps_line_order_and_alt_text() {
        let form = portfolio_form().with(
            "galleryImages",
            "https://cdn.example.com/1.png\nhttps://cdn.example.com/2.png | Lobby\n",
        );
        let gallery = validate_portfolio(&form).expect("valid").gallery.unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[0].url, "https://cdn.example.com/1.png");
        assert_eq!(gallery[1].alt.as_deref(), Some("Lobby"));
    }

    #[test]
    fn portfolio_rejects_invalid_live_link_but_accepts_blank() {
        let blank = portfolio_form().with("liveLink", "");
        assert!(validate_portfolio(&blank).expect("valid").live_link.is_none());

        let bad = portfolio_form().with("liveLink", "metrobuild");
        let errors = validate_portfolio(&bad).unwrap_err();
        assert!(errors.has("liveLink"));
    }

    #[test]
    fn service_requires_minimum_lengths() {
        let form = FormData::new()
            .with("title", "Web")
            .with("slug", "web")
            .with("shortDescription", "too short")
            .with("description", "A description that is long enough.");
        let errors = validate_service(&form).unwrap_err();
        assert_eq!(errors.first().unwrap().field, "shortDescription");
        assert_eq!(
            errors.first_message(),
            "Short description must be at least 10 characters."
        );
    }

    #[test]
    fn service_slug_is_kept_as_entered() {
        let form = FormData::new()
            .with("title", "Website Design")
            .with("slug", "  Web-Design ")
            .with("shortDescription", "Sites that convert.")
            .with("description", "Design and build of a full marketing site.");
        let payload = validate_service(&form).expect("valid");
        assert_eq!(payload.slug, "Web-Design");
    }

    #[test]
    fn pricing_parses_lists_and_checkbox() {
        let form = FormData::new()
            .with("name", "Startup")
            .with("slug", "startup-plan")
            .with("price", "14999")
            .with("delivery", "7 days")
            .with("includes", "5 pages\nContact form")
            .with("freebies", "Free domain")
            .with("isPopular", "on");
        let payload = validate_pricing_package(&form).expect("valid");
        assert_eq!(payload.slug, "startup-plan");
        assert_eq!(payload.price, 14_999);
        assert_eq!(payload.includes.len(), 2);
        assert!(payload.is_popular);
        assert_eq!(payload.note, None);
    }

    #[test]
    fn pricing_rejects_negative_price() {
        let form = FormData::new()
            .with("name", "Startup")
            .with("slug", "startup")
            .with("price", "-1")
            .with("delivery", "7 days")
            .with("includes", "5 pages")
            .with("freebies", "Free domain");
        let errors = validate_pricing_package(&form).unwrap_err();
        assert!(errors.has("price"));
    }

    #[test]
    fn process_step_requires_a_deliverable() {
        let form = FormData::new()
            .with("title", "Discovery")
            .with("description", "We learn about your business.")
            .with("deliverables", "\n")
            .with("timeline", "Day 1-2");
        let errors = validate_process_step(&form).unwrap_err();
        assert!(errors.has("deliverables"));
    }

    #[test]
    fn testimonial_blank_avatar_is_absent() {
        let form = FormData::new()
            .with("name", "Ana")
            .with("role", "Owner")
            .with("company", "Ana's Bakery")
            .with("quote", "They doubled our inquiries.")
            .with("avatarUrl", " ")
            .with("isPublished", "on");
        let payload = validate_testimonial(&form).expect("valid");
        assert!(payload.avatar_url.is_none());
        assert!(payload.is_published);
    }

    #[test]
    fn category_derives_slug_from_name() {
        let form = FormData::new().with("name", "Real Estate").with("isActive", "on");
        let payload = validate_project_category(&form).expect("valid");
        assert_eq!(payload.slug, "real-estate");
    }
}
