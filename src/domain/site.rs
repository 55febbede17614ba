//! Built-in site settings used when the store cannot be reached.

use time::OffsetDateTime;

use super::entities::SiteSettingsRecord;

pub const FALLBACK_BRAND_NAME: &str = "J-Digital Solutions";

/// Hardcoded settings served by the public read path when the store is unavailable.
pub fn fallback_site_settings() -> SiteSettingsRecord {
    SiteSettingsRecord {
        brand_name: FALLBACK_BRAND_NAME.to_string(),
        hero_headline: "Turn Your Website Into a 24/7 Client-Generating System".to_string(),
        hero_subheadline: "We design and build premium websites for Philippine businesses that improve trust, capture leads, and drive consistent growth.".to_string(),
        primary_cta_label: "Book Free Consultation".to_string(),
        primary_cta_link: "/contact?package=startup".to_string(),
        secondary_cta_label: "View Portfolio".to_string(),
        secondary_cta_link: "/portfolio".to_string(),
        phone: Some("0927 495 0610".to_string()),
        email: Some("jdigitalsolutions27@gmail.com".to_string()),
        office_address: None,
        whatsapp_link: None,
        messenger_link: Some("https://m.me/jdigitalsolutions".to_string()),
        message_button_label: "Message Us".to_string(),
        message_button_link: Some("https://m.me/jdigitalsolutions".to_string()),
        calendar_booking_link: None,
        facebook_url: Some("https://www.facebook.com/jdigitalsolutions".to_string()),
        instagram_url: None,
        linkedin_url: None,
        seo_default_title: "J-Digital Solutions | Premium Websites for Philippine Businesses"
            .to_string(),
        seo_default_description: "J-Digital Solutions creates conversion-focused websites, landing pages, and growth systems for Philippine SMEs and local brands.".to_string(),
        highlight_package_slug: "startup".to_string(),
        testimonials_enabled: false,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}
