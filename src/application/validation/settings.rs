//! Site settings form.

use super::{FieldErrors, Fields, FormData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettingsPayload {
    pub brand_name: String,
    pub hero_headline: String,
    pub hero_subheadline: String,
    pub primary_cta_label: String,
    pub primary_cta_link: String,
    pub secondary_cta_label: String,
    pub secondary_cta_link: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub office_address: Option<String>,
    pub whatsapp_link: Option<String>,
    pub messenger_link: Option<String>,
    pub message_button_label: String,
    pub message_button_link: Option<String>,
    pub calendar_booking_link: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub seo_default_title: String,
    pub seo_default_description: String,
    /// Matched against `pricing_packages.slug`, never an id.
    pub highlight_package_slug: String,
    pub testimonials_enabled: bool,
}

pub fn validate_site_settings(form: &FormData) -> Result<SiteSettingsPayload, FieldErrors> {
    let mut fields = Fields::new(form);

    let brand_name = fields.text("brandName", "Brand name", 2);
    let hero_headline = fields.text("heroHeadline", "Hero headline", 10);
    let hero_subheadline = fields.text("heroSubheadline", "Hero subheadline", 20);
    let primary_cta_label = fields.text("primaryCtaLabel", "Primary CTA label", 2);
    let primary_cta_link = fields.text("primaryCtaLink", "Primary CTA link", 1);
    let secondary_cta_label = fields.text("secondaryCtaLabel", "Secondary CTA label", 2);
    let secondary_cta_link = fields.text("secondaryCtaLink", "Secondary CTA link", 1);
    let phone = fields.optional_text("phone");
    let email = fields.optional_email("email");
    let office_address = fields.optional_text("officeAddress");
    let whatsapp_link = fields.optional_url("whatsappLink", "WhatsApp link");
    let messenger_link = fields.optional_url("messengerLink", "Messenger link");
    let message_button_label = fields.text("messageButtonLabel", "Message button label", 2);
    let message_button_link = fields.optional_url("messageButtonLink", "Message button link");
    let calendar_booking_link = fields.optional_url("calendarBookingLink", "Calendar booking link");
    let facebook_url = fields.optional_url("facebookUrl", "Facebook URL");
    let instagram_url = fields.optional_url("instagramUrl", "Instagram URL");
    let linkedin_url = fields.optional_url("linkedinUrl", "LinkedIn URL");
    let seo_default_title = fields.text("seoDefaultTitle", "SEO title", 10);
    let seo_default_description = fields.text("seoDefaultDescription", "SEO description", 20);
    let highlight_package_slug = fields.text("highlightPackageSlug", "Highlight package", 1);
    let testimonials_enabled = fields.checkbox("testimonialsEnabled");

    fields.finish(SiteSettingsPayload {
        brand_name,
        hero_headline,
        hero_subheadline,
        primary_cta_label,
        primary_cta_link,
        secondary_cta_label,
        secondary_cta_link,
        phone,
        email,
        office_address,
        whatsapp_link,
        messenger_link,
        message_button_label,
        message_button_link,
        calendar_booking_link,
        facebook_url,
        instagram_url,
        linkedin_url,
        seo_default_title,
        seo_default_description,
        highlight_package_slug,
        testimonials_enabled,
    })
}
