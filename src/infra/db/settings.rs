use async_trait::async_trait;
use sqlx::PgConnection;
use time::OffsetDateTime;

use crate::{
    application::repos::{RepoError, SiteSettingsRepo},
    application::validation::SiteSettingsPayload,
    domain::entities::SiteSettingsRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const SETTINGS_COLUMNS: &str = "brand_name, hero_headline, hero_subheadline, \
     primary_cta_label, primary_cta_link, secondary_cta_label, secondary_cta_link, \
     phone, email, office_address, whatsapp_link, messenger_link, message_button_label, \
     message_button_link, calendar_booking_link, facebook_url, instagram_url, linkedin_url, \
     seo_default_title, seo_default_description, highlight_package_slug, testimonials_enabled, \
     updated_at";

#[derive(sqlx::FromRow)]
struct SiteSettingsRow {
    brand_name: String,
    hero_headline: String,
    hero_subheadline: String,
    primary_cta_label: String,
    primary_cta_link: String,
    secondary_cta_label: String,
    secondary_cta_link: String,
    phone: Option<String>,
    email: Option<String>,
    office_address: Option<String>,
    whatsapp_link: Option<String>,
    messenger_link: Option<String>,
    message_button_label: String,
    message_button_link: Option<String>,
    calendar_booking_link: Option<String>,
    facebook_url: Option<String>,
    instagram_url: Option<String>,
    linkedin_url: Option<String>,
    seo_default_title: String,
    seo_default_description: String,
    highlight_package_slug: String,
    testimonials_enabled: bool,
    updated_at: OffsetDateTime,
}

impl From<SiteSettingsRow> for SiteSettingsRecord {
    fn from(row: SiteSettingsRow) -> Self {
        Self {
            brand_name: row.brand_name,
            hero_headline: row.hero_headline,
            hero_subheadline: row.hero_subheadline,
            primary_cta_label: row.primary_cta_label,
            primary_cta_link: row.primary_cta_link,
            secondary_cta_label: row.secondary_cta_label,
            secondary_cta_link: row.secondary_cta_link,
            phone: row.phone,
            email: row.email,
            office_address: row.office_address,
            whatsapp_link: row.whatsapp_link,
            messenger_link: row.messenger_link,
            message_button_label: row.message_button_label,
            message_button_link: row.message_button_link,
            calendar_booking_link: row.calendar_booking_link,
            facebook_url: row.facebook_url,
            instagram_url: row.instagram_url,
            linkedin_url: row.linkedin_url,
            seo_default_title: row.seo_default_title,
            seo_default_description: row.seo_default_description,
            highlight_package_slug: row.highlight_package_slug,
            testimonials_enabled: row.testimonials_enabled,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_site_settings(
    conn: &mut PgConnection,
) -> Result<Option<SiteSettingsRecord>, RepoError> {
    let row = sqlx::query_as::<_, SiteSettingsRow>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM site_settings WHERE id = 1"
    ))
    .fetch_optional(conn)
    .await
    .map_err(map_sqlx_error)?;
    Ok(row.map(SiteSettingsRecord::from))
}

#[async_trait]
impl SiteSettingsRepo for PostgresRepositories {
    async fn load_site_settings(&self) -> Result<Option<SiteSettingsRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_site_settings(&mut conn).await
    }

    async fn upsert_site_settings(
        &self,
        settings: &SiteSettingsPayload,
    ) -> Result<SiteSettingsRecord, RepoError> {
        let sql = format!(
            "INSERT INTO site_settings (id, brand_name, hero_headline, hero_subheadline, \
             primary_cta_label, primary_cta_link, secondary_cta_label, secondary_cta_link, \
             phone, email, office_address, whatsapp_link, messenger_link, message_button_label, \
             message_button_link, calendar_booking_link, facebook_url, instagram_url, \
             linkedin_url, seo_default_title, seo_default_description, highlight_package_slug, \
             testimonials_enabled) \
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22) \
             ON CONFLICT (id) DO UPDATE SET \
             brand_name = EXCLUDED.brand_name, \
             hero_headline = EXCLUDED.hero_headline, \
             hero_subheadline = EXCLUDED.hero_subheadline, \
             primary_cta_label = EXCLUDED.primary_cta_label, \
             primary_cta_link = EXCLUDED.primary_cta_link, \
             secondary_cta_label = EXCLUDED.secondary_cta_label, \
             secondary_cta_link = EXCLUDED.secondary_cta_link, \
             phone = EXCLUDED.phone, \
             email = EXCLUDED.email, \
             office_address = EXCLUDED.office_address, \
             whatsapp_link = EXCLUDED.whatsapp_link, \
             messenger_link = EXCLUDED.messenger_link, \
             message_button_label = EXCLUDED.message_button_label, \
             message_button_link = EXCLUDED.message_button_link, \
             calendar_booking_link = EXCLUDED.calendar_booking_link, \
             facebook_url = EXCLUDED.facebook_url, \
             instagram_url = EXCLUDED.instagram_url, \
             linkedin_url = EXCLUDED.linkedin_url, \
             seo_default_title = EXCLUDED.seo_default_title, \
             seo_default_description = EXCLUDED.seo_default_description, \
             highlight_package_slug = EXCLUDED.highlight_package_slug, \
             testimonials_enabled = EXCLUDED.testimonials_enabled, \
             updated_at = now() \
             RETURNING {SETTINGS_COLUMNS}"
        );

        let row = sqlx::query_as::<_, SiteSettingsRow>(&sql)
            .bind(&settings.brand_name)
            .bind(&settings.hero_headline)
            .bind(&settings.hero_subheadline)
            .bind(&settings.primary_cta_label)
            .bind(&settings.primary_cta_link)
            .bind(&settings.secondary_cta_label)
            .bind(&settings.secondary_cta_link)
            .bind(&settings.phone)
            .bind(&settings.email)
            .bind(&settings.office_address)
            .bind(&settings.whatsapp_link)
            .bind(&settings.messenger_link)
            .bind(&settings.message_button_label)
            .bind(&settings.message_button_link)
            .bind(&settings.calendar_booking_link)
            .bind(&settings.facebook_url)
            .bind(&settings.instagram_url)
            .bind(&settings.linkedin_url)
            .bind(&settings.seo_default_title)
            .bind(&settings.seo_default_description)
            .bind(&settings.highlight_package_slug)
            .bind(settings.testimonials_enabled)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(SiteSettingsRecord::from(row))
    }
}
