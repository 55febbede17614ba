//! Binds each admin-managed record type to its validated payload and schema.
//!
//! The admin gateway and the generic repository are written once against
//! [`ContentRecord`]; adding a collection means one impl here plus its
//! storage adapter.

use serde::Serialize;
use uuid::Uuid;

use crate::application::validation::{
    FaqPayload, FieldErrors, FormData, PortfolioPayload, PricingPackagePayload,
    ProcessStepPayload, ProjectCategoryPayload, ServicePayload, TestimonialPayload, content,
};
use crate::domain::entities::{
    FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord,
    ProjectCategoryRecord, ServiceRecord, TestimonialRecord,
};
use crate::domain::types::EntityKind;

pub trait ContentRecord: Clone + Serialize + Send + Sync + 'static {
    type Payload: Clone + Send + Sync + 'static;

    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors>;
}

impl ContentRecord for ServiceRecord {
    type Payload = ServicePayload;
    const KIND: EntityKind = EntityKind::Service;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_service(form)
    }
}

impl ContentRecord for PortfolioProjectRecord {
    type Payload = PortfolioPayload;
    const KIND: EntityKind = EntityKind::PortfolioProject;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_portfolio(form)
    }
}

impl ContentRecord for ProjectCategoryRecord {
    type Payload = ProjectCategoryPayload;
    const KIND: EntityKind = EntityKind::ProjectCategory;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_project_category(form)
    }
}

impl ContentRecord for ProcessStepRecord {
    type Payload = ProcessStepPayload;
    const KIND: EntityKind = EntityKind::ProcessStep;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_process_step(form)
    }
}

impl ContentRecord for PricingPackageRecord {
    type Payload = PricingPackagePayload;
    const KIND: EntityKind = EntityKind::PricingPackage;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_pricing_package(form)
    }
}

impl ContentRecord for FaqRecord {
    type Payload = FaqPayload;
    const KIND: EntityKind = EntityKind::Faq;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_faq(form)
    }
}

impl ContentRecord for TestimonialRecord {
    type Payload = TestimonialPayload;
    const KIND: EntityKind = EntityKind::Testimonial;

    fn id(&self) -> Uuid {
        self.id
    }

    fn validate(form: &FormData) -> Result<Self::Payload, FieldErrors> {
        content::validate_testimonial(form)
    }
}
