use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use twotails_core::{DomainError, DomainResult, Entity, ProductId, ProductPromotionId, PromotionId, validate_text};

const MAX_NAME_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromotion {
    pub promotion_id: PromotionId,
    pub name: String,
    pub description: String,
    pub discount_percent: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePromotion {
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_percent: Option<u8>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Time-bounded discount campaign.
///
/// The `is_active` flag and the date window are independent: nothing flips
/// the flag when the window closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    id: PromotionId,
    name: String,
    description: String,
    discount_percent: u8,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
}

impl Promotion {
    pub fn create(cmd: &CreatePromotion) -> DomainResult<Self> {
        let promotion = Self {
            id: cmd.promotion_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            discount_percent: cmd.discount_percent,
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            is_active: cmd.is_active,
        };
        promotion.validate()?;
        Ok(promotion)
    }

    pub fn update(&mut self, patch: &UpdatePromotion) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(percent) = patch.discount_percent {
            next.discount_percent = percent;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(end) = patch.end_date {
            next.end_date = end;
        }
        if let Some(active) = patch.is_active {
            next.is_active = active;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn validate(&self) -> DomainResult<()> {
        validate_text("promotion name", &self.name, MAX_NAME_CHARS)?;
        if self.discount_percent > 100 {
            return Err(DomainError::validation("discount percent cannot exceed 100"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation("promotion ends before it starts"));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether `date` falls inside the campaign window (both ends inclusive).
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Status label shown in promotion listings.
    pub fn active_status(&self) -> &'static str {
        if self.is_active { "Активна" } else { "Неактивна" }
    }

    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.description.to_lowercase().contains(&needle)
    }
}

impl Entity for Promotion {
    type Id = PromotionId;
    const NAME: &'static str = "promotion";

    fn id(&self) -> &PromotionId {
        &self.id
    }
}

/// Association row linking a product to a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductPromotion {
    id: ProductPromotionId,
    product_id: ProductId,
    promotion_id: PromotionId,
}

impl ProductPromotion {
    pub fn new(id: ProductPromotionId, product_id: ProductId, promotion_id: PromotionId) -> Self {
        Self {
            id,
            product_id,
            promotion_id,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn promotion_id(&self) -> PromotionId {
        self.promotion_id
    }
}

impl Entity for ProductPromotion {
    type Id = ProductPromotionId;
    const NAME: &'static str = "product promotion";

    fn id(&self) -> &ProductPromotionId {
        &self.id
    }
}

/// Promotion names joined for list display, in the order given.
pub fn promotions_list<'a>(promotions: impl IntoIterator<Item = &'a Promotion>) -> String {
    promotions
        .into_iter()
        .map(Promotion::name)
        .collect::<Vec<_>>()
        .join(", ")
}
