//! Document models
//!
//! Field names serialize in camelCase so stored documents keep the shape of
//! the site's original collections (`products`, `workshops`, `enquiries`,
//! `workshops/{id}/registrations`).

use crate::error::{CoreError, Result};
use crate::validation::{FieldChecks, Validate, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest discount percentage a generated code may carry
pub const MIN_DISCOUNT_PERCENTAGE: i64 = 1;

/// Highest discount percentage a generated code may carry
pub const MAX_DISCOUNT_PERCENTAGE: i64 = 99;

/// A generated discount: opaque code plus a percentage in [1, 99]
///
/// Created fresh per widget activation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub code: String,
    pub percentage: u8,
}

impl DiscountResult {
    /// Build a discount, rejecting blank codes and out-of-range percentages
    ///
    /// Out-of-range values are an error, never clamped.
    pub fn new(code: impl Into<String>, percentage: i64) -> Result<Self> {
        let code = code.into();
        let code = code.trim();
        if code.is_empty() {
            return Err(CoreError::InvalidDiscount(
                "discount code is empty".to_string(),
            ));
        }
        if !(MIN_DISCOUNT_PERCENTAGE..=MAX_DISCOUNT_PERCENTAGE).contains(&percentage) {
            return Err(CoreError::InvalidDiscount(format!(
                "percentage {} outside [{}, {}]",
                percentage, MIN_DISCOUNT_PERCENTAGE, MAX_DISCOUNT_PERCENTAGE
            )));
        }

        Ok(Self {
            code: code.to_string(),
            percentage: percentage as u8,
        })
    }
}

/// Answer produced by the FAQ assistant for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqAnswer {
    pub answer: String,
}

/// A prior question/answer pair used as grounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

/// Product form values, as submitted from the admin back-office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Validate for ProductInput {
    fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut checks = FieldChecks::new();
        checks
            .min_len("name", &self.name, 2)
            .min_len("description", &self.description, 10)
            .range("price", self.price, 0.0, f64::MAX);

        if let Some(discount) = self.discount_percentage {
            checks.range("discountPercentage", discount, 0.0, 99.0);
        }
        for (i, url) in self.image_urls.iter().enumerate() {
            checks.url(&format!("imageUrls[{}]", i), url);
        }
        for (i, feature) in self.features.iter().enumerate() {
            checks.min_len(&format!("features[{}]", i), feature, 2);
        }

        checks.finish()
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_percentage: u8,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Build a product from validated form values
    pub fn from_input(input: ProductInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            discount_percentage: input.discount_percentage.unwrap_or(0.0).round() as u8,
            image_urls: input.image_urls,
            features: input.features,
            created_at,
        }
    }

    /// Overwrite editable fields, keeping id and creation time
    pub fn apply(&mut self, input: ProductInput) {
        let created_at = self.created_at;
        let id = std::mem::take(&mut self.id);
        *self = Product::from_input(input, created_at);
        self.id = id;
    }
}

// =============================================================================
// Workshops
// =============================================================================

/// Workshop form values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopInput {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub date: String,
    pub duration: String,
    pub venue: String,
    pub address: String,
    pub time: String,
    pub topics: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Validate for WorkshopInput {
    fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut checks = FieldChecks::new();
        checks
            .min_len("title", &self.title, 5)
            .min_len("description", &self.description, 20)
            .min_len("instructor", &self.instructor, 2)
            .required("date", &self.date)
            .required("duration", &self.duration)
            .required("venue", &self.venue)
            .required("address", &self.address)
            .required("time", &self.time)
            .min_len("topics", &self.topics, 5);

        // An empty image URL means "no image"
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            checks.url("imageUrl", url);
        }

        checks.finish()
    }
}

/// A scheduled workshop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub date: String,
    pub duration: String,
    pub venue: String,
    pub address: String,
    pub time: String,
    pub topics: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    pub fn from_input(input: WorkshopInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            title: input.title,
            description: input.description,
            instructor: input.instructor,
            date: input.date,
            duration: input.duration,
            venue: input.venue,
            address: input.address,
            time: input.time,
            topics: input.topics,
            image_url: input.image_url.filter(|u| !u.is_empty()),
            created_at,
        }
    }

    /// Topics are entered as one comma-separated string
    pub fn topic_list(&self) -> Vec<&str> {
        self.topics
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// A user's registration for one workshop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub id: String,
    pub workshop_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_email: Option<String>,
    pub registered_at: DateTime<Utc>,
}

// =============================================================================
// Enquiries
// =============================================================================

/// Follow-up status of a school enquiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnquiryStatus {
    #[default]
    Pending,
    Contacted,
    Resolved,
}

/// School registration / consultation form values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryInput {
    pub school_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Validate for EnquiryInput {
    fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        FieldChecks::new()
            .min_len("schoolName", &self.school_name, 2)
            .min_len("contactName", &self.contact_name, 2)
            .email("email", &self.email)
            .min_len("phone", &self.phone, 10)
            .finish()
    }
}

/// A stored school enquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(default)]
    pub id: String,
    pub school_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    /// New enquiries always start as `Pending`
    pub fn from_input(input: EnquiryInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            school_name: input.school_name,
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            user_id: input.user_id.filter(|u| !u.is_empty()),
            status: EnquiryStatus::Pending,
            created_at,
        }
    }
}
